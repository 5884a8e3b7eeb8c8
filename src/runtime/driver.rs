//! Real-time driver for a [`GameSession`]
//!
//! The session itself never sleeps or does IO. The driver maps wall time
//! onto its logical clock, feeds it commands, runs the lookups it asks
//! for on spawned tasks and forwards the events it emits.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};

use crate::command::{Command, CommandExecutor};
use crate::core::error::Result;
use crate::game::events::GameEvent;
use crate::game::requests::LookupToken;
use crate::game::session::GameSession;
use crate::lookup::{CountryDetail, DetailLookup};

pub const DEFAULT_TICK: Duration = Duration::from_millis(50);

type Completion = (LookupToken, Result<Option<CountryDetail>>);

pub struct GameDriver<L: DetailLookup> {
    session: GameSession,
    lookup: Arc<L>,
    tick: Duration,
}

impl<L: DetailLookup> GameDriver<L> {
    pub fn new(session: GameSession, lookup: Arc<L>) -> Self {
        Self {
            session,
            lookup,
            tick: DEFAULT_TICK,
        }
    }

    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    /// Run until the command channel closes or nobody listens for events
    ///
    /// Returns the session so callers can inspect the final state.
    pub async fn run(
        mut self,
        mut commands: mpsc::Receiver<Command>,
        events: mpsc::UnboundedSender<GameEvent>,
    ) -> GameSession {
        let start = Instant::now();
        let mut interval = tokio::time::interval(self.tick);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let (done_tx, mut done_rx) = mpsc::unbounded_channel::<Completion>();

        tracing::info!("Game driver running (tick {:?})", self.tick);
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.session.advance_to(start.elapsed());
                }
                command = commands.recv() => {
                    let Some(command) = command else {
                        tracing::info!("Command channel closed, stopping driver");
                        break;
                    };
                    self.session.advance_to(start.elapsed());
                    let result = CommandExecutor::execute(&mut self.session, command);
                    if let Some(error) = result.error {
                        tracing::info!("{}: {}", result.command, error);
                    }
                }
                Some((token, result)) = done_rx.recv() => {
                    self.session.complete_lookup(token, result);
                }
            }

            self.spawn_lookups(&done_tx);
            if !self.forward_events(&events) {
                tracing::info!("Event receiver dropped, stopping driver");
                break;
            }
        }

        self.forward_events(&events);
        self.session
    }

    fn spawn_lookups(&mut self, done: &mpsc::UnboundedSender<Completion>) {
        for request in self.session.drain_requests() {
            let lookup = Arc::clone(&self.lookup);
            let done = done.clone();
            tokio::spawn(async move {
                let result = lookup.lookup(&request.code).await;
                // The driver may already be gone; nothing left to update then
                let _ = done.send((request.token, result));
            });
        }
    }

    fn forward_events(&mut self, events: &mpsc::UnboundedSender<GameEvent>) -> bool {
        for event in self.session.drain_events() {
            if events.send(event).is_err() {
                return false;
            }
        }
        true
    }
}

//! Role-keyed countdowns
//!
//! One engine drives both the score countdown and the map clue reveal.
//! Each role has a single slot; starting a role cancels whatever occupied
//! its slot first, removing the pending tick from the scheduler.

use std::time::Duration;

use crate::core::types::TimerRole;
use crate::timer::scheduler::{JobKey, Scheduler};

const TICK: Duration = Duration::from_secs(1);

/// A live countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    pub role: TimerRole,
    pub remaining: u32,
    pending: JobKey,
}

/// What a popped tick job did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickResult {
    Ticked { role: TimerRole, remaining: u32 },
    Expired { role: TimerRole },
    /// The tick belonged to a countdown that no longer exists
    Stale,
}

#[derive(Debug, Default, Clone)]
pub struct TimerEngine {
    slots: [Option<Countdown>; 2],
}

impl TimerEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a countdown, replacing any live one for the same role
    ///
    /// Returns the remaining seconds of the replaced countdown, if any.
    pub fn start<J: From<TimerRole>>(
        &mut self,
        role: TimerRole,
        seconds: u32,
        now: Duration,
        scheduler: &mut Scheduler<J>,
    ) -> Option<u32> {
        let replaced = self.cancel(role, scheduler);
        let pending = scheduler.schedule_at(now + TICK, J::from(role));
        self.slots[role.slot()] = Some(Countdown {
            role,
            remaining: seconds,
            pending,
        });
        tracing::debug!("Started {:?} countdown at {}s", role, seconds);
        replaced
    }

    /// Handle a tick job popped from the scheduler
    pub fn on_tick<J: From<TimerRole>>(
        &mut self,
        role: TimerRole,
        key: JobKey,
        scheduler: &mut Scheduler<J>,
    ) -> TickResult {
        let slot = &mut self.slots[role.slot()];
        let Some(countdown) = slot.as_mut().filter(|c| c.pending == key) else {
            tracing::trace!("Dropping stale {:?} tick", role);
            return TickResult::Stale;
        };

        countdown.remaining = countdown.remaining.saturating_sub(1);
        if countdown.remaining == 0 {
            *slot = None;
            tracing::debug!("{:?} countdown expired", role);
            return TickResult::Expired { role };
        }

        let remaining = countdown.remaining;
        countdown.pending = scheduler.schedule_at(key.due() + TICK, J::from(role));
        TickResult::Ticked { role, remaining }
    }

    /// Add time to a live countdown, capped at `cap` seconds
    pub fn add_seconds(&mut self, role: TimerRole, seconds: u32, cap: u32) -> Option<u32> {
        let countdown = self.slots[role.slot()].as_mut()?;
        countdown.remaining = countdown.remaining.saturating_add(seconds).min(cap);
        Some(countdown.remaining)
    }

    /// Stop a countdown; returns its remaining seconds if it was live
    pub fn cancel<J>(&mut self, role: TimerRole, scheduler: &mut Scheduler<J>) -> Option<u32> {
        let countdown = self.slots[role.slot()].take()?;
        scheduler.cancel(countdown.pending);
        tracing::debug!("Cancelled {:?} countdown at {}s", role, countdown.remaining);
        Some(countdown.remaining)
    }

    /// Stop every live countdown; returns the roles that were running
    pub fn cancel_all<J>(&mut self, scheduler: &mut Scheduler<J>) -> Vec<TimerRole> {
        TimerRole::ALL
            .into_iter()
            .filter(|role| self.cancel(*role, scheduler).is_some())
            .collect()
    }

    pub fn remaining(&self, role: TimerRole) -> Option<u32> {
        self.slots[role.slot()].map(|c| c.remaining)
    }

    pub fn is_active(&self, role: TimerRole) -> bool {
        self.slots[role.slot()].is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Tick(TimerRole);

    impl From<TimerRole> for Tick {
        fn from(role: TimerRole) -> Self {
            Tick(role)
        }
    }

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    /// Fire everything due up to `now`, collecting results
    fn run(engine: &mut TimerEngine, sched: &mut Scheduler<Tick>, now: Duration) -> Vec<(Duration, TickResult)> {
        let mut out = Vec::new();
        while let Some((key, Tick(role))) = sched.pop_due(now) {
            out.push((key.due(), engine.on_tick(role, key, sched)));
        }
        out
    }

    #[test]
    fn test_counts_down_to_expiry() {
        let mut engine = TimerEngine::new();
        let mut sched = Scheduler::new();
        engine.start(TimerRole::ClueReveal, 3, secs(0), &mut sched);

        let results = run(&mut engine, &mut sched, secs(10));
        let results: Vec<_> = results.into_iter().map(|(_, r)| r).collect();
        assert_eq!(
            results,
            vec![
                TickResult::Ticked { role: TimerRole::ClueReveal, remaining: 2 },
                TickResult::Ticked { role: TimerRole::ClueReveal, remaining: 1 },
                TickResult::Expired { role: TimerRole::ClueReveal },
            ]
        );
        assert!(!engine.is_active(TimerRole::ClueReveal));
        assert_eq!(sched.next_due(), None);
    }

    #[test]
    fn test_restart_cancels_previous_tick_source() {
        let mut engine = TimerEngine::new();
        let mut sched = Scheduler::new();
        engine.start(TimerRole::ScoreCountdown, 30, secs(0), &mut sched);
        let replaced = engine.start(
            TimerRole::ScoreCountdown,
            20,
            Duration::from_millis(500),
            &mut sched,
        );
        assert_eq!(replaced, Some(30));
        assert_eq!(sched.next_due(), Some(Duration::from_millis(1500)));

        let results = run(&mut engine, &mut sched, secs(3));
        let due: Vec<_> = results.iter().map(|(d, _)| *d).collect();
        assert_eq!(
            due,
            vec![
                Duration::from_millis(1500),
                Duration::from_millis(2500)
            ]
        );
        assert_eq!(engine.remaining(TimerRole::ScoreCountdown), Some(18));
    }

    #[test]
    fn test_stale_key_is_ignored() {
        let mut engine = TimerEngine::new();
        let mut sched: Scheduler<Tick> = Scheduler::new();
        engine.start(TimerRole::ClueReveal, 10, secs(0), &mut sched);
        let (old_key, _) = sched.pop_due(secs(1)).unwrap();
        engine.start(TimerRole::ClueReveal, 10, secs(1), &mut sched);

        assert_eq!(engine.on_tick(TimerRole::ClueReveal, old_key, &mut sched), TickResult::Stale);
        assert_eq!(engine.remaining(TimerRole::ClueReveal), Some(10));
    }

    #[test]
    fn test_roles_are_independent() {
        let mut engine = TimerEngine::new();
        let mut sched: Scheduler<Tick> = Scheduler::new();
        engine.start(TimerRole::ScoreCountdown, 60, secs(0), &mut sched);
        engine.start(TimerRole::ClueReveal, 10, secs(0), &mut sched);
        assert_eq!(engine.cancel(TimerRole::ClueReveal, &mut sched), Some(10));
        assert!(engine.is_active(TimerRole::ScoreCountdown));
        assert!(sched.pop_due(secs(1)).is_some());
        assert!(sched.pop_due(secs(1)).is_none());
    }

    #[test]
    fn test_bonus_is_capped() {
        let mut engine = TimerEngine::new();
        let mut sched: Scheduler<Tick> = Scheduler::new();
        engine.start(TimerRole::ScoreCountdown, 110, secs(0), &mut sched);
        assert_eq!(engine.add_seconds(TimerRole::ScoreCountdown, 15, 120), Some(120));
        assert_eq!(engine.add_seconds(TimerRole::ClueReveal, 15, 120), None);
    }

    #[test]
    fn test_cancel_all() {
        let mut engine = TimerEngine::new();
        let mut sched = Scheduler::new();
        engine.start(TimerRole::ScoreCountdown, 60, secs(0), &mut sched);
        engine.start(TimerRole::ClueReveal, 10, secs(0), &mut sched);
        let cancelled = engine.cancel_all(&mut sched);
        assert_eq!(cancelled.len(), 2);
        assert_eq!(sched.next_due(), None);
        assert!(run(&mut engine, &mut sched, secs(100)).is_empty());
    }
}

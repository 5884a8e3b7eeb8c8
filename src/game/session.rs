//! The game session controller
//!
//! `GameSession` owns all mutable game state and is the only thing that
//! mutates it. It never performs IO: time moves only when the caller
//! advances the logical clock, detail lookups leave as [`LookupRequest`]s
//! and come back through [`GameSession::complete_lookup`], and everything
//! the rendering surface needs is queued as [`GameEvent`]s.

use std::sync::Arc;
use std::time::Duration;

use ahash::AHashMap;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use uuid::Uuid;

use crate::catalog::{Country, CountryCatalog};
use crate::core::config::GameConfig;
use crate::core::error::{GeoError, Result};
use crate::core::types::{Control, Coords, CountryId, Difficulty, GuessOutcome, TimerRole};
use crate::game::controls::Controls;
use crate::game::events::{GameEvent, Mode};
use crate::game::flags::{FlagPick, FlagProgress, FlagRound, FlagRoundManager, RoundToken};
use crate::game::lifecycle::{ClickedRegion, GuessLifecycle, GuessPhase, Resolution};
use crate::game::markers::{MarkerBook, MarkerError};
use crate::game::requests::{LookupApplied, LookupPurpose, LookupRequest, LookupToken};
use crate::game::score::ScoreTracker;
use crate::game::selector::{CountrySelector, Selection};
use crate::lookup::{CountryDetail, Trivia};
use crate::storage::{KeyValueStore, Preferences, SettingChange, Settings};
use crate::timer::{JobKey, Scheduler, TickResult, TimerEngine, TimerInput, TimerInputError};

/// Deferred work on the logical clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Job {
    Tick(TimerRole),
    NextCountry { epoch: u64 },
    LoaderDone { epoch: u64 },
    NextFlagRound,
}

impl From<TimerRole> for Job {
    fn from(role: TimerRole) -> Self {
        Job::Tick(role)
    }
}

/// One map game, from difficulty choice to game over or exhaustion
#[derive(Debug)]
struct MapGame {
    epoch: u64,
    difficulty: Difficulty,
    selector: CountrySelector,
    lifecycle: GuessLifecycle,
    score: ScoreTracker,
    /// Found country whose trivia may still be shown; cleared by the next
    /// resolved guess
    trivia_for: Option<CountryId>,
    /// Clue already spent on the current target
    clue_used: bool,
}

#[derive(Debug)]
pub struct GameSession {
    catalog: Arc<CountryCatalog>,
    config: GameConfig,
    prefs: Preferences,
    settings: Settings,
    rng: ChaCha8Rng,
    now: Duration,
    scheduler: Scheduler<Job>,
    timers: TimerEngine,
    map: Option<MapGame>,
    flags: FlagRoundManager,
    flag_replace: Option<JobKey>,
    mode: Mode,
    controls: Controls,
    markers: MarkerBook,
    events: Vec<GameEvent>,
    requests: Vec<LookupRequest>,
    pending: AHashMap<LookupToken, LookupPurpose>,
    next_epoch: u64,
    next_token: u64,
}

impl GameSession {
    pub fn new(
        catalog: Arc<CountryCatalog>,
        config: GameConfig,
        store: Box<dyn KeyValueStore>,
        seed: u64,
    ) -> Self {
        let prefs = Preferences::new(store);
        let settings = prefs.settings();
        let markers = MarkerBook::new(config.markers.max_name_len);
        Self {
            catalog,
            config,
            prefs,
            settings,
            rng: ChaCha8Rng::seed_from_u64(seed),
            now: Duration::ZERO,
            scheduler: Scheduler::new(),
            timers: TimerEngine::new(),
            map: None,
            flags: FlagRoundManager::new(),
            flag_replace: None,
            mode: Mode::Menu,
            controls: Controls::all_disabled(),
            markers,
            events: Vec::new(),
            requests: Vec::new(),
            pending: AHashMap::new(),
            next_epoch: 0,
            next_token: 0,
        }
    }

    // ------------------------------------------------------------------
    // Clock and queues
    // ------------------------------------------------------------------

    pub fn now(&self) -> Duration {
        self.now
    }

    /// Move the clock forward, running every job due on the way in order
    pub fn advance_to(&mut self, now: Duration) {
        while let Some((key, job)) = self.scheduler.pop_due(now) {
            self.now = self.now.max(key.due());
            match job {
                Job::Tick(role) => self.on_timer_tick(role, key),
                Job::NextCountry { epoch } => self.on_next_country(epoch),
                Job::LoaderDone { epoch } => self.on_loader_done(epoch),
                Job::NextFlagRound => self.on_next_flag_round(key),
            }
        }
        self.now = self.now.max(now);
    }

    pub fn advance_by(&mut self, delta: Duration) {
        self.advance_to(self.now + delta);
    }

    /// When the next job is due, if any
    pub fn next_wakeup(&self) -> Option<Duration> {
        self.scheduler.next_due()
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn drain_requests(&mut self) -> Vec<LookupRequest> {
        std::mem::take(&mut self.requests)
    }

    /// Lookups issued and not yet completed
    pub fn pending_lookups(&self) -> usize {
        self.pending.len()
    }

    // ------------------------------------------------------------------
    // Read access
    // ------------------------------------------------------------------

    pub fn catalog(&self) -> &CountryCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn settings(&self) -> Settings {
        self.settings
    }

    pub fn difficulty(&self) -> Option<Difficulty> {
        self.map.as_ref().map(|m| m.difficulty)
    }

    pub fn phase(&self) -> Option<GuessPhase> {
        self.map.as_ref().map(|m| m.lifecycle.phase())
    }

    pub fn is_game_over(&self) -> bool {
        self.map.as_ref().is_some_and(|m| m.lifecycle.is_game_over())
    }

    pub fn score(&self) -> u32 {
        self.map.as_ref().map_or(0, |m| m.score.score())
    }

    pub fn high_score(&self) -> u32 {
        match &self.map {
            Some(m) => m.score.current_high_score(),
            None => self.prefs.high_score(),
        }
    }

    pub fn guesses_remaining(&self) -> Option<u32> {
        self.map.as_ref().map(|m| m.lifecycle.guesses_remaining())
    }

    pub fn attempts(&self) -> u32 {
        self.map.as_ref().map_or(0, |m| m.lifecycle.attempts())
    }

    /// Country the player is asked to find
    pub fn active_country(&self) -> Option<&Country> {
        let id = self.map.as_ref()?.selector.active()?;
        self.catalog.get(id)
    }

    pub fn guessed_count(&self) -> usize {
        self.map.as_ref().map_or(0, |m| m.selector.guessed_count())
    }

    pub fn timer_remaining(&self, role: TimerRole) -> Option<u32> {
        self.timers.remaining(role)
    }

    pub fn is_control_enabled(&self, control: Control) -> bool {
        self.controls.is_enabled(control)
    }

    pub fn markers(&self) -> &MarkerBook {
        &self.markers
    }

    pub fn flag_round(&self) -> Option<&FlagRound> {
        self.flags.current()
    }

    /// Saved countdown duration, for pre-filling the timer input
    pub fn saved_time(&self) -> Option<TimerInput> {
        self.prefs
            .saved_time()
            .map(|(m, s)| TimerInput::from_parts(m, s, &self.config.countdown))
    }

    // ------------------------------------------------------------------
    // Map game
    // ------------------------------------------------------------------

    /// Start a fresh map game, discarding any running one
    pub fn choose_difficulty(&mut self, difficulty: Difficulty) {
        self.end_map_game();
        self.drop_flag_round();

        let epoch = self.next_epoch;
        self.next_epoch += 1;
        let guesses = self.config.guesses_for(difficulty);
        let score = ScoreTracker::load(&self.prefs);
        let high_score = score.current_high_score();

        self.map = Some(MapGame {
            epoch,
            difficulty,
            selector: CountrySelector::new(),
            lifecycle: GuessLifecycle::new(guesses),
            score,
            trivia_for: None,
            clue_used: false,
        });
        self.set_mode(Mode::Map);

        tracing::info!("Starting {} game (epoch {}, {} guesses)", difficulty, epoch, guesses);
        self.emit(GameEvent::GameStarted {
            difficulty,
            guesses,
            high_score,
        });

        self.select_next();
        let due = self.now + self.config.loader_delay();
        self.scheduler.schedule_at(due, Job::LoaderDone { epoch });
        self.refresh_controls();
    }

    /// Restart with the same difficulty
    pub fn play_again(&mut self) {
        if let Some(difficulty) = self.difficulty() {
            self.choose_difficulty(difficulty);
        }
    }

    pub fn exit_to_menu(&mut self) {
        self.end_map_game();
        self.drop_flag_round();
        self.set_mode(Mode::Menu);
        self.refresh_controls();
    }

    /// Resolve a click on the map against the active country
    pub fn click_country(&mut self, region: &ClickedRegion) {
        if self.mode != Mode::Map {
            return;
        }
        let catalog = Arc::clone(&self.catalog);
        let Some(map) = self.map.as_mut() else {
            return;
        };
        if !map.lifecycle.accepts_guess() {
            tracing::debug!("Ignoring click on {} while {:?}", region.name, map.lifecycle.phase());
            return;
        }
        let Some(target) = map.selector.active().and_then(|id| catalog.get(id)) else {
            return;
        };

        let correct = region.name == target.display_name;
        let Some(resolution) = map.lifecycle.resolve(correct) else {
            return;
        };
        map.trivia_for = None;
        let epoch = map.epoch;

        let outcome = if correct {
            GuessOutcome::Correct
        } else {
            GuessOutcome::Incorrect
        };
        tracing::debug!("Guess {} for {}: {:?}", region.name, target.display_name, outcome);
        self.emit(GameEvent::GuessResolved {
            outcome,
            target: target.id,
            clicked: region.name.clone(),
        });

        match resolution {
            Resolution::Correct => self.on_correct_guess(epoch, target),
            Resolution::Incorrect { guesses_remaining } => {
                self.emit(GameEvent::GuessesChanged {
                    remaining: guesses_remaining,
                });
            }
            Resolution::OutOfGuesses => {
                self.emit(GameEvent::GuessesChanged { remaining: 0 });
                self.finish_game_over();
            }
        }
    }

    /// Give up on the current country; only while a guess is expected
    pub fn forfeit(&mut self) {
        if self.mode != Mode::Map {
            return;
        }
        let Some(map) = self.map.as_mut() else {
            return;
        };
        if !map.lifecycle.forfeit() {
            tracing::debug!("Ignoring forfeit while {:?}", map.lifecycle.phase());
            return;
        }
        tracing::info!("Player forfeited");
        self.finish_game_over();
    }

    /// Validate and start the score countdown
    pub fn start_countdown(&mut self, minutes: &str, seconds: &str) -> Result<()> {
        if !self.wants_enabled(Control::Timer) {
            tracing::debug!("Countdown unavailable right now");
            return Err(GeoError::ControlDisabled(Control::Timer));
        }
        let input = match TimerInput::parse(minutes, seconds, &self.config.countdown) {
            Ok(input) => input,
            Err(e) => return Err(self.reject_timer_input(e)),
        };
        self.run_countdown(input);
        Ok(())
    }

    /// Start the score countdown from the saved duration
    pub fn start_saved_countdown(&mut self) -> Result<()> {
        if !self.wants_enabled(Control::Timer) {
            tracing::debug!("Countdown unavailable right now");
            return Err(GeoError::ControlDisabled(Control::Timer));
        }
        let Some(input) = self.saved_time() else {
            return Err(self.reject_timer_input(TimerInputError::Empty));
        };
        self.run_countdown(input);
        Ok(())
    }

    pub fn stop_countdown(&mut self) {
        if self
            .timers
            .cancel(TimerRole::ScoreCountdown, &mut self.scheduler)
            .is_some()
        {
            self.emit(GameEvent::TimerCancelled {
                role: TimerRole::ScoreCountdown,
            });
            self.refresh_controls();
        }
    }

    /// Remember a countdown duration; short values are raised to the floor
    pub fn save_time(&mut self, minutes: &str, seconds: &str) -> Result<TimerInput> {
        let input = match TimerInput::parse_for_saving(minutes, seconds, &self.config.countdown) {
            Ok(input) => input,
            Err(e) => return Err(self.reject_timer_input(e)),
        };
        self.prefs.set_saved_time(input.minutes(), input.seconds());
        self.emit(GameEvent::SavedTimeChanged {
            saved: Some((input.minutes(), input.seconds())),
        });
        Ok(input)
    }

    pub fn clear_time(&mut self) {
        self.prefs.clear_saved_time();
        self.emit(GameEvent::SavedTimeChanged { saved: None });
    }

    /// Reveal the detailed map for a while
    pub fn start_clue(&mut self) {
        if !self.wants_enabled(Control::MapClue) {
            tracing::debug!("Map clue unavailable right now");
            return;
        }
        let Some(map) = self.map.as_mut() else {
            return;
        };
        map.clue_used = true;
        let seconds = self.config.clue_seconds_for(map.difficulty);
        self.timers
            .start(TimerRole::ClueReveal, seconds, self.now, &mut self.scheduler);
        self.emit(GameEvent::TimerStarted {
            role: TimerRole::ClueReveal,
            remaining: seconds,
        });
        self.emit(GameEvent::MapClue { revealed: true });
        self.refresh_controls();
    }

    pub fn stop_clue(&mut self) {
        if self
            .timers
            .cancel(TimerRole::ClueReveal, &mut self.scheduler)
            .is_some()
        {
            self.emit(GameEvent::TimerCancelled {
                role: TimerRole::ClueReveal,
            });
            self.emit(GameEvent::MapClue { revealed: false });
            self.refresh_controls();
        }
    }

    /// Fly the view near the target, offset by a random amount
    pub fn estimate_position(&mut self) {
        if !self.wants_enabled(Control::EstimatePosition) {
            return;
        }
        let catalog = Arc::clone(&self.catalog);
        let Some(map) = self.map.as_ref().filter(|m| m.lifecycle.accepts_guess()) else {
            return;
        };
        let Some(target) = map.selector.active().and_then(|id| catalog.get(id)) else {
            return;
        };
        let (lat_spread, lng_spread, zoom) = self.config.estimate_for(map.difficulty);
        let d_lat = spread_offset(&mut self.rng, lat_spread);
        let d_lng = spread_offset(&mut self.rng, lng_spread);
        self.emit(GameEvent::FlyTo {
            coords: target.centroid.offset(d_lat, d_lng),
            zoom,
        });
    }

    // ------------------------------------------------------------------
    // Flag mode
    // ------------------------------------------------------------------

    pub fn enter_flag_mode(&mut self) {
        if self.mode == Mode::Flags {
            if let Some(round) = self.flags.current().filter(|r| !r.is_resolved()).cloned() {
                self.emit(GameEvent::FlagRoundReady(round));
            }
            return;
        }
        self.end_map_game();
        self.set_mode(Mode::Flags);
        self.refresh_controls();
        self.start_flag_round();
    }

    pub fn leave_flag_mode(&mut self) {
        if self.mode != Mode::Flags {
            return;
        }
        self.drop_flag_round();
        self.set_mode(Mode::Menu);
    }

    /// Resolve a click on one of the flag choices
    pub fn click_flag(&mut self, code: &str) {
        if self.mode != Mode::Flags {
            return;
        }
        let Some(resolution) = self.flags.resolve_guess(code) else {
            tracing::debug!("Ignoring flag click {}", code);
            return;
        };
        self.emit(GameEvent::FlagGuessResolved {
            outcome: resolution.outcome,
            target: resolution.target,
            clicked: resolution.clicked,
        });
        let due = self.now + self.config.flag_round_delay();
        self.flag_replace = Some(self.scheduler.schedule_at(due, Job::NextFlagRound));
    }

    // ------------------------------------------------------------------
    // Markers and settings
    // ------------------------------------------------------------------

    pub fn add_marker(&mut self, name: &str, coords: Coords) -> std::result::Result<Uuid, MarkerError> {
        let added = if self.wants_enabled(Control::Markers) {
            self.markers.add(name, coords).cloned()
        } else {
            Err(MarkerError::Unavailable)
        };
        match added {
            Ok(marker) => {
                let id = marker.id;
                self.emit(GameEvent::MarkerAdded(marker));
                Ok(id)
            }
            Err(e) => {
                self.emit(GameEvent::MarkerRejected(e.clone()));
                Err(e)
            }
        }
    }

    pub fn remove_marker(&mut self, id: Uuid) -> bool {
        if self.markers.remove(id).is_none() {
            return false;
        }
        self.emit(GameEvent::MarkerRemoved { id });
        true
    }

    pub fn clear_markers(&mut self) -> usize {
        let count = self.markers.clear();
        self.emit(GameEvent::MarkersCleared { count });
        count
    }

    /// Persist a settings change; trivia toggles apply immediately
    pub fn change_setting(&mut self, change: SettingChange) -> Settings {
        self.settings = self.prefs.apply(change);
        self.emit(GameEvent::SettingsChanged(self.settings));
        self.settings
    }

    // ------------------------------------------------------------------
    // Lookup completions
    // ------------------------------------------------------------------

    /// Feed back the answer to a request from [`Self::drain_requests`]
    ///
    /// Errors and empty answers are treated alike: no detail available.
    pub fn complete_lookup(
        &mut self,
        token: LookupToken,
        result: Result<Option<CountryDetail>>,
    ) -> LookupApplied {
        let Some(purpose) = self.pending.remove(&token) else {
            tracing::debug!("Completion for unknown lookup {:?}", token);
            return LookupApplied::Unknown;
        };
        let detail = match result {
            Ok(detail) => detail,
            Err(e) => {
                tracing::warn!("Lookup {:?} failed: {}", token, e);
                None
            }
        };

        let applied = match purpose {
            LookupPurpose::Trivia { epoch, country } => self.apply_trivia(epoch, country, detail),
            LookupPurpose::HardPrompt { epoch, country } => {
                self.apply_hard_prompt(epoch, country, detail)
            }
            LookupPurpose::GameOverInfo { epoch, country } => {
                self.apply_game_over_info(epoch, country, detail)
            }
            LookupPurpose::FlagChoice { round, country } => {
                self.apply_flag_choice(round, country, detail)
            }
        };
        if applied == LookupApplied::Stale {
            tracing::debug!("Discarding stale lookup {:?} ({:?})", token, purpose);
        }
        applied
    }

    fn apply_trivia(
        &mut self,
        epoch: u64,
        country: CountryId,
        detail: Option<CountryDetail>,
    ) -> LookupApplied {
        let fresh = self.settings.trivia_enabled
            && self.map.as_ref().is_some_and(|m| {
                m.epoch == epoch
                    && m.trivia_for == Some(country)
                    && !m.lifecycle.is_terminal()
            });
        if !fresh {
            return LookupApplied::Stale;
        }
        self.emit(GameEvent::Trivia {
            country,
            trivia: detail.as_ref().map(Trivia::from_detail),
        });
        LookupApplied::Applied
    }

    fn apply_hard_prompt(
        &mut self,
        epoch: u64,
        country: CountryId,
        detail: Option<CountryDetail>,
    ) -> LookupApplied {
        let fresh = self.map.as_ref().is_some_and(|m| {
            m.epoch == epoch && m.selector.active() == Some(country) && !m.lifecycle.is_terminal()
        });
        if !fresh {
            return LookupApplied::Stale;
        }
        // Without detail the name prompt stays
        if let Some(detail) = detail {
            self.emit(GameEvent::PromptFlag {
                country,
                flag_png: detail.flag_png,
                flag_alt: detail.flag_alt,
            });
        }
        LookupApplied::Applied
    }

    fn apply_game_over_info(
        &mut self,
        epoch: u64,
        country: CountryId,
        detail: Option<CountryDetail>,
    ) -> LookupApplied {
        let fresh = self.map.as_ref().is_some_and(|m| {
            m.epoch == epoch && m.lifecycle.is_game_over() && m.selector.active() == Some(country)
        });
        if !fresh {
            return LookupApplied::Stale;
        }
        self.emit(GameEvent::GameOverInfo {
            country,
            trivia: detail.as_ref().map(Trivia::from_detail),
        });
        LookupApplied::Applied
    }

    fn apply_flag_choice(
        &mut self,
        round: RoundToken,
        country: CountryId,
        detail: Option<CountryDetail>,
    ) -> LookupApplied {
        match self
            .flags
            .on_detail(round, country, detail, &self.catalog, &mut self.rng)
        {
            FlagProgress::Stale => LookupApplied::Stale,
            FlagProgress::Waiting => LookupApplied::Applied,
            FlagProgress::Resample(pick) => {
                self.request_flag(pick);
                LookupApplied::Applied
            }
            FlagProgress::Ready => {
                if let Some(round) = self.flags.current().cloned() {
                    tracing::debug!("Flag round {:?} ready, target {}", round.token, round.target_name());
                    self.emit(GameEvent::FlagRoundReady(round));
                }
                LookupApplied::Applied
            }
            FlagProgress::Failed => {
                self.emit(GameEvent::FlagRoundUnavailable {
                    reason: "not enough countries with flag details".into(),
                });
                LookupApplied::Applied
            }
        }
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn emit(&mut self, event: GameEvent) {
        tracing::trace!("Event {}", event.kind());
        self.events.push(event);
    }

    /// Queue a lookup; `None` when there is no code to look up
    fn request(&mut self, code: Option<&str>, purpose: LookupPurpose) -> Option<LookupToken> {
        let Some(code) = code else {
            tracing::debug!("No ISO code, skipping lookup for {:?}", purpose);
            return None;
        };
        let token = LookupToken(self.next_token);
        self.next_token += 1;
        self.pending.insert(token, purpose);
        self.requests.push(LookupRequest {
            token,
            code: code.to_string(),
            purpose,
        });
        Some(token)
    }

    fn request_flag(&mut self, pick: FlagPick) {
        let purpose = LookupPurpose::FlagChoice {
            round: pick.round,
            country: pick.country,
        };
        self.request(Some(&pick.code), purpose);
    }

    fn set_mode(&mut self, mode: Mode) {
        if self.mode != mode {
            self.mode = mode;
            self.emit(GameEvent::ModeChanged { mode });
        }
    }

    /// Pick the next target and announce it
    fn select_next(&mut self) -> Selection {
        let catalog = Arc::clone(&self.catalog);
        let Some(map) = self.map.as_mut() else {
            return Selection::Exhausted;
        };
        let selection = map.selector.next(catalog.len(), &mut self.rng);
        let Selection::Selected(id) = selection else {
            return selection;
        };
        let epoch = map.epoch;
        let flag_prompt = map.difficulty.prompts_with_flag();

        if let Some(country) = catalog.get(id) {
            self.emit(GameEvent::CountrySelected {
                country: id,
                name: country.display_name.clone(),
            });
            if flag_prompt {
                self.request(
                    country.iso.lookup_code(),
                    LookupPurpose::HardPrompt { epoch, country: id },
                );
            }
        }
        selection
    }

    fn on_correct_guess(&mut self, epoch: u64, target: &Country) {
        let Some(map) = self.map.as_mut() else {
            return;
        };
        let update = map.score.increment(&mut self.prefs);
        map.trivia_for = Some(target.id);
        map.clue_used = false;

        self.emit(GameEvent::ScoreChanged {
            score: update.score,
        });
        if update.high_score_raised {
            self.emit(GameEvent::HighScoreChanged {
                high_score: update.high_score,
            });
        }

        let countdown = &self.config.countdown;
        if let Some(remaining) = self.timers.add_seconds(
            TimerRole::ScoreCountdown,
            countdown.correct_bonus_seconds,
            countdown.max_seconds,
        ) {
            self.emit(GameEvent::TimerBonus { remaining });
        }
        self.stop_clue();

        if self.settings.trivia_enabled {
            let purpose = LookupPurpose::Trivia {
                epoch,
                country: target.id,
            };
            if self.request(target.iso.lookup_code(), purpose).is_none() {
                self.emit(GameEvent::Trivia {
                    country: target.id,
                    trivia: None,
                });
            }
        }

        let due = self.now + self.config.next_country_delay();
        self.scheduler.schedule_at(due, Job::NextCountry { epoch });
        self.refresh_controls();
    }

    fn run_countdown(&mut self, input: TimerInput) {
        let seconds = input.total_seconds();
        let replaced = self.timers.start(
            TimerRole::ScoreCountdown,
            seconds,
            self.now,
            &mut self.scheduler,
        );
        if replaced.is_some() {
            self.emit(GameEvent::TimerCancelled {
                role: TimerRole::ScoreCountdown,
            });
        }
        self.emit(GameEvent::TimerStarted {
            role: TimerRole::ScoreCountdown,
            remaining: seconds,
        });
        self.refresh_controls();
    }

    fn reject_timer_input(&mut self, error: TimerInputError) -> GeoError {
        tracing::debug!("Rejected countdown input: {}", error);
        self.emit(GameEvent::TimerInputRejected {
            error: error.clone(),
        });
        GeoError::InvalidTimerInput(error)
    }

    fn on_timer_tick(&mut self, role: TimerRole, key: JobKey) {
        match self.timers.on_tick(role, key, &mut self.scheduler) {
            TickResult::Ticked { role, remaining } => {
                self.emit(GameEvent::TimerTick { role, remaining });
            }
            TickResult::Expired { role } => {
                self.emit(GameEvent::TimerTick { role, remaining: 0 });
                self.emit(GameEvent::TimerExpired { role });
                match role {
                    TimerRole::ScoreCountdown => {
                        tracing::info!("Countdown ran out");
                        self.force_game_over();
                    }
                    TimerRole::ClueReveal => {
                        self.emit(GameEvent::MapClue { revealed: false });
                        self.refresh_controls();
                    }
                }
            }
            TickResult::Stale => {}
        }
    }

    fn on_loader_done(&mut self, epoch: u64) {
        let Some(map) = self.map.as_mut().filter(|m| m.epoch == epoch) else {
            return;
        };
        if map.lifecycle.ready() {
            self.emit(GameEvent::Loaded);
            self.refresh_controls();
        }
    }

    fn on_next_country(&mut self, epoch: u64) {
        let advancing = self.map.as_ref().is_some_and(|m| {
            m.epoch == epoch && m.lifecycle.phase() == GuessPhase::Advancing
        });
        if !advancing {
            return;
        }
        match self.select_next() {
            Selection::Selected(_) => {
                if let Some(map) = self.map.as_mut() {
                    map.lifecycle.next_round();
                }
            }
            Selection::Exhausted => self.finish_all_guessed(),
        }
        self.refresh_controls();
    }

    fn on_next_flag_round(&mut self, key: JobKey) {
        if self.flag_replace != Some(key) {
            return;
        }
        self.flag_replace = None;
        if self.mode == Mode::Flags {
            self.start_flag_round();
        }
    }

    fn start_flag_round(&mut self) {
        match self.flags.start_round(&self.catalog, &mut self.rng) {
            Ok(picks) => {
                for pick in picks {
                    self.request_flag(pick);
                }
            }
            Err(e) => {
                tracing::warn!("Cannot start flag round: {}", e);
                self.emit(GameEvent::FlagRoundUnavailable {
                    reason: e.to_string(),
                });
            }
        }
    }

    fn drop_flag_round(&mut self) {
        self.flags.clear();
        if let Some(key) = self.flag_replace.take() {
            self.scheduler.cancel(key);
        }
    }

    /// Countdown expiry; false when the game already ended
    fn force_game_over(&mut self) -> bool {
        let Some(map) = self.map.as_mut() else {
            return false;
        };
        if !map.lifecycle.force_game_over() {
            return false;
        }
        self.finish_game_over();
        true
    }

    fn finish_game_over(&mut self) {
        self.cancel_timers();
        let catalog = Arc::clone(&self.catalog);
        let Some(map) = self.map.as_ref() else {
            return;
        };
        let epoch = map.epoch;

        if let Some(target) = map.selector.active().and_then(|id| catalog.get(id)) {
            tracing::info!("Game over; the country was {}", target.display_name);
            self.emit(GameEvent::GameOver {
                target: target.id,
                name: target.display_name.clone(),
                coords: target.centroid,
            });
            let purpose = LookupPurpose::GameOverInfo {
                epoch,
                country: target.id,
            };
            if self.request(target.iso.lookup_code(), purpose).is_none() {
                self.emit(GameEvent::GameOverInfo {
                    country: target.id,
                    trivia: None,
                });
            }
        }

        let cleared = self.markers.clear();
        if cleared > 0 {
            self.emit(GameEvent::MarkersCleared { count: cleared });
        }
        self.refresh_controls();
    }

    fn finish_all_guessed(&mut self) {
        let Some(map) = self.map.as_mut() else {
            return;
        };
        if !map.lifecycle.all_guessed() {
            return;
        }
        tracing::info!("All {} countries guessed", map.selector.guessed_count());
        self.cancel_timers();
        self.emit(GameEvent::AllCountriesGuessed);
    }

    fn end_map_game(&mut self) {
        if self.map.take().is_none() {
            return;
        }
        self.cancel_timers();
        self.scheduler
            .retain(|job| !matches!(job, Job::NextCountry { .. } | Job::LoaderDone { .. }));
    }

    fn cancel_timers(&mut self) {
        for role in self.timers.cancel_all(&mut self.scheduler) {
            self.emit(GameEvent::TimerCancelled { role });
            if role == TimerRole::ClueReveal {
                self.emit(GameEvent::MapClue { revealed: false });
            }
        }
    }

    /// Whether a control should be enabled in the current state
    fn wants_enabled(&self, control: Control) -> bool {
        let Some(map) = self.map.as_ref().filter(|_| self.mode == Mode::Map) else {
            return false;
        };
        // Nothing but markers works behind the loader
        let live = !map.lifecycle.is_terminal() && map.lifecycle.phase() != GuessPhase::Loading;
        let awaiting = map.lifecycle.accepts_guess();
        let hints = map.difficulty.allows_hints();
        let clue_running = self.timers.is_active(TimerRole::ClueReveal);
        let countdown_running = self.timers.is_active(TimerRole::ScoreCountdown);

        match control {
            Control::MapClue => {
                live && hints && !map.clue_used && !clue_running && !countdown_running
            }
            Control::EstimatePosition => awaiting && hints && !clue_running,
            Control::Timer => live && !clue_running,
            Control::Markers => true,
            Control::Forfeit | Control::GuessInput => awaiting,
        }
    }

    fn refresh_controls(&mut self) {
        for control in Control::ALL {
            let enabled = self.wants_enabled(control);
            if self.controls.set(control, enabled) {
                self.emit(GameEvent::ControlChanged { control, enabled });
            }
        }
    }
}

/// Uniform offset in `[0, spread)`; zero or unusable spread means no offset
fn spread_offset<R: Rng + ?Sized>(rng: &mut R, spread: f64) -> f64 {
    if spread.is_finite() && spread > 0.0 {
        rng.gen_range(0.0..spread)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixtures;
    use crate::lookup::basic_detail;
    use crate::storage::MemoryStore;

    fn session(n: u32) -> GameSession {
        GameSession::new(
            Arc::new(fixtures::catalog(n)),
            GameConfig::default(),
            Box::new(MemoryStore::new()),
            42,
        )
    }

    fn started(n: u32, difficulty: Difficulty) -> GameSession {
        let mut s = session(n);
        s.choose_difficulty(difficulty);
        let loader = s.config().loader_delay();
        s.advance_by(loader);
        s
    }

    fn target_name(s: &GameSession) -> String {
        s.active_country().unwrap().display_name.clone()
    }

    fn click_target(s: &mut GameSession) {
        let name = target_name(s);
        s.click_country(&ClickedRegion::named(name));
    }

    fn wrong_name(s: &GameSession) -> String {
        let target = s.active_country().unwrap().id;
        s.catalog()
            .iter()
            .find(|c| c.id != target)
            .unwrap()
            .display_name
            .clone()
    }

    #[test]
    fn test_clicks_ignored_until_loaded() {
        let mut s = session(5);
        s.choose_difficulty(Difficulty::Easy);
        assert_eq!(s.phase(), Some(GuessPhase::Loading));
        click_target(&mut s);
        assert_eq!(s.score(), 0);
        assert_eq!(s.attempts(), 0);

        s.advance_by(Duration::from_millis(2000));
        assert!(s.drain_events().contains(&GameEvent::Loaded));
        click_target(&mut s);
        assert_eq!(s.score(), 1);
    }

    #[test]
    fn test_clicks_ignored_while_advancing() {
        let mut s = started(5, Difficulty::Easy);
        click_target(&mut s);
        let name = wrong_name(&s);
        s.click_country(&ClickedRegion::named(name));
        assert_eq!(s.attempts(), 1);
        assert_eq!(s.guesses_remaining(), Some(15));
    }

    #[test]
    fn test_hard_disables_hints() {
        let mut s = started(5, Difficulty::Hard);
        assert!(!s.is_control_enabled(Control::MapClue));
        assert!(!s.is_control_enabled(Control::EstimatePosition));
        s.drain_events();
        s.start_clue();
        s.estimate_position();
        assert!(s.drain_events().is_empty());
        assert_eq!(s.timer_remaining(TimerRole::ClueReveal), None);
    }

    #[test]
    fn test_clue_and_countdown_exclusive() {
        let mut s = started(5, Difficulty::Medium);
        s.start_clue();
        assert_eq!(s.timer_remaining(TimerRole::ClueReveal), Some(10));
        assert!(!s.is_control_enabled(Control::Timer));
        assert!(matches!(
            s.start_countdown("1", "0"),
            Err(GeoError::ControlDisabled(Control::Timer))
        ));
        assert!(matches!(
            s.start_saved_countdown(),
            Err(GeoError::ControlDisabled(Control::Timer))
        ));
        assert_eq!(s.timer_remaining(TimerRole::ScoreCountdown), None);

        s.stop_clue();
        s.start_countdown("1", "0").unwrap();
        assert_eq!(s.timer_remaining(TimerRole::ScoreCountdown), Some(60));
        assert!(!s.is_control_enabled(Control::MapClue));
    }

    #[test]
    fn test_clue_once_per_target() {
        let mut s = started(5, Difficulty::Easy);
        s.start_clue();
        s.advance_by(Duration::from_secs(15));
        assert_eq!(s.timer_remaining(TimerRole::ClueReveal), None);
        assert!(!s.is_control_enabled(Control::MapClue));

        click_target(&mut s);
        assert!(s.is_control_enabled(Control::MapClue));
    }

    #[test]
    fn test_estimate_stays_near_target() {
        let mut s = started(5, Difficulty::Easy);
        let centroid = s.active_country().unwrap().centroid;
        s.drain_events();
        s.estimate_position();
        let events = s.drain_events();
        let Some(GameEvent::FlyTo { coords, zoom }) = events.first() else {
            panic!("expected fly-to, got {:?}", events);
        };
        assert_eq!(*zoom, 6);
        assert!(coords.lat >= centroid.lat && coords.lat < centroid.lat + 2.0);
        assert!(coords.lng >= centroid.lng && coords.lng < centroid.lng + 2.0);
    }

    #[test]
    fn test_forfeit_ends_game_and_clears_markers() {
        let mut s = started(5, Difficulty::Easy);
        s.add_marker("camp", Coords::new(1.0, 1.0)).unwrap();
        s.start_countdown("1", "").unwrap();
        s.drain_events();

        s.forfeit();
        assert!(s.is_game_over());
        assert!(s.markers().is_empty());
        assert_eq!(s.timer_remaining(TimerRole::ScoreCountdown), None);
        assert!(!s.is_control_enabled(Control::GuessInput));

        let events = s.drain_events();
        assert!(events.iter().any(|e| matches!(e, GameEvent::GameOver { .. })));
        let requests = s.drain_requests();
        assert!(requests
            .iter()
            .any(|r| matches!(r.purpose, LookupPurpose::GameOverInfo { .. })));
    }

    #[test]
    fn test_hard_prompt_applies_only_to_active_country() {
        let mut s = session(5);
        s.choose_difficulty(Difficulty::Hard);
        let request = s.drain_requests().pop().unwrap();
        assert!(matches!(request.purpose, LookupPurpose::HardPrompt { .. }));

        let detail = basic_detail(&request.code, None, "Somewhere");
        assert_eq!(
            s.complete_lookup(request.token, Ok(Some(detail.clone()))),
            LookupApplied::Applied
        );
        assert!(s
            .drain_events()
            .iter()
            .any(|e| matches!(e, GameEvent::PromptFlag { .. })));
        assert_eq!(
            s.complete_lookup(request.token, Ok(Some(detail))),
            LookupApplied::Unknown
        );

        s.choose_difficulty(Difficulty::Hard);
        let old = s.drain_requests().pop().unwrap();
        s.play_again();
        assert_eq!(s.complete_lookup(old.token, Ok(None)), LookupApplied::Stale);
    }

    #[test]
    fn test_trivia_disabled_setting() {
        let mut s = started(5, Difficulty::Easy);
        s.change_setting(SettingChange::Trivia(false));
        s.drain_requests();
        click_target(&mut s);
        assert!(s.drain_requests().is_empty());
    }

    #[test]
    fn test_exit_to_menu_cancels_everything() {
        let mut s = started(5, Difficulty::Easy);
        s.start_countdown("0", "30").unwrap();
        s.exit_to_menu();
        assert_eq!(s.mode(), Mode::Menu);
        assert_eq!(s.next_wakeup(), None);
        assert!(Control::ALL.iter().all(|c| !s.is_control_enabled(*c)));
    }

    #[test]
    fn test_controls_locked_while_loading() {
        let mut s = session(5);
        s.choose_difficulty(Difficulty::Easy);
        for control in [
            Control::GuessInput,
            Control::Forfeit,
            Control::Timer,
            Control::MapClue,
            Control::EstimatePosition,
        ] {
            assert!(!s.is_control_enabled(control), "{:?} enabled while loading", control);
        }
        assert!(s.is_control_enabled(Control::Markers));

        assert!(matches!(
            s.start_countdown("1", "0"),
            Err(GeoError::ControlDisabled(Control::Timer))
        ));
        s.forfeit();
        s.start_clue();
        assert_eq!(s.phase(), Some(GuessPhase::Loading));
        assert_eq!(s.timer_remaining(TimerRole::ScoreCountdown), None);
        assert_eq!(s.timer_remaining(TimerRole::ClueReveal), None);

        s.advance_by(s.config().loader_delay());
        assert!(s.is_control_enabled(Control::GuessInput));
        assert!(s.is_control_enabled(Control::Forfeit));
        s.start_countdown("1", "0").unwrap();
        assert_eq!(s.timer_remaining(TimerRole::ScoreCountdown), Some(60));
    }

    #[test]
    fn test_forfeit_ignored_while_advancing() {
        let mut s = started(5, Difficulty::Easy);
        click_target(&mut s);
        assert_eq!(s.phase(), Some(GuessPhase::Advancing));
        assert!(!s.is_control_enabled(Control::Forfeit));
        s.drain_events();

        s.forfeit();
        assert!(!s.is_game_over());
        assert!(s.drain_events().is_empty());

        s.advance_by(s.config().next_country_delay());
        assert_eq!(s.phase(), Some(GuessPhase::AwaitingGuess));
        s.forfeit();
        assert!(s.is_game_over());
    }

    #[test]
    fn test_trivia_dropped_once_game_ends() {
        let mut s = started(5, Difficulty::Easy);
        s.drain_requests();
        click_target(&mut s);
        let trivia = s.drain_requests().pop().unwrap();
        assert!(matches!(trivia.purpose, LookupPurpose::Trivia { .. }));

        s.advance_by(s.config().next_country_delay());
        s.forfeit();
        assert!(s.is_game_over());
        s.drain_events();

        let detail = basic_detail(&trivia.code, None, "Somewhere");
        assert_eq!(
            s.complete_lookup(trivia.token, Ok(Some(detail))),
            LookupApplied::Stale
        );
        assert!(!s
            .drain_events()
            .iter()
            .any(|e| matches!(e, GameEvent::Trivia { .. })));
    }

    #[test]
    fn test_trivia_dropped_after_next_guess_resolves() {
        let mut s = started(5, Difficulty::Easy);
        s.drain_requests();
        click_target(&mut s);
        let trivia = s.drain_requests().pop().unwrap();

        s.advance_by(s.config().next_country_delay());
        let name = wrong_name(&s);
        s.click_country(&ClickedRegion::named(name));
        assert!(!s.is_game_over());

        assert_eq!(s.complete_lookup(trivia.token, Ok(None)), LookupApplied::Stale);
    }

    #[test]
    fn test_markers_only_on_map() {
        let mut s = session(5);
        assert_eq!(
            s.add_marker("camp", Coords::new(1.0, 1.0)),
            Err(MarkerError::Unavailable)
        );
        assert!(s
            .drain_events()
            .iter()
            .any(|e| matches!(e, GameEvent::MarkerRejected(_))));

        s.enter_flag_mode();
        assert_eq!(
            s.add_marker("camp", Coords::new(1.0, 1.0)),
            Err(MarkerError::Unavailable)
        );
        assert!(s.markers().is_empty());

        s.choose_difficulty(Difficulty::Easy);
        assert!(s.add_marker("camp", Coords::new(1.0, 1.0)).is_ok());
        assert_eq!(s.markers().len(), 1);
    }

    #[test]
    fn test_spread_offset_ignores_unusable_spread() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for spread in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY, 0.0, -1.0] {
            assert_eq!(spread_offset(&mut rng, spread), 0.0);
        }
        let offset = spread_offset(&mut rng, 2.0);
        assert!((0.0..2.0).contains(&offset));
    }
}

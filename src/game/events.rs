//! Events the session emits for the rendering surface

use uuid::Uuid;

use crate::core::types::{Control, Coords, CountryId, Difficulty, GuessOutcome, TimerRole};
use crate::game::flags::FlagRound;
use crate::game::markers::{Marker, MarkerError};
use crate::lookup::Trivia;
use crate::storage::Settings;
use crate::timer::TimerInputError;

/// Which screen the session is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Menu,
    Map,
    Flags,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    ModeChanged { mode: Mode },

    // Map game
    GameStarted { difficulty: Difficulty, guesses: u32, high_score: u32 },
    /// Loader hidden; clicks are accepted from here on
    Loaded,
    CountrySelected { country: CountryId, name: String },
    /// Hard mode: show this flag instead of the name
    PromptFlag { country: CountryId, flag_png: String, flag_alt: Option<String> },
    GuessResolved { outcome: GuessOutcome, target: CountryId, clicked: String },
    GuessesChanged { remaining: u32 },
    ScoreChanged { score: u32 },
    HighScoreChanged { high_score: u32 },
    /// `trivia` is `None` when no detail could be found; show base info only
    Trivia { country: CountryId, trivia: Option<Trivia> },
    GameOver { target: CountryId, name: String, coords: Coords },
    GameOverInfo { country: CountryId, trivia: Option<Trivia> },
    AllCountriesGuessed,

    // Timers
    TimerStarted { role: TimerRole, remaining: u32 },
    TimerTick { role: TimerRole, remaining: u32 },
    TimerBonus { remaining: u32 },
    TimerExpired { role: TimerRole },
    TimerCancelled { role: TimerRole },
    TimerInputRejected { error: TimerInputError },
    SavedTimeChanged { saved: Option<(u32, u32)> },

    // Hints and view
    MapClue { revealed: bool },
    FlyTo { coords: Coords, zoom: u8 },
    ControlChanged { control: Control, enabled: bool },

    // Flag mode
    FlagRoundReady(FlagRound),
    FlagGuessResolved { outcome: GuessOutcome, target: CountryId, clicked: CountryId },
    FlagRoundUnavailable { reason: String },

    // Markers
    MarkerAdded(Marker),
    MarkerRemoved { id: Uuid },
    MarkersCleared { count: usize },
    MarkerRejected(MarkerError),

    SettingsChanged(Settings),
}

impl GameEvent {
    /// Short name for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ModeChanged { .. } => "mode_changed",
            Self::GameStarted { .. } => "game_started",
            Self::Loaded => "loaded",
            Self::CountrySelected { .. } => "country_selected",
            Self::PromptFlag { .. } => "prompt_flag",
            Self::GuessResolved { .. } => "guess_resolved",
            Self::GuessesChanged { .. } => "guesses_changed",
            Self::ScoreChanged { .. } => "score_changed",
            Self::HighScoreChanged { .. } => "high_score_changed",
            Self::Trivia { .. } => "trivia",
            Self::GameOver { .. } => "game_over",
            Self::GameOverInfo { .. } => "game_over_info",
            Self::AllCountriesGuessed => "all_countries_guessed",
            Self::TimerStarted { .. } => "timer_started",
            Self::TimerTick { .. } => "timer_tick",
            Self::TimerBonus { .. } => "timer_bonus",
            Self::TimerExpired { .. } => "timer_expired",
            Self::TimerCancelled { .. } => "timer_cancelled",
            Self::TimerInputRejected { .. } => "timer_input_rejected",
            Self::SavedTimeChanged { .. } => "saved_time_changed",
            Self::MapClue { .. } => "map_clue",
            Self::FlyTo { .. } => "fly_to",
            Self::ControlChanged { .. } => "control_changed",
            Self::FlagRoundReady(_) => "flag_round_ready",
            Self::FlagGuessResolved { .. } => "flag_guess_resolved",
            Self::FlagRoundUnavailable { .. } => "flag_round_unavailable",
            Self::MarkerAdded(_) => "marker_added",
            Self::MarkerRemoved { .. } => "marker_removed",
            Self::MarkersCleared { .. } => "markers_cleared",
            Self::MarkerRejected(_) => "marker_rejected",
            Self::SettingsChanged(_) => "settings_changed",
        }
    }
}

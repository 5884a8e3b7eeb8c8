//! Player command dispatch
//!
//! Every player action is parsed once into a [`Command`], from a text line
//! or from a UI trigger descriptor, then run by a single match:
//! text / UiTrigger -> Command -> CommandExecutor -> GameSession

pub mod executor;
pub mod parser;
pub mod trigger;

pub use executor::{CommandExecutor, ExecutionResult};
pub use parser::{parse_command, CommandParseError};
pub use trigger::UiTrigger;

use uuid::Uuid;

use crate::core::types::{Coords, Difficulty};
use crate::game::lifecycle::ClickedRegion;
use crate::storage::SettingChange;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    ChooseDifficulty(Difficulty),
    ClickCountry(ClickedRegion),
    Forfeit,
    PlayAgain,
    ExitToMenu,

    StartCountdown { minutes: String, seconds: String },
    StartSavedCountdown,
    StopCountdown,
    SaveTime { minutes: String, seconds: String },
    ClearTime,

    StartClue,
    StopClue,
    EstimatePosition,

    EnterFlagMode,
    LeaveFlagMode,
    ClickFlag { code: String },

    AddMarker { name: String, coords: Coords },
    RemoveMarker { id: Uuid },
    ClearMarkers,

    ChangeSetting(SettingChange),
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ChooseDifficulty(_) => "choose_difficulty",
            Self::ClickCountry(_) => "click_country",
            Self::Forfeit => "forfeit",
            Self::PlayAgain => "play_again",
            Self::ExitToMenu => "exit_to_menu",
            Self::StartCountdown { .. } => "start_countdown",
            Self::StartSavedCountdown => "start_saved_countdown",
            Self::StopCountdown => "stop_countdown",
            Self::SaveTime { .. } => "save_time",
            Self::ClearTime => "clear_time",
            Self::StartClue => "start_clue",
            Self::StopClue => "stop_clue",
            Self::EstimatePosition => "estimate_position",
            Self::EnterFlagMode => "enter_flag_mode",
            Self::LeaveFlagMode => "leave_flag_mode",
            Self::ClickFlag { .. } => "click_flag",
            Self::AddMarker { .. } => "add_marker",
            Self::RemoveMarker { .. } => "remove_marker",
            Self::ClearMarkers => "clear_markers",
            Self::ChangeSetting(_) => "change_setting",
        }
    }
}

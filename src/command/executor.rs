//! Command execution - runs a parsed command against the session

use crate::command::Command;
use crate::game::session::GameSession;

/// Runs commands against a session
pub struct CommandExecutor;

impl CommandExecutor {
    /// Execute one command; rejected input is reported in the result
    pub fn execute(session: &mut GameSession, command: Command) -> ExecutionResult {
        let name = command.name();
        tracing::debug!("Executing {}", name);

        let error = match command {
            Command::ChooseDifficulty(difficulty) => {
                session.choose_difficulty(difficulty);
                None
            }
            Command::ClickCountry(region) => {
                session.click_country(&region);
                None
            }
            Command::Forfeit => {
                session.forfeit();
                None
            }
            Command::PlayAgain => {
                session.play_again();
                None
            }
            Command::ExitToMenu => {
                session.exit_to_menu();
                None
            }
            Command::StartCountdown { minutes, seconds } => session
                .start_countdown(&minutes, &seconds)
                .err()
                .map(|e| e.to_string()),
            Command::StartSavedCountdown => {
                session.start_saved_countdown().err().map(|e| e.to_string())
            }
            Command::StopCountdown => {
                session.stop_countdown();
                None
            }
            Command::SaveTime { minutes, seconds } => session
                .save_time(&minutes, &seconds)
                .err()
                .map(|e| e.to_string()),
            Command::ClearTime => {
                session.clear_time();
                None
            }
            Command::StartClue => {
                session.start_clue();
                None
            }
            Command::StopClue => {
                session.stop_clue();
                None
            }
            Command::EstimatePosition => {
                session.estimate_position();
                None
            }
            Command::EnterFlagMode => {
                session.enter_flag_mode();
                None
            }
            Command::LeaveFlagMode => {
                session.leave_flag_mode();
                None
            }
            Command::ClickFlag { code } => {
                session.click_flag(&code);
                None
            }
            Command::AddMarker { name, coords } => {
                session.add_marker(&name, coords).err().map(|e| e.to_string())
            }
            Command::RemoveMarker { id } => {
                (!session.remove_marker(id)).then(|| format!("no marker with id {}", id))
            }
            Command::ClearMarkers => {
                session.clear_markers();
                None
            }
            Command::ChangeSetting(change) => {
                session.change_setting(change);
                None
            }
        };

        if let Some(error) = &error {
            tracing::debug!("{} rejected: {}", name, error);
        }
        ExecutionResult {
            command: name,
            error,
        }
    }
}

/// Result of executing a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub command: &'static str,
    pub error: Option<String>,
}

impl ExecutionResult {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

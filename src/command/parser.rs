//! Text command grammar for the terminal front end
//!
//! ```text
//! easy | medium | hard            start a map game
//! guess <country name>            click a country
//! forfeit | again | menu
//! timer <min> <sec>               start the countdown
//! timer saved | stop | clear
//! timer save <min> <sec>
//! clue [stop] | estimate
//! flags [leave] | flag <code>
//! marker add <lat> <lng> <name>
//! marker remove <id> | marker clear
//! set music|effects <0..1>
//! set mute-music|mute-effects|zoom|trivia on|off
//! ```

use thiserror::Error;
use uuid::Uuid;

use crate::command::Command;
use crate::core::types::{Coords, Difficulty};
use crate::game::lifecycle::ClickedRegion;
use crate::storage::SettingChange;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandParseError {
    #[error("empty command")]
    Empty,

    #[error("unknown command '{0}'")]
    Unknown(String),

    #[error("'{command}' needs {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },

    #[error("invalid {argument}: '{value}'")]
    InvalidArgument {
        argument: &'static str,
        value: String,
    },
}

type ParseResult = Result<Command, CommandParseError>;

/// Parse one line of player input
pub fn parse_command(line: &str) -> ParseResult {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Err(CommandParseError::Empty);
    };
    let rest: Vec<&str> = words.collect();

    match head.to_ascii_lowercase().as_str() {
        "easy" | "medium" | "hard" | "e" | "m" | "h" => head
            .parse::<Difficulty>()
            .map(Command::ChooseDifficulty)
            .map_err(|_| CommandParseError::Unknown(head.to_string())),
        "play" => {
            let level = rest.first().ok_or(CommandParseError::MissingArgument {
                command: "play",
                argument: "a difficulty",
            })?;
            level
                .parse::<Difficulty>()
                .map(Command::ChooseDifficulty)
                .map_err(|_| invalid("difficulty", level))
        }
        "guess" => {
            if rest.is_empty() {
                return Err(CommandParseError::MissingArgument {
                    command: "guess",
                    argument: "a country name",
                });
            }
            Ok(Command::ClickCountry(ClickedRegion::named(rest.join(" "))))
        }
        "forfeit" | "find" => Ok(Command::Forfeit),
        "again" => Ok(Command::PlayAgain),
        "menu" => Ok(Command::ExitToMenu),
        "timer" => parse_timer(&rest),
        "clue" => match rest.first() {
            None => Ok(Command::StartClue),
            Some(&"stop") => Ok(Command::StopClue),
            Some(other) => Err(invalid("clue action", other)),
        },
        "estimate" => Ok(Command::EstimatePosition),
        "flags" => match rest.first() {
            None => Ok(Command::EnterFlagMode),
            Some(&"leave") => Ok(Command::LeaveFlagMode),
            Some(other) => Err(invalid("flags action", other)),
        },
        "flag" => {
            let code = rest.first().ok_or(CommandParseError::MissingArgument {
                command: "flag",
                argument: "a country code",
            })?;
            Ok(Command::ClickFlag {
                code: code.to_string(),
            })
        }
        "marker" => parse_marker(&rest),
        "set" => parse_setting(&rest),
        _ => Err(CommandParseError::Unknown(head.to_string())),
    }
}

fn parse_timer(args: &[&str]) -> ParseResult {
    match args {
        ["saved"] => Ok(Command::StartSavedCountdown),
        ["stop"] => Ok(Command::StopCountdown),
        ["clear"] => Ok(Command::ClearTime),
        ["save", fields @ ..] => {
            let (minutes, seconds) = time_fields(fields);
            Ok(Command::SaveTime { minutes, seconds })
        }
        fields => {
            let (minutes, seconds) = time_fields(fields);
            Ok(Command::StartCountdown { minutes, seconds })
        }
    }
}

/// Missing fields are left empty; the timer input rules decide what that means
fn time_fields(fields: &[&str]) -> (String, String) {
    let minutes = fields.first().map(|s| s.to_string()).unwrap_or_default();
    let seconds = fields.get(1).map(|s| s.to_string()).unwrap_or_default();
    (minutes, seconds)
}

fn parse_marker(args: &[&str]) -> ParseResult {
    match args {
        ["add", lat, lng, name @ ..] if !name.is_empty() => Ok(Command::AddMarker {
            name: name.join(" "),
            coords: Coords::new(parse_f64("latitude", lat)?, parse_f64("longitude", lng)?),
        }),
        ["add", ..] => Err(CommandParseError::MissingArgument {
            command: "marker add",
            argument: "latitude, longitude and a name",
        }),
        ["remove", id] => Uuid::parse_str(id)
            .map(|id| Command::RemoveMarker { id })
            .map_err(|_| invalid("marker id", id)),
        ["clear"] => Ok(Command::ClearMarkers),
        [other, ..] => Err(invalid("marker action", other)),
        [] => Err(CommandParseError::MissingArgument {
            command: "marker",
            argument: "an action",
        }),
    }
}

fn parse_setting(args: &[&str]) -> ParseResult {
    let [name, value] = args else {
        return Err(CommandParseError::MissingArgument {
            command: "set",
            argument: "a setting and a value",
        });
    };
    let change = match *name {
        "music" => SettingChange::MusicVolume(parse_f32("volume", value)?),
        "effects" => SettingChange::EffectsVolume(parse_f32("volume", value)?),
        "mute-music" => SettingChange::MusicMuted(parse_switch(value)?),
        "mute-effects" => SettingChange::EffectsMuted(parse_switch(value)?),
        "zoom" => SettingChange::ZoomControls(parse_switch(value)?),
        "trivia" => SettingChange::Trivia(parse_switch(value)?),
        other => return Err(invalid("setting", other)),
    };
    Ok(Command::ChangeSetting(change))
}

pub(crate) fn parse_switch(value: &str) -> Result<bool, CommandParseError> {
    match value.to_ascii_lowercase().as_str() {
        "on" | "true" | "1" => Ok(true),
        "off" | "false" | "0" => Ok(false),
        _ => Err(invalid("switch value", value)),
    }
}

pub(crate) fn parse_f64(argument: &'static str, value: &str) -> Result<f64, CommandParseError> {
    value
        .trim()
        .parse()
        .ok()
        .filter(|v: &f64| v.is_finite())
        .ok_or_else(|| invalid(argument, value))
}

pub(crate) fn parse_f32(argument: &'static str, value: &str) -> Result<f32, CommandParseError> {
    value
        .trim()
        .parse()
        .ok()
        .filter(|v: &f32| v.is_finite())
        .ok_or_else(|| invalid(argument, value))
}

pub(crate) fn invalid(argument: &'static str, value: &str) -> CommandParseError {
    CommandParseError::InvalidArgument {
        argument,
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_shortcuts() {
        assert_eq!(parse_command("hard"), Ok(Command::ChooseDifficulty(Difficulty::Hard)));
        assert_eq!(parse_command("play e"), Ok(Command::ChooseDifficulty(Difficulty::Easy)));
        assert!(matches!(
            parse_command("play nightmare"),
            Err(CommandParseError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_guess_keeps_multi_word_names() {
        assert_eq!(
            parse_command("guess  United   Kingdom"),
            Ok(Command::ClickCountry(ClickedRegion::named("United Kingdom")))
        );
    }

    #[test]
    fn test_timer_forms() {
        assert_eq!(
            parse_command("timer 0 15"),
            Ok(Command::StartCountdown {
                minutes: "0".into(),
                seconds: "15".into()
            })
        );
        assert_eq!(
            parse_command("timer 2"),
            Ok(Command::StartCountdown {
                minutes: "2".into(),
                seconds: String::new()
            })
        );
        assert_eq!(parse_command("timer stop"), Ok(Command::StopCountdown));
        assert_eq!(
            parse_command("timer save 1 5"),
            Ok(Command::SaveTime {
                minutes: "1".into(),
                seconds: "5".into()
            })
        );
    }

    #[test]
    fn test_marker_add() {
        let cmd = parse_command("marker add 48.8 2.35 Eiffel Tower").unwrap();
        assert_eq!(
            cmd,
            Command::AddMarker {
                name: "Eiffel Tower".into(),
                coords: Coords::new(48.8, 2.35)
            }
        );
        assert!(parse_command("marker add 1 2").is_err());
        assert!(parse_command("marker add north 2 x").is_err());
    }

    #[test]
    fn test_settings() {
        assert_eq!(
            parse_command("set trivia off"),
            Ok(Command::ChangeSetting(SettingChange::Trivia(false)))
        );
        assert_eq!(
            parse_command("set music 0.3"),
            Ok(Command::ChangeSetting(SettingChange::MusicVolume(0.3)))
        );
        assert!(parse_command("set music loud").is_err());
        assert!(parse_command("set brightness 1").is_err());
    }

    #[test]
    fn test_unknown_and_empty() {
        assert_eq!(parse_command("   "), Err(CommandParseError::Empty));
        assert_eq!(
            parse_command("dance"),
            Err(CommandParseError::Unknown("dance".into()))
        );
    }
}

//! UI trigger descriptors
//!
//! The rendering surface reports a click as the class of the element that
//! was hit plus its data attributes. This is turned into a [`Command`] in
//! one place instead of checking class names wherever clicks are handled.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::command::parser::{invalid, parse_f32, parse_f64, parse_switch, CommandParseError};
use crate::command::Command;
use crate::core::types::{Coords, Difficulty};
use crate::game::lifecycle::ClickedRegion;
use crate::storage::SettingChange;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiTrigger {
    pub class: String,
    #[serde(default)]
    pub data: AHashMap<String, String>,
}

impl UiTrigger {
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            data: AHashMap::new(),
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.data.insert(key.to_string(), value.into());
        self
    }

    fn attr(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }

    fn required(&self, key: &'static str) -> Result<&str, CommandParseError> {
        self.attr(key).ok_or(CommandParseError::MissingArgument {
            command: "trigger",
            argument: key,
        })
    }

    fn time_fields(&self) -> (String, String) {
        (
            self.attr("minutes").unwrap_or_default().to_string(),
            self.attr("seconds").unwrap_or_default().to_string(),
        )
    }

    pub fn to_command(&self) -> Result<Command, CommandParseError> {
        let command = match self.class.as_str() {
            "difficulty-btn" => {
                let level = self.required("difficulty")?;
                Command::ChooseDifficulty(
                    level
                        .parse::<Difficulty>()
                        .map_err(|_| invalid("difficulty", level))?,
                )
            }
            "country-polygon" => Command::ClickCountry(ClickedRegion {
                name: self.required("name_en")?.to_string(),
                code: self.attr("iso_a2_eh").map(str::to_string),
                alt_code: self.attr("adm0_iso").map(str::to_string),
            }),
            "find-country-btn" => Command::Forfeit,
            "play-again-btn" => Command::PlayAgain,
            "menu-btn" => Command::ExitToMenu,

            "timer-start-btn" => {
                let (minutes, seconds) = self.time_fields();
                Command::StartCountdown { minutes, seconds }
            }
            "timer-saved-btn" => Command::StartSavedCountdown,
            "timer-stop-btn" => Command::StopCountdown,
            "timer-save-btn" => {
                let (minutes, seconds) = self.time_fields();
                Command::SaveTime { minutes, seconds }
            }
            "timer-clear-btn" => Command::ClearTime,

            "map-clue-btn" => Command::StartClue,
            "map-clue-stop-btn" => Command::StopClue,
            "estimate-btn" => Command::EstimatePosition,

            "flag-mode-btn" => Command::EnterFlagMode,
            "flag-exit-btn" => Command::LeaveFlagMode,
            "guess-flag-btn" => Command::ClickFlag {
                code: self.required("country-code")?.to_string(),
            },

            "marker-add-btn" => Command::AddMarker {
                name: self.attr("name").unwrap_or_default().to_string(),
                coords: Coords::new(
                    parse_f64("latitude", self.required("lat")?)?,
                    parse_f64("longitude", self.required("lng")?)?,
                ),
            },
            "marker-remove-btn" => {
                let id = self.required("id")?;
                Command::RemoveMarker {
                    id: Uuid::parse_str(id).map_err(|_| invalid("marker id", id))?,
                }
            }
            "marker-clear-btn" => Command::ClearMarkers,

            "setting-input" => Command::ChangeSetting(self.setting()?),

            other => return Err(CommandParseError::Unknown(other.to_string())),
        };
        Ok(command)
    }

    fn setting(&self) -> Result<SettingChange, CommandParseError> {
        let value = self.required("value")?;
        let change = match self.required("setting")? {
            "music-volume" => SettingChange::MusicVolume(parse_f32("volume", value)?),
            "effects-volume" => SettingChange::EffectsVolume(parse_f32("volume", value)?),
            "music-muted" => SettingChange::MusicMuted(parse_switch(value)?),
            "effects-muted" => SettingChange::EffectsMuted(parse_switch(value)?),
            "zoom-controls" => SettingChange::ZoomControls(parse_switch(value)?),
            "country-trivia" => SettingChange::Trivia(parse_switch(value)?),
            other => return Err(invalid("setting", other)),
        };
        Ok(change)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_country_polygon_carries_codes() {
        let trigger = UiTrigger::new("country-polygon")
            .with("name_en", "Kenya")
            .with("iso_a2_eh", "KE")
            .with("adm0_iso", "KEN");
        assert_eq!(
            trigger.to_command(),
            Ok(Command::ClickCountry(ClickedRegion {
                name: "Kenya".into(),
                code: Some("KE".into()),
                alt_code: Some("KEN".into()),
            }))
        );
    }

    #[test]
    fn test_missing_attribute() {
        assert_eq!(
            UiTrigger::new("guess-flag-btn").to_command(),
            Err(CommandParseError::MissingArgument {
                command: "trigger",
                argument: "country-code"
            })
        );
    }

    #[test]
    fn test_buttons_without_data() {
        assert_eq!(UiTrigger::new("map-clue-btn").to_command(), Ok(Command::StartClue));
        assert_eq!(UiTrigger::new("timer-stop-btn").to_command(), Ok(Command::StopCountdown));
        assert_eq!(UiTrigger::new("find-country-btn").to_command(), Ok(Command::Forfeit));
    }

    #[test]
    fn test_setting_input() {
        let trigger = UiTrigger::new("setting-input")
            .with("setting", "zoom-controls")
            .with("value", "off");
        assert_eq!(
            trigger.to_command(),
            Ok(Command::ChangeSetting(SettingChange::ZoomControls(false)))
        );
    }

    #[test]
    fn test_unknown_class() {
        assert_eq!(
            UiTrigger::new("mystery").to_command(),
            Err(CommandParseError::Unknown("mystery".into()))
        );
    }

    #[test]
    fn test_deserializes_from_json() {
        let trigger: UiTrigger =
            serde_json::from_str(r#"{"class":"difficulty-btn","data":{"difficulty":"medium"}}"#).unwrap();
        assert_eq!(
            trigger.to_command(),
            Ok(Command::ChooseDifficulty(Difficulty::Medium))
        );
    }
}

//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Index of a country within the loaded catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CountryId(pub u32);

impl CountryId {
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for CountryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Latitude/longitude pair in degrees
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coords {
    pub lat: f64,
    pub lng: f64,
}

impl Coords {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Shift by a delta, keeping latitude on the globe
    pub fn offset(&self, d_lat: f64, d_lng: f64) -> Self {
        Self {
            lat: (self.lat + d_lat).clamp(-90.0, 90.0),
            lng: self.lng + d_lng,
        }
    }
}

/// Difficulty chosen at the start of a map game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }

    /// Hard mode shows a flag instead of the country name
    pub fn prompts_with_flag(&self) -> bool {
        matches!(self, Self::Hard)
    }

    /// Whether the map clue and estimated position helpers exist at all
    pub fn allows_hints(&self) -> bool {
        !matches!(self, Self::Hard)
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" | "e" => Ok(Self::Easy),
            "medium" | "m" => Ok(Self::Medium),
            "hard" | "h" => Ok(Self::Hard),
            other => Err(format!("unknown difficulty '{}'", other)),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The two countdown roles a session can run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimerRole {
    /// Opt-in score countdown; reaching zero ends the game
    ScoreCountdown,
    /// Time-boxed map clue reveal
    ClueReveal,
}

impl TimerRole {
    pub const ALL: [TimerRole; 2] = [TimerRole::ScoreCountdown, TimerRole::ClueReveal];

    pub(crate) fn slot(&self) -> usize {
        match self {
            Self::ScoreCountdown => 0,
            Self::ClueReveal => 1,
        }
    }
}

/// Named controls the core enables and disables on the rendering surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Control {
    MapClue,
    EstimatePosition,
    Timer,
    Markers,
    Forfeit,
    GuessInput,
}

impl Control {
    pub const ALL: [Control; 6] = [
        Control::MapClue,
        Control::EstimatePosition,
        Control::Timer,
        Control::Markers,
        Control::Forfeit,
        Control::GuessInput,
    ];
}

/// Result of a guess, shared by map and flag modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuessOutcome {
    Correct,
    Incorrect,
}

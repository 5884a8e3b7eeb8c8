//! Game configuration with documented constants
//!
//! All tunable numbers live here. Every field has a default so a config
//! file only needs to name the values it changes.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::core::error::{GeoError, Result};
use crate::core::types::Difficulty;

/// Top-level configuration for a game session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub guesses: GuessConfig,
    pub countdown: CountdownConfig,
    pub clue: ClueConfig,
    pub delays: DelayConfig,
    pub estimate: EstimateConfig,
    pub lookup: LookupConfig,
    pub markers: MarkerConfig,
}

/// Incorrect guesses allowed before the game ends
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GuessConfig {
    pub easy: u32,
    pub medium: u32,
    pub hard: u32,
}

impl Default for GuessConfig {
    fn default() -> Self {
        Self {
            easy: 15,
            medium: 10,
            hard: 5,
        }
    }
}

/// Score countdown limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CountdownConfig {
    /// Shortest countdown a player may start (seconds)
    pub min_seconds: u32,
    /// Longest countdown; also the cap after a correct-guess bonus (seconds)
    pub max_seconds: u32,
    /// Added to the running countdown on every correct guess (seconds)
    pub correct_bonus_seconds: u32,
}

impl Default for CountdownConfig {
    fn default() -> Self {
        Self {
            min_seconds: 15,
            max_seconds: 120,
            correct_bonus_seconds: 15,
        }
    }
}

/// Map clue reveal durations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClueConfig {
    pub easy_seconds: u32,
    pub other_seconds: u32,
}

impl Default for ClueConfig {
    fn default() -> Self {
        Self {
            easy_seconds: 15,
            other_seconds: 10,
        }
    }
}

/// Fixed delays between state changes (milliseconds)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DelayConfig {
    /// Pause between a correct guess and the next country
    pub next_country_ms: u64,
    /// Pause between a resolved flag round and its replacement
    pub flag_round_ms: u64,
    /// Loader shown while a map game starts; clicks are ignored meanwhile
    pub loader_ms: u64,
}

impl Default for DelayConfig {
    fn default() -> Self {
        Self {
            next_country_ms: 100,
            flag_round_ms: 3000,
            loader_ms: 2000,
        }
    }
}

/// Spread of the estimated-position hint
///
/// The view is flown to the centroid shifted by `U[0, spread)` degrees
/// on each axis, so the player sees roughly where to look.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimateConfig {
    pub easy_lat_spread: f64,
    pub easy_lng_spread: f64,
    pub easy_zoom: u8,
    pub other_lat_spread: f64,
    pub other_lng_spread: f64,
    pub other_zoom: u8,
}

impl Default for EstimateConfig {
    fn default() -> Self {
        Self {
            easy_lat_spread: 2.0,
            easy_lng_spread: 2.0,
            easy_zoom: 6,
            other_lat_spread: 25.0,
            other_lng_spread: 5.0,
            other_zoom: 5,
        }
    }
}

/// Country detail lookup service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            base_url: "https://restcountries.com/v3.1/alpha".into(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerConfig {
    pub max_name_len: usize,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self { max_name_len: 40 }
    }
}

impl GameConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML document, then validate it
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: GameConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Starting guess allowance for a difficulty
    pub fn guesses_for(&self, difficulty: Difficulty) -> u32 {
        match difficulty {
            Difficulty::Easy => self.guesses.easy,
            Difficulty::Medium => self.guesses.medium,
            Difficulty::Hard => self.guesses.hard,
        }
    }

    /// Duration of the map clue reveal for a difficulty
    pub fn clue_seconds_for(&self, difficulty: Difficulty) -> u32 {
        match difficulty {
            Difficulty::Easy => self.clue.easy_seconds,
            Difficulty::Medium | Difficulty::Hard => self.clue.other_seconds,
        }
    }

    /// (lat spread, lng spread, zoom) for the estimated-position hint
    pub fn estimate_for(&self, difficulty: Difficulty) -> (f64, f64, u8) {
        let e = &self.estimate;
        match difficulty {
            Difficulty::Easy => (e.easy_lat_spread, e.easy_lng_spread, e.easy_zoom),
            Difficulty::Medium | Difficulty::Hard => {
                (e.other_lat_spread, e.other_lng_spread, e.other_zoom)
            }
        }
    }

    pub fn next_country_delay(&self) -> Duration {
        Duration::from_millis(self.delays.next_country_ms)
    }

    pub fn flag_round_delay(&self) -> Duration {
        Duration::from_millis(self.delays.flag_round_ms)
    }

    pub fn loader_delay(&self) -> Duration {
        Duration::from_millis(self.delays.loader_ms)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        let g = &self.guesses;
        if g.easy == 0 || g.medium == 0 || g.hard == 0 {
            return Err(GeoError::Config("guess allowances must be at least 1".into()));
        }

        let c = &self.countdown;
        if c.min_seconds == 0 || c.min_seconds > c.max_seconds {
            return Err(GeoError::Config(format!(
                "countdown min_seconds ({}) must be in 1..=max_seconds ({})",
                c.min_seconds, c.max_seconds
            )));
        }

        if self.clue.easy_seconds == 0 || self.clue.other_seconds == 0 {
            return Err(GeoError::Config("clue durations must be positive".into()));
        }

        let e = &self.estimate;
        let spreads = [
            e.easy_lat_spread,
            e.easy_lng_spread,
            e.other_lat_spread,
            e.other_lng_spread,
        ];
        if spreads.iter().any(|s| !s.is_finite() || *s < 0.0) {
            return Err(GeoError::Config(
                "estimate spreads must be finite and not negative".into(),
            ));
        }

        if self.markers.max_name_len == 0 {
            return Err(GeoError::Config("markers.max_name_len must be positive".into()));
        }

        Ok(())
    }
}

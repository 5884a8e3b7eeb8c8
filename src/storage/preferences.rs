//! Typed access to the persisted values the game reads and writes
//!
//! Every value is optional on first read and falls back to a documented
//! default. Write failures are logged and otherwise ignored: losing a
//! setting must never break a running game.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::storage::store::KeyValueStore;

pub const HIGH_SCORE_KEY: &str = "highscoreSaved";
pub const SAVED_TIME_KEY: &str = "savedTime";
pub const MUSIC_VOLUME_KEY: &str = "audioVolume";
pub const EFFECTS_VOLUME_KEY: &str = "audioEffectsVolume";
pub const MUSIC_MUTED_KEY: &str = "audioMusicMuted";
pub const EFFECTS_MUTED_KEY: &str = "audioEffectsMuted";
pub const ZOOM_CONTROLS_KEY: &str = "zoomControlsVisible";
pub const TRIVIA_KEY: &str = "countryTrivia";

/// Player-facing toggles and sliders
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// 0.0 - 1.0, in steps of 0.1
    pub music_volume: f32,
    /// 0.0 - 1.0, in steps of 0.1
    pub effects_volume: f32,
    pub music_muted: bool,
    pub effects_muted: bool,
    pub zoom_controls_visible: bool,
    pub trivia_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            music_volume: 0.5,
            effects_volume: 0.5,
            music_muted: false,
            effects_muted: false,
            zoom_controls_visible: true,
            trivia_enabled: true,
        }
    }
}

/// A single settings change
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SettingChange {
    MusicVolume(f32),
    EffectsVolume(f32),
    MusicMuted(bool),
    EffectsMuted(bool),
    ZoomControls(bool),
    Trivia(bool),
}

/// Snap a slider value to 0.0..=1.0 in tenths
pub fn snap_volume(v: f32) -> f32 {
    if !v.is_finite() {
        return 0.0;
    }
    (v.clamp(0.0, 1.0) * 10.0).round() / 10.0
}

pub struct Preferences {
    store: Box<dyn KeyValueStore>,
}

impl std::fmt::Debug for Preferences {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Preferences").finish_non_exhaustive()
    }
}

impl Preferences {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.store.get(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Ignoring malformed stored value for {}: {}", key, e);
                None
            }
        }
    }

    fn write<T: Serialize>(&mut self, key: &str, value: &T) {
        let encoded = match serde_json::to_string(value) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!("Could not encode {}: {}", key, e);
                return;
            }
        };
        if let Err(e) = self.store.set(key, encoded) {
            tracing::warn!("Could not persist {}: {}", key, e);
        }
    }

    fn remove(&mut self, key: &str) {
        if let Err(e) = self.store.remove(key) {
            tracing::warn!("Could not remove {}: {}", key, e);
        }
    }

    /// Stored high score (0 when absent)
    pub fn high_score(&self) -> u32 {
        self.read(HIGH_SCORE_KEY).unwrap_or(0)
    }

    pub fn set_high_score(&mut self, score: u32) {
        self.write(HIGH_SCORE_KEY, &score);
    }

    /// Saved countdown as (minutes, seconds)
    pub fn saved_time(&self) -> Option<(u32, u32)> {
        self.read::<[u32; 2]>(SAVED_TIME_KEY).map(|[m, s]| (m, s))
    }

    pub fn set_saved_time(&mut self, minutes: u32, seconds: u32) {
        self.write(SAVED_TIME_KEY, &[minutes, seconds]);
    }

    pub fn clear_saved_time(&mut self) {
        self.remove(SAVED_TIME_KEY);
    }

    pub fn settings(&self) -> Settings {
        let d = Settings::default();
        Settings {
            music_volume: self
                .read::<f32>(MUSIC_VOLUME_KEY)
                .map(snap_volume)
                .unwrap_or(d.music_volume),
            effects_volume: self
                .read::<f32>(EFFECTS_VOLUME_KEY)
                .map(snap_volume)
                .unwrap_or(d.effects_volume),
            music_muted: self.read(MUSIC_MUTED_KEY).unwrap_or(d.music_muted),
            effects_muted: self.read(EFFECTS_MUTED_KEY).unwrap_or(d.effects_muted),
            zoom_controls_visible: self
                .read(ZOOM_CONTROLS_KEY)
                .unwrap_or(d.zoom_controls_visible),
            trivia_enabled: self.read(TRIVIA_KEY).unwrap_or(d.trivia_enabled),
        }
    }

    /// Persist one change and return the settings after it
    pub fn apply(&mut self, change: SettingChange) -> Settings {
        match change {
            SettingChange::MusicVolume(v) => self.write(MUSIC_VOLUME_KEY, &snap_volume(v)),
            SettingChange::EffectsVolume(v) => self.write(EFFECTS_VOLUME_KEY, &snap_volume(v)),
            SettingChange::MusicMuted(b) => self.write(MUSIC_MUTED_KEY, &b),
            SettingChange::EffectsMuted(b) => self.write(EFFECTS_MUTED_KEY, &b),
            SettingChange::ZoomControls(b) => self.write(ZOOM_CONTROLS_KEY, &b),
            SettingChange::Trivia(b) => self.write(TRIVIA_KEY, &b),
        }
        self.settings()
    }
}

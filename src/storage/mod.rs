//! Persisted key/value storage and the typed preferences built on it

pub mod preferences;
pub mod store;

pub use preferences::{Preferences, SettingChange, Settings};
pub use store::{JsonFileStore, KeyValueStore, MemoryStore};

pub mod config;
pub mod error;
pub mod types;

pub use config::GameConfig;
pub use error::{GeoError, Result};
pub use types::{Control, Coords, CountryId, Difficulty, GuessOutcome, TimerRole};

use thiserror::Error;

use crate::core::types::Control;
use crate::timer::input::TimerInputError;

#[derive(Error, Debug)]
pub enum GeoError {
    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    #[error("Catalog load failed: {0}")]
    CatalogLoad(String),

    #[error("Invalid timer input: {0}")]
    InvalidTimerInput(#[from] TimerInputError),

    #[error("{0:?} is not available right now")]
    ControlDisabled(Control),

    #[error("Lookup error: {0}")]
    Lookup(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, GeoError>;

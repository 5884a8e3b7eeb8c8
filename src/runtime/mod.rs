//! Async runtime glue

pub mod driver;

pub use driver::{GameDriver, DEFAULT_TICK};

//! Atlas Quiz - geography guessing game core

pub mod catalog;
pub mod command;
pub mod core;
pub mod game;
pub mod lookup;
pub mod runtime;
pub mod storage;
pub mod timer;

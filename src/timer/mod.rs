//! Logical-clock timers: the job scheduler, role-keyed countdowns and
//! the countdown input rules

pub mod countdown;
pub mod input;
pub mod scheduler;

pub use countdown::{Countdown, TickResult, TimerEngine};
pub use input::{format_clock, TimerInput, TimerInputError};
pub use scheduler::{JobKey, Scheduler};

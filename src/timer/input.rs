//! Countdown duration entered by the player as minutes and seconds

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::config::CountdownConfig;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimerInputError {
    #[error("please specify the time")]
    Empty,

    #[error("'{0}' is not a number")]
    NotNumeric(String),

    #[error("time must be at least {minimum}s (got {seconds}s)")]
    BelowMinimum { seconds: u32, minimum: u32 },
}

/// A validated countdown duration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerInput {
    total_seconds: u32,
}

impl TimerInput {
    /// Validate a start request: too short is rejected
    pub fn parse(minutes: &str, seconds: &str, limits: &CountdownConfig) -> Result<Self, TimerInputError> {
        let total = combine(minutes, seconds, limits)?;
        if total < limits.min_seconds {
            return Err(TimerInputError::BelowMinimum {
                seconds: total,
                minimum: limits.min_seconds,
            });
        }
        Ok(Self { total_seconds: total })
    }

    /// Validate a save request: too short is raised to the minimum
    pub fn parse_for_saving(
        minutes: &str,
        seconds: &str,
        limits: &CountdownConfig,
    ) -> Result<Self, TimerInputError> {
        let total = combine(minutes, seconds, limits)?;
        Ok(Self {
            total_seconds: total.max(limits.min_seconds),
        })
    }

    /// Rebuild from stored minutes/seconds, clamped into range
    pub fn from_parts(minutes: u32, seconds: u32, limits: &CountdownConfig) -> Self {
        let total = minutes
            .saturating_mul(60)
            .saturating_add(seconds)
            .clamp(limits.min_seconds, limits.max_seconds);
        Self { total_seconds: total }
    }

    pub fn total_seconds(&self) -> u32 {
        self.total_seconds
    }

    pub fn minutes(&self) -> u32 {
        self.total_seconds / 60
    }

    pub fn seconds(&self) -> u32 {
        self.total_seconds % 60
    }
}

/// Parse both fields, fold seconds into minutes, clamp to the maximum
fn combine(minutes: &str, seconds: &str, limits: &CountdownConfig) -> Result<u32, TimerInputError> {
    let m = parse_field(minutes)?;
    let s = parse_field(seconds)?;
    if m.is_none() && s.is_none() {
        return Err(TimerInputError::Empty);
    }
    let total = m
        .unwrap_or(0)
        .saturating_mul(60)
        .saturating_add(s.unwrap_or(0));
    Ok(total.min(limits.max_seconds))
}

/// Empty is `None`; fractions are truncated, never rounded
fn parse_field(raw: &str) -> Result<Option<u32>, TimerInputError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    let value: f64 = raw
        .parse()
        .map_err(|_| TimerInputError::NotNumeric(raw.to_string()))?;
    if !value.is_finite() || value < 0.0 {
        return Err(TimerInputError::NotNumeric(raw.to_string()));
    }
    Ok(Some(value.trunc().min(u32::MAX as f64) as u32))
}

/// `m:ss`
pub fn format_clock(total_seconds: u32) -> String {
    format!("{}:{:02}", total_seconds / 60, total_seconds % 60)
}

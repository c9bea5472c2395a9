//! User settings and reset-time parsing.
//!
//! # Invariants
//! - `reset_time` is stored as entered (`"HH:MM"`); it is parsed on use so a
//!   malformed persisted value degrades one tick instead of the whole load.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

static RESET_TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([01]?\d|2[0-3]):([0-5]\d)$").expect("valid reset time regex"));

pub const MINUTES_PER_DAY: u32 = 24 * 60;
pub const DEFAULT_RESET_TIME: &str = "23:00";

/// Process-wide planner settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Daily reset time-of-day, `"HH:MM"` 24h.
    #[serde(default = "default_reset_time")]
    pub reset_time: String,
    #[serde(default)]
    pub enable_notify: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            reset_time: default_reset_time(),
            enable_notify: false,
        }
    }
}

impl Settings {
    /// Parses `reset_time`.
    pub fn parsed_reset_time(&self) -> Result<ResetTime, SettingsError> {
        ResetTime::parse(&self.reset_time)
    }
}

fn default_reset_time() -> String {
    DEFAULT_RESET_TIME.to_string()
}

/// Settings value could not be interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    InvalidResetTime(String),
}

impl Display for SettingsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidResetTime(value) => {
                write!(f, "invalid reset time `{value}`; expected HH:MM")
            }
        }
    }
}

impl Error for SettingsError {}

/// Parsed time-of-day for the daily reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetTime {
    hour: u32,
    minute: u32,
}

impl ResetTime {
    pub fn new(hour: u32, minute: u32) -> Result<Self, SettingsError> {
        if hour > 23 || minute > 59 {
            return Err(SettingsError::InvalidResetTime(format!(
                "{hour:02}:{minute:02}"
            )));
        }
        Ok(Self { hour, minute })
    }

    /// Parses `H:MM` or `HH:MM`.
    pub fn parse(value: &str) -> Result<Self, SettingsError> {
        let trimmed = value.trim();
        let invalid = || SettingsError::InvalidResetTime(value.to_string());
        let caps = RESET_TIME_RE.captures(trimmed).ok_or_else(invalid)?;
        let hour = caps[1].parse::<u32>().map_err(|_| invalid())?;
        let minute = caps[2].parse::<u32>().map_err(|_| invalid())?;
        Self::new(hour, minute)
    }

    pub fn minute_of_day(self) -> u32 {
        self.hour * 60 + self.minute
    }
}

impl Display for ResetTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

//! Start-up configuration for checks and monitors.
//!
//! Values are validated once, before anything runs. A monitor that has started
//! never sees a configuration error.

use crate::error::{ConfigError, Result};
use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Resource primary key of the electronic music studio.
pub const DEFAULT_RESOURCE_ID: u32 = 193;

/// Poll interval used when none is given.
pub const DEFAULT_INTERVAL_MINUTES: u64 = 5;

/// IANA zone of the studio's wall clock.
pub const DEFAULT_TIMEZONE: &str = "Europe/Helsinki";

/// The date a check or monitor evaluates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DateTarget {
    /// Whatever the local date is at evaluation time.
    #[default]
    Today,
    Fixed(NaiveDate),
}

impl DateTarget {
    pub fn resolve(&self, today: NaiveDate) -> NaiveDate {
        match self {
            DateTarget::Today => today,
            DateTarget::Fixed(date) => *date,
        }
    }
}

impl FromStr for DateTarget {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("today") {
            return Ok(DateTarget::Today);
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(DateTarget::Fixed)
            .map_err(|_| ConfigError::InvalidDate(s.to_string()))
    }
}

impl fmt::Display for DateTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateTarget::Today => write!(f, "today"),
            DateTarget::Fixed(date) => write!(f, "{date}"),
        }
    }
}

/// Parse an IANA time zone name such as `Europe/Helsinki`.
pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.parse()
        .map_err(|_| ConfigError::InvalidTimezone(name.to_string()))
}

/// Everything a monitor loop needs besides its collaborators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    pub resource: String,
    pub target: DateTarget,
    interval_minutes: u64,
    /// Dispatch a "monitor started" notice before the first tick.
    pub announce_start: bool,
}

impl MonitorConfig {
    /// # Errors
    /// Returns `ConfigError::NonPositiveInterval` when `interval_minutes` is 0.
    pub fn new(resource: impl Into<String>, target: DateTarget, interval_minutes: u64) -> Result<Self> {
        if interval_minutes == 0 {
            return Err(ConfigError::NonPositiveInterval(interval_minutes));
        }
        Ok(Self {
            resource: resource.into(),
            target,
            interval_minutes,
            announce_start: true,
        })
    }

    pub fn without_announcement(mut self) -> Self {
        self.announce_start = false;
        self
    }

    pub fn interval_minutes(&self) -> u64 {
        self.interval_minutes
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_minutes * 60)
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            resource: format!("Studio {DEFAULT_RESOURCE_ID}"),
            target: DateTarget::Today,
            interval_minutes: DEFAULT_INTERVAL_MINUTES,
            announce_start: true,
        }
    }
}

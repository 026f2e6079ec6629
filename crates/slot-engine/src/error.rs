//! Error types for slot-engine operations.
//!
//! Slot derivation itself cannot fail. Errors only arise at the edges: reading
//! reservation data, delivering notices, and validating start-up configuration.

use chrono::Weekday;
use thiserror::Error;

/// Reservation data could not be obtained or understood.
///
/// The monitor loop abandons the current tick on any of these and tries again
/// on the next one.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Failed to read reservation data: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed reservation payload: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Reservation service returned errors: {0}")]
    Remote(String),

    #[error("Unexpected reservation payload: {0}")]
    UnexpectedShape(String),
}

/// A single notification channel failed to deliver a notice.
///
/// Every variant names the channel, so a failure can be attributed from the
/// error alone.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Channel '{channel}' failed: {reason}")]
    Failed { channel: String, reason: String },

    #[error("Channel '{channel}' I/O error: {source}")]
    Io {
        channel: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Channel '{channel}' could not serialize notice: {source}")]
    Serialize {
        channel: String,
        #[source]
        source: serde_json::Error,
    },
}

impl DispatchError {
    pub fn io(channel: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            channel: channel.into(),
            source,
        }
    }

    pub fn serialize(channel: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Serialize {
            channel: channel.into(),
            source,
        }
    }

    /// Name of the channel that failed.
    pub fn channel(&self) -> &str {
        match self {
            Self::Failed { channel, .. } | Self::Io { channel, .. } | Self::Serialize { channel, .. } => {
                channel
            }
        }
    }
}

/// Invalid start-up configuration. Never raised once a monitor is running.
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Invalid date '{0}': expected YYYY-MM-DD or 'today'")]
    InvalidDate(String),

    #[error("Poll interval must be a positive number of minutes, got {0}")]
    NonPositiveInterval(u64),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Opening hours for {0} must open before they close")]
    InvalidHours(Weekday),

    #[error("Duration constraint requires 0 < min <= max (got min={min_minutes}m, max={max_minutes}m)")]
    InvalidConstraint { min_minutes: i64, max_minutes: i64 },

    #[error("Unknown notification target: {0}")]
    UnknownTarget(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

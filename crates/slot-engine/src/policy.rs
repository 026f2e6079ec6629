//! Operating hours and booking-length rules for the studio.

use crate::error::{ConfigError, Result};
use crate::interval::TimeInterval;
use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

/// The part of a calendar day during which the studio can be booked.
pub type OperatingWindow = TimeInterval;

/// Opening and closing wall-clock time for one weekday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpeningHours {
    pub open: NaiveTime,
    pub close: NaiveTime,
}

impl OpeningHours {
    /// Out-of-range literals fail const evaluation.
    pub const fn hm(open_h: u32, open_m: u32, close_h: u32, close_m: u32) -> Self {
        Self {
            open: time(open_h, open_m),
            close: time(close_h, close_m),
        }
    }
}

const fn time(hour: u32, minute: u32) -> NaiveTime {
    match NaiveTime::from_hms_opt(hour, minute, 0) {
        Some(t) => t,
        None => panic!("invalid opening-hours literal"),
    }
}

/// Minimum and maximum length of a single booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationConstraint {
    min: Duration,
    max: Duration,
}

impl DurationConstraint {
    /// Validate `0 < min <= max`.
    pub fn new(min: Duration, max: Duration) -> Result<Self> {
        if min <= Duration::zero() || min > max {
            return Err(ConfigError::InvalidConstraint {
                min_minutes: min.num_minutes(),
                max_minutes: max.num_minutes(),
            });
        }
        Ok(Self { min, max })
    }

    /// Shortest bookable length; gaps below it are not slots.
    pub fn min(&self) -> Duration {
        self.min
    }

    /// Longest single booking; reported slot lengths are capped here.
    pub fn max(&self) -> Duration {
        self.max
    }
}

impl Default for DurationConstraint {
    /// One to four hours.
    fn default() -> Self {
        Self {
            min: Duration::hours(1),
            max: Duration::hours(4),
        }
    }
}

/// Maps a date to its operating window and carries the booking-length rules.
///
/// Weekly hours are indexed Monday-first, one entry per weekday, so the
/// mapping is total by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayPolicy {
    weekly: [OpeningHours; 7],
    constraints: DurationConstraint,
}

impl DayPolicy {
    /// Studio hours: Monday 16:00–20:00, Tuesday–Friday 08:00–20:30,
    /// weekends 10:00–19:30. Bookings last one to four hours.
    pub const STUDIO_HOURS: [OpeningHours; 7] = [
        OpeningHours::hm(16, 0, 20, 0),
        OpeningHours::hm(8, 0, 20, 30),
        OpeningHours::hm(8, 0, 20, 30),
        OpeningHours::hm(8, 0, 20, 30),
        OpeningHours::hm(8, 0, 20, 30),
        OpeningHours::hm(10, 0, 19, 30),
        OpeningHours::hm(10, 0, 19, 30),
    ];

    /// Build a policy from Monday-first weekly hours.
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidHours` naming the first weekday whose
    /// opening time is not strictly before its closing time.
    pub fn new(weekly: [OpeningHours; 7], constraints: DurationConstraint) -> Result<Self> {
        let mut day = Weekday::Mon;
        for hours in &weekly {
            if hours.open >= hours.close {
                return Err(ConfigError::InvalidHours(day));
            }
            day = day.succ();
        }
        Ok(Self {
            weekly,
            constraints,
        })
    }

    pub fn studio() -> Self {
        Self {
            weekly: Self::STUDIO_HOURS,
            constraints: DurationConstraint::default(),
        }
    }

    pub fn hours_for(&self, weekday: Weekday) -> OpeningHours {
        self.weekly[weekday.num_days_from_monday() as usize]
    }

    pub fn window_for(&self, date: NaiveDate) -> OperatingWindow {
        let hours = self.hours_for(date.weekday());
        TimeInterval::new(date.and_time(hours.open), date.and_time(hours.close))
    }

    pub fn constraints(&self) -> DurationConstraint {
        self.constraints
    }
}

impl Default for DayPolicy {
    fn default() -> Self {
        Self::studio()
    }
}

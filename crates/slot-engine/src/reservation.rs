//! Existing reservations for one resource on one date.
//!
//! The booking service answers an `AffectingReservations` GraphQL query with
//! reservations timestamped in UTC (or any RFC 3339 offset). [`decode_payload`]
//! turns that answer into studio-local busy intervals, keeping only active
//! reservations that touch the monitored resource on the requested date.

use crate::error::FetchError;
use crate::interval::TimeInterval;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use chrono_tz::Tz;
use serde::Deserialize;
use serde_json::Value;
use std::ops::Deref;

/// Reservation states that occupy the studio.
pub const ACTIVE_STATES: &[&str] = &[
    "CREATED",
    "CONFIRMED",
    "REQUIRES_HANDLING",
    "WAITING_FOR_PAYMENT",
];

/// Busy intervals for one resource on one date.
///
/// Unsorted and overlapping entries are allowed; the slot engine normalizes
/// them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReservationSet {
    intervals: Vec<TimeInterval>,
}

impl ReservationSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, interval: TimeInterval) {
        self.intervals.push(interval);
    }
}

impl Deref for ReservationSet {
    type Target = [TimeInterval];

    fn deref(&self) -> &[TimeInterval] {
        &self.intervals
    }
}

impl FromIterator<TimeInterval> for ReservationSet {
    fn from_iter<I: IntoIterator<Item = TimeInterval>>(iter: I) -> Self {
        Self {
            intervals: iter.into_iter().collect(),
        }
    }
}

impl From<Vec<TimeInterval>> for ReservationSet {
    fn from(intervals: Vec<TimeInterval>) -> Self {
        Self { intervals }
    }
}

/// Which reservations in a payload belong to the evaluation.
#[derive(Debug, Clone, Copy)]
pub struct ReservationFilter {
    /// Local calendar date being evaluated.
    pub date: NaiveDate,
    /// Resource primary key; `None` keeps reservations for any resource.
    pub resource_id: Option<u32>,
    /// Time zone of the studio's wall clock.
    pub timezone: Tz,
}

/// A reservation as delivered by the booking service.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawReservation {
    pub begins_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub affected_reservation_units: Option<Vec<u32>>,
}

impl RawReservation {
    fn is_active(&self) -> bool {
        self.state
            .as_deref()
            .is_none_or(|s| ACTIVE_STATES.contains(&s))
    }

    fn affects(&self, resource_id: Option<u32>) -> bool {
        match (resource_id, &self.affected_reservation_units) {
            (Some(id), Some(units)) => units.contains(&id),
            _ => true,
        }
    }

    /// Convert to studio-local wall-clock time.
    pub fn to_local(&self, tz: Tz) -> TimeInterval {
        TimeInterval::new(local_time(self.begins_at, tz), local_time(self.ends_at, tz))
    }
}

fn local_time(instant: DateTime<Utc>, tz: Tz) -> NaiveDateTime {
    instant.with_timezone(&tz).naive_local()
}

/// Decode a booking-service payload into the reservations matching `filter`.
///
/// Accepts either a full GraphQL response
/// (`{"data": {"affectingReservations": [...]}}`) or a bare array of
/// reservation objects.
///
/// # Errors
/// - `FetchError::Parse` if the text is not valid JSON or a reservation is
///   missing its timestamps.
/// - `FetchError::Remote` if the response carries GraphQL errors and no data.
/// - `FetchError::UnexpectedShape` for any other JSON shape.
pub fn decode_payload(payload: &str, filter: &ReservationFilter) -> Result<ReservationSet, FetchError> {
    let value: Value = serde_json::from_str(payload)?;
    let raw = extract_reservations(value)?;

    let day = TimeInterval::new(
        filter.date.and_time(NaiveTime::MIN),
        (filter.date + Duration::days(1)).and_time(NaiveTime::MIN),
    );

    Ok(raw
        .iter()
        .filter(|r| r.is_active() && r.affects(filter.resource_id))
        .map(|r| r.to_local(filter.timezone))
        .filter(|interval| interval.overlaps(&day))
        .collect())
}

fn extract_reservations(value: Value) -> Result<Vec<RawReservation>, FetchError> {
    match value {
        Value::Array(_) => Ok(serde_json::from_value(value)?),
        Value::Object(mut map) => {
            let data = map.remove("data").filter(|d| !d.is_null());
            match data {
                Some(mut data) => {
                    let list = data
                        .get_mut("affectingReservations")
                        .map(Value::take)
                        .unwrap_or(Value::Array(Vec::new()));
                    if list.is_null() {
                        return Ok(Vec::new());
                    }
                    Ok(serde_json::from_value(list)?)
                }
                None => match map.remove("errors") {
                    Some(errors) => Err(FetchError::Remote(errors.to_string())),
                    None => Err(FetchError::UnexpectedShape(
                        "object without 'data' or 'errors'".to_string(),
                    )),
                },
            }
        }
        other => Err(FetchError::UnexpectedShape(format!(
            "expected an object or array, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

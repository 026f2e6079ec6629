//! Derive bookable slots for one studio day.
//!
//! Starts from the day's operating window, subtracts existing reservations,
//! trims away time that has already elapsed (only when the date is today),
//! and keeps the gaps that can hold at least one booking of minimum length.

use crate::interval::{self, TimeInterval};
use crate::policy::DayPolicy;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A free window that can hold at least one valid booking.
///
/// `end` is `start` plus the reported duration, which is capped at the
/// policy's maximum booking length. `raw_end` is where the free gap really
/// ends, so `[start, raw_end)` is the whole gap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeSlot {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub raw_end: NaiveDateTime,
    pub duration_minutes: i64,
}

impl FreeSlot {
    /// Identity used for notification de-duplication.
    pub fn key(&self) -> SlotKey {
        SlotKey {
            start: self.start,
            end: self.end,
        }
    }

    /// Length of the full free gap, which may exceed `duration_minutes`.
    pub fn raw_duration_minutes(&self) -> i64 {
        (self.raw_end - self.start).num_minutes()
    }
}

/// The `{start, end}` bounds of a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SlotKey {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// Stateless slot derivation over a [`DayPolicy`].
#[derive(Debug, Clone, Default)]
pub struct SlotDeriver {
    policy: DayPolicy,
}

impl SlotDeriver {
    pub fn new(policy: DayPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &DayPolicy {
        &self.policy
    }

    /// Free gaps left on `date`, trimmed to `now` when `date` is today.
    ///
    /// These are not filtered by booking length and may be arbitrarily short
    /// or long.
    pub fn free_gaps(
        &self,
        date: NaiveDate,
        reservations: &[TimeInterval],
        now: NaiveDateTime,
    ) -> Vec<TimeInterval> {
        let window = self.policy.window_for(date);
        let free = interval::subtract(&window, reservations);

        // Past and future dates are evaluated against their full window.
        if date != now.date() || now <= window.start {
            return free;
        }

        free.into_iter()
            .filter(|gap| gap.end > now)
            .map(|gap| TimeInterval::new(gap.start.max(now), gap.end))
            .collect()
    }

    /// Bookable slots on `date`, ordered by start time.
    ///
    /// Gaps shorter than the minimum booking length are dropped. Longer gaps
    /// produce exactly one slot whose reported length is capped at the
    /// maximum booking length; a long gap is never split into several slots.
    pub fn derive(
        &self,
        date: NaiveDate,
        reservations: &[TimeInterval],
        now: NaiveDateTime,
    ) -> Vec<FreeSlot> {
        let constraints = self.policy.constraints();

        self.free_gaps(date, reservations, now)
            .into_iter()
            .filter(|gap| gap.duration() >= constraints.min())
            .map(|gap| {
                let reported = gap.duration().min(constraints.max());
                FreeSlot {
                    start: gap.start,
                    end: gap.start + reported,
                    raw_end: gap.end,
                    duration_minutes: reported.num_minutes(),
                }
            })
            .collect()
    }
}

/// One-shot slot derivation with the studio's default policy.
pub fn derive(date: NaiveDate, reservations: &[TimeInterval], now: NaiveDateTime) -> Vec<FreeSlot> {
    SlotDeriver::default().derive(date, reservations, now)
}

//! Half-open time intervals and free/busy arithmetic over a single day.
//!
//! Busy intervals are sorted, merged (overlapping *and* adjacent ones become a
//! single block), clipped to the window, and subtracted from it. What is left
//! are the free gaps, in order and pairwise disjoint.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A half-open `[start, end)` range of studio-local wall-clock time.
///
/// Intervals produced by this module always satisfy `start < end`. Raw input
/// with `start >= end` is accepted everywhere and treated as empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimeInterval {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeInterval {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    /// True when the interval covers no time at all (including inverted input).
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Length of the interval, zero for empty intervals.
    pub fn duration(&self) -> Duration {
        if self.is_empty() {
            Duration::zero()
        } else {
            self.end - self.start
        }
    }

    /// True when the two intervals share at least one instant.
    ///
    /// Adjacent intervals (`a.end == b.start`) do not overlap.
    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// The part of `self` inside `bounds`, or `None` if nothing remains.
    pub fn clip_to(&self, bounds: &TimeInterval) -> Option<TimeInterval> {
        let clipped = TimeInterval::new(self.start.max(bounds.start), self.end.min(bounds.end));
        (!clipped.is_empty()).then_some(clipped)
    }
}

/// Merge busy intervals into sorted, disjoint blocks.
///
/// Empty or inverted intervals are dropped. Intervals that overlap or touch
/// (`next.start <= running.end`) are combined, so back-to-back reservations
/// form one continuous busy block.
pub fn merge(intervals: &[TimeInterval]) -> Vec<TimeInterval> {
    let mut sorted: Vec<TimeInterval> = intervals
        .iter()
        .filter(|i| !i.is_empty())
        .copied()
        .collect();

    // Sort by start time (then by end time for stability).
    sorted.sort_by_key(|i| (i.start, i.end));

    let mut merged: Vec<TimeInterval> = Vec::with_capacity(sorted.len());
    for interval in sorted {
        if let Some(last) = merged.last_mut() {
            if interval.start <= last.end {
                last.end = last.end.max(interval.end);
                continue;
            }
        }
        merged.push(interval);
    }

    merged
}

/// Subtract busy intervals from `window`, returning the free gaps.
///
/// Busy blocks entirely outside the window are ignored; partial overlaps are
/// clipped to it first. Zero-length gaps never appear in the result.
pub fn subtract(window: &TimeInterval, busy: &[TimeInterval]) -> Vec<TimeInterval> {
    if window.is_empty() {
        return Vec::new();
    }

    let mut free = Vec::new();
    let mut cursor = window.start;

    for block in merge(busy).iter().filter_map(|b| b.clip_to(window)) {
        if cursor < block.start {
            free.push(TimeInterval::new(cursor, block.start));
        }
        cursor = cursor.max(block.end);
    }

    // Trailing gap after the last busy block.
    if cursor < window.end {
        free.push(TimeInterval::new(cursor, window.end));
    }

    free
}

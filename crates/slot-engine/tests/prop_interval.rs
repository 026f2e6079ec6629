//! Property-based tests for interval merging and subtraction using proptest.
//!
//! These verify invariants that should hold for *any* set of busy intervals,
//! not just the hand-picked examples in `interval_tests.rs`.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use proptest::prelude::*;
use slot_engine::interval::{merge, subtract, TimeInterval};

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn midnight() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 3, 18)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

fn minute(m: i64) -> NaiveDateTime {
    midnight() + Duration::minutes(m)
}

/// The Tuesday–Friday window, 08:00–20:30.
fn window() -> TimeInterval {
    TimeInterval::new(minute(8 * 60), minute(20 * 60 + 30))
}

/// Busy intervals anywhere in the day, possibly inverted or outside the window.
fn arb_raw_interval() -> impl Strategy<Value = TimeInterval> {
    (0i64..1440, 0i64..1440).prop_map(|(a, b)| TimeInterval::new(minute(a), minute(b)))
}

/// Well-formed busy intervals inside the window, on a quarter-hour grid.
fn arb_inner_interval() -> impl Strategy<Value = TimeInterval> {
    (32i64..82, 1i64..16).prop_map(|(start_q, len_q)| {
        let start = start_q * 15;
        let end = (start + len_q * 15).min(20 * 60 + 30);
        TimeInterval::new(minute(start), minute(end))
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn total_minutes(intervals: &[TimeInterval]) -> i64 {
    intervals.iter().map(|i| i.duration().num_minutes()).sum()
}

fn is_sorted_and_disjoint(intervals: &[TimeInterval]) -> bool {
    intervals.windows(2).all(|pair| pair[0].end < pair[1].start)
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn merge_output_is_sorted_disjoint_and_non_empty(busy in prop::collection::vec(arb_raw_interval(), 0..20)) {
        let merged = merge(&busy);
        prop_assert!(merged.iter().all(|i| !i.is_empty()));
        // Adjacent blocks are merged, so consecutive blocks have a real gap.
        prop_assert!(is_sorted_and_disjoint(&merged));
    }

    #[test]
    fn merge_is_idempotent(busy in prop::collection::vec(arb_raw_interval(), 0..20)) {
        let once = merge(&busy);
        prop_assert_eq!(merge(&once), once);
    }

    #[test]
    fn subtract_output_is_sorted_disjoint_and_inside_window(busy in prop::collection::vec(arb_raw_interval(), 0..20)) {
        let w = window();
        let free = subtract(&w, &busy);
        prop_assert!(free.windows(2).all(|pair| pair[0].end <= pair[1].start));
        for gap in &free {
            prop_assert!(!gap.is_empty());
            prop_assert!(gap.start >= w.start && gap.end <= w.end);
        }
    }

    #[test]
    fn free_and_busy_partition_the_window(busy in prop::collection::vec(arb_inner_interval(), 0..12)) {
        let w = window();
        let free = subtract(&w, &busy);
        let merged = merge(&busy);

        // No free gap overlaps a busy block.
        for gap in &free {
            prop_assert!(merged.iter().all(|b| !gap.overlaps(b)));
        }

        // Free plus busy covers the window exactly.
        prop_assert_eq!(total_minutes(&free) + total_minutes(&merged), w.duration().num_minutes());
    }

    #[test]
    fn subtract_is_order_independent(mut busy in prop::collection::vec(arb_raw_interval(), 0..12)) {
        let w = window();
        let forward = subtract(&w, &busy);
        busy.reverse();
        prop_assert_eq!(subtract(&w, &busy), forward);
    }
}

//! Derive free time by inverting busy intervals against a work window.
//!
//! Busy intervals are clipped to the window and sorted, then a cursor walks
//! from the window start emitting every gap it finds.

use chrono::{DateTime, FixedOffset};
use tracing::debug;

use crate::interval::Interval;

/// Free intervals inside `[window_start, window_end]` not covered by `busy`.
///
/// `busy` need not be merged or sorted. A degenerate window (`window_end <=
/// window_start`) yields an empty list rather than an error. The returned
/// intervals are sorted, disjoint and never empty, and together with the
/// clipped busy intervals they cover the window exactly.
pub fn invert(
    window_start: DateTime<FixedOffset>,
    window_end: DateTime<FixedOffset>,
    busy: &[Interval],
) -> Vec<Interval> {
    if window_end <= window_start {
        return Vec::new();
    }

    let mut clipped: Vec<Interval> = busy
        .iter()
        .filter_map(|b| b.clip(window_start, window_end))
        .collect();
    clipped.sort_by_key(|b| (b.start, b.end));

    let mut free = Vec::new();
    let mut cursor = window_start;

    for b in &clipped {
        if b.start > cursor {
            free.push(Interval::new(cursor, b.start));
        }
        cursor = cursor.max(b.end);
        if cursor >= window_end {
            break;
        }
    }

    // Trailing gap after the last busy period.
    if cursor < window_end {
        free.push(Interval::new(cursor, window_end));
    }

    free.retain(|f| !f.is_empty());
    debug!(busy = clipped.len(), free = free.len(), "inverted busy intervals");
    free
}

/// Total whole minutes across a set of intervals.
pub fn total_minutes(intervals: &[Interval]) -> i64 {
    intervals.iter().map(Interval::minutes).sum()
}

//! Interval algebra over timezone-aware instants.
//!
//! Busy data arrives from several calendars, often with mixed UTC offsets.
//! Intervals keep the offset they were parsed with (comparisons are by absolute
//! instant) so that serialised output never silently shifts into UTC.

use chrono::{DateTime, FixedOffset, TimeZone};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::busy::BusyReport;
use crate::error::{PlanError, Result};

/// A half-open time range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interval {
    #[serde(with = "rfc3339")]
    pub start: DateTime<FixedOffset>,
    #[serde(with = "rfc3339")]
    pub end: DateTime<FixedOffset>,
}

impl Interval {
    pub fn new(start: DateTime<FixedOffset>, end: DateTime<FixedOffset>) -> Self {
        Self { start, end }
    }

    /// Length in whole minutes, floor-rounded.
    pub fn minutes(&self) -> i64 {
        (self.end - self.start).num_seconds().div_euclid(60)
    }

    /// True for zero-length and inverted intervals.
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Clip to `[window_start, window_end]`, returning `None` when nothing remains.
    pub fn clip(
        &self,
        window_start: DateTime<FixedOffset>,
        window_end: DateTime<FixedOffset>,
    ) -> Option<Interval> {
        let clipped = Interval::new(self.start.max(window_start), self.end.min(window_end));
        (!clipped.is_empty()).then_some(clipped)
    }

    /// The same absolute range expressed in `tz`.
    pub fn with_timezone<T: TimeZone>(&self, tz: &T) -> Interval {
        Interval::new(
            self.start.with_timezone(tz).fixed_offset(),
            self.end.with_timezone(tz).fixed_offset(),
        )
    }
}

/// Parse an RFC 3339 timestamp, keeping its UTC offset. A trailing `Z` is `+00:00`.
pub fn parse_rfc3339(value: &str) -> Result<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(value.trim()).map_err(|e| PlanError::Parse {
        value: value.to_string(),
        message: e.to_string(),
    })
}

/// Sort and coalesce intervals. Overlapping or touching intervals collapse into one.
///
/// Empty and inverted inputs are discarded first. The result is sorted by start
/// and pairwise disjoint.
pub fn merge_intervals(intervals: impl IntoIterator<Item = Interval>) -> Vec<Interval> {
    let mut sorted: Vec<Interval> = intervals.into_iter().filter(|i| !i.is_empty()).collect();
    sorted.sort_by_key(|i| (i.start, i.end));

    let mut merged: Vec<Interval> = Vec::with_capacity(sorted.len());
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

/// Parse every busy record in `report` and merge them into one busy timeline.
///
/// # Errors
/// Returns [`PlanError::Parse`](crate::PlanError::Parse) on the first malformed timestamp.
pub fn merge(report: &BusyReport) -> Result<Vec<Interval>> {
    let mut parsed = Vec::new();
    for (calendar_id, calendar) in &report.calendars {
        for raw in &calendar.busy {
            parsed.push(raw.parse()?);
        }
        debug!(calendar = %calendar_id, records = calendar.busy.len(), "collected busy records");
    }

    let merged = merge_intervals(parsed);
    debug!(merged = merged.len(), "merged busy intervals");
    Ok(merged)
}

/// Re-express every interval in `tz` without moving any instant.
pub fn normalize_timezone<T: TimeZone>(intervals: &[Interval], tz: &T) -> Vec<Interval> {
    intervals.iter().map(|i| i.with_timezone(tz)).collect()
}

/// Serde adapter writing `DateTime<FixedOffset>` as RFC 3339 with its own offset.
pub(crate) mod rfc3339 {
    use chrono::{DateTime, FixedOffset};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(dt: &DateTime<FixedOffset>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&dt.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<FixedOffset>, D::Error> {
        let raw = String::deserialize(d)?;
        DateTime::parse_from_rfc3339(raw.trim()).map_err(de::Error::custom)
    }
}


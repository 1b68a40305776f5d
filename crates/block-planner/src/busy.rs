//! Busy data as reported by an external free/busy query.
//!
//! The wire shape is keyed by calendar identifier:
//!
//! ```json
//! {"work@example.com": {"busy": [{"start": "2025-01-01T09:00:00Z", "end": "2025-01-01T10:00:00Z"}]}}
//! ```
//!
//! Fields other than `busy` (for example per-calendar `errors`) are ignored.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::interval::{parse_rfc3339, Interval};

/// One raw `{start, end}` record, still as RFC 3339 strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawInterval {
    pub start: String,
    pub end: String,
}

impl RawInterval {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Parse both timestamps. Inverted results are returned as-is; callers filter them.
    pub fn parse(&self) -> Result<Interval> {
        Ok(Interval::new(
            parse_rfc3339(&self.start)?,
            parse_rfc3339(&self.end)?,
        ))
    }
}

/// Busy records for a single calendar.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarBusy {
    #[serde(default)]
    pub busy: Vec<RawInterval>,
}

/// Calendar id → busy records. Ordered by calendar id so iteration is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BusyReport {
    pub calendars: BTreeMap<String, CalendarBusy>,
}

impl BusyReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode the JSON shape shown in the module docs.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Append one busy record to `calendar_id`.
    pub fn with_busy(
        mut self,
        calendar_id: impl Into<String>,
        start: impl Into<String>,
        end: impl Into<String>,
    ) -> Self {
        self.calendars
            .entry(calendar_id.into())
            .or_default()
            .busy
            .push(RawInterval::new(start, end));
        self
    }

    /// Keep only the calendars named in `ids`. An empty list keeps everything.
    pub fn retain_calendars(&self, ids: &[String]) -> BusyReport {
        if ids.is_empty() {
            return self.clone();
        }
        let calendars = self
            .calendars
            .iter()
            .filter(|(id, _)| ids.iter().any(|wanted| wanted == *id))
            .map(|(id, busy)| (id.clone(), busy.clone()))
            .collect();
        BusyReport { calendars }
    }

    /// Total number of raw records across all calendars.
    pub fn record_count(&self) -> usize {
        self.calendars.values().map(|c| c.busy.len()).sum()
    }
}

/// Split a comma-separated calendar id list, dropping blanks.
///
/// `"a, b,,c"` yields `["a", "b", "c"]`; an empty string yields an empty list.
pub fn parse_calendar_ids(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

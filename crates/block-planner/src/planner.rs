//! End-to-end day planning: busy report in, proposed blocks out.
//!
//! This is the function-call contract an HTTP or CLI layer drives. It builds
//! the work window for one local date, validates it, then runs
//! merge → normalize → invert → allocate.

use chrono::{
    DateTime, Duration, FixedOffset, LocalResult, NaiveDate, NaiveDateTime, Offset, TimeZone,
};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::allocator::{propose_blocks, shortfalls, Goal, ProposedBlock, Shortfall};
use crate::busy::BusyReport;
use crate::error::{PlanError, Result};
use crate::freetime::{invert, total_minutes};
use crate::interval::{self, normalize_timezone, rfc3339, Interval};
use crate::settings::{resolve_settings, PlannerSettings, PlannerSettingsInput};

pub const DEFAULT_TIMEZONE: &str = "America/Toronto";
pub const DEFAULT_WINDOW_START_HOUR: u32 = 4;
pub const DEFAULT_WINDOW_END_HOUR: u32 = 22;

fn default_tz() -> String {
    DEFAULT_TIMEZONE.to_string()
}

fn default_start_hour() -> u32 {
    DEFAULT_WINDOW_START_HOUR
}

fn default_end_hour() -> u32 {
    DEFAULT_WINDOW_END_HOUR
}

/// Deep Work 120, Admin 30, Break/Lunch 30.
pub fn default_goals() -> Vec<Goal> {
    vec![
        Goal::new("Deep Work", 120),
        Goal::new("Admin", 30),
        Goal::new("Break/Lunch", 30),
    ]
}

/// A request to plan one local day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanRequest {
    /// Target date, `YYYY-MM-DD`.
    pub date: String,
    /// IANA timezone the window is built in and results are expressed in.
    #[serde(default = "default_tz")]
    pub tz: String,
    #[serde(default = "default_start_hour")]
    pub window_start_hour: u32,
    #[serde(default = "default_end_hour")]
    pub window_end_hour: u32,
    #[serde(default = "default_goals")]
    pub goals: Vec<Goal>,
    /// Calendars whose busy time counts. Empty means all of them.
    #[serde(default)]
    pub calendar_ids: Vec<String>,
    #[serde(flatten)]
    pub settings: PlannerSettingsInput,
}

impl PlanRequest {
    pub fn new(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            tz: default_tz(),
            window_start_hour: DEFAULT_WINDOW_START_HOUR,
            window_end_hour: DEFAULT_WINDOW_END_HOUR,
            goals: default_goals(),
            calendar_ids: Vec::new(),
            settings: PlannerSettingsInput::default(),
        }
    }
}

/// A free interval annotated with its length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeSlot {
    #[serde(with = "rfc3339")]
    pub start: DateTime<FixedOffset>,
    #[serde(with = "rfc3339")]
    pub end: DateTime<FixedOffset>,
    pub minutes: i64,
}

impl From<&Interval> for FreeSlot {
    fn from(interval: &Interval) -> Self {
        Self {
            start: interval.start,
            end: interval.end,
            minutes: interval.minutes(),
        }
    }
}

/// Everything a caller needs to render or act on a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanOutcome {
    pub date: String,
    pub tz: String,
    pub window: Interval,
    pub planner_settings: PlannerSettings,
    pub busy: Vec<Interval>,
    pub free_slots: Vec<FreeSlot>,
    pub proposed_blocks: Vec<ProposedBlock>,
    /// Goals that could not be fully scheduled.
    pub shortfalls: Vec<Shortfall>,
}

/// Look up an IANA timezone name.
pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.parse()
        .map_err(|_| PlanError::InvalidTimezone(name.to_string()))
}

/// Build `[date start_hour:00, date end_hour:00]` in `tz`.
///
/// # Errors
/// - [`PlanError::InvalidDate`] for a malformed date or an hour above 23.
///
/// An hour skipped by a DST change is read with the pre-change offset and
/// lands just after the gap; a repeated hour takes its first occurrence.
/// - [`PlanError::InvalidWindow`] when the end is not after the start.
pub fn planning_window(
    date: &str,
    tz: &Tz,
    start_hour: u32,
    end_hour: u32,
) -> Result<(DateTime<FixedOffset>, DateTime<FixedOffset>)> {
    let day = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|e| PlanError::InvalidDate(format!("'{}': {}", date, e)))?;

    let at_hour = |hour: u32| -> Result<DateTime<FixedOffset>> {
        let naive = day
            .and_hms_opt(hour, 0, 0)
            .ok_or_else(|| PlanError::InvalidDate(format!("hour {} is not in 0-23", hour)))?;
        resolve_local(tz, naive)
            .ok_or_else(|| PlanError::InvalidDate(format!("{} does not exist in {}", naive, tz)))
    };

    let start = at_hour(start_hour)?;
    let end = at_hour(end_hour)?;
    if end <= start {
        return Err(PlanError::InvalidWindow {
            start: start.to_rfc3339(),
            end: end.to_rfc3339(),
        });
    }
    Ok((start, end))
}

/// Resolve a local wall-clock time in `tz`, expressed with the offset in force there.
///
/// An ambiguous time (clocks going back) takes the earlier instant. A time in
/// a gap (clocks going forward) is read with the offset from before the
/// change, so 02:00 on a spring-forward night in Toronto becomes 03:00 EDT.
fn resolve_local(tz: &Tz, naive: NaiveDateTime) -> Option<DateTime<FixedOffset>> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => Some(dt.fixed_offset()),
        LocalResult::None => {
            let before = tz
                .from_local_datetime(&(naive - Duration::hours(1)))
                .earliest()?;
            let offset = before.offset().fix();
            let utc = naive - Duration::seconds(i64::from(offset.local_minus_utc()));
            Some(tz.from_utc_datetime(&utc).fixed_offset())
        }
    }
}

/// Plan one day from a busy report.
///
/// `env_demo` carries demo mode switched on from the environment.
///
/// # Errors
/// Request validation errors from [`planning_window`] and
/// [`resolve_settings`], plus [`PlanError::Parse`] for malformed busy data.
/// Under-allocation is not an error: see [`PlanOutcome::shortfalls`].
pub fn plan_day(request: &PlanRequest, busy: &BusyReport, env_demo: bool) -> Result<PlanOutcome> {
    let tz = parse_timezone(&request.tz)?;
    let (window_start, window_end) = planning_window(
        &request.date,
        &tz,
        request.window_start_hour,
        request.window_end_hour,
    )?;
    let settings = resolve_settings(&request.settings, env_demo)?;

    let report = busy.retain_calendars(&request.calendar_ids);
    debug!(
        calendars = report.calendars.len(),
        records = report.record_count(),
        "planning from busy report"
    );
    let merged = interval::merge(&report)?;
    let busy = normalize_timezone(&merged, &tz);
    let free = invert(window_start, window_end, &busy);

    let outcome = allocate(
        request,
        &tz,
        Interval::new(window_start, window_end),
        settings,
        busy,
        &free,
    );
    info!(
        date = %request.date,
        free_minutes = total_minutes(&free),
        blocks = outcome.proposed_blocks.len(),
        shortfalls = outcome.shortfalls.len(),
        "planned day"
    );
    Ok(outcome)
}

/// Allocate goals into `free` and express every output instant in `tz`.
///
/// Blocks carry the offset of the slot they were cut from, which is stale
/// for any block after a DST change inside that slot.
fn allocate(
    request: &PlanRequest,
    tz: &Tz,
    window: Interval,
    planner_settings: PlannerSettings,
    busy: Vec<Interval>,
    free: &[Interval],
) -> PlanOutcome {
    let options = planner_settings.allocation_options();
    let proposed_blocks: Vec<ProposedBlock> = propose_blocks(free, &request.goals, &options)
        .iter()
        .map(|block| block.with_timezone(tz))
        .collect();
    let shortfalls = shortfalls(&request.goals, &proposed_blocks);
    for missing in &shortfalls {
        debug!(label = %missing.label, remaining = missing.remaining, "could not fully schedule goal");
    }

    PlanOutcome {
        date: request.date.clone(),
        tz: request.tz.clone(),
        window: window.with_timezone(tz),
        planner_settings,
        busy,
        free_slots: free
            .iter()
            .map(|slot| FreeSlot::from(&slot.with_timezone(tz)))
            .collect(),
        proposed_blocks,
        shortfalls,
    }
}

/// Deterministic offline plan that needs no busy data.
///
/// One 100 minute slot (09:00–10:40 America/Toronto on 2025-12-29), goals
/// Deep Work 60 and Admin 30, a 10 minute buffer and demo minimum blocks.
/// Both goals fit, separated by the buffer.
pub fn demo_plan() -> Result<PlanOutcome> {
    let tz = chrono_tz::America::Toronto;
    let (start, end) = planning_window("2025-12-29", &tz, 9, 10)?;
    let slot = Interval::new(start, end + Duration::minutes(40));

    let mut request = PlanRequest::new("2025-12-29");
    request.goals = vec![Goal::new("Deep Work", 60), Goal::new("Admin", 30)];
    request.settings = PlannerSettingsInput {
        buffer_minutes: Some(10),
        demo_mode: Some(true),
        ..PlannerSettingsInput::default()
    };
    let settings = resolve_settings(&request.settings, false)?;

    Ok(allocate(&request, &tz, slot, settings, Vec::new(), &[slot]))
}

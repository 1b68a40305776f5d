//! # block-planner
//!
//! Deterministic time-blocking for calendar agents.
//!
//! Turns busy intervals reported by one or more calendars into a conflict-free
//! set of labelled work blocks inside a bounded window, honouring per-label
//! minimum block sizes, buffers between blocks and a soft priority order.
//! Everything here is pure and synchronous; fetching busy data and writing
//! events belong to the caller.
//!
//! ## Modules
//!
//! - [`interval`] — RFC 3339 parsing, merging and timezone normalisation
//! - [`busy`] — Free/busy report wire shape and calendar filtering
//! - [`freetime`] — Invert busy intervals into free intervals within a window
//! - [`allocator`] — Pack goals into free intervals (`propose_blocks`)
//! - [`policy`] — Minimum block sizes, priority preferences, allocation options
//! - [`settings`] — Validate caller-supplied planner knobs
//! - [`planner`] — One-call day planning pipeline
//! - [`drafts`] — Calendar-event payloads for proposed blocks
//! - [`error`] — Error types

pub mod allocator;
pub mod busy;
pub mod drafts;
pub mod error;
pub mod freetime;
pub mod interval;
pub mod planner;
pub mod policy;
pub mod settings;

pub use allocator::{propose_blocks, shortfalls, Goal, ProposedBlock, Shortfall};
pub use busy::{BusyReport, CalendarBusy, RawInterval};
pub use drafts::{draft_events, EventDraft};
pub use error::PlanError;
pub use freetime::invert;
pub use interval::{merge, merge_intervals, normalize_timezone, parse_rfc3339, Interval};
pub use planner::{demo_plan, plan_day, FreeSlot, PlanOutcome, PlanRequest};
pub use policy::{AllocationOptions, MinBlockPolicy, PlanningPreferences};
pub use settings::{resolve_settings, PlannerSettings, PlannerSettingsInput};

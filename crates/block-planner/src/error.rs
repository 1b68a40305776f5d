//! Error types for block-planner operations.

use thiserror::Error;

/// Errors surfaced by parsing and by the planning layer.
///
/// The interval, free-time and allocation functions are total and never
/// return these; only input decoding and request validation do.
#[derive(Error, Debug)]
pub enum PlanError {
    /// A busy or window timestamp was not valid RFC 3339.
    #[error("Invalid timestamp '{value}': {message}")]
    Parse { value: String, message: String },

    /// The planning window ends at or before its start.
    #[error("Invalid window: end {end} must be after start {start}")]
    InvalidWindow { start: String, end: String },

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// A planner setting fell outside its allowed range.
    #[error("Invalid setting: {0}")]
    InvalidSetting(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PlanError>;

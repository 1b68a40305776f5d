//! Resolve caller-supplied planner knobs into validated allocation options.
//!
//! Explicit values always win. Demo mode, when on, supplies friendlier
//! minimum block sizes (Deep Work 30, Admin 30) but only if the caller gave no
//! overrides of its own.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::error::{PlanError, Result};
use crate::policy::{AllocationOptions, MinBlockPolicy, PlanningPreferences, DEFAULT_BUFFER_MINUTES};

/// Environment variable that turns demo mode on when truthy.
pub const DEMO_MODE_ENV: &str = "PLANNER_DEMO_MODE";

/// Environment variable restricting which calendars contribute busy time.
pub const PLANNING_CALENDARS_ENV: &str = "PLANNING_CALENDAR_IDS";

pub const BUFFER_RANGE: RangeInclusive<i64> = 0..=60;
pub const MIN_BLOCK_RANGE: RangeInclusive<i64> = 5..=240;

pub const DEMO_MIN_BLOCKS: &[(&str, u32)] = &[("Deep Work", 30), ("Admin", 30)];

/// Unvalidated planner knobs, as they arrive from a request or config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannerSettingsInput {
    #[serde(default)]
    pub buffer_minutes: Option<i64>,
    #[serde(default)]
    pub min_block_minutes_by_label: Option<BTreeMap<String, i64>>,
    #[serde(default)]
    pub demo_mode: Option<bool>,
    #[serde(default)]
    pub priority_order: Option<Vec<String>>,
}

impl PlannerSettingsInput {
    /// Fill every unset field of `self` from `fallback`.
    pub fn or(self, fallback: PlannerSettingsInput) -> PlannerSettingsInput {
        PlannerSettingsInput {
            buffer_minutes: self.buffer_minutes.or(fallback.buffer_minutes),
            min_block_minutes_by_label: self
                .min_block_minutes_by_label
                .or(fallback.min_block_minutes_by_label),
            demo_mode: self.demo_mode.or(fallback.demo_mode),
            priority_order: self.priority_order.or(fallback.priority_order),
        }
    }
}

/// Validated settings, echoed back to callers alongside a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannerSettings {
    pub buffer_minutes: u32,
    pub min_block_minutes_by_label: Option<BTreeMap<String, u32>>,
    pub demo_mode_applied: bool,
    pub priority_order: Option<Vec<String>>,
}

impl PlannerSettings {
    /// Allocation options on top of the built-in minimum block table.
    pub fn allocation_options(&self) -> AllocationOptions {
        let min_blocks = match &self.min_block_minutes_by_label {
            Some(overrides) => MinBlockPolicy::default()
                .with_overrides(overrides.iter().map(|(label, minutes)| (label.clone(), *minutes))),
            None => MinBlockPolicy::default(),
        };
        AllocationOptions::default()
            .with_buffer(self.buffer_minutes)
            .with_min_blocks(min_blocks)
            .with_preferences(PlanningPreferences {
                priority_order: self.priority_order.clone(),
            })
    }
}

/// Validate `input` and apply defaults.
///
/// `env_demo` is OR-ed with `input.demo_mode`.
///
/// # Errors
/// Returns [`PlanError::InvalidSetting`] when the buffer is outside 0–60
/// minutes or any minimum block is outside 5–240 minutes.
pub fn resolve_settings(input: &PlannerSettingsInput, env_demo: bool) -> Result<PlannerSettings> {
    let buffer = input.buffer_minutes.unwrap_or(i64::from(DEFAULT_BUFFER_MINUTES));
    if !BUFFER_RANGE.contains(&buffer) {
        return Err(PlanError::InvalidSetting(format!(
            "buffer_minutes must be between {} and {}, got {}",
            BUFFER_RANGE.start(),
            BUFFER_RANGE.end(),
            buffer
        )));
    }

    let mut min_blocks = match &input.min_block_minutes_by_label {
        Some(raw) => Some(coerce_min_blocks(raw)?),
        None => None,
    };

    let demo_on = input.demo_mode.unwrap_or(false) || env_demo;
    if demo_on && min_blocks.is_none() {
        min_blocks = Some(
            DEMO_MIN_BLOCKS
                .iter()
                .map(|(label, minutes)| (label.to_string(), *minutes))
                .collect(),
        );
    }

    Ok(PlannerSettings {
        buffer_minutes: buffer as u32,
        min_block_minutes_by_label: min_blocks,
        demo_mode_applied: demo_on,
        priority_order: input.priority_order.clone(),
    })
}

fn coerce_min_blocks(raw: &BTreeMap<String, i64>) -> Result<BTreeMap<String, u32>> {
    raw.iter()
        .map(|(label, minutes)| {
            if MIN_BLOCK_RANGE.contains(minutes) {
                Ok((label.clone(), *minutes as u32))
            } else {
                Err(PlanError::InvalidSetting(format!(
                    "min_block_minutes_by_label['{}'] must be between {} and {}, got {}",
                    label,
                    MIN_BLOCK_RANGE.start(),
                    MIN_BLOCK_RANGE.end(),
                    minutes
                )))
            }
        })
        .collect()
}

/// Interpret an environment value such as `1`, `true`, `yes`, `y` or `on`.
pub fn env_truthy(value: Option<&str>) -> bool {
    matches!(
        value.map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Some("1" | "true" | "yes" | "y" | "on")
    )
}

//! Allocation configuration: minimum block sizes, priority preferences, buffers.
//!
//! All of this is passed into the allocator per call. There are no global
//! tables; [`MinBlockPolicy::default`] carries the baseline values.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::allocator::Goal;

/// Minimum block size for labels with no explicit or built-in entry.
pub const FALLBACK_MIN_BLOCK_MINUTES: u32 = 15;

/// Default gap inserted between consecutive blocks in one free interval.
pub const DEFAULT_BUFFER_MINUTES: u32 = 10;

/// Built-in per-label minimum block sizes.
pub const BUILTIN_MIN_BLOCKS: &[(&str, u32)] =
    &[("Deep Work", 60), ("Admin", 30), ("Break/Lunch", 15)];

/// Per-label minimum block sizes.
///
/// Resolution order: explicit override, then built-in default, then
/// [`FALLBACK_MIN_BLOCK_MINUTES`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinBlockPolicy {
    #[serde(default = "builtin_defaults")]
    pub defaults: BTreeMap<String, u32>,
    #[serde(default)]
    pub overrides: BTreeMap<String, u32>,
    #[serde(default = "default_fallback")]
    pub fallback: u32,
}

fn default_fallback() -> u32 {
    FALLBACK_MIN_BLOCK_MINUTES
}

fn builtin_defaults() -> BTreeMap<String, u32> {
    BUILTIN_MIN_BLOCKS
        .iter()
        .map(|(label, minutes)| (label.to_string(), *minutes))
        .collect()
}

impl Default for MinBlockPolicy {
    fn default() -> Self {
        Self {
            defaults: builtin_defaults(),
            overrides: BTreeMap::new(),
            fallback: FALLBACK_MIN_BLOCK_MINUTES,
        }
    }
}

impl MinBlockPolicy {
    /// A policy with no built-in table: every label resolves to `fallback`
    /// unless overridden.
    pub fn flat(fallback: u32) -> Self {
        Self {
            defaults: BTreeMap::new(),
            overrides: BTreeMap::new(),
            fallback,
        }
    }

    pub fn with_override(mut self, label: impl Into<String>, minutes: u32) -> Self {
        self.overrides.insert(label.into(), minutes);
        self
    }

    pub fn with_overrides<I, S>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (S, u32)>,
        S: Into<String>,
    {
        self.overrides
            .extend(overrides.into_iter().map(|(label, minutes)| (label.into(), minutes)));
        self
    }

    /// Minimum block size for `label`, never below one minute.
    pub fn resolve(&self, label: &str) -> u32 {
        self.overrides
            .get(label)
            .or_else(|| self.defaults.get(label))
            .copied()
            .unwrap_or(self.fallback)
            .max(1)
    }
}

/// Soft ordering constraints applied to goals before allocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanningPreferences {
    /// Labels to schedule first, in this order. Goals not named keep their
    /// original relative order after the named ones.
    #[serde(default)]
    pub priority_order: Option<Vec<String>>,
}

impl PlanningPreferences {
    pub fn with_priority<I, S>(order: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            priority_order: Some(order.into_iter().map(Into::into).collect()),
        }
    }

    /// Reorder `goals` by `priority_order`.
    ///
    /// Labels in the priority list that match no goal are ignored, as are
    /// repeated mentions. Without a priority list the input order is kept.
    pub fn order_goals(&self, goals: &[Goal]) -> Vec<Goal> {
        let Some(priority) = &self.priority_order else {
            return goals.to_vec();
        };

        let mut taken = vec![false; goals.len()];
        let mut ordered = Vec::with_capacity(goals.len());

        for label in priority {
            for (index, goal) in goals.iter().enumerate() {
                if !taken[index] && &goal.label == label {
                    taken[index] = true;
                    ordered.push(goal.clone());
                }
            }
        }
        ordered.extend(
            goals
                .iter()
                .zip(&taken)
                .filter(|(_, taken)| !**taken)
                .map(|(goal, _)| goal.clone()),
        );
        ordered
    }
}

/// Everything `propose_blocks` needs besides the free intervals and goals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationOptions {
    #[serde(default = "default_buffer")]
    pub buffer_minutes: u32,
    #[serde(default)]
    pub min_blocks: MinBlockPolicy,
    #[serde(default)]
    pub preferences: PlanningPreferences,
}

fn default_buffer() -> u32 {
    DEFAULT_BUFFER_MINUTES
}

impl Default for AllocationOptions {
    fn default() -> Self {
        Self {
            buffer_minutes: DEFAULT_BUFFER_MINUTES,
            min_blocks: MinBlockPolicy::default(),
            preferences: PlanningPreferences::default(),
        }
    }
}

impl AllocationOptions {
    pub fn with_buffer(mut self, minutes: u32) -> Self {
        self.buffer_minutes = minutes;
        self
    }

    pub fn with_min_blocks(mut self, policy: MinBlockPolicy) -> Self {
        self.min_blocks = policy;
        self
    }

    pub fn with_preferences(mut self, preferences: PlanningPreferences) -> Self {
        self.preferences = preferences;
        self
    }
}

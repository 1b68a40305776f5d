//! Optional TOML configuration for the `planner` binary.
//!
//! ```toml
//! [planner]
//! buffer_minutes = 15
//! demo_mode = false
//! priority_order = ["Admin", "Deep Work"]
//! calendar_ids = ["work@example.com"]
//!
//! [planner.min_block_minutes_by_label]
//! "Deep Work" = 45
//! ```
//!
//! Values from a plan request win over the file; the file wins over built-in defaults.

use std::path::Path;

use anyhow::{Context, Result};
use block_planner::PlannerSettingsInput;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub planner: PlannerSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlannerSection {
    #[serde(flatten)]
    pub settings: PlannerSettingsInput,
    #[serde(default)]
    pub calendar_ids: Vec<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("Invalid config file: {}", path.display()))
    }

    pub fn parse(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Load `path` if given, otherwise an empty configuration.
    pub fn load_optional(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

//! `planner` CLI — merge free/busy data, derive free time, and propose work blocks.
//!
//! ## Usage
//!
//! ```sh
//! # Merge busy intervals from a free/busy report (stdin → stdout)
//! cat freebusy.json | planner merge --tz America/Toronto
//!
//! # Free time inside a window
//! planner free -i freebusy.json --start 2025-12-15T08:00:00-05:00 --end 2025-12-15T18:00:00-05:00
//!
//! # Plan a day: {"request": {...}, "busy": {...}}
//! planner plan -i day.json --config planner.toml
//!
//! # Offline demo, no busy data needed
//! planner demo
//!
//! # Calendar-event drafts from a plan
//! planner plan -i day.json | planner drafts --tz America/Toronto
//! ```

mod config;
mod logging;

use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use block_planner::busy::parse_calendar_ids;
use block_planner::planner::parse_timezone;
use block_planner::settings::{env_truthy, DEMO_MODE_ENV, PLANNING_CALENDARS_ENV};
use block_planner::{
    demo_plan, draft_events, invert, merge, normalize_timezone, parse_rfc3339, plan_day,
    BusyReport, PlanError, PlanRequest, ProposedBlock,
};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::FileConfig;

#[derive(Parser)]
#[command(
    name = "planner",
    version,
    about = "Deterministic work-block planner over calendar free/busy data"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML configuration file with a [planner] table
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Comma-separated calendar ids whose busy time counts (default: all)
    #[arg(long, global = true)]
    calendars: Option<String>,

    /// Log debug detail to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge busy intervals from a free/busy report
    Merge {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Express results in this IANA timezone
        #[arg(long)]
        tz: Option<String>,
    },
    /// Compute free intervals inside a window
    Free {
        #[arg(short, long)]
        input: Option<String>,
        #[arg(short, long)]
        output: Option<String>,
        /// Window start (RFC 3339)
        #[arg(long)]
        start: String,
        /// Window end (RFC 3339)
        #[arg(long)]
        end: String,
        /// Normalise busy intervals to this IANA timezone first
        #[arg(long)]
        tz: Option<String>,
    },
    /// Plan a day from {"request": {...}, "busy": {...}}
    Plan {
        #[arg(short, long)]
        input: Option<String>,
        #[arg(short, long)]
        output: Option<String>,
        /// Force demo-mode minimum blocks
        #[arg(long)]
        demo: bool,
    },
    /// Print the offline demo plan
    Demo {
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Build calendar-event drafts from a plan or a list of blocks
    Drafts {
        #[arg(short, long)]
        input: Option<String>,
        #[arg(short, long)]
        output: Option<String>,
        /// IANA timezone recorded on each draft
        #[arg(long)]
        tz: String,
    },
}

/// Input document for `planner plan`.
#[derive(Deserialize)]
struct PlanInput {
    request: PlanRequest,
    #[serde(default)]
    busy: BusyReport,
}

/// `planner drafts` accepts either a full plan outcome or a bare block list.
#[derive(Deserialize)]
#[serde(untagged)]
enum DraftsInput {
    Blocks(Vec<ProposedBlock>),
    Outcome { proposed_blocks: Vec<ProposedBlock> },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logger(cli.verbose, cli.log_json);

    let file_config = FileConfig::load_optional(cli.config.as_deref())?;

    match cli.command {
        Commands::Merge { input, output, tz } => {
            let report = read_busy(input.as_deref())?;
            let mut merged = merge(&report).context("Failed to merge busy intervals")?;
            if let Some(name) = tz.as_deref() {
                merged = normalize_timezone(&merged, &parse_timezone(name)?);
            }
            write_json(output.as_deref(), &merged)?;
        }
        Commands::Free {
            input,
            output,
            start,
            end,
            tz,
        } => {
            let window_start = parse_rfc3339(&start).context("Invalid --start")?;
            let window_end = parse_rfc3339(&end).context("Invalid --end")?;
            if window_end <= window_start {
                return Err(PlanError::InvalidWindow { start, end }.into());
            }

            let report = read_busy(input.as_deref())?;
            let mut busy = merge(&report).context("Failed to merge busy intervals")?;
            if let Some(name) = tz.as_deref() {
                busy = normalize_timezone(&busy, &parse_timezone(name)?);
            }
            let free = invert(window_start, window_end, &busy);
            write_json(output.as_deref(), &free)?;
        }
        Commands::Plan {
            input,
            output,
            demo,
        } => {
            let raw = read_input(input.as_deref())?;
            let PlanInput { mut request, busy } =
                serde_json::from_str(&raw).context("Invalid plan input JSON")?;

            request.settings = request.settings.or(file_config.planner.settings.clone());
            if demo {
                request.settings.demo_mode = Some(true);
            }
            request.calendar_ids = resolve_calendar_ids(
                cli.calendars.as_deref(),
                request.calendar_ids,
                &file_config.planner.calendar_ids,
            );
            let env_demo = env_truthy(std::env::var(DEMO_MODE_ENV).ok().as_deref());

            let outcome = plan_day(&request, &busy, env_demo).context("Failed to plan day")?;
            for missing in &outcome.shortfalls {
                warn!(
                    label = %missing.label,
                    remaining = missing.remaining,
                    "could not fully schedule goal"
                );
            }
            write_json(output.as_deref(), &outcome)?;
        }
        Commands::Demo { output } => {
            let outcome = demo_plan().context("Failed to build demo plan")?;
            write_json(output.as_deref(), &outcome)?;
        }
        Commands::Drafts { input, output, tz } => {
            parse_timezone(&tz)?;
            let raw = read_input(input.as_deref())?;
            let parsed: DraftsInput =
                serde_json::from_str(&raw).context("Invalid drafts input JSON")?;
            let blocks = match parsed {
                DraftsInput::Blocks(blocks) => blocks,
                DraftsInput::Outcome { proposed_blocks } => proposed_blocks,
            };
            write_json(output.as_deref(), &draft_events(&blocks, &tz))?;
        }
    }

    Ok(())
}

/// Calendar ids, first non-empty of: `--calendars`, the request, the config
/// file, then the `PLANNING_CALENDAR_IDS` environment variable.
fn resolve_calendar_ids(
    flag: Option<&str>,
    from_request: Vec<String>,
    from_config: &[String],
) -> Vec<String> {
    if let Some(raw) = flag {
        return parse_calendar_ids(raw);
    }
    if !from_request.is_empty() {
        return from_request;
    }
    if !from_config.is_empty() {
        return from_config.to_vec();
    }
    let from_env = std::env::var(PLANNING_CALENDARS_ENV)
        .map(|raw| parse_calendar_ids(&raw))
        .unwrap_or_default();
    debug!(calendars = ?from_env, "calendar filter from environment");
    from_env
}

fn read_busy(path: Option<&str>) -> Result<BusyReport> {
    let raw = read_input(path)?;
    BusyReport::from_json(&raw).context("Invalid free/busy JSON")
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_json<T: Serialize + ?Sized>(path: Option<&str>, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match path {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            println!("{}", json);
        }
    }
    Ok(())
}

//! WASM bindings for block-planner.
//!
//! Exposes busy merging, free-time inversion, block allocation and the day
//! planner to JavaScript via `wasm-bindgen`. All complex types cross the
//! boundary as JSON strings; timestamps are RFC 3339 and keep their offsets.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p block-planner-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target nodejs --out-dir packages/block-planner-js/wasm/ \
//!   target/wasm32-unknown-unknown/release/block_planner_wasm.wasm
//! ```

use block_planner::planner::parse_timezone;
use block_planner::{
    AllocationOptions, BusyReport, Goal, Interval, PlanRequest, ProposedBlock,
};
use serde::Serialize;
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// Plain-Rust implementations (errors as strings, testable off-wasm)
// ---------------------------------------------------------------------------

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("Serialization error: {}", e))
}

fn parse_json<'a, T: serde::Deserialize<'a>>(json: &'a str, what: &str) -> Result<T, String> {
    serde_json::from_str(json).map_err(|e| format!("Invalid {} JSON: {}", what, e))
}

fn merge_busy_impl(busy_json: &str, tz: Option<&str>) -> Result<String, String> {
    let report: BusyReport = parse_json(busy_json, "busy")?;
    let mut merged = block_planner::merge(&report).map_err(|e| e.to_string())?;
    if let Some(name) = tz {
        let tz = parse_timezone(name).map_err(|e| e.to_string())?;
        merged = block_planner::normalize_timezone(&merged, &tz);
    }
    to_json(&merged)
}

fn invert_busy_impl(busy_json: &str, window_start: &str, window_end: &str) -> Result<String, String> {
    let report: BusyReport = parse_json(busy_json, "busy")?;
    let start = block_planner::parse_rfc3339(window_start).map_err(|e| e.to_string())?;
    let end = block_planner::parse_rfc3339(window_end).map_err(|e| e.to_string())?;
    let busy = block_planner::merge(&report).map_err(|e| e.to_string())?;
    to_json(&block_planner::invert(start, end, &busy))
}

fn propose_blocks_impl(
    free_json: &str,
    goals_json: &str,
    options_json: Option<&str>,
) -> Result<String, String> {
    let free: Vec<Interval> = parse_json(free_json, "free intervals")?;
    let goals: Vec<Goal> = parse_json(goals_json, "goals")?;
    let options: AllocationOptions = match options_json {
        Some(json) => parse_json(json, "options")?,
        None => AllocationOptions::default(),
    };
    to_json(&block_planner::propose_blocks(&free, &goals, &options))
}

fn plan_day_impl(request_json: &str, busy_json: &str) -> Result<String, String> {
    let request: PlanRequest = parse_json(request_json, "plan request")?;
    let report: BusyReport = parse_json(busy_json, "busy")?;
    let outcome = block_planner::plan_day(&request, &report, false).map_err(|e| e.to_string())?;
    to_json(&outcome)
}

fn draft_events_impl(blocks_json: &str, tz: &str) -> Result<String, String> {
    parse_timezone(tz).map_err(|e| e.to_string())?;
    let blocks: Vec<ProposedBlock> = parse_json(blocks_json, "blocks")?;
    to_json(&block_planner::draft_events(&blocks, tz))
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// Merge a free/busy report (`{calendarId: {busy: [{start, end}]}}`) into a
/// sorted, non-overlapping JSON array of `{start, end}`.
///
/// When `tz` is given, results are expressed in that IANA timezone.
#[wasm_bindgen(js_name = "mergeBusy")]
pub fn merge_busy(busy_json: &str, tz: Option<String>) -> Result<String, JsValue> {
    merge_busy_impl(busy_json, tz.as_deref()).map_err(|e| JsValue::from_str(&e))
}

/// Free intervals inside `[window_start, window_end]` for a free/busy report.
#[wasm_bindgen(js_name = "invertBusy")]
pub fn invert_busy(busy_json: &str, window_start: &str, window_end: &str) -> Result<String, JsValue> {
    invert_busy_impl(busy_json, window_start, window_end).map_err(|e| JsValue::from_str(&e))
}

/// Allocate goals (`[{label, minutes}]`) into free intervals (`[{start, end}]`).
///
/// `options_json` may set `buffer_minutes`, `min_blocks.overrides` and
/// `preferences.priority_order`; omitted fields take their defaults.
#[wasm_bindgen(js_name = "proposeBlocks")]
pub fn propose_blocks(
    free_json: &str,
    goals_json: &str,
    options_json: Option<String>,
) -> Result<String, JsValue> {
    propose_blocks_impl(free_json, goals_json, options_json.as_deref())
        .map_err(|e| JsValue::from_str(&e))
}

/// Run the full day planner. Returns the plan outcome as JSON.
#[wasm_bindgen(js_name = "planDay")]
pub fn plan_day(request_json: &str, busy_json: &str) -> Result<String, JsValue> {
    plan_day_impl(request_json, busy_json).map_err(|e| JsValue::from_str(&e))
}

/// The deterministic offline demo plan.
#[wasm_bindgen(js_name = "demoPlan")]
pub fn demo_plan() -> Result<String, JsValue> {
    block_planner::demo_plan()
        .map_err(|e| e.to_string())
        .and_then(|outcome| to_json(&outcome))
        .map_err(|e| JsValue::from_str(&e))
}

/// Calendar-event drafts for a JSON array of proposed blocks.
#[wasm_bindgen(js_name = "draftEvents")]
pub fn draft_events(blocks_json: &str, tz: &str) -> Result<String, JsValue> {
    draft_events_impl(blocks_json, tz).map_err(|e| JsValue::from_str(&e))
}

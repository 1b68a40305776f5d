//! Pack labelled goal durations into free intervals.
//!
//! Free intervals are walked chronologically. Inside each interval a cursor
//! advances block by block, re-scanning goals in priority order after every
//! placement. Before placing a goal the allocator reserves room for the next
//! goal that still has minutes left (its minimum block plus one buffer), so a
//! long goal can be shortened to let a smaller one follow it in the same gap:
//! with an 80 minute gap and a 10 minute buffer, Deep Work 60 becomes 40 so
//! that Admin 30 still fits.
//!
//! A goal whose minimum block fits nowhere is simply left unscheduled; use
//! [`shortfalls`] to report what could not be placed.

use chrono::{DateTime, Duration, FixedOffset, TimeZone};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::interval::{rfc3339, Interval};
use crate::policy::AllocationOptions;

/// A named amount of time to schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub label: String,
    pub minutes: u32,
}

impl Goal {
    pub fn new(label: impl Into<String>, minutes: u32) -> Self {
        Self {
            label: label.into(),
            minutes,
        }
    }
}

/// One contiguous allocation of time to a goal label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposedBlock {
    pub label: String,
    #[serde(with = "rfc3339")]
    pub start: DateTime<FixedOffset>,
    #[serde(with = "rfc3339")]
    pub end: DateTime<FixedOffset>,
    pub minutes: i64,
}

impl ProposedBlock {
    /// The same block with both ends expressed in `tz`.
    pub fn with_timezone<T: TimeZone>(&self, tz: &T) -> ProposedBlock {
        ProposedBlock {
            label: self.label.clone(),
            start: self.start.with_timezone(tz).fixed_offset(),
            end: self.end.with_timezone(tz).fixed_offset(),
            minutes: self.minutes,
        }
    }
}

/// Minutes of a goal that could not be scheduled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shortfall {
    pub label: String,
    pub requested: i64,
    pub scheduled: i64,
    pub remaining: i64,
}

/// Mutable per-label bookkeeping for one allocation run.
#[derive(Debug)]
struct GoalState {
    label: String,
    remaining: i64,
    min_block: i64,
}

/// Fold repeated labels into their first occurrence, summing the minutes.
pub fn collapse_goals(goals: &[Goal]) -> Vec<Goal> {
    let mut collapsed: Vec<Goal> = Vec::with_capacity(goals.len());
    for goal in goals {
        match collapsed.iter_mut().find(|g| g.label == goal.label) {
            Some(existing) => existing.minutes = existing.minutes.saturating_add(goal.minutes),
            None => collapsed.push(goal.clone()),
        }
    }
    collapsed
}

/// Allocate `goals` into `free` and return the proposed blocks sorted by start.
///
/// `free` need not be sorted. Goals are visited in the order produced by
/// `options.preferences` (named labels first, the rest in input order), and a
/// label is never allocated more than its target across the whole run.
///
/// Every emitted block is at least the label's resolved minimum block size.
/// Inside one free interval consecutive blocks are separated by
/// `options.buffer_minutes`; no buffer trails the last block.
pub fn propose_blocks(
    free: &[Interval],
    goals: &[Goal],
    options: &AllocationOptions,
) -> Vec<ProposedBlock> {
    let ordered = options.preferences.order_goals(&collapse_goals(goals));
    let mut ledger: Vec<GoalState> = ordered
        .into_iter()
        .map(|goal| GoalState {
            min_block: i64::from(options.min_blocks.resolve(&goal.label)),
            remaining: i64::from(goal.minutes),
            label: goal.label,
        })
        .collect();

    let mut slots: Vec<&Interval> = free.iter().filter(|slot| !slot.is_empty()).collect();
    slots.sort_by_key(|slot| (slot.start, slot.end));

    let buffer = i64::from(options.buffer_minutes);
    let mut blocks = Vec::new();
    for slot in slots {
        pack_slot(slot, &mut ledger, buffer, &mut blocks);
    }

    blocks.sort_by_key(|block| block.start);
    debug!(blocks = blocks.len(), "proposed blocks");
    blocks
}

/// Fill a single free interval, pushing each placement onto `out`.
fn pack_slot(slot: &Interval, ledger: &mut [GoalState], buffer: i64, out: &mut Vec<ProposedBlock>) {
    let mut cursor = slot.start;
    let mut remaining_in_slot = slot.minutes();

    while remaining_in_slot > 0 {
        let Some((index, alloc)) = next_placement(ledger, remaining_in_slot, buffer) else {
            break;
        };

        let goal = &mut ledger[index];
        let end = cursor + Duration::minutes(alloc);
        trace!(label = %goal.label, start = %cursor, minutes = alloc, "placed block");
        out.push(ProposedBlock {
            label: goal.label.clone(),
            start: cursor,
            end,
            minutes: alloc,
        });
        goal.remaining -= alloc;
        cursor = end;
        remaining_in_slot -= alloc;

        // Buffers only ever separate two blocks; if one cannot fit the slot is done.
        if remaining_in_slot > 0 && remaining_in_slot >= buffer {
            cursor = cursor + Duration::minutes(buffer);
            remaining_in_slot -= buffer;
        } else {
            remaining_in_slot = 0;
        }
    }
}

/// Pick the first goal, in priority order, that can be placed in the space left.
///
/// Returns the ledger index and the minutes to allocate.
fn next_placement(ledger: &[GoalState], remaining_in_slot: i64, buffer: i64) -> Option<(usize, i64)> {
    for (index, goal) in ledger.iter().enumerate() {
        if goal.remaining <= 0 || remaining_in_slot < goal.min_block {
            continue;
        }

        let reserve = ledger[index + 1..]
            .iter()
            .find(|next| next.remaining > 0)
            .map_or(0, |next| buffer + next.min_block);
        let alloc_cap = (remaining_in_slot - reserve).max(0);

        let alloc = if alloc_cap >= goal.min_block {
            goal.remaining.min(alloc_cap)
        } else {
            goal.remaining.min(remaining_in_slot)
        };

        if alloc < goal.min_block {
            continue;
        }
        return Some((index, alloc));
    }
    None
}

/// Per-label minutes requested but not scheduled, in goal input order.
///
/// Labels that were fully scheduled are omitted.
pub fn shortfalls(goals: &[Goal], blocks: &[ProposedBlock]) -> Vec<Shortfall> {
    collapse_goals(goals)
        .into_iter()
        .filter_map(|goal| {
            let requested = i64::from(goal.minutes);
            let scheduled: i64 = blocks
                .iter()
                .filter(|block| block.label == goal.label)
                .map(|block| block.minutes)
                .sum();
            let remaining = (requested - scheduled).max(0);
            (remaining > 0).then(|| Shortfall {
                label: goal.label,
                requested,
                scheduled,
                remaining,
            })
        })
        .collect()
}

//! Calendar-event drafts built from proposed blocks.
//!
//! Drafts are the payloads a calendar writer would submit. Nothing here talks
//! to a calendar service.

use serde::{Deserialize, Serialize};

use crate::allocator::ProposedBlock;

pub const DEFAULT_DESCRIPTION: &str = "Drafted by block-planner (not created yet).";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTime {
    /// RFC 3339 timestamp with the block's own offset.
    pub date_time: String,
    /// IANA timezone name the event should be displayed in.
    pub time_zone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDraft {
    pub summary: String,
    pub start: EventTime,
    pub end: EventTime,
    pub description: String,
}

impl EventDraft {
    pub fn from_block(block: &ProposedBlock, tz_name: &str, description: &str) -> Self {
        Self {
            summary: block.label.clone(),
            start: EventTime {
                date_time: block.start.to_rfc3339(),
                time_zone: tz_name.to_string(),
            },
            end: EventTime {
                date_time: block.end.to_rfc3339(),
                time_zone: tz_name.to_string(),
            },
            description: description.to_string(),
        }
    }
}

/// One draft per block, in block order, with [`DEFAULT_DESCRIPTION`].
pub fn draft_events(blocks: &[ProposedBlock], tz_name: &str) -> Vec<EventDraft> {
    blocks
        .iter()
        .map(|block| EventDraft::from_block(block, tz_name, DEFAULT_DESCRIPTION))
        .collect()
}

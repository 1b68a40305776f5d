//! Property-based tests for merging, inversion and allocation using proptest.
//!
//! All generated times are whole minutes from a fixed base, so coverage can be
//! compared exactly by sampling every minute.

use std::collections::BTreeMap;

use block_planner::interval::{merge_intervals, parse_rfc3339, Interval};
use block_planner::{
    invert, propose_blocks, AllocationOptions, Goal, MinBlockPolicy, PlanningPreferences,
};
use chrono::{DateTime, Duration, FixedOffset};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn base() -> DateTime<FixedOffset> {
    parse_rfc3339("2026-03-16T00:00:00Z").unwrap()
}

fn at(minute: i64) -> DateTime<FixedOffset> {
    base() + Duration::minutes(minute)
}

/// Raw intervals, including empty and inverted ones.
fn arb_raw_interval() -> impl Strategy<Value = Interval> {
    (0i64..1440, -60i64..240).prop_map(|(start, len)| Interval::new(at(start), at(start + len)))
}

fn arb_busy() -> impl Strategy<Value = Vec<Interval>> {
    prop::collection::vec(arb_raw_interval(), 0..12)
}

fn arb_window() -> impl Strategy<Value = (i64, i64)> {
    (0i64..600, 0i64..900).prop_map(|(start, len)| (start, start + len))
}

fn arb_label() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Deep Work".to_string()),
        Just("Admin".to_string()),
        Just("Break/Lunch".to_string()),
        Just("Reading".to_string()),
    ]
}

fn arb_goals() -> impl Strategy<Value = Vec<Goal>> {
    prop::collection::vec((arb_label(), 0u32..240), 0..5)
        .prop_map(|pairs| pairs.into_iter().map(|(l, m)| Goal::new(l, m)).collect())
}

fn arb_options() -> impl Strategy<Value = AllocationOptions> {
    (
        0u32..=60,
        prop::option::of(5u32..=90),
        prop::option::of(prop::sample::subsequence(
            vec!["Reading", "Admin", "Deep Work", "Break/Lunch"],
            0..4,
        )),
    )
        .prop_map(|(buffer, deep_work_min, priority)| {
            let mut min_blocks = MinBlockPolicy::default();
            if let Some(minutes) = deep_work_min {
                min_blocks = min_blocks.with_override("Deep Work", minutes);
            }
            let preferences = match priority {
                Some(order) => PlanningPreferences::with_priority(order),
                None => PlanningPreferences::default(),
            };
            AllocationOptions::default()
                .with_buffer(buffer)
                .with_min_blocks(min_blocks)
                .with_preferences(preferences)
        })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn covers(intervals: &[Interval], minute: i64) -> bool {
    let t = at(minute);
    intervals.iter().any(|i| i.start <= t && t < i.end)
}

fn assert_sorted_disjoint(intervals: &[Interval]) -> Result<(), TestCaseError> {
    for pair in intervals.windows(2) {
        prop_assert!(pair[0].end < pair[1].start, "not disjoint: {:?}", pair);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn merge_is_sorted_disjoint_and_preserves_union(busy in arb_busy()) {
        let merged = merge_intervals(busy.clone());

        prop_assert!(merged.iter().all(|i| !i.is_empty()));
        assert_sorted_disjoint(&merged)?;

        let valid: Vec<Interval> = busy.into_iter().filter(|i| !i.is_empty()).collect();
        for minute in -60..1700 {
            prop_assert_eq!(covers(&valid, minute), covers(&merged, minute), "minute {}", minute);
        }
    }

    #[test]
    fn free_and_busy_partition_the_window(busy in arb_busy(), (ws, we) in arb_window()) {
        let free = invert(at(ws), at(we), &busy);

        prop_assert!(free.iter().all(|f| !f.is_empty()));
        assert_sorted_disjoint(&free)?;

        let clipped: Vec<Interval> = busy.iter().filter_map(|b| b.clip(at(ws), at(we))).collect();
        prop_assert!(clipped.iter().all(|b| !b.is_empty()));

        for minute in ws..we {
            let in_free = covers(&free, minute);
            let in_busy = covers(&clipped, minute);
            prop_assert!(in_free != in_busy, "minute {} free={} busy={}", minute, in_free, in_busy);
        }
        prop_assert!(free.iter().all(|f| f.start >= at(ws) && f.end <= at(we)));
    }

    #[test]
    fn allocation_conserves_minutes_and_respects_minimums(
        busy in arb_busy(),
        (ws, we) in arb_window(),
        goals in arb_goals(),
        options in arb_options(),
    ) {
        let free = invert(at(ws), at(we), &busy);
        let blocks = propose_blocks(&free, &goals, &options);

        let mut targets: BTreeMap<&str, i64> = BTreeMap::new();
        for goal in &goals {
            *targets.entry(goal.label.as_str()).or_default() += i64::from(goal.minutes);
        }
        let mut allocated: BTreeMap<&str, i64> = BTreeMap::new();
        for block in &blocks {
            *allocated.entry(block.label.as_str()).or_default() += block.minutes;
            prop_assert!(block.minutes >= i64::from(options.min_blocks.resolve(&block.label)));
            prop_assert_eq!(block.end - block.start, Duration::minutes(block.minutes));
        }
        for (label, minutes) in &allocated {
            prop_assert!(*minutes <= targets[label], "{} over-allocated", label);
        }
    }

    #[test]
    fn blocks_fit_slots_without_overlap_and_keep_buffers(
        busy in arb_busy(),
        (ws, we) in arb_window(),
        goals in arb_goals(),
        options in arb_options(),
    ) {
        let free = invert(at(ws), at(we), &busy);
        let blocks = propose_blocks(&free, &goals, &options);
        let buffer = Duration::minutes(i64::from(options.buffer_minutes));

        for pair in blocks.windows(2) {
            prop_assert!(pair[0].end <= pair[1].start);
        }
        for slot in &free {
            let inside: Vec<_> = blocks
                .iter()
                .filter(|b| b.start >= slot.start && b.start < slot.end)
                .collect();
            for block in &inside {
                prop_assert!(block.end <= slot.end);
            }
            for pair in inside.windows(2) {
                prop_assert!(pair[1].start - pair[0].end >= buffer);
            }
        }
        // Every block lies in some free slot.
        for block in &blocks {
            prop_assert!(free.iter().any(|s| block.start >= s.start && block.end <= s.end));
        }
    }

    #[test]
    fn named_priority_label_takes_first_block_when_both_fit(
        pair in prop::sample::subsequence(vec!["Deep Work", "Admin", "Break/Lunch", "Reading"], 2),
        extra in (0u32..120, 0u32..120),
        buffer in 0u32..=30,
        slack in 0i64..120,
        start in 0i64..600,
    ) {
        let policy = MinBlockPolicy::default();
        let (listed_first, named_first) = (pair[0], pair[1]);
        let goals = vec![
            Goal::new(listed_first, policy.resolve(listed_first) + extra.0),
            Goal::new(named_first, policy.resolve(named_first) + extra.1),
        ];
        let options = AllocationOptions::default()
            .with_buffer(buffer)
            .with_preferences(PlanningPreferences::with_priority([named_first]));

        let both_minimums = i64::from(policy.resolve(listed_first) + policy.resolve(named_first));
        let end = start + both_minimums + i64::from(buffer) + slack;
        let later = Interval::new(at(end + 60), at(end + 600));
        let free = vec![later, Interval::new(at(start), at(end))];

        let blocks = propose_blocks(&free, &goals, &options);

        prop_assert!(!blocks.is_empty());
        prop_assert_eq!(blocks[0].start, at(start));
        prop_assert_eq!(blocks[0].label.as_str(), named_first);
    }

    #[test]
    fn allocation_is_deterministic(
        busy in arb_busy(),
        (ws, we) in arb_window(),
        goals in arb_goals(),
        options in arb_options(),
    ) {
        let free = invert(at(ws), at(we), &busy);
        let first = serde_json::to_string(&propose_blocks(&free, &goals, &options)).unwrap();
        let second = serde_json::to_string(&propose_blocks(&free, &goals, &options)).unwrap();
        prop_assert_eq!(first, second);
    }
}

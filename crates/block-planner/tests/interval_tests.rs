//! Tests for busy-report parsing, interval merging and timezone normalisation.

use block_planner::interval::{merge, merge_intervals, normalize_timezone, parse_rfc3339, Interval};
use block_planner::{BusyReport, PlanError};

// ── Helpers ─────────────────────────────────────────────────────────────────

fn interval(start: &str, end: &str) -> Interval {
    Interval::new(parse_rfc3339(start).unwrap(), parse_rfc3339(end).unwrap())
}

// ── Parsing ─────────────────────────────────────────────────────────────────

#[test]
fn z_suffix_parses_as_utc() {
    let dt = parse_rfc3339("2025-01-01T09:00:00Z").unwrap();
    assert_eq!(dt.offset().local_minus_utc(), 0);
    assert_eq!(dt, parse_rfc3339("2025-01-01T04:00:00-05:00").unwrap());
}

#[test]
fn offset_is_preserved_through_parse() {
    let dt = parse_rfc3339("2025-12-29T09:00:00-05:00").unwrap();
    assert_eq!(dt.to_rfc3339(), "2025-12-29T09:00:00-05:00");
}

#[test]
fn malformed_timestamp_is_a_parse_error() {
    let err = parse_rfc3339("2025-01-01 nine o'clock").unwrap_err();
    match err {
        PlanError::Parse { value, .. } => assert_eq!(value, "2025-01-01 nine o'clock"),
        other => panic!("expected Parse error, got {other:?}"),
    }
}

#[test]
fn minutes_floor_partial_minutes() {
    let i = interval("2025-01-01T09:00:00Z", "2025-01-01T09:10:59Z");
    assert_eq!(i.minutes(), 10);
}

// ── merge_intervals ─────────────────────────────────────────────────────────

#[test]
fn overlapping_intervals_collapse() {
    let merged = merge_intervals(vec![
        interval("2025-01-01T10:00:00Z", "2025-01-01T11:30:00Z"),
        interval("2025-01-01T11:00:00Z", "2025-01-01T12:00:00Z"),
    ]);
    assert_eq!(
        merged,
        vec![interval("2025-01-01T10:00:00Z", "2025-01-01T12:00:00Z")]
    );
}

#[test]
fn touching_intervals_collapse() {
    let merged = merge_intervals(vec![
        interval("2025-01-01T09:00:00Z", "2025-01-01T10:00:00Z"),
        interval("2025-01-01T10:00:00Z", "2025-01-01T11:00:00Z"),
    ]);
    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].end, parse_rfc3339("2025-01-01T11:00:00Z").unwrap());
}

#[test]
fn contained_interval_does_not_shrink_end() {
    let merged = merge_intervals(vec![
        interval("2025-01-01T09:00:00Z", "2025-01-01T12:00:00Z"),
        interval("2025-01-01T10:00:00Z", "2025-01-01T10:30:00Z"),
    ]);
    assert_eq!(
        merged,
        vec![interval("2025-01-01T09:00:00Z", "2025-01-01T12:00:00Z")]
    );
}

#[test]
fn unsorted_input_comes_out_sorted() {
    let merged = merge_intervals(vec![
        interval("2025-01-01T14:00:00Z", "2025-01-01T15:00:00Z"),
        interval("2025-01-01T09:00:00Z", "2025-01-01T10:00:00Z"),
    ]);
    assert_eq!(merged.len(), 2);
    assert!(merged[0].start < merged[1].start);
}

#[test]
fn empty_and_inverted_intervals_are_dropped() {
    let merged = merge_intervals(vec![
        interval("2025-01-01T09:00:00Z", "2025-01-01T09:00:00Z"),
        interval("2025-01-01T11:00:00Z", "2025-01-01T10:00:00Z"),
    ]);
    assert!(merged.is_empty());
}

// ── merge(BusyReport) ───────────────────────────────────────────────────────

#[test]
fn merges_busy_across_calendars() {
    let json = r#"{
        "work": {"busy": [
            {"start": "2025-01-01T09:00:00Z", "end": "2025-01-01T10:00:00Z"},
            {"start": "2025-01-01T14:00:00Z", "end": "2025-01-01T15:00:00Z"}
        ]},
        "personal": {"busy": [
            {"start": "2025-01-01T04:30:00-05:00", "end": "2025-01-01T05:30:00-05:00"}
        ]}
    }"#;
    let report = BusyReport::from_json(json).unwrap();

    let merged = merge(&report).unwrap();

    // personal 09:30Z-10:30Z overlaps work 09:00Z-10:00Z.
    assert_eq!(merged.len(), 2);
    assert_eq!(merged[0], interval("2025-01-01T09:00:00Z", "2025-01-01T10:30:00Z"));
    assert_eq!(merged[1], interval("2025-01-01T14:00:00Z", "2025-01-01T15:00:00Z"));
}

#[test]
fn calendar_without_busy_key_is_empty() {
    let report = BusyReport::from_json(r#"{"cal1": {"errors": [{"reason": "notFound"}]}}"#).unwrap();
    assert!(merge(&report).unwrap().is_empty());
}

#[test]
fn malformed_busy_record_fails_merge() {
    let report = BusyReport::new().with_busy("cal1", "not-a-time", "2025-01-01T10:00:00Z");
    assert!(matches!(merge(&report), Err(PlanError::Parse { .. })));
}

#[test]
fn malformed_json_is_a_json_error() {
    assert!(matches!(
        BusyReport::from_json("{not json"),
        Err(PlanError::Json(_))
    ));
}

#[test]
fn retain_calendars_filters_by_id() {
    let report = BusyReport::new()
        .with_busy("a", "2025-01-01T09:00:00Z", "2025-01-01T10:00:00Z")
        .with_busy("b", "2025-01-01T11:00:00Z", "2025-01-01T12:00:00Z");

    let only_b = report.retain_calendars(&["b".to_string()]);
    assert_eq!(only_b.calendars.len(), 1);
    assert!(only_b.calendars.contains_key("b"));

    let all = report.retain_calendars(&[]);
    assert_eq!(all.record_count(), 2);
}

#[test]
fn calendar_id_list_drops_blanks() {
    assert_eq!(
        block_planner::busy::parse_calendar_ids(" a, b,,c "),
        vec!["a", "b", "c"]
    );
    assert!(block_planner::busy::parse_calendar_ids("").is_empty());
}

// ── normalize_timezone ──────────────────────────────────────────────────────

#[test]
fn normalize_keeps_instants_and_changes_offset() {
    let utc = vec![interval("2025-12-29T14:00:00Z", "2025-12-29T15:00:00Z")];
    let toronto = normalize_timezone(&utc, &chrono_tz::America::Toronto);

    assert_eq!(toronto[0], utc[0]);
    assert_eq!(toronto[0].start.to_rfc3339(), "2025-12-29T09:00:00-05:00");
    assert_eq!(toronto[0].end.to_rfc3339(), "2025-12-29T10:00:00-05:00");
}

#[test]
fn normalize_handles_mixed_offsets() {
    let mixed = vec![
        interval("2025-07-01T12:00:00Z", "2025-07-01T13:00:00Z"),
        interval("2025-07-01T15:00:00+02:00", "2025-07-01T16:00:00+02:00"),
    ];
    let toronto = normalize_timezone(&mixed, &chrono_tz::America::Toronto);

    // Summer: Toronto is UTC-4.
    assert_eq!(toronto[0].start.to_rfc3339(), "2025-07-01T08:00:00-04:00");
    assert_eq!(toronto[1].start.to_rfc3339(), "2025-07-01T09:00:00-04:00");
}

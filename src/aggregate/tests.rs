// Partition tests over realistic wakelock/service overlap shapes.

use super::*;
use crate::types::{Entry, Timestamp, Value};

fn entry(start: Timestamp, end: Timestamp, name: &str, id: u32) -> Entry {
    Entry::original(start, end, Value::Text(name.to_string()), id)
}

fn names(cell: &AggregatedEntry) -> Vec<String> {
    cell.services.iter().map(|s| s.value.key_string()).collect()
}

fn spans(cells: &[AggregatedEntry]) -> Vec<(Timestamp, Timestamp)> {
    cells.iter().map(|c| (c.start, c.end)).collect()
}

#[test]
fn test_two_overlapping_holders() {
    let entries = vec![entry(0, 100, "s1", 0), entry(25, 150, "s2", 1)];
    let cells = aggregate(&entries);

    assert_eq!(spans(&cells), vec![(0, 25), (25, 100), (100, 150)]);
    assert_eq!(names(&cells[0]), vec!["s1"]);
    assert_eq!(names(&cells[1]), vec!["s1", "s2"]);
    assert_eq!(names(&cells[2]), vec!["s2"]);
}

#[test]
fn test_identical_spans_share_one_cell() {
    let entries = vec![entry(10, 90, "s1", 0), entry(10, 90, "s2", 1)];
    let cells = aggregate(&entries);

    assert_eq!(spans(&cells), vec![(10, 90)]);
    assert_eq!(names(&cells[0]), vec!["s1", "s2"]);
}

#[test]
fn test_nested_holder_splits_outer() {
    let entries = vec![entry(0, 100, "outer", 0), entry(25, 75, "inner", 1)];
    let cells = aggregate(&entries);

    assert_eq!(spans(&cells), vec![(0, 25), (25, 75), (75, 100)]);
    assert_eq!(names(&cells[1]), vec!["outer", "inner"]);
    assert_eq!(names(&cells[2]), vec!["outer"]);
}

#[test]
fn test_disjoint_entries_stay_disjoint() {
    let entries = vec![entry(0, 10, "a", 0), entry(20, 30, "b", 1)];
    let cells = aggregate(&entries);
    assert_eq!(spans(&cells), vec![(0, 10), (20, 30)]);
}

#[test]
fn test_entry_spanning_a_gap_fills_it() {
    // [0,10) and [20,30) exist; [5,25) must cover the gap in between.
    let entries = vec![
        entry(0, 10, "a", 0),
        entry(5, 25, "b", 1),
        entry(20, 30, "c", 2),
    ];
    let cells = aggregate(&entries);

    assert_eq!(
        spans(&cells),
        vec![(0, 5), (5, 10), (10, 20), (20, 25), (25, 30)]
    );
    assert_eq!(names(&cells[2]), vec!["b"]);
    assert_eq!(names(&cells[3]), vec!["b", "c"]);
    assert_eq!(names(&cells[4]), vec!["c"]);
}

#[test]
fn test_entry_extending_past_partition_end() {
    let entries = vec![entry(0, 50, "a", 0), entry(0, 120, "b", 1)];
    let cells = aggregate(&entries);

    assert_eq!(spans(&cells), vec![(0, 50), (50, 120)]);
    assert_eq!(names(&cells[0]), vec!["a", "b"]);
    assert_eq!(names(&cells[1]), vec!["b"]);
}

#[test]
fn test_instant_events_pass_through() {
    let entries = vec![
        entry(0, 100, "held", 0),
        entry(40, 40, "plug", 1),
        entry(100, 100, "unplug", 2),
    ];
    let cells = aggregate(&entries);

    let zero_width: Vec<_> = cells.iter().filter(|c| c.start == c.end).collect();
    assert_eq!(zero_width.len(), 2);
    assert_eq!(names(zero_width[0]), vec!["plug"]);
    assert_eq!(names(zero_width[1]), vec!["unplug"]);

    // The spanning cell is untouched by the instants.
    let spanning: Vec<_> = cells.iter().filter(|c| c.start < c.end).collect();
    assert_eq!(spanning.len(), 1);
    assert_eq!((spanning[0].start, spanning[0].end), (0, 100));
}

#[test]
fn test_outputs_never_overlap() {
    let entries = vec![
        entry(0, 300, "a", 0),
        entry(50, 100, "b", 1),
        entry(60, 280, "c", 2),
        entry(90, 400, "d", 3),
        entry(350, 500, "e", 4),
    ];
    let cells = aggregate(&entries);

    for pair in cells.windows(2) {
        assert!(
            pair[0].end <= pair[1].start,
            "cells {:?} and {:?} overlap",
            (pair[0].start, pair[0].end),
            (pair[1].start, pair[1].end)
        );
    }
}

#[test]
fn test_coverage_equals_input_union() {
    let entries = vec![
        entry(0, 300, "a", 0),
        entry(50, 100, "b", 1),
        entry(400, 450, "c", 2),
    ];
    let cells = aggregate(&entries);

    let covered: Timestamp = cells.iter().map(AggregatedEntry::duration).sum();
    // Input union: [0,300) plus [400,450).
    assert_eq!(covered, 350);
    assert_eq!(cells.first().unwrap().start, 0);
    assert_eq!(cells.last().unwrap().end, 450);
}

#[test]
fn test_aggregation_is_idempotent_on_disjoint_partition() {
    let entries = vec![
        entry(0, 100, "s1", 0),
        entry(25, 150, "s2", 1),
        entry(200, 220, "s3", 2),
    ];
    let once = aggregate(&entries);

    // Re-aggregating the disjoint single-service projection of the
    // partition reproduces it exactly.
    let flattened: Vec<Entry> = once
        .iter()
        .map(|c| {
            let mut e = c.services[0].clone();
            e.start = c.start;
            e.end = c.end;
            e
        })
        .collect();
    let twice = aggregate(&flattened);
    assert_eq!(spans(&once), spans(&twice));
}

#[test]
fn test_merge_undoes_artificial_split() {
    // One long holder split by a short inner one, viewed per-entity.
    let entries = vec![entry(0, 100, "outer", 0), entry(25, 75, "inner", 1)];
    let cells = aggregate(&entries);

    let outer_only: Vec<AggregatedEntry> = cells
        .iter()
        .map(|c| AggregatedEntry {
            start: c.start,
            end: c.end,
            services: c
                .services
                .iter()
                .filter(|s| s.value.key_string() == "outer")
                .cloned()
                .collect(),
        })
        .filter(|c| !c.services.is_empty())
        .collect();

    let merged = merge_split_entries(&outer_only);
    assert_eq!(spans(&merged), vec![(0, 100)]);
}

#[test]
fn test_empty_input_yields_empty_partition() {
    assert!(aggregate(&[]).is_empty());
}

#![no_main]

use libfuzzer_sys::fuzz_target;
use wakeline::aggregate::aggregate;
use wakeline::types::{Entry, Value};

fuzz_target!(|data: &[u8]| {
    // Interpret the input as (start, duration) byte pairs, sorted into a
    // valid entry list. Aggregation must be total: no panics, and the
    // partition must stay non-overlapping for any input.
    let mut spans: Vec<(i64, i64)> = data
        .chunks_exact(2)
        .map(|pair| (pair[0] as i64, pair[0] as i64 + pair[1] as i64))
        .collect();
    spans.sort_unstable();

    let entries: Vec<Entry> = spans
        .into_iter()
        .enumerate()
        .map(|(i, (start, end))| Entry::original(start, end, Value::Int(1), i as u32))
        .collect();

    let cells = aggregate(&entries);
    for pair in cells.windows(2) {
        assert!(pair[0].end <= pair[1].start);
    }
});

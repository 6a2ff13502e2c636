// Shared fixture builders for integration tests.
#![allow(dead_code)]

use wakeline::aggregate::AggregatedEntry;
use wakeline::power::PowerSample;
use wakeline::series::{MetricKind, SeriesRecord};
use wakeline::types::{Entry, Timestamp, Value, WakeupReason};

pub fn text_entry(start: Timestamp, end: Timestamp, name: &str, id: u32) -> Entry {
    Entry::original(start, end, Value::Text(name.to_string()), id)
}

pub fn running_cell(
    start: Timestamp,
    end: Timestamp,
    reasons: &[(Timestamp, &str)],
) -> AggregatedEntry {
    let services: Vec<Entry> = reasons
        .iter()
        .enumerate()
        .map(|(i, (at, name))| {
            Entry::original(
                start,
                end,
                Value::Reason(WakeupReason {
                    reported_at: *at,
                    name: name.to_string(),
                }),
                i as u32,
            )
        })
        .collect();
    AggregatedEntry {
        start,
        end,
        services,
    }
}

pub fn wakelock_cell(start: Timestamp, end: Timestamp, holder: &str) -> AggregatedEntry {
    AggregatedEntry::from_entry(&text_entry(start, end, holder, 0))
}

pub fn record(
    series: &str,
    metric: MetricKind,
    start: Timestamp,
    end: Timestamp,
    value: Value,
) -> SeriesRecord {
    SeriesRecord {
        series: series.to_string(),
        metric,
        start,
        end,
        value,
        source_id: 0,
        uid: None,
    }
}

/// Contiguous 100 ms power samples starting at `start`.
pub fn sample_stream(start: Timestamp, readings: &[f64]) -> Vec<PowerSample> {
    readings
        .iter()
        .enumerate()
        .map(|(i, &current_ma)| PowerSample {
            start: start + i as Timestamp * 100,
            end: start + (i as Timestamp + 1) * 100,
            current_ma,
        })
        .collect()
}

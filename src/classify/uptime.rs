// Derived kernel-uptime series.

use crate::aggregate::AggregatedEntry;
use crate::classify::ClassifiedInterval;
use crate::types::{Entry, Value};

/// Value given to kernel-uptime portions with no recorded wakeup reason.
pub const UNKNOWN_CAUSE: &str = "unknown";

/// Turn classified intervals into a synthetic series the clusterer can
/// consume.
///
/// Each classified interval becomes one cell carrying one synthetic
/// service per attributed cause, so per-cause counts and durations survive
/// clustering. Cluster this series with
/// [`ClusterOptions::single_count`](crate::cluster::ClusterOptions::single_count):
/// one awake interval stays one occurrence no matter how many reasons it
/// carries.
pub fn to_uptime_entries(classified: &[ClassifiedInterval]) -> Vec<AggregatedEntry> {
    classified
        .iter()
        .map(|interval| {
            let services: Vec<Entry> = if interval.causes.is_empty() {
                vec![Entry::synthetic(
                    interval.start,
                    interval.end,
                    Value::Text(UNKNOWN_CAUSE.to_string()),
                )]
            } else {
                interval
                    .causes
                    .iter()
                    .map(|cause| {
                        Entry::synthetic(interval.start, interval.end, Value::Text(cause.clone()))
                    })
                    .collect()
            };
            AggregatedEntry {
                start: interval.start,
                end: interval.end,
                services,
            }
        })
        .collect()
}

//! Input preparation for one logical series.
//!
//! The ingestion layer hands over a parsed, type-tagged event stream per
//! series. Before the interval passes run, each series is sorted, repaired
//! (state metrics are non-overlapping by construction, so overlap there is
//! malformed input), and stamped with stable entry ids.

use crate::types::{Entry, Provenance, Timestamp, Value, WakeupReason};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

/// Series name the CPU-running intervals arrive under.
pub const CPU_RUNNING_SERIES: &str = "CPURunning";
/// Series name the userspace wakelock intervals arrive under.
pub const USERSPACE_WAKELOCK_SERIES: &str = "UserspaceWakelock";
/// Series name the external power-monitor readings arrive under.
pub const POWER_MONITOR_SERIES: &str = "PowerMonitor";

/// Errors raised while preparing a series for analysis.
#[derive(Error, Debug)]
pub enum SeriesError {
    #[error("record {index} belongs to series {found:?}, expected {expected:?}")]
    MixedSeries {
        index: usize,
        found: String,
        expected: String,
    },

    #[error("malformed wakeup value {value:?}: expected \"<time>~<reason>\"")]
    MalformedWakeupValue { value: String },
}

/// How a series behaves with respect to overlapping intervals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetricKind {
    /// The series holds one value at a time (int/float/bool/string states).
    /// Overlap between consecutive intervals is malformed and repaired by
    /// truncation.
    State,
    /// The series tracks concurrent holders (services, wakelocks, events).
    /// Overlap is legitimate and triggers aggregation.
    Service,
}

/// One record of the parsed event stream handed over by the ingestion layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesRecord {
    pub series: String,
    pub metric: MetricKind,
    pub start: Timestamp,
    pub end: Timestamp,
    pub value: Value,
    /// Identifier of the originating report line.
    pub source_id: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<i32>,
}

/// A repair applied to a malformed state interval.
///
/// State metrics are non-overlapping by construction, so when interval `n`
/// runs past the start of interval `n+1` the earlier end is truncated and
/// the caller is told about it. Never a hard failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepairDiagnostic {
    pub series: String,
    /// Index of the truncated entry within the prepared series.
    pub index: usize,
    pub original_end: Timestamp,
    pub truncated_end: Timestamp,
}

/// A series sorted, repaired, and stamped with entry ids.
#[derive(Debug, Clone)]
pub struct PreparedSeries {
    pub name: String,
    pub metric: MetricKind,
    pub entries: Vec<Entry>,
    pub repairs: Vec<RepairDiagnostic>,
    /// Whether any two consecutive entries overlapped after repair.
    /// Service series with observed overlap need aggregation before display.
    pub overlap_observed: bool,
}

/// Caller-owned record of which series need interval aggregation.
///
/// Aggregation need is a pure function of (series name, observed overlap,
/// this catalog): the catalog starts from the caller's configuration and is
/// updated from each `PreparedSeries`, never from hidden global state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AggregationCatalog {
    aggregated: BTreeSet<String>,
}

impl AggregationCatalog {
    /// Catalog seeded with series known to need aggregation up front.
    pub fn with_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            aggregated: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn should_aggregate(&self, series: &str) -> bool {
        self.aggregated.contains(series)
    }

    /// Record that a prepared series was observed overlapping.
    pub fn observe(&mut self, prepared: &PreparedSeries) {
        if prepared.metric == MetricKind::Service && prepared.overlap_observed {
            self.aggregated.insert(prepared.name.clone());
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.aggregated.iter().map(String::as_str)
    }
}

/// Sort, repair, and id-stamp the records of one series.
///
/// Records may arrive in any order; they are sorted by `(start, end)` here
/// so the downstream passes can assume sorted input. State-metric overlap
/// is repaired by truncating the earlier end to the later start, with a
/// diagnostic per repair. Service-metric overlap is preserved and reported
/// through `overlap_observed`.
pub fn prepare_series(
    name: &str,
    metric: MetricKind,
    records: &[SeriesRecord],
) -> Result<PreparedSeries, SeriesError> {
    for (index, record) in records.iter().enumerate() {
        if record.series != name {
            return Err(SeriesError::MixedSeries {
                index,
                found: record.series.clone(),
                expected: name.to_string(),
            });
        }
    }

    let mut entries: Vec<Entry> = records
        .iter()
        .map(|r| Entry {
            start: r.start,
            end: r.end,
            value: r.value.clone(),
            provenance: Provenance::Synthetic, // ids assigned after sorting
            uid: r.uid,
        })
        .collect();
    entries.sort_by_key(|e| (e.start, e.end));

    let mut repairs = Vec::new();
    let mut overlap_observed = false;
    for i in 0..entries.len().saturating_sub(1) {
        let next_start = entries[i + 1].start;
        if entries[i].end > next_start {
            overlap_observed = true;
            if metric == MetricKind::State {
                let original_end = entries[i].end;
                entries[i].end = next_start;
                tracing::warn!(
                    series = name,
                    index = i,
                    original_end,
                    truncated_end = next_start,
                    "truncated overlapping state interval"
                );
                repairs.push(RepairDiagnostic {
                    series: name.to_string(),
                    index: i,
                    original_end,
                    truncated_end: next_start,
                });
            }
        }
    }

    for (i, entry) in entries.iter_mut().enumerate() {
        entry.provenance = Provenance::Original(i as u32);
    }

    Ok(PreparedSeries {
        name: name.to_string(),
        metric,
        entries,
        repairs,
        overlap_observed: overlap_observed && metric == MetricKind::Service,
    })
}

/// Parse the `"<time>~<reason>"` convention CPU-running values arrive in.
pub fn parse_wakeup_value(raw: &str) -> Result<WakeupReason, SeriesError> {
    let malformed = || SeriesError::MalformedWakeupValue {
        value: raw.to_string(),
    };
    let (time, reason) = raw.split_once('~').ok_or_else(malformed)?;
    if reason.is_empty() {
        return Err(malformed());
    }
    let reported_at: Timestamp = time.trim().parse().map_err(|_| malformed())?;
    Ok(WakeupReason {
        reported_at,
        name: reason.to_string(),
    })
}

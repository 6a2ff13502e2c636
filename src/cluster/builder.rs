// Cluster accumulation pass.
//
// A cluster is built through an explicit accumulator folded over the input
// and finalized into an immutable value; nothing is mutated after
// construction.

use crate::aggregate::AggregatedEntry;
use crate::cluster::ClusterOptions;
use crate::types::{Entry, EntryId, Timestamp, Value};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// How far past the first entry's end a cluster keeps absorbing entries,
/// in multiples of the minimum visible duration. Fixed display-density
/// constant; rendered output parity depends on its exact value.
const CLUSTER_DISTANCE_MULTIPLIER: Timestamp = 8;

/// Key of one value's statistics within a cluster: the canonical value
/// string plus the owning app uid when the series is per-app.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ValueKey {
    pub value: String,
    pub uid: Option<i32>,
}

impl ValueKey {
    fn for_entry(entry: &Entry) -> Self {
        Self {
            value: entry.value.key_string(),
            uid: entry.uid,
        }
    }

    /// Flat label, usable as a JSON map key.
    pub fn label(&self) -> String {
        match self.uid {
            Some(uid) => format!("{}#{}", self.value, uid),
            None => self.value.clone(),
        }
    }
}

impl Serialize for ValueKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.label())
    }
}

/// Per-value accumulation within one cluster.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueStats {
    /// Distinct original entries contributing this value. Duplicate cells
    /// from a single split entry count once.
    pub count: usize,
    /// Total time this value was active within the cluster.
    pub duration: Timestamp,
    /// One representative payload, kept so the rendering layer can show a
    /// typed value without re-parsing the key string.
    pub sample_value: Value,
    /// Original ids recorded for this value; the dedup set behind `count`.
    pub original_ids: BTreeSet<EntryId>,
}

/// A time-bucketed grouping of several underlying entries at low zoom.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cluster {
    pub start: Timestamp,
    pub end: Timestamp,
    /// End of the first entry folded in; grouping distance is measured
    /// from here, not from the cluster's growing end.
    pub first_entry_end: Timestamp,
    pub total_count: usize,
    /// Summed durations of the folded entries (gaps between them excluded).
    pub active_duration: Timestamp,
    pub value_stats: BTreeMap<ValueKey, ValueStats>,
}

impl Cluster {
    /// Stats for one value key, if present.
    pub fn stats_for(&self, value: &str) -> Option<&ValueStats> {
        self.value_stats
            .iter()
            .find(|(k, _)| k.value == value)
            .map(|(_, v)| v)
    }
}

struct ClusterBuilder<'a> {
    options: &'a ClusterOptions,
    start: Timestamp,
    end: Timestamp,
    first_entry_end: Timestamp,
    total_count: usize,
    active_duration: Timestamp,
    value_stats: BTreeMap<ValueKey, ValueStats>,
    /// Original ids counted toward `total_count`, for single-count series.
    counted_ids: BTreeSet<EntryId>,
}

impl<'a> ClusterBuilder<'a> {
    fn seed(cell: &AggregatedEntry, options: &'a ClusterOptions) -> Self {
        let mut builder = Self {
            options,
            start: cell.start,
            end: cell.end,
            first_entry_end: cell.end,
            total_count: 0,
            active_duration: 0,
            value_stats: BTreeMap::new(),
            counted_ids: BTreeSet::new(),
        };
        builder.fold(cell);
        builder
    }

    fn fold(&mut self, cell: &AggregatedEntry) {
        self.end = self.end.max(cell.end);
        self.active_duration += cell.duration();

        // One running entry can carry several wakeup reasons; each service
        // accounts its own span, clipped to the cell so an entry split
        // across several cells accumulates exactly its covered time.
        let mut saw_new_identity = false;

        for service in &cell.services {
            let span = (service.end.min(cell.end) - service.start.max(cell.start)).max(0);
            let stats = self
                .value_stats
                .entry(ValueKey::for_entry(service))
                .or_insert_with(|| ValueStats {
                    count: 0,
                    duration: 0,
                    sample_value: service.value.clone(),
                    original_ids: BTreeSet::new(),
                });
            let new_for_key = match service.provenance.id() {
                Some(id) => stats.original_ids.insert(id),
                None => true,
            };
            if new_for_key {
                stats.count += 1;
            }
            stats.duration += span;

            let new_for_cluster = match service.provenance.id() {
                Some(id) => self.counted_ids.insert(id),
                None => true,
            };
            saw_new_identity |= new_for_cluster;
        }

        if !self.options.force_single_count || saw_new_identity {
            self.total_count += 1;
        }
    }

    /// Whether `cell` still belongs to this cluster at the given zoom.
    fn absorbs(&self, cell: &AggregatedEntry, min_visible: Timestamp) -> bool {
        if cell.start >= self.first_entry_end + min_visible * CLUSTER_DISTANCE_MULTIPLIER {
            return false;
        }
        // Both the accumulated cluster and the new entry are large enough
        // to stand on their own at this zoom level.
        if cell.duration() >= min_visible && self.active_duration >= min_visible {
            return false;
        }
        true
    }

    fn finish(self) -> Cluster {
        Cluster {
            start: self.start,
            end: self.end,
            first_entry_end: self.first_entry_end,
            total_count: self.total_count,
            active_duration: self.active_duration,
            value_stats: self.value_stats,
        }
    }
}

fn is_blank_cell(cell: &AggregatedEntry, options: &ClusterOptions) -> bool {
    cell.services.iter().all(|s| options.is_blank(&s.value))
}

/// Group partition cells into display clusters for one zoom level.
///
/// `min_visible_duration` is the shortest duration still visible at the
/// current zoom. Blank entries are skipped entirely and never start or
/// extend a cluster.
pub fn cluster_entries(
    cells: &[AggregatedEntry],
    min_visible_duration: Timestamp,
    options: &ClusterOptions,
) -> Vec<Cluster> {
    let mut clusters = Vec::new();
    let mut builder: Option<ClusterBuilder<'_>> = None;

    for cell in cells {
        if is_blank_cell(cell, options) {
            continue;
        }
        match builder {
            Some(ref mut current) if current.absorbs(cell, min_visible_duration) => {
                current.fold(cell);
            }
            _ => {
                clusters.extend(builder.take().map(ClusterBuilder::finish));
                builder = Some(ClusterBuilder::seed(cell, options));
            }
        }
    }
    clusters.extend(builder.map(ClusterBuilder::finish));
    clusters
}

/// Cluster a plain entry list by wrapping each entry in its own cell.
pub fn cluster_plain(
    entries: &[Entry],
    min_visible_duration: Timestamp,
    options: &ClusterOptions,
) -> Vec<Cluster> {
    let cells: Vec<AggregatedEntry> = entries.iter().map(AggregatedEntry::from_entry).collect();
    cluster_entries(&cells, min_visible_duration, options)
}

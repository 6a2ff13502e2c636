// Window expansion around each cause's anchor sample.

use crate::aggregate::AggregatedEntry;
use crate::power::summary::{CauseStats, PowerAttribution, SuspendWakeupSummary};
use crate::power::PowerConfig;
use crate::types::Timestamp;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Milliseconds per hour; current (mA) times span over this is mAh.
const MS_PER_HOUR: f64 = 3_600_000.0;

/// One reading of the power-monitor stream: average current over
/// `[start, end)` in mA. The stream is sorted, contiguous, and
/// non-overlapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerSample {
    pub start: Timestamp,
    pub end: Timestamp,
    pub current_ma: f64,
}

impl PowerSample {
    pub fn span_ms(&self) -> Timestamp {
        self.end - self.start
    }

    fn energy_mah(&self) -> f64 {
        self.current_ma * self.span_ms() as f64 / MS_PER_HOUR
    }
}

/// The stretch of power-monitor data attributed to one cause occurrence.
///
/// Consecutive causes may share a boundary sample when the falling edge of
/// one hump overlaps the rising edge of the next, so windows of different
/// causes are allowed to overlap; exclusivity is never forced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PowerWindow {
    pub start: Timestamp,
    pub end: Timestamp,
    pub cause: String,
}

/// A cause occurrence flattened out of the aggregated cause cells.
struct CauseEvent {
    at: Timestamp,
    span_end: Timestamp,
    name: String,
}

/// Attribute the power-monitor stream to the given cause events.
///
/// For each cause occurrence the anchor sample containing its time is
/// located by binary search, then grown backward along the rising edge and
/// forward while readings stay above the idle threshold, stopping where
/// the next cause's own rising edge begins.
pub fn estimate(
    causes: &[AggregatedEntry],
    samples: &[PowerSample],
    config: &PowerConfig,
) -> PowerAttribution {
    debug_assert!(
        samples.windows(2).all(|w| w[0].end <= w[1].start),
        "estimate() requires a sorted non-overlapping sample stream"
    );

    let events = flatten_causes(causes);
    let mut windows: BTreeMap<String, Vec<PowerWindow>> = BTreeMap::new();
    let mut stats: BTreeMap<String, CauseStats> = BTreeMap::new();
    // Inclusive sample-index ranges backing the suspend/wakeup summary.
    let mut claimed: Vec<(usize, usize)> = Vec::new();
    let mut prev_window_end: Option<usize> = None;

    for (k, event) in events.iter().enumerate() {
        let per_cause = stats.entry(event.name.clone()).or_default();
        per_cause.occurrences += 1;
        windows.entry(event.name.clone()).or_default();

        // A cause with no intersecting samples keeps an empty window list
        // and zero power for this occurrence.
        let Some(anchor) = anchor_sample(samples, event.at) else {
            continue;
        };

        let lo = rising_edge_start(samples, anchor, prev_window_end, config);
        let next_edge = events
            .get(k + 1)
            .and_then(|next| anchor_sample(samples, next.at))
            .map(|a| rising_edge_start(samples, a, None, config));
        let hi = falling_edge_end(samples, anchor, next_edge, event.span_end, config);

        let window = PowerWindow {
            start: samples[lo].start,
            end: samples[hi].end,
            cause: event.name.clone(),
        };
        per_cause.duration_ms += window.end - window.start;
        per_cause.energy_mah += samples[lo..=hi].iter().map(PowerSample::energy_mah).sum::<f64>();
        windows.entry(event.name.clone()).or_default().push(window);
        claimed.push((lo, hi));
        prev_window_end = Some(hi);
    }

    let summary = summarize(samples, &claimed);
    PowerAttribution {
        windows,
        stats,
        summary,
    }
}

/// Cause occurrences in time order: one per service of each cause cell.
fn flatten_causes(causes: &[AggregatedEntry]) -> Vec<CauseEvent> {
    let mut events: Vec<CauseEvent> = causes
        .iter()
        .flat_map(|cell| cell.services.iter())
        .map(|service| CauseEvent {
            at: service.start,
            span_end: service.end,
            name: service.value.key_string(),
        })
        .collect();
    events.sort_by_key(|e| e.at);
    events
}

/// Index of the sample whose span contains `t`. A time exactly on a sample
/// boundary belongs to the sample starting there.
fn anchor_sample(samples: &[PowerSample], t: Timestamp) -> Option<usize> {
    let idx = samples.partition_point(|s| s.start <= t);
    let candidate = idx.checked_sub(1)?;
    (t < samples[candidate].end || t == samples[candidate].start).then_some(candidate)
}

/// Walk backward from the anchor along the rising edge: keep a sample
/// while it still reads above the idle baseline and at most
/// `rising_tolerance_ma` above its successor. Stops at the trend break,
/// at the suspend baseline, or at the previous cause's window end,
/// whichever comes later; the previous window's last sample itself may be
/// shared.
fn rising_edge_start(
    samples: &[PowerSample],
    anchor: usize,
    floor: Option<usize>,
    config: &PowerConfig,
) -> usize {
    let floor = floor.unwrap_or(0);
    let mut lo = anchor;
    while lo > floor
        && samples[lo - 1].current_ma >= config.idle_threshold_ma
        && samples[lo - 1].current_ma <= samples[lo].current_ma + config.rising_tolerance_ma
    {
        lo -= 1;
    }
    lo
}

/// Walk forward from the anchor while readings stay at or above the idle
/// threshold and before the next cause's rising edge. The sample the next
/// edge starts on may be claimed by both windows. The window never ends
/// before the cause's own reported span does.
fn falling_edge_end(
    samples: &[PowerSample],
    anchor: usize,
    next_edge: Option<usize>,
    cause_span_end: Timestamp,
    config: &PowerConfig,
) -> usize {
    let mut hi = anchor;
    while hi + 1 < samples.len()
        && samples[hi + 1].current_ma >= config.idle_threshold_ma
        && next_edge.map_or(true, |edge| hi + 1 <= edge)
    {
        hi += 1;
    }
    while hi + 1 < samples.len() && samples[hi].end < cause_span_end {
        hi += 1;
    }
    hi
}

/// Classify every sample as wakeup (inside at least one claimed window) or
/// suspend, and total duration, energy, and average current for each side.
fn summarize(samples: &[PowerSample], claimed: &[(usize, usize)]) -> SuspendWakeupSummary {
    let mut in_window = vec![false; samples.len()];
    for &(lo, hi) in claimed {
        for flag in &mut in_window[lo..=hi] {
            *flag = true;
        }
    }

    let mut summary = SuspendWakeupSummary::default();
    for (sample, claimed) in samples.iter().zip(&in_window) {
        if *claimed {
            summary.wakeup_duration_ms += sample.span_ms();
            summary.wakeup_energy_mah += sample.energy_mah();
        } else {
            summary.suspend_duration_ms += sample.span_ms();
            summary.suspend_energy_mah += sample.energy_mah();
        }
    }
    summary.wakeup_avg_ma = average_current_ma(summary.wakeup_energy_mah, summary.wakeup_duration_ms);
    summary.suspend_avg_ma =
        average_current_ma(summary.suspend_energy_mah, summary.suspend_duration_ms);
    summary
}

/// Average current over a window; zero when the duration is zero.
pub(crate) fn average_current_ma(energy_mah: f64, duration_ms: Timestamp) -> f64 {
    if duration_ms <= 0 {
        return 0.0;
    }
    energy_mah * MS_PER_HOUR / duration_ms as f64
}

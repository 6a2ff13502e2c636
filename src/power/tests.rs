// Attribution tests over synthetic power-monitor humps.

use super::*;
use crate::aggregate::AggregatedEntry;
use crate::types::{Entry, Timestamp, Value, WakeupReason};

/// Contiguous 100 ms samples starting at `start`, one per reading.
fn sample_stream(start: Timestamp, readings: &[f64]) -> Vec<PowerSample> {
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

fn cause(at: Timestamp, span_end: Timestamp, name: &str, id: u32) -> AggregatedEntry {
    AggregatedEntry::from_entry(&Entry::original(
        at,
        span_end,
        Value::Reason(WakeupReason {
            reported_at: at,
            name: name.to_string(),
        }),
        id,
    ))
}

fn window_spans(attribution: &PowerAttribution, cause: &str) -> Vec<(Timestamp, Timestamp)> {
    attribution.windows[cause]
        .iter()
        .map(|w| (w.start, w.end))
        .collect()
}

#[test]
fn test_recurring_cause_gets_one_window_per_spike() {
    // Idle baseline at 5 mA with three humps; the same wakeup reason
    // fires at the start of each.
    let samples = sample_stream(
        0,
        &[
            5.0, 5.0, 5.0, 5.0, 5.0, 5.0, // 0..600 suspended
            50.0, // 600..700 first hump
            5.0, 5.0, 5.0, // 700..1000 suspended
            40.0, 30.0, // 1000..1200 second hump, falling tail
            5.0, 5.0, // 1200..1400 suspended
            60.0, // 1400..1500 third hump
            5.0, // 1500..1600 suspended
        ],
    );
    let causes = vec![
        cause(600, 600, "r1", 0),
        cause(1000, 1000, "r1", 1),
        cause(1400, 1400, "r1", 2),
    ];

    let attribution = estimate(&causes, &samples, &PowerConfig::default());

    assert_eq!(
        window_spans(&attribution, "r1"),
        vec![(600, 700), (1000, 1200), (1400, 1500)]
    );

    let stats = &attribution.stats["r1"];
    assert_eq!(stats.occurrences, 3);
    assert_eq!(stats.duration_ms, 100 + 200 + 100);
    // (50 + 40 + 30 + 60) mA x 100 ms
    let expected_mah = 180.0 * 100.0 / 3_600_000.0;
    assert!((stats.energy_mah - expected_mah).abs() < 1e-9);
}

#[test]
fn test_suspend_wakeup_summary() {
    let samples = sample_stream(0, &[5.0, 5.0, 50.0, 40.0, 5.0, 5.0]);
    let causes = vec![cause(200, 200, "r1", 0)];

    let attribution = estimate(&causes, &samples, &PowerConfig::default());
    let summary = &attribution.summary;

    assert_eq!(summary.wakeup_duration_ms, 200);
    assert_eq!(summary.suspend_duration_ms, 400);
    // Wakeup average over 50 and 40 mA; suspend stays at baseline.
    assert!((summary.wakeup_avg_ma - 45.0).abs() < 1e-9);
    assert!((summary.suspend_avg_ma - 5.0).abs() < 1e-9);
    let total = summary.wakeup_energy_mah + summary.suspend_energy_mah;
    let expected_total = (5.0 * 4.0 + 50.0 + 40.0) * 100.0 / 3_600_000.0;
    assert!((total - expected_total).abs() < 1e-12);
}

#[test]
fn test_rising_edge_expands_backward_to_baseline() {
    // The cause is anchored at the top of the hump; the climb out of the
    // baseline belongs to it too.
    let samples = sample_stream(0, &[5.0, 15.0, 30.0, 50.0, 5.0]);
    let causes = vec![cause(300, 300, "r1", 0)];

    let attribution = estimate(&causes, &samples, &PowerConfig::default());
    assert_eq!(window_spans(&attribution, "r1"), vec![(100, 400)]);
}

#[test]
fn test_adjacent_causes_share_boundary_sample() {
    // Falling edge of the first hump overlaps the rising edge of the
    // second; the local-minimum sample is claimed by both windows.
    let samples = sample_stream(0, &[5.0, 30.0, 20.0, 40.0, 5.0]);
    let causes = vec![cause(100, 100, "a", 0), cause(300, 300, "b", 1)];

    let attribution = estimate(&causes, &samples, &PowerConfig::default());
    assert_eq!(window_spans(&attribution, "a"), vec![(100, 300)]);
    assert_eq!(window_spans(&attribution, "b"), vec![(200, 400)]);

    // The shared sample counts as wakeup time exactly once.
    assert_eq!(attribution.summary.wakeup_duration_ms, 300);
}

#[test]
fn test_cause_on_exact_sample_boundary() {
    let samples = sample_stream(0, &[5.0, 50.0, 5.0]);
    // 100 is the boundary between the first and second sample; the
    // boundary sample starting there is the anchor.
    let causes = vec![cause(100, 100, "r1", 0)];

    let attribution = estimate(&causes, &samples, &PowerConfig::default());
    assert_eq!(window_spans(&attribution, "r1"), vec![(100, 200)]);
}

#[test]
fn test_cause_without_samples_yields_empty_window() {
    let samples = sample_stream(1000, &[5.0, 50.0, 5.0]);
    let causes = vec![cause(100, 100, "early", 0), cause(5000, 5000, "late", 1)];

    let attribution = estimate(&causes, &samples, &PowerConfig::default());

    for name in ["early", "late"] {
        assert!(attribution.windows[name].is_empty());
        assert_eq!(attribution.stats[name].occurrences, 1);
        assert_eq!(attribution.stats[name].duration_ms, 0);
        assert_eq!(attribution.stats[name].energy_mah, 0.0);
    }
    assert_eq!(attribution.summary.wakeup_duration_ms, 0);
    assert_eq!(attribution.summary.suspend_duration_ms, 300);
}

#[test]
fn test_window_covers_cause_reported_span() {
    // The hump collapses right away but the cause reports running until
    // 350; its window may not end before that.
    let samples = sample_stream(0, &[50.0, 5.0, 5.0, 5.0, 5.0]);
    let causes = vec![cause(0, 350, "r1", 0)];

    let attribution = estimate(&causes, &samples, &PowerConfig::default());
    let spans = window_spans(&attribution, "r1");
    assert_eq!(spans.len(), 1);
    assert!(spans[0].1 >= 350, "window {spans:?} ends before the cause span");
}

#[test]
fn test_empty_inputs_yield_empty_results() {
    let attribution = estimate(&[], &[], &PowerConfig::default());
    assert!(attribution.windows.is_empty());
    assert!(attribution.stats.is_empty());
    assert_eq!(attribution.summary, SuspendWakeupSummary::default());

    let samples = sample_stream(0, &[5.0, 5.0]);
    let attribution = estimate(&[], &samples, &PowerConfig::default());
    assert!(attribution.windows.is_empty());
    assert_eq!(attribution.summary.suspend_duration_ms, 200);
}

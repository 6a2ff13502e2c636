// Linear sweep splitting running intervals by the wakelock cover.

use crate::aggregate::AggregatedEntry;
use crate::types::{Timestamp, Value};
use serde::Serialize;

/// A portion of a running interval not covered by any held wakelock.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedInterval {
    pub start: Timestamp,
    pub end: Timestamp,
    /// Wakeup reasons attributed to this portion, in reported order.
    pub causes: Vec<String>,
    /// Whether the running interval this portion came from co-occurred
    /// with a held userspace wakelock at any point.
    pub with_wakelock: bool,
}

/// Split running intervals into the portions that do not co-occur with a
/// held wakelock.
///
/// Both inputs are pre-aggregated and sorted by start time, so each list
/// is non-overlapping; the sweep advances a single wakelock cursor and
/// never backtracks. Portions covered by a wakelock are dropped (that time
/// belongs to the wakelock holder, not to kernel uptime).
pub fn classify(
    running: &[AggregatedEntry],
    wakelocks: &[AggregatedEntry],
) -> Vec<ClassifiedInterval> {
    debug_assert!(
        running.windows(2).all(|w| w[0].start <= w[1].start)
            && wakelocks.windows(2).all(|w| w[0].start <= w[1].start),
        "classify() requires inputs sorted by start"
    );

    let mut out = Vec::new();
    let mut wl = 0usize;

    for r in running {
        let causes = causes_of(r);
        let mut next_cause = 0usize;
        let mut cur = r.start;
        let mut intersected = false;

        while wl < wakelocks.len() {
            let w = &wakelocks[wl];
            if w.start >= r.end {
                break;
            }
            if w.end > cur {
                let covered_from = w.start.max(cur);
                intersected = true;
                if cur < covered_from {
                    out.push(ClassifiedInterval {
                        start: cur,
                        end: covered_from,
                        causes: take_causes_before(&causes, &mut next_cause, covered_from),
                        with_wakelock: false,
                    });
                }
                cur = w.end.min(r.end);
            }
            if w.end <= r.end {
                // Consumed: running intervals are non-overlapping, so this
                // wakelock cannot intersect a later one.
                wl += 1;
            } else {
                // May still intersect the next running interval.
                break;
            }
        }

        // Zero-length remainder produces no output.
        if cur < r.end {
            out.push(ClassifiedInterval {
                start: cur,
                end: r.end,
                causes: causes[next_cause..].iter().map(|c| c.1.clone()).collect(),
                with_wakelock: intersected,
            });
        }
    }
    out
}

/// Wakeup reasons carried by a running interval's services, in reported
/// order.
fn causes_of(running: &AggregatedEntry) -> Vec<(Timestamp, String)> {
    let mut causes: Vec<(Timestamp, String)> = running
        .services
        .iter()
        .filter_map(|s| match &s.value {
            Value::Reason(r) => Some((r.reported_at, r.name.clone())),
            _ => None,
        })
        .collect();
    causes.sort_by_key(|c| c.0);
    causes
}

/// Consume the causes reported before `boundary`; consumed causes are
/// never reused by a later sub-interval.
fn take_causes_before(
    causes: &[(Timestamp, String)],
    next: &mut usize,
    boundary: Timestamp,
) -> Vec<String> {
    let mut taken = Vec::new();
    while *next < causes.len() && causes[*next].0 < boundary {
        taken.push(causes[*next].1.clone());
        *next += 1;
    }
    taken
}

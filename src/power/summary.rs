// Aggregated attribution results and report rendering.

use crate::power::estimator::average_current_ma;
use crate::power::PowerWindow;
use crate::types::Timestamp;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// Accumulated cost of one cause across all its occurrences.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CauseStats {
    /// How many times the cause fired, including occurrences with no
    /// intersecting samples.
    pub occurrences: usize,
    /// Summed span of the cause's attributed windows.
    pub duration_ms: Timestamp,
    /// Charge drawn across the attributed windows.
    pub energy_mah: f64,
}

impl CauseStats {
    pub fn average_current_ma(&self) -> f64 {
        average_current_ma(self.energy_mah, self.duration_ms)
    }
}

/// Global split of the sample stream into suspend and wakeup time.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SuspendWakeupSummary {
    pub suspend_duration_ms: Timestamp,
    pub wakeup_duration_ms: Timestamp,
    pub suspend_energy_mah: f64,
    pub wakeup_energy_mah: f64,
    pub suspend_avg_ma: f64,
    pub wakeup_avg_ma: f64,
}

/// Full result of one attribution run.
#[derive(Debug, Clone, Serialize)]
pub struct PowerAttribution {
    /// Attributed windows per cause, in occurrence order.
    pub windows: BTreeMap<String, Vec<PowerWindow>>,
    /// Accumulated duration/energy per cause.
    pub stats: BTreeMap<String, CauseStats>,
    pub summary: SuspendWakeupSummary,
}

impl PowerAttribution {
    /// Generate human-readable report, most expensive causes first.
    pub fn to_report_string(&self) -> String {
        let mut report = String::new();

        report.push_str("=== Suspend / Wakeup Summary ===\n");
        let _ = writeln!(
            report,
            "Suspend: {:>10} ms  {:>9.3} mAh  avg {:>7.2} mA",
            self.summary.suspend_duration_ms,
            self.summary.suspend_energy_mah,
            self.summary.suspend_avg_ma
        );
        let _ = writeln!(
            report,
            "Wakeup:  {:>10} ms  {:>9.3} mAh  avg {:>7.2} mA",
            self.summary.wakeup_duration_ms,
            self.summary.wakeup_energy_mah,
            self.summary.wakeup_avg_ma
        );

        if self.stats.is_empty() {
            return report;
        }

        report.push_str("\n=== Wakeup Causes ===\n");
        report.push_str("count   duration(ms)       mAh    avg(mA) cause\n");

        let mut rows: Vec<(&String, &CauseStats)> = self.stats.iter().collect();
        rows.sort_by(|a, b| {
            b.1.energy_mah
                .partial_cmp(&a.1.energy_mah)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        for (cause, stats) in rows {
            let _ = writeln!(
                report,
                "{:>5} {:>14} {:>9.3} {:>10.2} {}",
                stats.occurrences,
                stats.duration_ms,
                stats.energy_mah,
                stats.average_current_ma(),
                cause
            );
        }
        report
    }
}

/// Discharge rate as percent of device capacity per hour.
///
/// Zero-duration windows and unknown capacities yield a defined zero rate,
/// never an error.
pub fn discharge_rate_pct_per_hour(
    energy_mah: f64,
    duration_ms: Timestamp,
    capacity_mah: f64,
) -> f64 {
    if duration_ms <= 0 || capacity_mah <= 0.0 {
        return 0.0;
    }
    let hours = duration_ms as f64 / 3_600_000.0;
    (energy_mah / capacity_mah) * 100.0 / hours
}

//! End-to-end analysis of one bug report's event stream.
//!
//! Wires the interval passes together the way the rendering layer consumes
//! them: every series is prepared, aggregated where needed, and clustered;
//! the running and wakelock series additionally feed the kernel-uptime
//! classification; the power-monitor series, when present, feeds power
//! attribution.

use crate::aggregate::{aggregate, AggregatedEntry};
use crate::classify::{classify, to_uptime_entries, ClassifiedInterval};
use crate::cluster::{cluster_entries, Cluster, ClusterOptions};
use crate::power::{
    discharge_rate_pct_per_hour, estimate, PowerAttribution, PowerConfig, PowerSample,
};
use crate::series::{
    parse_wakeup_value, prepare_series, AggregationCatalog, RepairDiagnostic, SeriesRecord,
    CPU_RUNNING_SERIES, POWER_MONITOR_SERIES, USERSPACE_WAKELOCK_SERIES,
};
use crate::types::{Timestamp, Value};
use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// Options for one analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    /// Shortest duration still visible at the target zoom level, in ms.
    pub min_visible_duration: Timestamp,
    /// Device battery capacity; enables the discharge-rate figure.
    pub capacity_mah: Option<f64>,
    pub power: PowerConfig,
    /// Series known to need aggregation up front; extended by observed
    /// overlap during the run.
    pub catalog: AggregationCatalog,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            min_visible_duration: 6000,
            capacity_mah: None,
            power: PowerConfig::default(),
            catalog: AggregationCatalog::default(),
        }
    }
}

/// One series' render-ready output.
#[derive(Debug, Clone, Serialize)]
pub struct SeriesAnalysis {
    pub name: String,
    pub cells: Vec<AggregatedEntry>,
    pub clusters: Vec<Cluster>,
    pub repairs: Vec<RepairDiagnostic>,
}

/// Everything the rendering layer needs from one bug report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportAnalysis {
    pub series: Vec<SeriesAnalysis>,
    pub kernel_uptime: Vec<ClassifiedInterval>,
    pub uptime_clusters: Vec<Cluster>,
    pub power: Option<PowerAttribution>,
    pub discharge_rate_pct_per_hour: Option<f64>,
}

/// Run the full pipeline over a parsed event stream.
pub fn analyze(records: &[SeriesRecord], options: &AnalysisOptions) -> Result<ReportAnalysis> {
    let mut by_series: BTreeMap<String, Vec<SeriesRecord>> = BTreeMap::new();
    for record in records {
        by_series
            .entry(record.series.clone())
            .or_default()
            .push(record.clone());
    }

    let mut catalog = options.catalog.clone();
    let mut series_out = Vec::new();
    let mut running_cells: Vec<AggregatedEntry> = Vec::new();
    let mut wakelock_cells: Vec<AggregatedEntry> = Vec::new();
    let mut samples: Vec<PowerSample> = Vec::new();

    for (name, group) in &by_series {
        let metric = group[0].metric;
        let mut prepared = prepare_series(name, metric, group)
            .with_context(|| format!("failed to prepare series {name:?}"))?;
        catalog.observe(&prepared);
        tracing::debug!(
            series = name.as_str(),
            entries = prepared.entries.len(),
            overlap = prepared.overlap_observed,
            "prepared series"
        );

        if name == POWER_MONITOR_SERIES {
            samples = prepared
                .entries
                .iter()
                .map(|e| PowerSample {
                    start: e.start,
                    end: e.end,
                    current_ma: match &e.value {
                        Value::Real(ma) => *ma,
                        Value::Int(ma) => *ma as f64,
                        _ => 0.0,
                    },
                })
                .collect();
            continue;
        }

        if name == CPU_RUNNING_SERIES {
            // Running values arrive in the "<time>~<reason>" convention.
            for entry in &mut prepared.entries {
                if let Value::Text(raw) = &entry.value {
                    let reason = parse_wakeup_value(raw)
                        .with_context(|| format!("bad running value in series {name:?}"))?;
                    entry.value = Value::Reason(reason);
                }
            }
        }

        let cells = if catalog.should_aggregate(name)
            || name == CPU_RUNNING_SERIES
            || name == USERSPACE_WAKELOCK_SERIES
        {
            aggregate(&prepared.entries)
        } else {
            prepared.entries.iter().map(AggregatedEntry::from_entry).collect()
        };

        if name == CPU_RUNNING_SERIES {
            running_cells = cells.clone();
        } else if name == USERSPACE_WAKELOCK_SERIES {
            wakelock_cells = cells.clone();
        }

        let cluster_options = if name == CPU_RUNNING_SERIES {
            ClusterOptions::single_count()
        } else {
            ClusterOptions::default()
        };
        let clusters = cluster_entries(&cells, options.min_visible_duration, &cluster_options);

        series_out.push(SeriesAnalysis {
            name: name.clone(),
            cells,
            clusters,
            repairs: prepared.repairs,
        });
    }

    let kernel_uptime = classify(&running_cells, &wakelock_cells);
    let uptime_clusters = cluster_entries(
        &to_uptime_entries(&kernel_uptime),
        options.min_visible_duration,
        &ClusterOptions::single_count(),
    );

    let power = (!samples.is_empty())
        .then(|| estimate(&running_cells, &samples, &options.power));
    let discharge_rate_pct_per_hour = match (&power, options.capacity_mah) {
        (Some(attribution), Some(capacity)) => {
            let summary = &attribution.summary;
            Some(discharge_rate_pct_per_hour(
                summary.suspend_energy_mah + summary.wakeup_energy_mah,
                summary.suspend_duration_ms + summary.wakeup_duration_ms,
                capacity,
            ))
        }
        _ => None,
    };

    Ok(ReportAnalysis {
        series: series_out,
        kernel_uptime,
        uptime_clusters,
        power,
        discharge_rate_pct_per_hour,
    })
}

impl ReportAnalysis {
    /// Generate human-readable report.
    pub fn to_report_string(&self) -> String {
        let mut report = String::new();

        report.push_str("=== Series ===\n");
        for series in &self.series {
            let _ = writeln!(
                report,
                "{}: {} cells, {} clusters{}",
                series.name,
                series.cells.len(),
                series.clusters.len(),
                if series.repairs.is_empty() {
                    String::new()
                } else {
                    format!(" ({} repaired)", series.repairs.len())
                }
            );
        }

        let kernel_only_ms: Timestamp = self.kernel_uptime.iter().map(|c| c.end - c.start).sum();
        let _ = writeln!(
            report,
            "\nKernel uptime outside wakelocks: {} ms in {} intervals ({} clusters)",
            kernel_only_ms,
            self.kernel_uptime.len(),
            self.uptime_clusters.len()
        );

        if let Some(power) = &self.power {
            report.push('\n');
            report.push_str(&power.to_report_string());
        }
        if let Some(rate) = self.discharge_rate_pct_per_hour {
            let _ = writeln!(report, "\nDischarge rate: {rate:.2} %/hr");
        }
        report
    }
}

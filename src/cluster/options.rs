// Per-series clustering configuration.

use crate::types::Value;
use serde::{Deserialize, Serialize};

/// Configuration for one series' clustering pass.
///
/// The minimum visible duration itself is a per-call zoom parameter, not
/// part of this struct; these options describe the series.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClusterOptions {
    /// Count one physical event once even when it reaches the clusterer as
    /// several partition cells or sub-reason services. Used for the
    /// CPU-running series, where one running interval intentionally carries
    /// several wakeup reasons.
    pub force_single_count: bool,

    /// Series-specific sentinel treated as blank in addition to the
    /// zero-valued states `Value::is_blank` already skips.
    pub blank_sentinel: Option<Value>,
}

impl ClusterOptions {
    /// Options for the CPU-running and derived kernel-uptime series.
    pub fn single_count() -> Self {
        Self {
            force_single_count: true,
            blank_sentinel: None,
        }
    }

    pub(crate) fn is_blank(&self, value: &Value) -> bool {
        value.is_blank() || self.blank_sentinel.as_ref() == Some(value)
    }
}

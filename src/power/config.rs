// Edge-detection thresholds for power attribution.

use serde::{Deserialize, Serialize};

/// Thresholds governing window expansion around a cause's anchor sample.
///
/// These two constants are the whole definition of "still rising" and
/// "back to idle"; there are no further hidden tolerance rules. Behavior
/// between humps that neither threshold describes is out of contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerConfig {
    /// Readings at or above this current (mA) count as servicing a wakeup;
    /// below it the device is considered settled back into suspend.
    pub idle_threshold_ma: f64,

    /// Backward expansion keeps a sample while it is at most this much
    /// (mA) above its successor, so a near-monotonic climb with sensor
    /// jitter still reads as one rising edge.
    pub rising_tolerance_ma: f64,
}

impl Default for PowerConfig {
    fn default() -> Self {
        Self {
            idle_threshold_ma: 10.0,
            rising_tolerance_ma: 1.0,
        }
    }
}

impl PowerConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.idle_threshold_ma < 0.0 {
            return Err(format!(
                "idle_threshold_ma must be non-negative, got {}",
                self.idle_threshold_ma
            ));
        }
        if self.rising_tolerance_ma < 0.0 {
            return Err(format!(
                "rising_tolerance_ma must be non-negative, got {}",
                self.rising_tolerance_ma
            ));
        }
        Ok(())
    }
}

//! Core interval and entry types shared by every analysis pass.

use serde::{Deserialize, Serialize};

/// Millisecond timestamp, relative to the start of the bug report.
pub type Timestamp = i64;

/// Stable identifier assigned to an entry during series preparation.
///
/// Ids are unique within one source series and monotonically assigned, which
/// makes aggregation reversible: partition cells that reference the same
/// single id were split from one original entry and can be coalesced again.
pub type EntryId = u32;

/// A wakeup reason reported by the kernel, stamped with the time the reason
/// was recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WakeupReason {
    /// When the kernel recorded the reason, in report-relative milliseconds.
    pub reported_at: Timestamp,
    /// Reason string, e.g. `"Abort:Pending Wakeup Sources: ipc00000177"`.
    pub name: String,
}

/// Payload carried by one interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Discrete state level (screen on/off, signal strength, ...).
    Int(i64),
    /// Continuous reading (battery level, temperature, ...).
    Real(f64),
    /// Named holder (service name, wakelock tag, app name, ...).
    Text(String),
    /// Structured payload of a CPU-running interval: the wakeup reason that
    /// pulled the device out of suspend.
    Reason(WakeupReason),
}

impl Value {
    /// Blank values never start or extend a display cluster.
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Int(v) => *v == 0,
            Value::Real(v) => *v == 0.0,
            Value::Text(s) => s.is_empty(),
            Value::Reason(_) => false,
        }
    }

    /// Canonical string form used to key per-value statistics.
    ///
    /// Two entries aggregate under the same key iff this string (plus the
    /// uid discriminator) matches, so `Reason` keys on the reason name and
    /// ignores the reported time.
    pub fn key_string(&self) -> String {
        match self {
            Value::Int(v) => v.to_string(),
            Value::Real(v) => format!("{v}"),
            Value::Text(s) => s.clone(),
            Value::Reason(r) => r.name.clone(),
        }
    }
}

/// Where an entry came from.
///
/// Entries read from the report carry the id assigned during series
/// preparation; entries synthesized by later passes (the derived
/// kernel-uptime series) do not, and never participate in id-based
/// dedup or split-merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Provenance {
    /// Read from the report; id is unique within the source series.
    Original(EntryId),
    /// Generated by a derivation pass.
    Synthetic,
}

impl Provenance {
    /// The original id, if this entry has one.
    pub fn id(&self) -> Option<EntryId> {
        match self {
            Provenance::Original(id) => Some(*id),
            Provenance::Synthetic => None,
        }
    }
}

/// A timestamped interval with its payload and identity.
///
/// Invariant: `start <= end`. Instant events have `start == end`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub start: Timestamp,
    pub end: Timestamp,
    pub value: Value,
    pub provenance: Provenance,
    /// App uid the entry belongs to, when the series is per-app.
    pub uid: Option<i32>,
}

impl Entry {
    /// Construct an entry read from the report.
    pub fn original(start: Timestamp, end: Timestamp, value: Value, id: EntryId) -> Self {
        Self {
            start,
            end,
            value,
            provenance: Provenance::Original(id),
            uid: None,
        }
    }

    /// Construct an entry generated by a derivation pass.
    pub fn synthetic(start: Timestamp, end: Timestamp, value: Value) -> Self {
        Self {
            start,
            end,
            value,
            provenance: Provenance::Synthetic,
            uid: None,
        }
    }

    pub fn duration(&self) -> Timestamp {
        self.end - self.start
    }

    pub fn is_instant(&self) -> bool {
        self.start == self.end
    }
}

// Awake-interval classification against held wakelocks
//
// The CPU can be awake because an app holds a userspace wakelock, or
// because the kernel kept it awake on its own. Splitting the running
// intervals by the wakelock cover is what turns "device awake" into
// "kernel-only uptime" attributable to wakeup reasons.

mod sweep;
mod uptime;

pub use sweep::{classify, ClassifiedInterval};
pub use uptime::{to_uptime_entries, UNKNOWN_CAUSE};

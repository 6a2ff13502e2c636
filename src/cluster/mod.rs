// Multi-resolution clustering of partition cells for display
//
// At low zoom, hundreds of short intervals collapse into a handful of
// clusters, each keeping per-value counts and durations so the rendering
// layer can still show what happened inside. The grouping distance scales
// with the minimum duration a rendered interval stays visible at the
// current zoom level.

mod builder;
mod options;

pub use builder::{cluster_entries, cluster_plain, Cluster, ValueKey, ValueStats};
pub use options::ClusterOptions;

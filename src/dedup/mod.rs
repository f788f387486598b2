pub mod disjoint_set;
pub mod grouping;
pub mod representative;
pub mod stats;

pub use disjoint_set::DisjointSet;
pub use grouping::{MatchReasons, TrackGroup, group_tracks};
pub use representative::select_representative;
pub use stats::{GroupingStats, compute_grouping_stats, largest_duplicate_groups};

pub mod analytics;
pub mod config;
pub mod dedup;
pub mod error;
pub mod matcher;
pub mod normalize;
pub mod snapshot;
pub mod spotify;

pub use config::Config;
pub use dedup::{
    DisjointSet, GroupingStats, MatchReasons, TrackGroup, compute_grouping_stats, group_tracks,
};
pub use error::{AppError, Result};
pub use matcher::{MatchCriterion, is_fuzzy_match, is_strict_match};
pub use snapshot::{AnalysisReport, LibrarySnapshot};
pub use spotify::{ArtistInfo, PlaylistRef, Track, TrackOccurrence, TrackSource};

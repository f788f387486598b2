use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::normalize::{normalize_artist_set, normalize_string};
use crate::spotify::Track;

/// Maximum duration difference for a strict match.
pub const STRICT_DURATION_TOLERANCE_MS: u64 = 2000;

/// Maximum duration difference for a fuzzy match. Tighter than the strict
/// tolerance: once names only need to overlap, duration is what keeps
/// different songs apart.
pub const FUZZY_DURATION_TOLERANCE_MS: u64 = 50;

/// Shortest normalized name that may count as contained in another.
const MIN_SUBSET_NAME_LEN: usize = 3;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum MatchCriterion {
    Strict,
    Fuzzy,
}

impl std::fmt::Display for MatchCriterion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchCriterion::Strict => write!(f, "Strict"),
            MatchCriterion::Fuzzy => write!(f, "Fuzzy"),
        }
    }
}

/// Normalized comparison key for a track, computed once per occurrence
/// rather than once per pair.
#[derive(Debug, Clone)]
pub struct TrackKey {
    pub name: String,
    pub artists: HashSet<String>,
    pub duration_ms: u64,
}

impl TrackKey {
    pub fn new(track: &Track) -> Self {
        Self {
            name: normalize_string(&track.name),
            artists: normalize_artist_set(&track.artist_names()),
            duration_ms: track.duration_ms,
        }
    }

    fn duration_diff(&self, other: &TrackKey) -> u64 {
        self.duration_ms.abs_diff(other.duration_ms)
    }
}

/// Same recording with cosmetic metadata differences: durations within two
/// seconds, equal normalized names and equal artist sets.
pub fn is_strict_match(a: &Track, b: &Track) -> bool {
    keys_match_strict(&TrackKey::new(a), &TrackKey::new(b))
}

/// Different edit of the same song: durations within 50ms, one normalized
/// name contained in the other, one artist set contained in the other.
pub fn is_fuzzy_match(a: &Track, b: &Track) -> bool {
    keys_match_fuzzy(&TrackKey::new(a), &TrackKey::new(b))
}

pub fn keys_match_strict(a: &TrackKey, b: &TrackKey) -> bool {
    a.duration_diff(b) <= STRICT_DURATION_TOLERANCE_MS && a.name == b.name && a.artists == b.artists
}

pub fn keys_match_fuzzy(a: &TrackKey, b: &TrackKey) -> bool {
    a.duration_diff(b) <= FUZZY_DURATION_TOLERANCE_MS
        && is_name_subset(&a.name, &b.name)
        && (a.artists.is_subset(&b.artists) || b.artists.is_subset(&a.artists))
}

fn is_name_subset(a: &str, b: &str) -> bool {
    let (shorter, longer) = if a.chars().count() <= b.chars().count() {
        (a, b)
    } else {
        (b, a)
    };

    shorter.chars().count() >= MIN_SUBSET_NAME_LEN && longer.contains(shorter)
}

use std::cmp::Reverse;

use crate::normalize::normalize_string;
use crate::spotify::{Track, TrackOccurrence};

/// Picks the canonical track of a group: shortest normalized name, then
/// highest popularity (missing counts as 0), then earliest in the group.
///
/// # Panics
///
/// Panics when `occurrences` is empty. Grouping never builds an empty
/// group, so reaching this is a bug in the caller.
pub fn select_representative(occurrences: &[TrackOccurrence]) -> &Track {
    occurrences
        .iter()
        .map(|occurrence| &occurrence.track)
        .min_by_key(|track| {
            (
                normalize_string(&track.name).chars().count(),
                Reverse(track.popularity.unwrap_or(0)),
            )
        })
        .expect("representative requested for an empty track group")
}

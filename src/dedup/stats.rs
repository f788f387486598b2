use serde::{Deserialize, Serialize};

use crate::dedup::grouping::TrackGroup;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GroupingStats {
    pub total_groups: usize,
    pub total_tracks: usize,
    pub single_track_groups: usize,
    pub multi_track_groups: usize,
    pub strict_only_groups: usize,
    pub fuzzy_only_groups: usize,
    pub mixed_groups: usize,
    pub largest_group: usize,
    pub average_group_size: f64,
}

impl GroupingStats {
    /// Occurrences folded into another member of their group.
    pub fn duplicate_tracks(&self) -> usize {
        self.total_tracks - self.total_groups
    }

    pub fn duplicate_group_rate(&self) -> f64 {
        if self.total_groups > 0 {
            (self.multi_track_groups as f64 / self.total_groups as f64) * 100.0
        } else {
            0.0
        }
    }
}

pub fn compute_grouping_stats(groups: &[TrackGroup]) -> GroupingStats {
    let mut stats = GroupingStats {
        total_groups: groups.len(),
        ..Default::default()
    };

    for group in groups {
        let size = group.len();
        let reasons = group.match_reasons;

        stats.total_tracks += size;
        stats.largest_group = stats.largest_group.max(size);

        if size == 1 {
            stats.single_track_groups += 1;
        } else {
            stats.multi_track_groups += 1;
        }

        match (reasons.has_strict_matches, reasons.has_fuzzy_matches) {
            (true, false) => stats.strict_only_groups += 1,
            (false, true) => stats.fuzzy_only_groups += 1,
            (true, true) => stats.mixed_groups += 1,
            (false, false) => {}
        }
    }

    if stats.total_groups > 0 {
        stats.average_group_size = stats.total_tracks as f64 / stats.total_groups as f64;
    }

    stats
}

/// Multi-track groups, largest first. Equal sizes keep their input order.
pub fn largest_duplicate_groups(groups: &[TrackGroup], limit: usize) -> Vec<&TrackGroup> {
    let mut duplicates: Vec<&TrackGroup> = groups.iter().filter(|g| g.len() > 1).collect();
    duplicates.sort_by(|a, b| b.len().cmp(&a.len()));
    duplicates.truncate(limit);
    duplicates
}

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::dedup::disjoint_set::DisjointSet;
use crate::dedup::representative::select_representative;
use crate::matcher::{
    MatchCriterion, STRICT_DURATION_TOLERANCE_MS, TrackKey, keys_match_fuzzy, keys_match_strict,
};
use crate::spotify::{PlaylistRef, Track, TrackOccurrence};

/// Which criteria contributed to a group's membership.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchReasons {
    pub has_strict_matches: bool,
    pub has_fuzzy_matches: bool,
    pub is_single_track: bool,
}

impl MatchReasons {
    pub fn criteria(&self) -> Vec<MatchCriterion> {
        let mut criteria = Vec::new();
        if self.has_strict_matches {
            criteria.push(MatchCriterion::Strict);
        }
        if self.has_fuzzy_matches {
            criteria.push(MatchCriterion::Fuzzy);
        }
        criteria
    }
}

/// Occurrences judged to be the same song, plus the track shown for them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrackGroup {
    pub tracks: Vec<TrackOccurrence>,
    pub representative_track: Track,
    pub match_reasons: MatchReasons,
}

impl TrackGroup {
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Distinct playlists this song appears in, first seen first.
    pub fn playlists(&self) -> Vec<&PlaylistRef> {
        let mut seen: Vec<&PlaylistRef> = Vec::new();
        for playlist in self.tracks.iter().filter_map(|t| t.playlist()) {
            if !seen.iter().any(|p| p.id == playlist.id) {
                seen.push(playlist);
            }
        }
        seen
    }

    pub fn is_liked(&self) -> bool {
        self.tracks.iter().any(|t| t.is_liked())
    }
}

/// Criteria accumulated by a union-find root.
#[derive(Debug, Clone, Copy, Default)]
struct RootFlags {
    strict: bool,
    fuzzy: bool,
}

impl RootFlags {
    fn merge(self, other: RootFlags) -> RootFlags {
        RootFlags {
            strict: self.strict || other.strict,
            fuzzy: self.fuzzy || other.fuzzy,
        }
    }
}

/// Clusters occurrences that represent the same song.
///
/// Occurrences without an id, name or duration are dropped. Every pair
/// `(i, j)` with `i < j` is visited in order; both criteria are evaluated
/// for each unmerged pair so the resulting [`MatchReasons`] list every
/// criterion that joined members, not only the first to fire.
pub fn group_tracks(occurrences: &[TrackOccurrence]) -> Vec<TrackGroup> {
    let valid: Vec<&TrackOccurrence> = occurrences.iter().filter(|o| o.track.is_valid()).collect();

    let dropped = occurrences.len() - valid.len();
    if dropped > 0 {
        debug!("Dropped {} occurrences with incomplete track data", dropped);
    }

    let keys: Vec<TrackKey> = valid.iter().map(|o| TrackKey::new(&o.track)).collect();
    let candidates = DurationWindow::new(&keys);

    let mut set = DisjointSet::new(valid.len());
    let mut flags = vec![RootFlags::default(); valid.len()];
    let mut comparisons = 0usize;

    for i in 0..keys.len() {
        for j in candidates.partners(i) {
            if set.connected(i, j) {
                continue;
            }
            comparisons += 1;

            let strict = keys_match_strict(&keys[i], &keys[j]);
            let fuzzy = keys_match_fuzzy(&keys[i], &keys[j]);
            if !strict && !fuzzy {
                continue;
            }

            let merged = flags[set.find(i)].merge(flags[set.find(j)]);
            let root = set.union(i, j);
            flags[root] = merged.merge(RootFlags { strict, fuzzy });
        }
    }

    let groups: Vec<TrackGroup> = set
        .groups()
        .into_iter()
        .map(|(root, members)| {
            let tracks: Vec<TrackOccurrence> =
                members.iter().map(|&index| valid[index].clone()).collect();
            let representative_track = select_representative(&tracks).clone();
            let match_reasons = MatchReasons {
                has_strict_matches: flags[root].strict,
                has_fuzzy_matches: flags[root].fuzzy,
                is_single_track: tracks.len() == 1,
            };

            TrackGroup {
                tracks,
                representative_track,
                match_reasons,
            }
        })
        .collect();

    info!(
        "Grouped {} occurrences into {} songs ({} pair comparisons)",
        valid.len(),
        groups.len(),
        comparisons
    );

    groups
}

/// Pairs further apart in duration than the strict tolerance can match
/// neither criterion, so only partners inside that window are visited.
struct DurationWindow {
    by_duration: Vec<usize>,
    durations: Vec<u64>,
    own: Vec<u64>,
}

impl DurationWindow {
    fn new(keys: &[TrackKey]) -> Self {
        let mut by_duration: Vec<usize> = (0..keys.len()).collect();
        by_duration.sort_by_key(|&index| (keys[index].duration_ms, index));
        let durations = by_duration.iter().map(|&index| keys[index].duration_ms).collect();
        let own = keys.iter().map(|key| key.duration_ms).collect();

        Self {
            by_duration,
            durations,
            own,
        }
    }

    /// Indices `j > i` within the tolerance of `i`, ascending.
    fn partners(&self, i: usize) -> Vec<usize> {
        let duration = self.own[i];
        let low = duration.saturating_sub(STRICT_DURATION_TOLERANCE_MS);
        let high = duration.saturating_add(STRICT_DURATION_TOLERANCE_MS);

        let start = self.durations.partition_point(|&d| d < low);
        let end = self.durations.partition_point(|&d| d <= high);

        let mut partners: Vec<usize> = self.by_duration[start..end]
            .iter()
            .copied()
            .filter(|&j| j > i)
            .collect();
        partners.sort_unstable();
        partners
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(group: &TrackGroup) -> Vec<&str> {
        group.tracks.iter().map(|t| t.track.name.as_str()).collect()
    }

    #[test]
    fn test_empty_input() {
        assert!(group_tracks(&[]).is_empty());
    }

    #[test]
    fn test_strict_pair_merges_across_sources() {
        let occurrences = vec![
            TrackOccurrence::mock_liked(Track::mock("Yesterday", &["The Beatles"], 125000)),
            TrackOccurrence::mock_in(
                Track::mock("yesterday", &["the beatles"], 126500),
                "p1",
                "Classics",
            ),
        ];

        let groups = group_tracks(&occurrences);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].len(), 2);
        assert!(groups[0].match_reasons.has_strict_matches);
        assert!(!groups[0].match_reasons.has_fuzzy_matches);
        assert!(!groups[0].match_reasons.is_single_track);
        assert!(groups[0].is_liked());
        assert_eq!(groups[0].playlists()[0].name, "Classics");
    }

    #[test]
    fn test_fuzzy_pair_merges() {
        let occurrences = vec![
            TrackOccurrence::mock_liked(Track::mock("Song", &["X"], 200000)),
            TrackOccurrence::mock_liked(Track::mock("Song (Live)", &["X"], 200040)),
        ];

        let groups = group_tracks(&occurrences);

        assert_eq!(groups.len(), 1);
        assert!(groups[0].match_reasons.has_fuzzy_matches);
        assert!(!groups[0].match_reasons.has_strict_matches);
        assert_eq!(groups[0].representative_track.name, "Song");
    }

    #[test]
    fn test_both_criteria_recorded_for_one_pair() {
        let occurrences = vec![
            TrackOccurrence::mock_liked(Track::mock("Song", &["X"], 200000)),
            TrackOccurrence::mock_liked(Track::mock("song", &["X"], 200020)),
        ];

        let reasons = group_tracks(&occurrences)[0].match_reasons;
        assert!(reasons.has_strict_matches);
        assert!(reasons.has_fuzzy_matches);
        assert_eq!(
            reasons.criteria(),
            vec![MatchCriterion::Strict, MatchCriterion::Fuzzy]
        );
    }

    #[test]
    fn test_different_songs_stay_apart() {
        let occurrences = vec![
            TrackOccurrence::mock_liked(Track::mock("Love", &["X"], 200000)),
            TrackOccurrence::mock_liked(Track::mock("Love", &["X"], 210000)),
        ];

        let groups = group_tracks(&occurrences);

        assert_eq!(groups.len(), 2);
        for group in &groups {
            assert!(group.match_reasons.is_single_track);
            assert!(!group.match_reasons.has_strict_matches);
            assert!(!group.match_reasons.has_fuzzy_matches);
        }
    }

    #[test]
    fn test_strict_chain_is_transitive() {
        // a~b and b~c within 2s, but a and c are 3s apart.
        let occurrences = vec![
            TrackOccurrence::mock_liked(Track::mock("Chain", &["X"], 100000)),
            TrackOccurrence::mock_liked(Track::mock("Chain", &["X"], 101500)),
            TrackOccurrence::mock_liked(Track::mock("Chain", &["X"], 103000)),
        ];
        assert!(!crate::matcher::is_strict_match(
            &occurrences[0].track,
            &occurrences[2].track
        ));

        let groups = group_tracks(&occurrences);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].len(), 3);
    }

    #[test]
    fn test_mixed_chain_merges_flags() {
        // Strict pair on one side, fuzzy pair on the other, joined through b.
        let occurrences = vec![
            TrackOccurrence::mock_liked(Track::mock("Halo", &["X"], 300000)),
            TrackOccurrence::mock_liked(Track::mock("Halo (Radio Edit)", &["X"], 210000)),
            TrackOccurrence::mock_liked(Track::mock("halo", &["x"], 301500)),
            TrackOccurrence::mock_liked(Track::mock("Halo (Radio Edit) Remix", &["X"], 210030)),
            TrackOccurrence::mock_liked(Track::mock("HALO", &["X"], 299900)),
        ];

        let groups = group_tracks(&occurrences);
        assert_eq!(groups.len(), 2);

        let halo = &groups[0];
        assert_eq!(names(halo), vec!["Halo", "halo", "HALO"]);
        assert!(halo.match_reasons.has_strict_matches);

        let edit = &groups[1];
        assert_eq!(names(edit), vec!["Halo (Radio Edit)", "Halo (Radio Edit) Remix"]);
        assert!(edit.match_reasons.has_fuzzy_matches);
        assert!(!edit.match_reasons.has_strict_matches);
    }

    #[test]
    fn test_flags_survive_root_changes() {
        // 0~1 is fuzzy only; 1~2 and 2~3 are strict only and attach to the same root.
        let occurrences = vec![
            TrackOccurrence::mock_liked(Track::mock("Wave (Extended)", &["X"], 200000)),
            TrackOccurrence::mock_liked(Track::mock("Wave", &["X"], 200040)),
            TrackOccurrence::mock_liked(Track::mock("wave", &["X"], 201800)),
            TrackOccurrence::mock_liked(Track::mock("Wave", &["X"], 202500)),
        ];

        let groups = group_tracks(&occurrences);

        assert_eq!(groups.len(), 1);
        assert!(groups[0].match_reasons.has_strict_matches);
        assert!(groups[0].match_reasons.has_fuzzy_matches);
    }

    #[test]
    fn test_flags_carried_from_absorbed_root() {
        // {0, 2} joins by fuzzy, {1, 3, 4} by strict, then the fuzzy pair
        // 2~4 folds the strict set under root 0.
        let occurrences = vec![
            TrackOccurrence::mock_liked(Track::mock("Dawn (Dub)", &["X"], 100000)),
            TrackOccurrence::mock_liked(Track::mock("Dawn Club", &["X"], 101500)),
            TrackOccurrence::mock_liked(Track::mock("Dawn", &["X"], 100040)),
            TrackOccurrence::mock_liked(Track::mock("DAWN CLUB", &["X"], 102000)),
            TrackOccurrence::mock_liked(Track::mock("dawn club", &["X"], 100060)),
        ];
        assert!(!crate::matcher::is_strict_match(
            &occurrences[2].track,
            &occurrences[4].track
        ));

        let groups = group_tracks(&occurrences);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].len(), 5);
        assert!(groups[0].match_reasons.has_strict_matches);
        assert!(groups[0].match_reasons.has_fuzzy_matches);
        assert_eq!(groups[0].representative_track.name, "Dawn");
    }

    #[test]
    fn test_invalid_occurrences_dropped() {
        let mut no_id = Track::mock("Song", &["X"], 200000);
        no_id.id.clear();

        let occurrences = vec![
            TrackOccurrence::mock_liked(no_id),
            TrackOccurrence::mock_liked(Track::mock("", &["X"], 200000)),
            TrackOccurrence::mock_liked(Track::mock("Song", &["X"], 0)),
            TrackOccurrence::mock_liked(Track::default()),
            TrackOccurrence::mock_liked(Track::mock("Song", &["X"], 200000)),
        ];

        let groups = group_tracks(&occurrences);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].len(), 1);
        assert_eq!(groups[0].tracks[0], occurrences[4]);
    }

    #[test]
    fn test_partition_and_determinism() {
        let occurrences = vec![
            TrackOccurrence::mock_liked(Track::mock("Song", &["X"], 200000)),
            TrackOccurrence::mock_in(Track::mock("Other", &["Y"], 150000), "p1", "Mix"),
            TrackOccurrence::mock_in(Track::mock("Song (Live)", &["X"], 200040), "p2", "Live"),
            TrackOccurrence::mock_in(Track::mock("other", &["y"], 151000), "p2", "Live"),
            TrackOccurrence::mock_liked(Track::mock("Unique", &["Z"], 90000)),
            TrackOccurrence::mock_in(Track::mock("Song", &["X"], 200500), "p1", "Mix"),
        ];

        let first = group_tracks(&occurrences);
        let second = group_tracks(&occurrences);
        assert_eq!(first, second);

        let mut seen: Vec<&TrackOccurrence> = first.iter().flat_map(|g| g.tracks.iter()).collect();
        assert_eq!(seen.len(), occurrences.len());
        for occurrence in &occurrences {
            let position = seen
                .iter()
                .position(|o| *o == occurrence)
                .expect("every occurrence lands in a group");
            seen.remove(position);
        }

        for group in &first {
            assert!(group.tracks.iter().any(|t| t.track == group.representative_track));
        }
    }

    #[test]
    fn test_window_matches_exhaustive_pairs() {
        let durations = [1000u64, 2900, 3000, 3050, 5100, 9000, 2950, 1000];
        let keys: Vec<TrackKey> = durations
            .iter()
            .map(|&d| TrackKey::new(&Track::mock("Same", &["X"], d)))
            .collect();
        let window = DurationWindow::new(&keys);

        for i in 0..keys.len() {
            let expected: Vec<usize> = (i + 1..keys.len())
                .filter(|&j| durations[i].abs_diff(durations[j]) <= STRICT_DURATION_TOLERANCE_MS)
                .collect();
            assert_eq!(window.partners(i), expected, "index {}", i);
        }
    }
}

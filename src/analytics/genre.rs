use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{Tally, month_id, month_key};
use crate::dedup::TrackGroup;
use crate::spotify::ArtistInfo;

/// A song and the genres of its representative track's artists.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupGenres<'a> {
    pub group: &'a TrackGroup,
    pub genres: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenreStats {
    pub genre: String,
    pub track_count: usize,
    pub percentage: f64,
    pub artist_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenreMonth {
    /// `2024-03`
    pub month: String,
    /// Genre counts, most frequent first.
    pub genres: Vec<(String, usize)>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenreShare {
    pub genre: String,
    /// Share of the quarter's additions across the top genres.
    pub percentage: f64,
    pub actual: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuarterPoint {
    /// `Q1 2024`
    pub quarter: String,
    pub genres: Vec<GenreShare>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenreOverview {
    pub total_genres: usize,
    pub top_genre: Option<GenreStats>,
    pub avg_genres_per_track: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenreData {
    pub genre_stats: Vec<GenreStats>,
    pub top_genres: Vec<GenreStats>,
    pub quarterly: Vec<QuarterPoint>,
    pub overview: GenreOverview,
}

pub fn map_groups_to_genres<'a>(
    groups: &'a [TrackGroup],
    artists: &HashMap<String, ArtistInfo>,
) -> Vec<GroupGenres<'a>> {
    groups
        .iter()
        .map(|group| {
            let mut genres: Vec<String> = Vec::new();
            for artist in &group.representative_track.artists {
                let Some(info) = artists.get(&artist.id) else {
                    continue;
                };
                for genre in &info.genres {
                    if !genres.contains(genre) {
                        genres.push(genre.clone());
                    }
                }
            }
            GroupGenres { group, genres }
        })
        .collect()
}

/// Songs per genre, most common first. Percentages are of all songs,
/// including those without a known genre.
pub fn calculate_genre_stats(tagged: &[GroupGenres<'_>]) -> Vec<GenreStats> {
    let mut tally: Tally<(String, HashSet<String>)> = Tally::new();

    for entry in tagged {
        for genre in &entry.genres {
            let (_, artist_ids) = tally.bump(genre.clone(), || (genre.clone(), HashSet::new()));
            artist_ids.extend(
                entry
                    .group
                    .representative_track
                    .artists
                    .iter()
                    .map(|a| a.id.clone()),
            );
        }
    }

    let total = tagged.len();
    tally
        .into_sorted()
        .into_iter()
        .map(|((genre, artist_ids), track_count)| GenreStats {
            genre,
            track_count,
            percentage: percentage(track_count, total),
            artist_count: artist_ids.len(),
        })
        .collect()
}

/// Genre counts per month, counting every occurrence of each song.
pub fn calculate_genre_timeline(tagged: &[GroupGenres<'_>]) -> Vec<GenreMonth> {
    genre_counts_by_month(tagged)
        .into_iter()
        .map(|(month, tally)| GenreMonth {
            month: month_id(month),
            genres: tally.into_sorted(),
        })
        .collect()
}

fn genre_counts_by_month(tagged: &[GroupGenres<'_>]) -> BTreeMap<NaiveDate, Tally<String>> {
    let mut months: BTreeMap<NaiveDate, Tally<String>> = BTreeMap::new();

    for entry in tagged {
        for occurrence in &entry.group.tracks {
            let tally = months
                .entry(month_key(&occurrence.added_at))
                .or_insert_with(Tally::new);
            for genre in &entry.genres {
                tally.bump(genre.clone(), || genre.clone());
            }
        }
    }

    months
}

pub fn top_genres(stats: &[GenreStats], n: usize) -> Vec<GenreStats> {
    stats.iter().take(n).cloned().collect()
}

/// Distinct genres among songs with an addition inside `[start, end]`.
pub fn calculate_genre_diversity(
    tagged: &[GroupGenres<'_>],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> usize {
    let mut genres: HashSet<&str> = HashSet::new();

    for entry in tagged {
        for occurrence in &entry.group.tracks {
            if occurrence.added_at >= start && occurrence.added_at <= end {
                genres.extend(entry.genres.iter().map(String::as_str));
            }
        }
    }

    genres.len()
}

pub fn calculate_genre_data(
    groups: &[TrackGroup],
    artists: &HashMap<String, ArtistInfo>,
    top_n: usize,
) -> GenreData {
    let tagged = map_groups_to_genres(groups, artists);
    let genre_stats = calculate_genre_stats(&tagged);
    let top = top_genres(&genre_stats, top_n);

    let mut quarters: BTreeMap<(i32, u32), HashMap<String, usize>> = BTreeMap::new();
    for (month, tally) in genre_counts_by_month(&tagged) {
        let quarter = quarters
            .entry((month.year(), month.month0() / 3 + 1))
            .or_default();
        for (genre, count) in tally.entries {
            *quarter.entry(genre).or_insert(0) += count;
        }
    }

    let quarterly = quarters
        .into_iter()
        .map(|((year, quarter), counts)| {
            let actual = |genre: &str| counts.get(genre).copied().unwrap_or(0);
            let quarter_total: usize = top.iter().map(|g| actual(&g.genre)).sum();

            QuarterPoint {
                quarter: format!("Q{} {}", quarter, year),
                genres: top
                    .iter()
                    .map(|g| GenreShare {
                        genre: g.genre.clone(),
                        percentage: percentage(actual(&g.genre), quarter_total),
                        actual: actual(&g.genre),
                    })
                    .collect(),
            }
        })
        .collect();

    let assignments: usize = tagged.iter().map(|entry| entry.genres.len()).sum();
    let avg_genres_per_track = if groups.is_empty() {
        0.0
    } else {
        assignments as f64 / groups.len() as f64
    };

    GenreData {
        overview: GenreOverview {
            total_genres: genre_stats.len(),
            top_genre: genre_stats.first().cloned(),
            avg_genres_per_track,
        },
        genre_stats,
        top_genres: top,
        quarterly,
    }
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole > 0 {
        (part as f64 / whole as f64) * 100.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dedup::group_tracks;
    use crate::spotify::models::mock_date;
    use crate::spotify::{Track, TrackOccurrence};

    fn artist(id: &str, genres: &[&str]) -> (String, ArtistInfo) {
        (
            id.to_string(),
            ArtistInfo {
                id: id.to_string(),
                name: id.to_string(),
                genres: genres.iter().map(|g| g.to_string()).collect(),
                image_url: None,
            },
        )
    }

    fn lookup() -> HashMap<String, ArtistInfo> {
        HashMap::from([
            artist("artist_odesza", &["electronic", "chillwave"]),
            artist("artist_m83", &["electronic", "shoegaze"]),
            artist("artist_adele", &["pop"]),
        ])
    }

    fn library() -> Vec<TrackOccurrence> {
        let liked = |name: &str, artist: &str, duration_ms: u64, added_at: &str| {
            TrackOccurrence::mock_liked(Track::mock(name, &[artist], duration_ms)).at(added_at)
        };

        vec![
            liked("Say My Name", "ODESZA", 263000, "2024-01-10T00:00:00Z"),
            TrackOccurrence::mock_in(Track::mock("Say My Name", &["ODESZA"], 263500), "p1", "Chill")
                .at("2024-04-02T00:00:00Z"),
            liked("Midnight City", "M83", 244000, "2024-02-15T00:00:00Z"),
            liked("Hello", "Adele", 295000, "2024-05-01T00:00:00Z"),
            liked("Unknown", "Nobody", 180000, "2024-05-02T00:00:00Z"),
        ]
    }

    #[test]
    fn test_map_groups_to_genres() {
        let groups = group_tracks(&library());
        let tagged = map_groups_to_genres(&groups, &lookup());

        assert_eq!(tagged.len(), 4);
        assert_eq!(tagged[0].genres, vec!["electronic", "chillwave"]);
        assert!(tagged[3].genres.is_empty());
    }

    #[test]
    fn test_genre_stats() {
        let groups = group_tracks(&library());
        let tagged = map_groups_to_genres(&groups, &lookup());
        let stats = calculate_genre_stats(&tagged);

        assert_eq!(stats[0].genre, "electronic");
        assert_eq!(stats[0].track_count, 2);
        assert_eq!(stats[0].percentage, 50.0);
        assert_eq!(stats[0].artist_count, 2);
        assert_eq!(stats.len(), 4);
    }

    #[test]
    fn test_genre_timeline_counts_every_occurrence() {
        let groups = group_tracks(&library());
        let tagged = map_groups_to_genres(&groups, &lookup());
        let timeline = calculate_genre_timeline(&tagged);

        let months: Vec<&str> = timeline.iter().map(|m| m.month.as_str()).collect();
        assert_eq!(months, vec!["2024-01", "2024-02", "2024-04", "2024-05"]);
        assert!(timeline[2].genres.contains(&("chillwave".to_string(), 1)));
    }

    #[test]
    fn test_genre_diversity_window() {
        let groups = group_tracks(&library());
        let tagged = map_groups_to_genres(&groups, &lookup());

        let q1 = calculate_genre_diversity(
            &tagged,
            mock_date("2024-01-01T00:00:00Z"),
            mock_date("2024-03-31T23:59:59Z"),
        );
        assert_eq!(q1, 3);

        let may = calculate_genre_diversity(
            &tagged,
            mock_date("2024-05-01T00:00:00Z"),
            mock_date("2024-05-31T00:00:00Z"),
        );
        assert_eq!(may, 1);
    }

    #[test]
    fn test_genre_data_quarterly() {
        let groups = group_tracks(&library());
        let data = calculate_genre_data(&groups, &lookup(), 2);

        assert_eq!(data.top_genres.len(), 2);
        assert_eq!(data.overview.total_genres, 4);
        assert_eq!(data.overview.top_genre.as_ref().map(|g| g.genre.as_str()), Some("electronic"));
        // five genre assignments over four songs
        assert_eq!(data.overview.avg_genres_per_track, 1.25);

        let quarters: Vec<&str> = data.quarterly.iter().map(|q| q.quarter.as_str()).collect();
        assert_eq!(quarters, vec!["Q1 2024", "Q2 2024"]);

        let q1 = &data.quarterly[0];
        assert_eq!(q1.genres[0].genre, "electronic");
        assert_eq!(q1.genres[0].actual, 2);
        assert_eq!(q1.genres[1].actual, 1);
        assert!((q1.genres[0].percentage - 200.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_genre_data_empty() {
        let data = calculate_genre_data(&[], &lookup(), 10);
        assert!(data.genre_stats.is_empty());
        assert!(data.quarterly.is_empty());
        assert_eq!(data.overview.top_genre, None);
        assert_eq!(data.overview.avg_genres_per_track, 0.0);
    }
}

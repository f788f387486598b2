//! Read-only projections of grouped songs for the dashboard views.

pub mod dashboard;
pub mod genre;
pub mod timeline;

use std::collections::HashMap;

use chrono::{DateTime, Datelike, NaiveDate, Utc};

pub use dashboard::{
    AlbumCount, AlbumStats, ArtistCount, ArtistStats, DashboardStats, PlaylistSongStats,
    PlaylistedSong, calculate_album_stats, calculate_artist_stats, calculate_dashboard_stats,
    calculate_playlist_stats,
};
pub use genre::{
    GenreData, GenreMonth, GenreOverview, GenreShare, GenreStats, GroupGenres, QuarterPoint,
    calculate_genre_data, calculate_genre_diversity, calculate_genre_stats,
    calculate_genre_timeline, map_groups_to_genres, top_genres,
};
pub use timeline::{
    DayActivity, MonthCount, TimelineStats, TimelineSummary, WeeklyActivity, YearActivity,
    calculate_timeline_stats, calculate_weekly_activity,
};

/// Counts keyed by string, remembering first-seen order so that sorting by
/// count keeps ties stable.
#[derive(Debug)]
struct Tally<V> {
    slots: HashMap<String, usize>,
    entries: Vec<(V, usize)>,
}

impl<V> Tally<V> {
    fn new() -> Self {
        Self {
            slots: HashMap::new(),
            entries: Vec::new(),
        }
    }

    /// Increments `key`, creating its value on first sight. Returns the value.
    fn bump(&mut self, key: String, init: impl FnOnce() -> V) -> &mut V {
        let slot = match self.slots.get(&key) {
            Some(&slot) => slot,
            None => {
                self.entries.push((init(), 0));
                self.slots.insert(key, self.entries.len() - 1);
                self.entries.len() - 1
            }
        };
        let entry = &mut self.entries[slot];
        entry.1 += 1;
        &mut entry.0
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    /// Entries by count, highest first.
    fn into_sorted(mut self) -> Vec<(V, usize)> {
        self.entries.sort_by(|a, b| b.1.cmp(&a.1));
        self.entries
    }
}

fn month_key(date: &DateTime<Utc>) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date.date_naive())
}

/// `2024-03`
fn month_id(month: NaiveDate) -> String {
    month.format("%Y-%m").to_string()
}

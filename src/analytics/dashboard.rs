use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::Tally;
use crate::dedup::TrackGroup;
use crate::spotify::{Album, ArtistInfo, PlaylistRef, Track};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArtistCount {
    pub id: String,
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlbumCount {
    pub id: String,
    pub name: String,
    pub count: usize,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlaylistedSong {
    pub track: Track,
    pub playlist_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardStats {
    pub unique_songs: usize,
    pub total_tracks: usize,
    pub duplicates: usize,
    pub top_artists: Vec<ArtistCount>,
    pub top_albums: Vec<AlbumCount>,
    pub playlist_count: usize,
    pub avg_tracks_per_playlist: usize,
    pub most_playlisted: Vec<PlaylistedSong>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArtistStats {
    pub id: String,
    pub name: String,
    pub count: usize,
    pub tracks: Vec<Track>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlbumStats {
    pub album: Album,
    pub count: usize,
    pub tracks: Vec<Track>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlaylistSongStats {
    pub track: Track,
    pub total_instances: usize,
    pub playlist_count: usize,
    pub playlists: Vec<PlaylistRef>,
    pub is_in_liked_songs: bool,
}

fn album_key(album: &Album) -> String {
    format!("{}-{}", album.id, album.name)
}

/// Headline numbers and top lists. Artist and album counts use one
/// representative per song so duplicates do not inflate them.
pub fn calculate_dashboard_stats(groups: &[TrackGroup], top_n: usize) -> DashboardStats {
    let unique_songs = groups.len();
    let total_tracks: usize = groups.iter().map(|g| g.len()).sum();

    let mut artists: Tally<(String, String)> = Tally::new();
    let mut albums: Tally<(String, String, Option<String>)> = Tally::new();
    for group in groups {
        let track = &group.representative_track;
        for artist in &track.artists {
            artists.bump(artist.id.clone(), || (artist.id.clone(), artist.name.clone()));
        }
        albums.bump(album_key(&track.album), || {
            (
                track.album.id.clone(),
                track.album.name.clone(),
                track.album.image_url().map(str::to_string),
            )
        });
    }

    let top_artists = artists
        .into_sorted()
        .into_iter()
        .take(top_n)
        .map(|((id, name), count)| ArtistCount { id, name, count })
        .collect();

    let top_albums = albums
        .into_sorted()
        .into_iter()
        .take(top_n)
        .map(|((id, name, image_url), count)| AlbumCount {
            id,
            name,
            count,
            image_url,
        })
        .collect();

    let mut most_playlisted: Vec<PlaylistedSong> = groups
        .iter()
        .map(|group| PlaylistedSong {
            track: group.representative_track.clone(),
            playlist_count: group.playlists().len(),
        })
        .filter(|song| song.playlist_count > 0)
        .collect();
    most_playlisted.sort_by(|a, b| b.playlist_count.cmp(&a.playlist_count));
    most_playlisted.truncate(top_n);

    let mut per_playlist: Tally<()> = Tally::new();
    for occurrence in groups.iter().flat_map(|g| g.tracks.iter()) {
        if let Some(playlist) = occurrence.playlist() {
            per_playlist.bump(playlist.id.clone(), || ());
        }
    }
    let playlist_count = per_playlist.len();
    let playlist_tracks: usize = per_playlist.entries.iter().map(|(_, count)| count).sum();
    let avg_tracks_per_playlist = if playlist_count > 0 {
        (playlist_tracks as f64 / playlist_count as f64).round() as usize
    } else {
        0
    };

    DashboardStats {
        unique_songs,
        total_tracks,
        duplicates: total_tracks - unique_songs,
        top_artists,
        top_albums,
        playlist_count,
        avg_tracks_per_playlist,
        most_playlisted,
    }
}

pub fn calculate_artist_stats(
    groups: &[TrackGroup],
    artists: &HashMap<String, ArtistInfo>,
) -> Vec<ArtistStats> {
    let mut tally: Tally<ArtistStats> = Tally::new();

    for group in groups {
        let track = &group.representative_track;
        for artist in &track.artists {
            let stats = tally.bump(artist.id.clone(), || ArtistStats {
                id: artist.id.clone(),
                name: artist.name.clone(),
                count: 0,
                tracks: Vec::new(),
                image_url: artists.get(&artist.id).and_then(|info| info.image_url.clone()),
            });
            stats.tracks.push(track.clone());
        }
    }

    tally
        .into_sorted()
        .into_iter()
        .map(|(mut stats, count)| {
            stats.count = count;
            stats
        })
        .collect()
}

pub fn calculate_album_stats(groups: &[TrackGroup]) -> Vec<AlbumStats> {
    let mut tally: Tally<AlbumStats> = Tally::new();

    for group in groups {
        let track = &group.representative_track;
        let stats = tally.bump(album_key(&track.album), || AlbumStats {
            album: track.album.clone(),
            count: 0,
            tracks: Vec::new(),
        });
        stats.tracks.push(track.clone());
    }

    tally
        .into_sorted()
        .into_iter()
        .map(|(mut stats, count)| {
            stats.count = count;
            stats
        })
        .collect()
}

/// Songs that sit in at least one playlist, most spread out first.
pub fn calculate_playlist_stats(groups: &[TrackGroup]) -> Vec<PlaylistSongStats> {
    let mut stats: Vec<PlaylistSongStats> = groups
        .iter()
        .filter_map(|group| {
            let playlists: Vec<PlaylistRef> = group.playlists().into_iter().cloned().collect();
            if playlists.is_empty() {
                return None;
            }

            Some(PlaylistSongStats {
                track: group.representative_track.clone(),
                total_instances: group.len(),
                playlist_count: playlists.len(),
                playlists,
                is_in_liked_songs: group.is_liked(),
            })
        })
        .collect();

    stats.sort_by(|a, b| b.playlist_count.cmp(&a.playlist_count));
    stats
}

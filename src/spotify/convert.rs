//! Conversions from `rspotify` catalog models into library occurrences.
//!
//! Fetching pages from the Web API happens elsewhere; these functions only
//! reshape what the fetcher already has in hand.

use rspotify::model::{
    FullArtist, FullTrack, PlayableItem, PlaylistItem, SavedTrack, SimplifiedPlaylist,
};
use rspotify::prelude::*;
use tracing::debug;

use crate::spotify::models::{
    Album, Artist, ArtistInfo, Image, PlaylistRef, Track, TrackOccurrence,
};

impl From<&FullTrack> for Track {
    fn from(track: &FullTrack) -> Self {
        Self {
            // Local files have no catalog id and are dropped before grouping.
            id: track.id.as_ref().map(|id| id.id().to_string()).unwrap_or_default(),
            name: track.name.clone(),
            artists: track
                .artists
                .iter()
                .map(|a| Artist {
                    id: a.id.as_ref().map(|id| id.id().to_string()).unwrap_or_default(),
                    name: a.name.clone(),
                })
                .collect(),
            album: Album {
                id: track
                    .album
                    .id
                    .as_ref()
                    .map(|id| id.id().to_string())
                    .unwrap_or_default(),
                name: track.album.name.clone(),
                images: track
                    .album
                    .images
                    .iter()
                    .map(|image| Image {
                        url: image.url.clone(),
                        height: image.height,
                        width: image.width,
                    })
                    .collect(),
                total_tracks: None,
            },
            duration_ms: track.duration.num_milliseconds().max(0) as u64,
            popularity: Some(track.popularity.min(100) as u8),
        }
    }
}

impl From<&SimplifiedPlaylist> for PlaylistRef {
    fn from(playlist: &SimplifiedPlaylist) -> Self {
        Self {
            id: playlist.id.id().to_string(),
            name: playlist.name.clone(),
            owner: playlist
                .owner
                .display_name
                .clone()
                .unwrap_or_else(|| playlist.owner.id.id().to_string()),
            collaborative: playlist.collaborative,
        }
    }
}

impl From<&FullArtist> for ArtistInfo {
    fn from(artist: &FullArtist) -> Self {
        Self {
            id: artist.id.id().to_string(),
            name: artist.name.clone(),
            genres: artist.genres.clone(),
            image_url: artist.images.first().map(|image| image.url.clone()),
        }
    }
}

pub fn liked_occurrence(saved: &SavedTrack) -> TrackOccurrence {
    TrackOccurrence::liked(Track::from(&saved.track), saved.added_at)
}

/// Returns `None` for podcast episodes and items whose track was removed.
pub fn playlist_occurrence(
    playlist: &SimplifiedPlaylist,
    item: &PlaylistItem,
) -> Option<TrackOccurrence> {
    match &item.track {
        Some(PlayableItem::Track(track)) => Some(TrackOccurrence::in_playlist(
            Track::from(track),
            PlaylistRef::from(playlist),
            item.added_at.unwrap_or_default(),
        )),
        Some(PlayableItem::Episode(episode)) => {
            debug!("Skipping episode in playlist {}: {}", playlist.name, episode.name);
            None
        }
        None => None,
    }
}

pub fn playlist_occurrences(
    playlist: &SimplifiedPlaylist,
    items: &[PlaylistItem],
) -> Vec<TrackOccurrence> {
    items
        .iter()
        .filter_map(|item| playlist_occurrence(playlist, item))
        .collect()
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub width: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub total_tracks: Option<u32>,
}

impl Album {
    pub fn image_url(&self) -> Option<&str> {
        self.images.first().map(|image| image.url.as_str())
    }
}

/// The catalog's view of a song as it was when the library was fetched.
///
/// Every field defaults so that incomplete upstream records still
/// deserialize; [`Track::is_valid`] decides whether grouping keeps them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub artists: Vec<Artist>,
    #[serde(default)]
    pub album: Album,
    #[serde(default)]
    pub duration_ms: u64,
    #[serde(default)]
    pub popularity: Option<u8>,
}

impl Track {
    /// Region-locked and removed tracks come back without an id, a name or a duration.
    pub fn is_valid(&self) -> bool {
        !self.id.is_empty() && !self.name.is_empty() && self.duration_ms > 0
    }

    pub fn artist_names(&self) -> Vec<&str> {
        self.artists.iter().map(|a| a.name.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistRef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub collaborative: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum TrackSource {
    Liked,
    Playlist { playlist: PlaylistRef },
}

/// One appearance of a track in the liked list or in a playlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackOccurrence {
    #[serde(flatten)]
    pub source: TrackSource,
    pub added_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "null_track_as_default")]
    pub track: Track,
}

impl TrackOccurrence {
    pub fn liked(track: Track, added_at: DateTime<Utc>) -> Self {
        Self {
            source: TrackSource::Liked,
            added_at,
            track,
        }
    }

    pub fn in_playlist(track: Track, playlist: PlaylistRef, added_at: DateTime<Utc>) -> Self {
        Self {
            source: TrackSource::Playlist { playlist },
            added_at,
            track,
        }
    }

    pub fn playlist(&self) -> Option<&PlaylistRef> {
        match &self.source {
            TrackSource::Playlist { playlist } => Some(playlist),
            TrackSource::Liked => None,
        }
    }

    pub fn is_liked(&self) -> bool {
        matches!(self.source, TrackSource::Liked)
    }
}

/// Artist details used for genre lookups, keyed by artist id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

fn null_track_as_default<'de, D>(deserializer: D) -> std::result::Result<Track, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Track>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
impl Track {
    pub fn mock(name: &str, artists: &[&str], duration_ms: u64) -> Self {
        Self {
            id: format!("id_{}_{}", name.to_lowercase().replace(' ', "_"), duration_ms),
            name: name.to_string(),
            artists: artists
                .iter()
                .map(|a| Artist {
                    id: format!("artist_{}", a.to_lowercase().replace(' ', "_")),
                    name: a.to_string(),
                })
                .collect(),
            album: Album {
                id: "mock_album".to_string(),
                name: "Mock Album".to_string(),
                images: Vec::new(),
                total_tracks: Some(10),
            },
            duration_ms,
            popularity: Some(50),
        }
    }

    pub fn with_popularity(mut self, popularity: Option<u8>) -> Self {
        self.popularity = popularity;
        self
    }
}

#[cfg(test)]
impl PlaylistRef {
    pub fn mock(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            owner: "mock_user".to_string(),
            collaborative: false,
        }
    }
}

#[cfg(test)]
impl TrackOccurrence {
    pub fn mock_liked(track: Track) -> Self {
        Self::liked(track, mock_date("2024-01-15T10:00:00Z"))
    }

    pub fn mock_in(track: Track, playlist_id: &str, playlist_name: &str) -> Self {
        Self::in_playlist(
            track,
            PlaylistRef::mock(playlist_id, playlist_name),
            mock_date("2024-02-20T10:00:00Z"),
        )
    }

    pub fn at(mut self, added_at: &str) -> Self {
        self.added_at = mock_date(added_at);
        self
    }
}

#[cfg(test)]
pub fn mock_date(s: &str) -> DateTime<Utc> {
    s.parse().expect("valid RFC3339 timestamp in test fixture")
}

pub mod convert;
pub mod models;

pub use convert::{liked_occurrence, playlist_occurrence, playlist_occurrences};
pub use models::{
    Album, Artist, ArtistInfo, Image, PlaylistRef, Track, TrackOccurrence, TrackSource,
};

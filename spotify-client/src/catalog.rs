//! Search results and playback snapshots
//!
//! Spotify's payloads are large and sparsely populated; only the handful of
//! fields needed to pick a URI or show "now playing" are kept. Missing names
//! come back as `"Unknown"`.

use serde::Deserialize;

use crate::uri::ResourceKind;

const UNKNOWN: &str = "Unknown";

/// Minimum query length (in characters) worth sending to the search endpoint
pub const MIN_QUERY_LEN: usize = 2;

/// Results requested per resource type
pub const SEARCH_LIMIT: u32 = 10;

/// One playable search hit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchItem {
    pub name: String,
    /// Comma separated artists, or "Playlist by <owner>" for playlists
    pub artist: String,
    pub uri: String,
    pub kind: ResourceKind,
}

/// What the account is playing right now
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentPlayback {
    pub is_playing: bool,
    pub track_name: String,
    pub artist: String,
    pub album: String,
    pub progress_ms: u64,
    pub duration_ms: u64,
}

#[derive(Debug, Default, Deserialize)]
struct RawArtist {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawOwner {
    #[serde(default)]
    display_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawAlbum {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawItem {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    uri: String,
    #[serde(default)]
    artists: Vec<RawArtist>,
    #[serde(default)]
    owner: Option<RawOwner>,
    #[serde(default)]
    album: Option<RawAlbum>,
    #[serde(default)]
    duration_ms: u64,
}

/// Spotify returns `null` entries for unavailable items
#[derive(Debug, Default, Deserialize)]
struct RawPage {
    #[serde(default)]
    items: Vec<Option<RawItem>>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawSearch {
    #[serde(default)]
    tracks: RawPage,
    #[serde(default)]
    albums: RawPage,
    #[serde(default)]
    playlists: RawPage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawPlayback {
    #[serde(default)]
    is_playing: bool,
    #[serde(default)]
    progress_ms: Option<u64>,
    #[serde(default)]
    item: Option<RawItem>,
}

fn name_or_unknown(name: Option<String>) -> String {
    name.unwrap_or_else(|| UNKNOWN.to_string())
}

fn join_artists(artists: Vec<RawArtist>) -> String {
    artists
        .into_iter()
        .map(|a| name_or_unknown(a.name))
        .collect::<Vec<_>>()
        .join(", ")
}

impl RawSearch {
    /// Flatten into tracks, then albums, then playlists
    pub(crate) fn into_items(self) -> Vec<SearchItem> {
        let tracks = self.tracks.items.into_iter().flatten().map(|t| SearchItem {
            name: name_or_unknown(t.name),
            artist: join_artists(t.artists),
            uri: t.uri,
            kind: ResourceKind::Track,
        });

        let albums = self.albums.items.into_iter().flatten().map(|a| SearchItem {
            name: name_or_unknown(a.name),
            artist: join_artists(a.artists),
            uri: a.uri,
            kind: ResourceKind::Album,
        });

        let playlists = self.playlists.items.into_iter().flatten().map(|p| SearchItem {
            name: name_or_unknown(p.name),
            artist: format!(
                "Playlist by {}",
                name_or_unknown(p.owner.and_then(|o| o.display_name))
            ),
            uri: p.uri,
            kind: ResourceKind::Playlist,
        });

        tracks.chain(albums).chain(playlists).collect()
    }
}

impl RawPlayback {
    /// `None` when nothing is loaded (e.g. an ad or a fresh session)
    pub(crate) fn into_playback(self) -> Option<CurrentPlayback> {
        let item = self.item?;
        Some(CurrentPlayback {
            is_playing: self.is_playing,
            track_name: name_or_unknown(item.name),
            artist: join_artists(item.artists),
            album: name_or_unknown(item.album.and_then(|a| a.name)),
            progress_ms: self.progress_ms.unwrap_or(0),
            duration_ms: item.duration_ms,
        })
    }
}

/// Whether `query` is long enough to search for
pub fn is_searchable(query: &str) -> bool {
    query.trim().chars().count() >= MIN_QUERY_LEN
}

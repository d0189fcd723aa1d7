//! Classification of Spotify resource URIs

/// What kind of playable thing a URI points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Album,
    Playlist,
    /// Anything that is not a container; started as a single-item queue
    Track,
}

impl ResourceKind {
    /// Classify a `spotify:<kind>:<id>` URI
    pub fn of(uri: &str) -> Self {
        if uri.starts_with("spotify:album:") {
            ResourceKind::Album
        } else if uri.starts_with("spotify:playlist:") {
            ResourceKind::Playlist
        } else {
            ResourceKind::Track
        }
    }

    /// Containers are started by context reference rather than by a URI list
    pub fn is_contextual(self) -> bool {
        matches!(self, ResourceKind::Album | ResourceKind::Playlist)
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ResourceKind::Album => "album",
            ResourceKind::Playlist => "playlist",
            ResourceKind::Track => "track",
        };
        f.pad(name)
    }
}

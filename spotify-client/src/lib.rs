//! Minimal blocking client for the Spotify Web API
//!
//! This crate covers exactly what a tag-driven player needs from Spotify:
//! listing the user's output devices, starting playback of a track or a
//! container, pausing, searching the catalog for URIs to bind to tags, and
//! showing what is playing. Authentication is delegated to a [`TokenProvider`].

mod catalog;
mod error;
pub mod token;
mod uri;

pub use catalog::{is_searchable, CurrentPlayback, SearchItem, MIN_QUERY_LEN, SEARCH_LIMIT};
pub use error::SpotifyError;
pub use token::{ClientCredentials, StaticToken, TokenCache, TokenProvider, DEFAULT_CACHE_FILE};
pub use uri::ResourceKind;

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use serde_json::json;

use crate::catalog::{RawPlayback, RawSearch};
use crate::error::from_ureq;

/// Production API root
pub const DEFAULT_API_BASE: &str = "https://api.spotify.com";

/// An output device reported by the Spotify Connect API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    pub id: String,
    pub name: String,
    /// Device type as reported by Spotify ("Computer", "Speaker", ...)
    pub kind: String,
    pub is_active: bool,
}

#[derive(Debug, Deserialize)]
struct RawDevice {
    id: Option<String>,
    #[serde(default)]
    name: String,
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    is_active: bool,
}

#[derive(Debug, Deserialize)]
struct DevicesResponse {
    #[serde(default)]
    devices: Vec<RawDevice>,
}

/// A blocking Spotify Web API client
#[derive(Clone)]
pub struct SpotifyClient {
    agent: ureq::Agent,
    base_url: String,
    tokens: Arc<dyn TokenProvider>,
}

impl SpotifyClient {
    /// Create a client against the production API
    pub fn new(tokens: Arc<dyn TokenProvider>) -> Self {
        Self::with_base_url(DEFAULT_API_BASE, tokens)
    }

    /// Create a client against a different API root (mock servers, proxies)
    pub fn with_base_url(base_url: impl Into<String>, tokens: Arc<dyn TokenProvider>) -> Self {
        Self {
            agent: ureq::AgentBuilder::new()
                .timeout_connect(Duration::from_secs(5))
                .timeout_read(Duration::from_secs(10))
                .build(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            tokens,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn bearer(&self) -> Result<String, SpotifyError> {
        Ok(format!("Bearer {}", self.tokens.access_token()?))
    }

    /// List the devices available for playback, in the order Spotify returns them.
    ///
    /// Restricted devices come back without an id and cannot be targeted, so
    /// they are skipped.
    pub fn devices(&self) -> Result<Vec<Device>, SpotifyError> {
        let response: DevicesResponse = self
            .agent
            .get(&self.url("/v1/me/player/devices"))
            .set("Authorization", &self.bearer()?)
            .call()
            .map_err(from_ureq)?
            .into_json()
            .map_err(|e| SpotifyError::Parse(e.to_string()))?;

        Ok(response
            .devices
            .into_iter()
            .filter_map(|raw| {
                let id = raw.id?;
                Some(Device {
                    id,
                    name: raw.name,
                    kind: raw.kind,
                    is_active: raw.is_active,
                })
            })
            .collect())
    }

    /// Start playback of `uri` on `device_id`.
    ///
    /// With `contextual` set the URI is sent as `context_uri` (albums and
    /// playlists); otherwise it is sent as a one-element `uris` list.
    pub fn start_playback(
        &self,
        device_id: &str,
        uri: &str,
        contextual: bool,
    ) -> Result<(), SpotifyError> {
        let body = if contextual {
            json!({ "context_uri": uri })
        } else {
            json!({ "uris": [uri] })
        };

        self.agent
            .put(&self.url("/v1/me/player/play"))
            .query("device_id", device_id)
            .set("Authorization", &self.bearer()?)
            .send_json(body)
            .map_err(from_ureq)?;

        tracing::debug!("Started {} on device {}", uri, device_id);
        Ok(())
    }

    /// Pause playback on the user's active device
    pub fn pause_playback(&self) -> Result<(), SpotifyError> {
        self.agent
            .put(&self.url("/v1/me/player/pause"))
            .set("Authorization", &self.bearer()?)
            .set("Content-Length", "0")
            .call()
            .map_err(from_ureq)?;
        Ok(())
    }

    /// Search tracks, albums and playlists.
    ///
    /// Queries shorter than [`MIN_QUERY_LEN`] characters return no results
    /// without a request.
    pub fn search(&self, query: &str) -> Result<Vec<SearchItem>, SpotifyError> {
        let query = query.trim();
        if !is_searchable(query) {
            return Ok(Vec::new());
        }

        let raw: RawSearch = self
            .agent
            .get(&self.url("/v1/search"))
            .query("q", query)
            .query("type", "track,album,playlist")
            .query("limit", &SEARCH_LIMIT.to_string())
            .set("Authorization", &self.bearer()?)
            .call()
            .map_err(from_ureq)?
            .into_json()
            .map_err(|e| SpotifyError::Parse(e.to_string()))?;

        Ok(raw.into_items())
    }

    /// What is playing right now, or `None` when nothing is.
    ///
    /// Spotify answers `204 No Content` when no device has an active session.
    pub fn current_playback(&self) -> Result<Option<CurrentPlayback>, SpotifyError> {
        let response = self
            .agent
            .get(&self.url("/v1/me/player"))
            .set("Authorization", &self.bearer()?)
            .call()
            .map_err(from_ureq)?;

        if response.status() == 204 {
            return Ok(None);
        }

        let body = response
            .into_string()
            .map_err(|e| SpotifyError::Network(e.to_string()))?;
        if body.trim().is_empty() {
            return Ok(None);
        }

        let raw: RawPlayback =
            serde_json::from_str(&body).map_err(|e| SpotifyError::Parse(e.to_string()))?;
        Ok(raw.into_playback())
    }
}

impl std::fmt::Debug for SpotifyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpotifyClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

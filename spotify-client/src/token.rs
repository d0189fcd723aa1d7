//! Access token providers
//!
//! The interactive OAuth login lives outside this crate. What lives here is the
//! part the player needs at runtime: reading the token another process cached,
//! and refreshing it when it is about to expire.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::{from_ureq, SpotifyError};

/// Default location of the accounts service token endpoint
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

/// Default token cache file
pub const DEFAULT_CACHE_FILE: &str = ".spotifycache";

/// Tokens expiring within this many seconds are refreshed before use
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Source of bearer tokens for API requests
pub trait TokenProvider: Send + Sync {
    /// Return a currently valid access token
    fn access_token(&self) -> Result<String, SpotifyError>;
}

/// A fixed token, mostly useful for tests and short-lived tooling
#[derive(Debug, Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl TokenProvider for StaticToken {
    fn access_token(&self) -> Result<String, SpotifyError> {
        Ok(self.0.clone())
    }
}

/// Token record as stored in the cache file.
///
/// The layout matches the common Spotify OAuth cache format, so a login made
/// with other tooling can be reused. Unknown fields are preserved on rewrite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedToken {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Expiry as seconds since the Unix epoch
    #[serde(default)]
    pub expires_at: i64,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl CachedToken {
    /// Whether the token expires within the refresh margin of `now`
    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_at - EXPIRY_MARGIN_SECS <= now
    }
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access_token: String,
    expires_in: i64,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    scope: Option<String>,
}

/// Client application credentials used for token refresh
#[derive(Debug, Clone)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
}

/// File-backed token provider with automatic refresh
pub struct TokenCache {
    path: PathBuf,
    credentials: Option<ClientCredentials>,
    token_url: String,
    agent: ureq::Agent,
    current: Mutex<Option<CachedToken>>,
}

impl TokenCache {
    /// Create a provider reading the cache at `path`
    pub fn new(path: impl Into<PathBuf>, credentials: Option<ClientCredentials>) -> Self {
        Self {
            path: path.into(),
            credentials,
            token_url: DEFAULT_TOKEN_URL.to_string(),
            agent: ureq::AgentBuilder::new()
                .timeout_connect(Duration::from_secs(5))
                .timeout_read(Duration::from_secs(10))
                .build(),
            current: Mutex::new(None),
        }
    }

    /// Override the token endpoint (used against a mock server in tests)
    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a cached token exists at all
    pub fn is_authenticated(&self) -> bool {
        self.current.lock().is_some() || self.path.exists()
    }

    /// Forget the login: drop the in-memory token and delete the cache file.
    ///
    /// Returns `false` when there was no cache file to delete.
    pub fn clear(&self) -> Result<bool, SpotifyError> {
        self.current.lock().take();
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::info!("Removed Spotify token cache {}", self.path.display());
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(SpotifyError::TokenCache(format!("{}: {}", self.path.display(), e))),
        }
    }

    fn read_cache(&self) -> Result<CachedToken, SpotifyError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(SpotifyError::NotAuthenticated),
            Err(e) => return Err(SpotifyError::TokenCache(format!("{}: {}", self.path.display(), e))),
        };
        serde_json::from_str(&raw)
            .map_err(|e| SpotifyError::TokenCache(format!("{}: {}", self.path.display(), e)))
    }

    fn write_cache(&self, token: &CachedToken) -> Result<(), SpotifyError> {
        let raw = serde_json::to_string(token).map_err(|e| SpotifyError::TokenCache(e.to_string()))?;
        fs::write(&self.path, raw)
            .map_err(|e| SpotifyError::TokenCache(format!("{}: {}", self.path.display(), e)))
    }

    fn refresh(&self, token: &CachedToken, now: i64) -> Result<CachedToken, SpotifyError> {
        let credentials = self.credentials.as_ref().ok_or(SpotifyError::NotAuthenticated)?;
        let refresh_token = token.refresh_token.as_deref().ok_or(SpotifyError::NotAuthenticated)?;

        tracing::debug!("Refreshing Spotify access token");

        let response: RefreshResponse = self
            .agent
            .post(&self.token_url)
            .send_form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
                ("client_id", credentials.client_id.as_str()),
                ("client_secret", credentials.client_secret.as_str()),
            ])
            .map_err(from_ureq)?
            .into_json()
            .map_err(|e| SpotifyError::Parse(e.to_string()))?;

        let mut refreshed = token.clone();
        refreshed.access_token = response.access_token;
        refreshed.expires_at = now + response.expires_in;
        refreshed
            .extra
            .insert("expires_in".to_string(), response.expires_in.into());
        if let Some(new_refresh) = response.refresh_token {
            refreshed.refresh_token = Some(new_refresh);
        }
        if let Some(scope) = response.scope {
            refreshed.extra.insert("scope".to_string(), scope.into());
        }
        Ok(refreshed)
    }
}

impl TokenProvider for TokenCache {
    fn access_token(&self) -> Result<String, SpotifyError> {
        let mut current = self.current.lock();
        let token = match current.take() {
            Some(token) => token,
            None => self.read_cache()?,
        };

        let now = unix_now();
        if !token.is_expired(now) {
            let access = token.access_token.clone();
            *current = Some(token);
            return Ok(access);
        }

        let refreshed = match self.refresh(&token, now) {
            Ok(refreshed) => refreshed,
            Err(e) => {
                // Keep the stale token around so the next call retries the refresh.
                *current = Some(token);
                return Err(e);
            }
        };

        if let Err(e) = self.write_cache(&refreshed) {
            tracing::warn!("Refreshed token could not be persisted: {}", e);
        }
        let access = refreshed.access_token.clone();
        *current = Some(refreshed);
        Ok(access)
    }
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

//! Error types for the Spotify client

use thiserror::Error;

/// Errors that can occur while talking to the Spotify Web API
#[derive(Debug, Error)]
pub enum SpotifyError {
    /// Network or transport level failure (DNS, connect, timeout)
    #[error("Network/HTTP error: {0}")]
    Network(String),

    /// Response body could not be decoded
    #[error("Response parsing error: {0}")]
    Parse(String),

    /// Non-success status returned by the API
    #[error("Spotify API error {status}: {message}")]
    Api { status: u16, message: String },

    /// No usable access token is available
    #[error("Not authenticated with Spotify")]
    NotAuthenticated,

    /// The token cache file could not be read or written
    #[error("Token cache error: {0}")]
    TokenCache(String),
}

impl SpotifyError {
    /// True when the API rejected the request because no device is active
    pub fn is_no_active_device(&self) -> bool {
        matches!(self, SpotifyError::Api { status: 404, .. })
    }
}

/// Map a ureq failure onto a `SpotifyError`, pulling the message out of the
/// JSON error body when the API provided one.
pub(crate) fn from_ureq(error: ureq::Error) -> SpotifyError {
    match error {
        ureq::Error::Status(status, response) => {
            let message = response
                .into_string()
                .ok()
                .and_then(|body| error_message(&body))
                .unwrap_or_else(|| format!("HTTP {}", status));
            SpotifyError::Api { status, message }
        }
        ureq::Error::Transport(transport) => SpotifyError::Network(transport.to_string()),
    }
}

/// Extract a human readable message from either error body shape Spotify uses:
/// `{"error": {"status": 404, "message": "..."}}` for the Web API and
/// `{"error": "invalid_grant", "error_description": "..."}` for the accounts service.
pub(crate) fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let error = value.get("error")?;

    if let Some(message) = error.get("message").and_then(|m| m.as_str()) {
        return Some(message.to_string());
    }

    let code = error.as_str()?;
    match value.get("error_description").and_then(|d| d.as_str()) {
        Some(description) => Some(format!("{}: {}", code, description)),
        None => Some(code.to_string()),
    }
}

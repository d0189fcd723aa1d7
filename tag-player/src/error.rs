//! Error types for the reconciliation core
//!
//! None of these are fatal. Decode errors drop a single frame; external
//! service errors mark one playback action as failed.

use spotify_client::SpotifyError;
use thiserror::Error;

/// A serial frame that could not be turned into a presence event
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    #[error("Frame is not a JSON object")]
    NotAnObject,

    #[error("Missing field '{0}'")]
    MissingField(&'static str),

    #[error("Field '{0}' must be a non-empty string")]
    InvalidField(&'static str),

    #[error("Unknown event type '{0}'")]
    UnknownEvent(String),
}

/// A playback call against the streaming service failed
#[derive(Debug, Error)]
pub enum ExternalServiceError {
    /// The account has no device that playback could be sent to
    #[error("No Spotify devices available")]
    NoDevice,

    /// No usable credentials; the user has to log in again
    #[error("Not authenticated with the streaming service")]
    NotAuthenticated,

    /// Any other failure reported by the service client
    #[error("Streaming service error: {0}")]
    Service(#[source] SpotifyError),

    /// The playback worker is gone
    #[error("Playback dispatcher has shut down")]
    DispatcherClosed,
}

impl ExternalServiceError {
    /// True when the service has no active device to act on, which is the
    /// normal outcome of pausing when nothing is playing
    pub fn is_no_active_device(&self) -> bool {
        match self {
            ExternalServiceError::NoDevice => true,
            ExternalServiceError::Service(e) => e.is_no_active_device(),
            _ => false,
        }
    }
}

impl From<SpotifyError> for ExternalServiceError {
    fn from(error: SpotifyError) -> Self {
        match error {
            SpotifyError::NotAuthenticated => ExternalServiceError::NotAuthenticated,
            other => ExternalServiceError::Service(other),
        }
    }
}

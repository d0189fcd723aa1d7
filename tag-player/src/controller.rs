//! Playback controller
//!
//! Adapts engine decisions to the streaming service's device/playback API.

use std::sync::Arc;

use spotify_client::{ResourceKind, SpotifyClient};

use crate::engine::PlaybackCommand;
use crate::error::ExternalServiceError;

/// The subset of the streaming service the controller drives
pub trait PlaybackService {
    /// Ids of available output devices, in the service's order
    fn list_devices(&self) -> Result<Vec<String>, ExternalServiceError>;

    fn start_playback(
        &self,
        device_id: &str,
        resource_uri: &str,
        contextual: bool,
    ) -> Result<(), ExternalServiceError>;

    fn pause_playback(&self) -> Result<(), ExternalServiceError>;
}

impl PlaybackService for SpotifyClient {
    fn list_devices(&self) -> Result<Vec<String>, ExternalServiceError> {
        Ok(self.devices()?.into_iter().map(|d| d.id).collect())
    }

    fn start_playback(
        &self,
        device_id: &str,
        resource_uri: &str,
        contextual: bool,
    ) -> Result<(), ExternalServiceError> {
        Ok(SpotifyClient::start_playback(self, device_id, resource_uri, contextual)?)
    }

    fn pause_playback(&self) -> Result<(), ExternalServiceError> {
        Ok(SpotifyClient::pause_playback(self)?)
    }
}

impl<S: PlaybackService + ?Sized> PlaybackService for Arc<S> {
    fn list_devices(&self) -> Result<Vec<String>, ExternalServiceError> {
        (**self).list_devices()
    }

    fn start_playback(
        &self,
        device_id: &str,
        resource_uri: &str,
        contextual: bool,
    ) -> Result<(), ExternalServiceError> {
        (**self).start_playback(device_id, resource_uri, contextual)
    }

    fn pause_playback(&self) -> Result<(), ExternalServiceError> {
        (**self).pause_playback()
    }
}

/// Executes play/pause decisions against a [`PlaybackService`]
///
/// Holds no state of its own beyond the service handle.
#[derive(Debug, Clone)]
pub struct PlaybackController<S> {
    service: S,
}

impl<S: PlaybackService> PlaybackController<S> {
    pub fn new(service: S) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Start `resource_uri` on the first available device.
    ///
    /// Albums and playlists are started by context so the whole container
    /// plays; anything else is started as a single track.
    pub fn play(&self, resource_uri: &str) -> Result<(), ExternalServiceError> {
        let devices = self.service.list_devices()?;
        let device = devices.first().ok_or(ExternalServiceError::NoDevice)?;

        let contextual = ResourceKind::of(resource_uri).is_contextual();
        self.service.start_playback(device, resource_uri, contextual)?;

        tracing::info!("Playing {} on device {}", resource_uri, device);
        Ok(())
    }

    /// Pause playback. Best effort: failures are logged and swallowed. No
    /// active device just means nothing was playing; anything else is a warning.
    pub fn pause(&self) -> Result<(), ExternalServiceError> {
        match self.service.pause_playback() {
            Ok(()) => tracing::info!("Paused playback"),
            Err(e) if e.is_no_active_device() => tracing::debug!("Nothing to pause: {}", e),
            Err(e) => tracing::warn!("Pause failed: {}", e),
        }
        Ok(())
    }

    /// Execute one engine decision
    pub fn execute(&self, command: &PlaybackCommand) -> Result<(), ExternalServiceError> {
        match command {
            PlaybackCommand::Play { resource, .. } => self.play(&resource.resource_uri),
            PlaybackCommand::Pause { .. } => self.pause(),
        }
    }
}

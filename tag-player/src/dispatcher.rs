//! Playback dispatch
//!
//! Engine decisions are handed to a [`CommandSink`]. The controller itself is a
//! sink (synchronous execution); [`PlaybackDispatcher`] is the queued variant
//! that keeps slow network calls off the serial read loop.

use std::sync::mpsc::{self, SyncSender};
use std::thread::{self, JoinHandle};

use crate::controller::{PlaybackController, PlaybackService};
use crate::engine::PlaybackCommand;
use crate::error::ExternalServiceError;

/// Default number of commands that may wait for the worker
pub const DEFAULT_QUEUE_CAPACITY: usize = 16;

/// Receives playback decisions in issue order
pub trait CommandSink {
    fn submit(&mut self, command: PlaybackCommand) -> Result<(), ExternalServiceError>;
}

impl<S: PlaybackService> CommandSink for PlaybackController<S> {
    fn submit(&mut self, command: PlaybackCommand) -> Result<(), ExternalServiceError> {
        self.execute(&command)
    }
}

/// Bounded queue in front of a single playback worker thread.
///
/// One worker means at most one call to the streaming service is in flight
/// and commands run in the order they were submitted. A full queue blocks the
/// submitter instead of dropping a command.
pub struct PlaybackDispatcher {
    tx: Option<SyncSender<PlaybackCommand>>,
    worker: Option<JoinHandle<()>>,
}

impl PlaybackDispatcher {
    /// Spawn the worker thread owning `controller`
    pub fn spawn<S>(controller: PlaybackController<S>, capacity: usize) -> Self
    where
        S: PlaybackService + Send + 'static,
    {
        let (tx, rx) = mpsc::sync_channel::<PlaybackCommand>(capacity);

        let worker = thread::spawn(move || {
            tracing::info!("Playback worker started");

            for command in rx {
                tracing::debug!("Executing {}", command);
                if let Err(e) = controller.execute(&command) {
                    tracing::warn!("{} failed: {}", command, e);
                }
            }

            tracing::info!("Playback worker stopped");
        });

        Self {
            tx: Some(tx),
            worker: Some(worker),
        }
    }

    /// Close the queue, let the worker drain it, and wait for it to exit
    pub fn shutdown(mut self) {
        self.close();
    }

    fn close(&mut self) {
        self.tx.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::error!("Playback worker panicked");
            }
        }
    }
}

impl CommandSink for PlaybackDispatcher {
    fn submit(&mut self, command: PlaybackCommand) -> Result<(), ExternalServiceError> {
        let tx = self.tx.as_ref().ok_or(ExternalServiceError::DispatcherClosed)?;
        tx.send(command)
            .map_err(|_| ExternalServiceError::DispatcherClosed)
    }
}

impl Drop for PlaybackDispatcher {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::ResolvedResource;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<String>>,
    }

    impl PlaybackService for Recorder {
        fn list_devices(&self) -> Result<Vec<String>, ExternalServiceError> {
            Ok(vec!["dev".to_string()])
        }

        fn start_playback(
            &self,
            _device_id: &str,
            resource_uri: &str,
            _contextual: bool,
        ) -> Result<(), ExternalServiceError> {
            self.calls.lock().push(format!("play {}", resource_uri));
            Ok(())
        }

        fn pause_playback(&self) -> Result<(), ExternalServiceError> {
            self.calls.lock().push("pause".to_string());
            Ok(())
        }
    }

    #[test]
    fn test_commands_run_in_order_on_worker() {
        let recorder = Arc::new(Recorder::default());
        let mut dispatcher =
            PlaybackDispatcher::spawn(PlaybackController::new(Arc::clone(&recorder)), 4);

        for tag in ["A", "B", "C"] {
            dispatcher
                .submit(PlaybackCommand::Play {
                    tag: tag.into(),
                    resource: ResolvedResource::new(format!("spotify:track:{}", tag)),
                })
                .unwrap();
            dispatcher
                .submit(PlaybackCommand::Pause { tag: tag.into() })
                .unwrap();
        }
        dispatcher.shutdown();

        assert_eq!(
            *recorder.calls.lock(),
            vec![
                "play spotify:track:A",
                "pause",
                "play spotify:track:B",
                "pause",
                "play spotify:track:C",
                "pause"
            ]
        );
    }

    #[test]
    fn test_controller_is_a_synchronous_sink() {
        let recorder = Arc::new(Recorder::default());
        let mut controller = PlaybackController::new(Arc::clone(&recorder));
        controller
            .submit(PlaybackCommand::Pause { tag: "A".into() })
            .unwrap();
        assert_eq!(*recorder.calls.lock(), vec!["pause"]);
    }
}

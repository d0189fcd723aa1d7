//! Transport error taxonomy

use std::io;
use thiserror::Error;

/// Failures of the serial link.
///
/// Every variant except [`TransportError::Glitch`] means the port handle is no
/// longer trustworthy and has to be reopened.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The device could not be opened
    #[error("Failed to open {port}: {reason}")]
    Open { port: String, reason: String },

    /// The device stopped delivering data (unplugged, powered off)
    #[error("Serial link closed by device")]
    Closed,

    /// An I/O error that invalidates the connection
    #[error("Serial link lost: {0}")]
    LinkLost(#[source] io::Error),

    /// A read error that does not invalidate the connection
    #[error("Transient read error: {0}")]
    Glitch(#[source] io::Error),
}

impl TransportError {
    /// Whether recovering from this error requires reopening the port
    pub fn is_link_failure(&self) -> bool {
        !matches!(self, TransportError::Glitch(_))
    }

    /// Classify a read error. `None` means "no data yet", which is not an error.
    pub fn from_read_error(error: io::Error) -> Option<Self> {
        match error.kind() {
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => None,
            io::ErrorKind::Interrupted
            | io::ErrorKind::InvalidData
            | io::ErrorKind::InvalidInput => Some(TransportError::Glitch(error)),
            _ => Some(TransportError::LinkLost(error)),
        }
    }
}

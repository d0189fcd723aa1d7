//! Error types for the mapping store

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by [`crate::MappingStore`]
#[derive(Debug, Error)]
pub enum StoreError {
    /// The mapping file could not be read or written
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The mapping file exists but is not a valid mapping document
    #[error("Malformed mapping file {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A mapping was rejected before being written
    #[error("Invalid mapping: {0}")]
    InvalidMapping(String),
}

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

//! Storage error types for scritti-storage.
//!
//! [`StorageError::NotFound`] is kept separate from other I/O failures so the
//! store can report a missing asset as a recoverable condition.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by a [`FileSystem`](crate::FileSystem) backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// No resource exists at the given path.
    #[error("file not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// Reading or writing the resource failed.
    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The change feed for a resource could not be set up.
    #[error("cannot watch {}: {reason}", path.display())]
    Watch { path: PathBuf, reason: String },
}

impl StorageError {
    /// Maps an `std::io::Error`, treating `NotFound` specially.
    pub fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            StorageError::NotFound { path }
        } else {
            StorageError::Io { path, source }
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound { .. })
    }
}

//! The [`FileSystem`] trait: the minimal capability set the store needs
//! from a byte-storage medium.
//!
//! Reads and writes are synchronous and short (assets are small text
//! files). Only the change feed is asynchronous: [`FileSystem::watch`]
//! hands back a tokio channel that closes once the supplied token is
//! cancelled.

use std::io::{Read, Write};
use std::path::Path;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::StorageError;
use crate::types::WriteEvent;

/// A named-resource byte store with write notifications.
pub trait FileSystem: Send + Sync {
    /// Opens a resource for reading.
    ///
    /// Returns [`StorageError::NotFound`] when nothing exists at `path`.
    fn open(&self, path: &Path) -> Result<Box<dyn Read + Send>, StorageError>;

    /// Creates (or truncates) a resource for writing.
    ///
    /// Content becomes visible to readers and watchers when the writer is
    /// flushed or dropped.
    fn create(&self, path: &Path) -> Result<Box<dyn Write + Send>, StorageError>;

    /// Subscribes to writes of the resource at `path`.
    ///
    /// The returned channel yields one event per observed write (coalesced
    /// while an event is still pending) and closes when `cancel` fires.
    fn watch(
        &self,
        path: &Path,
        cancel: CancellationToken,
    ) -> Result<mpsc::Receiver<WriteEvent>, StorageError>;

    /// Reads a whole resource.
    fn read(&self, path: &Path) -> Result<Vec<u8>, StorageError> {
        let mut reader = self.open(path)?;
        let mut buf = Vec::new();
        reader
            .read_to_end(&mut buf)
            .map_err(|e| StorageError::from_io(path, e))?;
        Ok(buf)
    }

    /// Replaces a whole resource, creating it if absent.
    fn write(&self, path: &Path, content: &[u8]) -> Result<(), StorageError> {
        let mut writer = self.create(path)?;
        writer
            .write_all(content)
            .and_then(|_| writer.flush())
            .map_err(|e| StorageError::from_io(path, e))
    }
}

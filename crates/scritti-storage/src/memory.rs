//! In-memory implementation of [`FileSystem`].
//!
//! [`MemoryFileSystem`] is the backend used by tests and by embedders that
//! keep asset sources in process. Each path maps to a shared file entry that
//! holds the current bytes and the senders of every active watch on it.

use std::collections::HashMap;
use std::io::{self, Cursor, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use dashmap::DashMap;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_util::sync::CancellationToken;

use crate::error::StorageError;
use crate::traits::FileSystem;
use crate::types::{WriteEvent, WATCH_BUFFER};

#[derive(Debug, Default)]
struct FileState {
    content: Vec<u8>,
    watchers: HashMap<u64, mpsc::Sender<WriteEvent>>,
}

#[derive(Debug, Default)]
struct MemoryFileEntry {
    state: Mutex<FileState>,
}

impl MemoryFileEntry {
    fn lock(&self) -> MutexGuard<'_, FileState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replaces the content and wakes every watcher.
    fn commit(&self, path: &Path, content: Vec<u8>) {
        let mut state = self.lock();
        state.content = content;
        state.watchers.retain(|_, watcher| {
            match watcher.try_send(WriteEvent {
                path: path.to_path_buf(),
            }) {
                Ok(()) | Err(TrySendError::Full(_)) => true,
                Err(TrySendError::Closed(_)) => false,
            }
        });
    }
}

/// Writer returned by [`MemoryFileSystem::create`]. Buffers until flushed.
struct MemoryFileWriter {
    path: PathBuf,
    entry: Arc<MemoryFileEntry>,
    buffer: Vec<u8>,
    pending: bool,
}

impl Write for MemoryFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        self.pending = true;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.pending {
            self.entry.commit(&self.path, self.buffer.clone());
            self.pending = false;
        }
        Ok(())
    }
}

impl Drop for MemoryFileWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

/// A [`FileSystem`] whose files live in a concurrent map.
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    files: DashMap<PathBuf, Arc<MemoryFileEntry>>,
    next_watch_id: AtomicU64,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live watches on `path`.
    pub fn watcher_count(&self, path: &Path) -> usize {
        self.files
            .get(path)
            .map(|entry| entry.lock().watchers.len())
            .unwrap_or(0)
    }

    fn entry(&self, path: &Path) -> Option<Arc<MemoryFileEntry>> {
        self.files.get(path).map(|entry| Arc::clone(entry.value()))
    }
}

impl FileSystem for MemoryFileSystem {
    fn open(&self, path: &Path) -> Result<Box<dyn Read + Send>, StorageError> {
        let entry = self.entry(path).ok_or_else(|| StorageError::NotFound {
            path: path.to_path_buf(),
        })?;
        let content = entry.lock().content.clone();
        Ok(Box::new(Cursor::new(content)))
    }

    fn create(&self, path: &Path) -> Result<Box<dyn Write + Send>, StorageError> {
        let entry = Arc::clone(
            self.files
                .entry(path.to_path_buf())
                .or_default()
                .value(),
        );
        Ok(Box::new(MemoryFileWriter {
            path: path.to_path_buf(),
            entry,
            buffer: Vec::new(),
            // Creating truncates, even if nothing is written afterwards.
            pending: true,
        }))
    }

    fn watch(
        &self,
        path: &Path,
        cancel: CancellationToken,
    ) -> Result<mpsc::Receiver<WriteEvent>, StorageError> {
        let entry = self.entry(path).ok_or_else(|| StorageError::NotFound {
            path: path.to_path_buf(),
        })?;

        let id = self.next_watch_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(WATCH_BUFFER);
        entry.lock().watchers.insert(id, tx);

        tokio::spawn(async move {
            cancel.cancelled().await;
            entry.lock().watchers.remove(&id);
        });

        Ok(rx)
    }
}

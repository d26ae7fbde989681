//! [`FileSystem`] over the local disk.
//!
//! Watches are set on the file's parent directory rather than the file
//! itself. Editors that save by writing a temporary file and renaming it
//! over the original replace the inode, which would silently end a
//! file-level watch.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use notify::event::ModifyKind;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::StorageError;
use crate::traits::FileSystem;
use crate::types::{WriteEvent, WATCH_BUFFER};

/// Local-disk backend. Paths are used as given.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFileSystem;

impl OsFileSystem {
    pub fn new() -> Self {
        OsFileSystem
    }
}

fn is_write(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_)
            | EventKind::Modify(ModifyKind::Data(_))
            | EventKind::Modify(ModifyKind::Name(_))
            | EventKind::Modify(ModifyKind::Any)
    )
}

impl FileSystem for OsFileSystem {
    fn open(&self, path: &Path) -> Result<Box<dyn Read + Send>, StorageError> {
        let file = File::open(path).map_err(|e| StorageError::from_io(path, e))?;
        Ok(Box::new(file))
    }

    fn create(&self, path: &Path) -> Result<Box<dyn Write + Send>, StorageError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StorageError::from_io(parent, e))?;
        }
        let file = File::create(path).map_err(|e| StorageError::from_io(path, e))?;
        Ok(Box::new(file))
    }

    fn watch(
        &self,
        path: &Path,
        cancel: CancellationToken,
    ) -> Result<mpsc::Receiver<WriteEvent>, StorageError> {
        if !path.exists() {
            return Err(StorageError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let target: PathBuf = path.to_path_buf();
        let file_name = target.file_name().map(|name| name.to_os_string());
        let directory = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let (tx, rx) = mpsc::channel(WATCH_BUFFER);
        let event_path = target.clone();
        let mut watcher: RecommendedWatcher =
            notify::recommended_watcher(move |result: notify::Result<Event>| match result {
                Ok(event) => {
                    let touches_target = event
                        .paths
                        .iter()
                        .any(|p| p.file_name() == file_name.as_deref());
                    if touches_target && is_write(&event.kind) {
                        tracing::debug!("write detected on {}", event_path.display());
                        // Full means a reload is already pending.
                        let _ = tx.try_send(WriteEvent {
                            path: event_path.clone(),
                        });
                    }
                }
                Err(err) => {
                    tracing::warn!("watch error on {}: {}", event_path.display(), err);
                }
            })
            .map_err(|e| StorageError::Watch {
                path: target.clone(),
                reason: e.to_string(),
            })?;

        watcher
            .watch(&directory, RecursiveMode::NonRecursive)
            .map_err(|e| StorageError::Watch {
                path: target.clone(),
                reason: e.to_string(),
            })?;

        // The watcher owns the sender; dropping it closes the channel.
        tokio::spawn(async move {
            cancel.cancelled().await;
            drop(watcher);
        });

        Ok(rx)
    }
}

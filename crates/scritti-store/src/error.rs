//! Store error types.
//!
//! [`StoreError::NotFound`] is the only variant callers are expected to
//! recover from by retrying later; the entry stays `NotLoaded` and the next
//! `get` fetches again.

use scritti_core::{AssetKey, CoreError};
use scritti_storage::StorageError;
use thiserror::Error;

/// Errors produced by [`AssetStore`](crate::AssetStore) operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing resource for the key does not exist.
    #[error("asset not found: {0}")]
    NotFound(AssetKey),

    /// The key cannot be mapped to a storage path.
    #[error("invalid asset key {key}: {reason}")]
    InvalidKey { key: AssetKey, reason: String },

    /// Reading, writing or watching the backing resource failed.
    #[error("storage error for {key}: {source}")]
    Storage {
        key: AssetKey,
        #[source]
        source: StorageError,
    },

    /// The backing bytes could not be parsed as the key's kind.
    #[error("failed to parse {key}: {source}")]
    Parse {
        key: AssetKey,
        #[source]
        source: CoreError,
    },

    /// The store has been closed.
    #[error("asset store is closed")]
    Closed,
}

impl StoreError {
    pub(crate) fn storage(key: &AssetKey, source: StorageError) -> Self {
        if source.is_not_found() {
            StoreError::NotFound(key.clone())
        } else {
            StoreError::Storage {
                key: key.clone(),
                source,
            }
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

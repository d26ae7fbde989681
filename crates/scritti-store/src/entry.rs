//! Per-key cache records.
//!
//! An [`AssetEntry`] carries two locks. `state` guards the bookkeeping
//! fields and is only ever held for a single step, never across I/O or
//! another entry's lock. `load` serializes fetch-and-parse for the key, so
//! concurrent first `get`s and watch-driven reloads never interleave.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use scritti_core::{Asset, AssetKey};
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{Mutex, RwLock};

use crate::event::{AssetEvent, SubscriberId};

/// Load status of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetStatus {
    NotLoaded,
    Loaded,
}

/// Mutable fields of an entry.
#[derive(Debug)]
pub(crate) struct EntryState {
    pub(crate) value: Option<Arc<Asset>>,
    pub(crate) dependencies: BTreeSet<AssetKey>,
    pub(crate) dependants: BTreeSet<AssetKey>,
    pub(crate) status: AssetStatus,
    pub(crate) subscribers: HashMap<SubscriberId, mpsc::Sender<AssetEvent>>,
}

impl EntryState {
    /// The cached value, if the entry has loaded successfully.
    pub(crate) fn loaded_value(&self) -> Option<Arc<Asset>> {
        match self.status {
            AssetStatus::Loaded => self.value.clone(),
            AssetStatus::NotLoaded => None,
        }
    }

    /// Offers `event` to every subscriber without waiting.
    ///
    /// Closed channels are pruned. A full channel loses this event only.
    pub(crate) fn deliver(&mut self, event: &AssetEvent) -> usize {
        let mut delivered = 0;
        self.subscribers.retain(|id, subscriber| {
            match subscriber.try_send(event.clone()) {
                Ok(()) => {
                    delivered += 1;
                    true
                }
                Err(TrySendError::Full(_)) => {
                    tracing::warn!(
                        "subscriber {} on {} is not draining; dropped event from {}",
                        id,
                        event.key,
                        event.origin
                    );
                    true
                }
                Err(TrySendError::Closed(_)) => false,
            }
        });
        delivered
    }
}

/// The cache record for one key.
#[derive(Debug)]
pub(crate) struct AssetEntry {
    pub(crate) state: RwLock<EntryState>,
    pub(crate) load: Mutex<()>,
    /// Set once a backing watch has been registered for the key.
    pub(crate) watching: AtomicBool,
}

impl AssetEntry {
    pub(crate) fn new() -> Self {
        AssetEntry {
            state: RwLock::new(EntryState {
                value: None,
                dependencies: BTreeSet::new(),
                dependants: BTreeSet::new(),
                status: AssetStatus::NotLoaded,
                subscribers: HashMap::new(),
            }),
            load: Mutex::new(()),
            watching: AtomicBool::new(false),
        }
    }

    pub(crate) async fn loaded_value(&self) -> Option<Arc<Asset>> {
        self.state.read().await.loaded_value()
    }

    pub(crate) async fn status(&self) -> AssetStatus {
        self.state.read().await.status
    }

    pub(crate) async fn snapshot(&self, key: &AssetKey) -> EntrySnapshot {
        let state = self.state.read().await;
        EntrySnapshot {
            key: key.clone(),
            status: state.status,
            dependencies: state.dependencies.clone(),
            dependants: state.dependants.clone(),
            subscribers: state.subscribers.len(),
        }
    }
}

/// A point-in-time copy of an entry's bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntrySnapshot {
    pub key: AssetKey,
    pub status: AssetStatus,
    pub dependencies: BTreeSet<AssetKey>,
    pub dependants: BTreeSet<AssetKey>,
    /// Number of live subscriber channels.
    pub subscribers: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event() -> AssetEvent {
        AssetEvent {
            key: AssetKey::component("main"),
            origin: AssetKey::style("root"),
        }
    }

    #[tokio::test]
    async fn deliver_prunes_closed_and_tolerates_full() {
        let entry = AssetEntry::new();
        let (open_tx, mut open_rx) = mpsc::channel(4);
        let (full_tx, _full_rx) = mpsc::channel(1);
        let (closed_tx, closed_rx) = mpsc::channel(4);
        drop(closed_rx);

        full_tx.try_send(event()).unwrap();

        {
            let mut state = entry.state.write().await;
            state.subscribers.insert(SubscriberId::new(), open_tx);
            state.subscribers.insert(SubscriberId::new(), full_tx);
            state.subscribers.insert(SubscriberId::new(), closed_tx);
            assert_eq!(state.deliver(&event()), 1);
            assert_eq!(state.subscribers.len(), 2);
        }

        assert_eq!(open_rx.recv().await, Some(event()));
    }

    #[tokio::test]
    async fn new_entry_is_not_loaded() {
        let entry = AssetEntry::new();
        assert_eq!(entry.status().await, AssetStatus::NotLoaded);
        assert!(entry.loaded_value().await.is_none());

        let snapshot = entry.snapshot(&AssetKey::style("x")).await;
        assert!(snapshot.dependencies.is_empty());
        assert!(snapshot.dependants.is_empty());
        assert_eq!(snapshot.subscribers, 0);
    }
}

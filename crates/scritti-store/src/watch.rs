//! Background tasks: backing-resource watches and subscriptions.
//!
//! Backing watch tasks hold only a weak handle to the engine, so dropping
//! the last [`AssetStore`](crate::AssetStore) shuts them down as well.

use std::path::Path;
use std::sync::Arc;

use scritti_core::AssetKey;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::StoreError;
use crate::event::{AssetEvent, SubscriberId};
use crate::store::StoreInner;

impl StoreInner {
    /// Starts the reload-then-notify loop for a key about to be first read.
    pub(crate) fn spawn_backing_watch(
        self: &Arc<Self>,
        key: &AssetKey,
        path: &Path,
    ) -> Result<(), StoreError> {
        let mut writes = self
            .fs
            .watch(path, self.shutdown.child_token())
            .map_err(|e| StoreError::storage(key, e))?;
        tracing::debug!("watching {} at {}", key, path.display());

        let engine = Arc::downgrade(self);
        let shutdown = self.shutdown.clone();
        let key = key.clone();
        self.tasks.spawn(async move {
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    write = writes.recv() => {
                        if write.is_none() {
                            break;
                        }
                        let Some(engine) = engine.upgrade() else {
                            break;
                        };
                        engine.on_write(&key).await;
                    }
                }
            }
            tracing::debug!("stopped watching {}", key);
        });
        Ok(())
    }

    async fn on_write(self: &Arc<Self>, key: &AssetKey) {
        let entry = self.entry(key);
        let reloaded = {
            let _load = entry.load.lock().await;
            self.reload(key, &entry).await
        };
        match reloaded {
            Ok(_) => {
                self.notify(key).await;
            }
            Err(err) => {
                tracing::warn!("reload of {} failed, serving previous value: {}", key, err);
            }
        }
    }

    /// Registers a subscriber channel on `key` after loading it.
    pub(crate) async fn subscribe(
        self: &Arc<Self>,
        key: &AssetKey,
        cancel: CancellationToken,
    ) -> Result<mpsc::Receiver<AssetEvent>, StoreError> {
        self.get(key).await?;

        let entry = self.entry(key);
        let id = SubscriberId::new();
        let (tx, rx) = mpsc::channel(self.config.subscriber_capacity);
        let dropped = tx.clone();
        entry.state.write().await.subscribers.insert(id, tx);
        tracing::debug!("subscriber {} on {}", id, key);

        let shutdown = self.shutdown.clone();
        let key = key.clone();
        self.tasks.spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = shutdown.cancelled() => {}
                _ = dropped.closed() => {}
            }
            drop(dropped);
            entry.state.write().await.subscribers.remove(&id);
            tracing::debug!("subscriber {} on {} removed", id, key);
        });

        Ok(rx)
    }
}

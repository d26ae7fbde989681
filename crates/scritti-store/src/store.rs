//! The asset cache engine.
//!
//! [`AssetStore`] maps keys to lazily loaded entries, keeps the dependency
//! graph between entries in both directions, and fans change events out to
//! subscribers. Every entry whose backing resource exists gets a background
//! watch on it, started just before the first read; a write reloads the
//! entry and then notifies it and everything that transitively depends on
//! it.
//!
//! Lock discipline: the shared map is never borrowed across an await (the
//! entry `Arc` is cloned out first), an entry's `state` lock is never held
//! while another entry's is taken, and only the `load` guard is held across
//! storage I/O.

use std::collections::BTreeSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use dashmap::DashMap;
use scritti_core::{Asset, AssetFactory, AssetKey, SourceFactory};
use scritti_storage::FileSystem;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::config::StoreConfig;
use crate::diff::DependencyDiff;
use crate::entry::{AssetEntry, AssetStatus, EntrySnapshot};
use crate::error::StoreError;
use crate::event::AssetEvent;
use crate::paths::asset_path;

type ReloadFuture<'a> = Pin<Box<dyn Future<Output = Result<Arc<Asset>, StoreError>> + Send + 'a>>;

/// Shared engine state behind every [`AssetStore`] handle.
pub(crate) struct StoreInner {
    pub(crate) config: StoreConfig,
    pub(crate) fs: Arc<dyn FileSystem>,
    pub(crate) factory: Arc<dyn AssetFactory>,
    pub(crate) entries: DashMap<AssetKey, Arc<AssetEntry>>,
    /// Backing watches and subscription tasks.
    pub(crate) tasks: TaskTracker,
    pub(crate) shutdown: CancellationToken,
}

impl Drop for StoreInner {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Concurrent, incrementally reloading asset cache.
///
/// Cloning is cheap; all clones share one engine.
#[derive(Clone)]
pub struct AssetStore {
    inner: Arc<StoreInner>,
}

impl std::fmt::Debug for AssetStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetStore")
            .field("config", &self.inner.config)
            .field("entries", &self.inner.entries.len())
            .field("closed", &self.inner.shutdown.is_cancelled())
            .finish()
    }
}

impl AssetStore {
    /// Creates a store that parses assets with the built-in grammars.
    pub fn new(fs: Arc<dyn FileSystem>, config: StoreConfig) -> Self {
        Self::with_factory(fs, Arc::new(SourceFactory), config)
    }

    pub fn with_factory(
        fs: Arc<dyn FileSystem>,
        factory: Arc<dyn AssetFactory>,
        config: StoreConfig,
    ) -> Self {
        tracing::info!("asset store rooted at {:?}", config.root);
        AssetStore {
            inner: Arc::new(StoreInner {
                config,
                fs,
                factory,
                entries: DashMap::new(),
                tasks: TaskTracker::new(),
                shutdown: CancellationToken::new(),
            }),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    /// Returns the cached value for `key`, loading it on first access.
    ///
    /// Concurrent first accesses share a single fetch. A failed load leaves
    /// the entry `NotLoaded`, so the next call fetches again.
    pub async fn get(&self, key: &AssetKey) -> Result<Arc<Asset>, StoreError> {
        self.inner.ensure_open()?;
        self.inner.get(key).await
    }

    /// Writes `content` as the backing resource of `key`.
    ///
    /// A watched key is refreshed by its backing watch. A key without one
    /// (its resource was missing until now) is loaded here and its
    /// dependants are notified.
    pub async fn set(&self, key: &AssetKey, content: &str) -> Result<(), StoreError> {
        self.inner.ensure_open()?;
        self.inner.set(key, content).await
    }

    /// Every key with an entry, loaded or not, in key order.
    pub fn list(&self) -> Vec<AssetKey> {
        let mut keys: Vec<AssetKey> = self
            .inner
            .entries
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        keys.sort();
        keys
    }

    /// Subscribes to changes of `key` and of everything it depends on.
    ///
    /// `key` is loaded first; if that fails nothing is registered. The
    /// returned channel closes once `cancel` fires or the store is closed.
    pub async fn watch(
        &self,
        key: &AssetKey,
        cancel: CancellationToken,
    ) -> Result<mpsc::Receiver<AssetEvent>, StoreError> {
        self.inner.ensure_open()?;
        self.inner.subscribe(key, cancel).await
    }

    /// Stops every background task and closes every subscriber channel.
    ///
    /// Idempotent. Later `get`, `set` and `watch` calls fail with
    /// [`StoreError::Closed`].
    pub async fn close(&self) {
        self.inner.close().await;
    }

    pub fn is_closed(&self) -> bool {
        self.inner.shutdown.is_cancelled()
    }

    /// Bookkeeping for `key`, if it has an entry.
    pub async fn inspect(&self, key: &AssetKey) -> Option<EntrySnapshot> {
        let entry = self.inner.existing(key)?;
        Some(entry.snapshot(key).await)
    }

    /// Keys `key` currently depends on.
    pub async fn dependencies(&self, key: &AssetKey) -> BTreeSet<AssetKey> {
        match self.inner.existing(key) {
            Some(entry) => entry.state.read().await.dependencies.clone(),
            None => BTreeSet::new(),
        }
    }

    /// Keys that currently depend on `key`.
    pub async fn dependants(&self, key: &AssetKey) -> BTreeSet<AssetKey> {
        match self.inner.existing(key) {
            Some(entry) => entry.state.read().await.dependants.clone(),
            None => BTreeSet::new(),
        }
    }
}

impl StoreInner {
    pub(crate) fn ensure_open(&self) -> Result<(), StoreError> {
        if self.shutdown.is_cancelled() {
            Err(StoreError::Closed)
        } else {
            Ok(())
        }
    }

    pub(crate) fn existing(&self, key: &AssetKey) -> Option<Arc<AssetEntry>> {
        self.entries.get(key).map(|entry| Arc::clone(entry.value()))
    }

    /// Finds the entry for `key`, creating a `NotLoaded` one if absent.
    pub(crate) fn entry(&self, key: &AssetKey) -> Arc<AssetEntry> {
        if let Some(entry) = self.existing(key) {
            return entry;
        }
        let entry = self.entries.entry(key.clone()).or_insert_with(|| {
            tracing::debug!("new entry {}", key);
            Arc::new(AssetEntry::new())
        });
        Arc::clone(entry.value())
    }

    pub(crate) async fn get(self: &Arc<Self>, key: &AssetKey) -> Result<Arc<Asset>, StoreError> {
        asset_path(&self.config.root, key)?;
        let entry = self.entry(key);
        if let Some(value) = entry.loaded_value().await {
            return Ok(value);
        }

        let _load = entry.load.lock().await;
        // Another caller may have finished the load while we waited.
        if let Some(value) = entry.loaded_value().await {
            return Ok(value);
        }
        self.reload(key, &entry).await
    }

    async fn set(self: &Arc<Self>, key: &AssetKey, content: &str) -> Result<(), StoreError> {
        let path = asset_path(&self.config.root, key)?;
        tracing::debug!("writing {} to {}", key, path.display());
        self.fs
            .write(&path, content.as_bytes())
            .map_err(|e| StoreError::storage(key, e))?;

        let entry = self.entry(key);
        // A live watch sees this write and drives reload and notify.
        if entry.watching.load(Ordering::Acquire) {
            return Ok(());
        }

        {
            let _load = entry.load.lock().await;
            self.reload(key, &entry).await?;
        }
        self.notify(key).await;
        Ok(())
    }

    /// Fetches, parses and records a fresh value for `key`.
    ///
    /// The caller holds `entry.load`. On failure the entry keeps its
    /// previous value, dependency set and status. A watch started for a
    /// first load that then fails to parse stays in place, so the next
    /// write retries the load.
    pub(crate) async fn reload(
        self: &Arc<Self>,
        key: &AssetKey,
        entry: &Arc<AssetEntry>,
    ) -> Result<Arc<Asset>, StoreError> {
        let path = asset_path(&self.config.root, key)?;
        let previous = entry.state.read().await.dependencies.clone();

        // The watch starts before the first read so no write can fall between.
        if !entry.watching.swap(true, Ordering::AcqRel) {
            if let Err(err) = self.spawn_backing_watch(key, &path) {
                entry.watching.store(false, Ordering::Release);
                if err.is_not_found() {
                    return Err(err);
                }
                tracing::warn!("cannot watch {}: {}", key, err);
            }
        }

        tracing::debug!("loading {} from {}", key, path.display());
        let bytes = self
            .fs
            .read(&path)
            .map_err(|e| StoreError::storage(key, e))?;
        let asset = self
            .factory
            .parse(key.kind, &bytes)
            .map_err(|source| StoreError::Parse {
                key: key.clone(),
                source,
            })?;
        let asset = Arc::new(asset);

        let current: BTreeSet<AssetKey> = self
            .factory
            .dependencies_of(&asset)
            .into_iter()
            .filter(|dependency| match asset_path(&self.config.root, dependency) {
                Ok(_) => true,
                Err(err) => {
                    tracing::warn!("{} skips dependency: {}", key, err);
                    false
                }
            })
            .collect();
        let diff = DependencyDiff::compute(&previous, &current);

        {
            let mut state = entry.state.write().await;
            state.value = Some(Arc::clone(&asset));
            state.dependencies = current.clone();
            state.status = AssetStatus::Loaded;
        }
        if !diff.is_clean() {
            tracing::debug!(
                "{}: +{} -{} dependency edges",
                key,
                diff.added.len(),
                diff.removed.len()
            );
            self.apply_diff(key, &diff).await;
        }
        self.load_dependencies(&current).await;

        Ok(asset)
    }

    fn reload_boxed<'a>(
        self: &'a Arc<Self>,
        key: &'a AssetKey,
        entry: &'a Arc<AssetEntry>,
    ) -> ReloadFuture<'a> {
        Box::pin(self.reload(key, entry))
    }

    /// Mirrors added and removed edges into the dependants' reverse sets.
    async fn apply_diff(&self, key: &AssetKey, diff: &DependencyDiff) {
        for dependency in &diff.removed {
            if let Some(entry) = self.existing(dependency) {
                entry.state.write().await.dependants.remove(key);
            }
        }
        for dependency in &diff.added {
            let entry = self.entry(dependency);
            entry.state.write().await.dependants.insert(key.clone());
        }
    }

    /// Loads dependencies that have never loaded, so they are watched too.
    async fn load_dependencies(self: &Arc<Self>, dependencies: &BTreeSet<AssetKey>) {
        for dependency in dependencies {
            let entry = self.entry(dependency);
            if entry.status().await == AssetStatus::Loaded {
                continue;
            }
            // Whoever holds the guard is already loading it.
            let Ok(_load) = entry.load.try_lock() else {
                continue;
            };
            if entry.status().await == AssetStatus::Loaded {
                continue;
            }
            match self.reload_boxed(dependency, &entry).await {
                Ok(_) => {}
                Err(err) if err.is_not_found() => {
                    tracing::debug!("dependency {} does not exist yet", dependency);
                }
                Err(err) => tracing::warn!("dependency {} failed to load: {}", dependency, err),
            }
        }
    }

    pub(crate) async fn close(&self) {
        if self.shutdown.is_cancelled() {
            return;
        }
        tracing::info!("closing asset store");
        self.shutdown.cancel();

        let entries: Vec<Arc<AssetEntry>> = self
            .entries
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        for entry in entries {
            entry.state.write().await.subscribers.clear();
        }

        self.tasks.close();
        self.tasks.wait().await;
        tracing::info!("asset store closed");
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use scritti_storage::MemoryFileSystem;

    use super::*;

    fn store_with(files: &[(&str, &str)]) -> AssetStore {
        let fs = MemoryFileSystem::new();
        for (path, content) in files {
            fs.write(Path::new(path), content.as_bytes()).unwrap();
        }
        AssetStore::new(Arc::new(fs), StoreConfig::default())
    }

    #[tokio::test]
    async fn get_records_both_edge_directions() {
        let store = store_with(&[("main", "root\n"), ("style/root", "a b")]);
        let main = AssetKey::component("main");
        let root = AssetKey::style("root");

        store.get(&main).await.unwrap();

        assert_eq!(store.dependencies(&main).await, BTreeSet::from([root.clone()]));
        assert_eq!(store.dependants(&root).await, BTreeSet::from([main.clone()]));
        assert_eq!(
            store.inspect(&root).await.unwrap().status,
            AssetStatus::Loaded
        );
        store.close().await;
    }

    #[tokio::test]
    async fn missing_asset_leaves_not_loaded_entry() {
        let store = store_with(&[]);
        let key = AssetKey::component("ghost");

        let err = store.get(&key).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(store.list(), vec![key.clone()]);
        assert_eq!(
            store.inspect(&key).await.unwrap().status,
            AssetStatus::NotLoaded
        );
    }

    #[tokio::test]
    async fn invalid_key_creates_no_entry() {
        let store = store_with(&[]);
        let err = store.get(&AssetKey::style("../escape")).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidKey { .. }));
        assert!(store.list().is_empty());
    }

    #[tokio::test]
    async fn dangling_dependency_gets_placeholder() {
        let store = store_with(&[("main", "missing\n")]);
        let main = AssetKey::component("main");
        let missing = AssetKey::style("missing");

        store.get(&main).await.unwrap();

        let snapshot = store.inspect(&missing).await.unwrap();
        assert_eq!(snapshot.status, AssetStatus::NotLoaded);
        assert_eq!(snapshot.dependants, BTreeSet::from([main]));
    }

    #[tokio::test]
    async fn operations_fail_after_close() {
        let store = store_with(&[("style/root", "a")]);
        let key = AssetKey::style("root");
        store.get(&key).await.unwrap();

        store.close().await;
        store.close().await;

        assert!(store.is_closed());
        assert!(matches!(store.get(&key).await, Err(StoreError::Closed)));
        assert!(matches!(store.set(&key, "b").await, Err(StoreError::Closed)));
        assert!(matches!(
            store.watch(&key, CancellationToken::new()).await,
            Err(StoreError::Closed)
        ));
    }
}

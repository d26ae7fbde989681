//! Incremental asset cache with a dependency graph and change fan-out.
//!
//! The [`AssetStore`] loads assets lazily from a
//! [`FileSystem`](scritti_storage::FileSystem), records which assets each
//! one depends on, watches every loaded asset's backing resource, and pushes
//! an [`AssetEvent`] to subscribers of a changed asset and of all its
//! transitive dependants.
//!
//! # Modules
//!
//! - [`config`]: StoreConfig
//! - [`error`]: StoreError
//! - [`event`]: AssetEvent and SubscriberId
//! - [`diff`]: DependencyDiff between two loads of one asset
//! - [`paths`]: key to storage path mapping
//! - [`entry`]: per-key records and EntrySnapshot
//! - [`store`]: the AssetStore engine

pub mod config;
pub mod diff;
pub mod entry;
pub mod error;
pub mod event;
mod fanout;
pub mod paths;
pub mod store;
mod watch;

pub use config::StoreConfig;
pub use diff::DependencyDiff;
pub use entry::{AssetStatus, EntrySnapshot};
pub use error::StoreError;
pub use event::{AssetEvent, SubscriberId};
pub use paths::asset_path;
pub use store::AssetStore;

//! Byte-storage backends for scritti assets.
//!
//! Provides the [`FileSystem`] trait the store engine consumes, plus the
//! [`MemoryFileSystem`] and [`OsFileSystem`] backends.
//!
//! # Modules
//!
//! - [`error`]: StorageError, with not-found kept distinct from other I/O
//! - [`types`]: WriteEvent and the watch buffer size
//! - [`traits`]: FileSystem trait definition
//! - [`memory`]: MemoryFileSystem implementation
//! - [`os`]: OsFileSystem implementation (notify-based watches)

pub mod error;
pub mod memory;
pub mod os;
pub mod traits;
pub mod types;

pub use error::StorageError;
pub use memory::MemoryFileSystem;
pub use os::OsFileSystem;
pub use traits::FileSystem;
pub use types::WriteEvent;

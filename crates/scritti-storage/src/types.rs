//! Change-feed types shared by all backends.

use std::path::PathBuf;

/// A write (or rename onto) the watched resource was observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteEvent {
    pub path: PathBuf,
}

/// Buffer size of every watch channel. Writers use `try_send`, so a full
/// buffer coalesces further writes into the events already pending.
pub const WATCH_BUFFER: usize = 8;

//! Wire types for the HTTP API and the hot-reload channel.

pub mod assets;
pub mod jsonrpc;

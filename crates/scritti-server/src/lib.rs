//! HTTP API and hot-reload channel over the scritti asset store.
//!
//! REST endpoints read and write single assets; the `/ws` socket speaks
//! JSON-RPC and pushes a `changed` notification whenever a watched asset,
//! or anything it depends on, is written.

pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod rpc;
pub mod schema;
pub mod state;

//! HTTP and WebSocket handlers.
//!
//! Handlers only translate between the wire and [`AssetStore`](scritti_store::AssetStore)
//! calls; no caching or graph logic lives here.

pub mod assets;
pub mod hotreload;

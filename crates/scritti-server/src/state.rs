//! Shared application state.

use scritti_store::AssetStore;
use tokio_util::sync::CancellationToken;

/// State handed to every handler.
///
/// `AssetStore` is internally shared, so cloning the state per request is
/// cheap and no outer lock is needed.
#[derive(Debug, Clone)]
pub struct AppState {
    pub store: AssetStore,
    /// Cancelled when the server begins shutting down; open hot-reload
    /// sockets close on it.
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(store: AssetStore) -> Self {
        AppState {
            store,
            shutdown: CancellationToken::new(),
        }
    }
}

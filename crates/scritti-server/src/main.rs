//! Binary entrypoint for the scritti server.
//!
//! Configuration comes from the environment; see [`ServerConfig`]. Log
//! filtering follows `RUST_LOG` (default: "info").

use std::sync::Arc;

use scritti_server::config::ServerConfig;
use scritti_server::router::build_router;
use scritti_server::state::AppState;
use scritti_storage::OsFileSystem;
use scritti_store::AssetStore;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = ServerConfig::from_env();
    let store = AssetStore::new(Arc::new(OsFileSystem::new()), config.store_config());
    let state = AppState::new(store.clone());
    let shutdown = state.shutdown.clone();
    let app = build_router(state);

    let addr = config.bind_address();
    tracing::info!("scritti server serving {:?} on {}", config.root, addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::warn!("cannot listen for ctrl-c: {}", err);
                std::future::pending::<()>().await;
            }
            tracing::info!("shutting down");
            shutdown.cancel();
        })
        .await?;

    store.close().await;
    Ok(())
}

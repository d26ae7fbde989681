//! Router assembly for the scritti HTTP API.
//!
//! [`build_router`] wires handlers to their routes with CORS and tracing
//! middleware layers.

use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Builds the complete router.
///
/// Asset names may contain `/`, so the name segment is a wildcard.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/assets", get(handlers::assets::list_assets))
        .route(
            "/assets/{kind}/{*name}",
            get(handlers::assets::get_asset).put(handlers::assets::put_asset),
        )
        .route("/ws", get(handlers::hotreload::hot_reload))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

//! Asset handlers (list, get, put).

use axum::extract::{Path, State};
use axum::Json;

use scritti_core::{AssetKey, AssetKind};

use crate::error::ApiError;
use crate::schema::assets::{AssetData, AssetListResponse, AssetSource, SetAssetRequest};
use crate::state::AppState;

fn parse_key(kind: &str, name: String) -> Result<AssetKey, ApiError> {
    let kind: AssetKind = kind.parse()?;
    Ok(AssetKey::new(kind, name))
}

/// Lists every key the store has an entry for.
///
/// `GET /assets`
pub async fn list_assets(State(state): State<AppState>) -> Json<AssetListResponse> {
    Json(AssetListResponse {
        assets: state.store.list(),
    })
}

/// `GET /assets/{kind}/{name}`
pub async fn get_asset(
    State(state): State<AppState>,
    Path((kind, name)): Path<(String, String)>,
) -> Result<Json<AssetData>, ApiError> {
    let key = parse_key(&kind, name)?;
    let asset = state.store.get(&key).await?;
    let dependencies = state.store.dependencies(&key).await;
    Ok(Json(AssetData::new(key, &asset, dependencies)))
}

/// Replaces an asset's source.
///
/// `PUT /assets/{kind}/{name}`
pub async fn put_asset(
    State(state): State<AppState>,
    Path((kind, name)): Path<(String, String)>,
    Json(req): Json<SetAssetRequest>,
) -> Result<Json<AssetSource>, ApiError> {
    let key = parse_key(&kind, name)?;
    state.store.set(&key, &req.source).await?;
    Ok(Json(AssetSource {
        id: key,
        source: req.source,
    }))
}

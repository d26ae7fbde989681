//! Asset request/response types shared by HTTP and JSON-RPC.

use std::collections::BTreeSet;

use scritti_core::{Asset, AssetKey};
use serde::{Deserialize, Serialize};

/// A loaded asset as seen by clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetData {
    pub id: AssetKey,
    pub source: String,
    /// Keys this asset references.
    pub dependencies: BTreeSet<AssetKey>,
}

impl AssetData {
    pub fn new(id: AssetKey, asset: &Asset, dependencies: BTreeSet<AssetKey>) -> Self {
        AssetData {
            id,
            source: asset.source().to_string(),
            dependencies,
        }
    }
}

/// Source text for a key. Params and result of `set`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetSource {
    pub id: AssetKey,
    pub source: String,
}

/// Body of `PUT /assets/{kind}/{name}`.
#[derive(Debug, Clone, Deserialize)]
pub struct SetAssetRequest {
    pub source: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssetListResponse {
    pub assets: Vec<AssetKey>,
}

//! Mapping from asset keys to backing-store paths.
//!
//! Components live at the root, other kinds in a per-kind subdirectory:
//! `{root}/main`, `{root}/style/root`, `{root}/svg/logo`.

use std::path::{Component, Path, PathBuf};

use scritti_core::{AssetKey, AssetKind};

use crate::error::StoreError;

/// Subdirectory holding assets of `kind`, or `None` for the root.
pub fn kind_directory(kind: AssetKind) -> Option<&'static str> {
    match kind {
        AssetKind::Component => None,
        AssetKind::Style => Some("style"),
        AssetKind::Svg => Some("svg"),
    }
}

/// Resolves the storage path for `key` under `root`.
///
/// Names must be relative paths made only of normal components, so that no
/// key can address a file outside its kind's directory.
pub fn asset_path(root: &Path, key: &AssetKey) -> Result<PathBuf, StoreError> {
    let invalid = |reason: &str| StoreError::InvalidKey {
        key: key.clone(),
        reason: reason.to_string(),
    };

    if key.name.is_empty() {
        return Err(invalid("name is empty"));
    }
    let name = Path::new(&key.name);
    if !name
        .components()
        .all(|component| matches!(component, Component::Normal(_)))
    {
        return Err(invalid("name must be a relative path without '.' or '..'"));
    }

    let mut path = root.to_path_buf();
    if let Some(directory) = kind_directory(key.kind) {
        path.push(directory);
    }
    path.push(name);
    Ok(path)
}

//! The [`Asset`] tagged union and the [`AssetFactory`] capability that
//! produces it from raw bytes.
//!
//! The store engine never looks inside an asset. It only asks the factory
//! for a parsed value and for the set of keys that value references.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::component::Component;
use crate::error::CoreError;
use crate::key::{AssetKey, AssetKind};
use crate::style::Style;
use crate::svg::Svg;

/// A parsed asset of one of the closed kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Asset {
    Component(Component),
    Style(Style),
    Svg(Svg),
}

impl Asset {
    /// Parses `source` as an asset of the given kind.
    pub fn parse(kind: AssetKind, source: &str) -> Result<Asset, CoreError> {
        match kind {
            AssetKind::Component => Component::parse(source).map(Asset::Component),
            AssetKind::Style => Ok(Asset::Style(Style::parse(source))),
            AssetKind::Svg => Svg::parse(source).map(Asset::Svg),
        }
    }

    pub fn kind(&self) -> AssetKind {
        match self {
            Asset::Component(_) => AssetKind::Component,
            Asset::Style(_) => AssetKind::Style,
            Asset::Svg(_) => AssetKind::Svg,
        }
    }

    /// The raw text the asset was parsed from.
    pub fn source(&self) -> &str {
        match self {
            Asset::Component(component) => &component.source,
            Asset::Style(style) => &style.source,
            Asset::Svg(svg) => &svg.source,
        }
    }

    /// Keys this asset references. Leaf kinds reference nothing.
    pub fn dependencies(&self) -> BTreeSet<AssetKey> {
        match self {
            Asset::Component(component) => component.dependencies(),
            Asset::Style(_) | Asset::Svg(_) => BTreeSet::new(),
        }
    }

    pub fn as_component(&self) -> Option<&Component> {
        match self {
            Asset::Component(component) => Some(component),
            _ => None,
        }
    }

    pub fn as_style(&self) -> Option<&Style> {
        match self {
            Asset::Style(style) => Some(style),
            _ => None,
        }
    }
}

/// Turns raw bytes into assets and reports their dependency edges.
///
/// `dependencies_of` must be pure and deterministic: the store diffs its
/// result against the previous load to maintain dependant back-references.
pub trait AssetFactory: Send + Sync {
    fn parse(&self, kind: AssetKind, bytes: &[u8]) -> Result<Asset, CoreError>;

    fn dependencies_of(&self, asset: &Asset) -> BTreeSet<AssetKey> {
        asset.dependencies()
    }
}

/// The built-in factory for the text grammars in this crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceFactory;

impl AssetFactory for SourceFactory {
    fn parse(&self, kind: AssetKind, bytes: &[u8]) -> Result<Asset, CoreError> {
        let source = std::str::from_utf8(bytes).map_err(|_| CoreError::InvalidUtf8)?;
        Asset::parse(kind, source)
    }
}

//! Asset identity: the closed set of [`AssetKind`]s and the composite
//! [`AssetKey`] used as the cache key throughout the workspace.
//!
//! On the wire a kind is its integer index (`0` component, `1` style,
//! `2` svg). The lower-case name is accepted as well so that hand-written
//! requests stay readable.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CoreError;

/// The grammar an asset is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AssetKind {
    /// Indentation-based element tree.
    Component,
    /// Whitespace-separated class list.
    Style,
    /// Raw SVG markup.
    Svg,
}

impl AssetKind {
    /// Every kind, in index order.
    pub const ALL: [AssetKind; 3] = [AssetKind::Component, AssetKind::Style, AssetKind::Svg];

    /// Stable wire index.
    pub fn index(self) -> u8 {
        match self {
            AssetKind::Component => 0,
            AssetKind::Style => 1,
            AssetKind::Svg => 2,
        }
    }

    /// Looks up a kind by its wire index.
    pub fn from_index(index: u8) -> Option<Self> {
        AssetKind::ALL.get(index as usize).copied()
    }

    /// Lower-case name, used in URLs and the CLI.
    pub fn as_str(self) -> &'static str {
        match self {
            AssetKind::Component => "component",
            AssetKind::Style => "style",
            AssetKind::Svg => "svg",
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_ascii_lowercase();
        if let Some(kind) = AssetKind::ALL.iter().find(|k| k.as_str() == lowered) {
            return Ok(*kind);
        }
        s.parse::<u8>()
            .ok()
            .and_then(AssetKind::from_index)
            .ok_or_else(|| CoreError::UnknownKind(s.to_string()))
    }
}

impl Serialize for AssetKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.index())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum KindRepr {
    Index(u8),
    Name(String),
}

impl<'de> Deserialize<'de> for AssetKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match KindRepr::deserialize(deserializer)? {
            KindRepr::Index(index) => AssetKind::from_index(index).ok_or_else(|| {
                serde::de::Error::custom(format!("unknown asset kind index {index}"))
            }),
            KindRepr::Name(name) => name.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// Unique identity of a cacheable asset.
///
/// Ordering is by kind first, then name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssetKey {
    #[serde(alias = "assetType")]
    pub kind: AssetKind,
    pub name: String,
}

impl AssetKey {
    pub fn new(kind: AssetKind, name: impl Into<String>) -> Self {
        AssetKey {
            kind,
            name: name.into(),
        }
    }

    pub fn component(name: impl Into<String>) -> Self {
        AssetKey::new(AssetKind::Component, name)
    }

    pub fn style(name: impl Into<String>) -> Self {
        AssetKey::new(AssetKind::Style, name)
    }

    pub fn svg(name: impl Into<String>) -> Self {
        AssetKey::new(AssetKind::Svg, name)
    }
}

impl fmt::Display for AssetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_parses_names_and_indices() {
        assert_eq!("style".parse::<AssetKind>().unwrap(), AssetKind::Style);
        assert_eq!("SVG".parse::<AssetKind>().unwrap(), AssetKind::Svg);
        assert_eq!("0".parse::<AssetKind>().unwrap(), AssetKind::Component);
        assert!(matches!(
            "script".parse::<AssetKind>(),
            Err(CoreError::UnknownKind(_))
        ));
        assert!("7".parse::<AssetKind>().is_err());
    }

    #[test]
    fn key_serializes_kind_as_index() {
        let key = AssetKey::style("root");
        let json = serde_json::to_value(&key).unwrap();
        assert_eq!(json, serde_json::json!({ "kind": 1, "name": "root" }));
    }

    #[test]
    fn key_accepts_legacy_field_and_kind_name() {
        let legacy: AssetKey =
            serde_json::from_str(r#"{"assetType": 0, "name": "main"}"#).unwrap();
        assert_eq!(legacy, AssetKey::component("main"));

        let named: AssetKey = serde_json::from_str(r#"{"kind": "svg", "name": "logo"}"#).unwrap();
        assert_eq!(named, AssetKey::svg("logo"));

        assert!(serde_json::from_str::<AssetKey>(r#"{"kind": 9, "name": "x"}"#).is_err());
    }

    #[test]
    fn keys_order_by_kind_then_name() {
        let mut keys = vec![
            AssetKey::style("root"),
            AssetKey::component("main"),
            AssetKey::style("node1"),
        ];
        keys.sort();
        assert_eq!(
            keys,
            vec![
                AssetKey::component("main"),
                AssetKey::style("node1"),
                AssetKey::style("root"),
            ]
        );
    }

    #[test]
    fn key_display() {
        assert_eq!(AssetKey::style("root").to_string(), "style:root");
    }
}

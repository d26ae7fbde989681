//! Asset identities and asset grammars for scritti.
//!
//! - [`key`]: [`AssetKind`] and the composite [`AssetKey`]
//! - [`asset`]: the [`Asset`] tagged union and the [`AssetFactory`] seam
//! - [`component`], [`style`], [`svg`]: the per-kind parsers
//! - [`error`]: [`CoreError`]

pub mod asset;
pub mod component;
pub mod error;
pub mod key;
pub mod style;
pub mod svg;

pub use asset::{Asset, AssetFactory, SourceFactory};
pub use component::{Component, Element};
pub use error::CoreError;
pub use key::{AssetKey, AssetKind};
pub use style::Style;
pub use svg::Svg;

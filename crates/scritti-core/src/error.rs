//! Core error types for scritti-core.
//!
//! Every variant is a parse-time failure: raw asset source that cannot be
//! turned into an [`Asset`](crate::Asset) of its declared kind. Line numbers
//! are 1-based.

use thiserror::Error;

/// Errors produced while parsing asset source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A component source with no elements.
    #[error("component has no elements")]
    EmptyComponent,

    /// A second top-level element was found.
    #[error("line {line}: component already has a root element")]
    MultipleRoots { line: usize },

    /// An element line that does not start with a style name.
    #[error("line {line}: element has no style name")]
    MissingStyle { line: usize },

    /// An element tag that is not ASCII alphanumeric.
    #[error("line {line}: invalid tag '{tag}'")]
    InvalidTag { line: usize, tag: String },

    /// Trailing tokens after the style name and tag.
    #[error("line {line}: unexpected token '{token}'")]
    UnexpectedToken { line: usize, token: String },

    /// SVG source that does not open with an `<svg>` or XML prolog.
    #[error("source is not SVG markup")]
    InvalidSvg,

    /// Raw bytes are not valid UTF-8.
    #[error("source is not valid UTF-8")]
    InvalidUtf8,

    /// An asset kind name or index that is not recognized.
    #[error("unknown asset kind: '{0}'")]
    UnknownKind(String),
}

//! Style assets: a flat list of class names.

use serde::{Deserialize, Serialize};

/// A parsed style. Every whitespace-separated token is one class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Style {
    pub source: String,
    pub classes: Vec<String>,
}

impl Style {
    pub fn parse(source: &str) -> Style {
        let classes = source
            .lines()
            .flat_map(str::split_whitespace)
            .map(str::to_string)
            .collect();
        Style {
            source: source.to_string(),
            classes,
        }
    }

    /// Classes joined for an HTML `class` attribute.
    pub fn class_attribute(&self) -> String {
        self.classes.join(" ")
    }
}

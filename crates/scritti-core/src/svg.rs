//! SVG assets. The markup is kept verbatim; only the opening is checked.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Svg {
    pub source: String,
}

impl Svg {
    pub fn parse(source: &str) -> Result<Svg, CoreError> {
        let trimmed = source.trim_start();
        if trimmed.starts_with("<svg") || trimmed.starts_with("<?xml") {
            Ok(Svg {
                source: source.to_string(),
            })
        } else {
            Err(CoreError::InvalidSvg)
        }
    }
}

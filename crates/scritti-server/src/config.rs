//! Server configuration from environment variables.
//!
//! - `SCRITTI_ROOT`: asset root directory (default: "sampledata")
//! - `SCRITTI_PORT`: listen port (default: 3000)
//! - `SCRITTI_SUBSCRIBER_CAPACITY`: events buffered per subscriber (default: 32)
//!
//! Malformed values fall back to the default with a warning.

use std::path::PathBuf;
use std::str::FromStr;

use scritti_store::config::DEFAULT_SUBSCRIBER_CAPACITY;
use scritti_store::StoreConfig;

pub const DEFAULT_ROOT: &str = "sampledata";
pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub root: PathBuf,
    pub port: u16,
    pub subscriber_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            root: PathBuf::from(DEFAULT_ROOT),
            port: DEFAULT_PORT,
            subscriber_capacity: DEFAULT_SUBSCRIBER_CAPACITY,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a config from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = ServerConfig::default();
        ServerConfig {
            root: lookup("SCRITTI_ROOT")
                .filter(|root| !root.is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.root),
            port: parse_or(&lookup, "SCRITTI_PORT", defaults.port),
            subscriber_capacity: parse_or(
                &lookup,
                "SCRITTI_SUBSCRIBER_CAPACITY",
                defaults.subscriber_capacity,
            ),
        }
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig::new(self.root.clone()).with_subscriber_capacity(self.subscriber_capacity)
    }

    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

fn parse_or<T: FromStr + Copy>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> T {
    match lookup(name) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("ignoring malformed {}={:?}", name, raw);
            default
        }),
        None => default,
    }
}

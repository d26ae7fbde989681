//! Change events delivered to subscribers.

use std::fmt;

use scritti_core::AssetKey;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Notification that an asset, or something it depends on, changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetEvent {
    /// The watched key.
    pub key: AssetKey,
    /// The key whose backing resource was written.
    pub origin: AssetKey,
}

impl AssetEvent {
    /// True when the watched asset's own source changed.
    pub fn is_direct(&self) -> bool {
        self.key == self.origin
    }
}

/// Identity of one subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(pub Uuid);

impl SubscriberId {
    pub(crate) fn new() -> Self {
        SubscriberId(Uuid::new_v4())
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

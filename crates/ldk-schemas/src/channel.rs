//! Channel keys for notification fan-out.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named fan-out topic. Keys take the form `{resource_type}` for a
/// resource class or `{resource_type}:{resource_id}` for one resource
/// (e.g. `orders`, `orders:7f0c…`, `patients:42`).
///
/// Subscribing to a key nothing has published to yet is always legal; the
/// hub creates channel state lazily.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelKey(String);

impl ChannelKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Coarse channel carrying every order event (dashboards).
    pub fn orders() -> Self {
        Self("orders".to_string())
    }

    /// Channel for a single order's lifecycle events.
    pub fn order(id: &Uuid) -> Self {
        Self(format!("orders:{id}"))
    }

    /// Channel for one report artifact's acknowledgment events.
    pub fn report(artifact_id: &str) -> Self {
        Self(format!("reports:{artifact_id}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ChannelKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChannelKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ChannelKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

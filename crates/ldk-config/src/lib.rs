//! Daemon configuration.
//!
//! Layering: built-in defaults, then an optional YAML file, then env
//! overrides. `fingerprint` hashes the effective config (canonical JSON,
//! SHA-256) so logs and status endpoints can state exactly which config a
//! process is running.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;

/// Env var overriding `bind_addr`.
pub const ENV_BIND_ADDR: &str = "LDK_DAEMON_ADDR";

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    /// Socket address the HTTP/WS server binds.
    pub bind_addr: String,
    pub hub: HubSettings,
    pub reconnect: ReconnectSettings,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HubSettings {
    /// Bounded outbound queue depth per session.
    pub outbound_capacity: usize,
    /// Recently-seen ids kept per (session, channel) for dedup.
    pub dedup_capacity: usize,
    /// Dedup retention window in seconds.
    pub dedup_retention_secs: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconnectSettings {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8901".to_string(),
            hub: HubSettings::default(),
            reconnect: ReconnectSettings::default(),
        }
    }
}

impl Default for HubSettings {
    fn default() -> Self {
        Self {
            outbound_capacity: 64,
            dedup_capacity: 256,
            dedup_retention_secs: 300,
        }
    }
}

impl Default for ReconnectSettings {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay_ms: 500,
            max_delay_ms: 10_000,
        }
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl DaemonConfig {
    /// Defaults, overlaid with the YAML file when one exists, then env.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) if p.exists() => {
                let text = std::fs::read_to_string(p)
                    .with_context(|| format!("read config {}", p.display()))?;
                Self::from_yaml(&text)?
            }
            _ => Self::default(),
        };
        if let Ok(addr) = std::env::var(ENV_BIND_ADDR) {
            config.bind_addr = addr;
        }
        Ok(config)
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).context("parse config yaml")
    }

    /// SHA-256 over the canonical JSON form of the effective config.
    pub fn fingerprint(&self) -> String {
        // serde_json maps are key-sorted by default, so the encoding is
        // canonical without extra work.
        let canonical =
            serde_json::to_string(self).expect("config serialization cannot fail");
        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        hex::encode(hasher.finalize())
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

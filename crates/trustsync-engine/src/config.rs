//! Engine configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the outbound bundle transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    /// TCP connect timeout in seconds (default: 10).
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Whole-request read timeout in seconds (default: 10).
    #[serde(default = "default_read_timeout")]
    pub read_timeout_secs: u64,

    /// Max idle lifetime for pooled connections in seconds (default: 20).
    ///
    /// Keeps the pool from handing out connections the server already
    /// closed, which shows up as resets under concurrent refreshes.
    #[serde(default = "default_pool_idle")]
    pub pool_idle_secs: u64,

    /// Skip certificate-chain verification on bundle downloads.
    ///
    /// Non-production deployments only.
    #[serde(default)]
    pub allow_insecure_tls: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout(),
            read_timeout_secs: default_read_timeout(),
            pool_idle_secs: default_pool_idle(),
            allow_insecure_tls: false,
        }
    }
}

impl TransportConfig {
    /// Connect timeout as a [`Duration`].
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Read timeout as a [`Duration`].
    #[must_use]
    pub const fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    /// Pool idle lifetime as a [`Duration`].
    #[must_use]
    pub const fn pool_idle(&self) -> Duration {
        Duration::from_secs(self.pool_idle_secs)
    }
}

/// A bundle seeded into the store at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleSeed {
    /// Unique bundle name.
    pub name: String,

    /// Source URL (`file://` or `http(s)://`).
    pub url: String,

    /// Seconds between scheduled refreshes; <= 0 disables auto-refresh.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: i64,

    /// Path to the signer certificate (PEM or DER) for signed containers.
    pub signing_cert: Option<PathBuf>,
}

/// Top-level engine configuration, normally loaded from `trustsync.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Outbound transport settings.
    #[serde(default)]
    pub transport: TransportConfig,

    /// Seconds between cache-update cycles (default: 3600).
    #[serde(default = "default_update_period")]
    pub update_period_secs: u64,

    /// Bundles to seed into the store at startup.
    #[serde(default)]
    pub bundles: Vec<BundleSeed>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            transport: TransportConfig::default(),
            update_period_secs: default_update_period(),
            bundles: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Load config from a TOML file, falling back to defaults.
    pub fn load(path: &std::path::Path) -> trustsync_core::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content).map_err(|e| trustsync_core::SyncError::Config(e.to_string()))
        } else {
            Ok(Self::default())
        }
    }

    /// Cache-update period as a [`Duration`].
    #[must_use]
    pub const fn update_period(&self) -> Duration {
        Duration::from_secs(self.update_period_secs)
    }
}

// Default value functions for serde.
const fn default_connect_timeout() -> u64 {
    10
}

const fn default_read_timeout() -> u64 {
    10
}

const fn default_pool_idle() -> u64 {
    20
}

const fn default_update_period() -> u64 {
    3600
}

const fn default_refresh_interval() -> i64 {
    86400
}

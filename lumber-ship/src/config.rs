//! Configuration for the shipper.

use std::path::Path;
use std::time::Duration;

use lumber_core::ClientConfig;
use serde::{Deserialize, Serialize};

/// Top-level configuration loaded from a TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShipConfig {
    /// Server connection settings.
    pub network: NetworkConfig,
    /// Batching and compression settings.
    pub shipping: ShippingConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Server connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Lumberjack server address (`host:port`).
    pub address: String,
    /// Read/write deadline in seconds. 0 disables deadlines.
    pub timeout_secs: u64,
    /// How many times to redial and resend an unconfirmed window
    /// before giving up.
    pub redial_attempts: u32,
}

/// Batching and compression settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShippingConfig {
    /// Events per window. Each window is sent and acknowledged as one
    /// unit.
    pub window_size: usize,
    /// zlib compression level, 0 (off) through 9.
    pub compression: u32,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    pub level: String,
}

// ── Defaults ─────────────────────────────────────────────────────

impl Default for ShipConfig {
    fn default() -> Self {
        Self {
            network: NetworkConfig::default(),
            shipping: ShippingConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:5044".into(),
            timeout_secs: 30,
            redial_attempts: 3,
        }
    }
}

impl Default for ShippingConfig {
    fn default() -> Self {
        Self {
            window_size: 1024,
            compression: 0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".into() }
    }
}

// ── Loading ──────────────────────────────────────────────────────

impl ShipConfig {
    /// Load configuration from a TOML file, falling back to defaults.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!("invalid config {}: {e}; using defaults", path.display());
                Self::default()
            }),
            Err(_) => {
                tracing::info!("no config at {}; using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Convert the connection settings into a core [`ClientConfig`].
    ///
    /// Compression is passed through unclamped: an out-of-range level
    /// is a configuration error the client reports before dialing.
    pub fn to_client_config(&self) -> ClientConfig {
        ClientConfig {
            timeout: Duration::from_secs(self.network.timeout_secs),
            compression: self.shipping.compression,
        }
    }

    /// Window size with the degenerate zero clamped away.
    pub fn effective_window(&self) -> usize {
        self.shipping.window_size.max(1)
    }
}

// ── Tests ────────────────────────────────────────────────────────

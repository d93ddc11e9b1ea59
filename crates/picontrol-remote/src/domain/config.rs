//! Configuration schema for the remote.
//!
//! Example file:
//!
//! ```toml
//! [connection]
//! port = 8765
//! secure = false
//!
//! [gesture]
//! double_tap_window_ms = 300
//! scroll_amplification = 10.0
//!
//! [logging]
//! level = "info"
//! ```
//!
//! Every field has a serde default, so an empty file, a missing section, or a
//! file written by an older version all load cleanly.  The host is not part
//! of this file: it is a user preference kept in the host store.

use picontrol_core::{GestureConfig, GestureError, DEFAULT_DOUBLE_TAP_WINDOW_MS, DEFAULT_SCROLL_AMPLIFICATION};
use serde::{Deserialize, Serialize};

use crate::domain::endpoint::DEFAULT_PORT;

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct RemoteConfig {
    #[serde(default)]
    pub connection: ConnectionConfig,
    #[serde(default)]
    pub gesture: GestureSection,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// How to reach the remote listener.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConnectionConfig {
    /// Listener port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Use `wss://` instead of `ws://`.
    #[serde(default)]
    pub secure: bool,
}

/// Recognizer tuning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GestureSection {
    #[serde(default = "default_double_tap_window_ms")]
    pub double_tap_window_ms: i64,
    #[serde(default = "default_scroll_amplification")]
    pub scroll_amplification: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// `tracing` level used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub level: String,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_double_tap_window_ms() -> i64 {
    DEFAULT_DOUBLE_TAP_WINDOW_MS
}
fn default_scroll_amplification() -> f64 {
    DEFAULT_SCROLL_AMPLIFICATION
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            secure: false,
        }
    }
}

impl Default for GestureSection {
    fn default() -> Self {
        Self {
            double_tap_window_ms: default_double_tap_window_ms(),
            scroll_amplification: default_scroll_amplification(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl GestureSection {
    /// Converts the section into a validated recognizer config.
    ///
    /// # Errors
    ///
    /// Returns [`GestureError::InvalidConfig`] for a non-positive window or a
    /// non-finite amplification.
    pub fn to_gesture_config(&self) -> Result<GestureConfig, GestureError> {
        let cfg = GestureConfig {
            double_tap_window_ms: self.double_tap_window_ms,
            scroll_amplification: self.scroll_amplification,
        };
        cfg.validate()?;
        Ok(cfg)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

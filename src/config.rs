//! Configuration loading and management
//!
//! Handles parsing of `.decomp.toml` configuration files.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;

/// Configuration file name searched in the working directory
pub const CONFIG_FILE: &str = ".decomp.toml";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Identity configuration
    #[serde(default)]
    pub identity: IdentityConfig,

    /// Relay server / client configuration
    #[serde(default)]
    pub relay: RelayConfig,

    /// Collaborative editing configuration
    #[serde(default)]
    pub collab: CollabConfig,

    /// Working-day calendar configuration
    #[serde(default)]
    pub calendar: CalendarConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            identity: IdentityConfig::default(),
            relay: RelayConfig::default(),
            collab: CollabConfig::default(),
            calendar: CalendarConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from `.decomp.toml` in the given directory.
    ///
    /// A missing file yields the defaults; a present but malformed file is
    /// an error so typos do not silently fall back.
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        Self::load_from_file(&dir.join(CONFIG_FILE))
    }

    /// Load configuration from an explicit file path.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&raw)?;
        Ok(config)
    }
}

/// Identity-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Default username when none is specified
    #[serde(default = "default_username")]
    pub default_username: String,
}

fn default_username() -> String {
    "anonymous".to_string()
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            default_username: default_username(),
        }
    }
}

/// Relay server and client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Address the relay server binds to
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Delay before a disconnected client retries, in seconds
    #[serde(default = "default_reconnect_backoff_secs")]
    pub reconnect_backoff_secs: u64,
}

fn default_bind() -> String {
    "127.0.0.1:7340".to_string()
}

fn default_reconnect_backoff_secs() -> u64 {
    3
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            reconnect_backoff_secs: default_reconnect_backoff_secs(),
        }
    }
}

/// Collaborative editing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollabConfig {
    /// Quiet interval for coalescing field-change broadcasts, in milliseconds
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Time after which an unrefreshed field claim is dropped, in seconds
    #[serde(default = "default_claim_ttl_secs")]
    pub claim_ttl_secs: u64,
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_claim_ttl_secs() -> u64 {
    90
}

impl Default for CollabConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            claim_ttl_secs: default_claim_ttl_secs(),
        }
    }
}

/// Working-day calendar configuration
///
/// The holiday table must be refreshed per deployment year; when the list
/// is absent the built-in 2025 table is used.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CalendarConfig {
    /// Non-working dates as `YYYY-MM-DD` strings
    #[serde(default)]
    pub holidays: Option<Vec<String>>,
}

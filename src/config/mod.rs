//! Configuration management for shellstack
//!
//! Mode flags, worker pool sizing and help rendering options. The
//! configuration is plain serde data; [`loader::ConfigLoader`] finds,
//! parses and validates it.

pub mod loader;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{Error, Result};

/// Main configuration structure for shellstack
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Session authorization and mode flags
    pub session: SessionConfig,

    /// Command dispatch and worker pool configuration
    pub dispatch: DispatchConfig,

    /// Help rendering configuration
    pub help: HelpConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Translation configuration
    pub translation: TranslationConfig,
}

impl Config {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::ConfigParseFailed {
            format: "TOML".to_string(),
            reason: e.to_string(),
        })
    }

    /// Serialize configuration as pretty TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::ConfigSerializationFailed {
            format: "TOML".to_string(),
            reason: e.to_string(),
        })
    }
}

/// Session authorization and mode flags
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Current user holds administrator capability
    pub administrator: bool,

    /// System is in maintenance mode
    pub maintenance_mode: bool,
}

/// What to do when the primary and every alternate worker are busy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExhaustionPolicy {
    /// Spawn another alternate worker, up to the configured maximum
    #[default]
    Grow,
    /// Drop the request with a warning
    Reject,
}

/// Command dispatch and worker pool configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Alternate workers created with each shell instance
    pub alternate_threads: usize,

    /// Upper bound on alternate workers per shell instance
    pub max_alternate_threads: usize,

    /// Behavior when every worker is busy
    pub exhaustion_policy: ExhaustionPolicy,

    /// How long a cancelled command may keep running before its worker
    /// is abandoned and replaced, in milliseconds
    pub cancel_grace_ms: u64,

    /// Poll interval while waiting on a worker, in milliseconds
    pub wait_poll_ms: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            alternate_threads: 1,
            max_alternate_threads: 4,
            exhaustion_policy: ExhaustionPolicy::Grow,
            cancel_grace_ms: 3000,
            wait_poll_ms: 25,
        }
    }
}

/// Help rendering configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HelpConfig {
    /// Print only comma-joined command names
    pub simplified: bool,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Translation configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationConfig {
    /// JSON catalog replacing the built-in English messages
    pub catalog: Option<PathBuf>,
}

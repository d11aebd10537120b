//! Configuration File Loading
//!
//! Handles loading and saving configuration files from the usual locations
//! with TOML and JSON support and a fallback to defaults.

use super::Config;
use crate::error::{Error, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration file names probed in every search directory
const CONFIG_FILE_NAMES: [&str; 2] = ["config.toml", "config.json"];

/// Configuration file loader
pub struct ConfigLoader {
    /// Search paths for configuration files
    search_paths: Vec<PathBuf>,
    /// Current configuration file path (if loaded)
    current_path: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Whether to fall back to the default config if none exists
    pub create_default: bool,
    /// Whether to validate configuration after loading
    pub validate: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            create_default: true,
            validate: true,
        }
    }
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self {
            search_paths: Self::get_search_paths(),
            current_path: None,
        }
    }

    /// Load configuration with default options
    pub fn load() -> Result<Config> {
        Self::new().load_with_options(LoadOptions::default())
    }

    /// Load configuration with custom options
    pub fn load_with_options(&mut self, options: LoadOptions) -> Result<Config> {
        if let Some((path, config)) = self.find_and_load_config()? {
            info!("Configuration loaded from {}", path.display());
            self.current_path = Some(path);

            if options.validate {
                Self::validate_config(&config)?;
            }
            return Ok(config);
        }

        if options.create_default {
            debug!("No configuration file found, using defaults");
            let config = Config::default();
            if options.validate {
                Self::validate_config(&config)?;
            }
            Ok(config)
        } else {
            Err(Error::ConfigNotFound)
        }
    }

    /// Load configuration from a specific file
    pub fn load_from_path(path: &Path) -> Result<Config> {
        if !path.exists() {
            return Err(Error::ConfigLoadFailed {
                path: path.to_path_buf(),
                reason: "Configuration file does not exist".to_string(),
            });
        }

        let content = fs::read_to_string(path).map_err(|e| Error::ConfigLoadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => {
                serde_json::from_str(&content).map_err(|e| Error::ConfigParseFailed {
                    format: "JSON".to_string(),
                    reason: e.to_string(),
                })?
            }
            _ => Config::from_toml_str(&content)?,
        };

        Self::validate_config(&config)?;
        Ok(config)
    }

    /// Save configuration to a specific path
    pub fn save_to_path(config: &Config, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::ConfigSaveFailed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        }

        // Determine format from file extension
        let content = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::to_string_pretty(config).map_err(|e| {
                Error::ConfigSerializationFailed {
                    format: "JSON".to_string(),
                    reason: e.to_string(),
                }
            })?,
            _ => config.to_toml_string()?,
        };

        fs::write(path, content).map_err(|e| Error::ConfigSaveFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Find the first configuration file on the search paths and load it
    fn find_and_load_config(&self) -> Result<Option<(PathBuf, Config)>> {
        for dir in &self.search_paths {
            for name in CONFIG_FILE_NAMES {
                let candidate = dir.join(name);
                if candidate.is_file() {
                    let config = Self::load_from_path(&candidate)?;
                    return Ok(Some((candidate, config)));
                }
            }
        }
        Ok(None)
    }

    /// Get default search paths for configuration files
    fn get_search_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        // Current working directory first, so a project-local file wins
        if let Ok(cwd) = env::current_dir() {
            paths.push(cwd.join(".shellstack"));
        }

        if let Ok(xdg_config) = env::var("XDG_CONFIG_HOME") {
            paths.push(PathBuf::from(xdg_config).join("shellstack"));
        }

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("shellstack"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".shellstack"));
        }

        paths
    }

    /// Validate configuration
    pub fn validate_config(config: &Config) -> Result<()> {
        let dispatch = &config.dispatch;

        if dispatch.max_alternate_threads > 64 {
            return Err(Error::ConfigValidationFailed {
                field: "dispatch.max_alternate_threads".to_string(),
                reason: "Cannot exceed 64 alternate threads".to_string(),
            });
        }

        if dispatch.alternate_threads > dispatch.max_alternate_threads {
            return Err(Error::ConfigValidationFailed {
                field: "dispatch.alternate_threads".to_string(),
                reason: "Initial alternate threads cannot exceed max_alternate_threads"
                    .to_string(),
            });
        }

        if dispatch.wait_poll_ms == 0 {
            return Err(Error::ConfigValidationFailed {
                field: "dispatch.wait_poll_ms".to_string(),
                reason: "Poll interval must be greater than 0".to_string(),
            });
        }

        if dispatch.cancel_grace_ms > 60_000 {
            return Err(Error::ConfigValidationFailed {
                field: "dispatch.cancel_grace_ms".to_string(),
                reason: "Cancellation grace period cannot exceed 60 seconds".to_string(),
            });
        }

        if config.logging.level.trim().is_empty() {
            return Err(Error::ConfigValidationFailed {
                field: "logging.level".to_string(),
                reason: "Log level cannot be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Get the current configuration file path
    pub fn current_path(&self) -> Option<&Path> {
        self.current_path.as_deref()
    }

    /// List all search paths
    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// Add a custom search path
    pub fn add_search_path(&mut self, path: PathBuf) {
        self.search_paths.push(path);
    }

    /// Clear all search paths and add a single path
    pub fn set_search_path(&mut self, path: PathBuf) {
        self.search_paths = vec![path];
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

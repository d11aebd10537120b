//! Error types and Result aliases for shellstack

use std::fmt;
use std::path::PathBuf;

/// Result type alias for shellstack operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for shellstack
#[derive(Debug)]
pub enum Error {
    // === Registry errors ===
    /// A command with the same name already exists in the table
    DuplicateCommand {
        command: String,
        shell_type: String,
    },

    /// Alias points at a command that does not exist
    AliasTargetNotFound {
        alias: String,
        target: String,
        shell_type: String,
    },

    /// Shell type was never registered
    ShellNotRegistered {
        shell_type: String,
    },

    // === Execution errors ===
    /// Failed to spawn a command worker thread
    ThreadSpawnFailed {
        reason: String,
    },

    /// Primary and all alternate workers are busy
    NoThreadAvailable {
        shell_type: String,
    },

    /// Command observed a cancellation request
    Cancelled,

    // === Configuration errors ===
    /// Failed to load configuration file
    ConfigLoadFailed {
        path: PathBuf,
        reason: String,
    },

    /// Failed to save configuration file
    ConfigSaveFailed {
        path: PathBuf,
        reason: String,
    },

    /// Configuration file not found
    ConfigNotFound,

    /// Configuration validation failed
    ConfigValidationFailed {
        field: String,
        reason: String,
    },

    /// Failed to serialize configuration
    ConfigSerializationFailed {
        format: String,
        reason: String,
    },

    /// Failed to parse configuration
    ConfigParseFailed {
        format: String,
        reason: String,
    },

    /// Failed to load a translation catalog
    TranslationCatalogFailed {
        path: PathBuf,
        reason: String,
    },

    // === I/O and serialization errors ===
    /// I/O errors
    Io(std::io::Error),

    /// Serialization errors
    Serde(serde_json::Error),

    /// TOML parsing errors
    Toml(toml::de::Error),

    // === Generic fallback (use sparingly) ===
    /// Generic errors (for cases not yet categorized)
    Other(String),
}

impl Error {
    /// Short, stable name of the error variant
    ///
    /// Used when a handler fault is reported to the user, where the kind
    /// stands in for an exception type name.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::DuplicateCommand { .. } => "DuplicateCommand",
            Error::AliasTargetNotFound { .. } => "AliasTargetNotFound",
            Error::ShellNotRegistered { .. } => "ShellNotRegistered",
            Error::ThreadSpawnFailed { .. } => "ThreadSpawnFailed",
            Error::NoThreadAvailable { .. } => "NoThreadAvailable",
            Error::Cancelled => "Cancelled",
            Error::ConfigLoadFailed { .. } => "ConfigLoadFailed",
            Error::ConfigSaveFailed { .. } => "ConfigSaveFailed",
            Error::ConfigNotFound => "ConfigNotFound",
            Error::ConfigValidationFailed { .. } => "ConfigValidationFailed",
            Error::ConfigSerializationFailed { .. } => "ConfigSerializationFailed",
            Error::ConfigParseFailed { .. } => "ConfigParseFailed",
            Error::TranslationCatalogFailed { .. } => "TranslationCatalogFailed",
            Error::Io(_) => "IoError",
            Error::Serde(_) => "SerializationError",
            Error::Toml(_) => "TomlError",
            Error::Other(_) => "Error",
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Registry errors
            Error::DuplicateCommand {
                command,
                shell_type,
            } => {
                write!(
                    f,
                    "Command '{}' is already registered in shell '{}'",
                    command, shell_type
                )
            }
            Error::AliasTargetNotFound {
                alias,
                target,
                shell_type,
            } => {
                write!(
                    f,
                    "Alias '{}' points at unknown command '{}' in shell '{}'",
                    alias, target, shell_type
                )
            }
            Error::ShellNotRegistered { shell_type } => {
                write!(f, "Shell type '{}' is not registered", shell_type)
            }

            // Execution errors
            Error::ThreadSpawnFailed { reason } => {
                write!(f, "Failed to spawn command thread: {}", reason)
            }
            Error::NoThreadAvailable { shell_type } => {
                write!(f, "No command thread available for shell '{}'", shell_type)
            }
            Error::Cancelled => {
                write!(f, "Command was cancelled")
            }

            // Configuration errors
            Error::ConfigLoadFailed { path, reason } => {
                write!(f, "Failed to load config from '{}': {}", path.display(), reason)
            }
            Error::ConfigSaveFailed { path, reason } => {
                write!(f, "Failed to save config to '{}': {}", path.display(), reason)
            }
            Error::ConfigNotFound => {
                write!(f, "Configuration file not found")
            }
            Error::ConfigValidationFailed { field, reason } => {
                write!(f, "Configuration validation failed for '{}': {}", field, reason)
            }
            Error::ConfigSerializationFailed { format, reason } => {
                write!(f, "Failed to serialize config as {}: {}", format, reason)
            }
            Error::ConfigParseFailed { format, reason } => {
                write!(f, "Failed to parse {} config: {}", format, reason)
            }
            Error::TranslationCatalogFailed { path, reason } => {
                write!(
                    f,
                    "Failed to load translation catalog '{}': {}",
                    path.display(),
                    reason
                )
            }

            // I/O and serialization errors
            Error::Io(err) => write!(f, "I/O error: {}", err),
            Error::Serde(err) => write!(f, "Serialization error: {}", err),
            Error::Toml(err) => write!(f, "TOML parsing error: {}", err),

            // Generic fallback
            Error::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Serde(err) => Some(err),
            Error::Toml(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serde(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Toml(err)
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Other(err.to_string())
    }
}

impl From<String> for Error {
    fn from(err: String) -> Self {
        Error::Other(err)
    }
}

impl From<&str> for Error {
    fn from(err: &str) -> Self {
        Error::Other(err.to_string())
    }
}

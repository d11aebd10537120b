//! Shell Type Definitions
//!
//! Canonical definition of the shell flavors that can appear on the shell
//! stack. Every shell type maps to exactly one `ShellInfo` in the registry.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Flavor of an interactive shell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ShellType {
    /// Main shell
    #[default]
    Shell,
    /// FTP client shell
    Ftp,
    /// SFTP client shell
    Sftp,
    /// Mail client shell
    Mail,
    /// RSS reader shell
    Rss,
    /// Text editor shell
    TextEdit,
    /// Hex editor shell
    HexEdit,
    /// JSON editor shell
    Json,
    /// Archive browser shell
    Archive,
    /// HTTP client shell
    Http,
    /// Administrative shell
    Admin,
    /// Remote debug shell
    Debug,
    /// Test shell
    Test,
}

impl ShellType {
    /// Every known shell type
    pub const ALL: [ShellType; 13] = [
        ShellType::Shell,
        ShellType::Ftp,
        ShellType::Sftp,
        ShellType::Mail,
        ShellType::Rss,
        ShellType::TextEdit,
        ShellType::HexEdit,
        ShellType::Json,
        ShellType::Archive,
        ShellType::Http,
        ShellType::Admin,
        ShellType::Debug,
        ShellType::Test,
    ];

    /// Get a string representation of the shell type
    pub fn as_str(&self) -> &'static str {
        match self {
            ShellType::Shell => "shell",
            ShellType::Ftp => "ftp",
            ShellType::Sftp => "sftp",
            ShellType::Mail => "mail",
            ShellType::Rss => "rss",
            ShellType::TextEdit => "textedit",
            ShellType::HexEdit => "hexedit",
            ShellType::Json => "json",
            ShellType::Archive => "archive",
            ShellType::Http => "http",
            ShellType::Admin => "admin",
            ShellType::Debug => "debug",
            ShellType::Test => "test",
        }
    }

    /// Get shell type from string (case-insensitive)
    pub fn from_string(s: &str) -> Option<Self> {
        let lowered = s.trim().to_lowercase();
        Self::ALL.iter().copied().find(|t| t.as_str() == lowered)
    }

    /// Default prompt shown by a session of this shell type
    pub fn default_prompt(&self) -> String {
        match self {
            ShellType::Shell => "> ".to_string(),
            other => format!("[{}] > ", other.as_str()),
        }
    }
}

impl fmt::Display for ShellType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//! ANSI escape code utilities
//!
//! Maps console color roles onto SGR escape sequences and strips escape
//! sequences again for drivers that capture plain text.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static ESCAPE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\x1b\[[0-9;]*[mK]").expect("static ANSI escape pattern is valid")
});

/// SGR reset sequence
pub const RESET: &str = "\x1b[0m";

/// Semantic color of a console line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ColorRole {
    /// Regular text
    #[default]
    Neutral,
    /// Operation succeeded
    Success,
    /// Advisory message
    Warning,
    /// Failure message
    Error,
    /// Section title in listings
    ListTitle,
    /// Entry name in listings
    ListEntry,
    /// Entry value or description in listings
    ListValue,
    /// Highlighted alternative entry (unified commands)
    Alternative,
    /// Prompt text
    Input,
}

impl ColorRole {
    /// SGR sequence that starts this role
    pub fn sgr(&self) -> &'static str {
        match self {
            ColorRole::Neutral => "\x1b[0m",
            ColorRole::Success => "\x1b[32m",
            ColorRole::Warning => "\x1b[33m",
            ColorRole::Error => "\x1b[31m",
            ColorRole::ListTitle => "\x1b[1;37m",
            ColorRole::ListEntry => "\x1b[36m",
            ColorRole::ListValue => "\x1b[37m",
            ColorRole::Alternative => "\x1b[35m",
            ColorRole::Input => "\x1b[1;34m",
        }
    }
}

/// Wrap text in the escape sequences of a role
pub fn colorize(text: &str, role: ColorRole) -> String {
    if role == ColorRole::Neutral {
        return text.to_string();
    }
    format!("{}{}{}", role.sgr(), text, RESET)
}

/// Remove ANSI escape sequences from text
pub fn strip_ansi_codes(text: &str) -> String {
    ESCAPE_REGEX.replace_all(text, "").to_string()
}

//! Translation lookup
//!
//! Every user-facing message passes through a [`Translator`]. Messages are
//! keyed by their English text, so a missing entry degrades to English.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// Localized string lookup
pub trait Translator: Send + Sync {
    /// Localized text for `key`, or `key` itself when unknown
    fn translate(&self, key: &str) -> String;
}

/// Key to text catalog for one language
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    language: String,
    entries: HashMap<String, String>,
}

impl Catalog {
    /// Built-in English catalog (identity lookup)
    pub fn english() -> Self {
        Self {
            language: "eng".to_string(),
            entries: HashMap::new(),
        }
    }

    /// Parse a catalog from a JSON object of key/text pairs
    pub fn from_json_str(language: &str, json: &str) -> Result<Self> {
        let entries: HashMap<String, String> = serde_json::from_str(json)?;
        Ok(Self {
            language: language.to_string(),
            entries,
        })
    }

    /// Load a catalog file; the language is the file stem
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| Error::TranslationCatalogFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let language = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("custom");

        Self::from_json_str(language, &content).map_err(|e| Error::TranslationCatalogFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Language name of this catalog
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Number of translated entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Translator for Catalog {
    fn translate(&self, key: &str) -> String {
        self.entries
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }
}

/// Substitute `{0}`, `{1}`, … placeholders with the given arguments
pub fn fill(template: &str, args: &[&dyn fmt::Display]) -> String {
    let mut result = template.to_string();
    for (index, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{}}}", index), &arg.to_string());
    }
    result
}

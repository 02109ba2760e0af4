//! Message catalog for label and board name lookup

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::config::ConfigError;

pub const DEFAULT_LOCALE: &str = "en-US";

/// Translations for one locale, keyed by message id
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Translations {
    pub locale: String,
    #[serde(default)]
    pub messages: HashMap<String, String>,
}

impl Default for Translations {
    fn default() -> Self {
        Self::new(DEFAULT_LOCALE)
    }
}

impl Translations {
    pub fn new(locale: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            messages: HashMap::new(),
        }
    }

    pub fn with_message(mut self, id: impl Into<String>, text: impl Into<String>) -> Self {
        self.messages.insert(id.into(), text.into());
        self
    }

    /// Build from a flat JSON object of `id -> text`
    pub fn from_json_str(locale: impl Into<String>, content: &str) -> Result<Self, ConfigError> {
        let messages: HashMap<String, String> =
            serde_json::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        Ok(Self {
            locale: locale.into(),
            messages,
        })
    }

    pub fn load(locale: impl Into<String>, path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json_str(locale, &content)
    }

    /// Translation for `id`, if the catalog has one
    pub fn resolve(&self, id: &str) -> Option<&str> {
        self.messages.get(id).map(String::as_str)
    }

    /// Translation for `id`, falling back to the id itself
    pub fn format_message(&self, id: &str) -> String {
        self.resolve(id).unwrap_or(id).to_string()
    }

    /// Display text for a tile label.
    ///
    /// A label key wins when the catalog knows it; otherwise the raw label is
    /// looked up (and kept verbatim if unknown), then the raw key, then `""`.
    pub fn label_for(&self, label: Option<&str>, label_key: Option<&str>) -> String {
        let label = label.filter(|l| !l.is_empty());
        let label_key = label_key.filter(|k| !k.is_empty());

        if let Some(text) = label_key.and_then(|key| self.resolve(key)) {
            return text.to_string();
        }
        match (label, label_key) {
            (Some(label), _) => self.format_message(label),
            (None, Some(key)) => key.to_string(),
            (None, None) => String::new(),
        }
    }
}

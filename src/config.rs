use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::model::line_format::EntryFormat;

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Config {
    /// File suffix that marks a search-results document
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Minimum width the 1-based line number of a generated entry is padded to
    #[serde(default = "default_line_number_width")]
    pub line_number_width: usize,

    /// Indentation written before the padded line number of a generated entry
    #[serde(default = "default_entry_indent")]
    pub entry_indent: String,

    /// Whether lines inserted by a merge are reported as the new selection
    #[serde(default = "default_true")]
    pub select_inserted: bool,
}

fn default_extension() -> String {
    ".search".to_string()
}

fn default_line_number_width() -> usize {
    5
}

fn default_entry_indent() -> String {
    "  ".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            extension: default_extension(),
            line_number_width: default_line_number_width(),
            entry_indent: default_entry_indent(),
            select_inserted: true,
        }
    }
}

impl Config {
    /// Config file name inside the config directories
    pub const FILENAME: &'static str = "config.json";

    /// Load configuration from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::IoError(format!("{}: {}", path.as_ref().display(), e)))?;

        let config: Config =
            serde_json::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;

        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path.as_ref(), contents).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Layout used for generated entry lines
    pub fn entry_format(&self) -> EntryFormat {
        EntryFormat {
            indent: self.entry_indent.clone(),
            number_width: self.line_number_width,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.extension.starts_with('.') || self.extension.len() < 2 {
            return Err(ConfigError::ValidationError(format!(
                "extension must start with '.' and name a suffix, got {:?}",
                self.extension
            )));
        }

        if !(1..=12).contains(&self.line_number_width) {
            return Err(ConfigError::ValidationError(
                "line_number_width must be between 1 and 12".to_string(),
            ));
        }

        // generated entries must still parse as entries
        if self.entry_indent.is_empty() || self.entry_indent.chars().any(|c| c != ' ') {
            return Err(ConfigError::ValidationError(
                "entry_indent must be one or more spaces".to_string(),
            ));
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
    SerializeError(String),
    ValidationError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(msg) => write!(f, "IO error: {msg}"),
            ConfigError::ParseError(msg) => write!(f, "Parse error: {msg}"),
            ConfigError::SerializeError(msg) => write!(f, "Serialize error: {msg}"),
            ConfigError::ValidationError(msg) => write!(f, "Validation error: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

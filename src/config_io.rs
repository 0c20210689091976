//! Runtime configuration I/O operations.
//!
//! This module contains system directory detection and config loading
//! utilities. These are separated from config.rs so the schema generator only
//! needs the data types.

use crate::config::{Config, ConfigError};
use std::path::{Path, PathBuf};

/// Name of the per-project directory holding local config and session state
pub const PROJECT_DIR_NAME: &str = ".add-to-search";

/// Application directory name under the system config directory
const APP_DIR_NAME: &str = "add-to-search";

/// Directory for project-local state: `{working_dir}/.add-to-search`
pub fn project_dir(working_dir: &Path) -> PathBuf {
    working_dir.join(PROJECT_DIR_NAME)
}

/// Directories used by the tool, resolved once and passed down explicitly.
///
/// Tests build one with [`DirectoryContext::for_testing`] so nothing reads
/// the real user directories.
#[derive(Debug, Clone)]
pub struct DirectoryContext {
    /// Config directory for user configuration
    /// e.g., ~/.config/add-to-search on Linux
    pub config_dir: PathBuf,
}

impl DirectoryContext {
    /// Create a DirectoryContext from the system directories
    pub fn from_system() -> std::io::Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "Could not determine config directory",
                )
            })?
            .join(APP_DIR_NAME);

        Ok(Self { config_dir })
    }

    /// Create a DirectoryContext for testing with a temp directory
    pub fn for_testing(temp_dir: &Path) -> Self {
        Self {
            config_dir: temp_dir.join("config"),
        }
    }

    /// Get the user config file path
    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join(Config::FILENAME)
    }
}

impl Config {
    /// Get the project-local config path for a working directory.
    pub fn local_config_path(working_dir: &Path) -> PathBuf {
        project_dir(working_dir).join(Config::FILENAME)
    }

    /// Get all config search paths that exist, local first.
    ///
    /// Search order:
    /// 1. `{working_dir}/.add-to-search/config.json`
    /// 2. `{config_dir}/config.json`
    fn config_search_paths(working_dir: &Path, dir_context: &DirectoryContext) -> Vec<PathBuf> {
        [
            Self::local_config_path(working_dir),
            dir_context.config_path(),
        ]
        .into_iter()
        .filter(|p| p.exists())
        .collect()
    }

    /// Find the first existing config file, checking the project first.
    pub fn find_config_path(working_dir: &Path, dir_context: &DirectoryContext) -> Option<PathBuf> {
        Self::config_search_paths(working_dir, dir_context)
            .into_iter()
            .next()
    }

    /// Load configuration, checking the project directory first, then the
    /// user config directory.
    ///
    /// Falls back to defaults if no config file is found or all fail to load.
    pub fn load_for_working_dir(working_dir: &Path, dir_context: &DirectoryContext) -> Self {
        for path in Self::config_search_paths(working_dir, dir_context) {
            match Self::load_from_file(&path) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    return config;
                }
                Err(e) => {
                    tracing::warn!(
                        "Failed to load config from {}: {}, trying next option",
                        path.display(),
                        e
                    );
                }
            }
        }
        tracing::debug!("No config file found, using defaults");
        Self::default()
    }

    /// Load an explicitly requested config file. Unlike
    /// [`Config::load_for_working_dir`], failures are reported.
    pub fn load_explicit(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::load_from_file(path)?;
        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }
}

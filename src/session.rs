//! The "current target" slot.
//!
//! Commands never touch global state: they receive a [`SessionState`] and may
//! change it, and the caller persists it with a [`SessionStore`]. The CLI
//! keeps one store per working directory, under `.add-to-search/session.json`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::config::ConfigError;
use crate::config_io::project_dir;
use crate::services::host::atomic_write;

/// Persisted session state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    /// Identifier of the search-results document selections are added to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_target: Option<String>,
}

impl SessionState {
    /// The current target, if set to a non-empty identifier
    pub fn target(&self) -> Option<&str> {
        self.current_target.as_deref().filter(|t| !t.is_empty())
    }

    /// Replace the current target (last write wins)
    pub fn set_target(&mut self, target: impl Into<String>) {
        self.current_target = Some(target.into());
    }
}

/// Loads and saves [`SessionState`] as JSON.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    const FILENAME: &'static str = "session.json";

    /// Store for the project rooted at `working_dir`
    pub fn for_working_dir(working_dir: &Path) -> Self {
        Self {
            path: project_dir(working_dir).join(Self::FILENAME),
        }
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored session. A missing file is an empty session; an
    /// unreadable or corrupt one is logged and treated as empty.
    pub fn load(&self) -> SessionState {
        match self.try_load() {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!("Ignoring session file {}: {}", self.path.display(), e);
                SessionState::default()
            }
        }
    }

    fn try_load(&self) -> Result<SessionState, ConfigError> {
        if !self.path.exists() {
            return Ok(SessionState::default());
        }
        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| ConfigError::IoError(format!("{}: {}", self.path.display(), e)))?;
        serde_json::from_str(&content)
            .map_err(|e| ConfigError::ParseError(format!("{}: {}", self.path.display(), e)))
    }

    /// Write the session, creating the parent directory if needed
    pub fn save(&self, state: &SessionState) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ConfigError::IoError(format!("{}: {}", parent.display(), e)))?;
        }
        let json = serde_json::to_string_pretty(state)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;
        atomic_write(&self.path, json.as_bytes())
            .map_err(|e| ConfigError::IoError(format!("{}: {}", self.path.display(), e)))?;
        tracing::debug!("Saved session to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_target_counts_as_unset() {
        let mut state = SessionState::default();
        assert_eq!(state.target(), None);
        state.set_target("");
        assert_eq!(state.target(), None);
        state.set_target("hits.search");
        assert_eq!(state.target(), Some("hits.search"));
        state.set_target("other.search");
        assert_eq!(state.target(), Some("other.search"));
    }

    #[test]
    fn test_store_round_trip() {
        let temp = tempfile::tempdir().unwrap();
        let store = SessionStore::for_working_dir(temp.path());
        assert_eq!(store.load(), SessionState::default());

        let mut state = SessionState::default();
        state.set_target("/work/hits.search");
        store.save(&state).unwrap();

        assert!(store.path().starts_with(temp.path().join(".add-to-search")));
        assert_eq!(store.load(), state);
    }

    #[test]
    fn test_corrupt_session_loads_empty() {
        let temp = tempfile::tempdir().unwrap();
        let store = SessionStore::with_path(temp.path().join("session.json"));
        std::fs::write(store.path(), "{{{").unwrap();
        assert_eq!(store.load(), SessionState::default());
    }
}

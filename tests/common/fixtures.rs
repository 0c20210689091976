// Test workspace fixtures

use add_to_search::commands::{self, ActiveDocument, AddRequest, CommandOutcome};
use add_to_search::config::Config;
use add_to_search::model::selection::SelectionRange;
use add_to_search::services::host::FsHost;
use add_to_search::session::{SessionState, SessionStore};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// A temporary working directory with a file-system host and a session
pub struct Workspace {
    _temp_dir: TempDir,
    pub root: PathBuf,
    pub host: FsHost,
    pub session: SessionState,
    pub config: Config,
}

impl Workspace {
    pub fn new() -> anyhow::Result<Self> {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> anyhow::Result<Self> {
        let temp_dir = tempfile::tempdir()?;
        let root = temp_dir.path().to_path_buf();
        Ok(Workspace {
            _temp_dir: temp_dir,
            host: FsHost::new(root.clone()),
            root,
            session: SessionState::default(),
            config,
        })
    }

    /// Write a file relative to the workspace root
    pub fn write(&self, name: &str, content: &str) -> anyhow::Result<()> {
        let path = self.root.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }

    /// Read a file relative to the workspace root
    pub fn read(&self, name: &str) -> anyhow::Result<String> {
        Ok(fs::read_to_string(self.root.join(name))?)
    }

    pub fn store(&self) -> SessionStore {
        SessionStore::for_working_dir(&self.root)
    }

    /// Use `id` as the target, asserting it was accepted
    pub fn use_target(&mut self, id: &str) {
        let outcome =
            commands::use_as_target(&mut self.session, &self.config, &ActiveDocument::new(id));
        assert_eq!(
            outcome,
            CommandOutcome::TargetSet {
                target: id.to_string()
            }
        );
    }

    /// Add 0-based inclusive line ranges of `source` to the target
    pub fn add(&mut self, source: &str, ranges: &[(usize, usize)]) -> anyhow::Result<CommandOutcome> {
        let request = AddRequest {
            source: ActiveDocument::new(source),
            selections: ranges
                .iter()
                .map(|&(a, b)| SelectionRange::new(a, b))
                .collect(),
            mode: None,
            dry_run: false,
        };
        commands::add_selection(&mut self.host, &self.session, &self.config, &request)
    }
}

/// Numbered filler lines with `text` placed at 0-based `line`
pub fn source_with(len: usize, placed: &[(usize, &str)]) -> String {
    let mut lines: Vec<String> = (0..len).map(|i| format!("line {}", i + 1)).collect();
    for &(line, text) in placed {
        lines[line] = text.to_string();
    }
    lines.join("\n") + "\n"
}

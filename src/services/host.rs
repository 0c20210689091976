//! Host capabilities the commands need, and a file-system implementation.
//!
//! An editor integration implements [`Host`] on top of its own buffers; the
//! command-line tool uses [`FsHost`], which treats identifiers as paths and
//! reads and writes files directly.

use anyhow::{Context, Result as AnyhowResult};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::model::document::{AppliedEdit, TextDocument};
use crate::model::types::InsertionPlan;

/// Document access provided by the host.
pub trait Host {
    /// Read a document's content as lines.
    fn read_document(&self, id: &str) -> AnyhowResult<TextDocument>;

    /// Open (or bring up) a document by identifier. Returns `None` for an
    /// empty identifier.
    fn open_document(&mut self, id: &str) -> AnyhowResult<Option<TextDocument>>;

    /// Apply a whole plan to a document as one edit, every index interpreted
    /// against the pre-edit numbering.
    fn apply_insertions(&mut self, id: &str, plan: &InsertionPlan) -> AnyhowResult<AppliedEdit>;

    /// Select the given post-edit lines in the document's editor.
    fn set_selection(&mut self, id: &str, lines: &[usize]);
}

/// File-system host: identifiers are paths, relative ones resolved against
/// the working directory.
#[derive(Debug)]
pub struct FsHost {
    working_dir: PathBuf,
    selections: HashMap<String, Vec<usize>>,
}

impl FsHost {
    pub fn new(working_dir: PathBuf) -> Self {
        Self {
            working_dir,
            selections: HashMap::new(),
        }
    }

    /// Path a document identifier refers to
    pub fn resolve(&self, id: &str) -> PathBuf {
        let path = Path::new(id);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.working_dir.join(path)
        }
    }

    /// Last selection set on a document
    pub fn selection(&self, id: &str) -> Option<&[usize]> {
        self.selections.get(id).map(Vec::as_slice)
    }

    /// Read a document, treating a missing file as empty
    fn read_or_empty(&self, id: &str) -> AnyhowResult<TextDocument> {
        let path = self.resolve(id);
        if !path.exists() {
            tracing::info!("{} does not exist yet, starting empty", path.display());
            return Ok(TextDocument::default());
        }
        self.read_document(id)
    }
}

impl Host for FsHost {
    fn read_document(&self, id: &str) -> AnyhowResult<TextDocument> {
        let path = self.resolve(id);
        let text = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(TextDocument::from_text(&text))
    }

    fn open_document(&mut self, id: &str) -> AnyhowResult<Option<TextDocument>> {
        if id.is_empty() {
            return Ok(None);
        }
        self.read_or_empty(id).map(Some)
    }

    fn apply_insertions(&mut self, id: &str, plan: &InsertionPlan) -> AnyhowResult<AppliedEdit> {
        let mut doc = self.read_or_empty(id)?;
        let edit = doc.apply_insertions(plan);
        if edit.inserted == 0 {
            return Ok(edit);
        }

        let path = self.resolve(id);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        atomic_write(&path, doc.to_text().as_bytes())
            .with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::info!("Inserted {} lines into {}", edit.inserted, path.display());
        Ok(edit)
    }

    fn set_selection(&mut self, id: &str, lines: &[usize]) {
        self.selections.insert(id.to_string(), lines.to_vec());
    }
}

/// Write via a temp file and rename so readers never see a partial file
pub(crate) fn atomic_write(target: &Path, content: &[u8]) -> io::Result<()> {
    let mut temp_name = target.as_os_str().to_os_string();
    temp_name.push(".tmp");
    let temp_path = PathBuf::from(temp_name);

    let result = File::create(&temp_path)
        .and_then(|mut file| file.write_all(content))
        .and_then(|()| fs::rename(&temp_path, target));
    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

//! Data model shared by the line-format parser, the selection extractor and
//! the merge planner.

use serde::Serialize;

/// One line of source content, tagged with the 0-based line number it came
/// from in its origin buffer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LineEntry {
    pub line: usize,
    pub text: String,
}

impl LineEntry {
    pub fn new(line: usize, text: impl Into<String>) -> Self {
        Self {
            line,
            text: text.into(),
        }
    }

    /// Key under which two entries count as "the same line".
    pub fn dedup_key(&self) -> DedupKey {
        DedupKey::new(self.line, &self.text)
    }
}

/// Identity of a line for merge purposes: the line number plus the trimmed
/// text. Same number with different text is a different key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DedupKey {
    line: usize,
    text: String,
}

impl DedupKey {
    pub fn new(line: usize, text: &str) -> Self {
        Self {
            line,
            text: text.trim().to_string(),
        }
    }
}

impl std::fmt::Display for DedupKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.text)
    }
}

/// An entry line found inside a parsed section, with its position in the
/// parsed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionEntry {
    /// Index of the entry line in the parsed document
    pub index: usize,
    pub entry: LineEntry,
}

/// A header line and the entry lines that follow it, up to the next header.
///
/// This is a positional view into the document it was parsed from; it is
/// only valid until that document is edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSection {
    /// Index of the header line in the parsed document
    pub header_index: usize,
    /// Entry lines in document order; indices are strictly increasing
    pub entries: Vec<SectionEntry>,
}

/// The set of lines from one file that must be present in that file's
/// section of the target document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregate {
    pub file: String,
    pub entries: Vec<LineEntry>,
}

impl Aggregate {
    pub fn new(file: impl Into<String>, entries: Vec<LineEntry>) -> Self {
        Self {
            file: file.into(),
            entries,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A single line to insert, positioned against the pre-edit document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Insertion {
    /// Line index in the original document before which `text` is inserted.
    /// Equal to the document length for an append.
    pub index: usize,
    pub text: String,
}

impl Insertion {
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
        }
    }
}

/// An ordered batch of insertions, all interpreted against the same pre-edit
/// document and sorted by `index` (stable for equal indices).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct InsertionPlan {
    insertions: Vec<Insertion>,
}

impl InsertionPlan {
    /// Build a plan, sorting by insertion index while keeping the relative
    /// order of insertions that share an index.
    pub fn from_unsorted(mut insertions: Vec<Insertion>) -> Self {
        insertions.sort_by_key(|i| i.index);
        Self { insertions }
    }

    pub fn is_empty(&self) -> bool {
        self.insertions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.insertions.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Insertion> {
        self.insertions.iter()
    }
}

impl<'a> IntoIterator for &'a InsertionPlan {
    type Item = &'a Insertion;
    type IntoIter = std::slice::Iter<'a, Insertion>;

    fn into_iter(self) -> Self::IntoIter {
        self.insertions.iter()
    }
}

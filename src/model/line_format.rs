//! The search-results line format.
//!
//! A document in this format is a flat list of lines with two recognised
//! shapes:
//!
//! ```text
//! src/foo.rs:
//!      12: let x = 1;
//!      40: x + 1
//! ```
//!
//! - a *header* names a file: no leading space or tab, ends with `:`
//! - an *entry* is indented and starts with a 1-based line number and `:`
//!
//! Anything else is free-form annotation and is skipped by the parser.

use once_cell::sync::Lazy;
use regex::Regex;

use super::types::{FileSection, LineEntry, SectionEntry};

static RE_FILE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([^ \t].*):$").expect("header pattern is valid"));
static RE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^ +([0-9]+):").expect("entry pattern is valid"));

/// Language id hosts use for documents in this format.
pub const LANGUAGE_ID: &str = "search-result";

/// Return the file identifier if `line` is a header line.
pub fn parse_header(line: &str) -> Option<&str> {
    RE_FILE
        .captures(line)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Parse an entry line into a 0-based line number and the text after the
/// `NN:` prefix.
///
/// Line number `0` has no 0-based counterpart and is not an entry.
pub fn parse_entry(line: &str) -> Option<LineEntry> {
    let caps = RE_LINE.captures(line)?;
    let prefix = caps.get(0)?;
    let number: usize = caps.get(1)?.as_str().parse().ok()?;
    let line_number = number.checked_sub(1)?;
    Some(LineEntry::new(line_number, &line[prefix.end()..]))
}

/// Whether a document identified by `path` (and optionally tagged with a
/// host language id) is written in this format.
pub fn is_line_format(path: &str, language_id: Option<&str>, extension: &str) -> bool {
    (!extension.is_empty() && path.ends_with(extension)) || language_id == Some(LANGUAGE_ID)
}

/// Iterator over the file sections of a document, in document order.
///
/// Yields one item per header line. Each section collects the entry lines
/// between its header and the next header (or the end of the document).
pub struct Sections<'a, S> {
    lines: &'a [S],
    next: usize,
}

/// Scan `lines` for file sections.
pub fn parse_sections<S: AsRef<str>>(lines: &[S]) -> Sections<'_, S> {
    Sections { lines, next: 0 }
}

impl<'a, S: AsRef<str>> Iterator for Sections<'a, S> {
    type Item = (&'a str, FileSection);

    fn next(&mut self) -> Option<Self::Item> {
        let lines: &'a [S] = self.lines;
        while self.next < lines.len() {
            let header_index = self.next;
            self.next += 1;

            let Some(file) = parse_header(lines[header_index].as_ref()) else {
                continue;
            };

            let mut entries = Vec::new();
            let mut i = header_index + 1;
            while i < lines.len() {
                let line = lines[i].as_ref();
                if parse_header(line).is_some() {
                    break;
                }
                if let Some(entry) = parse_entry(line) {
                    entries.push(SectionEntry { index: i, entry });
                }
                i += 1;
            }

            return Some((
                file,
                FileSection {
                    header_index,
                    entries,
                },
            ));
        }
        None
    }
}

/// Layout of generated entry lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryFormat {
    /// Leading indentation before the padded line number
    pub indent: String,
    /// Minimum width the 1-based line number is right-aligned to
    pub number_width: usize,
}

impl Default for EntryFormat {
    fn default() -> Self {
        Self {
            indent: "  ".to_string(),
            number_width: 5,
        }
    }
}

impl EntryFormat {
    /// Render an entry as `<indent><padded 1-based number>: <text>`.
    pub fn entry_line(&self, entry: &LineEntry) -> String {
        format!(
            "{}{:>width$}: {}",
            self.indent,
            entry.line + 1,
            entry.text,
            width = self.number_width
        )
    }
}

/// Render the header line for `file`.
pub fn header_line(file: &str) -> String {
    format!("{file}:")
}

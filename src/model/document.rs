//! In-memory line buffer that applies insertion plans.
//!
//! This is the reference rewriter used by the file-system host: it keeps the
//! document as lines plus a flag for the final line break, applies a whole
//! [`InsertionPlan`] against the pre-edit numbering, and reports which lines
//! should be selected afterwards.

use super::types::InsertionPlan;

/// Line ending used when the document is written back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }

    /// Detect from the first line break in `text`; defaults to LF.
    pub fn detect(text: &str) -> Self {
        match text.find('\n') {
            Some(i) if i > 0 && text.as_bytes()[i - 1] == b'\r' => LineEnding::CrLf,
            _ => LineEnding::Lf,
        }
    }
}

/// A text document split into lines.
///
/// A final line break does not produce an empty trailing line; it is
/// recorded in `trailing_newline` instead.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextDocument {
    lines: Vec<String>,
    trailing_newline: bool,
    line_ending: LineEnding,
}

/// Result of applying a plan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppliedEdit {
    /// Number of lines inserted
    pub inserted: usize,
    /// Post-edit indices of the inserted non-empty lines, ascending
    pub selection: Vec<usize>,
}

impl TextDocument {
    pub fn from_text(text: &str) -> Self {
        let line_ending = LineEnding::detect(text);
        if text.is_empty() {
            return Self {
                line_ending,
                ..Self::default()
            };
        }

        let mut lines: Vec<String> = text
            .split('\n')
            .map(|l| l.strip_suffix('\r').unwrap_or(l).to_string())
            .collect();
        let trailing_newline = text.ends_with('\n');
        if trailing_newline {
            lines.pop();
        }
        Self {
            lines,
            trailing_newline,
            line_ending,
        }
    }

    /// The lines the merge planner works on.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn has_trailing_newline(&self) -> bool {
        self.trailing_newline
    }

    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    /// Apply every insertion of `plan` as if simultaneously against the
    /// current numbering.
    ///
    /// Each inserted line is terminated by a line break, so a non-empty plan
    /// also terminates a last line that lacked one.
    pub fn apply_insertions(&mut self, plan: &InsertionPlan) -> AppliedEdit {
        if plan.is_empty() {
            return AppliedEdit::default();
        }

        let old = std::mem::take(&mut self.lines);
        let mut lines = Vec::with_capacity(old.len() + plan.len());
        let mut selection = Vec::new();
        let mut pending = plan.iter().peekable();

        for index in 0..=old.len() {
            while let Some(ins) = pending.next_if(|ins| ins.index <= index) {
                if !ins.text.is_empty() {
                    selection.push(lines.len());
                }
                lines.push(ins.text.clone());
            }
            if let Some(line) = old.get(index) {
                lines.push(line.clone());
            }
        }
        // indices past the end are treated as appends
        for ins in pending {
            if !ins.text.is_empty() {
                selection.push(lines.len());
            }
            lines.push(ins.text.clone());
        }

        self.lines = lines;
        self.trailing_newline = true;
        AppliedEdit {
            inserted: plan.len(),
            selection,
        }
    }

    pub fn to_text(&self) -> String {
        let eol = self.line_ending.as_str();
        let mut text = self.lines.join(eol);
        if self.trailing_newline {
            text.push_str(eol);
        }
        text
    }
}

//! Merge planning: decide which lines to insert into a search-results
//! document so that each file section holds the union of its existing
//! entries and the entries of an aggregate.
//!
//! The planner never deletes or rewrites a line. It only produces
//! insertions positioned against the unmodified document, so a whole batch
//! can be applied in one edit without index drift.
//!
//! Per aggregate:
//! 1. entries are sorted by line number
//! 2. entries already present in the file's section (same line number and
//!    same trimmed text) are dropped
//! 3. if the file has no section, a header is appended at the end of the
//!    document, after a blank separator line when the document is non-empty
//!    and its last line is not blank, or when an earlier aggregate of the
//!    same batch already appends a section
//! 4. remaining entries are interleaved into the last section for the file,
//!    each placed before the first existing entry with a larger line number;
//!    on equal line numbers the existing entry stays first

use std::collections::{HashMap, HashSet};

use super::line_format::{header_line, parse_header, parse_sections, EntryFormat};
use super::types::{Aggregate, DedupKey, FileSection, Insertion, InsertionPlan, LineEntry};
use crate::primitives::ordering::{cmp_by, partition_by, zip_shortest};

/// Computes insertion plans against a target document.
#[derive(Debug, Clone, Default)]
pub struct MergePlanner {
    format: EntryFormat,
}

impl MergePlanner {
    pub fn new(format: EntryFormat) -> Self {
        Self { format }
    }

    /// Plan the insertions needed to merge one aggregate into `lines`.
    ///
    /// The result is in generation order: ascending by index, with
    /// insertions at the same index in the order they must appear.
    pub fn plan<S: AsRef<str>>(&self, lines: &[S], aggregate: Aggregate) -> Vec<Insertion> {
        self.plan_after(lines, aggregate, false)
    }

    /// Like [`MergePlanner::plan`], where `appended` says whether an earlier
    /// aggregate of the same batch already appends a section at the end.
    fn plan_after<S: AsRef<str>>(
        &self,
        lines: &[S],
        mut aggregate: Aggregate,
        appended: bool,
    ) -> Vec<Insertion> {
        aggregate.entries.sort_by(cmp_by(|e: &LineEntry| e.line));

        let mut pending: HashMap<DedupKey, usize> = aggregate
            .entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.dedup_key(), i))
            .collect();

        let mut target: Option<FileSection> = None;
        for (file, section) in parse_sections(lines) {
            if file != aggregate.file {
                continue;
            }
            // same number with different text is a distinct line and stays pending
            for existing in &section.entries {
                pending.remove(&existing.entry.dedup_key());
            }
            target = Some(section);
        }

        let mut fresh: Vec<usize> = pending.into_values().collect();
        fresh.sort_unstable();

        let mut out = Vec::new();

        // Entries are inserted after the header and after each existing entry;
        // `after` holds those anchor positions, `bound` the line number of the
        // entry that follows each anchor (None for the end of the section).
        let (after, bound): (Vec<usize>, Vec<Option<usize>>) = match target {
            Some(section) => {
                let after = std::iter::once(section.header_index + 1)
                    .chain(section.entries.iter().map(|e| e.index + 1))
                    .collect();
                let bound = section
                    .entries
                    .iter()
                    .map(|e| Some(e.entry.line))
                    .chain(std::iter::once(None))
                    .collect();
                (after, bound)
            }
            None => {
                let end = lines.len();
                if appended || lines.last().is_some_and(|l| !l.as_ref().is_empty()) {
                    out.push(Insertion::new(end, ""));
                }
                out.push(Insertion::new(end, header_line(&aggregate.file)));
                tracing::debug!(file = %aggregate.file, "planning new section");
                (vec![end], vec![None])
            }
        };

        let mut next = 0;
        for (at, limit) in zip_shortest(after, bound) {
            while let Some(&idx) = fresh.get(next) {
                let entry = &aggregate.entries[idx];
                // new text on an existing line number goes after the old text
                if limit.is_some_and(|jm| entry.line >= jm) {
                    break;
                }
                out.push(Insertion::new(at, self.format.entry_line(entry)));
                next += 1;
            }
        }

        tracing::debug!(
            file = %aggregate.file,
            entries = aggregate.entries.len(),
            inserted = out.len(),
            "planned merge"
        );
        out
    }

    /// Plan the merge of several aggregates into `lines` as one batch.
    ///
    /// Aggregates naming the same file are combined first. Files that already
    /// have a section are planned in first-encountered order; files without
    /// one are planned after them in reverse encounter order, so their new
    /// sections are appended in that order, each after a blank separator
    /// except a first section on an empty document. The combined plan is
    /// sorted by index, keeping generation order for equal indices.
    pub fn plan_all<S: AsRef<str>>(&self, lines: &[S], aggregates: Vec<Aggregate>) -> InsertionPlan {
        let mut combined: Vec<Aggregate> = Vec::new();
        let mut by_file: HashMap<String, usize> = HashMap::new();
        for agg in aggregates {
            match by_file.get(&agg.file) {
                Some(&at) => combined[at].entries.extend(agg.entries),
                None => {
                    by_file.insert(agg.file.clone(), combined.len());
                    combined.push(agg);
                }
            }
        }

        let existing: HashSet<&str> = lines
            .iter()
            .filter_map(|l| parse_header(l.as_ref()))
            .collect();
        let (missing, present) = partition_by(combined, |a| existing.contains(a.file.as_str()));

        let mut insertions: Vec<Insertion> = present
            .into_iter()
            .flat_map(|agg| self.plan(lines, agg))
            .collect();
        for (i, agg) in missing.into_iter().rev().enumerate() {
            insertions.extend(self.plan_after(lines, agg, i > 0));
        }
        InsertionPlan::from_unsorted(insertions)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::model::document::TextDocument;
    use proptest::prelude::*;

    fn entries() -> impl Strategy<Value = Vec<LineEntry>> {
        prop::collection::vec((0usize..40, "[a-z]{1,6}"), 0..12)
            .prop_map(|v| v.into_iter().map(|(l, t)| LineEntry::new(l, t)).collect())
    }

    fn merged(doc: &TextDocument, file: &str, entries: Vec<LineEntry>) -> TextDocument {
        let plan = MergePlanner::default()
            .plan_all(doc.lines(), vec![Aggregate::new(file, entries)]);
        let mut doc = doc.clone();
        doc.apply_insertions(&plan);
        doc
    }

    fn section_entries(doc: &TextDocument, file: &str) -> Vec<LineEntry> {
        parse_sections(doc.lines())
            .filter(|(f, _)| *f == file)
            .last()
            .map(|(_, s)| {
                s.entries
                    .into_iter()
                    .map(|e| {
                        let text = e.entry.text.strip_prefix(' ').unwrap_or(&e.entry.text).to_string();
                        LineEntry::new(e.entry.line, text)
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    proptest! {
        /// Merging the same aggregate a second time changes nothing
        #[test]
        fn merge_is_idempotent(first in entries(), second in entries()) {
            let doc = merged(&TextDocument::default(), "f.txt", first);
            let once = merged(&doc, "f.txt", second.clone());
            let plan = MergePlanner::default()
                .plan_all(once.lines(), vec![Aggregate::new("f.txt", second)]);
            prop_assert!(plan.is_empty());
        }

        /// The section ends up with the union of old and new entries, sorted
        #[test]
        fn merge_is_union_sorted(first in entries(), second in entries()) {
            let doc = merged(&TextDocument::default(), "f.txt", first);
            let before = section_entries(&doc, "f.txt");
            let after_doc = merged(&doc, "f.txt", second.clone());
            let after = section_entries(&after_doc, "f.txt");

            let keys: HashSet<DedupKey> = after.iter().map(|e| e.dedup_key()).collect();
            for e in before.iter().chain(second.iter()) {
                prop_assert!(keys.contains(&e.dedup_key()));
            }
            for e in &after {
                prop_assert!(
                    before.iter().chain(second.iter()).any(|x| x.dedup_key() == e.dedup_key())
                );
            }
            prop_assert!(after.windows(2).all(|w| w[0].line <= w[1].line));

            // old lines keep their relative order
            let old_positions: Vec<usize> = before
                .iter()
                .map(|b| after.iter().position(|a| a == b).unwrap())
                .collect();
            prop_assert!(old_positions.windows(2).all(|w| w[0] < w[1]));
        }
    }
}

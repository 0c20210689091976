//! Turn user selections in a source buffer into aggregates for the merge
//! planner.
//!
//! A plain source produces a single aggregate keyed by the source's own
//! identifier. A source that is itself a search-results document is parsed
//! first, and selected entries are regrouped under the file they belong to.

use std::collections::{BTreeSet, HashMap};

use super::line_format::parse_sections;
use super::types::{Aggregate, DedupKey, LineEntry};
use crate::primitives::ordering::cmp_by;

/// An inclusive range of 0-based line indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionRange {
    pub start: usize,
    pub end: usize,
}

impl SelectionRange {
    /// Create a range; the endpoints may be given in either order.
    pub fn new(a: usize, b: usize) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    pub fn single(line: usize) -> Self {
        Self::new(line, line)
    }
}

/// How the source buffer is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractMode {
    /// Arbitrary text: every selected line is taken verbatim
    Flat,
    /// The source is a search-results document itself
    Structured,
}

/// Every line index touched by any range, deduplicated and ascending.
///
/// Ranges are clamped to the `line_count` lines of the buffer before they
/// are expanded; ranges starting past the end contribute nothing.
pub fn selected_lines(ranges: &[SelectionRange], line_count: usize) -> BTreeSet<usize> {
    let Some(last) = line_count.checked_sub(1) else {
        return BTreeSet::new();
    };
    ranges
        .iter()
        .filter(|r| r.start <= last)
        .flat_map(|r| r.start..=r.end.min(last))
        .collect()
}

/// Build the single aggregate for a plain source buffer.
///
/// Selected indices past the end of `lines` are ignored.
pub fn extract_flat<S: AsRef<str>>(
    file: &str,
    lines: &[S],
    selected: &BTreeSet<usize>,
) -> Aggregate {
    let entries = selected
        .iter()
        .filter_map(|&i| lines.get(i).map(|l| LineEntry::new(i, l.as_ref())))
        .collect();
    Aggregate::new(file, entries)
}

/// Regroup the selected part of a search-results document by file.
///
/// A section contributes when its header or any of its entries is selected;
/// a selected header alone yields an aggregate with no entries. Sections that
/// repeat a file identifier fold into one aggregate, with entries
/// deduplicated by line number and trimmed text. Aggregates come out in
/// first-encountered order, entries sorted by line number.
pub fn extract_structured<S: AsRef<str>>(
    lines: &[S],
    selected: &BTreeSet<usize>,
) -> Vec<Aggregate> {
    struct Pending {
        file: String,
        entries: Vec<LineEntry>,
        seen: HashMap<DedupKey, usize>,
    }

    let mut pending: Vec<Pending> = Vec::new();
    let mut by_file: HashMap<String, usize> = HashMap::new();

    for (file, section) in parse_sections(lines) {
        let header_selected = selected.contains(&section.header_index);
        let picked: Vec<_> = section
            .entries
            .into_iter()
            .filter(|e| selected.contains(&e.index))
            .collect();
        if !header_selected && picked.is_empty() {
            continue;
        }

        let slot = *by_file.entry(file.to_string()).or_insert_with(|| {
            pending.push(Pending {
                file: file.to_string(),
                entries: Vec::new(),
                seen: HashMap::new(),
            });
            pending.len() - 1
        });
        let agg = &mut pending[slot];

        for e in picked {
            let key = e.entry.dedup_key();
            let text = e
                .entry
                .text
                .strip_prefix(' ')
                .unwrap_or(&e.entry.text)
                .to_string();
            let entry = LineEntry::new(e.entry.line, text);
            match agg.seen.get(&key) {
                Some(&at) => agg.entries[at] = entry,
                None => {
                    agg.seen.insert(key, agg.entries.len());
                    agg.entries.push(entry);
                }
            }
        }
    }

    let first_header = lines
        .iter()
        .position(|l| super::line_format::parse_header(l.as_ref()).is_some())
        .unwrap_or(lines.len());
    if selected.iter().any(|&i| i < first_header) {
        tracing::debug!("ignoring selected lines above the first header");
    }

    pending
        .into_iter()
        .map(|p| {
            let mut entries = p.entries;
            entries.sort_by(cmp_by(|e: &LineEntry| e.line));
            Aggregate::new(p.file, entries)
        })
        .collect()
}

/// Extract aggregates from a source buffer according to `mode`.
///
/// A selection that is empty, or lies entirely past the end of the buffer,
/// yields no aggregates.
pub fn extract<S: AsRef<str>>(
    file: &str,
    lines: &[S],
    ranges: &[SelectionRange],
    mode: ExtractMode,
) -> Vec<Aggregate> {
    let selected = selected_lines(ranges, lines.len());
    if selected.is_empty() {
        return Vec::new();
    }
    match mode {
        ExtractMode::Flat => vec![extract_flat(file, lines, &selected)],
        ExtractMode::Structured => extract_structured(lines, &selected),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(v: &[usize]) -> BTreeSet<usize> {
        v.iter().copied().collect()
    }

    #[test]
    fn test_selected_lines_union_of_ranges() {
        let ranges = [
            SelectionRange::new(5, 3),
            SelectionRange::single(4),
            SelectionRange::new(8, 9),
            SelectionRange::new(3, 5),
        ];
        assert_eq!(selected_lines(&ranges, 20), set(&[3, 4, 5, 8, 9]));
        assert_eq!(selected_lines(&ranges, 9), set(&[3, 4, 5, 8]));
        assert!(selected_lines(&ranges, 0).is_empty());
        assert!(selected_lines(&[], 20).is_empty());
    }

    #[test]
    fn test_huge_range_is_clamped_to_buffer() {
        let lines = vec!["only line"];
        let selected = selected_lines(&[SelectionRange::new(0, usize::MAX)], lines.len());
        assert_eq!(selected, set(&[0]));

        let aggs = extract(
            "a.txt",
            &lines,
            &[SelectionRange::new(0, usize::MAX)],
            ExtractMode::Flat,
        );
        assert_eq!(aggs, vec![Aggregate::new("a.txt", vec![LineEntry::new(0, "only line")])]);

        let past_end = [SelectionRange::new(usize::MAX - 1, usize::MAX)];
        assert!(extract("a.txt", &lines, &past_end, ExtractMode::Structured).is_empty());
    }

    #[test]
    fn test_extract_flat_sorted_verbatim() {
        let lines = vec!["zero", "  one", "two", "three"];
        let agg = extract_flat("src/a.rs", &lines, &set(&[3, 1, 7]));
        assert_eq!(agg.file, "src/a.rs");
        assert_eq!(
            agg.entries,
            vec![LineEntry::new(1, "  one"), LineEntry::new(3, "three")]
        );
    }

    #[test]
    fn test_extract_empty_selection_is_noop() {
        let lines = vec!["a"];
        assert!(extract("a.txt", &lines, &[], ExtractMode::Flat).is_empty());
        assert!(extract("a.txt", &lines, &[], ExtractMode::Structured).is_empty());
        let past_end = [SelectionRange::new(10, 12)];
        assert!(extract("a.txt", &lines, &past_end, ExtractMode::Flat).is_empty());
    }

    #[test]
    fn test_extract_structured_regroups_by_file() {
        let lines = vec![
            "a.txt:",          // 0
            "      2: two",    // 1
            "      5: five",   // 2
            "",                // 3
            "b.txt:",          // 4
            "      1: first",  // 5
        ];
        let aggs = extract_structured(&lines, &set(&[2, 5]));
        assert_eq!(
            aggs,
            vec![
                Aggregate::new("a.txt", vec![LineEntry::new(4, "five")]),
                Aggregate::new("b.txt", vec![LineEntry::new(0, "first")]),
            ]
        );
    }

    #[test]
    fn test_extract_structured_header_only_yields_empty_aggregate() {
        let lines = vec!["a.txt:", "      2: two", "b.txt:", "      3: three"];
        let aggs = extract_structured(&lines, &set(&[2]));
        assert_eq!(aggs, vec![Aggregate::new("b.txt", vec![])]);
    }

    #[test]
    fn test_extract_structured_merges_duplicate_sections() {
        let lines = vec![
            "a.txt:",
            "      7: seven",
            "      2: two",
            "b.txt:",
            "      1: one",
            "a.txt:",
            "      2:  two ",
            "      3: three",
        ];
        let aggs = extract_structured(&lines, &set(&[1, 2, 4, 6, 7]));
        assert_eq!(aggs.len(), 2);
        assert_eq!(aggs[0].file, "a.txt");
        assert_eq!(
            aggs[0].entries,
            vec![
                LineEntry::new(1, " two "),
                LineEntry::new(2, "three"),
                LineEntry::new(6, "seven"),
            ]
        );
        assert_eq!(aggs[1].file, "b.txt");
    }

    #[test]
    fn test_extract_structured_keeps_same_line_different_text() {
        let lines = vec!["a.txt:", "      2: old", "      2: new"];
        let aggs = extract_structured(&lines, &set(&[1, 2]));
        assert_eq!(
            aggs[0].entries,
            vec![LineEntry::new(1, "old"), LineEntry::new(1, "new")]
        );
    }

    #[test]
    fn test_extract_structured_strips_only_one_space() {
        let lines = vec!["a.txt:", "      2:   indented", "      3:tight"];
        let aggs = extract_structured(&lines, &set(&[1, 2]));
        assert_eq!(
            aggs[0].entries,
            vec![LineEntry::new(1, "  indented"), LineEntry::new(2, "tight")]
        );
    }

    #[test]
    fn test_extract_structured_ignores_headerless_lines() {
        let lines = vec!["      4: orphan", "a.txt:", "      1: one"];
        assert!(extract_structured(&lines, &set(&[0])).is_empty());
    }
}

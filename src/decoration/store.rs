//! Range storage and scan cursor
//!
//! The store loads highlighting and symbol data from the compact
//! textual encoding used upstream:
//!
//! ```text
//! start,end,class;start,end,class;...        highlighting
//! start,end,symbol_id;...                    symbol references
//! decl_start,decl_end,occ1,occ2,...;...      symbol occurrences
//! ```
//!
//! Ranges are kept ordered by start offset, with the widest range first
//! when several start at the same offset. A store never changes while a
//! pass is running: each pass walks it through its own [`RangeCursor`].

use std::sync::OnceLock;

use regex::Regex;

use super::range::HighlightRange;
use crate::error::{DecorationError, Result};

const ENTITY_SEPARATOR: char = ';';
const FIELD_SEPARATOR: char = ',';

/// Classes are unquoted tokens: word characters and dashes only
fn tag_token() -> &'static Regex {
    static TAG_TOKEN: OnceLock<Regex> = OnceLock::new();
    TAG_TOKEN.get_or_init(|| Regex::new(r"^[\w-]+$").expect("tag token pattern is valid"))
}

/// Ordered set of highlighting ranges over one source text
#[derive(Debug, Clone, Default)]
pub struct RangeStore {
    /// Ranges sorted by (start ascending, end descending)
    ranges: Vec<HighlightRange>,
    /// All end offsets, ascending
    ends: Vec<usize>,
}

impl RangeStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from highlighting data (`start,end,class;...`)
    pub fn parse(description: &str) -> Result<Self> {
        let mut store = Self::new();
        store.load_syntax_highlighting(description)?;
        Ok(store)
    }

    /// Build a store from already materialized ranges
    pub fn from_ranges(ranges: impl IntoIterator<Item = HighlightRange>) -> Self {
        let mut store = Self::new();
        store.extend(ranges);
        store
    }

    /// Load highlighting data. Nothing is added if any entry is malformed.
    pub fn load_syntax_highlighting(&mut self, data: &str) -> Result<()> {
        let mut parsed = Vec::new();
        for entry in entries(data) {
            let fields = split_fields(entry);
            if fields.len() != 3 {
                return Err(DecorationError::invalid_range(
                    entry,
                    format!("expected start,end,class but found {} fields", fields.len()),
                ));
            }
            let start = parse_offset(entry, fields[0])?;
            let end = parse_offset(entry, fields[1])?;
            let tag = fields[2];
            if !tag_token().is_match(tag) {
                return Err(DecorationError::invalid_range(
                    entry,
                    format!("class '{tag}' is not a plain token"),
                ));
            }
            parsed.push(HighlightRange::new(start, end, tag)?);
        }

        tracing::debug!(ranges = parsed.len(), "loaded syntax highlighting");
        self.extend(parsed);
        Ok(())
    }

    /// Load symbol references (`start,end,symbol_id;...`). Every entry
    /// becomes a range tagged `sym-<symbol_id> sym`.
    pub fn load_symbol_references(&mut self, data: &str) -> Result<()> {
        let mut parsed = Vec::new();
        for entry in entries(data) {
            let fields = split_fields(entry);
            if fields.len() != 3 {
                return Err(DecorationError::invalid_range(
                    entry,
                    format!("expected start,end,symbol but found {} fields", fields.len()),
                ));
            }
            let start = parse_offset(entry, fields[0])?;
            let end = parse_offset(entry, fields[1])?;
            let symbol_id = parse_offset(entry, fields[2])?;
            parsed.push(HighlightRange::symbol(start, end, &symbol_id.to_string())?);
        }

        tracing::debug!(ranges = parsed.len(), "loaded symbol references");
        self.extend(parsed);
        Ok(())
    }

    /// Load symbol occurrences (`decl_start,decl_end,occ...;...`). The
    /// declaration start identifies the symbol and the declaration length
    /// applies to every occurrence.
    pub fn load_symbol_occurrences(&mut self, data: &str) -> Result<()> {
        let mut parsed = Vec::new();
        for entry in entries(data) {
            let fields = split_fields(entry);
            if fields.len() < 2 {
                return Err(DecorationError::invalid_range(
                    entry,
                    "expected a declaration start and end",
                ));
            }
            let decl_start = parse_offset(entry, fields[0])?;
            let decl_end = parse_offset(entry, fields[1])?;
            if decl_end <= decl_start {
                return Err(DecorationError::InvertedRange {
                    start: decl_start,
                    end: decl_end,
                });
            }
            let length = decl_end - decl_start;
            let symbol_id = decl_start.to_string();
            for field in &fields[2..] {
                let occurrence = parse_offset(entry, field)?;
                let end = occurrence.checked_add(length).ok_or_else(|| {
                    DecorationError::invalid_range(entry, "occurrence offset overflows")
                })?;
                parsed.push(HighlightRange::symbol(occurrence, end, &symbol_id)?);
            }
        }

        tracing::debug!(ranges = parsed.len(), "loaded symbol occurrences");
        self.extend(parsed);
        Ok(())
    }

    /// Add one range, keeping the store ordered
    pub fn push(&mut self, range: HighlightRange) {
        self.extend(std::iter::once(range));
    }

    fn extend(&mut self, ranges: impl IntoIterator<Item = HighlightRange>) {
        for range in ranges {
            self.ends.push(range.end);
            self.ranges.push(range);
        }
        // Stable: equal ranges keep insertion order
        self.ranges
            .sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));
        self.ends.sort_unstable();
    }

    /// All ranges in opening order
    pub fn ranges(&self) -> &[HighlightRange] {
        &self.ranges
    }

    /// Number of ranges
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// Check if the store holds no ranges
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Start a fresh scan over this store
    pub fn cursor(&self) -> RangeCursor<'_> {
        RangeCursor {
            ranges: &self.ranges,
            ends: &self.ends,
            next_open: 0,
            next_close: 0,
        }
    }

    /// Reject ranges that cross instead of nesting or being disjoint.
    ///
    /// Reports the first crossing pair in opening order.
    pub fn validate_nesting(&self) -> Result<()> {
        let mut open: Vec<&HighlightRange> = Vec::new();
        for range in &self.ranges {
            while open.last().is_some_and(|top| top.end <= range.start) {
                open.pop();
            }
            if let Some(top) = open.last() {
                if !top.encloses(range) {
                    return Err(DecorationError::CrossingRanges {
                        outer: (top.start, top.end),
                        inner: (range.start, range.end),
                    });
                }
            }
            open.push(range);
        }
        Ok(())
    }
}

/// Pass-local position in a [`RangeStore`].
///
/// Offsets passed to the cursor must never decrease.
#[derive(Debug, Clone)]
pub struct RangeCursor<'a> {
    ranges: &'a [HighlightRange],
    ends: &'a [usize],
    next_open: usize,
    next_close: usize,
}

impl<'a> RangeCursor<'a> {
    /// Ranges starting exactly at `offset`, outermost first
    pub fn opening_at(&mut self, offset: usize) -> &'a [HighlightRange] {
        while self
            .ranges
            .get(self.next_open)
            .is_some_and(|r| r.start < offset)
        {
            self.next_open += 1;
        }
        let first = self.next_open;
        while self
            .ranges
            .get(self.next_open)
            .is_some_and(|r| r.start == offset)
        {
            self.next_open += 1;
        }
        let ranges = self.ranges;
        &ranges[first..self.next_open]
    }

    /// Number of ranges ending exactly at `offset`
    pub fn closing_at(&mut self, offset: usize) -> usize {
        while self.ends.get(self.next_close).is_some_and(|&e| e < offset) {
            self.next_close += 1;
        }
        let first = self.next_close;
        while self.ends.get(self.next_close) == Some(&offset) {
            self.next_close += 1;
        }
        self.next_close - first
    }
}

/// Non-empty entries of a `;` separated description
fn entries(data: &str) -> impl Iterator<Item = &str> {
    data.split(ENTITY_SEPARATOR)
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
}

fn split_fields(entry: &str) -> Vec<&str> {
    entry.split(FIELD_SEPARATOR).map(str::trim).collect()
}

fn parse_offset(entry: &str, field: &str) -> Result<usize> {
    field.parse::<usize>().map_err(|_| {
        DecorationError::invalid_range(entry, format!("'{field}' is not a valid offset"))
    })
}

//! Highlighting range type
//!
//! A range is a half-open character interval tagged with the style
//! class that the decorator copies into the emitted markup.

use crate::error::{DecorationError, Result};

/// Prefix of the class given to every occurrence of a symbol
pub const SYMBOL_PREFIX: &str = "sym-";
/// Class shared by all symbol occurrences
pub const HIGHLIGHTABLE: &str = "sym";

/// A tagged span of source text
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HighlightRange {
    /// Character offset where this range starts (inclusive)
    pub start: usize,
    /// Character offset where this range ends (exclusive)
    pub end: usize,
    /// Style class copied verbatim into the markup
    pub tag: String,
}

impl HighlightRange {
    /// Create a new range, rejecting empty or inverted intervals
    pub fn new(start: usize, end: usize, tag: impl Into<String>) -> Result<Self> {
        if end <= start {
            return Err(DecorationError::InvertedRange { start, end });
        }
        Ok(Self {
            start,
            end,
            tag: tag.into(),
        })
    }

    /// Range for one occurrence of the symbol identified by `symbol_id`
    pub fn symbol(start: usize, end: usize, symbol_id: &str) -> Result<Self> {
        Self::new(start, end, format!("{SYMBOL_PREFIX}{symbol_id} {HIGHLIGHTABLE}"))
    }

    /// True if `other` lies entirely inside this range
    pub fn encloses(&self, other: &HighlightRange) -> bool {
        other.start >= self.start && other.end <= self.end
    }
}

//! Decoration engine
//!
//! This module turns highlighting ranges into markup-decorated lines:
//! - `range`: the tagged character intervals
//! - `store`: parsing and ordered lookup of ranges during a scan
//! - `decorator`: the line-splitting scan itself

mod decorator;
mod range;
mod store;

pub use decorator::{LineDecorator, LineWindow};
pub use range::{HighlightRange, HIGHLIGHTABLE, SYMBOL_PREFIX};
pub use store::{RangeCursor, RangeStore};

//! Markup rendering
//!
//! The decorator only knows how to open a tag, close a tag and write a
//! character. This module provides those primitives for:
//! - HTML output (`<span class="k">`)
//! - ANSI terminal previews
//!
//! and the class-to-style table used by the terminal renderer.

mod ansi;
mod html;
mod style;
mod tokens;

pub use ansi::AnsiMarkup;
pub use html::HtmlMarkup;
pub use style::{Color, Style};
pub use tokens::TokenType;

use crate::decoration::HighlightRange;

/// Rendering primitive used by the line decorator
pub trait Markup {
    /// Write the opening tag for `tag`
    fn open(&self, tag: &str, out: &mut String);

    /// Close the innermost open tag. `enclosing` lists the ranges that
    /// stay open around it, outermost first.
    fn close(&self, enclosing: &[&HighlightRange], out: &mut String);

    /// Write one character of source text
    fn escape(&self, ch: char, out: &mut String);
}

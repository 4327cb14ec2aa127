//! ANSI terminal markup for previewing decorated source
//!
//! Terminals have no nesting: closing a range resets every attribute and
//! re-applies the styles of the ranges still open around it.

use crossterm::style::{Attribute, SetAttribute, SetBackgroundColor, SetForegroundColor};
use crossterm::Command;

use super::style::Style;
use super::tokens::TokenType;
use super::Markup;
use crate::decoration::HighlightRange;

/// Renders ranges as terminal colors using the default class styles
#[derive(Debug, Clone, Copy, Default)]
pub struct AnsiMarkup;

impl AnsiMarkup {
    pub fn new() -> Self {
        Self
    }

    fn style_for(tag: &str) -> Style {
        TokenType::from_css_class(tag).default_style()
    }

    fn apply(style: &Style, out: &mut String) {
        // Writing into a String never fails
        if let Some(color) = style.fg.to_crossterm() {
            let _ = SetForegroundColor(color).write_ansi(out);
        }
        if let Some(color) = style.bg.to_crossterm() {
            let _ = SetBackgroundColor(color).write_ansi(out);
        }
        for attribute in style.attributes() {
            let _ = SetAttribute(attribute).write_ansi(out);
        }
    }
}

impl Markup for AnsiMarkup {
    fn open(&self, tag: &str, out: &mut String) {
        Self::apply(&Self::style_for(tag), out);
    }

    fn close(&self, enclosing: &[&HighlightRange], out: &mut String) {
        let _ = SetAttribute(Attribute::Reset).write_ansi(out);
        for range in enclosing {
            Self::apply(&Self::style_for(&range.tag), out);
        }
    }

    fn escape(&self, ch: char, out: &mut String) {
        out.push(ch);
    }
}

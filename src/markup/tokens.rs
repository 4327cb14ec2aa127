//! Highlight classes
//!
//! Upstream analyzers tag ranges with short class names. This module
//! names the known classes and gives each one a terminal style.

use super::style::{Color, Style};
use crate::decoration::HIGHLIGHTABLE;

/// Semantic classes carried by highlighting ranges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    /// Annotations (@Override)
    Annotation,
    /// Constants and literals other than strings
    Constant,
    /// Plain comments
    Comment,
    /// Documentation comments (/** */)
    DocComment,
    /// Structured comments
    StructuredComment,
    /// Language keywords
    Keyword,
    /// Secondary keywords
    KeywordLight,
    /// String literals
    String,
    /// Preprocessor directives
    Preprocessor,
    /// Symbol occurrences (sym-N sym)
    Symbol,
    /// Unknown class
    Default,
}

impl TokenType {
    /// Get the default style for this token type
    pub fn default_style(&self) -> Style {
        match self {
            TokenType::Annotation => Style::fg(Color::BrightBlue),
            TokenType::Constant => Style::fg(Color::Cyan),
            TokenType::Comment => Style::fg(Color::BrightBlack).with_italic(),
            TokenType::DocComment => Style::fg(Color::Green).with_italic(),
            TokenType::StructuredComment => Style::fg(Color::BrightBlack),
            TokenType::Keyword => Style::fg(Color::Magenta).with_bold(),
            TokenType::KeywordLight => Style::fg(Color::Magenta),
            TokenType::String => Style::fg(Color::Yellow),
            TokenType::Preprocessor => Style::fg(Color::BrightMagenta),
            TokenType::Symbol => Style::default().with_underline(),
            TokenType::Default => Style::default(),
        }
    }

    /// Class name used in decorated markup
    pub fn css_class(&self) -> &'static str {
        match self {
            TokenType::Annotation => "a",
            TokenType::Constant => "c",
            TokenType::Comment => "cd",
            TokenType::DocComment => "cppd",
            TokenType::StructuredComment => "j",
            TokenType::Keyword => "k",
            TokenType::KeywordLight => "h",
            TokenType::String => "s",
            TokenType::Preprocessor => "p",
            TokenType::Symbol => HIGHLIGHTABLE,
            TokenType::Default => "",
        }
    }

    /// Classify a range tag. Tags may carry several space separated
    /// classes; symbol tags are recognised by their `sym` class.
    pub fn from_css_class(tag: &str) -> Self {
        if tag.split_whitespace().any(|class| class == HIGHLIGHTABLE) {
            return TokenType::Symbol;
        }
        match tag.split_whitespace().next().unwrap_or("") {
            "a" => TokenType::Annotation,
            "c" => TokenType::Constant,
            "cd" => TokenType::Comment,
            "cppd" => TokenType::DocComment,
            "j" => TokenType::StructuredComment,
            "k" => TokenType::Keyword,
            "h" => TokenType::KeywordLight,
            "s" => TokenType::String,
            "p" => TokenType::Preprocessor,
            _ => TokenType::Default,
        }
    }
}

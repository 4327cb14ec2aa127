//! Style types for terminal rendering
//!
//! Styles describe how a highlight class looks when decorated output is
//! previewed on a terminal instead of being emitted as HTML.

use crossterm::style::{Attribute, Color as TermColor};

/// Terminal colors (ANSI 16-color palette for compatibility)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Color {
    #[default]
    Default,
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    BrightBlack,
    BrightRed,
    BrightGreen,
    BrightYellow,
    BrightBlue,
    BrightMagenta,
    BrightCyan,
    BrightWhite,
}

impl Color {
    /// crossterm color for this palette entry, None for the terminal default
    pub fn to_crossterm(self) -> Option<TermColor> {
        let color = match self {
            Color::Default => return None,
            Color::Black => TermColor::Black,
            Color::Red => TermColor::DarkRed,
            Color::Green => TermColor::DarkGreen,
            Color::Yellow => TermColor::DarkYellow,
            Color::Blue => TermColor::DarkBlue,
            Color::Magenta => TermColor::DarkMagenta,
            Color::Cyan => TermColor::DarkCyan,
            Color::White => TermColor::Grey,
            Color::BrightBlack => TermColor::DarkGrey,
            Color::BrightRed => TermColor::Red,
            Color::BrightGreen => TermColor::Green,
            Color::BrightYellow => TermColor::Yellow,
            Color::BrightBlue => TermColor::Blue,
            Color::BrightMagenta => TermColor::Magenta,
            Color::BrightCyan => TermColor::Cyan,
            Color::BrightWhite => TermColor::White,
        };
        Some(color)
    }
}

/// Text style attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Style {
    /// Foreground color
    pub fg: Color,
    /// Background color
    pub bg: Color,
    /// Bold text
    pub bold: bool,
    /// Italic text
    pub italic: bool,
    /// Underlined text
    pub underline: bool,
}

impl Style {
    /// Create a style with just foreground color
    pub fn fg(color: Color) -> Self {
        Self {
            fg: color,
            ..Default::default()
        }
    }

    /// Builder: set background color
    pub fn with_bg(mut self, color: Color) -> Self {
        self.bg = color;
        self
    }

    /// Builder: set bold
    pub fn with_bold(mut self) -> Self {
        self.bold = true;
        self
    }

    /// Builder: set italic
    pub fn with_italic(mut self) -> Self {
        self.italic = true;
        self
    }

    /// Builder: set underline
    pub fn with_underline(mut self) -> Self {
        self.underline = true;
        self
    }

    /// Check if this is the default (no styling)
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Attributes to switch on for this style
    pub fn attributes(&self) -> Vec<Attribute> {
        let mut attributes = Vec::new();
        if self.bold {
            attributes.push(Attribute::Bold);
        }
        if self.italic {
            attributes.push(Attribute::Italic);
        }
        if self.underline {
            attributes.push(Attribute::Underlined);
        }
        attributes
    }
}

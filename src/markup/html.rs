//! HTML markup: `<span class="TAG">…</span>`

use super::Markup;
use crate::config::Config;
use crate::decoration::HighlightRange;

/// Emits one element per range with the tag as its class attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlMarkup {
    /// Element name (e.g. "span")
    element: String,
    /// Attribute receiving the tag (e.g. "class")
    class_attribute: String,
}

impl HtmlMarkup {
    pub fn new(element: impl Into<String>, class_attribute: impl Into<String>) -> Self {
        Self {
            element: element.into(),
            class_attribute: class_attribute.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.element, &config.class_attribute)
    }
}

impl Default for HtmlMarkup {
    fn default() -> Self {
        Self::new("span", "class")
    }
}

impl Markup for HtmlMarkup {
    fn open(&self, tag: &str, out: &mut String) {
        out.push('<');
        out.push_str(&self.element);
        out.push(' ');
        out.push_str(&self.class_attribute);
        out.push_str("=\"");
        out.push_str(tag);
        out.push_str("\">");
    }

    fn close(&self, _enclosing: &[&HighlightRange], out: &mut String) {
        out.push_str("</");
        out.push_str(&self.element);
        out.push('>');
    }

    fn escape(&self, ch: char, out: &mut String) {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
}

//! Line decorator
//!
//! Walks a source text once, left to right, opening and closing markup
//! tags as the scan enters and leaves highlighting ranges. Output is one
//! string per source line. Tags never span lines: at each line break the
//! open tags are closed and then reopened on the next line for the
//! ranges that continue.

use std::iter::Peekable;
use std::mem;
use std::str::Chars;

use super::range::HighlightRange;
use super::store::{RangeCursor, RangeStore};
use crate::error::Result;
use crate::markup::{HtmlMarkup, Markup};

const LF: char = '\n';
const CR: char = '\r';

/// 1-indexed, inclusive selection of output lines
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineWindow {
    /// First line returned (defaults to 1)
    pub from: Option<usize>,
    /// Last line returned (defaults to the last line)
    pub to: Option<usize>,
}

impl LineWindow {
    /// Every line
    pub fn all() -> Self {
        Self::default()
    }

    pub fn new(from: Option<usize>, to: Option<usize>) -> Self {
        Self { from, to }
    }

    /// Keep only the selected lines. Windows outside the line count
    /// give an empty result.
    pub fn apply(&self, mut lines: Vec<String>) -> Vec<String> {
        let first = self.from.unwrap_or(1).max(1) - 1;
        let last = self.to.unwrap_or(lines.len()).min(lines.len());
        if first >= last {
            return Vec::new();
        }
        lines.truncate(last);
        lines.drain(..first);
        lines
    }
}

/// Turns source text plus highlighting ranges into decorated lines
#[derive(Debug, Clone)]
pub struct LineDecorator<M = HtmlMarkup> {
    markup: M,
    /// Reject crossing ranges before decorating
    strict_nesting: bool,
}

impl LineDecorator<HtmlMarkup> {
    /// Decorator emitting `<span class="TAG">` elements
    pub fn html() -> Self {
        Self::new(HtmlMarkup::default())
    }
}

impl Default for LineDecorator<HtmlMarkup> {
    fn default() -> Self {
        Self::html()
    }
}

impl<M: Markup> LineDecorator<M> {
    pub fn new(markup: M) -> Self {
        Self {
            markup,
            strict_nesting: false,
        }
    }

    /// Builder: validate range nesting before every pass
    pub fn with_strict_nesting(mut self, strict: bool) -> Self {
        self.strict_nesting = strict;
        self
    }

    /// Decorate `text`, returning the lines selected by `from`/`to`
    /// (1-indexed, inclusive). Tag state always covers the whole text.
    pub fn decorate(
        &self,
        text: &str,
        store: &RangeStore,
        from: Option<usize>,
        to: Option<usize>,
    ) -> Result<Vec<String>> {
        self.decorate_window(text, store, LineWindow::new(from, to))
    }

    /// Decorate every line of `text`
    pub fn decorate_all(&self, text: &str, store: &RangeStore) -> Result<Vec<String>> {
        self.decorate_window(text, store, LineWindow::all())
    }

    pub fn decorate_window(
        &self,
        text: &str,
        store: &RangeStore,
        window: LineWindow,
    ) -> Result<Vec<String>> {
        if self.strict_nesting {
            store.validate_nesting()?;
        }

        let lines = Pass::new(&self.markup, store).run(text);
        tracing::debug!(
            lines = lines.len(),
            ranges = store.len(),
            from = ?window.from,
            to = ?window.to,
            "decorated text"
        );
        Ok(window.apply(lines))
    }
}

/// State of one decoration pass
struct Pass<'a, M> {
    markup: &'a M,
    cursor: RangeCursor<'a>,
    /// Open ranges, outermost at the bottom
    stack: Vec<&'a HighlightRange>,
    line: String,
    lines: Vec<String>,
    /// Open ranges were closed at a line break and not yet reopened
    reopen_pending: bool,
}

impl<'a, M: Markup> Pass<'a, M> {
    fn new(markup: &'a M, store: &'a RangeStore) -> Self {
        Self {
            markup,
            cursor: store.cursor(),
            stack: Vec::new(),
            line: String::new(),
            lines: Vec::new(),
            reopen_pending: false,
        }
    }

    fn run(mut self, text: &str) -> Vec<String> {
        let mut chars = text.chars().peekable();
        let mut offset = 0;

        while let Some(ch) = chars.next() {
            self.step(offset);
            match ch {
                CR | LF => {
                    if ch == CR && consume_lf(&mut chars) {
                        offset += 1;
                        self.step(offset);
                    }
                    self.end_line();
                }
                _ => self.markup.escape(ch, &mut self.line),
            }
            offset += 1;
        }

        if !self.reopen_pending {
            self.close_all();
        }
        self.lines.push(self.line);
        self.lines
    }

    /// Tag bookkeeping before the character at `offset` is written
    fn step(&mut self, offset: usize) {
        let closing = self.cursor.closing_at(offset);
        for _ in 0..closing {
            let Some(range) = self.stack.pop() else {
                tracing::warn!(offset, "more ranges end than are open");
                break;
            };
            if range.end != offset {
                tracing::debug!(offset, start = range.start, end = range.end, "crossing range closed early");
            }
            if !self.reopen_pending {
                self.markup.close(&self.stack, &mut self.line);
            }
        }

        if self.reopen_pending {
            for range in &self.stack {
                self.markup.open(&range.tag, &mut self.line);
            }
            self.reopen_pending = false;
        }

        for range in self.cursor.opening_at(offset) {
            self.markup.open(&range.tag, &mut self.line);
            self.stack.push(range);
        }
    }

    /// Close every open tag without forgetting the ranges
    fn close_all(&mut self) {
        for depth in (0..self.stack.len()).rev() {
            self.markup.close(&self.stack[..depth], &mut self.line);
        }
    }

    fn end_line(&mut self) {
        self.close_all();
        let line = mem::take(&mut self.line);
        tracing::trace!(line = self.lines.len() + 1, open = self.stack.len(), "line flushed");
        self.lines.push(line);
        self.reopen_pending = !self.stack.is_empty();
    }
}

/// Consume the LF of a CRLF pair
fn consume_lf(chars: &mut Peekable<Chars<'_>>) -> bool {
    chars.next_if_eq(&LF).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn decorate(text: &str, ranges: &str) -> Vec<String> {
        let store = RangeStore::parse(ranges).unwrap();
        LineDecorator::html().decorate_all(text, &store).unwrap()
    }

    fn cppd(line: &str) -> String {
        format!("<span class=\"cppd\">{line}</span>")
    }

    const JAVADOC_WITH_HTML: &str = concat!(
        "/**\n",
        " * Provides a basic framework to sequentially read any kind of character stream in order to feed a generic OUTPUT.\n",
        " * \n",
        " * This framework can used for instance in order to :\n",
        " * <ul>\n",
        " *   <li>Create a lexer in charge to generate a list of tokens from a character stream</li>\n",
        " *   <li>Create a source code syntax highligther in charge to decorate a source code with HTML tags</li>\n",
        " *   <li>Create a javadoc generator</li>\n",
        " *   <li>...</li>\n",
        " * </ul>\n",
        " */\n",
    );

    fn javadoc_with_html_lines() -> Vec<String> {
        vec![
            cppd("/**"),
            cppd(" * Provides a basic framework to sequentially read any kind of character stream in order to feed a generic OUTPUT."),
            cppd(" * "),
            cppd(" * This framework can used for instance in order to :"),
            cppd(" * &lt;ul&gt;"),
            cppd(" *   &lt;li&gt;Create a lexer in charge to generate a list of tokens from a character stream&lt;/li&gt;"),
            cppd(" *   &lt;li&gt;Create a source code syntax highligther in charge to decorate a source code with HTML tags&lt;/li&gt;"),
            cppd(" *   &lt;li&gt;Create a javadoc generator&lt;/li&gt;"),
            cppd(" *   &lt;li&gt;...&lt;/li&gt;"),
            cppd(" * &lt;/ul&gt;"),
            cppd(" */"),
            String::new(),
        ]
    }

    #[test]
    fn test_simple_character_range() {
        let lines = decorate("package org.sonar.core.source;", "0,7,k;");
        assert_eq!(
            lines,
            vec!["<span class=\"k\">package</span> org.sonar.core.source;"]
        );
    }

    #[test]
    fn test_multiple_lines_character_range() {
        let lines = decorate("/*\n * Test\n */\n", "0,14,cppd;");
        assert_eq!(
            lines,
            vec![cppd("/*"), cppd(" * Test"), cppd(" */"), String::new()]
        );
    }

    #[test]
    fn test_multiple_words_in_one_line() {
        let lines = decorate(
            "public class MyClass implements MyInterface {",
            "0,6,k;7,12,k;21,31,k;",
        );
        assert_eq!(
            lines,
            vec![concat!(
                "<span class=\"k\">public</span> ",
                "<span class=\"k\">class</span> MyClass ",
                "<span class=\"k\">implements</span> MyInterface {"
            )]
        );
    }

    #[test]
    fn test_nested_ranges() {
        let text = concat!(
            "/**\n",
            " * Creates a FormulaDecorator\n",
            " *\n",
            " * @param metric the metric should have an associated formula\n",
            " * \n",
            " * @throws IllegalArgumentException if no formula is associated to the metric\n",
            " */\n",
        );
        let lines = decorate(text, "0,184,cppd;47,53,k;");
        assert_eq!(
            lines,
            vec![
                cppd("/**"),
                cppd(" * Creates a FormulaDecorator"),
                cppd(" *"),
                cppd(" * @param <span class=\"k\">metric</span> the metric should have an associated formula"),
                cppd(" * "),
                cppd(" * @throws IllegalArgumentException if no formula is associated to the metric"),
                cppd(" */"),
                String::new(),
            ]
        );
    }

    #[test]
    fn test_crlf_line_breaks() {
        let text = concat!(
            "/**\r\n",
            "* @return metric generated by the decorator\r\n",
            "*/\r\n",
            "@DependedUpon\r\n",
            "public Metric generatesMetric() {\r\n",
            "  return metric;\r\n",
            "}\r\n",
        );
        let lines = decorate(text, "0,52,cppd;54,67,a;69,75,k;106,112,k;");
        assert_eq!(
            lines,
            vec![
                cppd("/**"),
                cppd("* @return metric generated by the decorator"),
                cppd("*/"),
                "<span class=\"a\">@DependedUpon</span>".to_string(),
                "<span class=\"k\">public</span> Metric generatesMetric() {".to_string(),
                "  <span class=\"k\">return</span> metric;".to_string(),
                "}".to_string(),
                String::new(),
            ]
        );
    }

    #[test]
    fn test_cr_line_breaks() {
        let text = concat!(
            "/**\r",
            "* @return metric generated by the decorator\r",
            "*/\r",
            "@DependedUpon\r",
            "public Metric generatesMetric() {\r",
            "  return metric;\r",
            "}\r",
        );
        let lines = decorate(text, "0,50,cppd;51,64,a;65,71,k;101,107,k;");
        assert_eq!(
            lines,
            vec![
                cppd("/**"),
                cppd("* @return metric generated by the decorator"),
                cppd("*/"),
                "<span class=\"a\">@DependedUpon</span>".to_string(),
                "<span class=\"k\">public</span> Metric generatesMetric() {".to_string(),
                "  <span class=\"k\">return</span> metric;".to_string(),
                "}".to_string(),
                String::new(),
            ]
        );
    }

    #[test]
    fn test_adjacent_ranges_are_not_merged() {
        let text = "/*\n * Header\n */\n\npublic class HelloWorld {\n}";
        let lines = decorate(text, "0,16,cppd;18,25,k;25,31,k;");
        assert_eq!(
            lines,
            vec![
                cppd("/*"),
                cppd(" * Header"),
                cppd(" */"),
                String::new(),
                "<span class=\"k\">public </span><span class=\"k\">class </span>HelloWorld {".to_string(),
                "}".to_string(),
            ]
        );
    }

    #[test]
    fn test_multiple_empty_lines_at_end() {
        let text = "/*\n * Header\n */\n\npublic class HelloWorld {\n}\n\n\n";
        let lines = decorate(text, "0,16,cppd;18,25,k;25,31,k;");
        assert_eq!(
            lines,
            vec![
                cppd("/*"),
                cppd(" * Header"),
                cppd(" */"),
                String::new(),
                "<span class=\"k\">public </span><span class=\"k\">class </span>HelloWorld {".to_string(),
                "}".to_string(),
                String::new(),
                String::new(),
                String::new(),
            ]
        );
    }

    #[test]
    fn test_escape_markup_chars() {
        assert_eq!(decorate(JAVADOC_WITH_HTML, "0,453,cppd;"), javadoc_with_html_lines());
    }

    #[test]
    fn test_escape_ampersand_char() {
        let text = concat!(
            "/**\n",
            " * Definition of a dashboard.\n",
            " * <p/>\n",
            " * Its name and description can be retrieved using the i18n mechanism, using the keys \"dashboard.&lt;id&gt;.name\" and\n",
            " * \"dashboard.&lt;id&gt;.description\".\n",
            " *\n",
            " * @since 2.13\n",
            " */\n",
        );
        let lines = decorate(text, "0,220,cppd;");
        assert_eq!(
            lines,
            vec![
                cppd("/**"),
                cppd(" * Definition of a dashboard."),
                cppd(" * &lt;p/&gt;"),
                cppd(" * Its name and description can be retrieved using the i18n mechanism, using the keys \"dashboard.&amp;lt;id&amp;gt;.name\" and"),
                cppd(" * \"dashboard.&amp;lt;id&amp;gt;.description\"."),
                cppd(" *"),
                cppd(" * @since 2.13"),
                cppd(" */"),
                String::new(),
            ]
        );
    }

    #[test]
    fn test_window_from() {
        let store = RangeStore::parse("0,453,cppd;").unwrap();
        let lines = LineDecorator::html()
            .decorate(JAVADOC_WITH_HTML, &store, Some(4), None)
            .unwrap();
        assert_eq!(lines.len(), 9);
        assert_eq!(lines, javadoc_with_html_lines()[3..].to_vec());
    }

    #[test]
    fn test_window_to() {
        let store = RangeStore::parse("0,453,cppd;").unwrap();
        let lines = LineDecorator::html()
            .decorate(JAVADOC_WITH_HTML, &store, None, Some(4))
            .unwrap();
        assert_eq!(lines, javadoc_with_html_lines()[..4].to_vec());
    }

    #[test]
    fn test_window_from_and_to() {
        let store = RangeStore::parse("0,453,cppd;").unwrap();
        let lines = LineDecorator::html()
            .decorate(JAVADOC_WITH_HTML, &store, Some(4), Some(8))
            .unwrap();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines, javadoc_with_html_lines()[3..8].to_vec());
    }

    #[test]
    fn test_window_out_of_range() {
        let store = RangeStore::parse("0,453,cppd;").unwrap();
        let decorator = LineDecorator::html();
        assert!(decorator
            .decorate(JAVADOC_WITH_HTML, &store, Some(40), None)
            .unwrap()
            .is_empty());
        assert!(decorator
            .decorate(JAVADOC_WITH_HTML, &store, Some(8), Some(4))
            .unwrap()
            .is_empty());
        assert_eq!(
            decorator
                .decorate(JAVADOC_WITH_HTML, &store, Some(11), Some(99))
                .unwrap()
                .len(),
            2
        );
    }

    #[test]
    fn test_range_ending_at_line_start_leaves_no_stray_tag() {
        // "ab\ncd": the range covers "ab\n" and ends where line 2 begins
        let lines = decorate("ab\ncd", "0,3,k;");
        assert_eq!(lines, vec!["<span class=\"k\">ab</span>", "cd"]);
    }

    #[test]
    fn test_range_continues_over_empty_line() {
        let lines = decorate("a\n\nb", "0,4,c;");
        assert_eq!(
            lines,
            vec![
                "<span class=\"c\">a</span>",
                "<span class=\"c\"></span>",
                "<span class=\"c\">b</span>",
            ]
        );
    }

    #[test]
    fn test_range_past_end_of_text_is_closed() {
        let lines = decorate("abc", "1,50,s;");
        assert_eq!(lines, vec!["a<span class=\"s\">bc</span>"]);
    }

    #[test]
    fn test_offsets_count_characters() {
        let lines = decorate("é<ü>", "1,4,k;");
        assert_eq!(lines, vec!["é<span class=\"k\">&lt;ü&gt;</span>"]);
    }

    #[test]
    fn test_empty_text() {
        assert_eq!(decorate("", ""), vec![String::new()]);
        assert_eq!(decorate("", "0,5,k;"), vec![String::new()]);
    }

    #[test]
    fn test_no_ranges() {
        assert_eq!(decorate("a\r\nb\rc\n", ""), vec!["a", "b", "c", ""]);
    }

    #[test]
    fn test_symbol_references_render_as_classes() {
        let mut store = RangeStore::parse("0,6,k;").unwrap();
        store.load_symbol_references("7,8,7;15,16,7;").unwrap();
        let lines = LineDecorator::html()
            .decorate_all("return a + b + a;", &store)
            .unwrap();
        assert_eq!(
            lines,
            vec![concat!(
                "<span class=\"k\">return</span> ",
                "<span class=\"sym-7 sym\">a</span> + b + ",
                "<span class=\"sym-7 sym\">a</span>;"
            )]
        );
    }

    #[test]
    fn test_symbol_occurrences_render_as_classes() {
        let mut store = RangeStore::parse("0,3,k;").unwrap();
        store.load_symbol_occurrences("4,5,4,8;").unwrap();
        let lines = LineDecorator::html()
            .decorate_all("int a = a + 1;\nreturn a;", &store)
            .unwrap();
        assert_eq!(
            lines,
            vec![
                concat!(
                    "<span class=\"k\">int</span> ",
                    "<span class=\"sym-4 sym\">a</span> = ",
                    "<span class=\"sym-4 sym\">a</span> + 1;"
                ),
                "return a;",
            ]
        );

        store.load_symbol_occurrences("4,5,22;").unwrap();
        let lines = LineDecorator::html()
            .decorate_all("int a = a + 1;\nreturn a;", &store)
            .unwrap();
        assert_eq!(lines[1], "return <span class=\"sym-4 sym\">a</span>;");
    }

    #[test]
    fn test_crossing_ranges_stay_balanced() {
        let lines = decorate("abcdefghij", "0,6,a;3,9,b;");
        let line = &lines[0];
        assert_eq!(line.matches("<span").count(), 2);
        assert_eq!(line.matches("</span>").count(), 2);
    }

    #[test]
    fn test_strict_nesting_rejects_crossing_ranges() {
        let store = RangeStore::parse("0,6,a;3,9,b;").unwrap();
        let decorator = LineDecorator::html().with_strict_nesting(true);
        assert!(decorator.decorate_all("abcdefghij", &store).is_err());

        let nested = RangeStore::parse("0,9,a;3,6,b;").unwrap();
        assert!(decorator.decorate_all("abcdefghij", &nested).is_ok());
    }

    #[test]
    fn test_custom_markup_element() {
        let store = RangeStore::parse("0,2,k;").unwrap();
        let lines = LineDecorator::new(HtmlMarkup::new("code", "data-class"))
            .decorate_all("if x", &store)
            .unwrap();
        assert_eq!(lines, vec!["<code data-class=\"k\">if</code> x"]);
    }

    #[test]
    fn test_line_window_apply() {
        let lines: Vec<String> = (1..=5).map(|n| n.to_string()).collect();
        assert_eq!(LineWindow::all().apply(lines.clone()), lines);
        assert_eq!(LineWindow::new(Some(2), Some(3)).apply(lines.clone()), vec!["2", "3"]);
        assert_eq!(LineWindow::new(Some(0), Some(1)).apply(lines.clone()), vec!["1"]);
        assert!(LineWindow::new(Some(6), None).apply(lines.clone()).is_empty());
        assert!(LineWindow::new(None, Some(0)).apply(lines).is_empty());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn break_count(text: &str) -> usize {
            text.matches('\n').count() + text.matches('\r').count()
                - text.matches("\r\n").count()
        }

        /// Properly nested ranges over `len` characters
        fn nested_ranges(len: usize) -> impl Strategy<Value = Vec<HighlightRange>> {
            proptest::collection::vec((0..=len, 1..=len, 0..3usize), 0..6).prop_map(
                move |picks| {
                    let mut ranges: Vec<HighlightRange> = Vec::new();
                    for (start, width, class) in picks {
                        let end = (start + width).min(len + 1);
                        let Ok(candidate) =
                            HighlightRange::new(start, end, ["k", "s", "cd"][class])
                        else {
                            continue;
                        };
                        let nests = ranges.iter().all(|r| {
                            r.end <= candidate.start
                                || candidate.end <= r.start
                                || r.encloses(&candidate)
                                || candidate.encloses(r)
                        });
                        if nests {
                            ranges.push(candidate);
                        }
                    }
                    ranges
                },
            )
        }

        fn text_and_ranges() -> impl Strategy<Value = (String, Vec<HighlightRange>)> {
            "[a-z <>&\r\n]{0,40}".prop_flat_map(|text| {
                let len = text.chars().count();
                (Just(text), nested_ranges(len.max(1)))
            })
        }

        proptest! {
            #[test]
            fn prop_line_count_is_breaks_plus_one((text, ranges) in text_and_ranges()) {
                let store = RangeStore::from_ranges(ranges);
                let lines = LineDecorator::html().decorate_all(&text, &store).unwrap();
                prop_assert_eq!(lines.len(), break_count(&text) + 1);
            }

            #[test]
            fn prop_tags_balance_per_line((text, ranges) in text_and_ranges()) {
                let store = RangeStore::from_ranges(ranges);
                let lines = LineDecorator::html().decorate_all(&text, &store).unwrap();
                for line in &lines {
                    prop_assert_eq!(line.matches("<span ").count(), line.matches("</span>").count());
                }
            }

            #[test]
            fn prop_plain_text_only_changes_line_splitting(text in "[a-z .;]{0,20}(\n[a-z .;]{0,20}){0,4}") {
                let store = RangeStore::new();
                let lines = LineDecorator::html().decorate_all(&text, &store).unwrap();
                prop_assert_eq!(lines.join("\n"), text);
            }

            #[test]
            fn prop_escaping_is_exact(text in "[a-z<>&;]{0,30}") {
                let store = RangeStore::new();
                let lines = LineDecorator::html().decorate_all(&text, &store).unwrap();
                let expected = text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;");
                prop_assert_eq!(lines, vec![expected]);
            }

            #[test]
            fn prop_window_matches_slice(
                (text, ranges) in text_and_ranges(),
                from in 1usize..8,
                span in 0usize..8,
            ) {
                let store = RangeStore::from_ranges(ranges);
                let decorator = LineDecorator::html();
                let all = decorator.decorate_all(&text, &store).unwrap();
                let to = from + span;
                let windowed = decorator.decorate(&text, &store, Some(from), Some(to)).unwrap();
                let expected: Vec<String> = if from > all.len() {
                    Vec::new()
                } else {
                    all[from - 1..to.min(all.len())].to_vec()
                };
                prop_assert_eq!(windowed, expected);
            }
        }
    }
}

//! Match results and the configurable matcher entry point.

use std::collections::HashMap;

use matchlight_buffer::TextBuffer;
use serde::{Deserialize, Serialize};

use crate::delimiter::{resolve, DelimiterPair, DelimiterTable, MatchMode};
use crate::file_type::normalize_hint;
use crate::highlight::{self, HighlightSpan, Theme};
use crate::{bracket, tag, SyntaxError, SyntaxResult};

/// A half-open `[start, end)` character range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn range(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }
}

/// Outcome of one matching pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum MatchResult {
    /// No delimiter next to the cursor, or no partner for it
    NoMatch,
    /// `anchor` touches the cursor; `partner` is its counterpart
    Matched { anchor: Span, partner: Span },
}

impl MatchResult {
    pub fn is_match(&self) -> bool {
        matches!(self, MatchResult::Matched { .. })
    }

    /// Returns `(anchor, partner)` for a match.
    pub fn spans(&self) -> Option<(Span, Span)> {
        match *self {
            MatchResult::Matched { anchor, partner } => Some((anchor, partner)),
            MatchResult::NoMatch => None,
        }
    }
}

/// How a markup tag's counterpart is searched for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagStrategy {
    /// First `</name>` after an opening tag, last `<name...>` before a
    /// closing tag. Same-named nested tags can mis-pair.
    Nearest,
    /// Depth-counted scan over same-named tags.
    #[default]
    Nested,
}

/// Matcher with per-extension extra pairs and a tag strategy.
///
/// The default matcher uses the built-in tables and [`TagStrategy::Nested`].
#[derive(Debug, Clone, Default)]
pub struct Matcher {
    tag_strategy: TagStrategy,
    extra_pairs: HashMap<String, Vec<DelimiterPair>>,
}

impl Matcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the tag counterpart strategy.
    pub fn with_tag_strategy(mut self, strategy: TagStrategy) -> Self {
        self.tag_strategy = strategy;
        self
    }

    /// Adds pairs for files whose hint normalizes to `extension`.
    ///
    /// Markup files are matched by tag name, so pairs for them are dropped.
    pub fn with_extra_pairs(
        mut self,
        extension: &str,
        pairs: impl IntoIterator<Item = DelimiterPair>,
    ) -> Self {
        if resolve(extension).mode() == MatchMode::Tags {
            tracing::warn!(extension, "ignoring extra pairs for a markup file type");
            return self;
        }
        self.extra_pairs
            .entry(normalize_hint(extension))
            .or_default()
            .extend(pairs);
        self
    }

    pub fn tag_strategy(&self) -> TagStrategy {
        self.tag_strategy
    }

    /// Resolves the table for a hint, including configured extras.
    pub fn table_for(&self, file_type_hint: &str) -> DelimiterTable {
        let table = resolve(file_type_hint);
        match self.extra_pairs.get(&normalize_hint(file_type_hint)) {
            Some(extra) => table.with_pairs(extra.iter().cloned()),
            None => table,
        }
    }

    /// Finds the delimiter touching `cursor` and its partner.
    ///
    /// Fails only when `cursor` lies past the end of the buffer.
    pub fn find_match(
        &self,
        buffer: &TextBuffer,
        cursor: usize,
        file_type_hint: &str,
    ) -> SyntaxResult<MatchResult> {
        let len = buffer.len_chars();
        if cursor > len {
            return Err(SyntaxError::CursorOutOfBounds {
                offset: cursor,
                len,
            });
        }

        let table = self.table_for(file_type_hint);
        let result = match table.mode() {
            MatchMode::Brackets => bracket::find_match(buffer, cursor, &table),
            MatchMode::Tags => tag::find_match(buffer, cursor, self.tag_strategy)?,
        };

        tracing::debug!(
            cursor,
            file_type = ?table.file_type(),
            ?result,
            "delimiter match"
        );
        Ok(result)
    }

    /// Computes the highlight spans for the current cursor.
    ///
    /// Returns no spans or two (anchor first, then partner).
    pub fn compute_highlights(
        &self,
        buffer: &TextBuffer,
        cursor: usize,
        file_type_hint: &str,
        theme: Theme,
    ) -> SyntaxResult<Vec<HighlightSpan>> {
        let result = self.find_match(buffer, cursor, file_type_hint)?;
        Ok(highlight::emit(&result, theme))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_bounds() {
        let buffer = TextBuffer::from("(a)");
        let matcher = Matcher::new();
        assert!(matcher.find_match(&buffer, 0, "").is_ok());
        assert!(matcher.find_match(&buffer, 3, "").is_ok());
        assert!(matches!(
            matcher.find_match(&buffer, 4, ""),
            Err(SyntaxError::CursorOutOfBounds { offset: 4, len: 3 })
        ));
    }

    #[test]
    fn test_empty_buffer() {
        let buffer = TextBuffer::new();
        for hint in ["", ".py", ".html"] {
            assert_eq!(
                Matcher::new().find_match(&buffer, 0, hint).unwrap(),
                MatchResult::NoMatch
            );
        }
    }

    #[test]
    fn test_extra_pairs_apply_to_extension_only() {
        let matcher = Matcher::new().with_extra_pairs(
            ".erb",
            [DelimiterPair::new("<%", "%>").unwrap()],
        );
        let buffer = TextBuffer::from("<% x %>");

        let result = matcher.find_match(&buffer, 0, "view.erb").unwrap();
        assert_eq!(
            result.spans(),
            Some((Span::new(0, 2), Span::new(5, 7)))
        );
        assert_eq!(
            matcher.find_match(&buffer, 0, ".txt").unwrap(),
            MatchResult::NoMatch
        );
    }

    #[test]
    fn test_extra_pairs_for_markup_are_ignored() {
        let matcher = Matcher::new().with_extra_pairs(
            "html",
            [DelimiterPair::new("{{", "}}").unwrap()],
        );
        assert_eq!(matcher.table_for("index.html"), resolve(".html"));
        assert_eq!(
            matcher
                .find_match(&TextBuffer::from("{{ x }}"), 0, ".html")
                .unwrap(),
            MatchResult::NoMatch
        );
    }

    #[test]
    fn test_tag_strategy_switch() {
        let buffer = TextBuffer::from("<div><div></div></div>");
        let nested = Matcher::new().find_match(&buffer, 2, ".html").unwrap();
        let nearest = Matcher::new()
            .with_tag_strategy(TagStrategy::Nearest)
            .find_match(&buffer, 2, ".html")
            .unwrap();
        assert_eq!(nested.spans().unwrap().1, Span::new(16, 22));
        assert_eq!(nearest.spans().unwrap().1, Span::new(10, 16));
    }

    #[test]
    fn test_match_result_serializes_tagged() {
        let json = serde_json::to_string(&MatchResult::NoMatch).unwrap();
        assert_eq!(json, r#"{"result":"no_match"}"#);
    }
}

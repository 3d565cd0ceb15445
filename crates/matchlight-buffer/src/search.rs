//! Find and replace over a [`TextBuffer`].
//!
//! Patterns are literal text. `match_case` and `whole_word` are compiled into
//! a `regex::Regex` once, so repeated "find next" calls don't re-parse the
//! pattern. Match offsets are reported as character indices, like every other
//! offset in this crate.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::{BufferError, BufferResult, TextBuffer};

/// Search direction for [`Searcher::find_next`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

/// Options controlling how a pattern matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    /// Compare case-sensitively
    pub match_case: bool,
    /// Only match at word boundaries
    pub whole_word: bool,
    /// Which way `find_next` walks
    pub direction: Direction,
    /// Restart from the other end of the buffer when nothing is left
    pub wrap: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            match_case: false,
            whole_word: false,
            direction: Direction::Forward,
            wrap: true,
        }
    }
}

/// A match as a half-open character range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchMatch {
    pub start: usize,
    pub end: usize,
}

impl SearchMatch {
    /// Returns the match as a `Range`.
    pub fn range(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }
}

/// A compiled search pattern.
#[derive(Debug, Clone)]
pub struct Searcher {
    regex: Regex,
    options: SearchOptions,
}

impl Searcher {
    /// Compiles a literal pattern with the given options.
    pub fn new(pattern: &str, options: SearchOptions) -> BufferResult<Self> {
        if pattern.is_empty() {
            return Err(BufferError::EmptyPattern);
        }

        let escaped = regex::escape(pattern);
        let source = if options.whole_word {
            format!(r"\b{escaped}\b")
        } else {
            escaped
        };
        let regex = RegexBuilder::new(&source)
            .case_insensitive(!options.match_case)
            .build()?;

        Ok(Self { regex, options })
    }

    /// Returns the options this searcher was built with.
    pub fn options(&self) -> SearchOptions {
        self.options
    }

    /// Returns true if the pattern occurs anywhere in `text`.
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// Returns true if `text` is exactly one match of the pattern.
    pub fn matches_exactly(&self, text: &str) -> bool {
        self.regex
            .find(text)
            .is_some_and(|m| m.start() == 0 && m.end() == text.len())
    }

    /// Finds all non-overlapping matches in the buffer.
    pub fn find_all(&self, buffer: &TextBuffer) -> BufferResult<Vec<SearchMatch>> {
        let text = buffer.text();
        self.regex
            .find_iter(&text)
            .map(|m| to_char_match(buffer, m.start(), m.end()))
            .collect()
    }

    /// Finds the next match relative to `from` in the configured direction.
    ///
    /// Forward returns the first match starting at or after `from`; backward
    /// returns the last match ending at or before `from`. With `wrap` set the
    /// search restarts from the opposite end of the buffer.
    pub fn find_next(
        &self,
        buffer: &TextBuffer,
        from: usize,
    ) -> BufferResult<Option<SearchMatch>> {
        let byte_from = buffer.char_to_byte(from)?;
        let text = buffer.text();

        let found = match self.options.direction {
            Direction::Forward => self
                .regex
                .find_at(&text, byte_from)
                .or_else(|| self.options.wrap.then(|| self.regex.find(&text)).flatten()),
            Direction::Backward => {
                let mut before = None;
                let mut last = None;
                for m in self.regex.find_iter(&text) {
                    if m.end() <= byte_from {
                        before = Some(m);
                    }
                    last = Some(m);
                }
                before.or(if self.options.wrap { last } else { None })
            }
        };

        found
            .map(|m| to_char_match(buffer, m.start(), m.end()))
            .transpose()
    }

    /// Replaces every match with `replacement`, returning the count.
    ///
    /// The replacement is inserted literally.
    pub fn replace_all(&self, buffer: &mut TextBuffer, replacement: &str) -> BufferResult<usize> {
        let matches = self.find_all(buffer)?;

        // Apply from the back so earlier offsets stay valid
        for m in matches.iter().rev() {
            buffer.replace(m.range(), replacement)?;
        }

        Ok(matches.len())
    }
}

fn to_char_match(buffer: &TextBuffer, start: usize, end: usize) -> BufferResult<SearchMatch> {
    Ok(SearchMatch {
        start: buffer.byte_to_char(start)?,
        end: buffer.byte_to_char(end)?,
    })
}

//! Delimiter tables.
//!
//! ## Learning: `Cow<'static, str>`
//!
//! The built-in tables are string literals, but users can add their own
//! pairs from configuration. `Cow` lets both live in the same `Vec` without
//! allocating for the built-ins.

use std::borrow::Cow;

use crate::file_type::FileType;
use crate::{SyntaxError, SyntaxResult};

/// An opening/closing delimiter pair.
///
/// Symmetric markers such as `"""` have `open == close`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DelimiterPair {
    open: Cow<'static, str>,
    close: Cow<'static, str>,
}

impl DelimiterPair {
    /// Creates a pair from string literals. Both must be non-empty.
    pub const fn fixed(open: &'static str, close: &'static str) -> Self {
        Self {
            open: Cow::Borrowed(open),
            close: Cow::Borrowed(close),
        }
    }

    /// Creates a pair from owned strings, rejecting empty tokens.
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> SyntaxResult<Self> {
        let (open, close) = (open.into(), close.into());
        if open.is_empty() || close.is_empty() {
            return Err(SyntaxError::InvalidDelimiter(format!(
                "{open:?} / {close:?}: tokens must be non-empty"
            )));
        }
        Ok(Self {
            open: Cow::Owned(open),
            close: Cow::Owned(close),
        })
    }

    pub fn open(&self) -> &str {
        &self.open
    }

    pub fn close(&self) -> &str {
        &self.close
    }

    /// Returns true when both tokens are identical (`"""`, `` ` ``).
    pub fn is_symmetric(&self) -> bool {
        self.open == self.close
    }

    /// Returns true when either token spans more than one character.
    pub fn is_multi_char(&self) -> bool {
        self.token_len() > 1
    }

    /// Length in characters of the longer token.
    pub fn token_len(&self) -> usize {
        self.open.chars().count().max(self.close.chars().count())
    }
}

/// The common bracket pairs included in every table.
pub const COMMON_PAIRS: &[DelimiterPair] = &[
    DelimiterPair::fixed("(", ")"),
    DelimiterPair::fixed("[", "]"),
    DelimiterPair::fixed("{", "}"),
];

const PYTHON_PAIRS: &[DelimiterPair] = &[
    DelimiterPair::fixed("\"\"\"", "\"\"\""),
    DelimiterPair::fixed("'''", "'''"),
];
const JAVASCRIPT_PAIRS: &[DelimiterPair] = &[DelimiterPair::fixed("`", "`")];
const JAVA_PAIRS: &[DelimiterPair] = &[DelimiterPair::fixed("/**", "*/")];
const CPP_PAIRS: &[DelimiterPair] = &[DelimiterPair::fixed("/*", "*/")];
const PHP_PAIRS: &[DelimiterPair] = &[
    DelimiterPair::fixed("<?php", "?>"),
    DelimiterPair::fixed("<!--", "-->"),
];
const MARKUP_PAIRS: &[DelimiterPair] = &[DelimiterPair::fixed("<", ">")];

/// How a table is matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Counted bracket/marker matching
    Brackets,
    /// Markup tag-name matching
    Tags,
}

/// Ordered delimiter pairs for one file type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelimiterTable {
    file_type: FileType,
    mode: MatchMode,
    pairs: Vec<DelimiterPair>,
}

impl DelimiterTable {
    /// Builds the table for a file type.
    pub fn for_file_type(file_type: FileType) -> Self {
        let extras: &[DelimiterPair] = match file_type {
            FileType::Common => &[],
            FileType::Python => PYTHON_PAIRS,
            FileType::JavaScript => JAVASCRIPT_PAIRS,
            FileType::Java => JAVA_PAIRS,
            FileType::Cpp => CPP_PAIRS,
            FileType::Php => PHP_PAIRS,
            FileType::Html | FileType::Xml => MARKUP_PAIRS,
        };

        let mode = if file_type.is_markup() {
            MatchMode::Tags
        } else {
            MatchMode::Brackets
        };

        Self {
            file_type,
            mode,
            pairs: COMMON_PAIRS.iter().chain(extras).cloned().collect(),
        }
    }

    /// Appends extra pairs, skipping ones already present.
    pub fn with_pairs(mut self, extra: impl IntoIterator<Item = DelimiterPair>) -> Self {
        for pair in extra {
            if !self.pairs.contains(&pair) {
                self.pairs.push(pair);
            }
        }
        self
    }

    pub fn file_type(&self) -> FileType {
        self.file_type
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    /// Pairs in declaration order.
    pub fn pairs(&self) -> &[DelimiterPair] {
        &self.pairs
    }

    /// Pairs in the order the bracket matcher tries them: multi-character
    /// pairs first (longest token first), then single-character pairs.
    pub fn candidates(&self) -> Vec<&DelimiterPair> {
        let mut multi: Vec<_> = self.pairs.iter().filter(|p| p.is_multi_char()).collect();
        multi.sort_by_key(|p| std::cmp::Reverse(p.token_len()));
        multi
            .into_iter()
            .chain(self.pairs.iter().filter(|p| !p.is_multi_char()))
            .collect()
    }
}

/// Resolves a file-type hint to its delimiter table.
///
/// Unknown and empty hints fall back to the common table.
pub fn resolve(file_type_hint: &str) -> DelimiterTable {
    DelimiterTable::for_file_type(FileType::from_hint(file_type_hint))
}

//! # Matchlight Syntax
//!
//! Delimiter and tag matching for an interactive editor.
//!
//! Given a buffer, a cursor offset and a file-type hint, the matcher decides
//! whether the cursor touches a bracket-like or tag-like delimiter, finds its
//! structural partner and reports both spans for highlighting.
//!
//! ```text
//!   hint ──► DelimiterTable ──┬── Brackets ──► bracket::find_match ──┐
//!                             └── Tags ──────► tag::find_match ──────┤
//!                                                                    ▼
//!                                      MatchResult ──► highlight::emit ──► spans
//! ```
//!
//! Token colouring ([`token::highlight_tokens`]) is independent of the
//! cursor and runs over the whole buffer.
//!
//! ## Learning: Pure Functions at the Core
//!
//! Nothing here keeps state between calls. The host owns the buffer and
//! the previously applied highlight set; the matcher only borrows the buffer
//! (`&TextBuffer`) for the duration of one call. `NoMatch` is an ordinary
//! value, not an error: the only error a well-behaved host can see is a
//! cursor offset past the end of the buffer.

mod bracket;
pub mod delimiter;
pub mod file_type;
pub mod highlight;
pub mod matcher;
mod tag;
pub mod token;

pub use delimiter::{resolve, DelimiterPair, DelimiterTable, MatchMode};
pub use file_type::FileType;
pub use highlight::{
    compute_highlights, current_line_highlight, Color, HighlightKind, HighlightSpan,
    HighlightStyle, Theme,
};
pub use matcher::{MatchResult, Matcher, Span, TagStrategy};
pub use token::highlight_tokens;

use matchlight_buffer::BufferError;

/// Result type for matcher operations
pub type SyntaxResult<T> = Result<T, SyntaxError>;

/// Errors that can occur while matching.
#[derive(Debug, thiserror::Error)]
pub enum SyntaxError {
    #[error("Cursor offset {offset} is outside the buffer (length {len})")]
    CursorOutOfBounds { offset: usize, len: usize },

    #[error("Invalid delimiter pair: {0}")]
    InvalidDelimiter(String),

    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Buffer error: {0}")]
    Buffer(#[from] BufferError),
}

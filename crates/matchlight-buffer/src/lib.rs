//! # Matchlight Buffer
//!
//! Rope-backed text buffer used as the host of the delimiter matcher.
//!
//! ## Key Concepts
//!
//! ### Character Offsets
//! - Every offset in this crate is a *character* index, never a byte index
//! - `Position` is the (line, column) decomposition of an offset
//! - Conversions are validated so scans can never step outside the text
//!
//! ### Ownership & Borrowing
//! - `TextBuffer` owns the rope
//! - Readers such as the matcher only ever take `&TextBuffer`
//! - Mutations require `&mut self`, so a reader never sees a half-applied edit

mod buffer;
mod position;
mod search;

pub use buffer::TextBuffer;
pub use position::Position;
pub use search::{Direction, SearchMatch, SearchOptions, Searcher};

/// Result type for buffer operations
pub type BufferResult<T> = Result<T, BufferError>;

/// Errors that can occur during buffer operations
#[derive(Debug, thiserror::Error)]
pub enum BufferError {
    #[error("Position {line}:{column} is out of bounds")]
    PositionOutOfBounds { line: usize, column: usize },

    #[error("Invalid character index: {0}")]
    InvalidCharIndex(usize),

    #[error("Empty search pattern")]
    EmptyPattern,

    #[error("Invalid search pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

//! # Matchlight Core
//!
//! Editor session logic around the delimiter matcher.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                   Document                   │
//! │  ┌────────────┐ ┌──────────┐ ┌────────────┐  │
//! │  │ TextBuffer │ │ Matcher  │ │ Highlights │  │
//! │  └────────────┘ └──────────┘ └────────────┘  │
//! └──────────────────────────────────────────────┘
//!        ▲                ▲
//!   ┌────┴─────┐    ┌─────┴────┐
//!   │ Workspace│    │  Config  │
//!   └──────────┘    └──────────┘
//! ```
//!
//! A `Document` owns its buffer and re-runs the matcher after every cursor
//! move or edit, replacing the previous highlight set wholesale. `Config`
//! feeds it the theme, the tag strategy and any extra delimiter pairs.
//! `Workspace` searches directory trees for text.

pub mod config;
pub mod document;
pub mod workspace;

pub use config::{Config, ConfigError};
pub use document::{Document, DocumentStats};
pub use workspace::{FileMatch, Workspace};

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in core operations
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Not a search result line: {0}")]
    InvalidResultLine(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Buffer error: {0}")]
    Buffer(#[from] matchlight_buffer::BufferError),

    #[error("Syntax error: {0}")]
    Syntax(#[from] matchlight_syntax::SyntaxError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),
}

//! Core text buffer implementation using rope data structure.
//!
//! ## Why Rope?
//!
//! The matcher runs on every cursor move, so it needs cheap random access:
//! - **Char lookup**: O(log n) `get_char` instead of re-collecting a `String`
//! - **Line addressing**: line/char conversions without scanning for `\n`
//! - **Edits**: O(log n) insertions/deletions while the host types
//!
//! ## Learning: Borrowing a Snapshot
//!
//! ```rust,ignore
//! let buffer = TextBuffer::from("(a)");
//! let spans = compute_highlights(&buffer, 0, ".rs", Theme::Dark)?; // shared borrow
//! buffer.insert(0, "x")?;   // ERROR while `buffer` is borrowed immutably elsewhere
//! ```
//!
//! The borrow checker is what guarantees the matcher never observes a
//! half-mutated buffer.

use ropey::Rope;
use std::borrow::Cow;
use std::ops::Range;
use std::path::Path;

use crate::{BufferError, BufferResult, Position};

/// A text buffer backed by a rope data structure.
///
/// All offsets are character indices.
#[derive(Debug, Clone)]
pub struct TextBuffer {
    /// The rope holding our text content
    rope: Rope,

    /// Whether the buffer has unsaved changes
    modified: bool,

    /// Associated file path (if any)
    file_path: Option<std::path::PathBuf>,
}

impl TextBuffer {
    /// Creates a new empty buffer.
    ///
    /// # Example
    /// ```
    /// use matchlight_buffer::TextBuffer;
    ///
    /// let buffer = TextBuffer::new();
    /// assert!(buffer.is_empty());
    /// ```
    pub fn new() -> Self {
        Self {
            rope: Rope::new(),
            modified: false,
            file_path: None,
        }
    }

    /// Loads a buffer from a file.
    pub fn from_file(path: impl AsRef<Path>) -> BufferResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;

        Ok(Self {
            rope: Rope::from_str(&content),
            modified: false,
            file_path: Some(path.to_path_buf()),
        })
    }

    /// Saves the buffer to its associated file.
    pub fn save(&mut self) -> BufferResult<()> {
        let path = self.file_path.clone().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "No file path set")
        })?;
        self.save_as(&path)
    }

    /// Saves the buffer to a specific path.
    pub fn save_as(&mut self, path: impl AsRef<Path>) -> BufferResult<()> {
        let path = path.as_ref();

        // Write to a temporary file first, then rename (atomic write)
        let temp_path = path.with_extension("tmp");
        std::fs::write(&temp_path, self.text().as_bytes())?;
        std::fs::rename(&temp_path, path)?;

        self.file_path = Some(path.to_path_buf());
        self.modified = false;
        Ok(())
    }

    // ==================== Text Access ====================

    /// Returns the entire text content.
    #[inline]
    pub fn text(&self) -> Cow<'_, str> {
        self.rope.slice(..).into()
    }

    /// Returns a specific line (0-indexed), including its trailing newline.
    pub fn line(&self, line_idx: usize) -> BufferResult<Cow<'_, str>> {
        self.check_line(line_idx)?;
        Ok(self.rope.line(line_idx).into())
    }

    /// Returns a specific line without its line terminator.
    pub fn line_text(&self, line_idx: usize) -> BufferResult<Cow<'_, str>> {
        let start = self.line_to_char(line_idx)?;
        let len = self.line_content_len(line_idx)?;
        Ok(self.rope.slice(start..start + len).into())
    }

    /// Returns a slice of text by character range.
    pub fn slice(&self, range: Range<usize>) -> BufferResult<Cow<'_, str>> {
        if range.start > range.end {
            return Err(BufferError::InvalidCharIndex(range.start));
        }
        if range.end > self.len_chars() {
            return Err(BufferError::InvalidCharIndex(range.end));
        }
        Ok(self.rope.slice(range).into())
    }

    /// Returns the character at a char index, or `None` past the end.
    #[inline]
    pub fn get_char(&self, char_idx: usize) -> Option<char> {
        self.rope.get_char(char_idx)
    }

    /// Returns the character at a position.
    pub fn char_at(&self, pos: Position) -> BufferResult<char> {
        let idx = self.position_to_char_idx(pos)?;
        self.get_char(idx)
            .ok_or(BufferError::PositionOutOfBounds {
                line: pos.line,
                column: pos.column,
            })
    }

    /// Returns true if `token` occurs starting exactly at `char_idx`.
    ///
    /// Never reads past the end of the buffer; an index beyond the end
    /// simply doesn't match.
    pub fn starts_with_at(&self, char_idx: usize, token: &str) -> bool {
        if char_idx > self.len_chars() {
            return false;
        }
        let mut chars = self.rope.chars_at(char_idx);
        token.chars().all(|t| chars.next() == Some(t))
    }

    /// Returns true if `token` occurs ending exactly at `char_idx` (exclusive).
    pub fn ends_with_at(&self, char_idx: usize, token: &str) -> bool {
        let len = token.chars().count();
        char_idx >= len && self.starts_with_at(char_idx - len, token)
    }

    // ==================== Measurements ====================

    /// Returns true if the buffer is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// Returns the number of characters in the buffer.
    #[inline]
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    /// Returns the number of bytes in the buffer.
    #[inline]
    pub fn len_bytes(&self) -> usize {
        self.rope.len_bytes()
    }

    /// Returns the number of lines in the buffer.
    ///
    /// An empty buffer has 1 line. A buffer ending with `\n` counts
    /// the empty line after it.
    #[inline]
    pub fn len_lines(&self) -> usize {
        self.rope.len_lines()
    }

    /// Returns the length of a line in characters, including its newline.
    pub fn line_len(&self, line_idx: usize) -> BufferResult<usize> {
        self.check_line(line_idx)?;
        Ok(self.rope.line(line_idx).len_chars())
    }

    /// Returns the length of a line in characters, excluding `\n` / `\r\n`.
    pub fn line_content_len(&self, line_idx: usize) -> BufferResult<usize> {
        self.check_line(line_idx)?;
        let line = self.rope.line(line_idx);
        let mut len = line.len_chars();
        if len > 0 && line.char(len - 1) == '\n' {
            len -= 1;
            if len > 0 && line.char(len - 1) == '\r' {
                len -= 1;
            }
        }
        Ok(len)
    }

    // ==================== Mutations ====================

    /// Inserts text at a character index.
    pub fn insert(&mut self, char_idx: usize, text: &str) -> BufferResult<()> {
        if char_idx > self.len_chars() {
            return Err(BufferError::InvalidCharIndex(char_idx));
        }

        self.rope.insert(char_idx, text);
        self.modified = true;
        Ok(())
    }

    /// Deletes text in a character range, returning what was removed.
    pub fn delete(&mut self, range: Range<usize>) -> BufferResult<String> {
        let deleted = self.slice(range.clone())?.into_owned();
        self.rope.remove(range);
        self.modified = true;
        Ok(deleted)
    }

    /// Replaces text in a range with new text.
    pub fn replace(&mut self, range: Range<usize>, text: &str) -> BufferResult<String> {
        let deleted = self.delete(range.clone())?;
        self.insert(range.start, text)?;
        Ok(deleted)
    }

    // ==================== Position Conversion ====================

    /// Converts a Position (line, column) to a character index.
    ///
    /// The column may point at the end of the line content (insertion point)
    /// but not past it.
    pub fn position_to_char_idx(&self, pos: Position) -> BufferResult<usize> {
        let out_of_bounds = BufferError::PositionOutOfBounds {
            line: pos.line,
            column: pos.column,
        };
        if pos.line >= self.len_lines() {
            return Err(out_of_bounds);
        }

        let line_start = self.rope.line_to_char(pos.line);
        if pos.column > self.line_content_len(pos.line)? {
            return Err(out_of_bounds);
        }

        Ok(line_start + pos.column)
    }

    /// Converts a character index to a Position (line, column).
    pub fn char_idx_to_position(&self, char_idx: usize) -> BufferResult<Position> {
        let line = self.char_to_line(char_idx)?;
        let column = char_idx - self.rope.line_to_char(line);
        Ok(Position { line, column })
    }

    /// Returns the line containing a character index.
    pub fn char_to_line(&self, char_idx: usize) -> BufferResult<usize> {
        if char_idx > self.len_chars() {
            return Err(BufferError::InvalidCharIndex(char_idx));
        }
        Ok(self.rope.char_to_line(char_idx))
    }

    /// Returns the character index where a line starts.
    pub fn line_to_char(&self, line_idx: usize) -> BufferResult<usize> {
        self.check_line(line_idx)?;
        Ok(self.rope.line_to_char(line_idx))
    }

    /// Converts a byte offset of `text()` into a character index.
    pub fn byte_to_char(&self, byte_idx: usize) -> BufferResult<usize> {
        if byte_idx > self.len_bytes() {
            return Err(BufferError::InvalidCharIndex(byte_idx));
        }
        Ok(self.rope.byte_to_char(byte_idx))
    }

    /// Converts a character index into a byte offset of `text()`.
    pub fn char_to_byte(&self, char_idx: usize) -> BufferResult<usize> {
        if char_idx > self.len_chars() {
            return Err(BufferError::InvalidCharIndex(char_idx));
        }
        Ok(self.rope.char_to_byte(char_idx))
    }

    fn check_line(&self, line_idx: usize) -> BufferResult<()> {
        if line_idx >= self.len_lines() {
            return Err(BufferError::PositionOutOfBounds {
                line: line_idx,
                column: 0,
            });
        }
        Ok(())
    }

    // ==================== State Queries ====================

    /// Returns true if the buffer has unsaved changes.
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Returns the associated file path, if any.
    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for TextBuffer {
    fn from(s: &str) -> Self {
        Self {
            rope: Rope::from_str(s),
            modified: false,
            file_path: None,
        }
    }
}

impl From<String> for TextBuffer {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

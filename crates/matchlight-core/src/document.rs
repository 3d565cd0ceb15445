//! Document sessions.
//!
//! ## Learning: Composition over Inheritance
//!
//! `Document` composes a `TextBuffer`, a `Matcher` and the last applied
//! highlight set. Every cursor move and every edit goes through a method
//! that ends in `refresh_highlights`, so the highlight set can never
//! describe a previous state of the buffer.

use std::ops::Range;
use std::path::{Path, PathBuf};

use matchlight_buffer::{
    BufferError, Direction, Position, SearchMatch, SearchOptions, Searcher, TextBuffer,
};
use matchlight_syntax::{
    current_line_highlight, highlight_tokens, HighlightSpan, Matcher, Theme,
};
use serde::Serialize;

use crate::config::{Config, EditorConfig};
use crate::CoreResult;

/// Characters that open an indented block when they end a line.
const BLOCK_OPENERS: [char; 4] = [':', '{', '[', '('];

/// Line ending style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    /// Unix-style: \n
    #[default]
    Lf,
    /// Windows-style: \r\n
    CrLf,
}

impl LineEnding {
    /// Returns the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }

    /// Detects line ending from text.
    pub fn detect(text: &str) -> Self {
        if text.contains("\r\n") {
            LineEnding::CrLf
        } else {
            LineEnding::Lf
        }
    }
}

/// Line counts shown in the status bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DocumentStats {
    /// Number of lines, counting a trailing empty line
    pub total_lines: usize,
    /// Non-blank lines that are not `#` comments
    pub code_lines: usize,
}

impl DocumentStats {
    pub fn from_text(text: &str) -> Self {
        let mut total_lines = 0;
        let mut code_lines = 0;
        for line in text.split('\n') {
            total_lines += 1;
            let line = line.trim();
            if !line.is_empty() && !line.starts_with('#') {
                code_lines += 1;
            }
        }
        Self {
            total_lines,
            code_lines,
        }
    }
}

impl std::fmt::Display for DocumentStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Lines: {} | Code Lines: {}", self.total_lines, self.code_lines)
    }
}

/// Returns the indentation for a line following `line`.
///
/// The leading whitespace is carried over; a line ending in `:`, `{`, `[`
/// or `(` adds one level of `indent_width` spaces.
pub fn indentation_for(line: &str, indent_width: usize) -> String {
    let content = line.trim_end_matches(['\r', '\n']);
    let leading = content.len() - content.trim_start().len();
    let mut indent = content[..leading].to_string();
    if content.trim_end().ends_with(BLOCK_OPENERS) {
        indent.push_str(&" ".repeat(indent_width));
    }
    indent
}

/// A single file being edited.
#[derive(Debug)]
pub struct Document {
    /// The underlying text buffer
    buffer: TextBuffer,

    /// File path (None for untitled documents)
    path: Option<PathBuf>,

    /// Display name
    name: String,

    /// File-type hint handed to the matcher
    hint: String,

    /// Cursor as a char offset, always `<= buffer.len_chars()`
    cursor: usize,

    /// Selected char range, if any
    selection: Option<Range<usize>>,

    matcher: Matcher,
    theme: Theme,
    settings: EditorConfig,
    line_ending: LineEnding,

    /// Last applied highlight set
    highlights: Vec<HighlightSpan>,
}

impl Document {
    /// Creates a new empty document.
    pub fn new() -> Self {
        Self::from_text("", "")
    }

    /// Creates an untitled document holding `text`.
    ///
    /// Highlights are computed on the first cursor or text event.
    pub fn from_text(text: &str, file_type_hint: &str) -> Self {
        Self {
            buffer: TextBuffer::from(text),
            path: None,
            name: "Untitled".to_string(),
            hint: file_type_hint.to_string(),
            cursor: 0,
            selection: None,
            matcher: Matcher::default(),
            theme: Theme::default(),
            settings: EditorConfig::default(),
            line_ending: LineEnding::detect(text),
            highlights: Vec::new(),
        }
    }

    /// Opens a document from a file.
    pub fn from_file(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref();
        let buffer = TextBuffer::from_file(path)?;
        let line_ending = LineEnding::detect(&buffer.text());

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("Unknown")
            .to_string();

        tracing::info!(path = %path.display(), chars = buffer.len_chars(), "opened document");

        Ok(Self {
            buffer,
            path: Some(path.to_path_buf()),
            name,
            hint: Self::hint_for(path),
            cursor: 0,
            selection: None,
            matcher: Matcher::default(),
            theme: Theme::default(),
            settings: EditorConfig::default(),
            line_ending,
            highlights: Vec::new(),
        })
    }

    /// Applies editor settings, theme and matcher from `config`.
    pub fn with_config(mut self, config: &Config) -> CoreResult<Self> {
        self.matcher = config.matcher()?;
        self.theme = config.ui.theme;
        self.settings = config.editor.clone();
        Ok(self)
    }

    /// Overrides the theme.
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Overrides the file-type hint derived from the path.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = hint.into();
        self
    }

    fn hint_for(path: &Path) -> String {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{e}"))
            .unwrap_or_default()
    }

    // ==================== Getters ====================

    /// Returns the file path.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Returns the display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the file-type hint.
    pub fn hint(&self) -> &str {
        &self.hint
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Returns true if the document has unsaved changes.
    pub fn is_modified(&self) -> bool {
        self.buffer.is_modified()
    }

    /// Returns the text buffer.
    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    /// Returns all text.
    pub fn text(&self) -> std::borrow::Cow<'_, str> {
        self.buffer.text()
    }

    /// Returns the line count.
    pub fn line_count(&self) -> usize {
        self.buffer.len_lines()
    }

    /// Returns the cursor offset.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Returns the cursor as line/column.
    pub fn cursor_position(&self) -> CoreResult<Position> {
        Ok(self.buffer.char_idx_to_position(self.cursor)?)
    }

    /// Returns the selected range.
    pub fn selection(&self) -> Option<Range<usize>> {
        self.selection.clone()
    }

    /// Returns the selected text.
    pub fn selected_text(&self) -> Option<String> {
        let range = self.selection.clone()?;
        self.buffer.slice(range).ok().map(|s| s.into_owned())
    }

    /// Returns the highlight set applied for the current state.
    pub fn highlights(&self) -> &[HighlightSpan] {
        &self.highlights
    }

    /// Returns line statistics for the whole document.
    pub fn stats(&self) -> DocumentStats {
        DocumentStats::from_text(&self.buffer.text())
    }

    // ==================== Cursor Events ====================

    /// Moves the cursor to a char offset and clears the selection.
    pub fn set_cursor(&mut self, offset: usize) -> CoreResult<()> {
        if offset > self.buffer.len_chars() {
            return Err(BufferError::InvalidCharIndex(offset).into());
        }
        self.cursor = offset;
        self.selection = None;
        self.refresh_highlights()
    }

    /// Moves the cursor to a line/column position.
    pub fn move_cursor_to(&mut self, pos: Position) -> CoreResult<()> {
        let offset = self.buffer.position_to_char_idx(pos)?;
        self.set_cursor(offset)
    }

    /// Selects a range, leaving the cursor at its end.
    pub fn select(&mut self, range: Range<usize>) -> CoreResult<()> {
        if range.start > range.end || range.end > self.buffer.len_chars() {
            return Err(BufferError::InvalidCharIndex(range.end).into());
        }
        self.cursor = range.end;
        self.selection = Some(range);
        self.refresh_highlights()
    }

    /// Recomputes highlights after the text changed.
    pub fn on_text_changed(&mut self) -> CoreResult<()> {
        let len = self.buffer.len_chars();
        self.cursor = self.cursor.min(len);
        if self.selection.as_ref().is_some_and(|r| r.end > len) {
            self.selection = None;
        }
        self.refresh_highlights()
    }

    /// Replaces the highlight set with the one for the current cursor.
    pub fn refresh_highlights(&mut self) -> CoreResult<()> {
        let mut spans = Vec::new();

        if self.settings.highlight_current_line {
            spans.push(current_line_highlight(&self.buffer, self.cursor, self.theme)?);
        }
        if self.settings.match_delimiters {
            spans.extend(self.matcher.compute_highlights(
                &self.buffer,
                self.cursor,
                &self.hint,
                self.theme,
            )?);
        }
        if self.settings.syntax_highlighting {
            spans.extend(highlight_tokens(&self.buffer, self.theme)?);
        }

        tracing::trace!(cursor = self.cursor, spans = spans.len(), "highlights replaced");
        self.highlights = spans;
        Ok(())
    }

    // ==================== Text Editing ====================

    /// Inserts text at the cursor, replacing the selection if there is one.
    pub fn insert_at_cursor(&mut self, text: &str) -> CoreResult<()> {
        let at = match self.selection.take() {
            Some(range) => {
                self.buffer.delete(range.clone())?;
                range.start
            }
            None => self.cursor,
        };
        self.buffer.insert(at, text)?;
        self.cursor = at + text.chars().count();
        self.on_text_changed()
    }

    /// Deletes the selection or the character before the cursor.
    ///
    /// A `\r\n` line break is deleted as a whole.
    pub fn delete_backward(&mut self) -> CoreResult<()> {
        if let Some(range) = self.selection.take() {
            self.buffer.delete(range.clone())?;
            self.cursor = range.start;
        } else if self.cursor > 0 {
            let width = if self.buffer.ends_with_at(self.cursor, "\r\n") {
                2
            } else {
                1
            };
            self.buffer.delete(self.cursor - width..self.cursor)?;
            self.cursor -= width;
        }
        self.on_text_changed()
    }

    /// Deletes the selection or the character after the cursor.
    ///
    /// A `\r\n` line break is deleted as a whole.
    pub fn delete_forward(&mut self) -> CoreResult<()> {
        if let Some(range) = self.selection.take() {
            self.buffer.delete(range.clone())?;
            self.cursor = range.start;
        } else if self.cursor < self.buffer.len_chars() {
            let width = if self.buffer.starts_with_at(self.cursor, "\r\n") {
                2
            } else {
                1
            };
            self.buffer.delete(self.cursor..self.cursor + width)?;
        }
        self.on_text_changed()
    }

    /// Inserts a line break, indented like the current line when
    /// auto-indent is on.
    pub fn insert_newline(&mut self) -> CoreResult<()> {
        let indent = if self.settings.auto_indent {
            let line = self.buffer.char_to_line(self.cursor)?;
            indentation_for(&self.buffer.line_text(line)?, self.settings.tab_size)
        } else {
            String::new()
        };
        let text = format!("{}{indent}", self.line_ending.as_str());
        self.insert_at_cursor(&text)
    }

    // ==================== Find / Replace ====================

    /// Finds the next occurrence of `pattern` and selects it.
    ///
    /// Forward searches start at the end of the selection (or the cursor),
    /// backward searches before its start.
    pub fn find(
        &mut self,
        pattern: &str,
        options: SearchOptions,
    ) -> CoreResult<Option<SearchMatch>> {
        let searcher = Searcher::new(pattern, options)?;
        let from = match (&self.selection, options.direction) {
            (Some(range), Direction::Forward) => range.end,
            (Some(range), Direction::Backward) => range.start,
            (None, _) => self.cursor,
        };

        let found = searcher.find_next(&self.buffer, from)?;
        match found {
            Some(m) => self.select(m.range())?,
            None => tracing::debug!(pattern, "no occurrence found"),
        }
        Ok(found)
    }

    /// Replaces the selection if it is an occurrence of `pattern`, then
    /// moves on to the next occurrence.
    ///
    /// Returns whether a replacement was made.
    pub fn replace(
        &mut self,
        pattern: &str,
        replacement: &str,
        options: SearchOptions,
    ) -> CoreResult<bool> {
        let searcher = Searcher::new(pattern, options)?;

        let replaced = match (self.selection.clone(), self.selected_text()) {
            (Some(range), Some(selected)) if searcher.matches_exactly(&selected) => {
                self.buffer.replace(range.clone(), replacement)?;
                self.selection = None;
                self.cursor = range.start + replacement.chars().count();
                self.on_text_changed()?;
                true
            }
            _ => false,
        };

        self.find(pattern, options)?;
        Ok(replaced)
    }

    /// Replaces every occurrence of `pattern`, returning the count.
    pub fn replace_all(
        &mut self,
        pattern: &str,
        replacement: &str,
        options: SearchOptions,
    ) -> CoreResult<usize> {
        let searcher = Searcher::new(pattern, options)?;
        let count = searcher.replace_all(&mut self.buffer, replacement)?;
        self.selection = None;
        self.on_text_changed()?;
        tracing::info!(pattern, count, "replaced all occurrences");
        Ok(count)
    }

    // ==================== File Operations ====================

    /// Saves the document.
    pub fn save(&mut self) -> CoreResult<()> {
        self.buffer.save()?;
        tracing::info!(name = %self.name, "saved document");
        Ok(())
    }

    /// Saves the document to a new path.
    pub fn save_as(&mut self, path: impl AsRef<Path>) -> CoreResult<()> {
        let path = path.as_ref();
        self.buffer.save_as(path)?;
        self.path = Some(path.to_path_buf());
        self.name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("Unknown")
            .to_string();
        self.hint = Self::hint_for(path);
        tracing::info!(path = %path.display(), "saved document");
        Ok(())
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

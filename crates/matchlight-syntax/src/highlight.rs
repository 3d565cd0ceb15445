//! Highlight span emission.
//!
//! The matcher never touches rendering primitives. It hands the host plain
//! spans with a colour pair; the host applies them to its text view and
//! replaces the whole set on the next cursor move.

use matchlight_buffer::TextBuffer;
use serde::{Deserialize, Serialize};

use crate::matcher::{MatchResult, Matcher};
use crate::{SyntaxError, SyntaxResult};

/// Light or dark UI theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn is_dark(self) -> bool {
        matches!(self, Theme::Dark)
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        })
    }
}

impl std::str::FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dark" => Ok(Theme::Dark),
            "light" => Ok(Theme::Light),
            other => Err(format!("unknown theme '{other}' (expected dark or light)")),
        }
    }
}

/// An sRGB colour, serialized as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0x00, 0x00, 0x00);
    pub const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#rrggbb` (the `#` is optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::from_hex(&value).ok_or_else(|| format!("invalid colour '{value}'"))
    }
}

/// Colours applied to a highlighted span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HighlightStyle {
    /// `None` keeps the view's background
    pub background: Option<Color>,
    /// `None` keeps the text's own colour
    pub foreground: Option<Color>,
    /// Extend the background to the full width of the view
    pub full_width: bool,
}

impl HighlightStyle {
    /// Style shared by both spans of a matched pair.
    pub fn matched_pair(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self {
                background: Some(Color::rgb(0x4d, 0x4d, 0x4d)),
                foreground: Some(Color::WHITE),
                full_width: false,
            },
            Theme::Light => Self {
                background: Some(Color::rgb(0xe6, 0xe6, 0xe6)),
                foreground: Some(Color::BLACK),
                full_width: false,
            },
        }
    }

    /// Style of the cursor line.
    pub fn current_line(theme: Theme) -> Self {
        let background = match theme {
            Theme::Dark => Color::rgb(0x2d, 0x2d, 0x2d),
            Theme::Light => Color::rgb(0xf0, 0xf0, 0xf0),
        };
        Self {
            background: Some(background),
            foreground: None,
            full_width: true,
        }
    }

    /// Text colour only, as used for syntax tokens.
    pub const fn text(color: Color) -> Self {
        Self {
            background: None,
            foreground: Some(color),
            full_width: false,
        }
    }
}

/// What a highlight span marks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HighlightKind {
    MatchedPair,
    CurrentLine,
    Keyword,
    Function,
    String,
    Comment,
    Number,
    Class,
}

/// A styled `[start, end)` character range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HighlightSpan {
    pub start: usize,
    pub end: usize,
    pub kind: HighlightKind,
    pub style: HighlightStyle,
}

/// Maps a match to its spans: none, or anchor then partner.
pub fn emit(result: &MatchResult, theme: Theme) -> Vec<HighlightSpan> {
    let Some((anchor, partner)) = result.spans() else {
        return Vec::new();
    };
    let style = HighlightStyle::matched_pair(theme);
    [anchor, partner]
        .into_iter()
        .map(|span| HighlightSpan {
            start: span.start,
            end: span.end,
            kind: HighlightKind::MatchedPair,
            style,
        })
        .collect()
}

/// Computes matched-pair highlights with the default matcher.
///
/// # Example
/// ```
/// use matchlight_buffer::TextBuffer;
/// use matchlight_syntax::{compute_highlights, Theme};
///
/// let buffer = TextBuffer::from("foo(bar)");
/// let spans = compute_highlights(&buffer, 3, ".py", Theme::Dark).unwrap();
/// assert_eq!((spans[0].start, spans[1].start), (3, 7));
/// ```
pub fn compute_highlights(
    buffer: &TextBuffer,
    cursor_offset: usize,
    file_type_hint: &str,
    theme: Theme,
) -> SyntaxResult<Vec<HighlightSpan>> {
    Matcher::default().compute_highlights(buffer, cursor_offset, file_type_hint, theme)
}

/// Full-width highlight of the cursor's line, line terminator excluded.
pub fn current_line_highlight(
    buffer: &TextBuffer,
    cursor_offset: usize,
    theme: Theme,
) -> SyntaxResult<HighlightSpan> {
    let len = buffer.len_chars();
    if cursor_offset > len {
        return Err(SyntaxError::CursorOutOfBounds {
            offset: cursor_offset,
            len,
        });
    }

    let line = buffer.char_to_line(cursor_offset)?;
    let start = buffer.line_to_char(line)?;
    let end = start + buffer.line_content_len(line)?;

    Ok(HighlightSpan {
        start,
        end,
        kind: HighlightKind::CurrentLine,
        style: HighlightStyle::current_line(theme),
    })
}

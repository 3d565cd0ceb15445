//! Rule-based token colouring.
//!
//! Every line is run through an ordered table of patterns. Each hit becomes a
//! text-colour span; where spans overlap, the later one wins, so a number
//! inside a comment keeps the number colour.
//!
//! The table targets Python source and is applied in the dark theme only.

use std::sync::LazyLock;

use matchlight_buffer::TextBuffer;
use regex::Regex;

use crate::highlight::{Color, HighlightKind, HighlightSpan, HighlightStyle, Theme};
use crate::{SyntaxError, SyntaxResult};

const KEYWORDS: [&str; 33] = [
    "and", "as", "assert", "break", "class", "continue", "def", "del", "elif", "else", "except",
    "False", "finally", "for", "from", "global", "if", "import", "in", "is", "lambda", "None",
    "nonlocal", "not", "or", "pass", "raise", "return", "True", "try", "while", "with", "yield",
];

struct TokenRule {
    kind: HighlightKind,
    pattern: Regex,
    color: Color,
}

impl TokenRule {
    fn new(kind: HighlightKind, pattern: &str, color: Color) -> Result<Self, regex::Error> {
        Ok(Self {
            kind,
            pattern: Regex::new(pattern)?,
            color,
        })
    }

    /// Char ranges of every hit in `line`. A rule with a capture group
    /// colours the group only.
    fn hits(&self, line: &str) -> Vec<(usize, usize)> {
        self.pattern
            .captures_iter(line)
            .filter_map(|caps| caps.get(1).or_else(|| caps.get(0)))
            .filter(|m| !m.is_empty())
            .map(|m| (char_offset(line, m.start()), char_offset(line, m.end())))
            .collect()
    }
}

static RULES: LazyLock<Result<Vec<TokenRule>, regex::Error>> = LazyLock::new(build_rules);

fn build_rules() -> Result<Vec<TokenRule>, regex::Error> {
    let keywords = format!(r"\b(?:{})\b", KEYWORDS.join("|"));
    let string = Color::rgb(0xce, 0x91, 0x78);

    Ok(vec![
        TokenRule::new(HighlightKind::Keyword, &keywords, Color::rgb(0xff, 0x6b, 0x9b))?,
        TokenRule::new(
            HighlightKind::Function,
            r"\b([A-Za-z0-9_]+)\(",
            Color::rgb(0xdc, 0xdc, 0xaa),
        )?,
        TokenRule::new(HighlightKind::String, r#"".*?""#, string)?,
        TokenRule::new(HighlightKind::String, r"'.*?'", string)?,
        TokenRule::new(HighlightKind::Comment, r"#.*", Color::rgb(0x6a, 0x99, 0x55))?,
        TokenRule::new(HighlightKind::Number, r"\b[0-9]+\b", Color::rgb(0xb5, 0xce, 0xa8))?,
        TokenRule::new(HighlightKind::Class, r"\bclass\b\s*\w+", Color::rgb(0x4e, 0xc9, 0xb0))?,
    ])
}

fn char_offset(line: &str, byte: usize) -> usize {
    line[..byte].chars().count()
}

/// Colours keywords, calls, strings, comments, numbers and class headers.
///
/// Spans come line by line, in rule order within a line. The light theme
/// gets no token colours.
pub fn highlight_tokens(buffer: &TextBuffer, theme: Theme) -> SyntaxResult<Vec<HighlightSpan>> {
    if !theme.is_dark() {
        return Ok(Vec::new());
    }
    let rules = RULES
        .as_ref()
        .map_err(|err| SyntaxError::Pattern(err.clone()))?;

    let mut spans = Vec::new();
    for line_idx in 0..buffer.len_lines() {
        let line = buffer.line_text(line_idx)?;
        let line_start = buffer.line_to_char(line_idx)?;

        for rule in rules {
            let style = HighlightStyle::text(rule.color);
            spans.extend(rule.hits(&line).into_iter().map(|(start, end)| HighlightSpan {
                start: line_start + start,
                end: line_start + end,
                kind: rule.kind,
                style,
            }));
        }
    }
    Ok(spans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::HighlightKind::*;

    fn tokens(text: &str) -> Vec<(usize, usize, HighlightKind)> {
        highlight_tokens(&TextBuffer::from(text), Theme::Dark)
            .unwrap()
            .into_iter()
            .map(|s| (s.start, s.end, s.kind))
            .collect()
    }

    #[test]
    fn test_keywords_need_word_boundaries() {
        assert_eq!(tokens("if x in y:"), vec![(0, 2, Keyword), (5, 7, Keyword)]);
        assert!(tokens("island = notes").is_empty());
    }

    #[test]
    fn test_function_names_exclude_paren() {
        assert_eq!(tokens("print(len(x))"), vec![(0, 5, Function), (6, 9, Function)]);
        assert!(tokens("print (x)").is_empty());
    }

    #[test]
    fn test_strings_are_shortest() {
        assert_eq!(tokens(r#"s = "a" + 'b'"#), vec![(4, 7, String), (10, 13, String)]);
        assert_eq!(tokens(r#""a" "b""#), vec![(0, 3, String), (4, 7, String)]);
        // Unterminated quotes are not strings
        assert!(tokens(r#"x = "open"#).is_empty());
    }

    #[test]
    fn test_comments_run_to_end_of_line() {
        assert_eq!(
            tokens("x = 1  # note\ny"),
            vec![(7, 13, Comment), (4, 5, Number)]
        );
        // The number rule comes after the comment rule
        assert_eq!(tokens("# 42"), vec![(0, 4, Comment), (2, 4, Number)]);
    }

    #[test]
    fn test_numbers_are_whole_words() {
        assert_eq!(tokens("x1 = 42"), vec![(5, 7, Number)]);
    }

    #[test]
    fn test_class_header_covers_keyword_and_name() {
        assert_eq!(
            tokens("class Foo(Base):"),
            vec![(0, 5, Keyword), (6, 9, Function), (0, 9, Class)]
        );
    }

    #[test]
    fn test_offsets_are_chars_across_lines() {
        assert_eq!(
            tokens("é = 1\nreturn 2"),
            vec![(4, 5, Number), (6, 12, Keyword), (13, 14, Number)]
        );
    }

    #[test]
    fn test_light_theme_has_no_tokens() {
        let buffer = TextBuffer::from("def f(): return 1");
        assert!(highlight_tokens(&buffer, Theme::Light).unwrap().is_empty());
    }

    #[test]
    fn test_token_styles_are_text_only() {
        let spans = highlight_tokens(&TextBuffer::from("def"), Theme::Dark).unwrap();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].style.background, None);
        assert_eq!(spans[0].style.foreground, Color::from_hex("#ff6b9b"));
        assert!(!spans[0].style.full_width);
    }
}

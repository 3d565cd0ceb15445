//! Markup tag matching.
//!
//! ## Limitations
//!
//! The anchor tag is only recognized when it lies entirely on the cursor's
//! line; a tag whose attributes wrap onto the next line is not an anchor.
//! Counterparts, on the other hand, are searched through the whole document.

use std::collections::HashMap;
use std::sync::{LazyLock, Mutex, PoisonError};

use matchlight_buffer::TextBuffer;
use regex::Regex;

use crate::matcher::{MatchResult, Span, TagStrategy};
use crate::SyntaxResult;

const PATTERN_CACHE_LIMIT: usize = 256;

/// Counterpart patterns compiled so far, keyed by pattern text.
static PATTERNS: LazyLock<Mutex<HashMap<String, Regex>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// Compiles `pattern` once and hands out cheap clones afterwards.
fn cached_pattern(pattern: &str) -> SyntaxResult<Regex> {
    let mut cache = PATTERNS.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(regex) = cache.get(pattern) {
        return Ok(regex.clone());
    }

    let regex = Regex::new(pattern)?;
    if cache.len() >= PATTERN_CACHE_LIMIT {
        cache.clear();
    }
    cache.insert(pattern.to_string(), regex.clone());
    Ok(regex)
}

/// A tag surrounding the cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
struct AnchorTag {
    span: Span,
    name: String,
    closing: bool,
}

/// Matches the tag around `cursor` with its counterpart.
pub(crate) fn find_match(
    buffer: &TextBuffer,
    cursor: usize,
    strategy: TagStrategy,
) -> SyntaxResult<MatchResult> {
    let Some(anchor) = anchor_tag(buffer, cursor)? else {
        return Ok(MatchResult::NoMatch);
    };

    let partner = match strategy {
        TagStrategy::Nearest => nearest_counterpart(buffer, &anchor)?,
        TagStrategy::Nested => nested_counterpart(buffer, &anchor)?,
    };

    Ok(match partner {
        Some(partner) => MatchResult::Matched {
            anchor: anchor.span,
            partner,
        },
        None => MatchResult::NoMatch,
    })
}

/// Locates the tag enclosing the cursor on its own line.
fn anchor_tag(buffer: &TextBuffer, cursor: usize) -> SyntaxResult<Option<AnchorTag>> {
    let pos = buffer.char_idx_to_position(cursor)?;
    let line_start = buffer.line_to_char(pos.line)?;
    let line: Vec<char> = buffer.line_text(pos.line)?.chars().collect();
    let column = pos.column.min(line.len());

    // Nearest `<` before the cursor; a `>` first means we're between tags
    let mut start = None;
    for i in (0..column).rev() {
        match line[i] {
            '<' => {
                start = Some(i);
                break;
            }
            '>' => return Ok(None),
            _ => {}
        }
    }
    let Some(start) = start else {
        return Ok(None);
    };

    // Terminating `>` at or after the cursor
    let mut end = None;
    for (i, &c) in line.iter().enumerate().skip(column) {
        match c {
            '>' => {
                end = Some(i);
                break;
            }
            '<' => return Ok(None),
            _ => {}
        }
    }
    let Some(end) = end else {
        return Ok(None);
    };

    let closing = line.get(start + 1) == Some(&'/');
    let inner_start = if closing { start + 2 } else { start + 1 };
    if inner_start > end {
        return Ok(None);
    }
    let inner: String = line[inner_start..end].iter().collect();

    if !closing && inner.trim_end().ends_with('/') {
        // Self-closing tags have no counterpart
        return Ok(None);
    }

    let name = inner
        .split_whitespace()
        .next()
        .unwrap_or("")
        .trim_matches('/');
    if name.is_empty() || name.starts_with(['!', '?']) {
        return Ok(None);
    }

    Ok(Some(AnchorTag {
        span: Span::new(line_start + start, line_start + end + 1),
        name: name.to_string(),
        closing,
    }))
}

/// First-hit search: the nearest `</name>` after an opening tag, or the
/// nearest `<name...>` before a closing tag. Nesting is not considered.
fn nearest_counterpart(buffer: &TextBuffer, anchor: &AnchorTag) -> SyntaxResult<Option<Span>> {
    let text = buffer.text();
    let name = regex::escape(&anchor.name);

    let found = if anchor.closing {
        let pattern = cached_pattern(&format!("<{name}[^>]*>"))?;
        let before = buffer.char_to_byte(anchor.span.start)?;
        pattern
            .find_iter(&text[..before])
            .last()
            .map(|m| (m.start(), m.end()))
    } else {
        let pattern = cached_pattern(&format!("</{name}>"))?;
        let after = buffer.char_to_byte(anchor.span.end)?;
        pattern.find_at(&text, after).map(|m| (m.start(), m.end()))
    };

    found.map(|(s, e)| byte_span(buffer, s, e)).transpose()
}

/// Depth-counted search over tags with the same name.
///
/// `<name>`, `<name attr>` and `</name>` take part; `<name/>` and tags that
/// merely share a prefix (`<names>`) are skipped.
fn nested_counterpart(buffer: &TextBuffer, anchor: &AnchorTag) -> SyntaxResult<Option<Span>> {
    let text = buffer.text();
    let name = regex::escape(&anchor.name);
    let pattern = cached_pattern(&format!(r"<(/?){name}(?:\s[^>]*?)?(/?)>"))?;

    // (start, end, closing) for every same-name tag, self-closing excluded
    let tags = |haystack: &str, offset: usize| -> Vec<(usize, usize, bool)> {
        pattern
            .captures_iter(haystack)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let closing = caps.get(1).is_some_and(|g| !g.is_empty());
                let self_closing = caps.get(2).is_some_and(|g| !g.is_empty());
                (!self_closing).then(|| (offset + whole.start(), offset + whole.end(), closing))
            })
            .collect()
    };

    let mut depth = 0usize;
    let found = if anchor.closing {
        let before = buffer.char_to_byte(anchor.span.start)?;
        let mut found = None;
        for (start, end, closing) in tags(&text[..before], 0).into_iter().rev() {
            if closing {
                depth += 1;
            } else if depth == 0 {
                found = Some((start, end));
                break;
            } else {
                depth -= 1;
            }
        }
        found
    } else {
        let after = buffer.char_to_byte(anchor.span.end)?;
        let mut found = None;
        for (start, end, closing) in tags(&text[after..], after) {
            if !closing {
                depth += 1;
            } else if depth == 0 {
                found = Some((start, end));
                break;
            } else {
                depth -= 1;
            }
        }
        found
    };

    found.map(|(s, e)| byte_span(buffer, s, e)).transpose()
}

fn byte_span(buffer: &TextBuffer, start: usize, end: usize) -> SyntaxResult<Span> {
    Ok(Span::new(buffer.byte_to_char(start)?, buffer.byte_to_char(end)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "<div><span>x</span></div>";

    fn spans(text: &str, cursor: usize, strategy: TagStrategy) -> Option<(Span, Span)> {
        let buffer = TextBuffer::from(text);
        find_match(&buffer, cursor, strategy).unwrap().spans()
    }

    #[test]
    fn test_opening_tags_match_their_closers() {
        for strategy in [TagStrategy::Nearest, TagStrategy::Nested] {
            // inside <div>
            assert_eq!(
                spans(DOC, 2, strategy),
                Some((Span::new(0, 5), Span::new(19, 25)))
            );
            // inside <span>
            assert_eq!(
                spans(DOC, 7, strategy),
                Some((Span::new(5, 11), Span::new(12, 19)))
            );
        }
    }

    #[test]
    fn test_closing_tags_match_their_openers() {
        for strategy in [TagStrategy::Nearest, TagStrategy::Nested] {
            assert_eq!(
                spans(DOC, 22, strategy),
                Some((Span::new(19, 25), Span::new(0, 5)))
            );
            assert_eq!(
                spans(DOC, 14, strategy),
                Some((Span::new(12, 19), Span::new(5, 11)))
            );
        }
    }

    #[test]
    fn test_cursor_outside_tags() {
        // between `>` and `<`
        assert_eq!(spans(DOC, 11, TagStrategy::Nested), None);
        assert_eq!(spans(DOC, 12, TagStrategy::Nested), None);
        // on the `<` itself: nothing before the cursor on the line
        assert_eq!(spans(DOC, 0, TagStrategy::Nested), None);
        assert_eq!(spans(DOC, 25, TagStrategy::Nested), None);
    }

    #[test]
    fn test_same_name_nesting() {
        let doc = "<div><div></div></div>";
        // Nested pairs by depth
        assert_eq!(
            spans(doc, 2, TagStrategy::Nested),
            Some((Span::new(0, 5), Span::new(16, 22)))
        );
        assert_eq!(
            spans(doc, 19, TagStrategy::Nested),
            Some((Span::new(16, 22), Span::new(0, 5)))
        );
        // Nearest takes the first hit, pairing the outer open with the inner close
        assert_eq!(
            spans(doc, 2, TagStrategy::Nearest),
            Some((Span::new(0, 5), Span::new(10, 16)))
        );
        assert_eq!(
            spans(doc, 19, TagStrategy::Nearest),
            Some((Span::new(16, 22), Span::new(5, 10)))
        );
    }

    #[test]
    fn test_attributes_and_prefix_names() {
        let doc = "<ul class=\"a\">\n  <uls></uls>\n</ul>";
        let close = doc.rfind("</ul>").unwrap();
        let (anchor, partner) = spans(doc, 3, TagStrategy::Nested).unwrap();
        assert_eq!(anchor, Span::new(0, 14));
        assert_eq!(partner, Span::new(close, close + 5));

        let (_, opener) = spans(doc, close + 2, TagStrategy::Nested).unwrap();
        assert_eq!(opener, Span::new(0, 14));
    }

    #[test]
    fn test_nearest_opener_search_accepts_prefix_names() {
        // `<name[^>]*>` has no name boundary, so `<uls>` is a hit
        let doc = "<ul><uls>x</ul>";
        let (_, opener) = spans(doc, 12, TagStrategy::Nearest).unwrap();
        assert_eq!(opener, Span::new(4, 9));
    }

    #[test]
    fn test_self_closing_and_special_tags() {
        assert_eq!(spans("<br/><br/>", 2, TagStrategy::Nested), None);
        assert_eq!(spans("<img src=\"a\" />", 3, TagStrategy::Nested), None);
        assert_eq!(spans("<!-- c --><p></p>", 2, TagStrategy::Nested), None);
        assert_eq!(spans("<?xml version=\"1.0\"?>", 3, TagStrategy::Nested), None);
        assert_eq!(spans("<>", 1, TagStrategy::Nested), None);
    }

    #[test]
    fn test_self_closing_tags_do_not_count_for_depth() {
        let doc = "<a><a/></a>";
        assert_eq!(
            spans(doc, 1, TagStrategy::Nested),
            Some((Span::new(0, 3), Span::new(7, 11)))
        );
    }

    #[test]
    fn test_tag_split_across_lines_is_not_an_anchor() {
        let doc = "<div\n  class=\"x\">\n</div>";
        assert_eq!(spans(doc, 2, TagStrategy::Nested), None);
    }

    #[test]
    fn test_counterpart_on_another_line() {
        let doc = "<section>\n  <p>hi</p>\n</section>";
        let close = doc.rfind("</section>").unwrap();
        assert_eq!(
            spans(doc, 4, TagStrategy::Nested),
            Some((Span::new(0, 9), Span::new(close, close + 10)))
        );
    }

    #[test]
    fn test_unclosed_tag_is_no_match() {
        assert_eq!(spans("<div><p>", 2, TagStrategy::Nested), None);
        assert_eq!(spans("<div><p>", 2, TagStrategy::Nearest), None);
    }

    #[test]
    fn test_multibyte_text_offsets_are_chars() {
        let doc = "<b>ä</b>";
        assert_eq!(
            spans(doc, 1, TagStrategy::Nested),
            Some((Span::new(0, 3), Span::new(4, 8)))
        );
    }

    #[test]
    fn test_counterpart_patterns_are_compiled_once() {
        let first = cached_pattern("</cached-tag>").unwrap();
        let second = cached_pattern("</cached-tag>").unwrap();
        assert_eq!(first.as_str(), second.as_str());
        assert!(PATTERNS
            .lock()
            .unwrap()
            .contains_key("</cached-tag>"));
        assert!(cached_pattern("<(").is_err());
    }
}

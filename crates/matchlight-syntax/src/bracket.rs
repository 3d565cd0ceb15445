//! Counted bracket and marker matching.
//!
//! Tokens are compared through [`TextBuffer::starts_with_at`] and
//! [`TextBuffer::ends_with_at`], which never read outside the buffer, so the
//! scans below only need to keep their indices within `[0, len]`.

use matchlight_buffer::TextBuffer;

use crate::delimiter::{DelimiterPair, DelimiterTable};
use crate::matcher::{MatchResult, Span};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Open,
    Close,
}

#[derive(Debug, Clone, Copy)]
struct Anchor {
    span: Span,
    side: Side,
}

/// Matches the delimiter touching `cursor` against `table`.
///
/// The first pair with a delimiter at or before the cursor decides the
/// outcome, even if its partner can't be found.
pub(crate) fn find_match(buffer: &TextBuffer, cursor: usize, table: &DelimiterTable) -> MatchResult {
    for pair in table.candidates() {
        let outcome = if pair.is_symmetric() {
            match_symmetric(buffer, cursor, pair)
        } else {
            find_anchor(buffer, cursor, pair).map(|anchor| {
                let partner = match anchor.side {
                    Side::Open => scan_forward(buffer, anchor.span.end, pair),
                    Side::Close => scan_backward(buffer, anchor.span.start, pair),
                };
                (anchor.span, partner)
            })
        };

        if let Some((anchor, partner)) = outcome {
            return match partner {
                Some(partner) => MatchResult::Matched { anchor, partner },
                None => MatchResult::NoMatch,
            };
        }
    }

    MatchResult::NoMatch
}

/// Finds an asymmetric pair's token at the cursor, then just before it.
fn find_anchor(buffer: &TextBuffer, cursor: usize, pair: &DelimiterPair) -> Option<Anchor> {
    let open_len = token_len(pair.open());
    let close_len = token_len(pair.close());

    if buffer.starts_with_at(cursor, pair.open()) {
        return Some(Anchor {
            span: Span::new(cursor, cursor + open_len),
            side: Side::Open,
        });
    }
    if buffer.starts_with_at(cursor, pair.close()) {
        return Some(Anchor {
            span: Span::new(cursor, cursor + close_len),
            side: Side::Close,
        });
    }
    if buffer.ends_with_at(cursor, pair.open()) {
        return Some(Anchor {
            span: Span::new(cursor - open_len, cursor),
            side: Side::Open,
        });
    }
    if buffer.ends_with_at(cursor, pair.close()) {
        return Some(Anchor {
            span: Span::new(cursor - close_len, cursor),
            side: Side::Close,
        });
    }
    None
}

/// Scans forward from `from` for the close that balances an open.
fn scan_forward(buffer: &TextBuffer, from: usize, pair: &DelimiterPair) -> Option<Span> {
    let len = buffer.len_chars();
    let open_len = token_len(pair.open());
    let close_len = token_len(pair.close());
    let mut depth = 0usize;
    let mut i = from;

    while i < len {
        if buffer.starts_with_at(i, pair.open()) {
            depth += 1;
            i += open_len;
        } else if buffer.starts_with_at(i, pair.close()) {
            if depth == 0 {
                return Some(Span::new(i, i + close_len));
            }
            depth -= 1;
            i += close_len;
        } else {
            i += 1;
        }
    }
    None
}

/// Scans backward from `to` for the open that balances a close.
fn scan_backward(buffer: &TextBuffer, to: usize, pair: &DelimiterPair) -> Option<Span> {
    let open_len = token_len(pair.open());
    let close_len = token_len(pair.close());
    let mut depth = 0usize;
    let mut i = to;

    while i > 0 {
        if buffer.ends_with_at(i, pair.close()) {
            depth += 1;
            i -= close_len;
        } else if buffer.ends_with_at(i, pair.open()) {
            if depth == 0 {
                return Some(Span::new(i - open_len, i));
            }
            depth -= 1;
            i -= open_len;
        } else {
            i -= 1;
        }
    }
    None
}

/// Matches a symmetric marker (`"""`, `` ` ``) by occurrence parity.
///
/// Occurrences are counted left to right without overlap. An anchor must sit
/// exactly on one of them; even occurrences open and pair with the next one,
/// odd occurrences close and pair with the previous one.
fn match_symmetric(
    buffer: &TextBuffer,
    cursor: usize,
    pair: &DelimiterPair,
) -> Option<(Span, Option<Span>)> {
    let token = pair.open();
    let len = token_len(token);

    let mut candidates = Vec::with_capacity(2);
    if buffer.starts_with_at(cursor, token) {
        candidates.push(cursor);
    }
    if buffer.ends_with_at(cursor, token) {
        candidates.push(cursor - len);
    }

    candidates.into_iter().find_map(|start| {
        let index = occurrence_index(buffer, start, token)?;
        let anchor = Span::new(start, start + len);
        let partner = if index % 2 == 0 {
            next_occurrence(buffer, anchor.end, token)
        } else {
            previous_occurrence(buffer, start, token)
        };
        Some((anchor, partner))
    })
}

/// Returns the occurrence index of the marker starting at `target`, or
/// `None` when `target` isn't aligned with the left-to-right tokenization.
fn occurrence_index(buffer: &TextBuffer, target: usize, token: &str) -> Option<usize> {
    let len = token_len(token);
    let mut index = 0;
    let mut i = 0;

    while i <= target {
        if buffer.starts_with_at(i, token) {
            if i == target {
                return Some(index);
            }
            index += 1;
            i += len;
        } else {
            i += 1;
        }
    }
    None
}

fn next_occurrence(buffer: &TextBuffer, from: usize, token: &str) -> Option<Span> {
    let len = token_len(token);
    (from..buffer.len_chars())
        .find(|&i| buffer.starts_with_at(i, token))
        .map(|i| Span::new(i, i + len))
}

/// The occurrence right before `to` in the tokenization.
fn previous_occurrence(buffer: &TextBuffer, to: usize, token: &str) -> Option<Span> {
    let len = token_len(token);
    let mut last = None;
    let mut i = 0;

    while i + len <= to {
        if buffer.starts_with_at(i, token) {
            last = Some(Span::new(i, i + len));
            i += len;
        } else {
            i += 1;
        }
    }
    last
}

fn token_len(token: &str) -> usize {
    token.chars().count()
}

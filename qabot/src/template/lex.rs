//! Splits template source into text runs and action bodies, applying trim
//! markers and dropping comments.

use super::{ParseError, ParseErrorKind};

const LEFT: &str = "{{";
const RIGHT: &str = "}}";

#[derive(Debug, PartialEq, Eq)]
pub(super) enum Item {
    Text(String),
    /// Action body with delimiters, trim markers and outer spaces removed.
    Action { line: usize, body: String },
}

fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

fn is_space_byte(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n')
}

/// `{{- ` : dash followed by whitespace.
fn has_left_trim(after_left: &str) -> bool {
    let b = after_left.as_bytes();
    b.len() >= 2 && b[0] == b'-' && is_space_byte(b[1])
}

/// ` -}}` : whitespace then dash right before the closing delimiter.
fn has_right_trim(raw: &str) -> bool {
    let b = raw.as_bytes();
    b.len() >= 2 && b[b.len() - 1] == b'-' && is_space_byte(b[b.len() - 2])
}

fn line_at(src: &str, byte_pos: usize) -> usize {
    src[..byte_pos].bytes().filter(|&b| b == b'\n').count() + 1
}

pub(super) fn lex(name: &str, src: &str) -> Result<Vec<Item>, ParseError> {
    let err = |line, kind| ParseError {
        name: name.to_string(),
        line,
        kind,
    };

    let mut items = Vec::new();
    let mut pos = 0usize;
    let mut trim_next = false;

    while let Some(rel) = src[pos..].find(LEFT) {
        let open = pos + rel;
        let line = line_at(src, open);

        let mut text = &src[pos..open];
        if trim_next {
            text = text.trim_start_matches(is_space);
        }

        let after = &src[open + LEFT.len()..];
        let left_trim = has_left_trim(after);
        if left_trim {
            text = text.trim_end_matches(is_space);
        }
        if !text.is_empty() {
            items.push(Item::Text(text.to_string()));
        }

        let inner_start = open + LEFT.len() + if left_trim { 2 } else { 0 };
        let inner = &src[inner_start..];

        let (consumed, right_trim) = if inner.starts_with("/*") {
            let close = inner
                .find("*/")
                .ok_or_else(|| err(line, ParseErrorKind::UnclosedComment))?;
            let tail = &inner[close + 2..];
            if tail.starts_with(RIGHT) {
                (close + 2 + RIGHT.len(), false)
            } else if tail.len() >= 4
                && is_space_byte(tail.as_bytes()[0])
                && tail[1..].starts_with("-}}")
            {
                (close + 2 + 4, true)
            } else {
                return Err(err(line, ParseErrorKind::UnclosedComment));
            }
        } else {
            let close = inner
                .find(RIGHT)
                .ok_or_else(|| err(line, ParseErrorKind::UnclosedAction))?;
            let raw = &inner[..close];
            let right_trim = has_right_trim(raw);
            let raw = if right_trim { &raw[..raw.len() - 1] } else { raw };
            items.push(Item::Action {
                line,
                body: raw.trim_matches(is_space).to_string(),
            });
            (close + RIGHT.len(), right_trim)
        };

        pos = inner_start + consumed;
        trim_next = right_trim;
    }

    let mut tail = &src[pos..];
    if trim_next {
        tail = tail.trim_start_matches(is_space);
    }
    if !tail.is_empty() {
        items.push(Item::Text(tail.to_string()));
    }
    Ok(items)
}

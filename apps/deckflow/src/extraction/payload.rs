//! Payload isolation — finds the structured region inside free-form model output.
//!
//! Models wrap the payload in prose ("Sure, here is the result: ... Let me know if"),
//! markdown fences, or both. Nothing outside the isolated region is ever parsed.

use crate::extraction::fields::matches_any;
use crate::extraction::tag_payload::{tokenize, Token};

/// A candidate region, as byte offsets into the original text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub start: usize,
    pub end: usize,
}

impl Region {
    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start..self.end]
    }
}

/// Result of scanning for a JSON object from some offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonScan {
    /// A `{` with a matching `}`.
    Found(Region),
    /// A `{` whose closing brace never arrives (truncated output).
    Unbalanced { start: usize },
    /// No `{` at or after the offset.
    NoBrace,
}

/// Finds the first `{` at or after `from` and its matching `}`.
///
/// Brace counting is string-aware: braces inside JSON string literals (formula text,
/// set notation) and escaped quotes do not count.
pub fn scan_json(text: &str, from: usize) -> JsonScan {
    let Some(offset) = text.get(from..).and_then(|rest| rest.find('{')) else {
        return JsonScan::NoBrace;
    };
    let start = from + offset;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    // Delimiters are ASCII, so byte iteration never splits a multi-byte character.
    for (i, &b) in text.as_bytes()[start..].iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return JsonScan::Found(Region {
                        start,
                        end: start + i + 1,
                    });
                }
            }
            _ => {}
        }
    }
    JsonScan::Unbalanced { start }
}

/// Finds the outermost root tag (name matched against `root_names`, case-insensitively)
/// and its matching close tag. Nested tags with the same name are counted, so the
/// region ends at the close that balances the first open.
///
/// Returns `None` if no root tag opens, or if it never closes.
pub fn find_tag_region(text: &str, root_names: &[String]) -> Option<Region> {
    let mut open: Option<(usize, String)> = None;
    let mut depth = 0usize;

    for token in tokenize(text) {
        let Some((root_start, root_name)) = open.as_ref() else {
            if let Token::Open { name, start, self_closing: false, .. } = token {
                if matches_any(root_names, &name) {
                    open = Some((start, name));
                    depth = 1;
                }
            }
            continue;
        };
        match token {
            Token::Open { name, self_closing: false, .. } if name == *root_name => depth += 1,
            Token::Close { name, end, .. } if name == *root_name => {
                depth -= 1;
                if depth == 0 {
                    return Some(Region {
                        start: *root_start,
                        end,
                    });
                }
            }
            _ => {}
        }
    }
    None
}

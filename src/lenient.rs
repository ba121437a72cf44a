//! Tolerant reading of script-flavoured JSON exports.
//!
//! Some EPrints exports are valid JavaScript array literals but not valid
//! JSON: raw newlines and tabs inside strings, `\'` and `\xHH` escapes,
//! single-quoted strings, trailing commas, a trailing `;`. The body is never
//! evaluated. Instead [`sanitize`] rewrites exactly those constructs into
//! their JSON equivalents and the result goes through `serde_json`.

use crate::models::PublicationRecord;
use crate::utils::looks_truncated;
use serde_json::Value;
use std::borrow::Cow;
use tracing::debug;

/// Why a body could not be turned into records.
#[derive(Debug, Clone, PartialEq)]
pub struct LenientError {
    pub reason: String,
    pub truncated: bool,
}

/// Parse a response body into publication records.
///
/// The document must be an array whose elements are all objects.
pub fn parse_records(body: &str) -> Result<Vec<PublicationRecord>, LenientError> {
    let cleaned = sanitize(body);
    if let Cow::Owned(_) = cleaned {
        debug!(
            original_bytes = body.len(),
            cleaned_bytes = cleaned.len(),
            "Body needed sanitizing before JSON parse"
        );
    }

    let value: Value = serde_json::from_str(&cleaned).map_err(|e| LenientError {
        reason: e.to_string(),
        truncated: looks_truncated(&e),
    })?;

    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(LenientError {
                reason: format!("expected an array of records, found {}", kind_of(&other)),
                truncated: false,
            });
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::Object(map) => Ok(PublicationRecord::from(map)),
            other => Err(LenientError {
                reason: format!("record {i} is {}, expected an object", kind_of(&other)),
                truncated: false,
            }),
        })
        .collect()
}

/// Rewrite script-literal quirks into strict JSON.
///
/// Returns the input unchanged (borrowed) when nothing needed fixing.
pub fn sanitize(body: &str) -> Cow<'_, str> {
    let trimmed = body.trim_start_matches('\u{feff}').trim();
    let trimmed = trimmed.strip_suffix(';').map_or(trimmed, str::trim_end);

    let mut out = String::with_capacity(trimmed.len() + 16);
    let mut chars = trimmed.chars().peekable();
    let mut changed = trimmed.len() != body.len();

    while let Some(c) = chars.next() {
        match c {
            '"' | '\'' => {
                changed |= c == '\'';
                out.push('"');
                changed |= copy_string(&mut chars, c, &mut out);
                out.push('"');
            }
            ',' => {
                let mut ahead = chars.clone();
                while ahead.next_if(|c| c.is_whitespace()).is_some() {}
                if matches!(ahead.peek(), Some(']') | Some('}')) {
                    changed = true;
                } else {
                    out.push(',');
                }
            }
            _ => out.push(c),
        }
    }

    if changed { Cow::Owned(out) } else { Cow::Borrowed(trimmed) }
}

/// Copy the body of a string literal (opening quote already consumed) as a
/// JSON string body, consuming the closing quote. Returns whether anything
/// was rewritten.
fn copy_string<I>(chars: &mut std::iter::Peekable<I>, quote: char, out: &mut String) -> bool
where
    I: Iterator<Item = char> + Clone,
{
    let mut changed = false;
    while let Some(c) = chars.next() {
        match c {
            c if c == quote => return changed,
            '\\' => changed |= copy_escape(chars, out),
            '"' => {
                // Only reachable inside a single-quoted literal.
                out.push_str("\\\"");
                changed = true;
            }
            c if (c as u32) < 0x20 => {
                push_control(c, out);
                changed = true;
            }
            c => out.push(c),
        }
    }
    // Unterminated literal; leave it for serde_json to report.
    changed
}

fn copy_escape<I>(chars: &mut std::iter::Peekable<I>, out: &mut String) -> bool
where
    I: Iterator<Item = char> + Clone,
{
    let Some(c) = chars.next() else {
        out.push('\\');
        return false;
    };
    match c {
        '"' | '\\' | '/' | 'b' | 'f' | 'n' | 'r' | 't' => {
            out.push('\\');
            out.push(c);
            false
        }
        'u' => {
            let mut ahead = chars.clone();
            let hex: String = (0..4).filter_map(|_| ahead.next_if(char::is_ascii_hexdigit)).collect();
            if hex.len() == 4 {
                out.push_str("\\u");
                out.push_str(&hex);
                *chars = ahead;
                false
            } else {
                out.push('u');
                true
            }
        }
        'x' => {
            let mut ahead = chars.clone();
            let hex: String = (0..2).filter_map(|_| ahead.next_if(char::is_ascii_hexdigit)).collect();
            if hex.len() == 2 {
                out.push_str("\\u00");
                out.push_str(&hex);
                *chars = ahead;
            } else {
                out.push('x');
            }
            true
        }
        '0' if !chars.peek().is_some_and(char::is_ascii_digit) => {
            out.push_str("\\u0000");
            true
        }
        'v' => {
            out.push_str("\\u000b");
            true
        }
        // Line continuation.
        '\n' | '\u{2028}' | '\u{2029}' => true,
        '\r' => {
            chars.next_if_eq(&'\n');
            true
        }
        c if (c as u32) < 0x20 => {
            push_control(c, out);
            true
        }
        c => {
            out.push(c);
            true
        }
    }
}

fn push_control(c: char, out: &mut String) {
    match c {
        '\n' => out.push_str("\\n"),
        '\r' => out.push_str("\\r"),
        '\t' => out.push_str("\\t"),
        c => out.push_str(&format!("\\u{:04x}", c as u32)),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

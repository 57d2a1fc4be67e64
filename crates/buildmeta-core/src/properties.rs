//! Reader for Java-style `.properties` files.
//!
//! Covers what build agents write: `#`/`!` comments, `=`, `:` or whitespace
//! separators, backslash line continuation and the `\t \n \r \f \uXXXX`
//! escapes. Files are decoded as ISO-8859-1.

use std::collections::HashMap;
use std::path::Path;

use crate::error::{BuildMetaError, Result};

const WHITESPACE: [char; 3] = [' ', '\t', '\x0c'];

/// Read and parse a properties file.
pub fn read_properties_file(path: &Path) -> Result<HashMap<String, String>> {
    let bytes = std::fs::read(path)?;
    let text: String = bytes.iter().map(|&b| b as char).collect();
    parse(&text)
}

/// Parse properties text into a key/value map. Later keys win.
pub fn parse(text: &str) -> Result<HashMap<String, String>> {
    let mut props = HashMap::new();
    let mut lines = physical_lines(text).enumerate();

    while let Some((idx, raw)) = lines.next() {
        let line = raw.trim_start_matches(WHITESPACE);
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }

        let mut logical = line.to_string();
        while ends_with_continuation(&logical) {
            logical.pop();
            match lines.next() {
                Some((_, next)) => logical.push_str(next.trim_start_matches(WHITESPACE)),
                None => break,
            }
        }

        let (key, value) = split_key_value(&logical);
        let line_no = idx + 1;
        props.insert(unescape(key, line_no)?, unescape(value, line_no)?);
    }

    Ok(props)
}

/// Lines end at `\n`, `\r\n` or a lone `\r`.
fn physical_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n')
        .flat_map(|line| line.strip_suffix('\r').unwrap_or(line).split('\r'))
}

/// An odd number of trailing backslashes continues the line.
fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|c| *c == '\\').count() % 2 == 1
}

fn split_key_value(line: &str) -> (&str, &str) {
    let mut escaped = false;
    let mut key_end = line.len();
    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' => {
                key_end = i;
                break;
            }
            c if WHITESPACE.contains(&c) => {
                key_end = i;
                break;
            }
            _ => {}
        }
    }

    let key = &line[..key_end];
    let rest = line[key_end..].trim_start_matches(WHITESPACE);
    let rest = rest
        .strip_prefix('=')
        .or_else(|| rest.strip_prefix(':'))
        .unwrap_or(rest);
    (key, rest.trim_start_matches(WHITESPACE))
}

fn unescape(s: &str, line: usize) -> Result<String> {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\x0c'),
            Some('u') => {
                let mut code = hex4(&mut chars).ok_or_else(|| malformed_unicode(s, line))?;
                if (0xD800..=0xDBFF).contains(&code) {
                    // Combine with a following low surrogate escape.
                    let mut ahead = chars.clone();
                    if ahead.next() == Some('\\') && ahead.next() == Some('u') {
                        let low = hex4(&mut ahead).filter(|c| (0xDC00..=0xDFFF).contains(c));
                        if let Some(low) = low {
                            code = 0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00);
                            chars = ahead;
                        }
                    }
                }
                out.push(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
            }
            Some(other) => out.push(other),
            None => {}
        }
    }
    Ok(out)
}

/// Four hex digits of a `\u` escape.
fn hex4(chars: &mut std::str::Chars<'_>) -> Option<u32> {
    let hex: String = chars.by_ref().take(4).collect();
    if hex.len() != 4 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(&hex, 16).ok()
}

fn malformed_unicode(s: &str, line: usize) -> BuildMetaError {
    BuildMetaError::InvalidProperty {
        line,
        reason: format!("malformed \\u escape in `{s}`"),
    }
}

/// Utility functions for string processing, particularly quote- and nesting-aware SQL scanning
use crate::result::{LoaderError, Result};

/// Check if `s` starts with `prefix`, ignoring ASCII case
pub fn starts_with_ignore_case(s: &str, prefix: &str) -> bool {
    s.len() >= prefix.len()
        && s.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

/// Find an ASCII keyword at or after `from` as a whole word, ignoring case.
/// Text inside single-quoted strings and double-quoted identifiers never matches;
/// `from` must lie outside quoted text.
pub fn find_keyword(s: &str, keyword: &str, from: usize) -> Option<usize> {
    let bytes = s.as_bytes();
    let needle = keyword.as_bytes();
    let is_word = |b: u8| b.is_ascii_alphanumeric() || b == b'_';
    if needle.is_empty() {
        return None;
    }

    let mut in_single = false;
    let mut in_double = false;
    let mut i = from;
    while i < bytes.len() {
        let c = bytes[i];
        let next = bytes.get(i + 1).copied();

        if in_single {
            if c == b'\'' {
                if next == Some(b'\'') {
                    i += 1;
                } else {
                    in_single = false;
                }
            }
        } else if in_double {
            if c == b'"' {
                if next == Some(b'"') {
                    i += 1;
                } else {
                    in_double = false;
                }
            }
        } else if c == b'\'' {
            in_single = true;
        } else if c == b'"' {
            in_double = true;
        } else if bytes.len() - i >= needle.len()
            && bytes[i..i + needle.len()].eq_ignore_ascii_case(needle)
        {
            let end = i + needle.len();
            let before_ok = i == 0 || !is_word(bytes[i - 1]);
            let after_ok = end == bytes.len() || !is_word(bytes[end]);
            if before_ok && after_ok {
                return Some(i);
            }
        }
        i += 1;
    }
    None
}

/// Return the byte position of the `)` matching the `(` at `open`.
/// Parentheses inside single-quoted strings and double-quoted identifiers are ignored,
/// and `''` / `""` inside them are escapes rather than terminators.
pub fn find_matching_paren(s: &str, open: usize) -> Result<usize> {
    let bytes = s.as_bytes();
    if bytes.get(open) != Some(&b'(') {
        return Err(LoaderError::UnbalancedParentheses { position: open });
    }

    let mut depth = 0usize;
    let mut in_single = false;
    let mut in_double = false;
    let mut i = open;
    while i < bytes.len() {
        let c = bytes[i];
        let next = bytes.get(i + 1).copied();

        if !in_double && c == b'\'' {
            if in_single {
                if next == Some(b'\'') {
                    i += 1;
                } else {
                    in_single = false;
                }
            } else {
                in_single = true;
            }
        } else if !in_single && c == b'"' {
            if in_double {
                if next == Some(b'"') {
                    i += 1;
                } else {
                    in_double = false;
                }
            } else {
                in_double = true;
            }
        } else if !in_single && !in_double {
            if c == b'(' {
                depth += 1;
            } else if c == b')' {
                depth -= 1;
                if depth == 0 {
                    return Ok(i);
                }
            }
        }
        i += 1;
    }

    Err(LoaderError::UnbalancedParentheses { position: open })
}

/// Return the byte position of the `'` closing the string literal opened at `open`,
/// skipping `''` escapes. `None` when the literal is not terminated.
pub fn find_matching_quote(s: &str, open: usize) -> Option<usize> {
    let bytes = s.as_bytes();
    if bytes.get(open) != Some(&b'\'') {
        return None;
    }
    let mut i = open + 1;
    while i < bytes.len() {
        if bytes[i] == b'\'' {
            if bytes.get(i + 1) == Some(&b'\'') {
                i += 2;
                continue;
            }
            return Some(i);
        }
        i += 1;
    }
    None
}

/// Split a comma-separated region into trimmed top-level items.
///
/// Commas nested in parentheses or inside single-quoted strings do not split. Inside a
/// string every character is copied verbatim, double quotes included: a value list
/// holds data literals, not identifiers, so `"` opens no region here.
pub fn split_top_level(region: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut in_single = false;
    let mut depth = 0usize;
    let mut chars = region.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\'' {
            current.push(c);
            if in_single {
                if chars.peek() == Some(&'\'') {
                    current.push('\'');
                    chars.next();
                } else {
                    in_single = false;
                }
            } else {
                in_single = true;
            }
            continue;
        }

        if in_single {
            current.push(c);
            continue;
        }

        match c {
            '(' => {
                depth += 1;
                current.push(c);
            }
            ')' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            ',' if depth == 0 => {
                items.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }

    if !current.is_empty() {
        items.push(current.trim().to_string());
    }

    items
}

/// Split a column list into trimmed identifiers.
///
/// The counterpart of [`split_top_level`] for identifier lists: a double-quoted name
/// (with `""` escapes) is opaque, so commas or apostrophes inside it do not split, while
/// `'` is plain text.
pub fn split_identifier_list(region: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut in_double = false;
    let mut chars = region.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                current.push(c);
                if in_double && chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_double = !in_double;
                }
            }
            ',' if !in_double => {
                items.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }

    if !current.is_empty() {
        items.push(current.trim().to_string());
    }

    items
}

/// Strip the double quotes around an identifier, turning `""` back into `"`
pub fn unquote_identifier(s: &str) -> String {
    let t = s.trim();
    if t.len() >= 2 && t.starts_with('"') && t.ends_with('"') {
        t[1..t.len() - 1].replace("\"\"", "\"")
    } else {
        t.to_string()
    }
}

/// Strip the single quotes around a string literal, turning `''` back into `'`.
/// Returns `None` when `s` is not a quoted literal.
pub fn unquote_string(s: &str) -> Option<String> {
    let t = s.trim();
    if t.len() >= 2 && t.starts_with('\'') && t.ends_with('\'') {
        Some(t[1..t.len() - 1].replace("''", "'"))
    } else {
        None
    }
}

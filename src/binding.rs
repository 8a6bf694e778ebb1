use crate::{
    literal::classify_value,
    result::Result,
    rewriter::locate_values_list,
    str_utils::{find_matching_quote, split_top_level},
};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Typed value handed to a statement executor in place of a literal
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    Null,
    Timestamp(NaiveDateTime),
    Date(NaiveDate),
    Text(String),
    /// Text too large for an inline literal, to be streamed as a large object
    LargeText(String),
    Long(i64),
    Double(f64),
}

/// Thresholds above which a string literal cannot be inlined in a statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LargeLiteralPolicy {
    /// Maximum UTF-8 byte length of an inline string
    pub max_inline_bytes: usize,
    /// Maximum character length of an inline string
    pub max_inline_chars: usize,
}

impl Default for LargeLiteralPolicy {
    fn default() -> Self {
        LargeLiteralPolicy {
            max_inline_bytes: 4000,
            max_inline_chars: 2000,
        }
    }
}

impl LargeLiteralPolicy {
    pub fn is_oversized(&self, text: &str) -> bool {
        text.len() > self.max_inline_bytes || text.chars().count() > self.max_inline_chars
    }
}

/// Check whether any single-quoted literal in `sql` exceeds the inline limits.
/// Double-quoted identifiers are skipped, apostrophes in them open no literal.
pub fn contains_large_string_literal(sql: &str, policy: &LargeLiteralPolicy) -> bool {
    let bytes = sql.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'"' => {
                i += 1;
                while i < bytes.len() {
                    if bytes[i] == b'"' {
                        if bytes.get(i + 1) == Some(&b'"') {
                            i += 1;
                        } else {
                            break;
                        }
                    }
                    i += 1;
                }
                i += 1;
            }
            b'\'' => {
                let Some(close) = find_matching_quote(sql, i) else {
                    return false;
                };
                if policy.is_oversized(&sql[i + 1..close]) {
                    return true;
                }
                i = close + 1;
            }
            _ => i += 1,
        }
    }
    false
}

/// INSERT rewritten with `?` placeholders plus the bindings for them, in order
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedInsert {
    pub sql: String,
    pub bindings: Vec<Binding>,
}

/// Turn the VALUES list of an INSERT into placeholders and typed bindings.
/// Text following the VALUES list is not carried over.
pub fn prepare_insert(sql: &str, policy: &LargeLiteralPolicy) -> Result<PreparedInsert> {
    let layout = locate_values_list(sql, 0)?;
    let before_values = &sql[..layout.keyword];

    let values = split_top_level(&sql[layout.open + 1..layout.close]);
    let bindings = values
        .iter()
        .map(|v| classify_value(v, policy))
        .collect::<Result<Vec<_>>>()?;

    let placeholders = vec!["?"; bindings.len()].join(", ");
    Ok(PreparedInsert {
        sql: format!("{before_values}VALUES ({placeholders})"),
        bindings,
    })
}

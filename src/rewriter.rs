//! Structural INSERT rewriting: removal of one column and its positional value.
//!
//! Only the shape `INSERT INTO <table> (col, ...) VALUES (val, ...) [trailing]` is
//! understood. The lists are located with quote-aware parenthesis matching. Column names
//! are split with double-quoted names kept whole, values at top-level commas, so values
//! keep their original text (`NULL`, `DATE '...'`, `TO_TIMESTAMP(...)`, strings with
//! embedded commas) untouched.

use crate::result::{LoaderError, Result};
use crate::str_utils::{
    find_keyword, find_matching_paren, split_identifier_list, split_top_level, unquote_identifier,
};
use once_cell::sync::Lazy;
use regex::Regex;

// Regex compiled once as a lazy static for performance
static INSERT_INTO_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^INSERT\s+INTO\b").unwrap());

// DATE literals carrying a time of day, which downstream must treat as timestamps
static DATE_TIME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bDATE '(\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}(?:\.\d+)?)'").unwrap()
});

/// Byte offsets of the column and value lists of an INSERT statement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertLayout {
    /// Position of the `(` opening the column list
    pub columns_open: usize,
    /// Position of the `)` closing the column list
    pub columns_close: usize,
}

/// Locate the column list of an `INSERT INTO` statement.
/// Returns `Ok(None)` when the statement is not an `INSERT INTO`.
pub fn locate_column_list(sql: &str, column: &str) -> Result<Option<InsertLayout>> {
    let Some(m) = INSERT_INTO_REGEX.find(sql) else {
        return Ok(None);
    };
    let columns_open =
        open_paren_after_table(sql, m.end()).ok_or_else(|| LoaderError::MissingColumnList {
            column: column.to_string(),
        })?;
    let columns_close = find_matching_paren(sql, columns_open)?;
    Ok(Some(InsertLayout {
        columns_open,
        columns_close,
    }))
}

/// Find the first `(` after INTO, skipping over double-quoted table identifiers
fn open_paren_after_table(sql: &str, from: usize) -> Option<usize> {
    let bytes = sql.as_bytes();
    let mut in_double = false;
    let mut i = from;
    while i < bytes.len() {
        match bytes[i] {
            b'"' if in_double && bytes.get(i + 1) == Some(&b'"') => i += 1,
            b'"' => in_double = !in_double,
            b'(' if !in_double => return Some(i),
            _ => {}
        }
        i += 1;
    }
    None
}

/// Byte offsets of the VALUES clause of an INSERT statement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValuesLayout {
    /// Position of the VALUES keyword
    pub keyword: usize,
    /// Position of the `(` opening the value list
    pub open: usize,
    /// Position of the `)` closing the value list
    pub close: usize,
}

/// Locate the parenthesized value list following the VALUES keyword at or after `from`
pub fn locate_values_list(sql: &str, from: usize) -> Result<ValuesLayout> {
    let keyword = find_keyword(sql, "VALUES", from)
        .ok_or_else(|| LoaderError::MissingValuesClause(sql.to_string()))?;
    let open = sql[keyword..]
        .find('(')
        .map(|offset| keyword + offset)
        .ok_or_else(|| LoaderError::MissingValuesList(sql.to_string()))?;
    let close = find_matching_paren(sql, open)?;
    Ok(ValuesLayout {
        keyword,
        open,
        close,
    })
}

/// Remove `column` (case-insensitive, quoted or bare) and its positional value from an
/// INSERT statement.
///
/// Statements that are not `INSERT INTO` come back trimmed but otherwise unchanged. When
/// the column is absent the statement is returned with only DATE literal normalization
/// applied. Missing landmarks and column/value count mismatches are structural errors.
pub fn remove_column(insert_sql: &str, column: &str) -> Result<String> {
    let sql = insert_sql.trim();
    let Some(layout) = locate_column_list(sql, column)? else {
        return Ok(sql.to_string());
    };

    let mut columns = split_identifier_list(&sql[layout.columns_open + 1..layout.columns_close]);
    let target = column.to_lowercase();
    let Some(remove_at) = columns
        .iter()
        .position(|c| unquote_identifier(c).to_lowercase() == target)
    else {
        return Ok(normalize_date_literals(sql));
    };

    let values_layout = locate_values_list(sql, layout.columns_close)?;
    let mut values = split_top_level(&sql[values_layout.open + 1..values_layout.close]);

    if values.len() != columns.len() {
        return Err(LoaderError::ColumnValueCountMismatch {
            columns: columns.len(),
            values: values.len(),
        });
    }

    columns.remove(remove_at);
    values.remove(remove_at);

    let prefix = sql[..layout.columns_open].trim();
    let trailing = sql[values_layout.close + 1..].trim();
    let mut rewritten = format!(
        "{prefix} ({}) VALUES ({})",
        columns.join(", "),
        values.join(", ")
    );
    if !trailing.is_empty() {
        rewritten.push(' ');
        rewritten.push_str(trailing);
    }

    Ok(normalize_date_literals(&rewritten))
}

/// Rewrite `DATE '<yyyy-MM-dd HH:mm:ss[.f]>'` literals to `TIMESTAMP '<same text>'`
pub fn normalize_date_literals(sql: &str) -> String {
    DATE_TIME_REGEX
        .replace_all(sql, "TIMESTAMP '$1'")
        .into_owned()
}

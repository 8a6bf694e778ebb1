//! Surface-syntax classification of a single VALUES item.

use crate::binding::{Binding, LargeLiteralPolicy};
use crate::result::{LoaderError, Result};
use crate::str_utils::{split_top_level, starts_with_ignore_case, unquote_string};
use crate::timestamp::{self, CanonicalTimestamp, MONTH_UNIT_MARKER};

/// Numeric literal, integral unless the text carries a decimal point
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Integer(i64),
    Double(f64),
}

/// A value expression classified by its surface syntax
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    /// `DATE '<text>'`, holding the text between the quotes
    Date(String),
    /// `TIMESTAMP '<text>'`, holding the text between the quotes
    Timestamp(String),
    /// `TO_TIMESTAMP('<value>', '<format>'[, '<nls>'])` with unquoted arguments
    ToTimestamp {
        value: String,
        format: String,
        nls: Option<String>,
    },
    /// Single-quoted string with `''` unescaped
    QuotedString(String),
    Number(Number),
    /// Anything else, bound verbatim
    Other(String),
}

impl Literal {
    /// Classify one value token. First match wins:
    /// `NULL`, `DATE '`, `TIMESTAMP '`, `TO_TIMESTAMP(`, quoted string, decimal, integer.
    pub fn classify(token: &str) -> Result<Literal> {
        let v = token.trim();

        if v.eq_ignore_ascii_case("NULL") {
            return Ok(Literal::Null);
        }
        if starts_with_ignore_case(v, "DATE '") {
            return Ok(Literal::Date(quoted_body(&v["DATE".len()..])));
        }
        if starts_with_ignore_case(v, "TIMESTAMP '") {
            return Ok(Literal::Timestamp(quoted_body(&v["TIMESTAMP".len()..])));
        }
        if starts_with_ignore_case(v, "TO_TIMESTAMP(") {
            return parse_to_timestamp_call(v);
        }
        if let Some(text) = unquote_string(v) {
            return Ok(Literal::QuotedString(text));
        }
        if v.contains('.') {
            if let Ok(d) = v.parse::<f64>() {
                return Ok(Literal::Number(Number::Double(d)));
            }
        } else if let Ok(i) = v.parse::<i64>() {
            return Ok(Literal::Number(Number::Integer(i)));
        }
        Ok(Literal::Other(v.to_string()))
    }

    /// Interpret the literal as a typed binding, parsing temporal text
    pub fn to_binding(&self, policy: &LargeLiteralPolicy) -> Result<Binding> {
        let binding = match self {
            Literal::Null => Binding::Null,
            Literal::Date(text) => match timestamp::parse_date_time(text) {
                Some(ts) => Binding::Timestamp(ts),
                None => timestamp::parse_date(text)
                    .map(Binding::Date)
                    .ok_or_else(|| LoaderError::UnparseableDate(text.clone()))?,
            },
            Literal::Timestamp(text) => Binding::Timestamp(timestamp_literal_value(text)?),
            Literal::ToTimestamp { value, format, nls } => {
                Binding::Timestamp(to_timestamp_value(value, format, nls.as_deref())?)
            }
            Literal::QuotedString(text) if policy.is_oversized(text) => {
                Binding::LargeText(text.clone())
            }
            Literal::QuotedString(text) => Binding::Text(text.clone()),
            Literal::Number(Number::Integer(i)) => Binding::Long(*i),
            Literal::Number(Number::Double(d)) => Binding::Double(*d),
            Literal::Other(text) => Binding::Text(text.clone()),
        };
        Ok(binding)
    }
}

/// Classify a value token and bind it in one step
pub fn classify_value(token: &str, policy: &LargeLiteralPolicy) -> Result<Binding> {
    Literal::classify(token)?.to_binding(policy)
}

/// Text between the quotes of `'...'`, tolerating a missing closing quote
fn quoted_body(rest: &str) -> String {
    let rest = rest.trim();
    let rest = rest.strip_prefix('\'').unwrap_or(rest);
    rest.strip_suffix('\'').unwrap_or(rest).to_string()
}

fn parse_to_timestamp_call(call: &str) -> Result<Literal> {
    let malformed = || LoaderError::MalformedFunctionCall(call.to_string());

    let open = call.find('(').ok_or_else(malformed)?;
    let close = call.rfind(')').filter(|&c| c > open).ok_or_else(malformed)?;
    let args = split_top_level(&call[open + 1..close]);
    if args.len() < 2 || args.len() > 3 {
        return Err(malformed());
    }

    let mut unquoted = args.iter().map(|a| unquote_string(a));
    let value = unquoted.next().flatten().ok_or_else(malformed)?;
    let format = unquoted.next().flatten().ok_or_else(malformed)?;
    let nls = match unquoted.next() {
        Some(arg) => Some(arg.ok_or_else(malformed)?),
        None => None,
    };

    Ok(Literal::ToTimestamp { value, format, nls })
}

/// ISO-like text first, then date only, then the localized month-name form
fn timestamp_literal_value(text: &str) -> Result<CanonicalTimestamp> {
    if let Some(ts) = timestamp::parse_date_time(text) {
        return Ok(ts);
    }
    if let Some(date) = timestamp::parse_date(text) {
        return Ok(date.and_time(chrono::NaiveTime::MIN));
    }
    timestamp::parse_localized_month(text)
}

fn to_timestamp_value(value: &str, format: &str, nls: Option<&str>) -> Result<CanonicalTimestamp> {
    let chinese_nls = nls.is_some_and(|n| n.to_uppercase().contains("CHINESE"));
    if format.to_uppercase().contains("MON") && (value.contains(MONTH_UNIT_MARKER) || chinese_nls)
    {
        timestamp::parse_localized_month(value)
    } else {
        timestamp::parse_date_time(value)
            .ok_or_else(|| LoaderError::UnparseableTimestamp(value.to_string()))
    }
}

//! Calendar and time-of-day parsing for temporal literals.
//!
//! Two families of text are understood: the locale-neutral `yyyy-MM-dd HH:mm:ss[.f]`
//! form (with `T` accepted as separator) and the localized month-name form produced by
//! Chinese NLS settings, e.g. `19-8月 -25 10.30.00.000000000 下午`.

use crate::result::{LoaderError, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use once_cell::sync::Lazy;
use regex::Regex;

/// Locale-independent instant produced from a temporal literal
pub type CanonicalTimestamp = NaiveDateTime;

/// Marker following the month number in the localized form
pub const MONTH_UNIT_MARKER: &str = "月";
/// Morning marker of the localized 12-hour clock
pub const MORNING_MARKER: &str = "上午";
/// Afternoon marker of the localized 12-hour clock
pub const AFTERNOON_MARKER: &str = "下午";

const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";
const DATE_FORMAT: &str = "%Y-%m-%d";

// day-month-year hour.minute.second[.fraction], year as RR or yyyy
static LOCALIZED_SKELETON_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2})-(\d{1,2})-(\d{4}|\d{2}) (\d{1,2})\.(\d{1,2})\.(\d{1,2})(?:\.(\d{1,9}))?$")
        .unwrap()
});

static WHITESPACE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static DASH_SPACING_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*-\s*").unwrap());

/// Parse `yyyy-MM-dd HH:mm:ss[.fraction]`; a `T` between date and time is accepted
pub fn parse_date_time(text: &str) -> Option<CanonicalTimestamp> {
    let text = text.trim();
    let normalized = match text.find('T') {
        Some(pos) => {
            let mut s = text.to_string();
            s.replace_range(pos..pos + 1, " ");
            s
        }
        None => text.to_string(),
    };
    NaiveDateTime::parse_from_str(&normalized, DATE_TIME_FORMAT).ok()
}

/// Parse a date-only `yyyy-MM-dd`
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), DATE_FORMAT).ok()
}

/// Parse the localized month-name form.
///
/// The month-unit and meridiem markers are stripped, the numeric skeleton is parsed with
/// nanosecond precision, and the 12-hour clock is then resolved: an afternoon marker adds
/// 12 hours below noon, a morning marker maps hour 12 to midnight. Two attempts are made,
/// the second with whitespace normalized around the date separators.
pub fn parse_localized_month(text: &str) -> Result<CanonicalTimestamp> {
    let afternoon = text.contains(AFTERNOON_MARKER);
    let morning = text.contains(MORNING_MARKER);
    let skeleton = text
        .replace(MONTH_UNIT_MARKER, "")
        .replace(AFTERNOON_MARKER, "")
        .replace(MORNING_MARKER, "");

    let first = skeleton.trim().to_string();
    let collapsed = WHITESPACE_REGEX.replace_all(skeleton.trim(), " ");
    let second = DASH_SPACING_REGEX.replace_all(&collapsed, "-").into_owned();

    let parsed = parse_localized_skeleton(&first)
        .or_else(|| parse_localized_skeleton(&second))
        .ok_or_else(|| LoaderError::UnparseableTimestamp(text.to_string()))?;

    Ok(apply_meridiem(parsed, morning, afternoon))
}

fn parse_localized_skeleton(skeleton: &str) -> Option<CanonicalTimestamp> {
    let caps = LOCALIZED_SKELETON_REGEX.captures(skeleton)?;
    let num = |idx: usize| caps.get(idx).and_then(|m| m.as_str().parse::<u32>().ok());

    let day = num(1)?;
    let month = num(2)?;
    let year_text = caps.get(3)?.as_str();
    let year = year_text.parse::<i32>().ok()?;
    let year = if year_text.len() == 2 {
        expand_two_digit_year(year)
    } else {
        year
    };

    let nanos = match caps.get(7) {
        Some(fraction) => format!("{:0<9}", fraction.as_str()).parse::<u32>().ok()?,
        None => 0,
    };

    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    let time = NaiveTime::from_hms_nano_opt(num(4)?, num(5)?, num(6)?, nanos)?;
    Some(NaiveDateTime::new(date, time))
}

/// RR convention: 00-49 fall in the 2000s, 50-99 in the 1900s
fn expand_two_digit_year(year: i32) -> i32 {
    if year < 50 { 2000 + year } else { 1900 + year }
}

fn apply_meridiem(ts: CanonicalTimestamp, morning: bool, afternoon: bool) -> CanonicalTimestamp {
    if afternoon && ts.hour() < 12 {
        ts + Duration::hours(12)
    } else if morning && ts.hour() == 12 {
        ts - Duration::hours(12)
    } else {
        ts
    }
}

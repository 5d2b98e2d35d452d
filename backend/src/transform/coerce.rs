//! Per-field coercion rules.
//!
//! Raw fields are text. Each rule turns a raw field into a typed value or
//! reports it as missing; none of them fail. Policy decisions (drop the row,
//! fall back to `"Unknown"` or `0`) live in [`super::normalize`].
//!
//! Fields are trimmed before anything else, null-token matching included,
//! so `" NA "` is missing just like `"NA"`. Export tools pad cells
//! inconsistently and a padded token is never a real id or name.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::models::is_encodable;

/// Sentinel for missing categorical text
pub const UNKNOWN: &str = "Unknown";

/// Tokens read as a missing value, compared after trimming.
const NULL_TOKENS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "NULL", "null", "None", "<NA>",
    "#N/A", "#NA", "#N/A N/A", "-1.#IND", "-1.#QNAN", "1.#IND", "1.#QNAN",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%d-%b-%Y",
    "%d %b %Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%b %d %Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Trimmed field text, or `None` when the field is a missing value.
pub fn non_null(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    if NULL_TOKENS.contains(&trimmed) {
        None
    } else {
        Some(trimmed)
    }
}

/// Standardize a column header: trim, lowercase, spaces to underscores.
pub fn standardize_column(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "_")
}

/// Parse a calendar date; the time of day, if any, is discarded.
///
/// Dates outside [`KEY_YEARS`](crate::models::KEY_YEARS) (signed or
/// five-digit years) are treated as unparsable.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    parse_any_date(non_null(raw)?).filter(|date| is_encodable(*date))
}

fn parse_any_date(s: &str) -> Option<NaiveDate> {
    if let Some(date) = parse_compact_date(s) {
        return Some(date);
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(date);
        }
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }

    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive())
}

/// `YYYYMMDD`
fn parse_compact_date(s: &str) -> Option<NaiveDate> {
    if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year = s[0..4].parse().ok()?;
    let month = s[4..6].parse().ok()?;
    let day = s[6..8].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Parse a finite number.
pub fn parse_number(raw: &str) -> Option<f64> {
    non_null(raw)?
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
}

/// Numeric field with the "coerce then default" policy.
pub fn number_or_zero(raw: Option<&str>) -> f64 {
    raw.and_then(parse_number).unwrap_or(0.0)
}

/// Categorical field with the `"Unknown"` default.
pub fn text_or_unknown(raw: Option<&str>) -> String {
    raw.and_then(non_null).unwrap_or(UNKNOWN).to_string()
}

//! Calendar-day helpers.
//!
//! Every externally visible date is a local calendar day rendered as
//! zero-padded `YYYY-MM-DD`. Timestamps are stored in UTC and converted to
//! the local day before any day-granularity comparison.

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, Utc};

use crate::error::ValidationError;
use crate::routine::DayOfWeek;

/// Format used for every stored and displayed date.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Render a calendar day as `YYYY-MM-DD`.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse a strict, zero-padded `YYYY-MM-DD` string.
///
/// # Errors
/// Returns a validation error for any other shape, including `2024-1-5`.
pub fn parse_date(s: &str) -> Result<NaiveDate, ValidationError> {
    let bytes = s.as_bytes();
    let well_formed = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
    if !well_formed {
        return Err(ValidationError::invalid(
            "date",
            format!("'{s}' is not a YYYY-MM-DD date"),
        ));
    }
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map_err(|e| ValidationError::invalid("date", format!("'{s}': {e}")))
}

/// Take the date-only component of an ISO date or timestamp string.
///
/// `2024-01-05T10:00:00Z` and `2024-01-05` both yield 2024-01-05.
pub fn normalize_date(s: &str) -> Result<NaiveDate, ValidationError> {
    let day = s.split('T').next().unwrap_or(s).trim();
    parse_date(day)
}

/// Weekday name of a calendar day.
pub fn day_of_week(date: NaiveDate) -> DayOfWeek {
    DayOfWeek::from(date.weekday())
}

pub fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    date + Duration::days(days)
}

/// `days` consecutive calendar days starting at `start`.
pub fn date_range(start: NaiveDate, days: u32) -> Vec<NaiveDate> {
    (0..days).map(|i| add_days(start, i64::from(i))).collect()
}

/// Today's local calendar day.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Local calendar day on which a UTC timestamp falls.
pub fn local_day(ts: DateTime<Utc>) -> NaiveDate {
    ts.with_timezone(&Local).date_naive()
}

/// Number of days in the given month, `None` for an invalid month.
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    u32::try_from((next - first).num_days()).ok()
}

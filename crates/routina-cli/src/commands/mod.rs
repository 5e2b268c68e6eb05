pub mod calendar;
pub mod config;
pub mod day;
pub mod history;
pub mod progress;
pub mod template;

use chrono::NaiveDate;
use routina_core::dates::{normalize_date, today};
use routina_core::{CoreError, Template, TrackerDb, TrackerStore};

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Parse an optional date argument, defaulting to today.
///
/// Accepts `YYYY-MM-DD` or a timestamp such as `2024-01-05T10:00`, whose time
/// part is ignored.
pub fn resolve_date(arg: Option<&str>) -> Result<NaiveDate, Box<dyn std::error::Error>> {
    match arg {
        Some(s) => Ok(normalize_date(s)?),
        None => Ok(today()),
    }
}

pub fn require_template(db: &TrackerDb, id: &str) -> Result<Template, CoreError> {
    db.get_template(id)?
        .ok_or_else(|| CoreError::template_not_found(id))
}

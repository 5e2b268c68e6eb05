//! Recurring task templates and their per-day occurrences.
//!
//! A [`Template`] is a recurrence rule plus display metadata. An
//! [`Occurrence`] is one calendar day's materialized instance of a template,
//! created lazily the first time that day is viewed.

pub mod completion;
pub mod form;
pub mod manage;
pub mod recurrence;
pub mod sync;

use chrono::{DateTime, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::dates::{format_date, local_day};
use crate::error::ValidationError;

pub use completion::{increment_progress, record_completion, toggle_completion};
pub use form::TemplateForm;
pub use manage::{create_template, delete_template, update_template};
pub use recurrence::applies_on;
pub use sync::sync_for_date;

/// Day of the week, named in lowercase English.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    /// Monday-first, matching [`chrono::Weekday`] ordering.
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
        DayOfWeek::Sunday,
    ];

    /// Map a Sunday=0 .. Saturday=6 index to a day name.
    pub fn from_sunday_index(index: u32) -> Option<Self> {
        match index {
            0 => Some(DayOfWeek::Sunday),
            1 => Some(DayOfWeek::Monday),
            2 => Some(DayOfWeek::Tuesday),
            3 => Some(DayOfWeek::Wednesday),
            4 => Some(DayOfWeek::Thursday),
            5 => Some(DayOfWeek::Friday),
            6 => Some(DayOfWeek::Saturday),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DayOfWeek::Monday => "monday",
            DayOfWeek::Tuesday => "tuesday",
            DayOfWeek::Wednesday => "wednesday",
            DayOfWeek::Thursday => "thursday",
            DayOfWeek::Friday => "friday",
            DayOfWeek::Saturday => "saturday",
            DayOfWeek::Sunday => "sunday",
        }
    }
}

impl From<Weekday> for DayOfWeek {
    fn from(day: Weekday) -> Self {
        match day {
            Weekday::Mon => DayOfWeek::Monday,
            Weekday::Tue => DayOfWeek::Tuesday,
            Weekday::Wed => DayOfWeek::Wednesday,
            Weekday::Thu => DayOfWeek::Thursday,
            Weekday::Fri => DayOfWeek::Friday,
            Weekday::Sat => DayOfWeek::Saturday,
            Weekday::Sun => DayOfWeek::Sunday,
        }
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DayOfWeek {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        DayOfWeek::ALL
            .into_iter()
            .find(|d| d.as_str() == lower)
            .ok_or_else(|| ValidationError::invalid("repeat_days", format!("unknown weekday '{s}'")))
    }
}

/// How a template repeats.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RepeatType {
    /// Every day from the creation date on
    Daily,
    /// On the listed weekdays
    Weekly,
    /// On the listed weekdays
    SpecificDays,
    /// Unrecognized stored value; never applies
    #[serde(other)]
    Unknown,
}

impl RepeatType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RepeatType::Daily => "daily",
            RepeatType::Weekly => "weekly",
            RepeatType::SpecificDays => "specific_days",
            RepeatType::Unknown => "unknown",
        }
    }

    /// Whether this repeat type is driven by a weekday list.
    pub fn uses_days(&self) -> bool {
        matches!(self, RepeatType::Weekly | RepeatType::SpecificDays)
    }
}

impl Default for RepeatType {
    fn default() -> Self {
        RepeatType::Daily
    }
}

impl fmt::Display for RepeatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RepeatType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "daily" => Ok(RepeatType::Daily),
            "weekly" => Ok(RepeatType::Weekly),
            "specific_days" => Ok(RepeatType::SpecificDays),
            _ => Err(ValidationError::invalid(
                "repeat_type",
                format!("'{s}' (expected daily, weekly or specific_days)"),
            )),
        }
    }
}

/// A recurring task definition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Template {
    /// Opaque unique identifier
    pub id: String,
    /// Display text, rendered verbatim
    pub title: String,
    /// Free-form estimated duration label
    pub time: Option<String>,
    pub repeat_type: RepeatType,
    /// Weekdays for weekly / specific_days templates
    pub repeat_days: Option<Vec<DayOfWeek>>,
    /// Target repetitions for a single day's occurrence
    pub count: u32,
    /// No occurrence is generated before this timestamp's local day
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    /// Days on which the template was fully completed, ascending, unique
    #[serde(default)]
    pub completed_dates: Vec<NaiveDate>,
    pub last_completed: Option<DateTime<Utc>>,
}

impl Template {
    /// Local calendar day of creation.
    pub fn created_on(&self) -> NaiveDate {
        local_day(self.created_at)
    }

    pub fn is_completed_on(&self, date: NaiveDate) -> bool {
        self.completed_dates.binary_search(&date).is_ok()
    }

    /// Insert `date` into the history. Returns false when already present.
    pub fn add_completed_date(&mut self, date: NaiveDate) -> bool {
        match self.completed_dates.binary_search(&date) {
            Ok(_) => false,
            Err(pos) => {
                self.completed_dates.insert(pos, date);
                true
            }
        }
    }

    /// Remove `date` from the history. Returns false when it was absent.
    pub fn remove_completed_date(&mut self, date: NaiveDate) -> bool {
        match self.completed_dates.binary_search(&date) {
            Ok(pos) => {
                self.completed_dates.remove(pos);
                true
            }
            Err(_) => false,
        }
    }

    /// Restore the ascending/unique history invariant on loaded data.
    pub fn normalize_history(&mut self) {
        self.completed_dates.sort_unstable();
        self.completed_dates.dedup();
    }
}

/// One calendar day's instance of a template.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Occurrence {
    /// `{template_id}_{YYYY-MM-DD}`
    pub id: String,
    pub template_id: String,
    pub date: NaiveDate,
    /// True once `completed_count` reaches `count`
    pub completed: bool,
    pub completed_count: u32,
    pub completed_at: Option<DateTime<Utc>>,
    // Copies of the owning template's fields
    pub title: String,
    pub time: Option<String>,
    pub count: u32,
    /// Template repeat days, refreshed on sync and never persisted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<Vec<DayOfWeek>>,
}

impl Occurrence {
    /// Deterministic id; at most one occurrence per (template, date).
    pub fn id_for(template_id: &str, date: NaiveDate) -> String {
        format!("{}_{}", template_id, format_date(date))
    }

    /// Fresh, not-started occurrence of `template` on `date`.
    pub fn new_for(template: &Template, date: NaiveDate) -> Self {
        Self {
            id: Self::id_for(&template.id, date),
            template_id: template.id.clone(),
            date,
            completed: false,
            completed_count: 0,
            completed_at: None,
            title: template.title.clone(),
            time: template.time.clone(),
            count: template.count.max(1),
            period: template.repeat_days.clone(),
        }
    }

    pub fn remaining(&self) -> u32 {
        self.count.saturating_sub(self.completed_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{daily, date as d};

    fn template(id: &str) -> Template {
        Template {
            time: Some("10m".to_string()),
            count: 2,
            title: "Stretch".to_string(),
            ..daily(id, "2024-01-01")
        }
    }

    #[test]
    fn weekday_parsing_is_case_insensitive() {
        assert_eq!("Monday".parse::<DayOfWeek>().unwrap(), DayOfWeek::Monday);
        assert_eq!(" sunday ".parse::<DayOfWeek>().unwrap(), DayOfWeek::Sunday);
        assert!("mon".parse::<DayOfWeek>().is_err());
    }

    #[test]
    fn sunday_index_mapping() {
        assert_eq!(DayOfWeek::from_sunday_index(0), Some(DayOfWeek::Sunday));
        assert_eq!(DayOfWeek::from_sunday_index(6), Some(DayOfWeek::Saturday));
        assert_eq!(DayOfWeek::from_sunday_index(7), None);
        assert_eq!(DayOfWeek::from(Weekday::Wed), DayOfWeek::Wednesday);
    }

    #[test]
    fn repeat_type_serde_names() {
        assert_eq!(
            serde_json::to_string(&RepeatType::SpecificDays).unwrap(),
            "\"specific_days\""
        );
        let parsed: RepeatType = serde_json::from_str("\"monthly\"").unwrap();
        assert_eq!(parsed, RepeatType::Unknown);
        assert!("monthly".parse::<RepeatType>().is_err());
        assert_eq!("specific-days".parse::<RepeatType>().unwrap(), RepeatType::SpecificDays);
    }

    #[test]
    fn history_stays_sorted_and_unique() {
        let mut t = template("T1");
        assert!(t.add_completed_date(d("2024-01-05")));
        assert!(t.add_completed_date(d("2024-01-02")));
        assert!(!t.add_completed_date(d("2024-01-05")));
        assert!(t.add_completed_date(d("2024-01-03")));
        assert_eq!(
            t.completed_dates,
            vec![d("2024-01-02"), d("2024-01-03"), d("2024-01-05")]
        );
        assert!(t.remove_completed_date(d("2024-01-03")));
        assert!(!t.remove_completed_date(d("2024-01-03")));
        assert!(t.is_completed_on(d("2024-01-05")));
    }

    #[test]
    fn normalize_history_sorts_and_dedups() {
        let mut t = template("T1");
        t.completed_dates = vec![d("2024-01-05"), d("2024-01-01"), d("2024-01-05")];
        t.normalize_history();
        assert_eq!(t.completed_dates, vec![d("2024-01-01"), d("2024-01-05")]);
    }

    #[test]
    fn new_occurrence_copies_template_fields() {
        let t = template("T1");
        let occ = Occurrence::new_for(&t, d("2024-01-05"));
        assert_eq!(occ.id, "T1_2024-01-05");
        assert_eq!(occ.completed_count, 0);
        assert!(!occ.completed);
        assert_eq!(occ.count, 2);
        assert_eq!(occ.title, "Stretch");
        assert_eq!(occ.remaining(), 2);
    }

    #[test]
    fn occurrence_json_uses_plain_dates() {
        let occ = Occurrence::new_for(&template("T1"), d("2024-01-05"));
        let json = serde_json::to_value(&occ).unwrap();
        assert_eq!(json["date"], "2024-01-05");
        assert!(json.get("period").is_none());
    }
}

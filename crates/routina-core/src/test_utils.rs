//! Shared fixtures for unit tests.

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};

use crate::error::{DatabaseError, Result};
use crate::routine::{DayOfWeek, Occurrence, RepeatType, Template};
use crate::storage::{TrackerDb, TrackerStore};

pub fn date(s: &str) -> NaiveDate {
    crate::dates::parse_date(s).unwrap()
}

/// Noon local time on `day`, so the local creation day is exactly `day`.
pub fn local_noon(day: &str) -> DateTime<Utc> {
    let d = date(day);
    Local
        .from_local_datetime(&d.and_hms_opt(12, 0, 0).unwrap())
        .earliest()
        .unwrap()
        .with_timezone(&Utc)
}

pub fn daily(id: &str, created: &str) -> Template {
    Template {
        id: id.to_string(),
        title: format!("Task {id}"),
        time: None,
        repeat_type: RepeatType::Daily,
        repeat_days: None,
        count: 1,
        created_at: local_noon(created),
        updated_at: None,
        completed_dates: Vec::new(),
        last_completed: None,
    }
}

pub fn on_days(id: &str, created: &str, days: &[DayOfWeek]) -> Template {
    Template {
        repeat_type: RepeatType::SpecificDays,
        repeat_days: Some(days.to_vec()),
        ..daily(id, created)
    }
}

pub fn memory_db() -> TrackerDb {
    TrackerDb::open_memory().unwrap()
}

/// Store whose occurrence writes fail, for every template or just one.
pub struct RejectingStore {
    pub inner: TrackerDb,
    only: Option<String>,
}

impl RejectingStore {
    pub fn all(inner: TrackerDb) -> Self {
        Self { inner, only: None }
    }

    pub fn for_template(inner: TrackerDb, template_id: &str) -> Self {
        Self {
            inner,
            only: Some(template_id.to_string()),
        }
    }
}

impl TrackerStore for RejectingStore {
    fn get_all_templates(&self) -> Vec<Template> {
        self.inner.get_all_templates()
    }
    fn get_template(&self, id: &str) -> Result<Option<Template>> {
        self.inner.get_template(id)
    }
    fn save_template(&self, template: &Template) -> Result<()> {
        self.inner.save_template(template)
    }
    fn put_template(&self, template: &Template) -> Result<()> {
        self.inner.put_template(template)
    }
    fn delete_template(&self, id: &str) -> Result<()> {
        self.inner.delete_template(id)
    }
    fn delete_occurrences_for_template(&self, template_id: &str) -> Result<usize> {
        self.inner.delete_occurrences_for_template(template_id)
    }
    fn get_occurrences_for_date(&self, date: NaiveDate) -> Result<Vec<Occurrence>> {
        self.inner.get_occurrences_for_date(date)
    }
    fn get_occurrences_for_template(&self, template_id: &str) -> Result<Vec<Occurrence>> {
        self.inner.get_occurrences_for_template(template_id)
    }
    fn get_occurrence(&self, date: NaiveDate, template_id: &str) -> Result<Option<Occurrence>> {
        self.inner.get_occurrence(date, template_id)
    }
    fn save_occurrence(&self, occurrence: &Occurrence) -> Result<()> {
        match &self.only {
            Some(id) if *id != occurrence.template_id => self.inner.save_occurrence(occurrence),
            _ => Err(DatabaseError::WriteFailed("read only".into()).into()),
        }
    }
    fn get_occurrences_in_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Occurrence>> {
        self.inner.get_occurrences_in_range(start, end)
    }
}

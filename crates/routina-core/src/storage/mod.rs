mod config;
pub mod migrations;
pub mod tracker_db;

pub use config::{Config, DefaultsConfig, DisplayConfig, StorageConfig};
pub use tracker_db::{DataResetOptions, DataResetSummary, TrackerDb};

use chrono::NaiveDate;
use std::path::PathBuf;

use crate::error::{ConfigError, Result};
use crate::routine::{Occurrence, Template};

/// Returns the routina data directory, creating it if needed.
///
/// `ROUTINA_DATA_DIR` overrides the location. Otherwise the directory is
/// `~/.config/routina`, or `~/.config/routina-dev` when `ROUTINA_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("ROUTINA_DATA_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("ROUTINA_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("routina-dev")
            } else {
                base_dir.join("routina")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}

/// Operations the core issues against the persistent store.
///
/// Two logical collections: templates keyed by `id`, and occurrences keyed
/// by `id` with lookups by date, by template, and by the unique
/// `(date, template_id)` pair.
pub trait TrackerStore {
    /// All templates in creation order. Never fails: an unreadable store
    /// yields an empty list.
    fn get_all_templates(&self) -> Vec<Template>;

    fn get_template(&self, id: &str) -> Result<Option<Template>>;

    /// Upsert a template and re-stamp every stored occurrence of it with the
    /// template's current title, time and count, clamping progress and
    /// recomputing `completed`. Only the template write decides success.
    fn save_template(&self, template: &Template) -> Result<()>;

    /// Upsert a template row without touching its occurrences.
    fn put_template(&self, template: &Template) -> Result<()>;

    fn delete_template(&self, id: &str) -> Result<()>;

    /// Delete every occurrence of a template, returning how many were removed.
    fn delete_occurrences_for_template(&self, template_id: &str) -> Result<usize>;

    fn get_occurrences_for_date(&self, date: NaiveDate) -> Result<Vec<Occurrence>>;

    /// Every stored occurrence of a template, oldest date first.
    fn get_occurrences_for_template(&self, template_id: &str) -> Result<Vec<Occurrence>>;

    fn get_occurrence(&self, date: NaiveDate, template_id: &str) -> Result<Option<Occurrence>>;

    /// Upsert keyed by `occurrence.id`.
    fn save_occurrence(&self, occurrence: &Occurrence) -> Result<()>;

    /// Occurrences with `start <= date <= end`.
    fn get_occurrences_in_range(&self, start: NaiveDate, end: NaiveDate)
        -> Result<Vec<Occurrence>>;
}

impl<S: TrackerStore + ?Sized> TrackerStore for &S {
    fn get_all_templates(&self) -> Vec<Template> {
        (**self).get_all_templates()
    }
    fn get_template(&self, id: &str) -> Result<Option<Template>> {
        (**self).get_template(id)
    }
    fn save_template(&self, template: &Template) -> Result<()> {
        (**self).save_template(template)
    }
    fn put_template(&self, template: &Template) -> Result<()> {
        (**self).put_template(template)
    }
    fn delete_template(&self, id: &str) -> Result<()> {
        (**self).delete_template(id)
    }
    fn delete_occurrences_for_template(&self, template_id: &str) -> Result<usize> {
        (**self).delete_occurrences_for_template(template_id)
    }
    fn get_occurrences_for_date(&self, date: NaiveDate) -> Result<Vec<Occurrence>> {
        (**self).get_occurrences_for_date(date)
    }
    fn get_occurrences_for_template(&self, template_id: &str) -> Result<Vec<Occurrence>> {
        (**self).get_occurrences_for_template(template_id)
    }
    fn get_occurrence(&self, date: NaiveDate, template_id: &str) -> Result<Option<Occurrence>> {
        (**self).get_occurrence(date, template_id)
    }
    fn save_occurrence(&self, occurrence: &Occurrence) -> Result<()> {
        (**self).save_occurrence(occurrence)
    }
    fn get_occurrences_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Occurrence>> {
        (**self).get_occurrences_in_range(start, end)
    }
}

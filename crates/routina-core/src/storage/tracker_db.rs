//! SQLite-based storage for templates and their occurrences.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

use super::{data_dir, migrations, Config, TrackerStore};
use crate::dates::{format_date, DATE_FORMAT};
use crate::error::{CoreError, DatabaseError, Result};
use crate::routine::{DayOfWeek, Occurrence, RepeatType, Template};

/// Default database file name inside the data directory.
pub const DEFAULT_DB_FILE: &str = "routina.db";

const TEMPLATE_COLUMNS: &str = "id, title, time, repeat_type, repeat_days, count,
     created_at, updated_at, completed_dates, last_completed";

const OCCURRENCE_COLUMNS: &str = "id, template_id, date, completed, completed_count,
     completed_at, title, time, count";

// === Helper Functions ===

fn conversion_error<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

/// Parse repeat type from database string
fn parse_repeat_type(s: &str) -> RepeatType {
    match s {
        "daily" => RepeatType::Daily,
        "weekly" => RepeatType::Weekly,
        "specific_days" => RepeatType::SpecificDays,
        _ => RepeatType::Unknown,
    }
}

fn parse_timestamp(idx: usize, s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, e))
}

fn parse_optional_timestamp(idx: usize, s: Option<String>) -> rusqlite::Result<Option<DateTime<Utc>>> {
    s.map(|s| parse_timestamp(idx, &s)).transpose()
}

fn parse_day(idx: usize, s: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|e| conversion_error(idx, e))
}

fn row_to_template(row: &Row) -> rusqlite::Result<Template> {
    let repeat_type: String = row.get(3)?;
    let repeat_days = row
        .get::<_, Option<String>>(4)?
        .map(|json| serde_json::from_str::<Vec<DayOfWeek>>(&json))
        .transpose()
        .map_err(|e| conversion_error(4, e))?;
    let created_at: String = row.get(6)?;
    let completed_dates: String = row.get(8)?;
    let completed_dates = serde_json::from_str::<Vec<NaiveDate>>(&completed_dates)
        .map_err(|e| conversion_error(8, e))?;

    let mut template = Template {
        id: row.get(0)?,
        title: row.get(1)?,
        time: row.get(2)?,
        repeat_type: parse_repeat_type(&repeat_type),
        repeat_days,
        count: row.get(5)?,
        created_at: parse_timestamp(6, &created_at)?,
        updated_at: parse_optional_timestamp(7, row.get(7)?)?,
        completed_dates,
        last_completed: parse_optional_timestamp(9, row.get(9)?)?,
    };
    template.normalize_history();
    Ok(template)
}

fn row_to_occurrence(row: &Row) -> rusqlite::Result<Occurrence> {
    let date: String = row.get(2)?;
    Ok(Occurrence {
        id: row.get(0)?,
        template_id: row.get(1)?,
        date: parse_day(2, &date)?,
        completed: row.get(3)?,
        completed_count: row.get(4)?,
        completed_at: parse_optional_timestamp(5, row.get(5)?)?,
        title: row.get(6)?,
        time: row.get(7)?,
        count: row.get(8)?,
        period: None,
    })
}

fn write_failed(err: rusqlite::Error) -> CoreError {
    match DatabaseError::from(err) {
        DatabaseError::QueryFailed(message) => DatabaseError::WriteFailed(message).into(),
        other => other.into(),
    }
}

/// Which collections [`TrackerDb::reset`] wipes.
#[derive(Debug, Clone, Copy)]
pub struct DataResetOptions {
    pub templates: bool,
    pub occurrences: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataResetSummary {
    pub deleted_templates: usize,
    pub deleted_occurrences: usize,
}

/// SQLite database holding templates and occurrences.
///
/// One handle is opened per process and passed to everything that needs
/// the store.
pub struct TrackerDb {
    conn: Connection,
}

impl TrackerDb {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database configured by `storage.database_file` inside the
    /// data directory.
    ///
    /// # Errors
    /// Returns an error if the config cannot be read or the database cannot
    /// be opened or migrated.
    pub fn open() -> Result<Self> {
        let dir = data_dir()?;
        let config = Config::load()?;
        Self::open_at(&config.database_path(&dir))
    }

    /// Open (or create) the database file at `path`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        tracing::debug!(path = %path.display(), "opened tracker database");
        Ok(db)
    }

    /// Open an in-memory database (for tests and dry runs).
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        migrations::migrate(&self.conn)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(())
    }

    fn list_templates(&self) -> rusqlite::Result<Vec<Template>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TEMPLATE_COLUMNS} FROM templates ORDER BY created_at ASC, id ASC"
        ))?;
        let rows = stmt.query_map([], row_to_template)?;
        let mut templates = Vec::new();
        for row in rows {
            match row {
                Ok(t) => templates.push(t),
                Err(e) => tracing::warn!("skipping unreadable template row: {e}"),
            }
        }
        Ok(templates)
    }

    fn query_occurrences(
        &self,
        where_clause: &str,
        args: &[&dyn rusqlite::ToSql],
    ) -> Result<Vec<Occurrence>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {OCCURRENCE_COLUMNS} FROM occurrences WHERE {where_clause} ORDER BY date ASC, id ASC"
        ))?;
        let rows = stmt.query_map(args, row_to_occurrence)?;
        let mut occurrences = Vec::new();
        for row in rows {
            occurrences.push(row.map_err(|e| DatabaseError::CorruptRow {
                table: "occurrences",
                message: e.to_string(),
            })?);
        }
        Ok(occurrences)
    }

    /// Re-stamp stored occurrences of `template` with its display fields.
    ///
    /// Progress is clamped to the new count and `completed` follows it.
    /// Occurrences that become complete here are stamped with the template's
    /// edit time; those that reopen lose `completed_at`.
    fn refresh_occurrences(&self, template: &Template) -> rusqlite::Result<usize> {
        let stamped_at = template.updated_at.unwrap_or(template.created_at);
        self.conn.execute(
            "UPDATE occurrences
             SET title = ?2,
                 time = ?3,
                 count = ?4,
                 completed_count = MIN(completed_count, ?4),
                 completed = MIN(completed_count, ?4) >= ?4,
                 completed_at = CASE
                     WHEN MIN(completed_count, ?4) >= ?4 THEN COALESCE(completed_at, ?5)
                     ELSE NULL
                 END
             WHERE template_id = ?1",
            params![
                template.id,
                template.title,
                template.time,
                template.count.max(1),
                stamped_at.to_rfc3339(),
            ],
        )
    }

    /// Delete the selected collections in one transaction.
    ///
    /// # Errors
    /// Returns an error if any delete fails; nothing is deleted in that case.
    pub fn reset(&self, options: DataResetOptions) -> Result<DataResetSummary> {
        let tx = self.conn.unchecked_transaction().map_err(write_failed)?;
        let deleted_occurrences = if options.occurrences {
            tx.execute("DELETE FROM occurrences", []).map_err(write_failed)?
        } else {
            0
        };
        let deleted_templates = if options.templates {
            tx.execute("DELETE FROM templates", []).map_err(write_failed)?
        } else {
            0
        };
        tx.commit().map_err(write_failed)?;
        tracing::info!(deleted_templates, deleted_occurrences, "data reset");
        Ok(DataResetSummary {
            deleted_templates,
            deleted_occurrences,
        })
    }
}

impl TrackerStore for TrackerDb {
    fn get_all_templates(&self) -> Vec<Template> {
        self.list_templates().unwrap_or_else(|e| {
            tracing::warn!("failed to load templates: {e}");
            Vec::new()
        })
    }

    fn get_template(&self, id: &str) -> Result<Option<Template>> {
        let template = self
            .conn
            .query_row(
                &format!("SELECT {TEMPLATE_COLUMNS} FROM templates WHERE id = ?1"),
                params![id],
                row_to_template,
            )
            .optional()?;
        Ok(template)
    }

    fn save_template(&self, template: &Template) -> Result<()> {
        self.put_template(template)?;
        match self.refresh_occurrences(template) {
            Ok(n) => tracing::debug!(template_id = %template.id, refreshed = n, "occurrences re-stamped"),
            Err(e) => tracing::warn!(
                template_id = %template.id,
                "template saved but occurrence refresh failed: {e}"
            ),
        }
        Ok(())
    }

    fn put_template(&self, template: &Template) -> Result<()> {
        let repeat_days = template
            .repeat_days
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        let completed_dates = serde_json::to_string(&template.completed_dates)?;

        self.conn
            .execute(
                "INSERT INTO templates (id, title, time, repeat_type, repeat_days, count,
                                        created_at, updated_at, completed_dates, last_completed)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                 ON CONFLICT(id) DO UPDATE SET
                    title = excluded.title,
                    time = excluded.time,
                    repeat_type = excluded.repeat_type,
                    repeat_days = excluded.repeat_days,
                    count = excluded.count,
                    created_at = excluded.created_at,
                    updated_at = excluded.updated_at,
                    completed_dates = excluded.completed_dates,
                    last_completed = excluded.last_completed",
                params![
                    template.id,
                    template.title,
                    template.time,
                    template.repeat_type.as_str(),
                    repeat_days,
                    template.count,
                    template.created_at.to_rfc3339(),
                    template.updated_at.map(|t| t.to_rfc3339()),
                    completed_dates,
                    template.last_completed.map(|t| t.to_rfc3339()),
                ],
            )
            .map_err(write_failed)?;
        Ok(())
    }

    fn delete_template(&self, id: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM templates WHERE id = ?1", params![id])
            .map_err(write_failed)?;
        Ok(())
    }

    fn delete_occurrences_for_template(&self, template_id: &str) -> Result<usize> {
        let deleted = self
            .conn
            .execute(
                "DELETE FROM occurrences WHERE template_id = ?1",
                params![template_id],
            )
            .map_err(write_failed)?;
        Ok(deleted)
    }

    fn get_occurrences_for_date(&self, date: NaiveDate) -> Result<Vec<Occurrence>> {
        self.query_occurrences("date = ?1", params![format_date(date)])
    }

    fn get_occurrences_for_template(&self, template_id: &str) -> Result<Vec<Occurrence>> {
        self.query_occurrences("template_id = ?1", params![template_id])
    }

    fn get_occurrence(&self, date: NaiveDate, template_id: &str) -> Result<Option<Occurrence>> {
        let occurrence = self
            .conn
            .query_row(
                &format!(
                    "SELECT {OCCURRENCE_COLUMNS} FROM occurrences WHERE date = ?1 AND template_id = ?2"
                ),
                params![format_date(date), template_id],
                row_to_occurrence,
            )
            .optional()?;
        Ok(occurrence)
    }

    fn save_occurrence(&self, occurrence: &Occurrence) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO occurrences (id, template_id, date, completed, completed_count,
                                          completed_at, title, time, count)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                 ON CONFLICT(id) DO UPDATE SET
                    template_id = excluded.template_id,
                    date = excluded.date,
                    completed = excluded.completed,
                    completed_count = excluded.completed_count,
                    completed_at = excluded.completed_at,
                    title = excluded.title,
                    time = excluded.time,
                    count = excluded.count",
                params![
                    occurrence.id,
                    occurrence.template_id,
                    format_date(occurrence.date),
                    occurrence.completed,
                    occurrence.completed_count,
                    occurrence.completed_at.map(|t| t.to_rfc3339()),
                    occurrence.title,
                    occurrence.time,
                    occurrence.count,
                ],
            )
            .map_err(write_failed)?;
        Ok(())
    }

    fn get_occurrences_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Occurrence>> {
        self.query_occurrences(
            "date BETWEEN ?1 AND ?2",
            params![format_date(start), format_date(end)],
        )
    }
}

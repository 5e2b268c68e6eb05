//! Database schema migrations for routina.
//!
//! Migrations are versioned and applied automatically when opening the database.
//! The `schema_version` table tracks the current migration version.

use rusqlite::{Connection, Result as SqliteResult};

/// Current schema version.
///
/// Increment this when adding new migrations.
pub const SCHEMA_VERSION: i32 = 2;

/// Apply all pending migrations to bring the database to the current schema version.
///
/// # Errors
/// Returns an error if migration fails.
pub fn migrate(conn: &Connection) -> SqliteResult<()> {
    create_schema_version_table(conn)?;

    let current_version = get_schema_version(conn);

    if current_version < 1 {
        migrate_v1(conn)?;
    }
    if current_version < 2 {
        migrate_v2(conn)?;
    }

    Ok(())
}

fn create_schema_version_table(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );",
    )
}

/// Returns 0 if no version is set (initial database).
pub fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row("SELECT version FROM schema_version", [], |row| {
        row.get::<_, i32>(0)
    })
    .unwrap_or_else(|e| {
        if !matches!(e, rusqlite::Error::QueryReturnedNoRows) {
            tracing::warn!("failed to read schema_version: {e}");
        }
        0
    })
}

fn set_schema_version(conn: &Connection, version: i32) -> SqliteResult<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
    Ok(())
}

/// Migration v1: templates and occurrences collections.
///
/// - `templates`: primary key `id`, index on `created_at`
/// - `occurrences`: primary key `id`, indexes on `template_id`, `date`,
///   `completed` and a unique `(date, template_id)` pair
fn migrate_v1(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS templates (
            id              TEXT PRIMARY KEY,
            title           TEXT NOT NULL,
            time            TEXT,
            repeat_type     TEXT NOT NULL,
            repeat_days     TEXT,
            count           INTEGER NOT NULL DEFAULT 1,
            created_at      TEXT NOT NULL,
            completed_dates TEXT NOT NULL DEFAULT '[]',
            last_completed  TEXT
        );

        CREATE TABLE IF NOT EXISTS occurrences (
            id              TEXT PRIMARY KEY,
            template_id     TEXT NOT NULL,
            date            TEXT NOT NULL,
            completed       INTEGER NOT NULL DEFAULT 0,
            completed_count INTEGER NOT NULL DEFAULT 0,
            completed_at    TEXT,
            title           TEXT NOT NULL,
            time            TEXT,
            count           INTEGER NOT NULL DEFAULT 1
        );

        CREATE INDEX IF NOT EXISTS idx_templates_created_at ON templates(created_at);
        CREATE INDEX IF NOT EXISTS idx_occurrences_template_id ON occurrences(template_id);
        CREATE INDEX IF NOT EXISTS idx_occurrences_date ON occurrences(date);
        CREATE UNIQUE INDEX IF NOT EXISTS idx_occurrences_date_template
            ON occurrences(date, template_id);
        CREATE INDEX IF NOT EXISTS idx_occurrences_completed ON occurrences(completed);",
    )?;

    tx.execute("DELETE FROM schema_version", [])?;
    tx.execute("INSERT INTO schema_version (version) VALUES (1)", [])?;
    tx.commit()
}

/// Migration v2: `updated_at` on templates.
fn migrate_v2(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch("ALTER TABLE templates ADD COLUMN updated_at TEXT;")?;
    tx.commit()?;
    set_schema_version(conn, 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_names(conn: &Connection, table: &str) -> Vec<String> {
        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'index' AND tbl_name = ?1")
            .unwrap();
        let names = stmt
            .query_map([table], |row| row.get::<_, String>(0))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        names
    }

    #[test]
    fn fresh_database_reaches_current_version() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        assert_eq!(get_schema_version(&conn), SCHEMA_VERSION);
    }

    #[test]
    fn migrate_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        migrate(&conn).unwrap();
        assert_eq!(get_schema_version(&conn), SCHEMA_VERSION);
    }

    #[test]
    fn occurrence_indexes_exist() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        let names = index_names(&conn, "occurrences");
        for expected in [
            "idx_occurrences_template_id",
            "idx_occurrences_date",
            "idx_occurrences_date_template",
            "idx_occurrences_completed",
        ] {
            assert!(names.iter().any(|n| n == expected), "missing {expected}");
        }
        assert!(index_names(&conn, "templates")
            .iter()
            .any(|n| n == "idx_templates_created_at"));
    }

    #[test]
    fn date_template_pair_is_unique() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        conn.execute(
            "INSERT INTO occurrences (id, template_id, date, title) VALUES ('a', 'T1', '2024-01-01', 'x')",
            [],
        )
        .unwrap();
        let dup = conn.execute(
            "INSERT INTO occurrences (id, template_id, date, title) VALUES ('b', 'T1', '2024-01-01', 'x')",
            [],
        );
        assert!(dup.is_err());
    }
}

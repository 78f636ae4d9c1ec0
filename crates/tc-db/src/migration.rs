//! Schema migration runner for the trip database.
//!
//! Tracks applied migration versions in `schema_version` and runs any
//! unapplied migrations on each open.

use crate::ddl::MIGRATIONS;
use crate::error::{DbError, DbResult};
use duckdb::Connection;

fn ensure_version_table(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
             version    INTEGER NOT NULL,
             applied_at TIMESTAMP NOT NULL DEFAULT now()
         );",
    )
    .map_err(|e| DbError::MigrationError(format!("failed to create schema_version table: {e}")))
}

/// Highest applied migration version, or 0 if none.
fn current_version(conn: &Connection) -> DbResult<i32> {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .map_err(|e| DbError::MigrationError(format!("failed to read schema version: {e}")))
}

/// Run all unapplied migrations against `conn`.
pub fn run_migrations(conn: &Connection) -> DbResult<()> {
    ensure_version_table(conn)?;
    let current = current_version(conn)?;

    for migration in MIGRATIONS {
        if migration.version <= current {
            continue;
        }
        log::debug!("Applying migration v{:03}", migration.version);

        conn.execute_batch(migration.sql).map_err(|e| {
            DbError::MigrationError(format!("migration v{:03} failed: {e}", migration.version))
        })?;

        conn.execute(
            "INSERT INTO schema_version (version) VALUES (?)",
            duckdb::params![migration.version],
        )
        .map_err(|e| {
            DbError::MigrationError(format!(
                "failed to record migration v{:03}: {e}",
                migration.version
            ))
        })?;
    }
    Ok(())
}

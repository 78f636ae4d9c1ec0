//! Key/value engine settings.

use crate::error::{DbResult, DbResultExt};
use duckdb::{Connection, OptionalExt};

/// Checksum of the catalog the cached classifications belong to
pub const CATALOG_CHECKSUM: &str = "trip_checks_checksum";

/// Fingerprint of the classifier rules the cache was built with
pub const RULES_FINGERPRINT: &str = "trip_checks_rules_fingerprint";

pub fn get(conn: &Connection, name: &str) -> DbResult<Option<String>> {
    let value: Option<Option<String>> = conn
        .query_row(
            "SELECT value FROM settings WHERE name = ? LIMIT 1",
            duckdb::params![name],
            |row| row.get(0),
        )
        .optional()
        .query_context("read setting")?;
    Ok(value.flatten())
}

pub fn set(conn: &Connection, name: &str, value: &str) -> DbResult<()> {
    remove(conn, name)?;
    conn.execute(
        "INSERT INTO settings (name, value) VALUES (?, ?)",
        duckdb::params![name, value],
    )
    .query_context("write setting")?;
    Ok(())
}

pub fn remove(conn: &Connection, name: &str) -> DbResult<()> {
    conn.execute("DELETE FROM settings WHERE name = ?", duckdb::params![name])
        .query_context("delete setting")?;
    Ok(())
}

//! Per-trip run bookkeeping: error-free markers and completion records.
//!
//! Both tables hold at most one row per trip; writers delete before insert.

use crate::error::{DbError, DbResult, DbResultExt};
use duckdb::{Connection, OptionalExt};
use tc_core::{RunVersion, TripId};

fn read_version(conn: &Connection, table: &str, trip_id: TripId) -> DbResult<Option<RunVersion>> {
    let raw: Option<String> = conn
        .query_row(
            &format!("SELECT run_version FROM {table} WHERE trip_id = ? LIMIT 1"),
            duckdb::params![trip_id],
            |row| row.get(0),
        )
        .optional()
        .query_context(&format!("read {table}"))?;
    raw.map(|v| {
        RunVersion::parse(&v).map_err(|e| DbError::CorruptRow {
            table: table.to_string(),
            message: e.to_string(),
        })
    })
    .transpose()
}

fn write_version(
    conn: &Connection,
    table: &str,
    trip_id: TripId,
    version: &RunVersion,
) -> DbResult<()> {
    clear_version(conn, table, trip_id)?;
    conn.execute(
        &format!("INSERT INTO {table} (trip_id, run_version) VALUES (?, ?)"),
        duckdb::params![trip_id, version.as_str()],
    )
    .query_context(&format!("write {table}"))?;
    Ok(())
}

fn clear_version(conn: &Connection, table: &str, trip_id: TripId) -> DbResult<usize> {
    conn.execute(
        &format!("DELETE FROM {table} WHERE trip_id = ?"),
        duckdb::params![trip_id],
    )
    .query_context(&format!("clear {table}"))
}

/// Run version of the latest completed run, if it found nothing.
pub fn error_free_run(conn: &Connection, trip_id: TripId) -> DbResult<Option<RunVersion>> {
    read_version(conn, "error_free_runs", trip_id)
}

pub fn set_error_free_run(conn: &Connection, trip_id: TripId, version: &RunVersion) -> DbResult<()> {
    write_version(conn, "error_free_runs", trip_id, version)
}

/// Returns whether a marker was removed.
pub fn clear_error_free_run(conn: &Connection, trip_id: TripId) -> DbResult<bool> {
    Ok(clear_version(conn, "error_free_runs", trip_id)? > 0)
}

/// Run version of the latest completed run.
pub fn last_completed_run(conn: &Connection, trip_id: TripId) -> DbResult<Option<RunVersion>> {
    read_version(conn, "run_completions", trip_id)
}

pub fn record_completed_run(
    conn: &Connection,
    trip_id: TripId,
    version: &RunVersion,
) -> DbResult<()> {
    write_version(conn, "run_completions", trip_id, version)
}

//! Trip lookups.

use crate::error::{DbResult, DbResultExt};
use duckdb::Connection;
use tc_core::TripId;

pub fn exists(conn: &Connection, trip_id: TripId) -> DbResult<bool> {
    let n: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM trips WHERE trip_id = ?",
            duckdb::params![trip_id],
            |row| row.get(0),
        )
        .query_context("look up trip")?;
    Ok(n > 0)
}

/// All trip ids, ascending.
pub fn all_ids(conn: &Connection) -> DbResult<Vec<TripId>> {
    let mut stmt = conn
        .prepare("SELECT DISTINCT trip_id FROM trips ORDER BY trip_id")
        .query_context("prepare trip list")?;
    let ids = stmt
        .query_map([], |row| row.get(0))
        .query_context("list trips")?
        .collect::<Result<Vec<TripId>, _>>()
        .query_context("read trip row")?;
    Ok(ids)
}

/// Register a trip if it is not already known.
pub fn insert(conn: &Connection, trip_id: TripId, created_by: Option<i64>) -> DbResult<()> {
    if exists(conn, trip_id)? {
        return Ok(());
    }
    conn.execute(
        "INSERT INTO trips (trip_id, created_by, created_date) VALUES (?, ?, strftime(now(), '%Y-%m-%d %H:%M:%S'))",
        duckdb::params![trip_id, created_by],
    )
    .query_context("insert trip")?;
    Ok(())
}

//! Per-trip sync status rows (`db_sync`).

use crate::error::{DbError, DbResult, DbResultExt};
use duckdb::{Connection, OptionalExt};
use tc_core::{SyncStatus, TripId};

fn decode(code: i64) -> DbResult<SyncStatus> {
    SyncStatus::from_code(code).map_err(|e| DbError::CorruptRow {
        table: "db_sync".to_string(),
        message: e.to_string(),
    })
}

pub fn get(conn: &Connection, trip_id: TripId) -> DbResult<Option<SyncStatus>> {
    let code: Option<i64> = conn
        .query_row(
            "SELECT sync_status FROM db_sync WHERE trip_id = ? LIMIT 1",
            duckdb::params![trip_id],
            |row| row.get(0),
        )
        .optional()
        .query_context("read sync status")?;
    code.map(decode).transpose()
}

/// Current status, inserting `initial` first when the trip is untracked.
pub fn get_or_insert(conn: &Connection, trip_id: TripId, initial: SyncStatus) -> DbResult<SyncStatus> {
    match get(conn, trip_id)? {
        Some(status) => Ok(status),
        None => {
            set(conn, trip_id, initial)?;
            log::debug!("Tracking sync status for trip {trip_id}");
            Ok(initial)
        }
    }
}

/// Upsert the trip's status.
pub fn set(conn: &Connection, trip_id: TripId, status: SyncStatus) -> DbResult<()> {
    let updated = conn
        .execute(
            "UPDATE db_sync SET sync_status = ?, updated_at = now() WHERE trip_id = ?",
            duckdb::params![status.code(), trip_id],
        )
        .query_context("update sync status")?;
    if updated == 0 {
        conn.execute(
            "INSERT INTO db_sync (trip_id, sync_status) VALUES (?, ?)",
            duckdb::params![trip_id, status.code()],
        )
        .query_context("insert sync status")?;
    }
    Ok(())
}

/// Trip ids whose status is one of `statuses`, ascending.
pub fn trip_ids_with(conn: &Connection, statuses: &[SyncStatus]) -> DbResult<Vec<TripId>> {
    Ok(all(conn)?
        .into_iter()
        .filter(|(_, s)| statuses.contains(s))
        .map(|(id, _)| id)
        .collect())
}

/// Every tracked trip with its status, ascending by trip id.
pub fn all(conn: &Connection) -> DbResult<Vec<(TripId, SyncStatus)>> {
    let mut stmt = conn
        .prepare("SELECT trip_id, sync_status FROM db_sync ORDER BY trip_id")
        .query_context("prepare sync status query")?;
    let rows = stmt
        .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)))
        .query_context("query sync status")?
        .collect::<Result<Vec<_>, _>>()
        .query_context("read sync status row")?;
    rows.into_iter()
        .map(|(id, code)| Ok((id, decode(code)?)))
        .collect()
}

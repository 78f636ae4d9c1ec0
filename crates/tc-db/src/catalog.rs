//! The synced check catalog (`trip_checks`).

use crate::error::{DbError, DbResult, DbResultExt};
use duckdb::Connection;
use std::collections::BTreeSet;
use tc_core::Check;

/// Replace the catalog wholesale.
///
/// Rejects duplicate ids before touching the table. Callers wrap this in a
/// transaction so readers never see a half-written catalog.
pub fn replace(conn: &Connection, checks: &[Check]) -> DbResult<()> {
    let mut seen = BTreeSet::new();
    for check in checks {
        if !seen.insert(check.id) {
            return Err(DbError::DuplicateCheckId(check.id));
        }
    }

    conn.execute("DELETE FROM trip_checks", [])
        .query_context("clear trip_checks")?;
    let mut stmt = conn
        .prepare(
            "INSERT INTO trip_checks (trip_check_id, check_message, check_sql, debriefer_only)
             VALUES (?, ?, ?, ?)",
        )
        .query_context("prepare trip_checks insert")?;
    for check in checks {
        stmt.execute(duckdb::params![
            check.id,
            check.message,
            check.sql,
            check.debriefer_only
        ])
        .query_context("insert trip_check")?;
    }
    Ok(())
}

/// Load the catalog ordered by id.
pub fn load(conn: &Connection) -> DbResult<Vec<Check>> {
    let mut stmt = conn
        .prepare(
            "SELECT trip_check_id, check_message, check_sql, debriefer_only
             FROM trip_checks ORDER BY trip_check_id",
        )
        .query_context("prepare trip_checks query")?;
    let checks = stmt
        .query_map([], |row| {
            Ok(Check {
                id: row.get(0)?,
                message: row.get(1)?,
                sql: row.get(2)?,
                debriefer_only: row.get(3)?,
            })
        })
        .query_context("query trip_checks")?
        .collect::<Result<Vec<_>, _>>()
        .query_context("read trip_check row")?;
    Ok(checks)
}

pub fn count(conn: &Connection) -> DbResult<usize> {
    let n: i64 = conn
        .query_row("SELECT COUNT(*) FROM trip_checks", [], |row| row.get(0))
        .query_context("count trip_checks")?;
    Ok(n as usize)
}

/// Ids of checks flagged debriefer-only.
pub fn debriefer_only_ids(conn: &Connection) -> DbResult<BTreeSet<i64>> {
    let mut stmt = conn
        .prepare("SELECT trip_check_id FROM trip_checks WHERE debriefer_only")
        .query_context("prepare debriefer_only query")?;
    let ids = stmt
        .query_map([], |row| row.get(0))
        .query_context("query debriefer_only checks")?
        .collect::<Result<BTreeSet<i64>, _>>()
        .query_context("read trip_check row")?;
    Ok(ids)
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;

//! Issue store (`trip_issues`).
//!
//! Rows are inserted by check bodies. The engine only counts, stamps,
//! deletes, and reads them. `created_date` carries the run version.
//! Stamping never overwrites a non-null `created_date`.

use crate::error::{DbError, DbResult, DbResultExt};
use duckdb::{Connection, OptionalExt};
use std::collections::BTreeMap;
use tc_core::{Issue, RunVersion, TripId};

const ISSUE_COLUMNS: &str = "trip_issue_id, trip_check_id, trip_id, created_date, created_by, \
     fishing_activity_id, fishing_activity_num, fishing_location_id, catch_id, catch_num, \
     species_composition_id, species_comp_item_id, bio_specimen_id, bio_specimen_item_id, \
     length_frequency_id, dissection_id, fish_ticket_id, species_name, error_item, error_value, notes";

/// Every issue row for the trip, regardless of version.
pub fn count_for_trip(conn: &Connection, trip_id: TripId) -> DbResult<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM trip_issues WHERE trip_id = ?",
        duckdb::params![trip_id],
        |row| row.get(0),
    )
    .map_err(DbError::from)
}

pub fn count_version(conn: &Connection, trip_id: TripId, version: &RunVersion) -> DbResult<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM trip_issues WHERE trip_id = ? AND created_date = ?",
        duckdb::params![trip_id, version.as_str()],
        |row| row.get(0),
    )
    .query_context("count issues for run")
}

/// Highest issue id present for the trip, 0 when it has none.
///
/// Ids come from `trip_issue_seq`, so rows inserted later compare greater.
pub fn max_issue_id(conn: &Connection, trip_id: TripId) -> DbResult<i64> {
    conn.query_row(
        "SELECT COALESCE(MAX(trip_issue_id), 0) FROM trip_issues WHERE trip_id = ?",
        duckdb::params![trip_id],
        |row| row.get(0),
    )
    .map_err(DbError::from)
}

/// Stamp the rows added for the trip after issue `after_id` with `version`.
///
/// Rows already stamped with `version` are accepted. A new row carrying any
/// other `created_date` is a [`DbError::StampConflict`] and nothing is
/// updated. Returns the number of rows stamped.
pub fn stamp_added(
    conn: &Connection,
    trip_id: TripId,
    after_id: i64,
    version: &RunVersion,
) -> DbResult<usize> {
    let conflict: Option<(i64, String)> = conn
        .query_row(
            "SELECT trip_issue_id, created_date FROM trip_issues
             WHERE trip_id = ? AND trip_issue_id > ?
               AND created_date IS NOT NULL AND created_date <> ?
             ORDER BY trip_issue_id
             LIMIT 1",
            duckdb::params![trip_id, after_id, version.as_str()],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()
        .map_err(DbError::from)?;
    if let Some((issue_id, value)) = conflict {
        return Err(DbError::StampConflict { issue_id, value });
    }

    conn.execute(
        "UPDATE trip_issues SET created_date = ?
         WHERE trip_id = ? AND created_date IS NULL
           AND (trip_issue_id > ? OR trip_issue_id IS NULL)",
        duckdb::params![version.as_str(), trip_id, after_id],
    )
    .map_err(DbError::from)
}

/// Delete the issues of one run.
pub fn delete_version(conn: &Connection, trip_id: TripId, version: &RunVersion) -> DbResult<usize> {
    conn.execute(
        "DELETE FROM trip_issues WHERE trip_id = ? AND created_date = ?",
        duckdb::params![trip_id, version.as_str()],
    )
    .query_context("delete run issues")
}

/// Delete every issue of the trip not stamped with `version`, unstamped
/// rows included.
pub fn delete_other_versions(
    conn: &Connection,
    trip_id: TripId,
    version: &RunVersion,
) -> DbResult<usize> {
    conn.execute(
        "DELETE FROM trip_issues
         WHERE trip_id = ? AND (created_date IS NULL OR created_date <> ?)",
        duckdb::params![trip_id, version.as_str()],
    )
    .query_context("delete superseded issues")
}

/// Highest run version present for the trip.
///
/// Values that do not parse as a run version are skipped.
pub fn max_version(conn: &Connection, trip_id: TripId) -> DbResult<Option<RunVersion>> {
    let mut stmt = conn
        .prepare(
            "SELECT DISTINCT created_date FROM trip_issues
             WHERE trip_id = ? AND created_date IS NOT NULL",
        )
        .query_context("prepare issue version query")?;
    let raw = stmt
        .query_map(duckdb::params![trip_id], |row| row.get::<_, String>(0))
        .query_context("read issue versions")?
        .collect::<Result<Vec<_>, _>>()
        .query_context("read issue version row")?;
    Ok(raw
        .iter()
        .filter_map(|value| match RunVersion::parse(value) {
            Ok(version) => Some(version),
            Err(_) => {
                log::debug!("Trip {trip_id}: ignoring issue created_date '{value}'");
                None
            }
        })
        .max())
}

/// Issues of one run ordered by check id then issue id.
pub fn list_version(
    conn: &Connection,
    trip_id: TripId,
    version: &RunVersion,
) -> DbResult<Vec<Issue>> {
    let sql = format!(
        "SELECT {ISSUE_COLUMNS} FROM trip_issues
         WHERE trip_id = ? AND created_date = ?
         ORDER BY trip_check_id, trip_issue_id"
    );
    let mut stmt = conn.prepare(&sql).query_context("prepare issue query")?;
    let rows = stmt
        .query_map(duckdb::params![trip_id, version.as_str()], |row| {
            let created_date: Option<String> = row.get(3)?;
            Ok((
                created_date,
                Issue {
                    issue_id: row.get(0)?,
                    check_id: row.get(1)?,
                    trip_id: row.get(2)?,
                    run_version: None,
                    created_by: row.get(4)?,
                    fishing_activity_id: row.get(5)?,
                    fishing_activity_num: row.get(6)?,
                    fishing_location_id: row.get(7)?,
                    catch_id: row.get(8)?,
                    catch_num: row.get(9)?,
                    species_composition_id: row.get(10)?,
                    species_comp_item_id: row.get(11)?,
                    bio_specimen_id: row.get(12)?,
                    bio_specimen_item_id: row.get(13)?,
                    length_frequency_id: row.get(14)?,
                    dissection_id: row.get(15)?,
                    fish_ticket_id: row.get(16)?,
                    species_name: row.get(17)?,
                    error_item: row.get(18)?,
                    error_value: row.get(19)?,
                    notes: row.get(20)?,
                },
            ))
        })
        .query_context("query issues")?
        .collect::<Result<Vec<_>, _>>()
        .query_context("read issue row")?;

    rows.into_iter()
        .map(|(created_date, mut issue)| {
            issue.run_version = created_date.as_deref().map(parse_version).transpose()?;
            Ok(issue)
        })
        .collect()
}

/// Issue counts per haul number for one run. Issues without a haul number
/// are not counted.
pub fn counts_by_haul(
    conn: &Connection,
    trip_id: TripId,
    version: &RunVersion,
) -> DbResult<BTreeMap<i64, usize>> {
    let mut stmt = conn
        .prepare(
            "SELECT fishing_activity_num, COUNT(*) FROM trip_issues
             WHERE trip_id = ? AND created_date = ? AND fishing_activity_num IS NOT NULL
             GROUP BY fishing_activity_num",
        )
        .query_context("prepare haul count query")?;
    let counts = stmt
        .query_map(duckdb::params![trip_id, version.as_str()], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)? as usize))
        })
        .query_context("query haul counts")?
        .collect::<Result<BTreeMap<_, _>, _>>()
        .query_context("read haul count row")?;
    Ok(counts)
}

fn parse_version(raw: &str) -> DbResult<RunVersion> {
    RunVersion::parse(raw).map_err(|e| DbError::CorruptRow {
        table: "trip_issues".to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
#[path = "issues_test.rs"]
mod tests;

//! Classification cache (`trip_check_classifications`).

use crate::error::{DbError, DbResult, DbResultExt};
use duckdb::Connection;
use std::collections::BTreeMap;
use tc_core::{CheckId, Classification, ClassificationStatus};

/// Drop every cached classification.
pub fn clear(conn: &Connection) -> DbResult<()> {
    conn.execute("DELETE FROM trip_check_classifications", [])
        .query_context("clear classifications")?;
    Ok(())
}

pub fn insert(conn: &Connection, c: &Classification) -> DbResult<()> {
    conn.execute(
        "INSERT INTO trip_check_classifications (trip_check_id, status_code, rewritten_sql, detail)
         VALUES (?, ?, ?, ?)",
        duckdb::params![c.check_id, c.status.code(), c.rewritten_sql, c.detail],
    )
    .query_context("insert classification")?;
    Ok(())
}

/// Load the cache keyed by check id.
pub fn load(conn: &Connection) -> DbResult<BTreeMap<CheckId, Classification>> {
    let mut stmt = conn
        .prepare(
            "SELECT trip_check_id, status_code, rewritten_sql, detail
             FROM trip_check_classifications ORDER BY trip_check_id",
        )
        .query_context("prepare classification query")?;
    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, Option<String>>(3)?,
            ))
        })
        .query_context("query classifications")?
        .collect::<Result<Vec<_>, _>>()
        .query_context("read classification row")?;

    let mut map = BTreeMap::new();
    for (check_id, code, rewritten_sql, detail) in rows {
        let status = ClassificationStatus::from_code(code).map_err(|e| DbError::CorruptRow {
            table: "trip_check_classifications".to_string(),
            message: e.to_string(),
        })?;
        map.insert(
            check_id,
            Classification {
                check_id,
                status,
                rewritten_sql,
                detail,
            },
        );
    }
    Ok(map)
}

/// Row count and number of distinct check ids.
pub fn counts(conn: &Connection) -> DbResult<(usize, usize)> {
    let (total, distinct): (i64, i64) = conn
        .query_row(
            "SELECT COUNT(*), COUNT(DISTINCT trip_check_id) FROM trip_check_classifications",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .query_context("count classifications")?;
    Ok((total as usize, distinct as usize))
}

/// Number of cached classifications per status.
pub fn summary(conn: &Connection) -> DbResult<BTreeMap<ClassificationStatus, usize>> {
    let mut stmt = conn
        .prepare(
            "SELECT status_code, COUNT(*) FROM trip_check_classifications
             GROUP BY status_code ORDER BY status_code",
        )
        .query_context("prepare classification summary")?;
    let rows = stmt
        .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)))
        .query_context("query classification summary")?
        .collect::<Result<Vec<_>, _>>()
        .query_context("read classification summary row")?;

    rows.into_iter()
        .map(|(code, n)| {
            ClassificationStatus::from_code(code)
                .map(|s| (s, n as usize))
                .map_err(|e| DbError::CorruptRow {
                    table: "trip_check_classifications".to_string(),
                    message: e.to_string(),
                })
        })
        .collect()
}

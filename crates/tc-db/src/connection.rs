//! Trip database connection wrapper.
//!
//! [`TripDb`] owns a DuckDB [`Connection`] behind a mutex. The background run
//! worker and foreground readers share one `Arc<TripDb>`; every statement or
//! per-check transaction holds the lock only for its own duration.

use crate::error::{DbError, DbResult};
use crate::macros::install_macros;
use crate::migration::run_migrations;
use duckdb::Connection;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Wrapper around the trip database connection.
pub struct TripDb {
    conn: Mutex<Connection>,
}

impl TripDb {
    /// Open (or create) the database at `path`, run pending migrations, and
    /// install the SQL helper macros.
    pub fn open(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| DbError::ConnectionError(format!("{e}: {}", path.display())))?;
        Self::init(conn)
    }

    /// Create an in-memory database with all migrations applied.
    pub fn open_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Self::init(conn)
    }

    /// Open `:memory:` or a file path, as written in configuration.
    pub fn open_configured(path: &str) -> DbResult<Self> {
        if path == ":memory:" {
            Self::open_memory()
        } else {
            Self::open(Path::new(path))
        }
    }

    fn init(conn: Connection) -> DbResult<Self> {
        run_migrations(&conn)?;
        install_macros(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> DbResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))
    }

    /// Run `body` with the connection locked, in auto-commit mode.
    pub fn with_conn<F, T>(&self, body: F) -> DbResult<T>
    where
        F: FnOnce(&Connection) -> DbResult<T>,
    {
        let conn = self.lock()?;
        body(&conn)
    }

    /// Execute `body` within a `BEGIN` / `COMMIT` transaction, rolling back on
    /// error.
    pub fn transaction<F, T>(&self, body: F) -> DbResult<T>
    where
        F: FnOnce(&Connection) -> DbResult<T>,
    {
        let conn = self.lock()?;
        begin(&conn)?;

        let result = body(&conn);

        match &result {
            Ok(_) => {
                if let Err(commit_err) = conn.execute_batch("COMMIT") {
                    let _ = conn.execute_batch("ROLLBACK");
                    let err = DbError::from(commit_err);
                    // Commit-time conflicts stay retryable
                    return Err(match err {
                        DbError::Contention(_) => err,
                        other => DbError::TransactionError(format!("COMMIT failed: {other}")),
                    });
                }
            }
            Err(_) => {
                let _ = conn.execute_batch("ROLLBACK");
            }
        }
        result
    }

    /// Execute `body` within a transaction that is always rolled back.
    ///
    /// Used for trial runs: whatever the body writes is discarded, and its
    /// result (including driver errors) is returned unchanged.
    pub fn rollback_only<F, T>(&self, body: F) -> DbResult<T>
    where
        F: FnOnce(&Connection) -> DbResult<T>,
    {
        let conn = self.lock()?;
        begin(&conn)?;
        let result = body(&conn);
        conn.execute_batch("ROLLBACK")
            .map_err(|e| DbError::TransactionError(format!("ROLLBACK failed: {e}")))?;
        result
    }

    /// Execute a batch of statements in auto-commit mode.
    pub fn execute_batch(&self, sql: &str) -> DbResult<()> {
        self.with_conn(|conn| conn.execute_batch(sql).map_err(DbError::from))
    }
}

fn begin(conn: &Connection) -> DbResult<()> {
    conn.execute_batch("BEGIN TRANSACTION")
        .map_err(|e| DbError::TransactionError(format!("BEGIN failed: {e}")))
}

#[cfg(test)]
#[path = "connection_test.rs"]
mod tests;

//! Error types for tc-db

use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

/// Database operation errors
#[derive(Error, Debug)]
pub enum DbError {
    /// Connection error (D001)
    #[error("[D001] Database connection failed: {0}")]
    ConnectionError(String),

    /// Query execution error (D002)
    #[error("[D002] SQL execution failed: {0}")]
    ExecutionError(String),

    /// Referenced table does not exist (D003)
    #[error("[D003] Table not found: {table}")]
    MissingTable { table: String, message: String },

    /// Qualified column reference does not resolve (D004)
    #[error("[D004] Column not found: {table}.{column}")]
    MissingColumn {
        table: String,
        column: String,
        message: String,
    },

    /// Lock or write-write conflict; the statement may succeed if retried (D005)
    #[error("[D005] Database contention: {0}")]
    Contention(String),

    /// Mutex poisoned (D006)
    #[error("[D006] Database mutex poisoned: {0}")]
    MutexPoisoned(String),

    /// Schema migration failed (D007)
    #[error("[D007] Database migration failed: {0}")]
    MigrationError(String),

    /// Transaction management error (D008)
    #[error("[D008] Database transaction failed: {0}")]
    TransactionError(String),

    /// Catalog contains the same check id twice (D009)
    #[error("[D009] Duplicate check id in catalog: {0}")]
    DuplicateCheckId(i64),

    /// Stored row could not be interpreted (D010)
    #[error("[D010] Corrupt row in {table}: {message}")]
    CorruptRow { table: String, message: String },

    /// A new issue row already carries a different run version (D011)
    #[error("[D011] Issue {issue_id} was inserted with created_date '{value}'; refusing to overwrite it")]
    StampConflict { issue_id: i64, value: String },
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;

impl DbError {
    /// Whether retrying the same statement may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, DbError::Contention(_))
    }

    /// Whether the error names a table or qualified column the database
    /// lacks.
    pub fn is_missing_data(&self) -> bool {
        matches!(
            self,
            DbError::MissingTable { .. } | DbError::MissingColumn { .. }
        )
    }
}

static MISSING_TABLE_RE: OnceLock<Regex> = OnceLock::new();
static MISSING_COLUMN_RE: OnceLock<Regex> = OnceLock::new();

fn missing_table_re() -> &'static Regex {
    MISSING_TABLE_RE.get_or_init(|| {
        Regex::new(r#"Table with name "?([^\s"!]+)"? does not exist"#).expect("valid regex")
    })
}

fn missing_column_re() -> &'static Regex {
    MISSING_COLUMN_RE.get_or_init(|| {
        Regex::new(r#"Table "([^"]+)" does not have a column named "([^"]+)""#)
            .expect("valid regex")
    })
}

const CONTENTION_MARKERS: &[&str] = &[
    "write-write conflict",
    "Conflict on tuple",
    "Could not set lock",
    "database is locked",
];

impl From<duckdb::Error> for DbError {
    fn from(err: duckdb::Error) -> Self {
        // duckdb::Error does not expose structured variants for catalog or
        // binder failures, so classification is done on the message text.
        let msg = err.to_string();
        if let Some(caps) = missing_table_re().captures(&msg) {
            return DbError::MissingTable {
                table: caps[1].to_string(),
                message: msg.clone(),
            };
        }
        if let Some(caps) = missing_column_re().captures(&msg) {
            return DbError::MissingColumn {
                table: caps[1].to_string(),
                column: caps[2].to_string(),
                message: msg.clone(),
            };
        }
        if CONTENTION_MARKERS.iter().any(|m| msg.contains(m)) {
            return DbError::Contention(msg);
        }
        DbError::ExecutionError(msg)
    }
}

/// Attach a short description of the failing operation to driver errors.
///
/// Classified variants are kept as-is so callers can still match on them.
pub trait DbResultExt<T> {
    fn query_context(self, what: &str) -> DbResult<T>;
}

impl<T> DbResultExt<T> for Result<T, duckdb::Error> {
    fn query_context(self, what: &str) -> DbResult<T> {
        self.map_err(|e| match DbError::from(e) {
            DbError::ExecutionError(msg) => DbError::ExecutionError(format!("{what}: {msg}")),
            other => other,
        })
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;

//! Error types for tc-sql

use thiserror::Error;

/// SQL layer errors
#[derive(Error, Debug)]
pub enum SqlError {
    /// S001: Tokenizer rejected the input
    #[error("[S001] SQL tokenize error: {0}")]
    TokenizeError(String),
}

/// Result type alias for SqlError
pub type SqlResult<T> = Result<T, SqlError>;

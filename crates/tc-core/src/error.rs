//! Error types for tc-core

use thiserror::Error;

/// Core error type for Tripcheck
#[derive(Error, Debug)]
pub enum CoreError {
    /// C001: Configuration file not found
    #[error("[C001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// C002: Invalid configuration value
    #[error("[C002] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// C003: Catalog file could not be interpreted
    #[error("[C003] Invalid check catalog {path}: {message}")]
    CatalogInvalid { path: String, message: String },

    /// C004: Malformed run version string
    #[error("[C004] Invalid run version '{value}': expected YYYY-MM-DD HH:MM:SS")]
    InvalidRunVersion { value: String },

    /// C005: Unknown stored status code
    #[error("[C005] Unknown {kind} code: {code}")]
    UnknownStatusCode { kind: &'static str, code: i64 },

    /// C006: IO error
    #[error("[C006] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// C007: IO error with file path context
    #[error("[C007] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// C008: YAML parse error
    #[error("[C008] Config parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;

//! Error types for tc-engine

use tc_core::{CoreError, SyncStatus, TripId};
use tc_db::DbError;
use thiserror::Error;

/// Engine errors surfaced to callers
#[derive(Error, Debug)]
pub enum EngineError {
    /// T001: Trip not present in the database
    #[error("[T001] Trip {0} does not exist")]
    InvalidTrip(TripId),

    /// T002: Another background run holds the run guard
    #[error("[T002] A trip check run is already in progress")]
    RunAlreadyInProgress,

    /// T003: Run requested before the catalog was classified
    #[error("[T003] The check catalog has not been classified")]
    CatalogNotClassified,

    /// T004: Sync status change not allowed by the state machine
    #[error("[T004] Trip {trip_id}: cannot change sync status from {from} to {to}")]
    InvalidTransition {
        trip_id: TripId,
        from: SyncStatus,
        to: SyncStatus,
    },

    /// T005: Background run requested outside a tokio runtime
    #[error("[T005] No async runtime available to start a background run")]
    NoRuntime,

    /// Database error
    #[error(transparent)]
    Db(#[from] DbError),

    /// Core error
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Result type alias for EngineError
pub type EngineResult<T> = Result<T, EngineError>;

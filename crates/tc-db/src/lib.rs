//! Embedded database for Tripcheck.
//!
//! A DuckDB-backed store holding the synced check catalog, cached
//! classifications, trip issues, run bookkeeping, and per-trip sync status.
//! Table access is exposed as free functions over a borrowed
//! [`duckdb::Connection`], so callers compose them inside
//! [`TripDb::transaction`] or [`TripDb::with_conn`].

pub mod catalog;
pub mod classifications;
pub mod connection;
pub mod ddl;
pub mod error;
pub mod issues;
pub mod macros;
pub mod markers;
pub mod migration;
pub mod settings;
pub mod sync;
pub mod trips;

pub use connection::TripDb;
pub use error::{DbError, DbResult, DbResultExt};

//! tc-core - Core library for Tripcheck
//!
//! Shared domain types for the trip check engine: the check catalog,
//! classification verdicts, issue records, run versions, sync status, plus
//! configuration parsing and catalog checksums.

pub mod check;
pub mod checksum;
pub mod classification;
pub mod config;
pub mod error;
pub mod issue;
pub mod run;
pub mod sync_status;

pub use check::{load_catalog_json, Check, CheckId, TripId, UserId};
pub use checksum::{catalog_checksum, compute_checksum, hash_list};
pub use classification::{Classification, ClassificationStatus};
pub use config::Config;
pub use error::{CoreError, CoreResult};
pub use issue::{Issue, RunVersion};
pub use run::{CheckOutcome, ExecutionStatus, Tally};
pub use sync_status::SyncStatus;

//! tc-engine - the trip check engine
//!
//! Classifies the synced check catalog for on-device executability, runs the
//! runnable checks against one trip, versions and prunes the resulting
//! issues, coordinates single-flight background runs, and tracks per-trip
//! sync status.

pub mod classifier;
pub mod coordinator;
pub mod error;
pub mod executor;
pub mod lifecycle;
pub mod progress;
pub mod queries;
pub mod sync_tracker;

pub use classifier::{ClassificationPass, Classifier};
pub use coordinator::{RunCoordinator, RunEvent, RunGuard, RunHandle, RunOutcome};
pub use error::{EngineError, EngineResult};
pub use executor::{ExecutionReport, Executor};
pub use lifecycle::{CompletionSummary, RunLifecycle};
pub use progress::{ChunkProgress, Phase, RunControl};
pub use queries::{trip_check_summary, visible_latest_issues, TripCheckSummary};
pub use sync_tracker::SyncTracker;

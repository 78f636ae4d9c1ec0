//! Per-trip upload state machine.
//!
//! ```text
//!   IN_PROGRESS ──► READY ──► COMPLETED
//!        ▲          │  ▲          │
//!        │          ▼  │          │
//!        │         ERROR          │
//!        └──── (any state) ◄──────┘
//! ```

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sync status of a trip as seen by the upload collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncStatus {
    /// Data entry still under way (initial state)
    InProgress,
    /// Awaiting upload
    Ready,
    /// Last upload attempt failed
    Error,
    /// Uploaded
    Completed,
}

impl SyncStatus {
    pub const ALL: [SyncStatus; 4] = [
        SyncStatus::Ready,
        SyncStatus::InProgress,
        SyncStatus::Error,
        SyncStatus::Completed,
    ];

    /// Stored code
    pub fn code(self) -> i64 {
        match self {
            SyncStatus::Ready => 0,
            SyncStatus::InProgress => 1,
            SyncStatus::Error => 2,
            SyncStatus::Completed => 3,
        }
    }

    pub fn from_code(code: i64) -> CoreResult<Self> {
        Self::ALL
            .into_iter()
            .find(|s| s.code() == code)
            .ok_or(CoreError::UnknownStatusCode {
                kind: "sync status",
                code,
            })
    }

    /// Human-readable label shown next to the trip.
    pub fn description(self) -> &'static str {
        match self {
            SyncStatus::InProgress => "Trip in Progress",
            SyncStatus::Ready => "Ready to Sync",
            SyncStatus::Error => "Partially Synced - Retry",
            SyncStatus::Completed => "Sync Completed",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SyncStatus::InProgress => "IN_PROGRESS",
            SyncStatus::Ready => "READY",
            SyncStatus::Error => "ERROR",
            SyncStatus::Completed => "COMPLETED",
        }
    }

    /// Whether `self -> next` is a legal single transition.
    ///
    /// Any state may return to `InProgress`. Staying in place is not a
    /// transition.
    pub fn can_transition_to(self, next: SyncStatus) -> bool {
        matches!(
            (self, next),
            (SyncStatus::InProgress, SyncStatus::Ready)
                | (SyncStatus::Ready, SyncStatus::Completed)
                | (SyncStatus::Ready, SyncStatus::Error)
                | (SyncStatus::Error, SyncStatus::Ready)
                | (SyncStatus::Ready, SyncStatus::InProgress)
                | (SyncStatus::Error, SyncStatus::InProgress)
                | (SyncStatus::Completed, SyncStatus::InProgress)
        )
    }

    /// Next state when the observer cycles the status by hand.
    pub fn cycle_next(self) -> SyncStatus {
        match self {
            SyncStatus::Error | SyncStatus::InProgress => SyncStatus::Ready,
            SyncStatus::Ready => SyncStatus::Completed,
            SyncStatus::Completed => SyncStatus::InProgress,
        }
    }

    /// Trips in these states are waiting for an upload attempt.
    pub fn awaits_upload(self) -> bool {
        matches!(self, SyncStatus::Ready | SyncStatus::Error)
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[path = "sync_status_test.rs"]
mod tests;

//! Per-trip sync status tracking.
//!
//! A trip is tracked from the first time any operation touches it, starting
//! in `IN_PROGRESS`. Requests for the state a trip is already in are no-ops.

use crate::error::{EngineError, EngineResult};
use tc_core::{SyncStatus, TripId};
use tc_db::{sync, trips, TripDb};

/// Reads and moves trips through the sync state machine.
pub struct SyncTracker<'a> {
    db: &'a TripDb,
}

impl<'a> SyncTracker<'a> {
    pub fn new(db: &'a TripDb) -> Self {
        Self { db }
    }

    /// Current status, creating the trip in `IN_PROGRESS` if untracked.
    pub fn status(&self, trip_id: TripId) -> EngineResult<SyncStatus> {
        Ok(self
            .db
            .transaction(|conn| sync::get_or_insert(conn, trip_id, SyncStatus::InProgress))?)
    }

    pub fn mark_ready(&self, trip_id: TripId) -> EngineResult<SyncStatus> {
        self.apply(trip_id, |_| SyncStatus::Ready)
    }

    pub fn mark_in_progress(&self, trip_id: TripId) -> EngineResult<SyncStatus> {
        self.apply(trip_id, |_| SyncStatus::InProgress)
    }

    /// An upload attempt for a `READY` trip failed.
    pub fn mark_export_failed(&self, trip_id: TripId) -> EngineResult<SyncStatus> {
        self.apply(trip_id, |_| SyncStatus::Error)
    }

    /// A `READY` trip was uploaded.
    pub fn mark_export_completed(&self, trip_id: TripId) -> EngineResult<SyncStatus> {
        self.apply(trip_id, |_| SyncStatus::Completed)
    }

    /// Advance the trip one step around the manual cycle.
    pub fn cycle_status(&self, trip_id: TripId) -> EngineResult<SyncStatus> {
        self.apply(trip_id, SyncStatus::cycle_next)
    }

    pub fn completed_trip_ids(&self) -> EngineResult<Vec<TripId>> {
        Ok(self
            .db
            .with_conn(|conn| sync::trip_ids_with(conn, &[SyncStatus::Completed]))?)
    }

    /// Trips awaiting an upload attempt (`READY` or `ERROR`).
    pub fn ready_trip_ids(&self) -> EngineResult<Vec<TripId>> {
        let awaiting: Vec<SyncStatus> = SyncStatus::ALL
            .into_iter()
            .filter(|s| s.awaits_upload())
            .collect();
        Ok(self
            .db
            .with_conn(|conn| sync::trip_ids_with(conn, &awaiting))?)
    }

    /// Start tracking every known trip that has no status yet. Returns how
    /// many were added.
    pub fn track_all_trips(&self) -> EngineResult<usize> {
        let added = self.db.transaction(|conn| {
            let mut added = 0;
            for trip_id in trips::all_ids(conn)? {
                if sync::get(conn, trip_id)?.is_none() {
                    sync::set(conn, trip_id, SyncStatus::InProgress)?;
                    added += 1;
                }
            }
            Ok(added)
        })?;
        if added > 0 {
            log::info!("Started tracking sync status for {added} trips");
        }
        Ok(added)
    }

    /// Every tracked trip with its status, ascending by trip id.
    pub fn overview(&self) -> EngineResult<Vec<(TripId, SyncStatus)>> {
        Ok(self.db.with_conn(sync::all)?)
    }

    /// Read and move in one transaction. A rejected move still commits the
    /// initial tracking row.
    fn apply(
        &self,
        trip_id: TripId,
        target: impl FnOnce(SyncStatus) -> SyncStatus,
    ) -> EngineResult<SyncStatus> {
        let (from, to, moved) = self.db.transaction(|conn| {
            let from = sync::get_or_insert(conn, trip_id, SyncStatus::InProgress)?;
            let to = target(from);
            let moved = from != to && from.can_transition_to(to);
            if moved {
                sync::set(conn, trip_id, to)?;
            }
            Ok((from, to, moved))
        })?;
        if from == to {
            return Ok(to);
        }
        if !moved {
            return Err(EngineError::InvalidTransition { trip_id, from, to });
        }
        log::info!("Trip {trip_id} sync status {from} -> {to}");
        Ok(to)
    }
}

#[cfg(test)]
#[path = "sync_tracker_test.rs"]
mod tests;

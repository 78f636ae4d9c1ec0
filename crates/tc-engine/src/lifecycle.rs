//! Run lifecycle: finalize or abandon the issues of one run version.

use crate::error::EngineResult;
use std::collections::BTreeMap;
use tc_core::{Issue, RunVersion, TripId};
use tc_db::{issues, markers, TripDb};

/// What [`RunLifecycle::complete`] changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionSummary {
    pub trip_id: TripId,
    pub run_version: RunVersion,
    /// Issues kept for the completed run
    pub issue_count: usize,
    /// Issues from older or unstamped runs that were deleted
    pub pruned: usize,
    pub error_free: bool,
}

/// Finalizes runs and answers questions about the latest completed one.
pub struct RunLifecycle<'a> {
    db: &'a TripDb,
}

impl<'a> RunLifecycle<'a> {
    pub fn new(db: &'a TripDb) -> Self {
        Self { db }
    }

    /// Delete every issue stamped `run_version` for the trip.
    pub fn cancel(&self, trip_id: TripId, run_version: &RunVersion) -> EngineResult<usize> {
        let deleted = self
            .db
            .with_conn(|conn| issues::delete_version(conn, trip_id, run_version))?;
        log::info!("Run {run_version} for trip {trip_id} canceled; removed {deleted} issues");
        Ok(deleted)
    }

    /// Keep only the issues of `run_version`, update the error-free marker,
    /// and record the completion.
    ///
    /// # Panics
    ///
    /// Panics unless `run_version` is newer than the trip's last completed
    /// run. Run versions only grow, so an older or equal one has already
    /// been completed or superseded.
    pub fn complete(
        &self,
        trip_id: TripId,
        run_version: &RunVersion,
    ) -> EngineResult<CompletionSummary> {
        let previous = self
            .db
            .with_conn(|conn| markers::last_completed_run(conn, trip_id))?;
        match previous {
            Some(last) if &last == run_version => {
                panic!("run {run_version} for trip {trip_id} completed twice")
            }
            Some(last) if &last > run_version => {
                panic!("run {run_version} for trip {trip_id} completed after newer run {last}")
            }
            _ => {}
        }

        let summary = self.db.transaction(|conn| {
            let pruned = issues::delete_other_versions(conn, trip_id, run_version)?;
            let remaining = issues::count_version(conn, trip_id, run_version)?;
            let error_free = remaining == 0;
            if error_free {
                markers::set_error_free_run(conn, trip_id, run_version)?;
            } else {
                markers::clear_error_free_run(conn, trip_id)?;
            }
            markers::record_completed_run(conn, trip_id, run_version)?;
            Ok(CompletionSummary {
                trip_id,
                run_version: run_version.clone(),
                issue_count: remaining as usize,
                pruned,
                error_free,
            })
        })?;

        if summary.pruned > 0 {
            log::info!(
                "Trip {trip_id}: pruned {} issues superseded by run {run_version}",
                summary.pruned
            );
        }
        if summary.error_free {
            log::info!("Trip {trip_id}: run {run_version} found no issues");
        }
        Ok(summary)
    }

    /// Issues of the most recent completed run, with its version.
    pub fn latest_issues(&self, trip_id: TripId) -> EngineResult<Option<(Vec<Issue>, RunVersion)>> {
        let latest = self.db.with_conn(|conn| {
            let Some(version) = markers::last_completed_run(conn, trip_id)? else {
                return Ok(None);
            };
            let found = issues::list_version(conn, trip_id, &version)?;
            Ok(Some((found, version)))
        })?;
        Ok(latest)
    }

    /// Version of the latest completed run, if it found no issues.
    pub fn error_free_run_date(&self, trip_id: TripId) -> EngineResult<Option<RunVersion>> {
        Ok(self
            .db
            .with_conn(|conn| markers::error_free_run(conn, trip_id))?)
    }

    /// Issue counts per haul for the latest completed run; empty when no
    /// run has completed.
    pub fn issue_counts_by_haul(&self, trip_id: TripId) -> EngineResult<BTreeMap<i64, usize>> {
        let counts = self.db.with_conn(|conn| {
            match markers::last_completed_run(conn, trip_id)? {
                Some(version) => issues::counts_by_haul(conn, trip_id, &version),
                None => Ok(BTreeMap::new()),
            }
        })?;
        Ok(counts)
    }
}

#[cfg(test)]
#[path = "lifecycle_test.rs"]
mod tests;

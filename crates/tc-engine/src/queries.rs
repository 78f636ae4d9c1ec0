//! Read-only views over the latest completed run.

use crate::error::EngineResult;
use crate::lifecycle::RunLifecycle;
use std::fmt;
use tc_core::{Issue, RunVersion, TripId};
use tc_db::{catalog, TripDb};

/// One-line state of a trip's checks
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TripCheckSummary {
    NeverRun,
    ErrorFree { run_version: RunVersion },
    HasIssues { run_version: RunVersion, count: usize },
}

impl fmt::Display for TripCheckSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TripCheckSummary::NeverRun => f.write_str("Trip checks have not been run"),
            TripCheckSummary::ErrorFree { run_version } => {
                write!(f, "No issues as of {run_version}")
            }
            TripCheckSummary::HasIssues { run_version, count } => {
                write!(f, "{count} issue(s) as of {run_version}")
            }
        }
    }
}

pub fn trip_check_summary(db: &TripDb, trip_id: TripId) -> EngineResult<TripCheckSummary> {
    let summary = match RunLifecycle::new(db).latest_issues(trip_id)? {
        None => TripCheckSummary::NeverRun,
        Some((issues, run_version)) if issues.is_empty() => {
            TripCheckSummary::ErrorFree { run_version }
        }
        Some((issues, run_version)) => TripCheckSummary::HasIssues {
            run_version,
            count: issues.len(),
        },
    };
    Ok(summary)
}

/// Latest issues as shown to a user. Issues of debriefer-only checks are
/// hidden unless `debriefer` is set.
pub fn visible_latest_issues(
    db: &TripDb,
    trip_id: TripId,
    debriefer: bool,
) -> EngineResult<Option<(Vec<Issue>, RunVersion)>> {
    let Some((issues, run_version)) = RunLifecycle::new(db).latest_issues(trip_id)? else {
        return Ok(None);
    };
    if debriefer {
        return Ok(Some((issues, run_version)));
    }
    let hidden = db.with_conn(catalog::debriefer_only_ids)?;
    let visible = issues
        .into_iter()
        .filter(|issue| !hidden.contains(&issue.check_id))
        .collect();
    Ok(Some((visible, run_version)))
}

#[cfg(test)]
#[path = "queries_test.rs"]
mod tests;

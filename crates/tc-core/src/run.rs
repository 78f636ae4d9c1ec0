//! Per-check execution outcomes and run tallies.

use crate::check::CheckId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Result of executing (or skipping) one check in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionStatus {
    /// Classification says the check cannot run on the device
    NotRun,
    /// The check inserted at least one issue
    RunTriggered,
    /// The check ran and inserted nothing
    RunNoIssue,
    /// Execution failed after retries, or with a non-transient error
    RunFailedUnexpectedly,
}

impl ExecutionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ExecutionStatus::NotRun => "NOT_RUN",
            ExecutionStatus::RunTriggered => "RUN_TRIGGERED",
            ExecutionStatus::RunNoIssue => "RUN_NO_ISSUE",
            ExecutionStatus::RunFailedUnexpectedly => "RUN_FAILED_UNEXPECTEDLY",
        }
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one check within a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckOutcome {
    pub check_id: CheckId,
    pub status: ExecutionStatus,
    /// Error text for failed checks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Aggregate counts for a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub not_run: usize,
    pub triggered: usize,
    pub no_issue: usize,
    pub failed: usize,
}

impl Tally {
    pub fn record(&mut self, status: ExecutionStatus) {
        match status {
            ExecutionStatus::NotRun => self.not_run += 1,
            ExecutionStatus::RunTriggered => self.triggered += 1,
            ExecutionStatus::RunNoIssue => self.no_issue += 1,
            ExecutionStatus::RunFailedUnexpectedly => self.failed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.not_run + self.triggered + self.no_issue + self.failed
    }

    /// Checks that were actually executed.
    pub fn executed(&self) -> usize {
        self.triggered + self.no_issue + self.failed
    }
}

impl fmt::Display for Tally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} triggered, {} no issue, {} not run, {} failed",
            self.triggered, self.no_issue, self.not_run, self.failed
        )
    }
}

impl FromIterator<ExecutionStatus> for Tally {
    fn from_iter<I: IntoIterator<Item = ExecutionStatus>>(iter: I) -> Self {
        let mut tally = Tally::default();
        for status in iter {
            tally.record(status);
        }
        tally
    }
}

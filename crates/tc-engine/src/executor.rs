//! Rule executor: runs the runnable checks against one trip.
//!
//! Each check runs in its own transaction: count the trip's issues, execute
//! the rendered body, count again, and stamp the rows it added with the run
//! version. A new row that already carries some other `created_date` fails
//! the check. A failed check rolls back completely and the run moves on.
//! Contention errors are retried with exponential backoff.

use crate::classifier::Classifier;
use crate::error::{EngineError, EngineResult};
use crate::progress::{Phase, RunControl};
use std::thread;
use tc_core::config::RetryConfig;
use tc_core::{CheckId, CheckOutcome, Config, ExecutionStatus, RunVersion, Tally, TripId, UserId};
use tc_db::{catalog, issues, markers, trips, DbError, DbResult, TripDb};
use tc_sql::{render, CheckParameters};

/// Result of one execution pass
#[derive(Debug, Clone)]
pub struct ExecutionReport {
    pub trip_id: TripId,
    pub run_version: RunVersion,
    pub tally: Tally,
    /// Outcome per processed check, ascending by check id
    pub outcomes: Vec<CheckOutcome>,
    /// The pass stopped early on a cancellation request
    pub canceled: bool,
}

/// Executes the classified catalog against trips.
pub struct Executor<'a> {
    db: &'a TripDb,
    config: &'a Config,
}

impl<'a> Executor<'a> {
    pub fn new(db: &'a TripDb, config: &'a Config) -> Self {
        Self { db, config }
    }

    /// Run every runnable check for `trip_id`.
    ///
    /// Issues created by this pass carry the returned run version. The pass
    /// does not prune older issues; see [`crate::RunLifecycle`].
    pub fn execute(
        &self,
        trip_id: TripId,
        user_id: UserId,
        control: &mut RunControl<'_>,
    ) -> EngineResult<ExecutionReport> {
        if !self.db.with_conn(|conn| trips::exists(conn, trip_id))? {
            return Err(EngineError::InvalidTrip(trip_id));
        }
        let run_version = self.next_run_version(trip_id)?;

        let classifier = Classifier::new(self.db, self.config);
        let verdicts = if classifier.is_catalog_classified()? {
            classifier.cached()?
        } else {
            log::warn!("Classification cache is stale; classifying before running trip {trip_id}");
            let pass = classifier.classify_catalog(false, control)?;
            if pass.canceled {
                return Ok(ExecutionReport {
                    trip_id,
                    run_version,
                    tally: Tally::default(),
                    outcomes: Vec::new(),
                    canceled: true,
                });
            }
            pass.classifications
        };

        let checks = self.db.with_conn(catalog::load)?;
        let total = checks.len();
        log::info!("Running {total} checks for trip {trip_id} as run {run_version}");

        let mut outcomes = Vec::with_capacity(total);
        let mut canceled = false;
        for (done, check) in checks.iter().enumerate() {
            if control.is_canceled() {
                log::info!("Run {run_version} canceled after {done} of {total} checks");
                canceled = true;
                break;
            }

            let outcome = match verdicts.get(&check.id) {
                Some(verdict) if verdict.is_runnable() => {
                    let body = verdict.rewritten_sql.as_deref().unwrap_or(&check.sql);
                    let params = CheckParameters {
                        trip_id,
                        check_id: check.id,
                        created_by: user_id,
                        created_date: run_version.to_string(),
                    };
                    let sql = render(body, &params);
                    let outcome = run_with_retry(&self.config.retry, check.id, trip_id, &sql, || {
                        self.run_check(trip_id, &sql, &run_version)
                    });
                    if !self.config.run.yield_interval().is_zero() {
                        thread::sleep(self.config.run.yield_interval());
                    }
                    outcome
                }
                _ => CheckOutcome {
                    check_id: check.id,
                    status: ExecutionStatus::NotRun,
                    error: None,
                },
            };
            outcomes.push(outcome);
            control.check_processed(Phase::Execution, done + 1, total);
        }
        if !canceled {
            control.phase_finished(Phase::Execution, total, total);
        }

        let tally: Tally = outcomes.iter().map(|o| o.status).collect();
        log::info!("Trip {trip_id} run {run_version}: {tally}");
        Ok(ExecutionReport {
            trip_id,
            run_version,
            tally,
            outcomes,
            canceled,
        })
    }

    /// A run version later than any the trip has seen.
    fn next_run_version(&self, trip_id: TripId) -> EngineResult<RunVersion> {
        let previous = self.db.with_conn(|conn| {
            let completed = markers::last_completed_run(conn, trip_id)?;
            let stamped = issues::max_version(conn, trip_id)?;
            Ok(completed.max(stamped))
        })?;
        Ok(RunVersion::next_after(previous.as_ref()))
    }

    fn run_check(
        &self,
        trip_id: TripId,
        sql: &str,
        run_version: &RunVersion,
    ) -> DbResult<ExecutionStatus> {
        self.db.transaction(|conn| {
            let before = issues::count_for_trip(conn, trip_id)?;
            let baseline = issues::max_issue_id(conn, trip_id)?;
            conn.execute_batch(sql).map_err(DbError::from)?;
            let after = issues::count_for_trip(conn, trip_id)?;
            if after > before {
                issues::stamp_added(conn, trip_id, baseline, run_version)?;
                Ok(ExecutionStatus::RunTriggered)
            } else {
                Ok(ExecutionStatus::RunNoIssue)
            }
        })
    }
}

/// Run one check statement through `attempt`, retrying contention with
/// bounded backoff. Never fails: exhausted retries and other errors become
/// [`ExecutionStatus::RunFailedUnexpectedly`].
fn run_with_retry(
    retry: &RetryConfig,
    check_id: CheckId,
    trip_id: TripId,
    sql: &str,
    mut attempt_once: impl FnMut() -> DbResult<ExecutionStatus>,
) -> CheckOutcome {
    let mut attempt = 1;
    loop {
        match attempt_once() {
            Ok(status) => {
                if status == ExecutionStatus::RunTriggered {
                    log::info!("Check {check_id} triggered for trip {trip_id}");
                } else {
                    log::debug!("Check {check_id}: {status}");
                }
                return CheckOutcome {
                    check_id,
                    status,
                    error: None,
                };
            }
            Err(e) if e.is_transient() && attempt < retry.max_attempts => {
                let delay = retry.backoff(attempt);
                log::warn!(
                    "Check {check_id} hit contention (attempt {attempt}/{}), retrying in {delay:?}: {e}",
                    retry.max_attempts
                );
                thread::sleep(delay);
                attempt += 1;
            }
            Err(e) => {
                log::error!("Check {check_id} failed unexpectedly for trip {trip_id}: {e}");
                log::debug!("Failed SQL for check {check_id}:\n{sql}");
                return CheckOutcome {
                    check_id,
                    status: ExecutionStatus::RunFailedUnexpectedly,
                    error: Some(e.to_string()),
                };
            }
        }
    }
}

#[cfg(test)]
#[path = "executor_test.rs"]
mod tests;

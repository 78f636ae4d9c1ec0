use super::*;
use crate::RunLifecycle;
use std::sync::atomic::AtomicBool;
use tc_core::Check;

const MISSING_WEIGHT: &str = "INSERT INTO trip_issues (trip_check_id, trip_id, created_by, fishing_activity_num, error_item) \
     SELECT :check_id, trip_id, :created_by, haul_num, 'weight' FROM catches \
     WHERE trip_id = :trip_id AND weight IS NULL";

const NEGATIVE_WEIGHT: &str = "INSERT INTO trip_issues (trip_check_id, trip_id, created_by, created_date) \
     SELECT :check_id, trip_id, :created_by, :created_date FROM catches \
     WHERE trip_id = :trip_id AND weight < 0";

const BAD_NOTE: &str = "INSERT INTO trip_issues (trip_check_id, trip_id) \
     SELECT :check_id, trip_id FROM catches WHERE trip_id = :trip_id; \
     SELECT CAST(note AS INTEGER) FROM catches WHERE trip_id = :trip_id";

fn setup() -> (TripDb, Config) {
    let db = TripDb::open_memory().unwrap();
    db.execute_batch(
        "INSERT INTO trips (trip_id) VALUES (42), (43);
         CREATE TABLE catches (trip_id BIGINT, haul_num BIGINT, weight DOUBLE, note VARCHAR);
         INSERT INTO catches VALUES (42, 1, NULL, '1'), (42, 2, NULL, 'abc'), (42, 3, 12.5, '3');",
    )
    .unwrap();
    let checks = vec![
        Check::new(1, "Missing weight", MISSING_WEIGHT),
        Check::new(2, "Negative weight", NEGATIVE_WEIGHT),
        Check::new(3, "Retired", "DISABLED"),
        Check::new(4, "Note must be numeric", BAD_NOTE),
    ];
    db.transaction(|conn| catalog::replace(conn, &checks))
        .unwrap();
    let mut config = Config::default();
    config.run.yield_ms = 0;
    (db, config)
}

fn status(report: &ExecutionReport, check_id: CheckId) -> ExecutionStatus {
    report
        .outcomes
        .iter()
        .find(|o| o.check_id == check_id)
        .map(|o| o.status)
        .unwrap()
}

#[test]
fn test_unknown_trip_rejected() {
    let (db, config) = setup();
    let err = Executor::new(&db, &config)
        .execute(99, 1, &mut RunControl::unattended())
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidTrip(99)));
}

#[test]
fn test_execute_tallies_and_stamps() {
    let (db, config) = setup();
    let report = Executor::new(&db, &config)
        .execute(42, 7, &mut RunControl::unattended())
        .unwrap();

    assert!(!report.canceled);
    assert_eq!(status(&report, 1), ExecutionStatus::RunTriggered);
    assert_eq!(status(&report, 2), ExecutionStatus::RunNoIssue);
    assert_eq!(status(&report, 3), ExecutionStatus::NotRun);
    assert_eq!(status(&report, 4), ExecutionStatus::RunFailedUnexpectedly);
    assert_eq!(
        report.tally,
        Tally {
            not_run: 1,
            triggered: 1,
            no_issue: 1,
            failed: 1
        }
    );

    let stamped = db
        .with_conn(|c| issues::count_version(c, 42, &report.run_version))
        .unwrap();
    let all = db.with_conn(|c| issues::count_for_trip(c, 42)).unwrap();
    assert_eq!(stamped, 2);
    assert_eq!(all, 2, "failed check must leave no partial issues");

    let listed = db
        .with_conn(|c| issues::list_version(c, 42, &report.run_version))
        .unwrap();
    assert!(listed.iter().all(|i| i.created_by == Some(7)));
}

#[test]
fn test_stale_cache_falls_back_to_classification() {
    let (db, config) = setup();
    let classifier = Classifier::new(&db, &config);
    assert!(!classifier.is_catalog_classified().unwrap());
    Executor::new(&db, &config)
        .execute(43, 1, &mut RunControl::unattended())
        .unwrap();
    assert!(classifier.is_catalog_classified().unwrap());
}

#[test]
fn test_repeat_run_triggers_same_checks() {
    let (db, config) = setup();
    let executor = Executor::new(&db, &config);
    let first = executor
        .execute(42, 1, &mut RunControl::unattended())
        .unwrap();
    RunLifecycle::new(&db)
        .complete(42, &first.run_version)
        .unwrap();
    let second = executor
        .execute(42, 1, &mut RunControl::unattended())
        .unwrap();
    assert_eq!(first.tally.triggered, second.tally.triggered);
    assert!(second.run_version > first.run_version);
}

#[test]
fn test_canceled_before_first_check() {
    let (db, config) = setup();
    Classifier::new(&db, &config)
        .classify_catalog(false, &mut RunControl::unattended())
        .unwrap();
    let flag = AtomicBool::new(true);
    let report = Executor::new(&db, &config)
        .execute(42, 1, &mut RunControl::new(1).with_cancel(&flag))
        .unwrap();
    assert!(report.canceled);
    assert!(report.outcomes.is_empty());
    assert_eq!(db.with_conn(|c| issues::count_for_trip(c, 42)).unwrap(), 0);
}

#[test]
fn test_execution_progress_chunks() {
    let (db, config) = setup();
    Classifier::new(&db, &config)
        .classify_catalog(false, &mut RunControl::unattended())
        .unwrap();
    let mut chunks = Vec::new();
    {
        let mut control = RunControl::new(3).with_progress(|p| chunks.push(p));
        Executor::new(&db, &config)
            .execute(42, 1, &mut control)
            .unwrap();
    }
    let sizes: Vec<_> = chunks
        .iter()
        .filter(|c| c.phase == Phase::Execution)
        .map(|c| c.checks_in_chunk)
        .collect();
    assert_eq!(sizes, vec![3, 1]);
}

#[test]
fn test_check_writing_own_created_date_fails() {
    let (db, config) = setup();
    let own_date = "INSERT INTO trip_issues (trip_check_id, trip_id, created_date) \
                    VALUES (:check_id, :trip_id, SYSDATE)";
    db.transaction(|conn| catalog::replace(conn, &[Check::new(5, "Own date", own_date)]))
        .unwrap();

    let report = Executor::new(&db, &config)
        .execute(42, 1, &mut RunControl::unattended())
        .unwrap();
    let outcome = &report.outcomes[0];
    assert_eq!(outcome.status, ExecutionStatus::RunFailedUnexpectedly);
    assert!(outcome.error.as_deref().unwrap_or_default().contains("D011"));
    assert_eq!(db.with_conn(|c| issues::count_for_trip(c, 42)).unwrap(), 0);
}

#[test]
fn test_unparseable_created_date_does_not_block_runs() {
    let (db, config) = setup();
    db.execute_batch(
        "INSERT INTO trip_issues (trip_check_id, trip_id, created_date)
         VALUES (1, 42, '2026-10-17 05:46:03.75586+00')",
    )
    .unwrap();
    let executor = Executor::new(&db, &config);
    let first = executor
        .execute(42, 1, &mut RunControl::unattended())
        .unwrap();
    RunLifecycle::new(&db)
        .cancel(42, &first.run_version)
        .unwrap();

    let second = executor
        .execute(42, 1, &mut RunControl::unattended())
        .unwrap();
    assert_eq!(second.tally.triggered, 1);
    let summary = RunLifecycle::new(&db)
        .complete(42, &second.run_version)
        .unwrap();
    assert_eq!(summary.issue_count, 2);
    assert_eq!(db.with_conn(|c| issues::count_for_trip(c, 42)).unwrap(), 2);
}

fn no_wait(max_attempts: u32) -> RetryConfig {
    RetryConfig {
        max_attempts,
        initial_backoff_ms: 0,
        max_backoff_ms: 0,
    }
}

#[test]
fn test_contention_retried_until_success() {
    let mut attempts = 0;
    let outcome = run_with_retry(&no_wait(4), 9, 42, "SELECT 1", || {
        attempts += 1;
        if attempts < 3 {
            Err(DbError::Contention("write-write conflict".to_string()))
        } else {
            Ok(ExecutionStatus::RunTriggered)
        }
    });
    assert_eq!(attempts, 3);
    assert_eq!(outcome.status, ExecutionStatus::RunTriggered);
    assert!(outcome.error.is_none());
}

#[test]
fn test_contention_exhausted_fails_check() {
    let mut attempts = 0;
    let outcome = run_with_retry(&no_wait(4), 9, 42, "SELECT 1", || {
        attempts += 1;
        Err(DbError::Contention("write-write conflict".to_string()))
    });
    assert_eq!(attempts, 4);
    assert_eq!(outcome.status, ExecutionStatus::RunFailedUnexpectedly);
    assert!(outcome.error.as_deref().unwrap_or_default().contains("D005"));
}

#[test]
fn test_other_errors_are_not_retried() {
    let mut attempts = 0;
    let outcome = run_with_retry(&no_wait(4), 9, 42, "SELECT 1", || {
        attempts += 1;
        Err(DbError::ExecutionError("division by zero".to_string()))
    });
    assert_eq!(attempts, 1);
    assert_eq!(outcome.status, ExecutionStatus::RunFailedUnexpectedly);
}

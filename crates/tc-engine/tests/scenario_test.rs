//! End-to-end passes over a small catalog against an on-disk database.

use tc_core::{Check, ClassificationStatus, Config, ExecutionStatus};
use tc_db::{catalog, TripDb};
use tc_engine::{trip_check_summary, Classifier, Executor, RunControl, RunLifecycle, TripCheckSummary};
use tempfile::TempDir;

const ALWAYS_TRIGGERS: &str = "INSERT INTO trip_issues (trip_check_id, trip_id, created_by, error_item) \
     VALUES (:check_id, :trip_id, :created_by, 'always')";

fn open(dir: &TempDir) -> TripDb {
    TripDb::open(&dir.path().join("trips.duckdb")).unwrap()
}

fn quick_config() -> Config {
    let mut config = Config::default();
    config.run.yield_ms = 0;
    config
}

fn seed(db: &TripDb, checks: &[Check]) {
    db.execute_batch("INSERT INTO trips (trip_id) VALUES (42)")
        .unwrap();
    db.transaction(|conn| catalog::replace(conn, checks)).unwrap();
}

#[test]
fn test_three_check_scenario() {
    let dir = TempDir::new().unwrap();
    let db = open(&dir);
    let config = quick_config();
    seed(
        &db,
        &[
            Check::new(1, "Empty body", ""),
            Check::new(2, "Date check", "SELECT TO_DATE(created_date, 'MM/DD/YYYY') FROM trips"),
            Check::new(3, "Always", ALWAYS_TRIGGERS),
        ],
    );

    let pass = Classifier::new(&db, &config)
        .classify_catalog(false, &mut RunControl::unattended())
        .unwrap();
    let statuses: Vec<_> = pass
        .classifications
        .values()
        .map(|c| (c.check_id, c.status))
        .collect();
    assert_eq!(
        statuses,
        vec![
            (1, ClassificationStatus::NotRunnableDisabledUpstream),
            (2, ClassificationStatus::NotRunnableUnsupportedMacro),
            (3, ClassificationStatus::RunnableAsIs),
        ]
    );

    let report = Executor::new(&db, &config)
        .execute(42, 9, &mut RunControl::unattended())
        .unwrap();
    let outcomes: Vec<_> = report.outcomes.iter().map(|o| (o.check_id, o.status)).collect();
    assert_eq!(
        outcomes,
        vec![
            (1, ExecutionStatus::NotRun),
            (2, ExecutionStatus::NotRun),
            (3, ExecutionStatus::RunTriggered),
        ]
    );

    let lifecycle = RunLifecycle::new(&db);
    lifecycle.complete(42, &report.run_version).unwrap();
    let (issues, version) = lifecycle.latest_issues(42).unwrap().unwrap();
    assert_eq!(version, report.run_version);
    assert_eq!(issues.len(), 1);
    assert_eq!((issues[0].check_id, issues[0].trip_id), (3, 42));
    assert_eq!(issues[0].created_by, Some(9));
}

#[test]
fn test_classification_is_idempotent_and_persistent() {
    let dir = TempDir::new().unwrap();
    let config = quick_config();
    let first = {
        let db = open(&dir);
        seed(
            &db,
            &[Check::new(1, "Always", ALWAYS_TRIGGERS), Check::new(2, "Off", "TEMP")],
        );
        Classifier::new(&db, &config)
            .classify_catalog(false, &mut RunControl::unattended())
            .unwrap()
    };

    // Reopened database still has a current cache
    let db = open(&dir);
    let classifier = Classifier::new(&db, &config);
    assert!(classifier.is_catalog_classified().unwrap());
    let second = classifier
        .classify_catalog(false, &mut RunControl::unattended())
        .unwrap();
    assert!(!second.evaluated);
    assert_eq!(second.classifications, first.classifications);
}

#[test]
fn test_only_latest_run_survives_completion() {
    let dir = TempDir::new().unwrap();
    let db = open(&dir);
    let config = quick_config();
    seed(&db, &[Check::new(1, "Always", ALWAYS_TRIGGERS)]);
    let executor = Executor::new(&db, &config);
    let lifecycle = RunLifecycle::new(&db);

    let first = executor.execute(42, 1, &mut RunControl::unattended()).unwrap();
    lifecycle.complete(42, &first.run_version).unwrap();
    let second = executor.execute(42, 1, &mut RunControl::unattended()).unwrap();
    assert_eq!(first.tally.triggered, second.tally.triggered);
    lifecycle.complete(42, &second.run_version).unwrap();

    let (issues, version) = lifecycle.latest_issues(42).unwrap().unwrap();
    assert_eq!(version, second.run_version);
    assert!(issues
        .iter()
        .all(|i| i.run_version.as_ref() == Some(&second.run_version)));
    assert_eq!(issues.len(), 1);
}

#[test]
fn test_error_free_then_issues() {
    let dir = TempDir::new().unwrap();
    let db = open(&dir);
    let config = quick_config();
    db.execute_batch("CREATE TABLE catches (trip_id BIGINT, weight DOUBLE)")
        .unwrap();
    seed(
        &db,
        &[Check::new(
            1,
            "Missing weight",
            "INSERT INTO trip_issues (trip_check_id, trip_id) \
             SELECT :check_id, trip_id FROM catches WHERE trip_id = :trip_id AND weight IS NULL",
        )],
    );
    let executor = Executor::new(&db, &config);
    let lifecycle = RunLifecycle::new(&db);

    let clean = executor.execute(42, 1, &mut RunControl::unattended()).unwrap();
    lifecycle.complete(42, &clean.run_version).unwrap();
    assert_eq!(
        lifecycle.error_free_run_date(42).unwrap(),
        Some(clean.run_version.clone())
    );
    assert_eq!(
        trip_check_summary(&db, 42).unwrap(),
        TripCheckSummary::ErrorFree {
            run_version: clean.run_version
        }
    );

    db.execute_batch("INSERT INTO catches VALUES (42, NULL)")
        .unwrap();
    let dirty = executor.execute(42, 1, &mut RunControl::unattended()).unwrap();
    lifecycle.complete(42, &dirty.run_version).unwrap();
    assert_eq!(lifecycle.error_free_run_date(42).unwrap(), None);
    assert!(matches!(
        trip_check_summary(&db, 42).unwrap(),
        TripCheckSummary::HasIssues { count: 1, .. }
    ));
}

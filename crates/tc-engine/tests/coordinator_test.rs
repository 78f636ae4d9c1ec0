//! Background runs through the coordinator.

use std::sync::Arc;
use tc_core::{Check, Config};
use tc_db::{catalog, TripDb};
use tc_engine::{
    Classifier, EngineError, Phase, RunControl, RunCoordinator, RunEvent, RunGuard, RunLifecycle,
};

const ALWAYS_TRIGGERS: &str = "INSERT INTO trip_issues (trip_check_id, trip_id, created_by) \
     VALUES (:check_id, :trip_id, :created_by)";

fn setup(check_count: i64, chunk_size: usize, yield_ms: u64) -> (Arc<TripDb>, Arc<Config>) {
    let db = TripDb::open_memory().unwrap();
    db.execute_batch("INSERT INTO trips (trip_id) VALUES (42), (43)")
        .unwrap();
    let checks: Vec<Check> = (1..=check_count)
        .map(|id| Check::new(id, format!("check {id}"), ALWAYS_TRIGGERS))
        .collect();
    db.transaction(|conn| catalog::replace(conn, &checks)).unwrap();

    let mut config = Config::default();
    config.run.chunk_size = chunk_size;
    config.run.yield_ms = yield_ms;
    (Arc::new(db), Arc::new(config))
}

#[tokio::test]
async fn test_completed_run_reports_chunks() {
    let (db, config) = setup(3, 2, 0);
    let coordinator = RunCoordinator::new(Arc::clone(&db), config, RunGuard::new());

    let outcome = coordinator.start_run(42, 5).unwrap().finish().await;
    let shape: Vec<_> = outcome
        .chunks
        .iter()
        .map(|c| (c.phase, c.checks_completed, c.checks_in_chunk))
        .collect();
    assert_eq!(
        shape,
        vec![
            (Phase::Classification, 2, 2),
            (Phase::Classification, 3, 1),
            (Phase::Execution, 2, 2),
            (Phase::Execution, 3, 1),
        ]
    );

    let (trip_id, run_version, tally) = match outcome.terminal {
        Some(RunEvent::Completed {
            trip_id,
            run_version,
            tally,
        }) => (trip_id, run_version, tally),
        other => panic!("expected completion, got {other:?}"),
    };
    assert_eq!(trip_id, 42);
    assert_eq!(tally.triggered, 3);
    assert!(!coordinator.guard().is_running());

    let (issues, version) = RunLifecycle::new(&db).latest_issues(42).unwrap().unwrap();
    assert_eq!(version, run_version);
    assert_eq!(issues.len(), 3);
}

#[tokio::test]
async fn test_rejects_unknown_trip() {
    let (db, config) = setup(1, 25, 0);
    let coordinator = RunCoordinator::new(db, config, RunGuard::new());
    assert!(matches!(
        coordinator.start_run(7, 1),
        Err(EngineError::InvalidTrip(7))
    ));
    assert!(!coordinator.guard().is_running());
}

#[tokio::test]
async fn test_requires_classified_catalog_when_configured() {
    let (db, config) = setup(2, 25, 0);
    let mut strict = (*config).clone();
    strict.run.require_classified_catalog = true;
    let strict = Arc::new(strict);
    let coordinator = RunCoordinator::new(Arc::clone(&db), Arc::clone(&strict), RunGuard::new());
    assert!(matches!(
        coordinator.start_run(42, 1),
        Err(EngineError::CatalogNotClassified)
    ));

    Classifier::new(&db, &strict)
        .classify_catalog(false, &mut RunControl::unattended())
        .unwrap();
    let outcome = coordinator.start_run(42, 1).unwrap().finish().await;
    assert!(matches!(outcome.terminal, Some(RunEvent::Completed { .. })));
}

#[tokio::test]
async fn test_single_flight_across_coordinators() {
    let (db, config) = setup(40, 1, 20);
    let guard = RunGuard::new();
    let first = RunCoordinator::new(Arc::clone(&db), Arc::clone(&config), guard.clone());
    let second = RunCoordinator::new(Arc::clone(&db), Arc::clone(&config), guard);

    let handle = first.start_run(42, 1).unwrap();
    assert!(matches!(
        second.start_run(43, 1),
        Err(EngineError::RunAlreadyInProgress)
    ));
    assert!(second.cancel_run());

    let outcome = handle.finish().await;
    assert!(matches!(outcome.terminal, Some(RunEvent::Canceled { .. })));
    assert!(!first.guard().is_running());

    let again = second.start_run(43, 1).unwrap().finish().await;
    assert!(matches!(again.terminal, Some(RunEvent::Completed { .. })));
}

#[tokio::test]
async fn test_cancel_during_execution_restores_latest_issues() {
    let (db, config) = setup(1, 1, 0);
    let coordinator = RunCoordinator::new(Arc::clone(&db), Arc::clone(&config), RunGuard::new());
    coordinator.start_run(42, 1).unwrap().finish().await;
    let lifecycle = RunLifecycle::new(&db);
    let before = lifecycle.latest_issues(42).unwrap();
    assert!(before.is_some());

    // Bigger catalog, slow enough to cancel part way through execution
    let mut slow = (*config).clone();
    slow.run.yield_ms = 20;
    let checks: Vec<Check> = (1..=40)
        .map(|id| Check::new(id, format!("check {id}"), ALWAYS_TRIGGERS))
        .collect();
    db.transaction(|conn| catalog::replace(conn, &checks)).unwrap();
    let coordinator = RunCoordinator::new(Arc::clone(&db), Arc::new(slow), RunGuard::new());

    let mut handle = coordinator.start_run(42, 1).unwrap();
    let mut terminal = None;
    while let Some(event) = handle.next_event().await {
        match event {
            RunEvent::ChunkCompleted(progress) if progress.phase == Phase::Execution => {
                coordinator.cancel_run();
            }
            RunEvent::ChunkCompleted(_) => {}
            other => terminal = Some(other),
        }
    }
    match terminal {
        Some(RunEvent::Canceled {
            trip_id: 42,
            run_version: Some(_),
        }) => {}
        other => panic!("expected cancellation during execution, got {other:?}"),
    }
    handle.finish().await;

    assert!(!coordinator.guard().is_running());
    assert_eq!(lifecycle.latest_issues(42).unwrap(), before);
}

use super::*;

fn setup() -> TripDb {
    let db = TripDb::open_memory().unwrap();
    db.execute_batch("INSERT INTO trips (trip_id) VALUES (1), (2), (3)")
        .unwrap();
    db
}

#[test]
fn test_unknown_trip_starts_in_progress() {
    let db = setup();
    let tracker = SyncTracker::new(&db);
    assert!(tracker.overview().unwrap().is_empty());
    assert_eq!(tracker.status(77).unwrap(), SyncStatus::InProgress);
    assert_eq!(tracker.overview().unwrap(), vec![(77, SyncStatus::InProgress)]);
}

#[test]
fn test_export_flow() {
    let db = setup();
    let tracker = SyncTracker::new(&db);
    assert_eq!(tracker.mark_ready(1).unwrap(), SyncStatus::Ready);
    assert_eq!(tracker.mark_export_failed(1).unwrap(), SyncStatus::Error);
    assert_eq!(tracker.ready_trip_ids().unwrap(), vec![1]);
    assert_eq!(tracker.mark_ready(1).unwrap(), SyncStatus::Ready);
    assert_eq!(tracker.mark_export_completed(1).unwrap(), SyncStatus::Completed);
    assert_eq!(tracker.completed_trip_ids().unwrap(), vec![1]);
    assert!(tracker.ready_trip_ids().unwrap().is_empty());
}

#[test]
fn test_invalid_transitions_rejected() {
    let db = setup();
    let tracker = SyncTracker::new(&db);

    // Auto-created, then refused
    let err = tracker.mark_export_completed(2).unwrap_err();
    assert!(matches!(
        err,
        EngineError::InvalidTransition {
            trip_id: 2,
            from: SyncStatus::InProgress,
            to: SyncStatus::Completed
        }
    ));
    assert_eq!(tracker.status(2).unwrap(), SyncStatus::InProgress);

    tracker.mark_ready(2).unwrap();
    tracker.mark_export_completed(2).unwrap();
    assert!(tracker.mark_ready(2).is_err());
    assert!(tracker.mark_export_failed(2).is_err());
    assert_eq!(tracker.mark_in_progress(2).unwrap(), SyncStatus::InProgress);
}

#[test]
fn test_same_state_is_noop() {
    let db = setup();
    let tracker = SyncTracker::new(&db);
    tracker.mark_ready(3).unwrap();
    assert_eq!(tracker.mark_ready(3).unwrap(), SyncStatus::Ready);
    assert_eq!(tracker.mark_in_progress(1).unwrap(), SyncStatus::InProgress);
}

#[test]
fn test_cycle() {
    let db = setup();
    let tracker = SyncTracker::new(&db);
    let seen: Vec<_> = (0..4).map(|_| tracker.cycle_status(1).unwrap()).collect();
    assert_eq!(
        seen,
        vec![
            SyncStatus::Ready,
            SyncStatus::Completed,
            SyncStatus::InProgress,
            SyncStatus::Ready
        ]
    );

    tracker.mark_export_failed(1).unwrap();
    assert_eq!(tracker.cycle_status(1).unwrap(), SyncStatus::Ready);
}

#[test]
fn test_track_all_trips() {
    let db = setup();
    let tracker = SyncTracker::new(&db);
    tracker.mark_ready(2).unwrap();
    assert_eq!(tracker.track_all_trips().unwrap(), 2);
    assert_eq!(tracker.track_all_trips().unwrap(), 0);
    assert_eq!(
        tracker.overview().unwrap(),
        vec![
            (1, SyncStatus::InProgress),
            (2, SyncStatus::Ready),
            (3, SyncStatus::InProgress)
        ]
    );
}

#[test]
fn test_concurrent_cycles_are_not_lost() {
    let db = setup();
    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                let tracker = SyncTracker::new(&db);
                for _ in 0..25 {
                    tracker.cycle_status(3).unwrap();
                }
            });
        }
    });
    // 100 steps around a three-state cycle starting at IN_PROGRESS
    assert_eq!(SyncTracker::new(&db).status(3).unwrap(), SyncStatus::Ready);
}

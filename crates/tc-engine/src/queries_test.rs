use super::*;
use tc_core::Check;

fn setup() -> TripDb {
    let db = TripDb::open_memory().unwrap();
    db.execute_batch("INSERT INTO trips (trip_id) VALUES (5)")
        .unwrap();
    let mut internal = Check::new(2, "Debriefer review", "SELECT 1");
    internal.debriefer_only = true;
    db.transaction(|conn| catalog::replace(conn, &[Check::new(1, "Public", "SELECT 1"), internal]))
        .unwrap();
    db
}

fn complete_with_issues(db: &TripDb, version: &str, checks: &[i64]) -> RunVersion {
    for check in checks {
        db.execute_batch(&format!(
            "INSERT INTO trip_issues (trip_check_id, trip_id, created_date) VALUES ({check}, 5, '{version}')"
        ))
        .unwrap();
    }
    let run = RunVersion::parse(version).unwrap();
    RunLifecycle::new(db).complete(5, &run).unwrap();
    run
}

#[test]
fn test_summary_states() {
    let db = setup();
    assert_eq!(trip_check_summary(&db, 5).unwrap(), TripCheckSummary::NeverRun);

    let clean = complete_with_issues(&db, "2024-01-01 00:00:00", &[]);
    assert_eq!(
        trip_check_summary(&db, 5).unwrap(),
        TripCheckSummary::ErrorFree { run_version: clean }
    );

    let dirty = complete_with_issues(&db, "2024-01-02 00:00:00", &[1, 1, 2]);
    let summary = trip_check_summary(&db, 5).unwrap();
    assert_eq!(
        summary,
        TripCheckSummary::HasIssues {
            run_version: dirty,
            count: 3
        }
    );
    assert_eq!(summary.to_string(), "3 issue(s) as of 2024-01-02 00:00:00");
}

#[test]
fn test_debriefer_only_issues_hidden() {
    let db = setup();
    assert!(visible_latest_issues(&db, 5, false).unwrap().is_none());

    complete_with_issues(&db, "2024-01-01 00:00:00", &[1, 2]);
    let (observer, _) = visible_latest_issues(&db, 5, false).unwrap().unwrap();
    let (debriefer, _) = visible_latest_issues(&db, 5, true).unwrap().unwrap();
    assert_eq!(observer.iter().map(|i| i.check_id).collect::<Vec<_>>(), vec![1]);
    assert_eq!(debriefer.len(), 2);
}

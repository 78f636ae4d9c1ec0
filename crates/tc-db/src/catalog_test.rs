use super::*;
use crate::TripDb;

fn sample() -> Vec<Check> {
    let mut flagged = Check::new(2, "Debriefer review", "SELECT 2");
    flagged.debriefer_only = true;
    vec![Check::new(5, "Missing weight", "SELECT 5"), flagged]
}

#[test]
fn test_replace_and_load_ordered() {
    let db = TripDb::open_memory().unwrap();
    db.transaction(|conn| replace(conn, &sample())).unwrap();
    let loaded = db.with_conn(load).unwrap();
    assert_eq!(loaded.iter().map(|c| c.id).collect::<Vec<_>>(), vec![2, 5]);
    assert!(loaded[0].debriefer_only);
    assert_eq!(db.with_conn(count).unwrap(), 2);
}

#[test]
fn test_replace_is_wholesale() {
    let db = TripDb::open_memory().unwrap();
    db.transaction(|conn| replace(conn, &sample())).unwrap();
    db.transaction(|conn| replace(conn, &[Check::new(9, "Only", "SELECT 9")]))
        .unwrap();
    let loaded = db.with_conn(load).unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].id, 9);
}

#[test]
fn test_duplicate_ids_rejected_without_changes() {
    let db = TripDb::open_memory().unwrap();
    db.transaction(|conn| replace(conn, &sample())).unwrap();
    let dup = vec![Check::new(1, "a", ""), Check::new(1, "b", "")];
    let err = db.transaction(|conn| replace(conn, &dup)).unwrap_err();
    assert!(matches!(err, DbError::DuplicateCheckId(1)));
    assert_eq!(db.with_conn(count).unwrap(), 2);
}

#[test]
fn test_debriefer_only_ids() {
    let db = TripDb::open_memory().unwrap();
    db.transaction(|conn| replace(conn, &sample())).unwrap();
    let ids = db.with_conn(debriefer_only_ids).unwrap();
    assert_eq!(ids.into_iter().collect::<Vec<_>>(), vec![2]);
}

use super::*;

fn params() -> CheckParameters {
    CheckParameters {
        trip_id: 42,
        check_id: 3,
        created_by: 7,
        created_date: "2024-05-01 12:00:00".to_string(),
    }
}

#[test]
fn test_render_integer_and_date_placeholders() {
    let sql = "INSERT INTO trip_issues (trip_check_id, trip_id, created_by, created_date) \
               SELECT :trip_check_id, :trip_id, :created_by, :created_date";
    assert_eq!(
        render(sql, &params()),
        "INSERT INTO trip_issues (trip_check_id, trip_id, created_by, created_date) \
         SELECT 3, 42, 7, '2024-05-01 12:00:00'"
    );
}

#[test]
fn test_render_is_case_insensitive_and_accepts_check_id() {
    assert_eq!(
        render("WHERE t.trip_id = :TRIP_ID AND c = :Check_Id", &params()),
        "WHERE t.trip_id = 42 AND c = 3"
    );
}

#[test]
fn test_render_inside_literal_uses_raw_value() {
    assert_eq!(
        render("SELECT 'trip :trip_id on :created_date'", &params()),
        "SELECT 'trip 42 on 2024-05-01 12:00:00'"
    );
}

#[test]
fn test_render_leaves_casts_and_unknown_names() {
    assert_eq!(
        render("SELECT x::integer, :unknown, :trip_id_old", &params()),
        "SELECT x::integer, :unknown, :trip_id_old"
    );
}

#[test]
fn test_render_skips_quoted_identifiers() {
    assert_eq!(
        render(r#"SELECT ":trip_id" FROM t"#, &params()),
        r#"SELECT ":trip_id" FROM t"#
    );
}

#[test]
fn test_render_escapes_quotes_in_date_literal() {
    let mut p = params();
    p.created_date = "it's".to_string();
    assert_eq!(render(":created_date", &p), "'it''s'");
}

#[test]
fn test_placeholders_in_order() {
    assert_eq!(
        placeholders("SELECT :created_by, :trip_id, ':created_by'"),
        vec![Placeholder::CreatedBy, Placeholder::TripId]
    );
}

#[test]
fn test_render_after_comment_with_apostrophe() {
    let sql = "-- observer's haul check\n\
               INSERT INTO trip_issues (trip_check_id, trip_id, created_date) \
               VALUES (:check_id, :trip_id, :created_date)";
    assert_eq!(
        render(sql, &params()),
        "-- observer's haul check\n\
         INSERT INTO trip_issues (trip_check_id, trip_id, created_date) \
         VALUES (3, 42, '2024-05-01 12:00:00')"
    );
}

#[test]
fn test_render_leaves_comments_alone() {
    assert_eq!(
        render("SELECT :trip_id /* keyed on :trip_id */", &params()),
        "SELECT 42 /* keyed on :trip_id */"
    );
    assert!(placeholders("/* :created_by */ SELECT 1").is_empty());
}

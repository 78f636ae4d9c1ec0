use super::*;
use crate::TripDb;

#[test]
fn test_create_statement() {
    assert_eq!(
        SQL_MACROS[0].create_statement(),
        "CREATE OR REPLACE MACRO get_sqlite_date_str(date_str) AS \
         strftime(strptime(date_str, '%m/%d/%Y %H:%M'), '%Y-%m-%d %H:%M')"
    );
}

#[test]
fn test_date_str_macro_converts_format() {
    let db = TripDb::open_memory().unwrap();
    let converted: String = db
        .with_conn(|conn| {
            conn.query_row("SELECT get_sqlite_date_str('12/30/2019 09:08')", [], |row| {
                row.get(0)
            })
            .map_err(DbError::from)
        })
        .unwrap();
    assert_eq!(converted, "2019-12-30 09:08");
}

#[test]
fn test_install_is_repeatable() {
    let db = TripDb::open_memory().unwrap();
    db.with_conn(install_macros).unwrap();
}

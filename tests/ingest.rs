use std::path::PathBuf;

use cfb_analytics::games_ingest::seed_from_csv;
use cfb_analytics::report::RunReport;
use cfb_analytics::store;

fn fixture_path(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

#[test]
fn csv_seeding_is_idempotent() {
    let mut conn = store::open_in_memory().unwrap();

    let mut first = RunReport::new("games_ingest", 10, 0);
    seed_from_csv(&mut conn, &fixture_path("games.csv"), &mut first);
    assert_eq!(first.rows_written, 2);
    assert!(first.errors.is_empty());

    let mut second = RunReport::new("games_ingest", 10, 0);
    seed_from_csv(&mut conn, &fixture_path("games.csv"), &mut second);
    assert_eq!(second.rows_written, 2);

    // Same keys twice: still one row per game, last write wins.
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM games", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 2);
}

#[test]
fn bad_csv_line_is_recorded_not_fatal() {
    let mut conn = store::open_in_memory().unwrap();
    let mut report = RunReport::new("games_ingest", 10, 0);
    seed_from_csv(&mut conn, &fixture_path("games_mixed.csv"), &mut report);

    // The good row lands, the broken one is an error entry.
    assert_eq!(report.rows_written, 1);
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].message.contains("id"));
    assert_eq!(report.exit_code(), 0);
}

#[test]
fn missing_csv_is_one_error_and_zero_rows() {
    let mut conn = store::open_in_memory().unwrap();
    let mut report = RunReport::new("games_ingest", 10, 0);
    seed_from_csv(&mut conn, &fixture_path("does_not_exist.csv"), &mut report);
    assert_eq!(report.rows_written, 0);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.exit_code(), 1);
}

#[test]
fn null_numeric_columns_are_excluded_from_aggregates() {
    let mut conn = store::open_in_memory().unwrap();
    let mut report = RunReport::new("games_ingest", 10, 0);
    seed_from_csv(&mut conn, &fixture_path("games.csv"), &mut report);

    // Second row had NaN excitement; the average must only see the first.
    let avg: Option<f64> = conn
        .query_row("SELECT AVG(excitement_index) FROM games", [], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(avg, Some(1.304));

    let attendance_nulls: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM games WHERE attendance IS NULL",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(attendance_nulls, 1);
}

#[test]
fn runs_are_recorded_in_the_bookkeeping_table() {
    let conn = store::open_in_memory().unwrap();
    let mut report = RunReport::new("roster_ingest", 20, 3);
    report.count_call();
    report.add_rows(97);
    report.record_error(Some(2023), "fetch roster", "http 500 from /roster: oops");
    store::record_ingest_run(&conn, &report).unwrap();

    let (script, rows, errors, errors_json): (String, i64, i64, String) = conn
        .query_row(
            "SELECT script, rows_written, error_count, errors_json FROM ingest_runs",
            [],
            |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                ))
            },
        )
        .unwrap();
    assert_eq!(script, "roster_ingest");
    assert_eq!(rows, 97);
    assert_eq!(errors, 1);
    assert!(errors_json.contains("fetch roster 2023"));
}

use anyhow::Result;
use rusqlite::Connection;

use crate::report::RunReport;

/// Normalize a fetched batch, keeping good rows and recording the bad
/// ones. One malformed record never takes down the rest of its year.
pub fn collect_rows<T>(
    results: impl Iterator<Item = Result<T>>,
    year: Option<i32>,
    context: &str,
    report: &mut RunReport,
) -> Vec<T> {
    let mut rows = Vec::new();
    for result in results {
        match result {
            Ok(row) => rows.push(row),
            Err(err) => report.record_error(year, context, format!("{err:#}")),
        }
    }
    rows
}

/// Write one batch, surfacing its row count on failure.
pub fn write_batch<T>(
    conn: &mut Connection,
    year: Option<i32>,
    context: &str,
    rows: &[T],
    write: fn(&mut Connection, &[T]) -> Result<usize>,
    report: &mut RunReport,
) {
    if rows.is_empty() {
        return;
    }
    match write(conn, rows) {
        Ok(n) => report.add_rows(n),
        Err(err) => report.record_failed_batch(year, context, rows.len(), format!("{err:#}")),
    }
}

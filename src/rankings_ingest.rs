use anyhow::Result;
use rusqlite::Connection;

use crate::cfbd_client::CfbdClient;
use crate::ingest::write_batch;
use crate::normalize::poll_rank_rows_from_api;
use crate::report::{CheckStatus, RunReport, log_line};
use crate::store;

pub const DEFAULT_CALL_BUDGET: u32 = 30;

const CHECK_POLL: &str = "AP Top 25";

pub struct RankingsIngestOptions {
    pub start_year: i32,
    pub end_year: i32,
    pub call_budget: u32,
}

/// Weekly poll rankings. One call per season returns every week; entries
/// key on (season, week, poll, school) so re-runs overwrite in place.
pub fn run(
    client: &CfbdClient,
    conn: &mut Connection,
    opts: &RankingsIngestOptions,
) -> Result<RunReport> {
    let years = (opts.end_year - opts.start_year + 1).max(0) as usize;
    let mut report = RunReport::new("rankings_ingest", opts.call_budget, years);
    log_line(&format!(
        "rankings ingest {}..={}",
        opts.start_year, opts.end_year
    ));

    match store::clear_poll_rankings(conn, opts.start_year, opts.end_year) {
        Ok(n) if n > 0 => log_line(&format!("cleared {n} existing ranking rows")),
        Ok(_) => {}
        Err(err) => report.record_error(None, "clear rankings scope", format!("{err:#}")),
    }

    for year in opts.start_year..=opts.end_year {
        if !report.budget_allows(1) {
            log_line(&format!("call budget reached before {year}, stopping"));
            break;
        }
        log_line(&format!("loading rankings - {year}"));
        report.count_call();
        match client.fetch_rankings(year, "regular") {
            Ok(weeks) => {
                let rows: Vec<_> = weeks.iter().flat_map(poll_rank_rows_from_api).collect();
                write_batch(
                    conn,
                    Some(year),
                    "write rankings",
                    &rows,
                    store::upsert_poll_ranks,
                    &mut report,
                );
            }
            Err(err) => report.record_error(Some(year), "fetch rankings", format!("{err:#}")),
        }
        report.year_done();
    }

    validate(conn, opts, &mut report);
    store::record_ingest_run(conn, &report)?;
    report.print_summary();
    Ok(report)
}

fn validate(conn: &Connection, opts: &RankingsIngestOptions, report: &mut RunReport) {
    match store::poll_week_counts(conn, opts.end_year, CHECK_POLL) {
        Ok(weeks) if weeks.is_empty() => report.check(
            "final year AP poll present",
            CheckStatus::Fail,
            format!("no {CHECK_POLL} entries for {}", opts.end_year),
        ),
        Ok(weeks) => {
            let off_weeks: Vec<_> = weeks.iter().filter(|(_, n)| *n != 25).collect();
            if off_weeks.is_empty() {
                report.check(
                    "final year AP poll present",
                    CheckStatus::Pass,
                    format!("{} weeks of 25 entries", weeks.len()),
                );
            } else {
                report.check(
                    "final year AP poll present",
                    CheckStatus::Warn,
                    format!("{} weeks do not have 25 entries", off_weeks.len()),
                );
            }
        }
        Err(err) => report.check(
            "final year AP poll present",
            CheckStatus::Warn,
            format!("query failed: {err:#}"),
        ),
    }
}

use anyhow::Result;
use rusqlite::Connection;

use crate::cfbd_client::CfbdClient;
use crate::ingest::{collect_rows, write_batch};
use crate::normalize::roster_row_from_api;
use crate::report::{CheckStatus, RunReport, log_line};
use crate::store;

pub const DEFAULT_CALL_BUDGET: u32 = 20;

// Expected band for a current FBS roster; outside it something is off
// with the pull, not necessarily with the team.
const ROSTER_BAND: std::ops::RangeInclusive<i64> = 50..=150;

pub struct RosterIngestOptions {
    pub team: String,
    pub start_year: i32,
    pub end_year: i32,
    pub call_budget: u32,
}

/// Roster ids are not stable across pulls, so the team/year scope is
/// cleared first and each year re-inserted whole.
pub fn run(
    client: &CfbdClient,
    conn: &mut Connection,
    opts: &RosterIngestOptions,
) -> Result<RunReport> {
    let years = (opts.end_year - opts.start_year + 1).max(0) as usize;
    let mut report = RunReport::new("roster_ingest", opts.call_budget, years);
    log_line(&format!(
        "roster ingest for {} {}..={}",
        opts.team, opts.start_year, opts.end_year
    ));

    match store::clear_roster(conn, &opts.team, opts.start_year, opts.end_year) {
        Ok(n) if n > 0 => log_line(&format!("cleared {n} existing roster rows")),
        Ok(_) => {}
        Err(err) => report.record_error(None, "clear roster scope", format!("{err:#}")),
    }

    for year in opts.start_year..=opts.end_year {
        if !report.budget_allows(1) {
            log_line(&format!("call budget reached before {year}, stopping"));
            break;
        }
        log_line(&format!("loading roster for {} - {year}", opts.team));
        report.count_call();
        match client.fetch_roster(&opts.team, year) {
            Ok(records) => {
                let rows = collect_rows(
                    records
                        .iter()
                        .map(|r| roster_row_from_api(r, year, &opts.team)),
                    Some(year),
                    "normalize roster player",
                    &mut report,
                );
                write_batch(
                    conn,
                    Some(year),
                    "write roster",
                    &rows,
                    store::upsert_roster,
                    &mut report,
                );
            }
            Err(err) => report.record_error(Some(year), "fetch roster", format!("{err:#}")),
        }
        report.year_done();
    }

    validate(conn, opts, &mut report);
    store::record_ingest_run(conn, &report)?;
    report.print_summary();
    Ok(report)
}

fn validate(conn: &Connection, opts: &RosterIngestOptions, report: &mut RunReport) {
    match store::count_roster(conn, &opts.team, opts.end_year) {
        Ok(0) => report.check(
            "current roster count",
            CheckStatus::Fail,
            format!("no roster rows for {} {}", opts.team, opts.end_year),
        ),
        Ok(n) if ROSTER_BAND.contains(&n) => report.check(
            "current roster count",
            CheckStatus::Pass,
            format!("{n} players for {}", opts.end_year),
        ),
        Ok(n) => report.check(
            "current roster count",
            CheckStatus::Warn,
            format!("{n} players for {} is outside the expected 50..=150 band", opts.end_year),
        ),
        Err(err) => report.check(
            "current roster count",
            CheckStatus::Warn,
            format!("query failed: {err:#}"),
        ),
    }
}

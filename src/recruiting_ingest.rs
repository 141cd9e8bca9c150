use anyhow::Result;
use rusqlite::Connection;

use crate::cfbd_client::CfbdClient;
use crate::ingest::{collect_rows, write_batch};
use crate::normalize::{
    class_rank_row_from_api, position_group_row_from_api, recruit_row_from_api,
};
use crate::report::{CheckStatus, RunReport, log_line};
use crate::store;

pub const DEFAULT_CALL_BUDGET: u32 = 100;

// recruits + team class rank + position groups
const CALLS_PER_YEAR: u32 = 3;

// Hardwired sanity year: the first class the dashboard surfaced.
const CHECK_CLASS_YEAR: i32 = 2024;

pub struct RecruitingIngestOptions {
    pub team: String,
    pub start_year: i32,
    pub end_year: i32,
    pub call_budget: u32,
}

/// Recruiting classes, class rankings and position-group aggregates.
/// Recruit ids drift between pulls, so the scope is cleared up front.
pub fn run(
    client: &CfbdClient,
    conn: &mut Connection,
    opts: &RecruitingIngestOptions,
) -> Result<RunReport> {
    let years = (opts.end_year - opts.start_year + 1).max(0) as usize;
    let mut report = RunReport::new("recruiting_ingest", opts.call_budget, years);
    log_line(&format!(
        "recruiting ingest for {} {}..={}",
        opts.team, opts.start_year, opts.end_year
    ));

    match store::clear_recruits(conn, &opts.team, opts.start_year, opts.end_year) {
        Ok(n) if n > 0 => log_line(&format!("cleared {n} existing recruit rows")),
        Ok(_) => {}
        Err(err) => report.record_error(None, "clear recruits scope", format!("{err:#}")),
    }
    match store::clear_recruiting_ranks(conn, &opts.team, opts.start_year, opts.end_year) {
        Ok(n) if n > 0 => log_line(&format!("cleared {n} existing ranking rows")),
        Ok(_) => {}
        Err(err) => report.record_error(None, "clear rankings scope", format!("{err:#}")),
    }

    for year in opts.start_year..=opts.end_year {
        if !report.budget_allows(CALLS_PER_YEAR) {
            log_line(&format!("call budget reached before {year}, stopping"));
            break;
        }
        ingest_year(client, conn, &opts.team, year, &mut report);
        report.year_done();
    }

    validate(conn, opts, &mut report);
    store::record_ingest_run(conn, &report)?;
    report.print_summary();
    Ok(report)
}

fn ingest_year(
    client: &CfbdClient,
    conn: &mut Connection,
    team: &str,
    year: i32,
    report: &mut RunReport,
) {
    log_line(&format!("loading recruiting for {team} - {year}"));
    report.count_call();
    match client.fetch_recruits(year, team) {
        Ok(records) => {
            let rows = collect_rows(
                records.iter().map(|r| recruit_row_from_api(r, year)),
                Some(year),
                "normalize recruit",
                report,
            );
            write_batch(
                conn,
                Some(year),
                "write recruits",
                &rows,
                store::upsert_recruits,
                report,
            );
        }
        Err(err) => report.record_error(Some(year), "fetch recruits", format!("{err:#}")),
    }

    report.count_call();
    match client.fetch_team_recruiting_ranks(year, team) {
        Ok(records) => {
            let rows: Vec<_> = records
                .iter()
                .map(|r| class_rank_row_from_api(r, year))
                .collect();
            write_batch(
                conn,
                Some(year),
                "write class ranks",
                &rows,
                store::upsert_class_ranks,
                report,
            );
        }
        Err(err) => report.record_error(Some(year), "fetch class ranks", format!("{err:#}")),
    }

    report.count_call();
    match client.fetch_position_group_ranks(year, team) {
        Ok(records) => {
            let rows: Vec<_> = records
                .iter()
                .map(|r| position_group_row_from_api(r, year))
                .collect();
            write_batch(
                conn,
                Some(year),
                "write position groups",
                &rows,
                store::upsert_position_groups,
                report,
            );
        }
        Err(err) => report.record_error(Some(year), "fetch position groups", format!("{err:#}")),
    }
}

fn validate(conn: &Connection, opts: &RecruitingIngestOptions, report: &mut RunReport) {
    if !(opts.start_year..=opts.end_year).contains(&CHECK_CLASS_YEAR) {
        return;
    }
    match store::count_recruits(conn, &opts.team, CHECK_CLASS_YEAR) {
        Ok(n) if n > 0 => report.check(
            "2024 class present",
            CheckStatus::Pass,
            format!("{n} recruits"),
        ),
        Ok(_) => report.check(
            "2024 class present",
            CheckStatus::Fail,
            format!("no {CHECK_CLASS_YEAR} recruits stored for {}", opts.team),
        ),
        Err(err) => report.check(
            "2024 class present",
            CheckStatus::Warn,
            format!("query failed: {err:#}"),
        ),
    }
}

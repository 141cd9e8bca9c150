use anyhow::Result;
use rusqlite::Connection;

use crate::cfbd_client::CfbdClient;
use crate::ingest::{collect_rows, write_batch};
use crate::normalize::transfer_row_from_api;
use crate::report::{CheckStatus, RunReport, log_line};
use crate::store::{self, TransferRow};

pub const DEFAULT_CALL_BUDGET: u32 = 20;

/// The portal as a tracked feed only exists from 2021 on.
pub const PORTAL_FIRST_SEASON: i32 = 2021;

pub struct PortalIngestOptions {
    /// When set, only moves touching this team are kept.
    pub team: Option<String>,
    pub start_year: i32,
    pub end_year: i32,
    pub call_budget: u32,
}

pub fn run(
    client: &CfbdClient,
    conn: &mut Connection,
    opts: &PortalIngestOptions,
) -> Result<RunReport> {
    let start_year = opts.start_year.max(PORTAL_FIRST_SEASON);
    if start_year > opts.start_year {
        log_line(&format!(
            "portal tracking starts in {PORTAL_FIRST_SEASON}; skipping {}..={}",
            opts.start_year,
            start_year - 1
        ));
    }
    let years = (opts.end_year - start_year + 1).max(0) as usize;
    let mut report = RunReport::new("portal_ingest", opts.call_budget, years);
    log_line(&format!(
        "portal ingest {}..={}{}",
        start_year,
        opts.end_year,
        opts.team
            .as_deref()
            .map(|t| format!(" for {t}"))
            .unwrap_or_default()
    ));

    match store::clear_transfers(conn, opts.team.as_deref(), start_year, opts.end_year) {
        Ok(n) if n > 0 => log_line(&format!("cleared {n} existing transfer rows")),
        Ok(_) => {}
        Err(err) => report.record_error(None, "clear transfers scope", format!("{err:#}")),
    }

    for year in start_year..=opts.end_year {
        if !report.budget_allows(1) {
            log_line(&format!("call budget reached before {year}, stopping"));
            break;
        }
        log_line(&format!("loading transfers - {year}"));
        report.count_call();
        match client.fetch_portal(year) {
            Ok(records) => {
                let mut rows = collect_rows(
                    records.iter().map(|r| transfer_row_from_api(r, year)),
                    Some(year),
                    "normalize transfer",
                    &mut report,
                );
                if let Some(team) = opts.team.as_deref() {
                    rows.retain(|row| transfer_involves_team(row, team));
                }
                write_batch(
                    conn,
                    Some(year),
                    "write transfers",
                    &rows,
                    store::insert_transfers,
                    &mut report,
                );
            }
            Err(err) => report.record_error(Some(year), "fetch transfers", format!("{err:#}")),
        }
        report.year_done();
    }

    validate(conn, opts, &mut report);
    store::record_ingest_run(conn, &report)?;
    report.print_summary();
    Ok(report)
}

/// Case-insensitive on either end of the move; a player still in the
/// portal has no destination yet.
pub fn transfer_involves_team(row: &TransferRow, team: &str) -> bool {
    [row.origin.as_deref(), row.destination.as_deref()]
        .into_iter()
        .flatten()
        .any(|t| t.eq_ignore_ascii_case(team))
}

fn validate(conn: &Connection, opts: &PortalIngestOptions, report: &mut RunReport) {
    match store::count_transfers(conn, opts.end_year) {
        Ok(n) if n > 0 => report.check(
            "latest season transfers present",
            CheckStatus::Pass,
            format!("{n} transfers for {}", opts.end_year),
        ),
        Ok(_) => report.check(
            "latest season transfers present",
            CheckStatus::Warn,
            format!("no transfers stored for {}", opts.end_year),
        ),
        Err(err) => report.check(
            "latest season transfers present",
            CheckStatus::Warn,
            format!("query failed: {err:#}"),
        ),
    }
}

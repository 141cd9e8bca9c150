use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use rusqlite::Connection;

use crate::cfbd_client::{ApiPlay, CfbdClient};
use crate::ingest::{collect_rows, write_batch};
use crate::normalize::{
    drive_row_from_api, game_row_from_api, game_row_from_csv, play_row_from_api,
};
use crate::report::{CheckStatus, RunReport, log_line};
use crate::store;

pub const DEFAULT_CALL_BUDGET: u32 = 200;

const REGULAR_SEASON_WEEKS: i32 = 15;
// games + drives + one plays call per regular-season week + postseason plays
const CALLS_PER_YEAR: u32 = 2 + REGULAR_SEASON_WEEKS as u32 + 1;

pub struct GamesIngestOptions {
    pub team: String,
    pub start_year: i32,
    pub end_year: i32,
    pub call_budget: u32,
    /// Optional local snapshot loaded through the CSV path before any
    /// API call. Rows land in the same tables via the same upserts.
    pub csv_seed: Option<PathBuf>,
}

/// Games, drives and play-by-play for one team across a year range.
/// External game ids are stable, so this family upserts without clearing.
pub fn run(
    client: &CfbdClient,
    conn: &mut Connection,
    opts: &GamesIngestOptions,
) -> Result<RunReport> {
    let years = (opts.end_year - opts.start_year + 1).max(0) as usize;
    let mut report = RunReport::new("games_ingest", opts.call_budget, years);
    log_line(&format!(
        "games ingest for {} {}..={}",
        opts.team, opts.start_year, opts.end_year
    ));

    if let Some(path) = &opts.csv_seed {
        seed_from_csv(conn, path, &mut report);
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
    log_line(&format!("loading games for {team} - {year}"));
    report.count_call();
    match client.fetch_games(year, team) {
        Ok(games) => {
            let rows = collect_rows(
                games.iter().map(game_row_from_api),
                Some(year),
                "normalize game",
                report,
            );
            write_batch(
                conn,
                Some(year),
                "write games",
                &rows,
                store::upsert_games,
                report,
            );
        }
        Err(err) => report.record_error(Some(year), "fetch games", format!("{err:#}")),
    }

    log_line(&format!("loading drives for {team} - {year}"));
    report.count_call();
    match client.fetch_drives(year, team) {
        Ok(drives) => {
            let rows = collect_rows(
                drives.iter().map(drive_row_from_api),
                Some(year),
                "normalize drive",
                report,
            );
            write_batch(
                conn,
                Some(year),
                "write drives",
                &rows,
                store::upsert_drives,
                report,
            );
        }
        Err(err) => report.record_error(Some(year), "fetch drives", format!("{err:#}")),
    }

    log_line(&format!("loading plays for {team} - {year}"));
    for week in 1..=REGULAR_SEASON_WEEKS {
        report.count_call();
        // Bye weeks come back as transport errors; they are recorded and
        // the remaining weeks still run.
        match client.fetch_plays(year, week, team) {
            Ok(plays) => write_plays(conn, year, &plays, report),
            Err(err) => report.record_error(
                Some(year),
                &format!("fetch plays week {week}"),
                format!("{err:#}"),
            ),
        }
    }
    report.count_call();
    match client.fetch_postseason_plays(year, team) {
        Ok(plays) => write_plays(conn, year, &plays, report),
        Err(err) => {
            report.record_error(Some(year), "fetch postseason plays", format!("{err:#}"))
        }
    }
}

fn write_plays(conn: &mut Connection, year: i32, plays: &[ApiPlay], report: &mut RunReport) {
    let rows = collect_rows(
        plays.iter().map(play_row_from_api),
        Some(year),
        "normalize play",
        report,
    );
    write_batch(
        conn,
        Some(year),
        "write plays",
        &rows,
        store::upsert_plays,
        report,
    );
}

/// CSV seeding shares the normalizer and upserts with the API path; a
/// bad line is one error entry, not a dead file.
pub fn seed_from_csv(conn: &mut Connection, path: &Path, report: &mut RunReport) {
    log_line(&format!("seeding games from {}", path.display()));
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) => {
            report.record_error(None, "read games csv", err);
            return;
        }
    };
    let mut rows = Vec::new();
    for (idx, line) in raw.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if idx == 0 && line.starts_with("id,") {
            continue;
        }
        match game_row_from_csv(line) {
            Ok(row) => rows.push(row),
            Err(err) => {
                report.record_error(None, &format!("csv line {}", idx + 1), format!("{err:#}"))
            }
        }
    }
    write_batch(conn, None, "write csv games", &rows, store::upsert_games, report);
}

fn validate(conn: &Connection, opts: &GamesIngestOptions, report: &mut RunReport) {
    match store::count_games(conn, &opts.team, opts.end_year) {
        Ok(0) => report.check(
            "final year game count",
            CheckStatus::Fail,
            format!("no games stored for {} {}", opts.team, opts.end_year),
        ),
        Ok(n) if (8..=20).contains(&n) => report.check(
            "final year game count",
            CheckStatus::Pass,
            format!("{n} games for {}", opts.end_year),
        ),
        Ok(n) => report.check(
            "final year game count",
            CheckStatus::Warn,
            format!("{n} games for {} is outside the expected 8..=20 band", opts.end_year),
        ),
        Err(err) => report.check(
            "final year game count",
            CheckStatus::Warn,
            format!("query failed: {err:#}"),
        ),
    }

    match store::count_orphan_drives(conn) {
        Ok(0) => report.check(
            "drive referential integrity",
            CheckStatus::Pass,
            "every drive has its game".to_string(),
        ),
        Ok(n) => report.check(
            "drive referential integrity",
            CheckStatus::Warn,
            format!("{n} drives reference missing games"),
        ),
        Err(err) => report.check(
            "drive referential integrity",
            CheckStatus::Warn,
            format!("query failed: {err:#}"),
        ),
    }
}

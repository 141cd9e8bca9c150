use std::path::PathBuf;

use anyhow::Result;

use cfb_analytics::cfbd_client::CfbdClient;
use cfb_analytics::{config, games_ingest, store};

const TARGET_TEAM: &str = "Oklahoma";
const START_YEAR: i32 = 2014;
const END_YEAR: i32 = 2024;
const CALL_BUDGET: u32 = games_ingest::DEFAULT_CALL_BUDGET;

fn main() -> Result<()> {
    config::load_env_files();
    let cfg = config::Config::from_env()?;
    let client = CfbdClient::new(&cfg)?;
    let mut conn = store::open_db(&cfg.db_path)?;

    let opts = games_ingest::GamesIngestOptions {
        team: config::env_or("TARGET_TEAM", TARGET_TEAM),
        start_year: config::env_year_or("START_YEAR", START_YEAR),
        end_year: config::env_year_or("END_YEAR", END_YEAR),
        call_budget: CALL_BUDGET,
        csv_seed: std::env::var("GAMES_CSV")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from),
    };
    let report = games_ingest::run(&client, &mut conn, &opts)?;
    std::process::exit(report.exit_code());
}

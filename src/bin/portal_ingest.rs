use anyhow::Result;

use cfb_analytics::cfbd_client::CfbdClient;
use cfb_analytics::{config, portal_ingest, store};

// Empty filter keeps the whole portal; set TARGET_TEAM to narrow it.
const TARGET_TEAM: &str = "";
const START_YEAR: i32 = 2021;
const END_YEAR: i32 = 2025;
const CALL_BUDGET: u32 = portal_ingest::DEFAULT_CALL_BUDGET;

fn main() -> Result<()> {
    config::load_env_files();
    let cfg = config::Config::from_env()?;
    let client = CfbdClient::new(&cfg)?;
    let mut conn = store::open_db(&cfg.db_path)?;

    let team = config::env_or("TARGET_TEAM", TARGET_TEAM);
    let opts = portal_ingest::PortalIngestOptions {
        team: if team.is_empty() { None } else { Some(team) },
        start_year: config::env_year_or("START_YEAR", START_YEAR),
        end_year: config::env_year_or("END_YEAR", END_YEAR),
        call_budget: CALL_BUDGET,
    };
    let report = portal_ingest::run(&client, &mut conn, &opts)?;
    std::process::exit(report.exit_code());
}

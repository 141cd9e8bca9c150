use anyhow::Result;

use cfb_analytics::{config, metrics, store};

const TARGET_TEAM: &str = "Oklahoma";
const SEASON: i32 = 2024;

fn main() -> Result<()> {
    config::load_env_files();
    let db_path = config::db_path_from_env()?;
    let conn = store::open_db(&db_path)?;

    let team = config::env_or("TARGET_TEAM", TARGET_TEAM);
    let season = config::env_year_or("SEASON", SEASON);

    println!("Season report: {team} {season}");
    println!();

    let epa = metrics::epa_per_play(&conn, &team, season)?;
    println!(
        "EPA/play      overall {}  rush {}  pass {}  ({} plays with PPA)",
        fmt_num(epa.overall),
        fmt_num(epa.rush),
        fmt_num(epa.pass),
        epa.plays_counted
    );

    let by_down = metrics::success_rate_by_down(&conn, &team, season)?;
    println!(
        "Success rate  1st {}  2nd {}  3rd {}  4th {}",
        fmt_pct(by_down.first),
        fmt_pct(by_down.second),
        fmt_pct(by_down.third),
        fmt_pct(by_down.fourth)
    );

    let by_distance = metrics::success_rate_by_distance(&conn, &team, season)?;
    println!(
        "  by distance short {}  medium {}  long {}",
        fmt_pct(by_distance.short),
        fmt_pct(by_distance.medium),
        fmt_pct(by_distance.long)
    );

    let explosive = metrics::explosive_play_rate(&conn, &team, season)?;
    println!(
        "Explosive     off rush {}  off pass {}  def rush {}  def pass {}",
        fmt_pct(explosive.offense_rush),
        fmt_pct(explosive.offense_pass),
        fmt_pct(explosive.defense_rush),
        fmt_pct(explosive.defense_pass)
    );

    match metrics::drive_outcomes(&conn, &team, season)? {
        Some(drives) => {
            println!(
                "Drives        TD {}  FG {}  punt {}  giveaway {}  downs {}  half {}  other {}",
                drives.touchdowns,
                drives.field_goals,
                drives.punts,
                drives.turnovers,
                drives.downs,
                drives.end_of_half,
                drives.other
            );
            println!(
                "              scoring {:.1}%  giveaway {:.1}%  ({} drives)",
                drives.scoring_pct, drives.giveaway_pct, drives.total
            );
        }
        None => println!("Drives        -"),
    }

    let ppd = metrics::points_per_drive_by_field_position(&conn, &team, season)?;
    println!(
        "Points/drive  red zone {}  opp territory {}  midfield {}  own half {}",
        fmt_num(ppd.red_zone),
        fmt_num(ppd.opponent_territory),
        fmt_num(ppd.midfield),
        fmt_num(ppd.own_half)
    );

    Ok(())
}

fn fmt_num(v: Option<f64>) -> String {
    match v {
        Some(v) => format!("{v:.3}"),
        None => "-".to_string(),
    }
}

fn fmt_pct(v: Option<f64>) -> String {
    match v {
        Some(v) => format!("{:.1}%", v * 100.0),
        None => "-".to_string(),
    }
}

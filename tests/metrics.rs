use cfb_analytics::metrics;
use cfb_analytics::store::{self, DriveRow, GameRow, PlayRow};
use rusqlite::Connection;

const TEAM: &str = "Oklahoma";
const OPPONENT: &str = "Temple";
const SEASON: i32 = 2024;
const GAME_ID: i64 = 401628455;

fn seeded_store() -> Connection {
    let mut conn = store::open_in_memory().unwrap();
    store::upsert_games(&mut conn, &[sample_game()]).unwrap();
    conn
}

fn sample_game() -> GameRow {
    GameRow {
        game_id: GAME_ID,
        season: SEASON,
        week: 1,
        season_type: Some("regular".to_string()),
        start_date: None,
        completed: Some(true),
        neutral_site: None,
        conference_game: Some(false),
        attendance: None,
        venue: None,
        home_team: TEAM.to_string(),
        home_conference: Some("SEC".to_string()),
        home_points: Some(51),
        home_line_scores: None,
        away_team: OPPONENT.to_string(),
        away_conference: None,
        away_points: Some(3),
        away_line_scores: None,
        excitement_index: None,
    }
}

fn play(
    play_number: i32,
    offense: &str,
    category: &str,
    down: i32,
    distance: i32,
    yards_gained: i32,
    ppa: Option<f64>,
) -> PlayRow {
    let defense = if offense == TEAM { OPPONENT } else { TEAM };
    PlayRow {
        game_id: GAME_ID,
        drive_number: 1,
        play_number,
        offense: offense.to_string(),
        defense: defense.to_string(),
        period: Some(1),
        clock_seconds: None,
        down: Some(down),
        distance: Some(distance),
        yards_gained: Some(yards_gained),
        category: category.to_string(),
        play_type: None,
        play_text: None,
        ppa,
        scoring: false,
    }
}

fn drive(drive_number: i32, result: &str, start_yards_to_goal: i32) -> DriveRow {
    DriveRow {
        game_id: GAME_ID,
        drive_number,
        offense: TEAM.to_string(),
        defense: OPPONENT.to_string(),
        start_yards_to_goal: Some(start_yards_to_goal),
        end_yards_to_goal: None,
        play_count: None,
        yards: None,
        elapsed_seconds: None,
        result: result.to_string(),
        scoring: matches!(result, "TD" | "FG"),
    }
}

#[test]
fn epa_excludes_null_ppa_from_mean_and_denominator() {
    let mut conn = seeded_store();
    store::upsert_plays(
        &mut conn,
        &[
            play(1, TEAM, "rush", 1, 10, 4, Some(0.2)),
            play(2, TEAM, "pass", 2, 6, -2, Some(-0.1)),
            play(3, TEAM, "pass", 3, 8, 24, Some(0.4)),
            play(4, TEAM, "administrative", 1, 10, 0, None),
        ],
    )
    .unwrap();

    let epa = metrics::epa_per_play(&conn, TEAM, SEASON).unwrap();
    assert_eq!(epa.plays_counted, 3);
    let overall = epa.overall.unwrap();
    assert!((overall - 0.5 / 3.0).abs() < 1e-9);
    assert_eq!(epa.rush, Some(0.2));
    let pass = epa.pass.unwrap();
    assert!((pass - 0.15).abs() < 1e-9);
}

#[test]
fn empty_inputs_mean_no_data_not_zero() {
    let conn = seeded_store();

    let epa = metrics::epa_per_play(&conn, "Nowhere State", SEASON).unwrap();
    assert_eq!(epa.overall, None);
    assert_eq!(epa.rush, None);
    assert_eq!(epa.pass, None);
    assert_eq!(epa.plays_counted, 0);

    let by_down = metrics::success_rate_by_down(&conn, "Nowhere State", SEASON).unwrap();
    assert_eq!(by_down.first, None);
    assert_eq!(by_down.fourth, None);

    let by_distance = metrics::success_rate_by_distance(&conn, "Nowhere State", SEASON).unwrap();
    assert_eq!(by_distance.short, None);
    assert_eq!(by_distance.long, None);

    let explosive = metrics::explosive_play_rate(&conn, "Nowhere State", SEASON).unwrap();
    assert_eq!(explosive.offense_rush, None);
    assert_eq!(explosive.defense_pass, None);

    assert!(metrics::drive_outcomes(&conn, "Nowhere State", SEASON)
        .unwrap()
        .is_none());

    let ppd =
        metrics::points_per_drive_by_field_position(&conn, "Nowhere State", SEASON).unwrap();
    assert_eq!(ppd.red_zone, None);
    assert_eq!(ppd.own_half, None);
}

#[test]
fn success_rates_split_by_down_and_distance() {
    let mut conn = seeded_store();
    store::upsert_plays(
        &mut conn,
        &[
            play(1, TEAM, "rush", 1, 2, 3, Some(0.5)),
            play(2, TEAM, "rush", 1, 10, 1, Some(-0.5)),
            play(3, TEAM, "pass", 3, 5, 6, Some(-0.2)),
            play(4, TEAM, "pass", 3, 12, 15, Some(0.3)),
            // Null ppa never counts toward any bucket.
            play(5, TEAM, "rush", 4, 1, 2, None),
        ],
    )
    .unwrap();

    let by_down = metrics::success_rate_by_down(&conn, TEAM, SEASON).unwrap();
    assert_eq!(by_down.first, Some(0.5));
    assert_eq!(by_down.second, None);
    assert_eq!(by_down.third, Some(0.5));
    assert_eq!(by_down.fourth, None);

    let by_distance = metrics::success_rate_by_distance(&conn, TEAM, SEASON).unwrap();
    // short: downs-and-2 success + 4th-and-1 excluded (null ppa) = 1/1
    assert_eq!(by_distance.short, Some(1.0));
    assert_eq!(by_distance.medium, Some(0.0));
    // long: 1st-and-10 failure, 3rd-and-12 success
    assert_eq!(by_distance.long, Some(0.5));
}

#[test]
fn explosive_rate_uses_twenty_yard_threshold_per_side() {
    let mut conn = seeded_store();
    store::upsert_plays(
        &mut conn,
        &[
            play(1, TEAM, "rush", 1, 10, 25, Some(0.9)),
            play(2, TEAM, "rush", 1, 10, 3, Some(0.1)),
            play(3, TEAM, "pass", 2, 8, 45, Some(1.2)),
            play(4, TEAM, "pass", 2, 8, 8, Some(0.2)),
            play(5, OPPONENT, "pass", 1, 10, 30, Some(0.8)),
            play(6, OPPONENT, "rush", 2, 4, 2, Some(-0.1)),
        ],
    )
    .unwrap();

    let rates = metrics::explosive_play_rate(&conn, TEAM, SEASON).unwrap();
    assert_eq!(rates.offense_rush, Some(0.5));
    assert_eq!(rates.offense_pass, Some(0.5));
    assert_eq!(rates.defense_rush, Some(0.0));
    assert_eq!(rates.defense_pass, Some(1.0));
}

#[test]
fn drive_outcome_distribution_matches_counts() {
    let mut conn = seeded_store();
    let results = [
        "TD", "TD", "FG", "PUNT", "PUNT", "PUNT", "TURNOVER", "DOWNS", "TD", "PUNT",
    ];
    let drives: Vec<_> = results
        .iter()
        .enumerate()
        .map(|(idx, result)| drive(idx as i32 + 1, result, 65))
        .collect();
    store::upsert_drives(&mut conn, &drives).unwrap();

    let summary = metrics::drive_outcomes(&conn, TEAM, SEASON).unwrap().unwrap();
    assert_eq!(summary.total, 10);
    assert_eq!(summary.touchdowns, 3);
    assert_eq!(summary.field_goals, 1);
    assert_eq!(summary.punts, 4);
    assert_eq!(summary.turnovers, 1);
    assert_eq!(summary.downs, 1);
    assert!((summary.scoring_pct - 40.0).abs() < 1e-9);
    assert!((summary.giveaway_pct - 10.0).abs() < 1e-9);
}

#[test]
fn points_per_drive_buckets_and_clamps_field_position() {
    let mut conn = seeded_store();
    store::upsert_drives(
        &mut conn,
        &[
            // Clamped to 0 -> red zone; a touchdown is 7 points.
            drive(1, "TD", -5),
            drive(2, "FG", 15),
            drive(3, "PUNT", 30),
            drive(4, "TD", 55),
            // Clamped to 100 -> own half.
            drive(5, "PUNT", 104),
            drive(6, "TD", 80),
        ],
    )
    .unwrap();

    let ppd = metrics::points_per_drive_by_field_position(&conn, TEAM, SEASON).unwrap();
    assert_eq!(ppd.red_zone, Some(5.0));
    assert_eq!(ppd.opponent_territory, Some(0.0));
    assert_eq!(ppd.midfield, Some(7.0));
    assert_eq!(ppd.own_half, Some(3.5));
}

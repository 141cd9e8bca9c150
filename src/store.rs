use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{Connection, params};

use crate::report::RunReport;

/// Canonical row shapes, one per table. Field names match the local
/// schema; the normalizer is the only producer.
#[derive(Debug, Clone, PartialEq)]
pub struct GameRow {
    pub game_id: i64,
    pub season: i32,
    pub week: i32,
    pub season_type: Option<String>,
    pub start_date: Option<String>,
    pub completed: Option<bool>,
    pub neutral_site: Option<bool>,
    pub conference_game: Option<bool>,
    pub attendance: Option<i64>,
    pub venue: Option<String>,
    pub home_team: String,
    pub home_conference: Option<String>,
    pub home_points: Option<i32>,
    pub home_line_scores: Option<Vec<i32>>,
    pub away_team: String,
    pub away_conference: Option<String>,
    pub away_points: Option<i32>,
    pub away_line_scores: Option<Vec<i32>>,
    pub excitement_index: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DriveRow {
    pub game_id: i64,
    pub drive_number: i32,
    pub offense: String,
    pub defense: String,
    pub start_yards_to_goal: Option<i32>,
    pub end_yards_to_goal: Option<i32>,
    pub play_count: Option<i32>,
    pub yards: Option<i32>,
    pub elapsed_seconds: Option<i32>,
    pub result: String,
    pub scoring: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayRow {
    pub game_id: i64,
    pub drive_number: i32,
    pub play_number: i32,
    pub offense: String,
    pub defense: String,
    pub period: Option<i32>,
    pub clock_seconds: Option<i32>,
    pub down: Option<i32>,
    pub distance: Option<i32>,
    pub yards_gained: Option<i32>,
    pub category: String,
    pub play_type: Option<String>,
    pub play_text: Option<String>,
    pub ppa: Option<f64>,
    pub scoring: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RosterRow {
    pub athlete_id: i64,
    pub season: i32,
    pub team: String,
    pub name: String,
    pub position: Option<String>,
    pub jersey: Option<i32>,
    pub height: Option<i32>,
    pub weight: Option<i32>,
    pub class_year: Option<i32>,
    pub home_city: Option<String>,
    pub home_state: Option<String>,
    pub home_country: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecruitRow {
    pub recruit_id: i64,
    pub year: i32,
    pub name: String,
    pub position: Option<String>,
    pub height: Option<f64>,
    pub weight: Option<i32>,
    pub stars: Option<i32>,
    pub rating: Option<f64>,
    pub ranking: Option<i32>,
    pub committed_to: Option<String>,
    pub city: Option<String>,
    pub state_province: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassRankRow {
    pub year: i32,
    pub team: String,
    pub rank: Option<i32>,
    pub points: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PositionGroupRow {
    pub year: i32,
    pub team: String,
    pub position_group: String,
    pub avg_rating: Option<f64>,
    pub total_rating: Option<f64>,
    pub commits: Option<i32>,
    pub avg_stars: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransferRow {
    pub season: i32,
    pub name: String,
    pub position: Option<String>,
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub transfer_date: Option<String>,
    pub rating: Option<f64>,
    pub stars: Option<i32>,
    pub eligibility: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PollRankRow {
    pub season: i32,
    pub week: i32,
    pub poll: String,
    pub school: String,
    pub rank: Option<i32>,
    pub conference: Option<String>,
    pub first_place_votes: Option<i32>,
    pub points: Option<i32>,
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    let conn =
        Connection::open(path).with_context(|| format!("open sqlite db {}", path.display()))?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory().context("open in-memory sqlite db")?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;
        CREATE TABLE IF NOT EXISTS games (
            game_id INTEGER PRIMARY KEY,
            season INTEGER NOT NULL,
            week INTEGER NOT NULL,
            season_type TEXT NULL,
            start_date TEXT NULL,
            completed INTEGER NULL,
            neutral_site INTEGER NULL,
            conference_game INTEGER NULL,
            attendance INTEGER NULL,
            venue TEXT NULL,
            home_team TEXT NOT NULL,
            home_conference TEXT NULL,
            home_points INTEGER NULL,
            home_line_scores TEXT NULL,
            away_team TEXT NOT NULL,
            away_conference TEXT NULL,
            away_points INTEGER NULL,
            away_line_scores TEXT NULL,
            excitement_index REAL NULL,
            updated_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_games_season ON games(season);
        CREATE INDEX IF NOT EXISTS idx_games_home ON games(home_team);
        CREATE INDEX IF NOT EXISTS idx_games_away ON games(away_team);

        CREATE TABLE IF NOT EXISTS drives (
            game_id INTEGER NOT NULL REFERENCES games(game_id),
            drive_number INTEGER NOT NULL,
            offense TEXT NOT NULL,
            defense TEXT NOT NULL,
            start_yards_to_goal INTEGER NULL,
            end_yards_to_goal INTEGER NULL,
            play_count INTEGER NULL,
            yards INTEGER NULL,
            elapsed_seconds INTEGER NULL,
            result TEXT NOT NULL,
            scoring INTEGER NOT NULL,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (game_id, drive_number)
        );
        CREATE INDEX IF NOT EXISTS idx_drives_offense ON drives(offense);

        CREATE TABLE IF NOT EXISTS plays (
            game_id INTEGER NOT NULL REFERENCES games(game_id),
            drive_number INTEGER NOT NULL,
            play_number INTEGER NOT NULL,
            offense TEXT NOT NULL,
            defense TEXT NOT NULL,
            period INTEGER NULL,
            clock_seconds INTEGER NULL,
            down INTEGER NULL,
            distance INTEGER NULL,
            yards_gained INTEGER NULL,
            category TEXT NOT NULL,
            play_type TEXT NULL,
            play_text TEXT NULL,
            ppa REAL NULL,
            scoring INTEGER NOT NULL,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (game_id, drive_number, play_number)
        );
        CREATE INDEX IF NOT EXISTS idx_plays_offense ON plays(offense);
        CREATE INDEX IF NOT EXISTS idx_plays_defense ON plays(defense);

        CREATE TABLE IF NOT EXISTS roster (
            athlete_id INTEGER NOT NULL,
            season INTEGER NOT NULL,
            team TEXT NOT NULL,
            name TEXT NOT NULL,
            position TEXT NULL,
            jersey INTEGER NULL,
            height INTEGER NULL,
            weight INTEGER NULL,
            class_year INTEGER NULL,
            home_city TEXT NULL,
            home_state TEXT NULL,
            home_country TEXT NULL,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (athlete_id, season, team)
        );
        CREATE INDEX IF NOT EXISTS idx_roster_team_season ON roster(team, season);

        CREATE TABLE IF NOT EXISTS recruiting (
            recruit_id INTEGER PRIMARY KEY,
            year INTEGER NOT NULL,
            name TEXT NOT NULL,
            position TEXT NULL,
            height REAL NULL,
            weight INTEGER NULL,
            stars INTEGER NULL,
            rating REAL NULL,
            ranking INTEGER NULL,
            committed_to TEXT NULL,
            city TEXT NULL,
            state_province TEXT NULL,
            country TEXT NULL,
            updated_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_recruits_year ON recruiting(year);

        CREATE TABLE IF NOT EXISTS recruiting_classes (
            year INTEGER NOT NULL,
            team TEXT NOT NULL,
            rank INTEGER NULL,
            points REAL NULL,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (year, team)
        );

        CREATE TABLE IF NOT EXISTS recruiting_position_groups (
            year INTEGER NOT NULL,
            team TEXT NOT NULL,
            position_group TEXT NOT NULL,
            avg_rating REAL NULL,
            total_rating REAL NULL,
            commits INTEGER NULL,
            avg_stars REAL NULL,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (year, team, position_group)
        );

        CREATE TABLE IF NOT EXISTS transfers (
            transfer_id INTEGER PRIMARY KEY AUTOINCREMENT,
            season INTEGER NOT NULL,
            name TEXT NOT NULL,
            position TEXT NULL,
            origin TEXT NULL,
            destination TEXT NULL,
            transfer_date TEXT NULL,
            rating REAL NULL,
            stars INTEGER NULL,
            eligibility TEXT NULL,
            updated_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_transfers_season ON transfers(season);

        CREATE TABLE IF NOT EXISTS poll_rankings (
            season INTEGER NOT NULL,
            week INTEGER NOT NULL,
            poll TEXT NOT NULL,
            school TEXT NOT NULL,
            rank INTEGER NULL,
            conference TEXT NULL,
            first_place_votes INTEGER NULL,
            points INTEGER NULL,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (season, week, poll, school)
        );

        CREATE TABLE IF NOT EXISTS ingest_runs (
            run_id INTEGER PRIMARY KEY AUTOINCREMENT,
            script TEXT NOT NULL,
            started_at TEXT NOT NULL,
            finished_at TEXT NOT NULL,
            calls_made INTEGER NOT NULL,
            rows_written INTEGER NOT NULL,
            batches_failed INTEGER NOT NULL,
            error_count INTEGER NOT NULL,
            errors_json TEXT NOT NULL
        );
        "#,
    )
    .context("create sqlite schema")?;
    Ok(())
}

pub fn upsert_game(conn: &Connection, g: &GameRow) -> Result<()> {
    conn.execute(
        r#"
        INSERT INTO games (
            game_id, season, week, season_type, start_date,
            completed, neutral_site, conference_game, attendance, venue,
            home_team, home_conference, home_points, home_line_scores,
            away_team, away_conference, away_points, away_line_scores,
            excitement_index, updated_at
        ) VALUES (
            ?1, ?2, ?3, ?4, ?5,
            ?6, ?7, ?8, ?9, ?10,
            ?11, ?12, ?13, ?14,
            ?15, ?16, ?17, ?18,
            ?19, ?20
        )
        ON CONFLICT(game_id) DO UPDATE SET
            season = excluded.season,
            week = excluded.week,
            season_type = excluded.season_type,
            start_date = excluded.start_date,
            completed = excluded.completed,
            neutral_site = excluded.neutral_site,
            conference_game = excluded.conference_game,
            attendance = excluded.attendance,
            venue = excluded.venue,
            home_team = excluded.home_team,
            home_conference = excluded.home_conference,
            home_points = excluded.home_points,
            home_line_scores = excluded.home_line_scores,
            away_team = excluded.away_team,
            away_conference = excluded.away_conference,
            away_points = excluded.away_points,
            away_line_scores = excluded.away_line_scores,
            excitement_index = excluded.excitement_index,
            updated_at = excluded.updated_at
        "#,
        params![
            g.game_id,
            g.season,
            g.week,
            g.season_type,
            g.start_date,
            g.completed.map(bool_to_i64),
            g.neutral_site.map(bool_to_i64),
            g.conference_game.map(bool_to_i64),
            g.attendance,
            g.venue,
            g.home_team,
            g.home_conference,
            g.home_points,
            line_scores_json(g.home_line_scores.as_deref()),
            g.away_team,
            g.away_conference,
            g.away_points,
            line_scores_json(g.away_line_scores.as_deref()),
            g.excitement_index,
            Utc::now().to_rfc3339(),
        ],
    )
    .context("upsert game")?;
    Ok(())
}

pub fn upsert_games(conn: &mut Connection, rows: &[GameRow]) -> Result<usize> {
    let tx = conn.transaction().context("begin games transaction")?;
    for row in rows {
        upsert_game(&tx, row)?;
    }
    tx.commit().context("commit games transaction")?;
    Ok(rows.len())
}

pub fn upsert_drive(conn: &Connection, d: &DriveRow) -> Result<()> {
    conn.execute(
        r#"
        INSERT INTO drives (
            game_id, drive_number, offense, defense,
            start_yards_to_goal, end_yards_to_goal, play_count, yards,
            elapsed_seconds, result, scoring, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
        ON CONFLICT(game_id, drive_number) DO UPDATE SET
            offense = excluded.offense,
            defense = excluded.defense,
            start_yards_to_goal = excluded.start_yards_to_goal,
            end_yards_to_goal = excluded.end_yards_to_goal,
            play_count = excluded.play_count,
            yards = excluded.yards,
            elapsed_seconds = excluded.elapsed_seconds,
            result = excluded.result,
            scoring = excluded.scoring,
            updated_at = excluded.updated_at
        "#,
        params![
            d.game_id,
            d.drive_number,
            d.offense,
            d.defense,
            d.start_yards_to_goal,
            d.end_yards_to_goal,
            d.play_count,
            d.yards,
            d.elapsed_seconds,
            d.result,
            bool_to_i64(d.scoring),
            Utc::now().to_rfc3339(),
        ],
    )
    .context("upsert drive")?;
    Ok(())
}

pub fn upsert_drives(conn: &mut Connection, rows: &[DriveRow]) -> Result<usize> {
    let tx = conn.transaction().context("begin drives transaction")?;
    for row in rows {
        upsert_drive(&tx, row)?;
    }
    tx.commit().context("commit drives transaction")?;
    Ok(rows.len())
}

pub fn upsert_play(conn: &Connection, p: &PlayRow) -> Result<()> {
    conn.execute(
        r#"
        INSERT INTO plays (
            game_id, drive_number, play_number, offense, defense,
            period, clock_seconds, down, distance, yards_gained,
            category, play_type, play_text, ppa, scoring, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
        ON CONFLICT(game_id, drive_number, play_number) DO UPDATE SET
            offense = excluded.offense,
            defense = excluded.defense,
            period = excluded.period,
            clock_seconds = excluded.clock_seconds,
            down = excluded.down,
            distance = excluded.distance,
            yards_gained = excluded.yards_gained,
            category = excluded.category,
            play_type = excluded.play_type,
            play_text = excluded.play_text,
            ppa = excluded.ppa,
            scoring = excluded.scoring,
            updated_at = excluded.updated_at
        "#,
        params![
            p.game_id,
            p.drive_number,
            p.play_number,
            p.offense,
            p.defense,
            p.period,
            p.clock_seconds,
            p.down,
            p.distance,
            p.yards_gained,
            p.category,
            p.play_type,
            p.play_text,
            p.ppa,
            bool_to_i64(p.scoring),
            Utc::now().to_rfc3339(),
        ],
    )
    .context("upsert play")?;
    Ok(())
}

pub fn upsert_plays(conn: &mut Connection, rows: &[PlayRow]) -> Result<usize> {
    let tx = conn.transaction().context("begin plays transaction")?;
    for row in rows {
        upsert_play(&tx, row)?;
    }
    tx.commit().context("commit plays transaction")?;
    Ok(rows.len())
}

pub fn upsert_roster_player(conn: &Connection, r: &RosterRow) -> Result<()> {
    conn.execute(
        r#"
        INSERT INTO roster (
            athlete_id, season, team, name, position, jersey,
            height, weight, class_year, home_city, home_state, home_country,
            updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
        ON CONFLICT(athlete_id, season, team) DO UPDATE SET
            name = excluded.name,
            position = excluded.position,
            jersey = excluded.jersey,
            height = excluded.height,
            weight = excluded.weight,
            class_year = excluded.class_year,
            home_city = excluded.home_city,
            home_state = excluded.home_state,
            home_country = excluded.home_country,
            updated_at = excluded.updated_at
        "#,
        params![
            r.athlete_id,
            r.season,
            r.team,
            r.name,
            r.position,
            r.jersey,
            r.height,
            r.weight,
            r.class_year,
            r.home_city,
            r.home_state,
            r.home_country,
            Utc::now().to_rfc3339(),
        ],
    )
    .context("upsert roster player")?;
    Ok(())
}

pub fn upsert_roster(conn: &mut Connection, rows: &[RosterRow]) -> Result<usize> {
    let tx = conn.transaction().context("begin roster transaction")?;
    for row in rows {
        upsert_roster_player(&tx, row)?;
    }
    tx.commit().context("commit roster transaction")?;
    Ok(rows.len())
}

pub fn upsert_recruit(conn: &Connection, r: &RecruitRow) -> Result<()> {
    conn.execute(
        r#"
        INSERT INTO recruiting (
            recruit_id, year, name, position, height, weight,
            stars, rating, ranking, committed_to, city, state_province,
            country, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
        ON CONFLICT(recruit_id) DO UPDATE SET
            year = excluded.year,
            name = excluded.name,
            position = excluded.position,
            height = excluded.height,
            weight = excluded.weight,
            stars = excluded.stars,
            rating = excluded.rating,
            ranking = excluded.ranking,
            committed_to = excluded.committed_to,
            city = excluded.city,
            state_province = excluded.state_province,
            country = excluded.country,
            updated_at = excluded.updated_at
        "#,
        params![
            r.recruit_id,
            r.year,
            r.name,
            r.position,
            r.height,
            r.weight,
            r.stars,
            r.rating,
            r.ranking,
            r.committed_to,
            r.city,
            r.state_province,
            r.country,
            Utc::now().to_rfc3339(),
        ],
    )
    .context("upsert recruit")?;
    Ok(())
}

pub fn upsert_recruits(conn: &mut Connection, rows: &[RecruitRow]) -> Result<usize> {
    let tx = conn.transaction().context("begin recruits transaction")?;
    for row in rows {
        upsert_recruit(&tx, row)?;
    }
    tx.commit().context("commit recruits transaction")?;
    Ok(rows.len())
}

pub fn upsert_class_rank(conn: &Connection, c: &ClassRankRow) -> Result<()> {
    conn.execute(
        r#"
        INSERT INTO recruiting_classes (year, team, rank, points, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        ON CONFLICT(year, team) DO UPDATE SET
            rank = excluded.rank,
            points = excluded.points,
            updated_at = excluded.updated_at
        "#,
        params![c.year, c.team, c.rank, c.points, Utc::now().to_rfc3339()],
    )
    .context("upsert recruiting class rank")?;
    Ok(())
}

pub fn upsert_position_group(conn: &Connection, p: &PositionGroupRow) -> Result<()> {
    conn.execute(
        r#"
        INSERT INTO recruiting_position_groups (
            year, team, position_group, avg_rating, total_rating,
            commits, avg_stars, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        ON CONFLICT(year, team, position_group) DO UPDATE SET
            avg_rating = excluded.avg_rating,
            total_rating = excluded.total_rating,
            commits = excluded.commits,
            avg_stars = excluded.avg_stars,
            updated_at = excluded.updated_at
        "#,
        params![
            p.year,
            p.team,
            p.position_group,
            p.avg_rating,
            p.total_rating,
            p.commits,
            p.avg_stars,
            Utc::now().to_rfc3339(),
        ],
    )
    .context("upsert position group rank")?;
    Ok(())
}

pub fn upsert_class_ranks(conn: &mut Connection, rows: &[ClassRankRow]) -> Result<usize> {
    let tx = conn.transaction().context("begin class ranks transaction")?;
    for row in rows {
        upsert_class_rank(&tx, row)?;
    }
    tx.commit().context("commit class ranks transaction")?;
    Ok(rows.len())
}

pub fn upsert_position_groups(conn: &mut Connection, rows: &[PositionGroupRow]) -> Result<usize> {
    let tx = conn
        .transaction()
        .context("begin position groups transaction")?;
    for row in rows {
        upsert_position_group(&tx, row)?;
    }
    tx.commit().context("commit position groups transaction")?;
    Ok(rows.len())
}

/// Transfers carry no stable external id; the scope is cleared before a
/// run so plain inserts stay idempotent at the run level.
pub fn insert_transfers(conn: &mut Connection, rows: &[TransferRow]) -> Result<usize> {
    let tx = conn.transaction().context("begin transfers transaction")?;
    for t in rows {
        tx.execute(
            r#"
            INSERT INTO transfers (
                season, name, position, origin, destination,
                transfer_date, rating, stars, eligibility, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                t.season,
                t.name,
                t.position,
                t.origin,
                t.destination,
                t.transfer_date,
                t.rating,
                t.stars,
                t.eligibility,
                Utc::now().to_rfc3339(),
            ],
        )
        .context("insert transfer")?;
    }
    tx.commit().context("commit transfers transaction")?;
    Ok(rows.len())
}

pub fn upsert_poll_rank(conn: &Connection, p: &PollRankRow) -> Result<()> {
    conn.execute(
        r#"
        INSERT INTO poll_rankings (
            season, week, poll, school, rank, conference,
            first_place_votes, points, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        ON CONFLICT(season, week, poll, school) DO UPDATE SET
            rank = excluded.rank,
            conference = excluded.conference,
            first_place_votes = excluded.first_place_votes,
            points = excluded.points,
            updated_at = excluded.updated_at
        "#,
        params![
            p.season,
            p.week,
            p.poll,
            p.school,
            p.rank,
            p.conference,
            p.first_place_votes,
            p.points,
            Utc::now().to_rfc3339(),
        ],
    )
    .context("upsert poll rank")?;
    Ok(())
}

pub fn upsert_poll_ranks(conn: &mut Connection, rows: &[PollRankRow]) -> Result<usize> {
    let tx = conn.transaction().context("begin poll rankings transaction")?;
    for row in rows {
        upsert_poll_rank(&tx, row)?;
    }
    tx.commit().context("commit poll rankings transaction")?;
    Ok(rows.len())
}

pub fn clear_roster(conn: &Connection, team: &str, start_year: i32, end_year: i32) -> Result<usize> {
    let n = conn
        .execute(
            "DELETE FROM roster WHERE team = ?1 AND season BETWEEN ?2 AND ?3",
            params![team, start_year, end_year],
        )
        .context("clear roster scope")?;
    Ok(n)
}

pub fn clear_recruits(
    conn: &Connection,
    team: &str,
    start_year: i32,
    end_year: i32,
) -> Result<usize> {
    let n = conn
        .execute(
            "DELETE FROM recruiting WHERE committed_to = ?1 AND year BETWEEN ?2 AND ?3",
            params![team, start_year, end_year],
        )
        .context("clear recruits scope")?;
    Ok(n)
}

pub fn clear_recruiting_ranks(
    conn: &Connection,
    team: &str,
    start_year: i32,
    end_year: i32,
) -> Result<usize> {
    let classes = conn
        .execute(
            "DELETE FROM recruiting_classes WHERE team = ?1 AND year BETWEEN ?2 AND ?3",
            params![team, start_year, end_year],
        )
        .context("clear recruiting classes scope")?;
    let groups = conn
        .execute(
            "DELETE FROM recruiting_position_groups WHERE team = ?1 AND year BETWEEN ?2 AND ?3",
            params![team, start_year, end_year],
        )
        .context("clear position groups scope")?;
    Ok(classes + groups)
}

/// Team filter is case-insensitive, matching either side of the move.
pub fn clear_transfers(
    conn: &Connection,
    team: Option<&str>,
    start_season: i32,
    end_season: i32,
) -> Result<usize> {
    let n = match team {
        Some(team) => conn
            .execute(
                "DELETE FROM transfers
                 WHERE season BETWEEN ?1 AND ?2
                   AND (LOWER(origin) = LOWER(?3) OR LOWER(destination) = LOWER(?3))",
                params![start_season, end_season, team],
            )
            .context("clear transfers scope")?,
        None => conn
            .execute(
                "DELETE FROM transfers WHERE season BETWEEN ?1 AND ?2",
                params![start_season, end_season],
            )
            .context("clear transfers scope")?,
    };
    Ok(n)
}

pub fn clear_poll_rankings(conn: &Connection, start_season: i32, end_season: i32) -> Result<usize> {
    let n = conn
        .execute(
            "DELETE FROM poll_rankings WHERE season BETWEEN ?1 AND ?2",
            params![start_season, end_season],
        )
        .context("clear poll rankings scope")?;
    Ok(n)
}

pub fn record_ingest_run(conn: &Connection, report: &RunReport) -> Result<()> {
    let errors_json =
        serde_json::to_string(&report.error_messages()).unwrap_or_else(|_| "[]".to_string());
    conn.execute(
        r#"
        INSERT INTO ingest_runs (
            script, started_at, finished_at, calls_made, rows_written,
            batches_failed, error_count, errors_json
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
        params![
            report.script,
            report.started_at,
            Utc::now().to_rfc3339(),
            report.calls_made,
            report.rows_written as i64,
            report.batches_failed as i64,
            report.errors.len() as i64,
            errors_json,
        ],
    )
    .context("record ingest run")?;
    Ok(())
}

pub fn count_games(conn: &Connection, team: &str, season: i32) -> Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM games
         WHERE season = ?1 AND (home_team = ?2 OR away_team = ?2)",
        params![season, team],
        |row| row.get(0),
    )
    .context("count games")
}

pub fn count_orphan_drives(conn: &Connection) -> Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM drives d
         WHERE NOT EXISTS (SELECT 1 FROM games g WHERE g.game_id = d.game_id)",
        [],
        |row| row.get(0),
    )
    .context("count orphan drives")
}

pub fn count_roster(conn: &Connection, team: &str, season: i32) -> Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM roster WHERE team = ?1 AND season = ?2",
        params![team, season],
        |row| row.get(0),
    )
    .context("count roster")
}

pub fn count_recruits(conn: &Connection, team: &str, year: i32) -> Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM recruiting WHERE committed_to = ?1 AND year = ?2",
        params![team, year],
        |row| row.get(0),
    )
    .context("count recruits")
}

pub fn count_transfers(conn: &Connection, season: i32) -> Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM transfers WHERE season = ?1",
        params![season],
        |row| row.get(0),
    )
    .context("count transfers")
}

/// Entry counts per week for one poll, ordered by week.
pub fn poll_week_counts(conn: &Connection, season: i32, poll: &str) -> Result<Vec<(i32, i64)>> {
    let mut stmt = conn
        .prepare(
            "SELECT week, COUNT(*) FROM poll_rankings
             WHERE season = ?1 AND poll = ?2
             GROUP BY week ORDER BY week",
        )
        .context("prepare poll week counts")?;
    let rows = stmt
        .query_map(params![season, poll], |row| {
            Ok((row.get::<_, i32>(0)?, row.get::<_, i64>(1)?))
        })
        .context("query poll week counts")?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row.context("decode poll week count")?);
    }
    Ok(out)
}

fn bool_to_i64(v: bool) -> i64 {
    if v { 1 } else { 0 }
}

fn line_scores_json(scores: Option<&[i32]>) -> Option<String> {
    scores.map(|s| serde_json::to_string(s).unwrap_or_else(|_| "[]".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_roster_row(jersey: i32) -> RosterRow {
        RosterRow {
            athlete_id: 55,
            season: 2024,
            team: "Oklahoma".to_string(),
            name: "Sample Player".to_string(),
            position: Some("QB".to_string()),
            jersey: Some(jersey),
            height: Some(75),
            weight: Some(215),
            class_year: Some(2),
            home_city: Some("Norman".to_string()),
            home_state: Some("OK".to_string()),
            home_country: Some("USA".to_string()),
        }
    }

    #[test]
    fn roster_upsert_overwrites_in_place() {
        let mut conn = open_in_memory().unwrap();
        upsert_roster(&mut conn, &[sample_roster_row(12)]).unwrap();
        upsert_roster(&mut conn, &[sample_roster_row(7)]).unwrap();

        let count = count_roster(&conn, "Oklahoma", 2024).unwrap();
        assert_eq!(count, 1);
        let jersey: i32 = conn
            .query_row(
                "SELECT jersey FROM roster WHERE athlete_id = 55 AND season = 2024 AND team = 'Oklahoma'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(jersey, 7);
    }

    #[test]
    fn transfer_clear_is_case_insensitive() {
        let mut conn = open_in_memory().unwrap();
        let row = TransferRow {
            season: 2024,
            name: "Portal Player".to_string(),
            position: None,
            origin: Some("OKLAHOMA".to_string()),
            destination: None,
            transfer_date: None,
            rating: None,
            stars: None,
            eligibility: None,
        };
        insert_transfers(&mut conn, &[row]).unwrap();
        let cleared = clear_transfers(&conn, Some("oklahoma"), 2024, 2024).unwrap();
        assert_eq!(cleared, 1);
        assert_eq!(count_transfers(&conn, 2024).unwrap(), 0);
    }

    #[test]
    fn line_scores_round_trip_as_json_text() {
        let mut conn = open_in_memory().unwrap();
        let game = GameRow {
            game_id: 401,
            season: 2024,
            week: 1,
            season_type: Some("regular".to_string()),
            start_date: None,
            completed: Some(true),
            neutral_site: None,
            conference_game: Some(false),
            attendance: Some(84_000),
            venue: None,
            home_team: "Oklahoma".to_string(),
            home_conference: Some("SEC".to_string()),
            home_points: Some(27),
            home_line_scores: Some(vec![7, 10, 3, 7]),
            away_team: "Houston".to_string(),
            away_conference: None,
            away_points: Some(12),
            away_line_scores: None,
            excitement_index: Some(4.2),
        };
        upsert_games(&mut conn, &[game]).unwrap();
        let raw: Option<String> = conn
            .query_row(
                "SELECT home_line_scores FROM games WHERE game_id = 401",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(raw.as_deref(), Some("[7,10,3,7]"));
        let away: Option<String> = conn
            .query_row(
                "SELECT away_line_scores FROM games WHERE game_id = 401",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert!(away.is_none());
    }
}

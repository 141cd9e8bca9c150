use anyhow::{Context, Result};
use rusqlite::{Connection, params};

/// Read-side aggregations over committed plays/drives/games, scoped by
/// offense team and season. An empty qualifying set is "no data" and
/// comes back as `None`, never as zero; plays with a null PPA are
/// excluded from both numerator and denominator.

pub const EXPLOSIVE_YARDS: i32 = 20;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpaSummary {
    pub overall: Option<f64>,
    pub rush: Option<f64>,
    pub pass: Option<f64>,
    pub plays_counted: i64,
}

pub fn epa_per_play(conn: &Connection, team: &str, season: i32) -> Result<EpaSummary> {
    conn.query_row(
        r#"
        SELECT
            AVG(p.ppa),
            COUNT(p.ppa),
            AVG(CASE WHEN p.category = 'rush' THEN p.ppa END),
            AVG(CASE WHEN p.category = 'pass' THEN p.ppa END)
        FROM plays p
        JOIN games g ON g.game_id = p.game_id
        WHERE p.offense = ?1 AND g.season = ?2
        "#,
        params![team, season],
        |row| {
            Ok(EpaSummary {
                overall: row.get(0)?,
                plays_counted: row.get(1)?,
                rush: row.get(2)?,
                pass: row.get(3)?,
            })
        },
    )
    .context("query epa per play")
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SuccessByDown {
    pub first: Option<f64>,
    pub second: Option<f64>,
    pub third: Option<f64>,
    pub fourth: Option<f64>,
}

/// Success = positive PPA.
pub fn success_rate_by_down(conn: &Connection, team: &str, season: i32) -> Result<SuccessByDown> {
    let mut stmt = conn
        .prepare(
            r#"
            SELECT p.down, AVG(CASE WHEN p.ppa > 0 THEN 1.0 ELSE 0.0 END)
            FROM plays p
            JOIN games g ON g.game_id = p.game_id
            WHERE p.offense = ?1 AND g.season = ?2
              AND p.ppa IS NOT NULL
              AND p.down BETWEEN 1 AND 4
            GROUP BY p.down
            "#,
        )
        .context("prepare success by down")?;
    let rows = stmt
        .query_map(params![team, season], |row| {
            Ok((row.get::<_, i32>(0)?, row.get::<_, f64>(1)?))
        })
        .context("query success by down")?;

    let mut out = SuccessByDown::default();
    for row in rows {
        let (down, rate) = row.context("decode success by down row")?;
        match down {
            1 => out.first = Some(rate),
            2 => out.second = Some(rate),
            3 => out.third = Some(rate),
            4 => out.fourth = Some(rate),
            _ => {}
        }
    }
    Ok(out)
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SuccessByDistance {
    /// 1-3 yards to gain.
    pub short: Option<f64>,
    /// 4-6.
    pub medium: Option<f64>,
    /// 7 and longer.
    pub long: Option<f64>,
}

pub fn success_rate_by_distance(
    conn: &Connection,
    team: &str,
    season: i32,
) -> Result<SuccessByDistance> {
    let mut stmt = conn
        .prepare(
            r#"
            SELECT
                CASE
                    WHEN p.distance BETWEEN 1 AND 3 THEN 'short'
                    WHEN p.distance BETWEEN 4 AND 6 THEN 'medium'
                    ELSE 'long'
                END AS bucket,
                AVG(CASE WHEN p.ppa > 0 THEN 1.0 ELSE 0.0 END)
            FROM plays p
            JOIN games g ON g.game_id = p.game_id
            WHERE p.offense = ?1 AND g.season = ?2
              AND p.ppa IS NOT NULL
              AND p.distance >= 1
            GROUP BY bucket
            "#,
        )
        .context("prepare success by distance")?;
    let rows = stmt
        .query_map(params![team, season], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?))
        })
        .context("query success by distance")?;

    let mut out = SuccessByDistance::default();
    for row in rows {
        let (bucket, rate) = row.context("decode success by distance row")?;
        match bucket.as_str() {
            "short" => out.short = Some(rate),
            "medium" => out.medium = Some(rate),
            "long" => out.long = Some(rate),
            _ => {}
        }
    }
    Ok(out)
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ExplosiveRates {
    pub offense_rush: Option<f64>,
    pub offense_pass: Option<f64>,
    pub defense_rush: Option<f64>,
    pub defense_pass: Option<f64>,
}

/// Fraction of plays gaining at least 20 yards, rush vs pass, from both
/// sides of the ball. Plays with unknown yardage are excluded.
pub fn explosive_play_rate(conn: &Connection, team: &str, season: i32) -> Result<ExplosiveRates> {
    let side = |column: &str| -> Result<(Option<f64>, Option<f64>)> {
        conn.query_row(
            &format!(
                r#"
                SELECT
                    AVG(CASE WHEN p.category = 'rush'
                        THEN CASE WHEN p.yards_gained >= ?3 THEN 1.0 ELSE 0.0 END END),
                    AVG(CASE WHEN p.category = 'pass'
                        THEN CASE WHEN p.yards_gained >= ?3 THEN 1.0 ELSE 0.0 END END)
                FROM plays p
                JOIN games g ON g.game_id = p.game_id
                WHERE p.{column} = ?1 AND g.season = ?2
                  AND p.yards_gained IS NOT NULL
                "#
            ),
            params![team, season, EXPLOSIVE_YARDS],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .context("query explosive rate")
    };

    let (offense_rush, offense_pass) = side("offense")?;
    let (defense_rush, defense_pass) = side("defense")?;
    Ok(ExplosiveRates {
        offense_rush,
        offense_pass,
        defense_rush,
        defense_pass,
    })
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DriveOutcomeSummary {
    pub touchdowns: i64,
    pub field_goals: i64,
    pub punts: i64,
    pub turnovers: i64,
    pub downs: i64,
    pub end_of_half: i64,
    pub other: i64,
    pub total: i64,
    /// (TD + FG) / total, in percent.
    pub scoring_pct: f64,
    /// Turnovers / total, in percent.
    pub giveaway_pct: f64,
}

pub fn drive_outcomes(
    conn: &Connection,
    team: &str,
    season: i32,
) -> Result<Option<DriveOutcomeSummary>> {
    let mut stmt = conn
        .prepare(
            r#"
            SELECT d.result, COUNT(*)
            FROM drives d
            JOIN games g ON g.game_id = d.game_id
            WHERE d.offense = ?1 AND g.season = ?2
            GROUP BY d.result
            "#,
        )
        .context("prepare drive outcomes")?;
    let rows = stmt
        .query_map(params![team, season], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })
        .context("query drive outcomes")?;

    let mut out = DriveOutcomeSummary::default();
    for row in rows {
        let (result, count) = row.context("decode drive outcome row")?;
        match result.as_str() {
            "TD" => out.touchdowns = count,
            "FG" => out.field_goals = count,
            "PUNT" => out.punts = count,
            "TURNOVER" => out.turnovers = count,
            "DOWNS" => out.downs = count,
            "END_OF_HALF" => out.end_of_half = count,
            _ => out.other += count,
        }
        out.total += count;
    }
    if out.total == 0 {
        return Ok(None);
    }
    out.scoring_pct = (out.touchdowns + out.field_goals) as f64 * 100.0 / out.total as f64;
    out.giveaway_pct = out.turnovers as f64 * 100.0 / out.total as f64;
    Ok(Some(out))
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointsPerDrive {
    /// Starting 0-20 yards from the goal.
    pub red_zone: Option<f64>,
    /// 21-40.
    pub opponent_territory: Option<f64>,
    /// 41-60.
    pub midfield: Option<f64>,
    /// 61 and deeper.
    pub own_half: Option<f64>,
}

/// Points credited from the drive result: 7 for a touchdown, 3 for a
/// field goal, 0 otherwise. Stored field position is already clamped,
/// the MIN/MAX here keeps older rows honest.
pub fn points_per_drive_by_field_position(
    conn: &Connection,
    team: &str,
    season: i32,
) -> Result<PointsPerDrive> {
    let mut stmt = conn
        .prepare(
            r#"
            SELECT
                CASE
                    WHEN MIN(MAX(d.start_yards_to_goal, 0), 100) <= 20 THEN 'red_zone'
                    WHEN MIN(MAX(d.start_yards_to_goal, 0), 100) <= 40 THEN 'opponent'
                    WHEN MIN(MAX(d.start_yards_to_goal, 0), 100) <= 60 THEN 'midfield'
                    ELSE 'own_half'
                END AS bucket,
                AVG(CASE d.result WHEN 'TD' THEN 7.0 WHEN 'FG' THEN 3.0 ELSE 0.0 END)
            FROM drives d
            JOIN games g ON g.game_id = d.game_id
            WHERE d.offense = ?1 AND g.season = ?2
              AND d.start_yards_to_goal IS NOT NULL
            GROUP BY bucket
            "#,
        )
        .context("prepare points per drive")?;
    let rows = stmt
        .query_map(params![team, season], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?))
        })
        .context("query points per drive")?;

    let mut out = PointsPerDrive::default();
    for row in rows {
        let (bucket, points) = row.context("decode points per drive row")?;
        match bucket.as_str() {
            "red_zone" => out.red_zone = Some(points),
            "opponent" => out.opponent_territory = Some(points),
            "midfield" => out.midfield = Some(points),
            "own_half" => out.own_half = Some(points),
            _ => {}
        }
    }
    Ok(out)
}

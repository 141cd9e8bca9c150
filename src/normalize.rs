use anyhow::{Context, Result, anyhow};
use serde_json::Value;

use crate::cfbd_client::{
    ApiClock, ApiDrive, ApiGame, ApiPlay, ApiPositionGroupRank, ApiRankingWeek, ApiRecruit,
    ApiRosterPlayer, ApiTeamRecruitingRank, ApiTransfer,
};
use crate::store::{
    ClassRankRow, DriveRow, GameRow, PlayRow, PollRankRow, PositionGroupRow, RecruitRow, RosterRow,
    TransferRow,
};

/// Play-type classification used by the EPA / explosiveness splits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayCategory {
    Rush,
    Pass,
    SpecialTeams,
    Turnover,
    Penalty,
    Administrative,
}

impl PlayCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            PlayCategory::Rush => "rush",
            PlayCategory::Pass => "pass",
            PlayCategory::SpecialTeams => "special_teams",
            PlayCategory::Turnover => "turnover",
            PlayCategory::Penalty => "penalty",
            PlayCategory::Administrative => "administrative",
        }
    }
}

/// Drive result category. Labels are what the drives table stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveOutcome {
    Touchdown,
    FieldGoal,
    Punt,
    Turnover,
    Downs,
    EndOfHalf,
    Other,
}

impl DriveOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            DriveOutcome::Touchdown => "TD",
            DriveOutcome::FieldGoal => "FG",
            DriveOutcome::Punt => "PUNT",
            DriveOutcome::Turnover => "TURNOVER",
            DriveOutcome::Downs => "DOWNS",
            DriveOutcome::EndOfHalf => "END_OF_HALF",
            DriveOutcome::Other => "OTHER",
        }
    }
}

/// Case-insensitive contains matching; the order is the precedence.
/// "INT TD" is a giveaway, "PUNT TD" is a return score on a punt.
pub fn classify_play_type(raw: Option<&str>) -> PlayCategory {
    let Some(raw) = raw else {
        return PlayCategory::Administrative;
    };
    let s = raw.to_lowercase();
    if s.contains("interception") || s.contains("fumble") {
        return PlayCategory::Turnover;
    }
    if s.contains("punt")
        || s.contains("kickoff")
        || s.contains("field goal")
        || s.contains("extra point")
    {
        return PlayCategory::SpecialTeams;
    }
    if s.contains("penalty") {
        return PlayCategory::Penalty;
    }
    if s.contains("pass") || s.contains("sack") || s.contains("reception") {
        return PlayCategory::Pass;
    }
    if s.contains("rush") || s.contains("run") {
        return PlayCategory::Rush;
    }
    PlayCategory::Administrative
}

pub fn classify_drive_result(raw: Option<&str>) -> DriveOutcome {
    let Some(raw) = raw else {
        return DriveOutcome::Other;
    };
    let s = raw.to_uppercase();
    if s.contains("INT") || s.contains("FUMBLE") {
        return DriveOutcome::Turnover;
    }
    if s.contains("DOWNS") {
        return DriveOutcome::Downs;
    }
    if s.contains("PUNT") {
        return DriveOutcome::Punt;
    }
    if s.contains("MISSED FG") || s.contains("FG MISSED") {
        return DriveOutcome::Other;
    }
    if s.contains("FG") || s.contains("FIELD GOAL") {
        return DriveOutcome::FieldGoal;
    }
    if s.contains("END OF") {
        return DriveOutcome::EndOfHalf;
    }
    if s.contains("TD") || s.contains("TOUCHDOWN") {
        return DriveOutcome::Touchdown;
    }
    DriveOutcome::Other
}

pub fn clamp_yards_to_goal(v: i32) -> i32 {
    v.clamp(0, 100)
}

fn clock_to_seconds(clock: Option<&ApiClock>) -> Option<i32> {
    let clock = clock?;
    match (clock.minutes, clock.seconds) {
        (None, None) => None,
        (m, s) => Some(m.unwrap_or(0) * 60 + s.unwrap_or(0)),
    }
}

fn full_name(first: Option<&str>, last: Option<&str>) -> Option<String> {
    let mut parts = Vec::new();
    for part in [first, last] {
        if let Some(p) = part {
            let trimmed = p.trim();
            if !trimmed.is_empty() {
                parts.push(trimmed);
            }
        }
    }
    if parts.is_empty() {
        return None;
    }
    Some(parts.join(" "))
}

/// Portal origin/destination arrive as either a plain school string or an
/// object; for objects the label is the mascot, falling back to nickname.
pub fn team_name_from_value(v: &Value) -> Option<String> {
    if let Some(s) = v.as_str() {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return None;
        }
        return Some(trimmed.to_string());
    }
    let obj = v.as_object()?;
    for key in ["mascot", "nickname"] {
        if let Some(name) = obj.get(key).and_then(|x| x.as_str()) {
            let trimmed = name.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
    }
    None
}

pub fn game_row_from_api(g: &ApiGame) -> Result<GameRow> {
    let home_team = g
        .home_team
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| anyhow!("game {} missing home team", g.id))?;
    let away_team = g
        .away_team
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| anyhow!("game {} missing away team", g.id))?;
    Ok(GameRow {
        game_id: g.id,
        season: g.season,
        week: g.week,
        season_type: g.season_type.clone(),
        start_date: g.start_date.clone(),
        completed: g.completed,
        neutral_site: g.neutral_site,
        conference_game: g.conference_game,
        attendance: g.attendance,
        venue: g.venue.clone(),
        home_team: home_team.to_string(),
        home_conference: g.home_conference.clone(),
        home_points: g.home_points,
        home_line_scores: g.home_line_scores.clone(),
        away_team: away_team.to_string(),
        away_conference: g.away_conference.clone(),
        away_points: g.away_points,
        away_line_scores: g.away_line_scores.clone(),
        excitement_index: g.excitement_index,
    })
}

pub fn drive_row_from_api(d: &ApiDrive) -> Result<DriveRow> {
    let drive_number = d
        .drive_number
        .ok_or_else(|| anyhow!("drive in game {} missing drive number", d.game_id))?;
    let offense = required_team(d.offense.as_deref())
        .ok_or_else(|| anyhow!("drive {}/{} missing offense", d.game_id, drive_number))?;
    let defense = required_team(d.defense.as_deref())
        .ok_or_else(|| anyhow!("drive {}/{} missing defense", d.game_id, drive_number))?;
    Ok(DriveRow {
        game_id: d.game_id,
        drive_number,
        offense,
        defense,
        start_yards_to_goal: d.start_yards_to_goal.map(clamp_yards_to_goal),
        end_yards_to_goal: d.end_yards_to_goal.map(clamp_yards_to_goal),
        play_count: d.plays,
        yards: d.yards,
        elapsed_seconds: clock_to_seconds(d.elapsed.as_ref()),
        result: classify_drive_result(d.drive_result.as_deref())
            .as_str()
            .to_string(),
        scoring: d.scoring.unwrap_or(false),
    })
}

pub fn play_row_from_api(p: &ApiPlay) -> Result<PlayRow> {
    let drive_number = p
        .drive_number
        .ok_or_else(|| anyhow!("play in game {} missing drive number", p.game_id))?;
    let play_number = p
        .play_number
        .ok_or_else(|| anyhow!("play in game {} missing play number", p.game_id))?;
    let offense = required_team(p.offense.as_deref()).ok_or_else(|| {
        anyhow!(
            "play {}/{}/{} missing offense",
            p.game_id,
            drive_number,
            play_number
        )
    })?;
    let defense = required_team(p.defense.as_deref()).ok_or_else(|| {
        anyhow!(
            "play {}/{}/{} missing defense",
            p.game_id,
            drive_number,
            play_number
        )
    })?;
    Ok(PlayRow {
        game_id: p.game_id,
        drive_number,
        play_number,
        offense,
        defense,
        period: p.period,
        clock_seconds: clock_to_seconds(p.clock.as_ref()),
        down: p.down,
        distance: p.distance,
        yards_gained: p.yards_gained,
        category: classify_play_type(p.play_type.as_deref())
            .as_str()
            .to_string(),
        play_type: p.play_type.clone(),
        play_text: p.play_text.clone(),
        ppa: p.ppa,
        scoring: p.scoring.unwrap_or(false),
    })
}

pub fn roster_row_from_api(r: &ApiRosterPlayer, season: i32, team: &str) -> Result<RosterRow> {
    let athlete_id = r
        .id
        .ok_or_else(|| anyhow!("roster record for {team} {season} missing athlete id"))?;
    let name = full_name(r.first_name.as_deref(), r.last_name.as_deref())
        .ok_or_else(|| anyhow!("athlete {athlete_id} missing name"))?;
    Ok(RosterRow {
        athlete_id,
        season,
        team: team.to_string(),
        name,
        position: r.position.clone(),
        jersey: r.jersey,
        height: r.height,
        weight: r.weight,
        class_year: r.year,
        home_city: r.home_city.clone(),
        home_state: r.home_state.clone(),
        home_country: r.home_country.clone(),
    })
}

pub fn recruit_row_from_api(r: &ApiRecruit, year: i32) -> Result<RecruitRow> {
    let recruit_id = r
        .id
        .ok_or_else(|| anyhow!("recruit record for {year} missing id"))?;
    let name = r
        .name
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| anyhow!("recruit {recruit_id} missing name"))?;
    Ok(RecruitRow {
        recruit_id,
        year: r.year.unwrap_or(year),
        name: name.to_string(),
        position: r.position.clone(),
        height: r.height,
        weight: r.weight,
        stars: r.stars,
        rating: r.rating,
        ranking: r.ranking,
        committed_to: r.committed_to.clone(),
        city: r.city.clone(),
        state_province: r.state_province.clone(),
        country: r.country.clone(),
    })
}

pub fn class_rank_row_from_api(t: &ApiTeamRecruitingRank, year: i32) -> ClassRankRow {
    ClassRankRow {
        year: t.year.unwrap_or(year),
        team: t.team.clone(),
        rank: t.rank,
        points: t.points,
    }
}

pub fn position_group_row_from_api(p: &ApiPositionGroupRank, year: i32) -> PositionGroupRow {
    PositionGroupRow {
        year,
        team: p.team.clone(),
        position_group: p.position_group.clone(),
        avg_rating: p.average_rating,
        total_rating: p.total_rating,
        commits: p.commits,
        avg_stars: p.average_stars,
    }
}

pub fn transfer_row_from_api(t: &ApiTransfer, year: i32) -> Result<TransferRow> {
    let name = full_name(t.first_name.as_deref(), t.last_name.as_deref())
        .ok_or_else(|| anyhow!("transfer record for {year} missing name"))?;
    Ok(TransferRow {
        season: t.season.unwrap_or(year),
        name,
        position: t.position.clone(),
        origin: t.origin.as_ref().and_then(team_name_from_value),
        destination: t.destination.as_ref().and_then(team_name_from_value),
        transfer_date: t.transfer_date.clone(),
        rating: t.rating,
        stars: t.stars,
        eligibility: t.eligibility.clone(),
    })
}

pub fn poll_rank_rows_from_api(week: &ApiRankingWeek) -> Vec<PollRankRow> {
    let mut out = Vec::new();
    for poll in &week.polls {
        for entry in &poll.ranks {
            out.push(PollRankRow {
                season: week.season,
                week: week.week,
                poll: poll.poll.clone(),
                school: entry.school.clone(),
                rank: entry.rank,
                conference: entry.conference.clone(),
                first_place_votes: entry.first_place_votes,
                points: entry.points,
            });
        }
    }
    out
}

fn required_team(raw: Option<&str>) -> Option<String> {
    let trimmed = raw?.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_string())
}

// ---------------------------------------------------------------------------
// CSV path. Each table that can be seeded from a snapshot declares its
// column schema up front; the normalizer never guesses a type.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Int,
    Float,
    Bool,
    Text,
    /// Pseudo-JSON list, possibly single-quoted (`'[7, 10, 3, 7]'`).
    IntList,
}

#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub ty: ColumnType,
}

const fn col(name: &'static str, ty: ColumnType) -> Column {
    Column { name, ty }
}

pub const GAME_CSV_COLUMNS: &[Column] = &[
    col("id", ColumnType::Int),
    col("season", ColumnType::Int),
    col("week", ColumnType::Int),
    col("season_type", ColumnType::Text),
    col("start_date", ColumnType::Text),
    col("completed", ColumnType::Bool),
    col("neutral_site", ColumnType::Bool),
    col("conference_game", ColumnType::Bool),
    col("attendance", ColumnType::Int),
    col("venue", ColumnType::Text),
    col("home_team", ColumnType::Text),
    col("home_conference", ColumnType::Text),
    col("home_points", ColumnType::Int),
    col("home_line_scores", ColumnType::IntList),
    col("away_team", ColumnType::Text),
    col("away_conference", ColumnType::Text),
    col("away_points", ColumnType::Int),
    col("away_line_scores", ColumnType::IntList),
    col("excitement_index", ColumnType::Float),
];

#[derive(Debug, Clone, PartialEq)]
pub enum CsvValue {
    Null,
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    IntList(Vec<i64>),
}

impl CsvValue {
    fn as_i64(&self) -> Option<i64> {
        match self {
            CsvValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            CsvValue::Float(n) => Some(*n),
            CsvValue::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    fn as_bool(&self) -> Option<bool> {
        match self {
            CsvValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    fn as_text(&self) -> Option<&str> {
        match self {
            CsvValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    fn as_int_list(&self) -> Option<&[i64]> {
        match self {
            CsvValue::IntList(v) => Some(v.as_slice()),
            _ => None,
        }
    }
}

pub fn is_null_token(raw: &str) -> bool {
    matches!(raw, "" | "NA" | "NaN")
}

/// Comma split that respects double quotes; doubled quotes unescape.
/// Fields are trimmed after unquoting.
pub fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut cur = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                if in_quotes && chars.peek() == Some(&'"') {
                    cur.push('"');
                    chars.next();
                } else {
                    in_quotes = !in_quotes;
                }
            }
            ',' if !in_quotes => {
                fields.push(cur.trim().to_string());
                cur.clear();
            }
            _ => cur.push(ch),
        }
    }
    fields.push(cur.trim().to_string());
    fields
}

/// Single-quoted pseudo-JSON list recovery. One wrapping quote layer is
/// stripped, then single quotes become double quotes; a list that still
/// fails to parse is a null field, not a dead row.
pub fn parse_loose_int_list(raw: &str) -> Option<Vec<i64>> {
    let mut candidate = raw.trim();
    if candidate.len() >= 2
        && ((candidate.starts_with('\'') && candidate.ends_with('\''))
            || (candidate.starts_with('"') && candidate.ends_with('"')))
    {
        candidate = &candidate[1..candidate.len() - 1];
    }
    let candidate = candidate.replace('\'', "\"");
    let value = serde_json::from_str::<Value>(&candidate).ok()?;
    let arr = value.as_array()?;
    arr.iter().map(|v| v.as_i64()).collect()
}

fn parse_csv_field(raw: &str, ty: ColumnType) -> Result<CsvValue> {
    if is_null_token(raw) {
        return Ok(CsvValue::Null);
    }
    match ty {
        ColumnType::Int => raw
            .parse::<i64>()
            .map(CsvValue::Int)
            .with_context(|| format!("not an integer: {raw:?}")),
        ColumnType::Float => raw
            .parse::<f64>()
            .map(CsvValue::Float)
            .with_context(|| format!("not a number: {raw:?}")),
        ColumnType::Bool => match raw.to_lowercase().as_str() {
            "true" => Ok(CsvValue::Bool(true)),
            "false" => Ok(CsvValue::Bool(false)),
            _ => Err(anyhow!("not a boolean: {raw:?}")),
        },
        ColumnType::Text => Ok(CsvValue::Text(raw.to_string())),
        ColumnType::IntList => Ok(parse_loose_int_list(raw)
            .map(CsvValue::IntList)
            .unwrap_or(CsvValue::Null)),
    }
}

pub struct CsvRecord<'a> {
    schema: &'a [Column],
    values: Vec<CsvValue>,
}

impl<'a> CsvRecord<'a> {
    pub fn parse(line: &str, schema: &'a [Column]) -> Result<Self> {
        let fields = split_csv_line(line);
        if fields.len() != schema.len() {
            return Err(anyhow!(
                "expected {} fields, got {}",
                schema.len(),
                fields.len()
            ));
        }
        let mut values = Vec::with_capacity(schema.len());
        for (field, column) in fields.iter().zip(schema) {
            let value = parse_csv_field(field, column.ty)
                .with_context(|| format!("column {}", column.name))?;
            values.push(value);
        }
        Ok(Self { schema, values })
    }

    fn value(&self, name: &str) -> Result<&CsvValue> {
        self.schema
            .iter()
            .position(|c| c.name == name)
            .map(|idx| &self.values[idx])
            .ok_or_else(|| anyhow!("unknown column {name}"))
    }

    pub fn opt_i64(&self, name: &str) -> Result<Option<i64>> {
        Ok(self.value(name)?.as_i64())
    }

    pub fn opt_i32(&self, name: &str) -> Result<Option<i32>> {
        Ok(self.value(name)?.as_i64().and_then(|n| i32::try_from(n).ok()))
    }

    pub fn opt_f64(&self, name: &str) -> Result<Option<f64>> {
        Ok(self.value(name)?.as_f64())
    }

    pub fn opt_bool(&self, name: &str) -> Result<Option<bool>> {
        Ok(self.value(name)?.as_bool())
    }

    pub fn opt_text(&self, name: &str) -> Result<Option<String>> {
        Ok(self.value(name)?.as_text().map(|s| s.to_string()))
    }

    pub fn opt_int_list(&self, name: &str) -> Result<Option<Vec<i32>>> {
        Ok(self.value(name)?.as_int_list().map(|v| {
            v.iter()
                .filter_map(|n| i32::try_from(*n).ok())
                .collect::<Vec<_>>()
        }))
    }

    pub fn require_i64(&self, name: &str) -> Result<i64> {
        self.opt_i64(name)?
            .ok_or_else(|| anyhow!("column {name} is required"))
    }

    pub fn require_i32(&self, name: &str) -> Result<i32> {
        self.opt_i32(name)?
            .ok_or_else(|| anyhow!("column {name} is required"))
    }

    pub fn require_text(&self, name: &str) -> Result<String> {
        self.opt_text(name)?
            .filter(|s| !s.is_empty())
            .ok_or_else(|| anyhow!("column {name} is required"))
    }
}

pub fn game_row_from_csv(line: &str) -> Result<GameRow> {
    let rec = CsvRecord::parse(line, GAME_CSV_COLUMNS)?;
    Ok(GameRow {
        game_id: rec.require_i64("id")?,
        season: rec.require_i32("season")?,
        week: rec.require_i32("week")?,
        season_type: rec.opt_text("season_type")?,
        start_date: rec.opt_text("start_date")?,
        completed: rec.opt_bool("completed")?,
        neutral_site: rec.opt_bool("neutral_site")?,
        conference_game: rec.opt_bool("conference_game")?,
        attendance: rec.opt_i64("attendance")?,
        venue: rec.opt_text("venue")?,
        home_team: rec.require_text("home_team")?,
        home_conference: rec.opt_text("home_conference")?,
        home_points: rec.opt_i32("home_points")?,
        home_line_scores: rec.opt_int_list("home_line_scores")?,
        away_team: rec.require_text("away_team")?,
        away_conference: rec.opt_text("away_conference")?,
        away_points: rec.opt_i32("away_points")?,
        away_line_scores: rec.opt_int_list("away_line_scores")?,
        excitement_index: rec.opt_f64("excitement_index")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_split_respects_quotes() {
        let fields = split_csv_line(r#"1,"Norman, OK",plain,"say ""hi""""#);
        assert_eq!(fields, vec!["1", "Norman, OK", "plain", r#"say "hi""#]);
    }

    #[test]
    fn null_tokens_normalize_to_null() {
        assert_eq!(parse_csv_field("", ColumnType::Int).unwrap(), CsvValue::Null);
        assert_eq!(parse_csv_field("NA", ColumnType::Float).unwrap(), CsvValue::Null);
        assert_eq!(parse_csv_field("NaN", ColumnType::Float).unwrap(), CsvValue::Null);
        assert_eq!(
            parse_csv_field("NA", ColumnType::Text).unwrap(),
            CsvValue::Null
        );
    }

    #[test]
    fn bool_coercion_is_case_insensitive() {
        assert_eq!(
            parse_csv_field("TRUE", ColumnType::Bool).unwrap(),
            CsvValue::Bool(true)
        );
        assert_eq!(
            parse_csv_field("False", ColumnType::Bool).unwrap(),
            CsvValue::Bool(false)
        );
        assert!(parse_csv_field("yes", ColumnType::Bool).is_err());
    }

    #[test]
    fn loose_list_recovers_single_quotes() {
        assert_eq!(
            parse_loose_int_list("'[7, 10, 3, 7]'"),
            Some(vec![7, 10, 3, 7])
        );
        assert_eq!(parse_loose_int_list("[0, 14]"), Some(vec![0, 14]));
        assert_eq!(parse_loose_int_list("[7, oops]"), None);
        assert_eq!(parse_loose_int_list("not a list"), None);
    }

    #[test]
    fn bad_list_field_becomes_null_not_error() {
        let value = parse_csv_field("'[garbage'", ColumnType::IntList).unwrap();
        assert_eq!(value, CsvValue::Null);
    }

    #[test]
    fn play_classification_precedence() {
        assert_eq!(classify_play_type(Some("Rush")), PlayCategory::Rush);
        assert_eq!(
            classify_play_type(Some("Rushing Touchdown")),
            PlayCategory::Rush
        );
        assert_eq!(
            classify_play_type(Some("Pass Incompletion")),
            PlayCategory::Pass
        );
        assert_eq!(classify_play_type(Some("Sack")), PlayCategory::Pass);
        assert_eq!(
            classify_play_type(Some("Pass Interception Return")),
            PlayCategory::Turnover
        );
        assert_eq!(
            classify_play_type(Some("Fumble Recovery (Opponent)")),
            PlayCategory::Turnover
        );
        assert_eq!(
            classify_play_type(Some("Blocked Punt")),
            PlayCategory::SpecialTeams
        );
        assert_eq!(
            classify_play_type(Some("Field Goal Good")),
            PlayCategory::SpecialTeams
        );
        assert_eq!(classify_play_type(Some("Penalty")), PlayCategory::Penalty);
        assert_eq!(
            classify_play_type(Some("Timeout")),
            PlayCategory::Administrative
        );
        assert_eq!(classify_play_type(None), PlayCategory::Administrative);
    }

    #[test]
    fn drive_result_classification() {
        assert_eq!(classify_drive_result(Some("TD")), DriveOutcome::Touchdown);
        assert_eq!(classify_drive_result(Some("FG")), DriveOutcome::FieldGoal);
        assert_eq!(classify_drive_result(Some("MISSED FG")), DriveOutcome::Other);
        assert_eq!(classify_drive_result(Some("PUNT")), DriveOutcome::Punt);
        assert_eq!(classify_drive_result(Some("PUNT TD")), DriveOutcome::Punt);
        assert_eq!(classify_drive_result(Some("INT")), DriveOutcome::Turnover);
        assert_eq!(classify_drive_result(Some("INT TD")), DriveOutcome::Turnover);
        assert_eq!(
            classify_drive_result(Some("TURNOVER ON DOWNS")),
            DriveOutcome::Downs
        );
        assert_eq!(
            classify_drive_result(Some("END OF HALF")),
            DriveOutcome::EndOfHalf
        );
        assert_eq!(classify_drive_result(Some("SF")), DriveOutcome::Other);
        assert_eq!(classify_drive_result(None), DriveOutcome::Other);
    }

    #[test]
    fn yards_to_goal_clamps_into_field() {
        assert_eq!(clamp_yards_to_goal(-3), 0);
        assert_eq!(clamp_yards_to_goal(50), 50);
        assert_eq!(clamp_yards_to_goal(104), 100);
    }

    #[test]
    fn team_label_prefers_mascot_then_nickname() {
        let obj: Value =
            serde_json::from_str(r#"{"mascot": "Sooners", "nickname": "OU"}"#).unwrap();
        assert_eq!(team_name_from_value(&obj).as_deref(), Some("Sooners"));

        let no_mascot: Value = serde_json::from_str(r#"{"nickname": "OU"}"#).unwrap();
        assert_eq!(team_name_from_value(&no_mascot).as_deref(), Some("OU"));

        let plain = Value::String("Oklahoma".to_string());
        assert_eq!(team_name_from_value(&plain).as_deref(), Some("Oklahoma"));

        let empty: Value = serde_json::from_str(r#"{"school": "Oklahoma"}"#).unwrap();
        assert_eq!(team_name_from_value(&empty), None);
    }

    #[test]
    fn game_csv_row_maps_na_to_null() {
        // Line-score commas survive because the pseudo-JSON field is
        // itself double-quoted in the file.
        let line = "401,2024,1,regular,2024-08-31,true,false,false,NA,\
                    Memorial Stadium,Oklahoma,SEC,27,\"'[7, 10, 3, 7]'\",Houston,AAC,12,NA,NaN";
        let row = game_row_from_csv(line).unwrap();
        assert_eq!(row.game_id, 401);
        assert_eq!(row.attendance, None);
        assert_eq!(row.home_line_scores, Some(vec![7, 10, 3, 7]));
        assert_eq!(row.away_line_scores, None);
        assert_eq!(row.excitement_index, None);
    }

    #[test]
    fn game_csv_row_requires_key_columns() {
        let line = "NA,2024,1,regular,2024-08-31,true,false,false,80000,\
                    Memorial Stadium,Oklahoma,SEC,27,NA,Houston,AAC,12,NA,1.0";
        let err = game_row_from_csv(line).unwrap_err();
        assert!(err.to_string().contains("id"));
    }
}

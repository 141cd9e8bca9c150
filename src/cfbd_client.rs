use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::config::Config;

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Minimum pause after every successful call. The CFBD API is rate limited
/// and ingest runs are strictly sequential, so this is the only throttle.
pub const CALL_DELAY_MS: u64 = 100;

/// Authenticated client for api.collegefootballdata.com. Constructed once
/// per process and passed by reference into the orchestrators; retries are
/// the caller's business.
pub struct CfbdClient {
    client: Client,
    base_url: String,
    api_key: String,
    call_delay: Duration,
}

impl CfbdClient {
    pub fn new(config: &Config) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(anyhow!("CFBD API key is empty"));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("failed to build http client")?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            call_delay: Duration::from_millis(CALL_DELAY_MS),
        })
    }

    pub fn fetch_games(&self, year: i32, team: &str) -> Result<Vec<ApiGame>> {
        self.get_json(
            "/games",
            &[("year", year.to_string()), ("team", team.to_string())],
        )
    }

    pub fn fetch_drives(&self, year: i32, team: &str) -> Result<Vec<ApiDrive>> {
        self.get_json(
            "/drives",
            &[("year", year.to_string()), ("team", team.to_string())],
        )
    }

    pub fn fetch_plays(&self, year: i32, week: i32, team: &str) -> Result<Vec<ApiPlay>> {
        self.get_json(
            "/plays",
            &[
                ("year", year.to_string()),
                ("week", week.to_string()),
                ("team", team.to_string()),
            ],
        )
    }

    pub fn fetch_postseason_plays(&self, year: i32, team: &str) -> Result<Vec<ApiPlay>> {
        self.get_json(
            "/plays",
            &[
                ("year", year.to_string()),
                ("seasonType", "postseason".to_string()),
                ("team", team.to_string()),
            ],
        )
    }

    pub fn fetch_roster(&self, team: &str, year: i32) -> Result<Vec<ApiRosterPlayer>> {
        self.get_json(
            "/roster",
            &[("team", team.to_string()), ("year", year.to_string())],
        )
    }

    pub fn fetch_recruits(&self, year: i32, team: &str) -> Result<Vec<ApiRecruit>> {
        self.get_json(
            "/recruiting/players",
            &[("year", year.to_string()), ("team", team.to_string())],
        )
    }

    pub fn fetch_team_recruiting_ranks(
        &self,
        year: i32,
        team: &str,
    ) -> Result<Vec<ApiTeamRecruitingRank>> {
        self.get_json(
            "/recruiting/teams",
            &[("year", year.to_string()), ("team", team.to_string())],
        )
    }

    /// Position-group aggregates for a single class year
    /// (`startYear == endYear`, so the caller can key rows by that year).
    pub fn fetch_position_group_ranks(
        &self,
        year: i32,
        team: &str,
    ) -> Result<Vec<ApiPositionGroupRank>> {
        self.get_json(
            "/recruiting/groups",
            &[
                ("startYear", year.to_string()),
                ("endYear", year.to_string()),
                ("team", team.to_string()),
            ],
        )
    }

    pub fn fetch_portal(&self, year: i32) -> Result<Vec<ApiTransfer>> {
        self.get_json("/player/portal", &[("year", year.to_string())])
    }

    pub fn fetch_rankings(&self, year: i32, season_type: &str) -> Result<Vec<ApiRankingWeek>> {
        self.get_json(
            "/rankings",
            &[
                ("year", year.to_string()),
                ("seasonType", season_type.to_string()),
            ],
        )
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .header(ACCEPT, "application/json")
            .query(query)
            .send()
            .with_context(|| format!("GET {path} failed"))?;
        let status = resp.status();
        let body = resp.text().context("failed reading body")?;
        if !status.is_success() {
            return Err(anyhow!("http {} from {}: {}", status, path, body));
        }
        let parsed = serde_json::from_str::<T>(body.trim())
            .with_context(|| format!("invalid json from {path}"))?;
        thread::sleep(self.call_delay);
        Ok(parsed)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiGame {
    pub id: i64,
    pub season: i32,
    pub week: i32,
    #[serde(rename = "seasonType", default)]
    pub season_type: Option<String>,
    #[serde(rename = "startDate", default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
    #[serde(rename = "neutralSite", default)]
    pub neutral_site: Option<bool>,
    #[serde(rename = "conferenceGame", default)]
    pub conference_game: Option<bool>,
    #[serde(default)]
    pub attendance: Option<i64>,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(rename = "homeTeam", default)]
    pub home_team: Option<String>,
    #[serde(rename = "homeConference", default)]
    pub home_conference: Option<String>,
    #[serde(rename = "homePoints", default)]
    pub home_points: Option<i32>,
    #[serde(rename = "homeLineScores", default)]
    pub home_line_scores: Option<Vec<i32>>,
    #[serde(rename = "awayTeam", default)]
    pub away_team: Option<String>,
    #[serde(rename = "awayConference", default)]
    pub away_conference: Option<String>,
    #[serde(rename = "awayPoints", default)]
    pub away_points: Option<i32>,
    #[serde(rename = "awayLineScores", default)]
    pub away_line_scores: Option<Vec<i32>>,
    #[serde(
        rename = "excitementIndex",
        default,
        deserialize_with = "de_opt_f64_loose"
    )]
    pub excitement_index: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiClock {
    #[serde(default)]
    pub minutes: Option<i32>,
    #[serde(default)]
    pub seconds: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiDrive {
    #[serde(rename = "gameId")]
    pub game_id: i64,
    #[serde(rename = "driveNumber", default)]
    pub drive_number: Option<i32>,
    #[serde(default)]
    pub offense: Option<String>,
    #[serde(default)]
    pub defense: Option<String>,
    #[serde(rename = "startYardsToGoal", default)]
    pub start_yards_to_goal: Option<i32>,
    #[serde(rename = "endYardsToGoal", default)]
    pub end_yards_to_goal: Option<i32>,
    #[serde(default)]
    pub plays: Option<i32>,
    #[serde(default)]
    pub yards: Option<i32>,
    #[serde(rename = "driveResult", default)]
    pub drive_result: Option<String>,
    #[serde(default)]
    pub scoring: Option<bool>,
    #[serde(default)]
    pub elapsed: Option<ApiClock>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiPlay {
    #[serde(rename = "gameId")]
    pub game_id: i64,
    #[serde(rename = "driveNumber", default)]
    pub drive_number: Option<i32>,
    #[serde(rename = "playNumber", default)]
    pub play_number: Option<i32>,
    #[serde(default)]
    pub offense: Option<String>,
    #[serde(default)]
    pub defense: Option<String>,
    #[serde(default)]
    pub period: Option<i32>,
    #[serde(default)]
    pub clock: Option<ApiClock>,
    #[serde(default)]
    pub down: Option<i32>,
    #[serde(default)]
    pub distance: Option<i32>,
    #[serde(rename = "yardsGained", default)]
    pub yards_gained: Option<i32>,
    #[serde(rename = "playType", default)]
    pub play_type: Option<String>,
    #[serde(rename = "playText", default)]
    pub play_text: Option<String>,
    #[serde(default, deserialize_with = "de_opt_f64_loose")]
    pub ppa: Option<f64>,
    #[serde(default)]
    pub scoring: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiRosterPlayer {
    #[serde(default, deserialize_with = "de_opt_i64_loose")]
    pub id: Option<i64>,
    #[serde(rename = "firstName", default)]
    pub first_name: Option<String>,
    #[serde(rename = "lastName", default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub jersey: Option<i32>,
    #[serde(default)]
    pub height: Option<i32>,
    #[serde(default)]
    pub weight: Option<i32>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(rename = "homeCity", default)]
    pub home_city: Option<String>,
    #[serde(rename = "homeState", default)]
    pub home_state: Option<String>,
    #[serde(rename = "homeCountry", default)]
    pub home_country: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiRecruit {
    #[serde(default, deserialize_with = "de_opt_i64_loose")]
    pub id: Option<i64>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub ranking: Option<i32>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "committedTo", default)]
    pub committed_to: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default, deserialize_with = "de_opt_f64_loose")]
    pub height: Option<f64>,
    #[serde(default)]
    pub weight: Option<i32>,
    #[serde(default)]
    pub stars: Option<i32>,
    #[serde(default, deserialize_with = "de_opt_f64_loose")]
    pub rating: Option<f64>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(rename = "stateProvince", default)]
    pub state_province: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiTeamRecruitingRank {
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub rank: Option<i32>,
    pub team: String,
    // Comes back as a quoted number from the API.
    #[serde(default, deserialize_with = "de_opt_f64_loose")]
    pub points: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiPositionGroupRank {
    pub team: String,
    #[serde(default)]
    pub conference: Option<String>,
    #[serde(rename = "positionGroup")]
    pub position_group: String,
    #[serde(rename = "averageRating", default)]
    pub average_rating: Option<f64>,
    #[serde(rename = "totalRating", default)]
    pub total_rating: Option<f64>,
    #[serde(default)]
    pub commits: Option<i32>,
    #[serde(rename = "averageStars", default)]
    pub average_stars: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiTransfer {
    #[serde(default)]
    pub season: Option<i32>,
    #[serde(rename = "firstName", default)]
    pub first_name: Option<String>,
    #[serde(rename = "lastName", default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    // Either a plain school name or an object carrying mascot/nickname.
    #[serde(default)]
    pub origin: Option<Value>,
    #[serde(default)]
    pub destination: Option<Value>,
    #[serde(rename = "transferDate", default)]
    pub transfer_date: Option<String>,
    #[serde(default, deserialize_with = "de_opt_f64_loose")]
    pub rating: Option<f64>,
    #[serde(default)]
    pub stars: Option<i32>,
    #[serde(default)]
    pub eligibility: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiRankingWeek {
    pub season: i32,
    #[serde(rename = "seasonType", default)]
    pub season_type: Option<String>,
    pub week: i32,
    #[serde(default)]
    pub polls: Vec<ApiPoll>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiPoll {
    pub poll: String,
    #[serde(default)]
    pub ranks: Vec<ApiPollRank>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiPollRank {
    #[serde(default)]
    pub rank: Option<i32>,
    pub school: String,
    #[serde(default)]
    pub conference: Option<String>,
    #[serde(rename = "firstPlaceVotes", default)]
    pub first_place_votes: Option<i32>,
    #[serde(default)]
    pub points: Option<i32>,
}

fn de_opt_f64_loose<'de, D>(de: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(de)?;
    Ok(value.as_ref().and_then(f64_from_value))
}

fn de_opt_i64_loose<'de, D>(de: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(de)?;
    Ok(value.as_ref().and_then(i64_from_value))
}

fn f64_from_value(v: &Value) -> Option<f64> {
    if let Some(n) = v.as_f64() {
        return Some(n);
    }
    v.as_str()?.trim().parse::<f64>().ok()
}

fn i64_from_value(v: &Value) -> Option<i64> {
    if let Some(n) = v.as_i64() {
        return Some(n);
    }
    v.as_str()?.trim().parse::<i64>().ok()
}

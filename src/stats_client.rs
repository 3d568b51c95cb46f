use chrono::NaiveDate;
use reqwest::header::{HeaderMap, HeaderValue, ORIGIN, REFERER, USER_AGENT};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time;

use crate::config::StatsClientSettings;

const REQUEST_TIMEOUT: time::Duration = time::Duration::from_secs(30);
const LEAGUE_ID: &str = "00";
const GAME_HEADER: &str = "GameHeader";
const GAME_ID_COLUMN: &str = "GAME_ID";

/// Client for the NBA stats API. It only answers requests that look like they
/// come from a browser on nba.com, hence the extra headers.
pub struct StatsClient {
    http_client: Client,
    base_url: String,
}

#[derive(thiserror::Error, Debug)]
pub enum StatsClientError {
    #[error("Failed to reach the stats API.")]
    Request(#[from] reqwest::Error),
    #[error("The stats API answered {0}.")]
    Status(StatusCode),
    #[error("Unexpected stats API response: {0}")]
    UnexpectedPayload(String),
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct ScoreboardResponse {
    result_sets: Vec<ResultSet>,
}

#[derive(Deserialize, Debug)]
struct ResultSet {
    name: String,
    headers: Vec<String>,
    #[serde(rename = "rowSet")]
    row_set: Vec<Vec<serde_json::Value>>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct BoxScoreResponse {
    box_score_traditional: BoxScore,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct BoxScore {
    pub game_id: String,
    pub home_team: TeamBoxScore,
    pub away_team: TeamBoxScore,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct TeamBoxScore {
    pub team_tricode: String,
    #[serde(default)]
    pub players: Vec<PlayerBoxScore>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PlayerBoxScore {
    pub first_name: String,
    pub family_name: String,
    pub statistics: PlayerStatistics,
}

// Players who did not play come back with null stat lines
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStatistics {
    #[serde(default)]
    pub minutes: Option<String>,
    #[serde(default)]
    points: Option<u32>,
    #[serde(default)]
    rebounds_total: Option<u32>,
    #[serde(default)]
    assists: Option<u32>,
}

impl PlayerStatistics {
    pub fn points(&self) -> u32 {
        self.points.unwrap_or(0)
    }

    pub fn rebounds(&self) -> u32 {
        self.rebounds_total.unwrap_or(0)
    }

    pub fn assists(&self) -> u32 {
        self.assists.unwrap_or(0)
    }
}

impl BoxScore {
    /// Every player line of the game along with the tricode of their team.
    pub fn players(&self) -> impl Iterator<Item = (&str, &PlayerBoxScore)> {
        [&self.home_team, &self.away_team].into_iter().flat_map(|team| {
            team.players
                .iter()
                .map(move |player| (team.team_tricode.as_str(), player))
        })
    }
}

impl StatsClient {
    pub fn new(
        base_url: String,
        timeout: Option<time::Duration>,
    ) -> Result<StatsClient, reqwest::Error> {
        let http_client = Client::builder()
            .timeout(timeout.unwrap_or(REQUEST_TIMEOUT))
            .default_headers(browser_headers())
            .build()?;

        Ok(StatsClient {
            http_client,
            base_url,
        })
    }

    pub fn from_settings(settings: &StatsClientSettings) -> Result<StatsClient, reqwest::Error> {
        StatsClient::new(settings.get_base_url(), Some(settings.get_timeout()))
    }

    #[tracing::instrument(name = "Fetching the scoreboard", skip(self))]
    pub async fn game_ids_for(&self, date: NaiveDate) -> Result<Vec<String>, StatsClientError> {
        let url = format!("{}/scoreboardv2", self.base_url);
        let game_date = date.format("%m/%d/%Y").to_string();
        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("GameDate", game_date.as_str()),
                ("LeagueID", LEAGUE_ID),
                ("DayOffset", "0"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StatsClientError::Status(response.status()));
        }

        let scoreboard: ScoreboardResponse = response.json().await?;

        game_ids_from(scoreboard)
    }

    #[tracing::instrument(name = "Fetching a box score", skip(self))]
    pub async fn box_score(&self, game_id: &str) -> Result<BoxScore, StatsClientError> {
        let url = format!("{}/boxscoretraditionalv3", self.base_url);
        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("GameID", game_id),
                ("LeagueID", LEAGUE_ID),
                ("StartPeriod", "0"),
                ("EndPeriod", "0"),
                ("StartRange", "0"),
                ("EndRange", "0"),
                ("RangeType", "0"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StatsClientError::Status(response.status()));
        }

        let box_score: BoxScoreResponse = response.json().await?;

        Ok(box_score.box_score_traditional)
    }
}

fn game_ids_from(scoreboard: ScoreboardResponse) -> Result<Vec<String>, StatsClientError> {
    let game_header = scoreboard
        .result_sets
        .into_iter()
        .find(|result_set| result_set.name == GAME_HEADER)
        .ok_or_else(|| StatsClientError::UnexpectedPayload(format!("missing {}", GAME_HEADER)))?;
    let column = game_header
        .headers
        .iter()
        .position(|header| header == GAME_ID_COLUMN)
        .ok_or_else(|| {
            StatsClientError::UnexpectedPayload(format!("missing {} column", GAME_ID_COLUMN))
        })?;

    let mut game_ids: Vec<String> = Vec::new();

    for row in game_header.row_set {
        match row.get(column).and_then(|value| value.as_str()) {
            // Double headers repeat the game row once per broadcaster
            Some(game_id) if !game_ids.iter().any(|known| known == game_id) => {
                game_ids.push(game_id.to_string())
            }
            Some(_) => {}
            None => tracing::warn!("Scoreboard row without a game id: {:?}", row),
        }
    }

    Ok(game_ids)
}

fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();

    headers.insert(
        USER_AGENT,
        HeaderValue::from_static(
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36",
        ),
    );
    headers.insert(REFERER, HeaderValue::from_static("https://www.nba.com/"));
    headers.insert(ORIGIN, HeaderValue::from_static("https://www.nba.com"));
    headers.insert("x-nba-stats-origin", HeaderValue::from_static("stats"));
    headers.insert("x-nba-stats-token", HeaderValue::from_static("true"));

    headers
}

//! NBA live-data feeds (scoreboard and box scores).
//!
//! The scoreboard feed only ever describes today's slate, so there is no
//! date parameter anywhere in this client.

use super::{fetch_json, LiveProvider, ProviderError};
use crate::config::ProviderConfig;
use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::info;

const PROVIDER: &str = "nba-live";

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct PeriodScore {
    pub period: u32,
    pub period_type: String,
    pub score: u32,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct LiveTeam {
    pub team_id: u64,
    pub team_name: String,
    pub team_city: String,
    pub team_tricode: String,
    pub wins: u32,
    pub losses: u32,
    pub score: u32,
    pub periods: Vec<PeriodScore>,
}

impl LiveTeam {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.team_city, self.team_name).trim().to_string()
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Leader {
    pub person_id: u64,
    pub name: String,
    pub jersey_num: String,
    pub position: String,
    pub team_tricode: String,
    pub points: u32,
    pub rebounds: u32,
    pub assists: u32,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct GameLeaders {
    pub home_leaders: Leader,
    pub away_leaders: Leader,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct LiveGame {
    pub game_id: String,
    pub game_code: String,
    /// 1 scheduled, 2 in progress, 3 final
    pub game_status: u8,
    pub game_status_text: String,
    pub period: u32,
    pub game_clock: String,
    #[serde(rename = "gameTimeUTC")]
    pub game_time_utc: Option<String>,
    pub home_team: LiveTeam,
    pub away_team: LiveTeam,
    pub game_leaders: Option<GameLeaders>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct PlayerStatistics {
    pub points: u32,
    #[serde(alias = "reboundsTotal")]
    pub rebounds: u32,
    pub assists: u32,
    /// ISO-8601 duration, e.g. "PT34M12.00S"
    pub minutes: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct BoxScorePlayer {
    pub person_id: u64,
    pub name: String,
    pub jersey_num: String,
    pub position: Option<String>,
    /// The feed encodes this as "1"/"0"
    #[serde(deserialize_with = "flag")]
    pub starter: bool,
    pub statistics: PlayerStatistics,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct BoxScoreTeam {
    pub team_id: u64,
    pub team_name: String,
    pub team_city: String,
    pub team_tricode: String,
    pub score: u32,
    pub players: Vec<BoxScorePlayer>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct BoxScore {
    pub game_id: String,
    pub game_status_text: String,
    pub home_team: BoxScoreTeam,
    pub away_team: BoxScoreTeam,
}

impl BoxScore {
    /// Home players first, then away.
    pub fn players(&self) -> impl Iterator<Item = &BoxScorePlayer> {
        self.home_team.players.iter().chain(self.away_team.players.iter())
    }
}

fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
        Text(String),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => b,
        Flag::Int(i) => i != 0,
        Flag::Text(s) => s == "1" || s.eq_ignore_ascii_case("true"),
    })
}

#[derive(Debug, Deserialize)]
struct ScoreboardEnvelope {
    scoreboard: Scoreboard,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Scoreboard {
    #[serde(default)]
    game_date: String,
    #[serde(default)]
    games: Vec<LiveGame>,
}

#[derive(Debug, Deserialize)]
struct BoxScoreEnvelope {
    game: BoxScore,
}

pub struct LiveClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl LiveClient {
    pub fn new(config: &ProviderConfig, http_client: reqwest::Client) -> Self {
        Self {
            http_client,
            base_url: config.live_base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl LiveProvider for LiveClient {
    async fn scoreboard(&self) -> Result<Vec<LiveGame>, ProviderError> {
        let url = format!("{}/scoreboard/todaysScoreboard_00.json", self.base_url);
        let envelope: ScoreboardEnvelope =
            fetch_json(self.http_client.get(&url), PROVIDER, "scoreboard").await?;
        info!(
            "Fetched {} games from live scoreboard ({})",
            envelope.scoreboard.games.len(),
            envelope.scoreboard.game_date
        );
        Ok(envelope.scoreboard.games)
    }

    async fn boxscore(&self, game_id: &str) -> Result<BoxScore, ProviderError> {
        let url = format!("{}/boxscore/boxscore_{}.json", self.base_url, game_id);
        let envelope: BoxScoreEnvelope =
            fetch_json(self.http_client.get(&url), PROVIDER, "boxscore").await?;
        Ok(envelope.game)
    }
}

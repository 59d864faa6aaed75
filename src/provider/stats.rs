//! balldontlie client.

use super::{fetch_json, ProviderError, StatsProvider};
use crate::config::ProviderConfig;
use async_trait::async_trait;
use chrono::NaiveDate;
use governor::{Quota, RateLimiter};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use tracing::info;

const PROVIDER: &str = "balldontlie";

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Team {
    pub id: u32,
    pub conference: String,
    pub division: String,
    pub city: String,
    pub name: String,
    pub full_name: String,
    pub abbreviation: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Game {
    pub id: u64,
    pub date: String,
    pub season: u32,
    /// Tip-off time before the game, "Final" after it
    pub status: String,
    pub period: u32,
    pub time: Option<String>,
    pub postseason: bool,
    pub home_team_score: u32,
    pub visitor_team_score: u32,
    pub home_team: Team,
    pub visitor_team: Team,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Player {
    pub id: u32,
    pub first_name: String,
    pub last_name: String,
    pub position: String,
    pub height: Option<String>,
    pub weight: Option<String>,
    pub jersey_number: Option<String>,
    pub college: Option<String>,
    pub country: Option<String>,
    pub draft_year: Option<u32>,
    pub draft_round: Option<u32>,
    pub draft_number: Option<u32>,
    pub team: Option<Team>,
}

/// Game reference embedded in a stat line (teams by id only).
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct StatGame {
    pub id: u64,
    pub date: String,
    pub season: u32,
    pub status: String,
    pub postseason: bool,
    pub home_team_id: u32,
    pub visitor_team_id: u32,
    pub home_team_score: u32,
    pub visitor_team_score: u32,
}

/// One player's box score in one game. Counting stats are null for DNPs.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct StatLine {
    pub id: u64,
    pub min: Option<String>,
    pub fgm: Option<u32>,
    pub fga: Option<u32>,
    pub fg_pct: Option<f64>,
    pub fg3m: Option<u32>,
    pub fg3a: Option<u32>,
    pub fg3_pct: Option<f64>,
    pub ftm: Option<u32>,
    pub fta: Option<u32>,
    pub ft_pct: Option<f64>,
    pub oreb: Option<u32>,
    pub dreb: Option<u32>,
    pub reb: Option<u32>,
    pub ast: Option<u32>,
    pub stl: Option<u32>,
    pub blk: Option<u32>,
    pub turnover: Option<u32>,
    pub pf: Option<u32>,
    pub pts: Option<u32>,
    pub player: Player,
    pub team: Team,
    pub game: StatGame,
}

#[derive(Debug, Deserialize)]
struct Page<T> {
    data: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct Single<T> {
    data: T,
}

type DirectLimiter =
    RateLimiter<governor::state::NotKeyed, governor::state::InMemoryState, governor::clock::DefaultClock>;

/// balldontlie v1 client, rate limited to the plan's requests per minute.
pub struct StatsClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
    rate_limiter: DirectLimiter,
}

impl StatsClient {
    pub fn new(config: &ProviderConfig, http_client: reqwest::Client) -> anyhow::Result<Self> {
        let per_minute =
            NonZeroU32::new(config.balldontlie_requests_per_minute).unwrap_or(NonZeroU32::MIN);
        Ok(Self {
            http_client,
            base_url: config.balldontlie_base_url.trim_end_matches('/').to_string(),
            api_key: config.stats_api_key()?.to_string(),
            rate_limiter: RateLimiter::direct(Quota::per_minute(per_minute)),
        })
    }

    async fn get(&self, path: &str) -> reqwest::RequestBuilder {
        // Wait for rate limit
        self.rate_limiter.until_ready().await;
        self.http_client
            .get(format!("{}{}", self.base_url, path))
            .header("Authorization", &self.api_key)
    }
}

#[async_trait]
impl StatsProvider for StatsClient {
    async fn games_by_date(&self, date: NaiveDate) -> Result<Vec<Game>, ProviderError> {
        let day = date.format("%Y-%m-%d").to_string();
        let request = self.get("/games").await.query(&[
            ("start_date", day.as_str()),
            ("end_date", day.as_str()),
            ("per_page", "100"),
        ]);
        let page: Page<Game> = fetch_json(request, PROVIDER, "games").await?;
        info!("Fetched {} games for {} from balldontlie", page.data.len(), day);
        Ok(page.data)
    }

    async fn teams(&self) -> Result<Vec<Team>, ProviderError> {
        let request = self.get("/teams").await;
        let page: Page<Team> = fetch_json(request, PROVIDER, "teams").await?;
        Ok(page.data)
    }

    async fn team(&self, team_id: u32) -> Result<Team, ProviderError> {
        let request = self.get(&format!("/teams/{team_id}")).await;
        let single: Single<Team> = fetch_json(request, PROVIDER, "team").await?;
        Ok(single.data)
    }

    async fn search_players(&self, search: &str) -> Result<Vec<Player>, ProviderError> {
        let request = self
            .get("/players")
            .await
            .query(&[("search", search), ("per_page", "25")]);
        let page: Page<Player> = fetch_json(request, PROVIDER, "players").await?;
        info!("Player search {:?} matched {} players", search, page.data.len());
        Ok(page.data)
    }

    async fn player_stats(&self, player_id: u32) -> Result<Vec<StatLine>, ProviderError> {
        let id = player_id.to_string();
        let request = self
            .get("/stats")
            .await
            .query(&[("player_ids[]", id.as_str()), ("per_page", "10")]);
        let page: Page<StatLine> = fetch_json(request, PROVIDER, "stats").await?;
        Ok(page.data)
    }
}

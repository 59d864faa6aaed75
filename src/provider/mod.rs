//! Clients for the external NBA data sources.
//!
//! - [`stats`]: balldontlie REST API (paid, keyed, rate limited)
//! - [`live`]: NBA live-data JSON feeds (free, today's games only)
//! - [`teams`]: static directory of the 30 franchises
//! - [`players`]: static player directory keyed by NBA person ids

pub mod live;
pub mod players;
pub mod stats;
pub mod teams;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

pub use live::{BoxScore, LiveClient, LiveGame, LiveTeam};
pub use stats::{Game, Player, StatLine, StatsClient, Team};

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request to {provider} failed: {source}")]
    Request {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{provider} returned status {status}: {body}")]
    Status {
        provider: &'static str,
        status: u16,
        body: String,
    },
    #[error("failed to parse {what} from {provider}: {source}")]
    Decode {
        provider: &'static str,
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("{0} not found")]
    NotFound(String),
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Paid stats API.
#[async_trait]
pub trait StatsProvider: Send + Sync {
    async fn games_by_date(&self, date: NaiveDate) -> Result<Vec<Game>, ProviderError>;

    async fn teams(&self) -> Result<Vec<Team>, ProviderError>;

    async fn team(&self, team_id: u32) -> Result<Team, ProviderError>;

    /// Players whose name matches `search`, first page of 25.
    async fn search_players(&self, search: &str) -> Result<Vec<Player>, ProviderError>;

    /// Most recent 10 stat lines of a player.
    async fn player_stats(&self, player_id: u32) -> Result<Vec<StatLine>, ProviderError>;
}

/// Free live-data feed. Only ever knows about today's games.
#[async_trait]
pub trait LiveProvider: Send + Sync {
    async fn scoreboard(&self) -> Result<Vec<LiveGame>, ProviderError>;

    async fn boxscore(&self, game_id: &str) -> Result<BoxScore, ProviderError>;
}

/// HTTP client with timeouts
pub fn http_client() -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .pool_max_idle_per_host(5)
        .build()
        .map_err(ProviderError::Client)
}

/// Send a request and decode the JSON body, keeping the raw body in the
/// error when the upstream answers with a non-success status.
pub(crate) async fn fetch_json<T: DeserializeOwned>(
    request: reqwest::RequestBuilder,
    provider: &'static str,
    what: &'static str,
) -> Result<T, ProviderError> {
    let response = request
        .send()
        .await
        .map_err(|source| ProviderError::Request { provider, source })?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|source| ProviderError::Request { provider, source })?;

    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(ProviderError::NotFound(what.to_string()));
    }
    if !status.is_success() {
        return Err(ProviderError::Status {
            provider,
            status: status.as_u16(),
            body,
        });
    }

    debug!("{} answered {} bytes for {}", provider, body.len(), what);
    decode(&body, provider, what)
}

pub(crate) fn decode<T: DeserializeOwned>(
    body: &str,
    provider: &'static str,
    what: &'static str,
) -> Result<T, ProviderError> {
    serde_json::from_str(body).map_err(|source| ProviderError::Decode {
        provider,
        what,
        source,
    })
}

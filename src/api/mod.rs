//! HTTP layer: routes, shared state, and the response envelope.

mod envelope;
mod error;
mod games;
mod health;
mod live;
mod newsletter;
mod players;
mod teams;
mod users;

pub use envelope::ApiResponse;
pub use error::ApiError;
pub use health::HealthState;

use crate::provider::{LiveProvider, ProviderError, StatsProvider};
use crate::store::{EmailAddress, SubscriberStore};
use axum::routing::{get, patch, post};
use axum::Router;
use std::future::Future;
use std::sync::Arc;

pub type ApiResult<T> = Result<ApiResponse<T>, ApiError>;

/// Shared application context passed to all handlers
#[derive(Clone)]
pub struct AppState {
    pub stats: Arc<dyn StatsProvider>,
    pub live: Arc<dyn LiveProvider>,
    pub store: Arc<dyn SubscriberStore>,
    pub health: HealthState,
}

impl AppState {
    pub fn new(
        stats: Arc<dyn StatsProvider>,
        live: Arc<dyn LiveProvider>,
        store: Arc<dyn SubscriberStore>,
    ) -> Self {
        Self {
            stats,
            live,
            store,
            health: HealthState::new(),
        }
    }

    /// Await a provider call and feed its outcome into the health counters.
    pub async fn upstream<T, F>(&self, call: F) -> Result<T, ApiError>
    where
        F: Future<Output = Result<T, ProviderError>>,
    {
        match call.await {
            Ok(value) => {
                self.health.record_success().await;
                Ok(value)
            }
            Err(ProviderError::NotFound(what)) => Err(ProviderError::NotFound(what).into()),
            Err(e) => {
                self.health.record_error().await;
                Err(e.into())
            }
        }
    }
}

pub(crate) fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str, ApiError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::missing_param(name))
}

pub(crate) fn parse_email(raw: &str) -> Result<EmailAddress, ApiError> {
    EmailAddress::parse(raw).map_err(ApiError::from)
}

pub(crate) fn parse_id<T: std::str::FromStr>(raw: &str, what: &str) -> Result<T, ApiError> {
    raw.trim()
        .parse()
        .map_err(|_| ApiError::InvalidInput(format!("invalid {what} {raw:?}")))
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // balldontlie
        .route("/api/games/today", get(games::today))
        .route("/api/games/today/by-team", get(games::today_by_team))
        .route("/api/games/teams", get(games::teams))
        .route("/api/games/teams/:team_id", get(games::team))
        .route("/api/games/players/search", get(games::search_players))
        .route("/api/games/players/:player_id/stats", get(games::player_stats))
        .route("/api/games/:date", get(games::by_date))
        // live feed
        .route("/api/live/games/today", get(live::today))
        .route("/api/live/games/today/by-team", get(live::today_by_team))
        .route("/api/live/games/subscriber/:email", get(live::subscriber_games))
        .route("/api/teams", get(teams::list))
        .route("/api/teams/:team_name", get(teams::by_name))
        .route("/api/players/search", get(players::search))
        .route("/api/players/id/:player_id/stats", get(players::stats_by_id))
        .route("/api/players/name/:player_name/stats", get(players::stats_by_name))
        // subscribers
        .route("/api/users", get(users::list))
        .route("/api/users/subscribe", post(users::subscribe))
        .route(
            "/api/users/subscribe/:email",
            get(users::get_subscriber).delete(users::unsubscribe),
        )
        .route("/api/users/:email/teams", patch(users::update_teams))
        .route("/api/users/:email/players", patch(users::update_players))
        .route("/api/newsletter/preview", get(newsletter::preview))
        .with_state(state)
}

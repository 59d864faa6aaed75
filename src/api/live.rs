//! Today's games from the live feed.

use super::games::TeamQuery;
use super::{parse_email, required, ApiError, ApiResponse, ApiResult, AppState};
use crate::provider::LiveGame;
use crate::query::{games_for_team_ids, live_team_games};
use axum::extract::{Path, Query, State};

/// GET /api/live/games/today
pub async fn today(State(state): State<AppState>) -> ApiResult<Vec<LiveGame>> {
    let games = state.upstream(state.live.scoreboard()).await?;
    Ok(ApiResponse::ok(games))
}

/// GET /api/live/games/today/by-team?team=warriors
pub async fn today_by_team(
    State(state): State<AppState>,
    Query(query): Query<TeamQuery>,
) -> ApiResult<Vec<LiveGame>> {
    let team = required(&query.team, "team")?;
    let games = state.upstream(state.live.scoreboard()).await?;
    Ok(ApiResponse::ok(live_team_games(&games, team)))
}

/// GET /api/live/games/subscriber/:email
pub async fn subscriber_games(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> ApiResult<Vec<LiveGame>> {
    let email = parse_email(&email)?;
    let subscriber = state
        .store
        .get(&email)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("subscriber {email} not found")))?;

    let games = state.upstream(state.live.scoreboard()).await?;
    Ok(ApiResponse::ok(games_for_team_ids(&games, &subscriber.team_ids())))
}

//! Stats-API (balldontlie) game, team and player passthroughs.

use super::{parse_id, required, ApiResponse, ApiResult, AppState};
use crate::clock::{parse_game_date, today_us_eastern};
use crate::provider::{Game, Player, StatLine, Team};
use crate::query::stats_team_games;
use axum::extract::{Path, Query, State};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct TeamQuery {
    pub team: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
}

/// GET /api/games/today
pub async fn today(State(state): State<AppState>) -> ApiResult<Vec<Game>> {
    let games = state
        .upstream(state.stats.games_by_date(today_us_eastern()))
        .await?;
    Ok(ApiResponse::ok(games))
}

/// GET /api/games/today/by-team?team=GSW
pub async fn today_by_team(
    State(state): State<AppState>,
    Query(query): Query<TeamQuery>,
) -> ApiResult<Vec<Game>> {
    let team = required(&query.team, "team")?;
    let games = state
        .upstream(state.stats.games_by_date(today_us_eastern()))
        .await?;
    Ok(ApiResponse::ok(stats_team_games(&games, team)))
}

/// GET /api/games/:date
pub async fn by_date(State(state): State<AppState>, Path(date): Path<String>) -> ApiResult<Vec<Game>> {
    let date = parse_game_date(&date)?;
    let games = state.upstream(state.stats.games_by_date(date)).await?;
    Ok(ApiResponse::ok(games))
}

/// GET /api/games/teams
pub async fn teams(State(state): State<AppState>) -> ApiResult<Vec<Team>> {
    let teams = state.upstream(state.stats.teams()).await?;
    Ok(ApiResponse::ok(teams))
}

/// GET /api/games/teams/:team_id
pub async fn team(State(state): State<AppState>, Path(team_id): Path<String>) -> ApiResult<Team> {
    let team_id: u32 = parse_id(&team_id, "team id")?;
    let team = state.upstream(state.stats.team(team_id)).await?;
    Ok(ApiResponse::ok(team))
}

/// GET /api/games/players/search?search=curry
pub async fn search_players(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Vec<Player>> {
    let search = required(&query.search, "search")?;
    let players = state.upstream(state.stats.search_players(search)).await?;
    Ok(ApiResponse::ok(players))
}

/// GET /api/games/players/:player_id/stats
pub async fn player_stats(
    State(state): State<AppState>,
    Path(player_id): Path<String>,
) -> ApiResult<Vec<StatLine>> {
    let player_id: u32 = parse_id(&player_id, "player id")?;
    let stats = state.upstream(state.stats.player_stats(player_id)).await?;
    Ok(ApiResponse::ok(stats))
}

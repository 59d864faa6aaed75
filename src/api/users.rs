//! Subscriber endpoints.

use super::{parse_email, ApiError, ApiResponse, ApiResult, AppState};
use crate::provider::teams;
use crate::store::{FavoritePlayer, FavoriteTeam, Subscriber};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use std::collections::HashSet;
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct SubscribeRequest {
    pub email: String,
    pub timezone: Option<String>,
}

/// POST /api/users/subscribe
pub async fn subscribe(
    State(state): State<AppState>,
    Json(request): Json<SubscribeRequest>,
) -> Result<(StatusCode, ApiResponse<Subscriber>), ApiError> {
    let email = parse_email(&request.email)?;
    let subscriber = Subscriber::new(&email, request.timezone);
    state.store.put(subscriber.clone()).await?;
    info!("New subscriber {}", email);
    Ok((
        StatusCode::CREATED,
        ApiResponse::ok(subscriber).with_message("subscribed"),
    ))
}

/// GET /api/users/subscribe/:email
pub async fn get_subscriber(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> ApiResult<Subscriber> {
    let email = parse_email(&email)?;
    let subscriber = state
        .store
        .get(&email)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("subscriber {email} not found")))?;
    Ok(ApiResponse::ok(subscriber))
}

/// DELETE /api/users/subscribe/:email
pub async fn unsubscribe(State(state): State<AppState>, Path(email): Path<String>) -> ApiResult<()> {
    let email = parse_email(&email)?;
    state.store.delete(&email).await?;
    info!("Unsubscribed {}", email);
    Ok(ApiResponse::message("unsubscribed"))
}

/// GET /api/users
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Subscriber>> {
    Ok(ApiResponse::ok(state.store.scan().await?))
}

/// PATCH /api/users/:email/teams, body: the full list of favourite teams
pub async fn update_teams(
    State(state): State<AppState>,
    Path(email): Path<String>,
    Json(teams): Json<Vec<FavoriteTeam>>,
) -> ApiResult<Subscriber> {
    let email = parse_email(&email)?;
    let teams = canonical_teams(teams)?;
    let subscriber = state.store.update_teams(&email, teams).await?;
    Ok(ApiResponse::ok(subscriber))
}

/// PATCH /api/users/:email/players
pub async fn update_players(
    State(state): State<AppState>,
    Path(email): Path<String>,
    Json(players): Json<Vec<FavoritePlayer>>,
) -> ApiResult<Subscriber> {
    let email = parse_email(&email)?;
    let mut seen = HashSet::new();
    let players: Vec<FavoritePlayer> = players
        .into_iter()
        .filter(|p| seen.insert(p.id))
        .collect();
    if let Some(blank) = players.iter().find(|p| p.name.trim().is_empty()) {
        return Err(ApiError::InvalidInput(format!("player {} has no name", blank.id)));
    }
    let subscriber = state.store.update_players(&email, players).await?;
    Ok(ApiResponse::ok(subscriber))
}

/// Resolve each team against the franchise directory by abbreviation so the
/// stored id and name always match what the live feed reports. Duplicates
/// are dropped, first occurrence wins.
fn canonical_teams(teams: Vec<FavoriteTeam>) -> Result<Vec<FavoriteTeam>, ApiError> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(teams.len());
    for team in teams {
        let known = teams::find_by_abbreviation(&team.abbreviation).ok_or_else(|| {
            ApiError::InvalidInput(format!("unknown team abbreviation {:?}", team.abbreviation))
        })?;
        if seen.insert(known.id) {
            out.push(FavoriteTeam {
                id: known.id,
                abbreviation: known.abbreviation.to_string(),
                full_name: known.full_name.to_string(),
            });
        }
    }
    Ok(out)
}

//! Player search and today's box-score lines.

use super::games::SearchQuery;
use super::{parse_id, required, ApiError, ApiResponse, ApiResult, AppState};
use crate::provider::players::{self, StaticPlayer};
use crate::query::{find_player_line, PlayerLine, PlayerSelector, NO_PLAYER_STATS_MESSAGE};
use axum::extract::{Path, Query, State};

/// GET /api/players/search?search=james, ids usable with the stats routes below
pub async fn search(Query(query): Query<SearchQuery>) -> ApiResult<Vec<StaticPlayer>> {
    let search = required(&query.search, "search")?;
    Ok(ApiResponse::ok(players::find_by_full_name(search)))
}

/// GET /api/players/id/:player_id/stats
pub async fn stats_by_id(
    State(state): State<AppState>,
    Path(player_id): Path<String>,
) -> ApiResult<Option<PlayerLine>> {
    let player_id: u64 = parse_id(&player_id, "player id")?;
    lookup(&state, PlayerSelector::Id(player_id)).await
}

/// GET /api/players/name/:player_name/stats
pub async fn stats_by_name(
    State(state): State<AppState>,
    Path(player_name): Path<String>,
) -> ApiResult<Option<PlayerLine>> {
    if player_name.trim().is_empty() {
        return Err(ApiError::InvalidInput("player name must not be blank".into()));
    }
    lookup(&state, PlayerSelector::Name(&player_name)).await
}

async fn lookup(state: &AppState, selector: PlayerSelector<'_>) -> ApiResult<Option<PlayerLine>> {
    let line = state
        .upstream(find_player_line(state.live.as_ref(), selector))
        .await?;
    Ok(match line {
        Some(line) => ApiResponse::ok(Some(line)),
        None => ApiResponse {
            success: true,
            message: Some(NO_PLAYER_STATS_MESSAGE.to_string()),
            data: None,
            error: None,
        },
    })
}

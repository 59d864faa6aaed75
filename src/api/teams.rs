use super::{ApiResponse, ApiResult};
use crate::provider::teams::{self, StaticTeam};
use axum::extract::Path;

/// GET /api/teams
pub async fn list() -> ApiResult<Vec<StaticTeam>> {
    Ok(ApiResponse::ok(teams::all().to_vec()))
}

/// GET /api/teams/:team_name, partial full-name match
pub async fn by_name(Path(team_name): Path<String>) -> ApiResult<Vec<StaticTeam>> {
    Ok(ApiResponse::ok(teams::find_by_full_name(&team_name)))
}

use super::{ApiError, AppState};
use crate::clock::today_us_eastern;
use crate::newsletter::render;
use axum::extract::State;
use axum::response::Html;

/// GET /api/newsletter/preview: today's full slate as the email would look
pub async fn preview(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let games = state.upstream(state.live.scoreboard()).await?;
    Ok(Html(render(today_us_eastern(), &games)))
}

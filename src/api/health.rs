use super::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Upstream provider health, as seen by the request path
#[derive(Clone)]
pub struct HealthState {
    pub last_upstream_success: Arc<RwLock<Option<DateTime<Utc>>>>,
    pub error_count: Arc<RwLock<usize>>,
}

impl HealthState {
    pub fn new() -> Self {
        Self {
            last_upstream_success: Arc::new(RwLock::new(None)),
            error_count: Arc::new(RwLock::new(0)),
        }
    }

    pub async fn record_success(&self) {
        *self.last_upstream_success.write().await = Some(Utc::now());
        *self.error_count.write().await = 0;
    }

    pub async fn record_error(&self) {
        *self.error_count.write().await += 1;
    }
}

impl Default for HealthState {
    fn default() -> Self {
        Self::new()
    }
}

/// Health check handler
pub async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    let last_success = *state.health.last_upstream_success.read().await;
    let errors = *state.health.error_count.read().await;

    let status = if errors > 5 { "degraded" } else { "ok" };

    let http_status = if errors > 10 {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };

    (
        http_status,
        Json(json!({
            "service": "nba-digest",
            "version": env!("CARGO_PKG_VERSION"),
            "status": status,
            "last_upstream_success": last_success.map(|t| t.to_rfc3339()),
            "consecutive_upstream_errors": errors
        })),
    )
}

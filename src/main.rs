//! NBA Digest API server
//!
//! Serves games, teams and players from balldontlie and the NBA live feed,
//! manages newsletter subscribers, and previews the daily newsletter.

use anyhow::{Context, Result};
use nba_digest::api::{create_router, AppState};
use nba_digest::config::Config;
use nba_digest::provider::{self, LiveClient, StatsClient};
use nba_digest::{store, telemetry};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init()?;

    info!("NBA Digest API v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;
    let http_client = provider::http_client()?;
    let stats = Arc::new(StatsClient::new(&config.provider, http_client.clone())?);
    let live = Arc::new(LiveClient::new(&config.provider, http_client));
    let store = store::from_config(&config).await?;

    let app = create_router(AppState::new(stats, live, store));

    let addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down...");
        })
        .await
        .context("Server error")?;

    Ok(())
}

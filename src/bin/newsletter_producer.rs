//! One newsletter run: today's slate against every subscriber.
//!
//! Meant to be triggered once a day by whatever runs jobs in the deployment
//! (cron, a container job, a cloud timer).

use anyhow::{Context, Result};
use nba_digest::clock::today_us_eastern;
use nba_digest::config::{Config, DeliveryMode};
use nba_digest::newsletter::{Outbox, Producer};
use nba_digest::provider::{self, LiveClient};
use nba_digest::queue::RedisStreamQueue;
use nba_digest::{mail, store, telemetry};
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init()?;

    let config = Config::from_env()?;
    let http_client = provider::http_client()?;
    let live = Arc::new(LiveClient::new(&config.provider, http_client.clone()));
    let store = store::from_config(&config).await?;

    let outbox = match config.delivery {
        DeliveryMode::Queue => {
            let queue = RedisStreamQueue::connect(&config.queue).await?;
            queue
                .ensure_group()
                .await
                .context("Failed to prepare newsletter stream")?;
            Outbox::Queue(Arc::new(queue))
        }
        DeliveryMode::Direct => Outbox::Direct(Arc::from(mail::from_config(
            config.mail.clone(),
            http_client,
        ))),
    };

    let today = today_us_eastern();
    info!("Starting newsletter run for {}", today);

    match Producer::new(live, store, outbox).run(today).await {
        Ok(report) => {
            info!(
                "Newsletter run finished: {}",
                serde_json::to_string(&report).unwrap_or_default()
            );
            Ok(())
        }
        Err(e) => {
            error!("Newsletter run failed: {}", e);
            Err(e.into())
        }
    }
}

//! Newsletter delivery worker: reads the Redis stream and sends the emails.

use anyhow::{Context, Result};
use nba_digest::config::Config;
use nba_digest::newsletter::Consumer;
use nba_digest::provider;
use nba_digest::queue::RedisStreamQueue;
use nba_digest::{mail, telemetry};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init()?;

    let config = Config::from_env()?;
    let queue = RedisStreamQueue::connect(&config.queue).await?;
    queue
        .ensure_group()
        .await
        .context("Failed to prepare newsletter stream")?;

    let mailer = Arc::from(mail::from_config(config.mail.clone(), provider::http_client()?));
    let consumer = Consumer::new(Arc::new(queue), mailer);

    if config.run_once {
        info!("Running in one-shot mode (RUN_ONCE=true)");
        consumer.drain().await?;
        return Ok(());
    }

    // Handle shutdown gracefully (continuous mode)
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    tokio::select! {
        _ = consumer.run() => {}
        _ = ctrl_c => {
            info!("Shutting down...");
        }
    }

    Ok(())
}

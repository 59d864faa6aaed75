use super::{Delivery, NewsletterMessage, NewsletterQueue, QueueError};
use crate::config::QueueConfig;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use redis::streams::{StreamReadOptions, StreamReadReply};
use redis::AsyncCommands;
use std::time::Duration;
use tracing::{info, warn};

/// Redis Stream with a consumer group. Producers `XADD`, the mailer reads
/// with `XREADGROUP` and `XACK`s what it delivered.
#[derive(Clone)]
pub struct RedisStreamQueue {
    redis: redis::aio::ConnectionManager,
    stream: String,
    group: String,
    consumer: String,
}

impl RedisStreamQueue {
    pub async fn connect(config: &QueueConfig) -> Result<Self> {
        let redis = Self::connect_redis_with_retry(&config.redis_url, 5).await?;
        Ok(Self {
            redis,
            stream: config.stream.clone(),
            group: config.consumer_group.clone(),
            consumer: config.consumer_name.clone(),
        })
    }

    async fn connect_redis_with_retry(
        url: &str,
        max_retries: u32,
    ) -> Result<redis::aio::ConnectionManager> {
        let mut attempt = 0;
        loop {
            let result = match redis::Client::open(url) {
                Ok(client) => redis::aio::ConnectionManager::new(client).await,
                Err(e) => Err(e),
            };
            match result {
                Ok(conn) => {
                    info!("Connected to Redis");
                    return Ok(conn);
                }
                Err(e) => {
                    attempt += 1;
                    if attempt >= max_retries {
                        return Err(anyhow!(
                            "Failed to connect to Redis after {} attempts: {}",
                            max_retries,
                            e
                        ));
                    }
                    warn!("Redis connection attempt {} failed: {}. Retrying...", attempt, e);
                    tokio::time::sleep(Duration::from_secs(2u64.pow(attempt))).await;
                }
            }
        }
    }

    /// Ack an entry that can never be delivered. A failed ack leaves it in
    /// the pending list, which must not cost the rest of the batch.
    async fn discard(&self, entry_id: &str) {
        if let Err(e) = self.ack(entry_id).await {
            warn!("Failed to ack dropped stream entry {}: {}", entry_id, e);
        }
    }

    /// Create the consumer group (and the stream) if missing.
    pub async fn ensure_group(&self) -> Result<(), QueueError> {
        let mut conn = self.redis.clone();
        let created: redis::RedisResult<()> = conn
            .xgroup_create_mkstream(&self.stream, &self.group, "0")
            .await;
        match created {
            Ok(()) => {
                info!("Created consumer group {} on {}", self.group, self.stream);
                Ok(())
            }
            Err(e) if e.code() == Some("BUSYGROUP") => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl NewsletterQueue for RedisStreamQueue {
    async fn enqueue(&self, message: &NewsletterMessage) -> Result<String, QueueError> {
        let payload = serde_json::to_string(message)?;
        let mut conn = self.redis.clone();
        let entry_id: String = conn
            .xadd(
                &self.stream,
                "*",
                &[
                    ("message_id", message.id.to_string()),
                    ("email", message.email.clone()),
                    ("data", payload),
                ],
            )
            .await?;
        Ok(entry_id)
    }

    async fn receive(&self, max: usize, block: Option<Duration>) -> Result<Vec<Delivery>, QueueError> {
        let mut opts = StreamReadOptions::default()
            .group(&self.group, &self.consumer)
            .count(max);
        if let Some(block) = block {
            opts = opts.block(block.as_millis() as usize);
        }

        let mut conn = self.redis.clone();
        let reply: Option<StreamReadReply> = conn
            .xread_options(&[&self.stream], &[">"], &opts)
            .await?;

        let mut deliveries = Vec::new();
        for key in reply.map(|r| r.keys).unwrap_or_default() {
            for entry in key.ids {
                let parsed = entry
                    .get::<String>("data")
                    .map(|data| serde_json::from_str::<NewsletterMessage>(&data));
                match parsed {
                    Some(Ok(message)) => deliveries.push(Delivery {
                        entry_id: entry.id,
                        message,
                    }),
                    Some(Err(e)) => {
                        warn!("Dropping malformed stream entry {}: {}", entry.id, e);
                        self.discard(&entry.id).await;
                    }
                    None => {
                        warn!("Dropping stream entry {} without payload", entry.id);
                        self.discard(&entry.id).await;
                    }
                }
            }
        }
        Ok(deliveries)
    }

    async fn ack(&self, entry_id: &str) -> Result<(), QueueError> {
        let mut conn = self.redis.clone();
        let _: i64 = conn.xack(&self.stream, &self.group, &[entry_id]).await?;
        Ok(())
    }
}

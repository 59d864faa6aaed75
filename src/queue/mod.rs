//! Hand-off between the newsletter producer and the delivery worker.

mod memory;
mod redis_stream;

pub use memory::MemoryQueue;
pub use redis_stream::RedisStreamQueue;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),
}

/// One rendered newsletter for one recipient.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct NewsletterMessage {
    pub id: Uuid,
    pub email: String,
    pub subject: String,
    pub html_body: String,
    pub created_at: DateTime<Utc>,
}

impl NewsletterMessage {
    pub fn new(email: impl Into<String>, subject: impl Into<String>, html_body: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.into(),
            subject: subject.into(),
            html_body,
            created_at: Utc::now(),
        }
    }
}

/// A message handed to a consumer, acknowledged by `entry_id`.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub entry_id: String,
    pub message: NewsletterMessage,
}

#[async_trait]
pub trait NewsletterQueue: Send + Sync {
    /// Append a message; returns the queue's entry id.
    async fn enqueue(&self, message: &NewsletterMessage) -> Result<String, QueueError>;

    /// Up to `max` unseen messages. With `block` set, waits that long for the
    /// first one; without it, returns immediately (possibly empty).
    async fn receive(&self, max: usize, block: Option<Duration>) -> Result<Vec<Delivery>, QueueError>;

    async fn ack(&self, entry_id: &str) -> Result<(), QueueError>;
}

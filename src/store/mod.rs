//! Subscriber persistence: email → favourite teams/players.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgSubscriberStore;

use crate::config::{self, Config, StoreBackend};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

pub const DEFAULT_TIMEZONE: &str = "Asia/Seoul";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid email address {0:?}")]
    InvalidEmail(String),
    #[error("subscriber {0} not found")]
    NotFound(String),
    #[error("subscriber {0} already exists")]
    AlreadyExists(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Lower-cased, trimmed, shape-checked email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    pub fn parse(raw: &str) -> Result<Self, StoreError> {
        let email = raw.trim().to_lowercase();
        let valid = match email.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty()
                    && !domain.contains('@')
                    && domain.contains('.')
                    && !domain.starts_with('.')
                    && !domain.ends_with('.')
                    && !email.chars().any(char::is_whitespace)
            }
            None => false,
        };
        if valid {
            Ok(Self(email))
        } else {
            Err(StoreError::InvalidEmail(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FavoriteTeam {
    /// League team id, as reported by the live feed
    #[serde(default)]
    pub id: u64,
    pub abbreviation: String,
    #[serde(default)]
    pub full_name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FavoritePlayer {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Subscriber {
    pub email: String,
    pub timezone: String,
    pub teams: Vec<FavoriteTeam>,
    pub players: Vec<FavoritePlayer>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Subscriber {
    pub fn new(email: &EmailAddress, timezone: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            email: email.as_str().to_string(),
            timezone: timezone
                .filter(|tz| !tz.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_TIMEZONE.to_string()),
            teams: Vec::new(),
            players: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn team_abbreviations(&self) -> Vec<&str> {
        self.teams.iter().map(|t| t.abbreviation.as_str()).collect()
    }

    pub fn team_ids(&self) -> Vec<u64> {
        self.teams.iter().map(|t| t.id).collect()
    }
}

#[async_trait]
pub trait SubscriberStore: Send + Sync {
    async fn get(&self, email: &EmailAddress) -> Result<Option<Subscriber>, StoreError>;

    /// Create; `AlreadyExists` if the email is taken.
    async fn put(&self, subscriber: Subscriber) -> Result<(), StoreError>;

    /// Replace the favourite teams and bump `updated_at`.
    async fn update_teams(
        &self,
        email: &EmailAddress,
        teams: Vec<FavoriteTeam>,
    ) -> Result<Subscriber, StoreError>;

    async fn update_players(
        &self,
        email: &EmailAddress,
        players: Vec<FavoritePlayer>,
    ) -> Result<Subscriber, StoreError>;

    async fn delete(&self, email: &EmailAddress) -> Result<(), StoreError>;

    /// Every subscriber, oldest first.
    async fn scan(&self) -> Result<Vec<Subscriber>, StoreError>;
}

/// Store selected by `SUBSCRIBER_STORE`.
pub async fn from_config(config: &Config) -> anyhow::Result<Arc<dyn SubscriberStore>> {
    match config.store_backend {
        StoreBackend::Postgres => {
            let url = config::database_url()?;
            Ok(Arc::new(PgSubscriberStore::connect(&url).await?))
        }
        StoreBackend::Memory => {
            warn!("Using in-memory subscriber store; subscribers are lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

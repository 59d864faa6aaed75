use super::{EmailAddress, FavoritePlayer, FavoriteTeam, StoreError, Subscriber, SubscriberStore};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::PgPool;
use std::time::Duration;
use tracing::{info, warn};

#[derive(sqlx::FromRow)]
struct SubscriberRow {
    email: String,
    timezone: String,
    teams: Json<Vec<FavoriteTeam>>,
    players: Json<Vec<FavoritePlayer>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<SubscriberRow> for Subscriber {
    fn from(row: SubscriberRow) -> Self {
        Self {
            email: row.email,
            timezone: row.timezone,
            teams: row.teams.0,
            players: row.players.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const COLUMNS: &str = "email, timezone, teams, players, created_at, updated_at";

/// Subscribers table in PostgreSQL, one row per email, favourites as JSONB.
#[derive(Clone)]
pub struct PgSubscriberStore {
    db: PgPool,
}

impl PgSubscriberStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn connect(url: &str) -> Result<Self> {
        let db = Self::connect_db_with_retry(url, 5).await?;
        let store = Self::new(db);
        store.ensure_schema().await?;
        Ok(store)
    }

    async fn connect_db_with_retry(url: &str, max_retries: u32) -> Result<PgPool> {
        let mut attempt = 0;
        loop {
            match PgPoolOptions::new()
                .max_connections(10)
                .acquire_timeout(Duration::from_secs(10))
                .connect(url)
                .await
            {
                Ok(pool) => {
                    info!("Connected to PostgreSQL");
                    return Ok(pool);
                }
                Err(e) => {
                    attempt += 1;
                    if attempt >= max_retries {
                        return Err(anyhow!(
                            "Failed to connect to database after {} attempts: {}",
                            max_retries,
                            e
                        ));
                    }
                    warn!("Database connection attempt {} failed: {}. Retrying...", attempt, e);
                    tokio::time::sleep(Duration::from_secs(2u64.pow(attempt))).await;
                }
            }
        }
    }

    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS subscribers (
                email      TEXT PRIMARY KEY,
                timezone   TEXT NOT NULL,
                teams      JSONB NOT NULL DEFAULT '[]'::jsonb,
                players    JSONB NOT NULL DEFAULT '[]'::jsonb,
                created_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL
            )
            "#,
        )
        .execute(&self.db)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl SubscriberStore for PgSubscriberStore {
    async fn get(&self, email: &EmailAddress) -> Result<Option<Subscriber>, StoreError> {
        let row: Option<SubscriberRow> =
            sqlx::query_as(&format!("SELECT {COLUMNS} FROM subscribers WHERE email = $1"))
                .bind(email.as_str())
                .fetch_optional(&self.db)
                .await?;
        Ok(row.map(Subscriber::from))
    }

    async fn put(&self, subscriber: Subscriber) -> Result<(), StoreError> {
        let inserted = sqlx::query(
            r#"
            INSERT INTO subscribers (email, timezone, teams, players, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (email) DO NOTHING
            "#,
        )
        .bind(&subscriber.email)
        .bind(&subscriber.timezone)
        .bind(Json(&subscriber.teams))
        .bind(Json(&subscriber.players))
        .bind(subscriber.created_at)
        .bind(subscriber.updated_at)
        .execute(&self.db)
        .await?;

        if inserted.rows_affected() == 0 {
            return Err(StoreError::AlreadyExists(subscriber.email));
        }
        Ok(())
    }

    async fn update_teams(
        &self,
        email: &EmailAddress,
        teams: Vec<FavoriteTeam>,
    ) -> Result<Subscriber, StoreError> {
        let row: Option<SubscriberRow> = sqlx::query_as(&format!(
            "UPDATE subscribers SET teams = $2, updated_at = NOW() WHERE email = $1 RETURNING {COLUMNS}"
        ))
        .bind(email.as_str())
        .bind(Json(&teams))
        .fetch_optional(&self.db)
        .await?;
        row.map(Subscriber::from)
            .ok_or_else(|| StoreError::NotFound(email.to_string()))
    }

    async fn update_players(
        &self,
        email: &EmailAddress,
        players: Vec<FavoritePlayer>,
    ) -> Result<Subscriber, StoreError> {
        let row: Option<SubscriberRow> = sqlx::query_as(&format!(
            "UPDATE subscribers SET players = $2, updated_at = NOW() WHERE email = $1 RETURNING {COLUMNS}"
        ))
        .bind(email.as_str())
        .bind(Json(&players))
        .fetch_optional(&self.db)
        .await?;
        row.map(Subscriber::from)
            .ok_or_else(|| StoreError::NotFound(email.to_string()))
    }

    async fn delete(&self, email: &EmailAddress) -> Result<(), StoreError> {
        let deleted = sqlx::query("DELETE FROM subscribers WHERE email = $1")
            .bind(email.as_str())
            .execute(&self.db)
            .await?;
        if deleted.rows_affected() == 0 {
            return Err(StoreError::NotFound(email.to_string()));
        }
        Ok(())
    }

    async fn scan(&self) -> Result<Vec<Subscriber>, StoreError> {
        let rows: Vec<SubscriberRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM subscribers ORDER BY created_at, email"
        ))
        .fetch_all(&self.db)
        .await?;
        Ok(rows.into_iter().map(Subscriber::from).collect())
    }
}

//! Environment configuration shared by the server, producer and consumer.

use anyhow::{anyhow, Context, Result};
use std::env;
use std::path::Path;

/// Where subscribers are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

/// How the producer hands a rendered newsletter over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMode {
    /// Push to the Redis Stream for the consumer to send.
    Queue,
    /// Send from the producer itself.
    Direct,
}

#[derive(Clone)]
pub struct ProviderConfig {
    /// Only the API server needs the paid key; the newsletter binaries run without it
    pub balldontlie_api_key: Option<String>,
    pub balldontlie_base_url: String,
    pub balldontlie_requests_per_minute: u32,
    pub live_base_url: String,
}

#[derive(Clone)]
pub struct QueueConfig {
    pub redis_url: String,
    pub stream: String,
    pub consumer_group: String,
    pub consumer_name: String,
}

#[derive(Clone)]
pub struct MailConfig {
    pub api_url: String,
    pub api_token: String,
    pub from: String,
}

/// Configuration
#[derive(Clone)]
pub struct Config {
    pub provider: ProviderConfig,
    pub store_backend: StoreBackend,
    pub queue: QueueConfig,
    pub delivery: DeliveryMode,
    pub mail: Option<MailConfig>,
    pub http_port: u16,
    /// If true, the consumer drains the stream once and exits
    pub run_once: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Secrets/config:
        // - Docker Compose: read from /run/secrets/*
        // - Everything else: plain env vars (a local .env is loaded by the binaries)

        // Only the API server needs the key; absent is fine, broken is not.
        let balldontlie_api_key = optional_secret("BALLDONTLIE_API_KEY", "balldontlie_api_key")?;
        if let Some(key) = &balldontlie_api_key {
            reject_placeholder("BALLDONTLIE_API_KEY", key)?;
        }

        let provider = ProviderConfig {
            balldontlie_api_key,
            balldontlie_base_url: env::var("BALLDONTLIE_BASE_URL")
                .unwrap_or_else(|_| "https://api.balldontlie.io/v1".to_string()),
            balldontlie_requests_per_minute: env::var("BALLDONTLIE_REQUESTS_PER_MINUTE")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap_or(30),
            live_base_url: env::var("NBA_LIVE_BASE_URL")
                .unwrap_or_else(|_| "https://cdn.nba.com/static/json/liveData".to_string()),
        };

        let store_backend = match env::var("SUBSCRIBER_STORE")
            .unwrap_or_else(|_| "postgres".to_string())
            .to_lowercase()
            .as_str()
        {
            "postgres" => StoreBackend::Postgres,
            "memory" => StoreBackend::Memory,
            other => return Err(anyhow!("SUBSCRIBER_STORE must be postgres or memory, got {other}")),
        };

        let redis_url = match env::var("REDIS_URL") {
            Ok(v) if !v.trim().is_empty() => v,
            Ok(_) => return Err(anyhow!("REDIS_URL is set but empty")),
            Err(_) => "redis://127.0.0.1:6379".to_string(),
        };

        let queue = QueueConfig {
            redis_url,
            stream: env::var("NEWSLETTER_STREAM").unwrap_or_else(|_| "newsletter.outbox".to_string()),
            consumer_group: env::var("NEWSLETTER_CONSUMER_GROUP")
                .unwrap_or_else(|_| "newsletter-mailers".to_string()),
            consumer_name: env::var("NEWSLETTER_CONSUMER_NAME")
                .unwrap_or_else(|_| "mailer-1".to_string()),
        };

        let delivery = match env::var("NEWSLETTER_DELIVERY")
            .unwrap_or_else(|_| "queue".to_string())
            .to_lowercase()
            .as_str()
        {
            "queue" => DeliveryMode::Queue,
            "direct" => DeliveryMode::Direct,
            other => return Err(anyhow!("NEWSLETTER_DELIVERY must be queue or direct, got {other}")),
        };

        Ok(Self {
            provider,
            store_backend,
            queue,
            delivery,
            mail: mail_config()?,
            http_port: env::var("HTTP_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            run_once: env::var("RUN_ONCE")
                .unwrap_or_else(|_| "false".to_string())
                .to_lowercase()
                == "true",
        })
    }
}

impl ProviderConfig {
    pub fn stats_api_key(&self) -> Result<&str> {
        self.balldontlie_api_key
            .as_deref()
            .ok_or_else(|| anyhow!("BALLDONTLIE_API_KEY is not set (env var or /run/secrets/balldontlie_api_key)"))
    }
}

/// Resolved when the Postgres store is opened, so binaries that never touch
/// the store do not need database credentials.
pub fn database_url() -> Result<String> {
    match env::var("DATABASE_URL") {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        Ok(_) => Err(anyhow!("DATABASE_URL is set but empty")),
        Err(_) => {
            let db_user = env::var("DB_USER").unwrap_or_else(|_| "nba_digest".to_string());
            let db_name = env::var("DB_NAME").unwrap_or_else(|_| "nba_digest".to_string());
            let db_host = env::var("DB_HOST").unwrap_or_else(|_| "postgres".to_string());
            let db_port = env::var("DB_PORT").unwrap_or_else(|_| "5432".to_string());
            let db_password = read_secret_file("/run/secrets/db_password", "db_password")?;
            Ok(format!(
                "postgresql://{}:{}@{}:{}/{}",
                db_user, db_password, db_host, db_port, db_name
            ))
        }
    }
}

/// Mail settings are optional: without `MAIL_API_URL` the binaries fall back
/// to logging messages instead of sending them.
fn mail_config() -> Result<Option<MailConfig>> {
    let api_url = match env::var("MAIL_API_URL") {
        Ok(v) if !v.trim().is_empty() => v,
        _ => return Ok(None),
    };
    let api_token = secret("MAIL_API_TOKEN", "mail_api_token")?;
    reject_placeholder("MAIL_API_TOKEN", &api_token)?;
    let from = env::var("MAIL_FROM").context("MAIL_FROM must be set when MAIL_API_URL is")?;
    Ok(Some(MailConfig {
        api_url,
        api_token,
        from,
    }))
}

/// Env var first, then the Docker secret file of the same purpose.
fn secret(var: &str, secret_name: &str) -> Result<String> {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        Ok(_) => Err(anyhow!("{var} is set but empty")),
        Err(_) => read_secret_file(&format!("/run/secrets/{secret_name}"), secret_name),
    }
}

/// Like [`secret`], but a secret that is neither set nor mounted is `None`.
/// Set-but-empty values and unreadable or empty secret files are errors.
fn optional_secret(var: &str, secret_name: &str) -> Result<Option<String>> {
    let value = match env::var(var) {
        Ok(v) => Some(v),
        Err(env::VarError::NotPresent) => None,
        Err(e) => return Err(anyhow!("{var} is not valid: {e}")),
    };
    resolve_optional(value, var, &format!("/run/secrets/{secret_name}"), secret_name)
}

fn resolve_optional(
    value: Option<String>,
    var: &str,
    file_path: &str,
    secret_name: &str,
) -> Result<Option<String>> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(Some(v.trim().to_string())),
        Some(_) => Err(anyhow!("{var} is set but empty")),
        None if !Path::new(file_path).exists() => Ok(None),
        None => {
            let secret = read_secret_file(file_path, secret_name)?;
            if secret.is_empty() {
                return Err(anyhow!("Secret file {} ({}) is empty", file_path, secret_name));
            }
            Ok(Some(secret))
        }
    }
}

/// Prevent accidental use of sample/placeholder keys
fn reject_placeholder(var: &str, value: &str) -> Result<()> {
    if is_placeholder(value) {
        return Err(anyhow!(
            "{var} appears to be a placeholder value; replace with your real key"
        ));
    }
    Ok(())
}

fn is_placeholder(value: &str) -> bool {
    let lower = value.trim().to_lowercase();
    lower.contains("change_me") || lower.contains("your_") || lower.starts_with("sample")
}

/// Read a secret from Docker secret file
fn read_secret_file(file_path: &str, secret_name: &str) -> Result<String> {
    if !Path::new(file_path).exists() {
        return Err(anyhow!(
            "Secret {} not provided: set the env var or mount {}",
            secret_name,
            file_path
        ));
    }
    std::fs::read_to_string(file_path)
        .map(|s| s.trim().to_string())
        .context(format!("Failed to read secret file {} ({})", file_path, secret_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_keys_are_rejected() {
        assert!(is_placeholder("CHANGE_ME"));
        assert!(is_placeholder("your_api_key_here"));
        assert!(is_placeholder("sample-key"));
        assert!(!is_placeholder("1f0c9a7e-real-key"));
    }

    #[test]
    fn missing_secret_file_names_the_secret() {
        let err = read_secret_file("/nonexistent/secret", "db_password").unwrap_err();
        assert!(err.to_string().contains("db_password"));
    }

    #[test]
    fn optional_secret_absent_everywhere_is_none() {
        let key = resolve_optional(None, "BALLDONTLIE_API_KEY", "/nonexistent/secret", "balldontlie_api_key");
        assert_eq!(key.unwrap(), None);
    }

    #[test]
    fn optional_secret_set_but_empty_is_an_error() {
        let err = resolve_optional(
            Some("  ".to_string()),
            "BALLDONTLIE_API_KEY",
            "/nonexistent/secret",
            "balldontlie_api_key",
        )
        .unwrap_err();
        assert!(err.to_string().contains("set but empty"));

        let key = resolve_optional(
            Some(" abc123 ".to_string()),
            "BALLDONTLIE_API_KEY",
            "/nonexistent/secret",
            "balldontlie_api_key",
        );
        assert_eq!(key.unwrap().as_deref(), Some("abc123"));
    }

    #[test]
    fn optional_secret_from_mounted_file() {
        let dir = std::env::temp_dir().join(format!("nba-digest-secrets-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let filled = dir.join("balldontlie_api_key");
        std::fs::write(&filled, "abc123\n").unwrap();
        let key = resolve_optional(None, "BALLDONTLIE_API_KEY", filled.to_str().unwrap(), "balldontlie_api_key");
        assert_eq!(key.unwrap().as_deref(), Some("abc123"));

        let empty = dir.join("empty_key");
        std::fs::write(&empty, "\n").unwrap();
        assert!(resolve_optional(None, "BALLDONTLIE_API_KEY", empty.to_str().unwrap(), "empty_key").is_err());

        // a directory exists but cannot be read as a file
        assert!(resolve_optional(None, "BALLDONTLIE_API_KEY", dir.to_str().unwrap(), "dir_key").is_err());

        std::fs::remove_dir_all(&dir).unwrap();
    }
}

//! Outbound email.
//!
//! [`HttpMailer`] talks to a Postmark-style transactional email API
//! (`POST` JSON with a server token header). [`LogMailer`] only logs, for
//! dry runs and environments without mail credentials.

use crate::config::MailConfig;
use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

pub const TEXT_FALLBACK: &str = "Your email client does not support HTML.";

#[derive(Debug, Error)]
pub enum MailError {
    #[error("mail API request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("mail API rejected message to {to} with status {status}: {body}")]
    Rejected { to: String, status: u16, body: String },
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), MailError>;
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct OutboundEmail<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html_body: &'a str,
    text_body: &'a str,
    message_stream: &'a str,
}

pub struct HttpMailer {
    http_client: reqwest::Client,
    config: MailConfig,
}

impl HttpMailer {
    pub fn new(config: MailConfig, http_client: reqwest::Client) -> Self {
        Self {
            http_client,
            config,
        }
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), MailError> {
        let email = OutboundEmail {
            from: &self.config.from,
            to,
            subject,
            html_body,
            text_body: TEXT_FALLBACK,
            message_stream: "outbound",
        };

        let response = self
            .http_client
            .post(&self.config.api_url)
            .header("X-Postmark-Server-Token", &self.config.api_token)
            .header("Accept", "application/json")
            .json(&email)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MailError::Rejected {
                to: to.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        info!("Sent \"{}\" to {}", subject, to);
        Ok(())
    }
}

pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), MailError> {
        info!(
            "[dry-run] would send \"{}\" to {} ({} bytes of HTML)",
            subject,
            to,
            html_body.len()
        );
        Ok(())
    }
}

/// HTTP mailer when mail settings are present, log mailer otherwise.
pub fn from_config(config: Option<MailConfig>, http_client: reqwest::Client) -> Box<dyn Mailer> {
    match config {
        Some(config) => Box::new(HttpMailer::new(config, http_client)),
        None => {
            info!("MAIL_API_URL not set; newsletters will be logged instead of sent");
            Box::new(LogMailer)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outbound_payload_uses_pascal_case_fields() {
        let email = OutboundEmail {
            from: "digest@example.com",
            to: "fan@example.com",
            subject: "NBA Newsletter - 2025-01-05",
            html_body: "<p>hi</p>",
            text_body: TEXT_FALLBACK,
            message_stream: "outbound",
        };
        let json = serde_json::to_value(&email).unwrap();
        assert_eq!(json["From"], "digest@example.com");
        assert_eq!(json["To"], "fan@example.com");
        assert_eq!(json["HtmlBody"], "<p>hi</p>");
        assert_eq!(json["TextBody"], TEXT_FALLBACK);
        assert_eq!(json["MessageStream"], "outbound");
    }

    #[tokio::test]
    async fn log_mailer_always_succeeds() {
        tokio_test::assert_ok!(LogMailer.send("fan@example.com", "subject", "<p></p>").await);
    }
}

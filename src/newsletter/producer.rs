use super::{render, subject, NewsletterError};
use crate::mail::Mailer;
use crate::provider::LiveProvider;
use crate::query::games_for_abbreviations;
use crate::queue::{NewsletterMessage, NewsletterQueue};
use crate::store::SubscriberStore;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Where rendered newsletters go.
#[derive(Clone)]
pub enum Outbox {
    Queue(Arc<dyn NewsletterQueue>),
    Direct(Arc<dyn Mailer>),
}

#[derive(Debug, Serialize, Clone, PartialEq, Default)]
pub struct RunReport {
    pub date: String,
    pub games: usize,
    pub scanned: usize,
    pub matched: usize,
    pub delivered: usize,
    pub failed: usize,
    /// Repeated emails in the scan; each address gets one message per run
    pub duplicates: usize,
}

pub struct Producer {
    live: Arc<dyn LiveProvider>,
    store: Arc<dyn SubscriberStore>,
    outbox: Outbox,
}

impl Producer {
    pub fn new(live: Arc<dyn LiveProvider>, store: Arc<dyn SubscriberStore>, outbox: Outbox) -> Self {
        Self { live, store, outbox }
    }

    /// One pass over all subscribers for `date`'s slate.
    pub async fn run(&self, date: NaiveDate) -> Result<RunReport, NewsletterError> {
        let games = self.live.scoreboard().await?;
        let mut report = RunReport {
            date: date.format("%Y-%m-%d").to_string(),
            games: games.len(),
            ..Default::default()
        };

        if games.is_empty() {
            info!("No games on {}; nothing to send", report.date);
            return Ok(report);
        }

        let subscribers = self.store.scan().await?;
        report.scanned = subscribers.len();
        let subject = subject(date);
        let mut seen = HashSet::new();

        for subscriber in subscribers {
            // The stores normalise on write, but rows written outside the API
            // (imports, manual SQL) can still repeat an address.
            if !seen.insert(subscriber.email.trim().to_lowercase()) {
                warn!("Skipping duplicate subscriber entry {}", subscriber.email);
                report.duplicates += 1;
                continue;
            }

            let matched = games_for_abbreviations(&games, &subscriber.team_abbreviations());
            if matched.is_empty() {
                continue;
            }
            report.matched += 1;

            let html = render(date, &matched);
            match self.deliver(&subscriber.email, &subject, html).await {
                Ok(()) => {
                    report.delivered += 1;
                    info!("Newsletter for {} ({} games) handed off", subscriber.email, matched.len());
                }
                Err(e) => {
                    report.failed += 1;
                    error!("Newsletter for {} failed: {}", subscriber.email, e);
                }
            }
        }

        info!(
            "Newsletter run {}: {} games, {} subscribers, {} matched, {} delivered, {} failed, {} duplicates",
            report.date,
            report.games,
            report.scanned,
            report.matched,
            report.delivered,
            report.failed,
            report.duplicates
        );
        Ok(report)
    }

    async fn deliver(&self, email: &str, subject: &str, html: String) -> anyhow::Result<()> {
        match &self.outbox {
            Outbox::Queue(queue) => {
                let message = NewsletterMessage::new(email, subject, html);
                queue.enqueue(&message).await?;
            }
            Outbox::Direct(mailer) => mailer.send(email, subject, &html).await?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mail::MailError;
    use crate::provider::live::BoxScore;
    use crate::provider::{LiveGame, ProviderError};
    use crate::query::fixtures::slate;
    use crate::queue::MemoryQueue;
    use crate::store::{
        EmailAddress, FavoritePlayer, FavoriteTeam, MemoryStore, StoreError, Subscriber,
    };
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FixedSlate(Vec<LiveGame>);

    #[async_trait]
    impl LiveProvider for FixedSlate {
        async fn scoreboard(&self) -> Result<Vec<LiveGame>, ProviderError> {
            Ok(self.0.clone())
        }

        async fn boxscore(&self, _game_id: &str) -> Result<BoxScore, ProviderError> {
            Err(ProviderError::NotFound("boxscore".into()))
        }
    }

    /// Records sends; fails for addresses in `reject`.
    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<(String, String)>>,
        reject: Vec<String>,
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, to: &str, subject: &str, _html_body: &str) -> Result<(), MailError> {
            if self.reject.iter().any(|r| r == to) {
                return Err(MailError::Rejected {
                    to: to.to_string(),
                    status: 422,
                    body: "inactive recipient".into(),
                });
            }
            self.sent.lock().unwrap().push((to.to_string(), subject.to_string()));
            Ok(())
        }
    }

    fn team(abbreviation: &str) -> FavoriteTeam {
        FavoriteTeam {
            id: 0,
            abbreviation: abbreviation.to_string(),
            full_name: String::new(),
        }
    }

    async fn store_with(subscribers: &[(&str, &[&str])]) -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        for (raw, teams) in subscribers {
            let email = EmailAddress::parse(raw).unwrap();
            store.put(Subscriber::new(&email, None)).await.unwrap();
            store
                .update_teams(&email, teams.iter().map(|t| team(t)).collect())
                .await
                .unwrap();
        }
        store
    }

    /// Scan returns rows as given, repeats included.
    struct RawRows(Vec<Subscriber>);

    #[async_trait]
    impl SubscriberStore for RawRows {
        async fn get(&self, _email: &EmailAddress) -> Result<Option<Subscriber>, StoreError> {
            Ok(None)
        }

        async fn put(&self, _subscriber: Subscriber) -> Result<(), StoreError> {
            Ok(())
        }

        async fn update_teams(
            &self,
            email: &EmailAddress,
            _teams: Vec<FavoriteTeam>,
        ) -> Result<Subscriber, StoreError> {
            Err(StoreError::NotFound(email.to_string()))
        }

        async fn update_players(
            &self,
            email: &EmailAddress,
            _players: Vec<FavoritePlayer>,
        ) -> Result<Subscriber, StoreError> {
            Err(StoreError::NotFound(email.to_string()))
        }

        async fn delete(&self, email: &EmailAddress) -> Result<(), StoreError> {
            Err(StoreError::NotFound(email.to_string()))
        }

        async fn scan(&self) -> Result<Vec<Subscriber>, StoreError> {
            Ok(self.0.clone())
        }
    }

    fn row(email: &str, teams: &[&str]) -> Subscriber {
        let mut subscriber = Subscriber::new(&EmailAddress::parse("placeholder@example.com").unwrap(), None);
        subscriber.email = email.to_string();
        subscriber.teams = teams.iter().map(|t| team(t)).collect();
        subscriber
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 5).unwrap()
    }

    #[tokio::test]
    async fn enqueues_one_message_per_matched_subscriber() {
        let store = store_with(&[
            ("warriors@example.com", &["GSW"]),
            ("heat@example.com", &["MIA"]),
            ("both@example.com", &["BOS", "LAL"]),
            ("nobody@example.com", &[]),
        ])
        .await;
        let queue = Arc::new(MemoryQueue::new());
        let producer = Producer::new(
            Arc::new(FixedSlate(slate())),
            store,
            Outbox::Queue(queue.clone()),
        );

        let report = producer.run(day()).await.unwrap();
        assert_eq!(report.games, 2);
        assert_eq!(report.scanned, 4);
        assert_eq!(report.matched, 2);
        assert_eq!(report.delivered, 2);
        assert_eq!(report.failed, 0);

        let messages = queue.ready().await;
        let mut emails: Vec<_> = messages.iter().map(|m| m.email.as_str()).collect();
        emails.sort();
        assert_eq!(emails, vec!["both@example.com", "warriors@example.com"]);
        assert!(messages.iter().all(|m| m.subject == "NBA Newsletter - 2025-01-05"));

        let both = messages.iter().find(|m| m.email == "both@example.com").unwrap();
        assert_eq!(both.html_body.matches("<div class=\"game\">").count(), 2);
        let warriors = messages.iter().find(|m| m.email == "warriors@example.com").unwrap();
        assert_eq!(warriors.html_body.matches("<div class=\"game\">").count(), 1);
        assert!(!warriors.html_body.contains("Celtics"));
    }

    #[tokio::test]
    async fn no_games_means_no_scan() {
        let store = store_with(&[("warriors@example.com", &["GSW"])]).await;
        let queue = Arc::new(MemoryQueue::new());
        let producer = Producer::new(Arc::new(FixedSlate(vec![])), store, Outbox::Queue(queue.clone()));

        let report = producer.run(day()).await.unwrap();
        assert_eq!(report.scanned, 0);
        assert!(queue.ready().await.is_empty());
    }

    #[tokio::test]
    async fn direct_mode_keeps_going_after_a_failed_send() {
        let store = store_with(&[
            ("bounced@example.com", &["LAL"]),
            ("fan@example.com", &["NYK"]),
        ])
        .await;
        let mailer = Arc::new(RecordingMailer {
            reject: vec!["bounced@example.com".to_string()],
            ..Default::default()
        });
        let producer = Producer::new(Arc::new(FixedSlate(slate())), store, Outbox::Direct(mailer.clone()));

        let report = producer.run(day()).await.unwrap();
        assert_eq!(report.matched, 2);
        assert_eq!(report.delivered, 1);
        assert_eq!(report.failed, 1);
        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "fan@example.com");
    }

    #[tokio::test]
    async fn repeated_address_gets_a_single_message() {
        let store = Arc::new(RawRows(vec![
            row("fan@example.com", &["GSW"]),
            row(" Fan@Example.com", &["BOS"]),
            row("other@example.com", &["LAL"]),
        ]));
        let queue = Arc::new(MemoryQueue::new());
        let producer = Producer::new(Arc::new(FixedSlate(slate())), store, Outbox::Queue(queue.clone()));

        let report = producer.run(day()).await.unwrap();
        assert_eq!(report.scanned, 3);
        assert_eq!(report.duplicates, 1);
        assert_eq!(report.matched, 2);
        assert_eq!(report.delivered, 2);

        let messages = queue.ready().await;
        let fan: Vec<_> = messages.iter().filter(|m| m.email == "fan@example.com").collect();
        assert_eq!(fan.len(), 1);
        assert!(fan[0].html_body.contains("Warriors"));
    }
}

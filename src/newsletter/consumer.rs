use crate::mail::Mailer;
use crate::queue::{NewsletterQueue, QueueError};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchReport {
    pub received: usize,
    pub sent: usize,
    pub failed: usize,
    /// Sent, but the acknowledgement did not reach the queue
    pub unacked: usize,
}

impl BatchReport {
    fn absorb(&mut self, other: BatchReport) {
        self.received += other.received;
        self.sent += other.sent;
        self.failed += other.failed;
        self.unacked += other.unacked;
    }
}

/// Delivery worker: reads queued newsletters and emails them.
///
/// Successful sends are acknowledged. A failed send is logged and left
/// unacknowledged in the queue's pending list; nothing retries it.
pub struct Consumer {
    queue: Arc<dyn NewsletterQueue>,
    mailer: Arc<dyn Mailer>,
    batch_size: usize,
}

impl Consumer {
    pub fn new(queue: Arc<dyn NewsletterQueue>, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            queue,
            mailer,
            batch_size: 10,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub async fn process_batch(&self, block: Option<Duration>) -> Result<BatchReport, QueueError> {
        let deliveries = self.queue.receive(self.batch_size, block).await?;
        let mut report = BatchReport {
            received: deliveries.len(),
            ..Default::default()
        };

        for delivery in deliveries {
            let message = &delivery.message;
            match self
                .mailer
                .send(&message.email, &message.subject, &message.html_body)
                .await
            {
                Ok(()) => {
                    report.sent += 1;
                    if let Err(e) = self.queue.ack(&delivery.entry_id).await {
                        report.unacked += 1;
                        error!(
                            "Sent newsletter {} to {} but failed to ack entry {}: {}",
                            message.id, message.email, delivery.entry_id, e
                        );
                    }
                }
                Err(e) => {
                    report.failed += 1;
                    error!(
                        "Failed to send newsletter {} to {} (entry {}): {}",
                        message.id, message.email, delivery.entry_id, e
                    );
                }
            }
        }
        Ok(report)
    }

    /// Process everything currently queued, then return.
    pub async fn drain(&self) -> Result<BatchReport, QueueError> {
        let mut total = BatchReport::default();
        loop {
            let batch = self.process_batch(None).await?;
            if batch.received == 0 {
                break;
            }
            total.absorb(batch);
        }
        info!(
            "Drained queue: {} received, {} sent, {} failed, {} unacked",
            total.received, total.sent, total.failed, total.unacked
        );
        Ok(total)
    }

    /// Block on the queue forever. Queue errors are logged and retried after
    /// a pause so a Redis restart does not kill the worker.
    pub async fn run(&self) {
        info!("Newsletter consumer started (batch size {})", self.batch_size);
        loop {
            match self.process_batch(Some(Duration::from_secs(5))).await {
                Ok(batch) if batch.received > 0 => {
                    info!(
                        "Processed batch: {} sent, {} failed, {} unacked",
                        batch.sent, batch.failed, batch.unacked
                    );
                }
                Ok(_) => {}
                Err(e) => {
                    error!("Queue read failed: {}", e);
                    tokio::time::sleep(Duration::from_secs(5)).await;
                }
            }
        }
    }
}

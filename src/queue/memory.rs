use super::{Delivery, NewsletterMessage, NewsletterQueue, QueueError};
use async_trait::async_trait;
use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

#[derive(Default)]
struct State {
    next_id: u64,
    ready: VecDeque<Delivery>,
    pending: BTreeMap<String, NewsletterMessage>,
}

/// FIFO queue in process memory with the same delivered/acked split as the
/// Redis stream.
#[derive(Clone, Default)]
pub struct MemoryQueue {
    state: Arc<Mutex<State>>,
}

impl MemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages handed out but not acknowledged.
    pub async fn pending(&self) -> Vec<NewsletterMessage> {
        self.state.lock().await.pending.values().cloned().collect()
    }

    /// Messages not yet handed out.
    pub async fn ready(&self) -> Vec<NewsletterMessage> {
        self.state
            .lock()
            .await
            .ready
            .iter()
            .map(|d| d.message.clone())
            .collect()
    }
}

#[async_trait]
impl NewsletterQueue for MemoryQueue {
    async fn enqueue(&self, message: &NewsletterMessage) -> Result<String, QueueError> {
        let mut state = self.state.lock().await;
        state.next_id += 1;
        let entry_id = format!("{}-0", state.next_id);
        state.ready.push_back(Delivery {
            entry_id: entry_id.clone(),
            message: message.clone(),
        });
        Ok(entry_id)
    }

    async fn receive(&self, max: usize, _block: Option<Duration>) -> Result<Vec<Delivery>, QueueError> {
        let mut state = self.state.lock().await;
        let take = max.min(state.ready.len());
        let batch: Vec<Delivery> = state.ready.drain(..take).collect();
        for delivery in &batch {
            state
                .pending
                .insert(delivery.entry_id.clone(), delivery.message.clone());
        }
        Ok(batch)
    }

    async fn ack(&self, entry_id: &str) -> Result<(), QueueError> {
        self.state.lock().await.pending.remove(entry_id);
        Ok(())
    }
}

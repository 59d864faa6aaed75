//! Daily team newsletter: render, fan out per subscriber, deliver.

mod consumer;
mod producer;
pub mod render;

pub use consumer::{BatchReport, Consumer};
pub use producer::{Outbox, Producer, RunReport};
pub use render::{render, subject};

use crate::provider::ProviderError;
use crate::store::StoreError;
use thiserror::Error;

/// Errors that abort a whole producer run. Per-subscriber delivery failures
/// are counted in the report instead.
#[derive(Debug, Error)]
pub enum NewsletterError {
    #[error("could not load today's games: {0}")]
    Provider(#[from] ProviderError),
    #[error("could not scan subscribers: {0}")]
    Store(#[from] StoreError),
}

//! NBA Digest
//!
//! HTTP façade over the balldontlie stats API and the NBA live-data feeds,
//! a subscriber store, and the daily team newsletter pipeline
//! (producer enqueues to a Redis Stream, consumer delivers the email).

pub mod api;
pub mod clock;
pub mod config;
pub mod mail;
pub mod newsletter;
pub mod provider;
pub mod query;
pub mod queue;
pub mod store;
pub mod telemetry;

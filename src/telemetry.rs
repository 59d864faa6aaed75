//! Tracing setup shared by all binaries.

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

/// Initialize tracing: `RUST_LOG` wins, with `nba_digest=info` as the floor.
pub fn init() -> Result<()> {
    let filter = EnvFilter::from_default_env().add_directive(
        "nba_digest=info"
            .parse()
            .context("Invalid default log directive")?,
    );

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {e}"))
}

//! # Reserve-Chain Node
//!
//! Loads the node configuration, deploys the governance stack, logs a
//! summary and exits. There is no network surface.
//!
//! ## Startup Sequence
//!
//! 1. Initialize logging (`RUST_LOG` overrides the default filter)
//! 2. Load the devnet configuration and apply `RC_*` overrides
//! 3. Validate and deploy (genesis role wiring)
//! 4. Re-check the ledger invariants and log the summary

use anyhow::{Context, Result};
use node_runtime::{GenesisBuilder, NodeConfig};
use shared_bus::{EventFilter, InMemoryEventBus};
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Load configuration from the environment.
fn load_config() -> Result<NodeConfig> {
    let mut config = NodeConfig::devnet();
    config
        .apply_env()
        .context("Failed to apply RC_* environment overrides")?;
    config.validate().context("Invalid node configuration")?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("===========================================");
    info!("  Reserve-Chain Node Runtime v{}", env!("CARGO_PKG_VERSION"));
    info!("===========================================");

    let config = load_config()?;

    let events = Arc::new(InMemoryEventBus::new());
    let mut journal = events.subscribe(EventFilter::all());

    let runtime = GenesisBuilder::new(config)
        .with_event_bus(events)
        .build()
        .context("Genesis deployment failed")?;
    runtime
        .validate()
        .context("Ledger invariants violated after genesis")?;

    while let Some(record) = journal.try_recv() {
        debug!(
            sequence = record.sequence,
            emitter = %record.emitter,
            event = ?record.event,
            "Genesis event"
        );
    }

    runtime.log_summary();
    let summary = serde_json::to_string_pretty(&runtime.summary())
        .context("Failed to serialize runtime summary")?;
    info!("Summary:\n{summary}");

    Ok(())
}

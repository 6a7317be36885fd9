//! Ledger server binary

use anyhow::Context;
use ledger_core::{spawn_ledger_actor, Config, Ledger, OrderService, RocksStore};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Starting canteen ledger server");

    // Load configuration
    let config = match std::env::args().nth(1) {
        Some(path) => Config::from_file(&path).with_context(|| format!("loading {}", path))?,
        None => Config::from_env().context("loading config from environment")?,
    };
    tracing::info!(
        service = %config.service_name,
        version = %config.service_version,
        data_dir = %config.data_dir.display(),
        merchant_id = %config.merchant_id,
        utc_offset_minutes = config.utc_offset_minutes,
        "Configuration loaded"
    );

    // Open ledger
    let store = Arc::new(RocksStore::open(&config)?);
    let ledger = Arc::new(Ledger::new(store, config.calendar()?)?);
    let handle = spawn_ledger_actor(OrderService::new(ledger), config.mailbox_capacity);
    tracing::info!("Ledger opened successfully");

    match handle.wallet().await? {
        Some(view) => tracing::info!(wallet = %serde_json::to_string(&view)?, "Merchant wallet"),
        None => tracing::info!("Merchant wallet not created yet"),
    }

    tokio::signal::ctrl_c().await?;

    tracing::info!("Shutting down ledger server");
    handle.shutdown().await?;
    Ok(())
}

use anyhow::{Context, Result};
use dotenv::dotenv;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod api;
mod config;
mod error;
mod models;
mod solana;
mod storage;
mod trading;
mod web;

use crate::config::Config;
use crate::solana::client::SolanaClient;
use crate::web::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables first so RUST_LOG from .env is honored
    dotenv().ok();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to install tracing subscriber")?;

    // Load configuration and wrap in Arc
    let config = Arc::new(Config::load()?);
    info!("Configuration loaded successfully (risk mode: {:?})", config.risk_mode);

    let store = storage::open_store(config.database_path.as_deref());

    let ledger = Arc::new(SolanaClient::new(
        &config.solana_rpc_url,
        Duration::from_secs(config.http_timeout_secs),
    ));
    info!("Solana client initialized for {}", config.solana_rpc_url);

    let state = AppState::new(config.clone(), ledger, store.clone())?;

    web::server::start_server(state, config).await?;

    if let Err(e) = store.flush() {
        error!("Failed to flush store on shutdown: {}", e);
    }
    info!("Server stopped");

    Ok(())
}

//! HTTP API for the wallet UI.

pub mod handlers;
pub mod models;
pub mod routes;
pub mod server;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use tracing::info;

use crate::api::ai::AiAdvisor;
use crate::api::helius::{HeliusClient, HELIUS_RPC_URL};
use crate::api::jupiter::JupiterClient;
use crate::config::{Config, RiskMode};
use crate::solana::LedgerReader;
use crate::storage::Store;
use crate::trading::{OnChainPolicy, RiskPolicy, RiskScanner, SimulationPolicy};

/// Shared application state for all API handlers
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<Config>,
    pub risk_scanner: Arc<RiskScanner>,
    pub ai_advisor: Arc<AiAdvisor>,
    pub jupiter: Arc<JupiterClient>,
    pub helius: Arc<HeliusClient>,
    /// Solana ledger reads (balances, token accounts, mint authorities)
    pub ledger: Arc<dyn LedgerReader>,
    /// Persistence; a no-op store when running without a database
    pub store: Arc<dyn Store>,
}

impl AppState {
    /// Wire up every service from configuration. The ledger and store are
    /// built by the caller so they can be shared or swapped out.
    pub fn new(config: Arc<Config>, ledger: Arc<dyn LedgerReader>, store: Arc<dyn Store>) -> Result<Self> {
        // One pooled client for every outbound call, bounded timeout, no retries
        let http = Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        let policy: Arc<dyn RiskPolicy> = match config.risk_mode {
            RiskMode::Simulation => Arc::new(SimulationPolicy),
            RiskMode::OnChain => Arc::new(OnChainPolicy::new(ledger.clone())),
        };
        let risk_scanner = RiskScanner::new(policy);

        let ai_advisor = AiAdvisor::new(
            http.clone(),
            &config.ai_api_url,
            &config.ai_model,
            config.ai_api_key.clone(),
        );
        let jupiter = JupiterClient::new(http.clone(), &config.jupiter_api_url, config.jupiter_api_key.clone());
        let helius = HeliusClient::new(http, HELIUS_RPC_URL, config.helius_api_key.clone());

        info!(
            "Services ready: risk policy = {}, AI advisor = {:?}, persistent store = {}",
            risk_scanner.policy_name(),
            ai_advisor.mode(),
            store.is_persistent()
        );

        Ok(Self {
            config,
            risk_scanner: Arc::new(risk_scanner),
            ai_advisor: Arc::new(ai_advisor),
            jupiter: Arc::new(jupiter),
            helius: Arc::new(helius),
            ledger,
            store,
        })
    }
}

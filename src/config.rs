use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;

use crate::api::ai::XAI_CHAT_URL;
use crate::api::jupiter::JUPITER_BASE_URL;
use crate::error::ScentreeError;

/// Which scoring policy backs the token risk scanner.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RiskMode {
    Simulation,
    OnChain,
}

impl std::str::FromStr for RiskMode {
    type Err = ScentreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "simulation" | "sim" | "mock" => Ok(RiskMode::Simulation),
            "onchain" | "on-chain" | "live" => Ok(RiskMode::OnChain),
            other => Err(ScentreeError::ConfigError(format!(
                "unknown RISK_MODE '{}', expected 'simulation' or 'onchain'",
                other
            ))),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Config {
    pub host: String,
    pub port: u16,

    pub solana_rpc_url: String,

    pub helius_api_key: Option<String>,
    pub ai_api_key: Option<String>, // XAI_GROK_API_KEY; unset means the advisor runs degraded
    pub ai_api_url: String,
    pub ai_model: String,
    pub jupiter_api_url: String,
    pub jupiter_api_key: Option<String>,

    /// sled directory. `None` runs the service without persistence.
    pub database_path: Option<String>,

    pub risk_mode: RiskMode,
    pub default_slippage_bps: u32,
    pub http_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            solana_rpc_url: "https://api.devnet.solana.com".to_string(),
            helius_api_key: None,
            ai_api_key: None,
            ai_api_url: XAI_CHAT_URL.to_string(),
            ai_model: "grok-beta".to_string(),
            jupiter_api_url: JUPITER_BASE_URL.to_string(),
            jupiter_api_key: None,
            database_path: Some("data/scentree.db".to_string()),
            risk_mode: RiskMode::Simulation,
            default_slippage_bps: 50,
            http_timeout_secs: 15,
        }
    }
}

/// Reads an optional variable, treating empty values as unset.
fn optional_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Config {
    pub fn load() -> Result<Self> {
        let defaults = Self::default();

        let default_slippage_bps: u32 = env::var("DEFAULT_SLIPPAGE_BPS")
            .unwrap_or_else(|_| defaults.default_slippage_bps.to_string())
            .parse()
            .context("Failed to parse DEFAULT_SLIPPAGE_BPS")?;
        if default_slippage_bps > 10_000 {
            return Err(anyhow::Error::new(ScentreeError::SlippageOutOfRange(
                default_slippage_bps,
            ))
            .context("DEFAULT_SLIPPAGE_BPS is out of range"));
        }

        // An explicitly empty DATABASE_PATH opts out of persistence
        let database_path = match env::var("DATABASE_PATH") {
            Ok(path) if path.trim().is_empty() => None,
            Ok(path) => Some(path.trim().to_string()),
            Err(_) => defaults.database_path,
        };

        Ok(Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: env::var("PORT")
                .unwrap_or_else(|_| defaults.port.to_string())
                .parse()
                .context("Failed to parse PORT")?,

            solana_rpc_url: env::var("SOLANA_RPC_URL").unwrap_or(defaults.solana_rpc_url),

            helius_api_key: optional_var("HELIUS_API_KEY"),
            ai_api_key: optional_var("XAI_GROK_API_KEY"),
            ai_api_url: env::var("AI_API_URL").unwrap_or(defaults.ai_api_url),
            ai_model: env::var("AI_MODEL").unwrap_or(defaults.ai_model),
            jupiter_api_url: env::var("JUPITER_API_URL").unwrap_or(defaults.jupiter_api_url),
            jupiter_api_key: optional_var("JUPITER_API_KEY"),

            database_path,

            risk_mode: env::var("RISK_MODE")
                .unwrap_or_else(|_| "simulation".to_string())
                .parse()
                .context("Failed to parse RISK_MODE")?,
            default_slippage_bps,
            http_timeout_secs: env::var("HTTP_TIMEOUT_SECS")
                .unwrap_or_else(|_| defaults.http_timeout_secs.to_string())
                .parse()
                .context("Failed to parse HTTP_TIMEOUT_SECS")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_mode_parsing() {
        assert_eq!("simulation".parse::<RiskMode>().unwrap(), RiskMode::Simulation);
        assert_eq!("OnChain".parse::<RiskMode>().unwrap(), RiskMode::OnChain);
        assert!("helius".parse::<RiskMode>().is_err());
    }

    #[test]
    fn test_defaults_run_degraded_with_persistence() {
        let config = Config::default();
        assert!(config.ai_api_key.is_none());
        assert_eq!(config.port, 3001);
        assert_eq!(config.default_slippage_bps, 50);
        assert!(config.database_path.is_some());
    }
}

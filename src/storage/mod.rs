//! Persistence for risk assessments, AI decision logs, user profiles and trades.
//!
//! Every store operation returns a `Result` so callers choose between
//! propagating and logging-and-continuing. Request handlers treat writes as
//! best-effort: a failing store never fails a scan or an analysis.

pub mod sled_store;

use std::sync::Arc;

use tracing::{info, warn};

use crate::error::ScentreeError;
use crate::models::{AiDecision, RiskAssessment, TradeLog, UserProfile};

pub use sled_store::SledStore;

/// Maximum number of trades returned by the history endpoint.
pub const TRADE_HISTORY_LIMIT: usize = 50;

pub trait Store: Send + Sync {
    /// Inserts the assessment, or folds it into the stored one for the same mint.
    fn upsert_risk_assessment(&self, assessment: &RiskAssessment) -> Result<RiskAssessment, ScentreeError>;

    #[cfg(test)]
    fn get_risk_assessment(&self, mint_address: &str) -> Result<Option<RiskAssessment>, ScentreeError>;

    fn append_decision_log(&self, decision: &AiDecision) -> Result<(), ScentreeError>;

    #[cfg(test)]
    fn list_decisions(&self, wallet_address: &str, limit: usize) -> Result<Vec<AiDecision>, ScentreeError>;

    fn get_or_create_user_profile(
        &self,
        wallet_address: &str,
        default_slippage_bps: u32,
    ) -> Result<UserProfile, ScentreeError>;

    /// Returns `None` when the wallet has no profile yet.
    fn update_risk_profile(
        &self,
        wallet_address: &str,
        risk_score: u8,
        risk_level: Option<&str>,
    ) -> Result<Option<UserProfile>, ScentreeError>;

    fn record_trade(&self, trade: &TradeLog) -> Result<(), ScentreeError>;

    /// Most recent trades first, at most `limit`.
    fn list_recent_trades(&self, wallet_address: &str, limit: usize) -> Result<Vec<TradeLog>, ScentreeError>;

    fn flush(&self) -> Result<(), ScentreeError>;

    fn is_persistent(&self) -> bool;
}

/// Store-less mode. Reads synthesize defaults and writes are dropped.
#[derive(Debug, Default, Clone)]
pub struct NoopStore;

impl Store for NoopStore {
    fn upsert_risk_assessment(&self, assessment: &RiskAssessment) -> Result<RiskAssessment, ScentreeError> {
        Ok(assessment.clone())
    }

    #[cfg(test)]
    fn get_risk_assessment(&self, _mint_address: &str) -> Result<Option<RiskAssessment>, ScentreeError> {
        Ok(None)
    }

    fn append_decision_log(&self, _decision: &AiDecision) -> Result<(), ScentreeError> {
        Ok(())
    }

    #[cfg(test)]
    fn list_decisions(&self, _wallet_address: &str, _limit: usize) -> Result<Vec<AiDecision>, ScentreeError> {
        Ok(Vec::new())
    }

    fn get_or_create_user_profile(
        &self,
        wallet_address: &str,
        default_slippage_bps: u32,
    ) -> Result<UserProfile, ScentreeError> {
        let mut profile = UserProfile::new(wallet_address, default_slippage_bps);
        profile.id = wallet_address.to_string();
        Ok(profile)
    }

    fn update_risk_profile(
        &self,
        wallet_address: &str,
        risk_score: u8,
        risk_level: Option<&str>,
    ) -> Result<Option<UserProfile>, ScentreeError> {
        // Nothing to look up, so every wallet "exists" and the request is echoed back
        let mut profile = UserProfile::new(wallet_address, 0);
        profile.id = wallet_address.to_string();
        profile.set_risk(risk_score, risk_level);
        Ok(Some(profile))
    }

    fn record_trade(&self, _trade: &TradeLog) -> Result<(), ScentreeError> {
        Ok(())
    }

    fn list_recent_trades(&self, _wallet_address: &str, _limit: usize) -> Result<Vec<TradeLog>, ScentreeError> {
        Ok(Vec::new())
    }

    fn flush(&self) -> Result<(), ScentreeError> {
        Ok(())
    }

    fn is_persistent(&self) -> bool {
        false
    }
}

/// Opens the configured store, degrading to [`NoopStore`] when it is
/// disabled or cannot be opened.
pub fn open_store(database_path: Option<&str>) -> Arc<dyn Store> {
    match database_path {
        Some(path) => match SledStore::open(path) {
            Ok(store) => {
                info!("Opened sled store at {}", path);
                Arc::new(store)
            }
            Err(e) => {
                warn!("Could not open store at {} ({}), running without database support", path, e);
                Arc::new(NoopStore)
            }
        },
        None => {
            info!("DATABASE_PATH is empty, running without database support");
            Arc::new(NoopStore)
        }
    }
}

//! Embedded sled database backing the [`Store`] trait.
//!
//! Values are JSON. Per-wallet logs are keyed `len_be wallet nanos_be id` so a
//! prefix scan walks exactly one wallet's records in time order.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use sled::{Db, IVec, Tree};
use tracing::{debug, warn};

use super::Store;
use crate::error::ScentreeError;
use crate::models::{AiDecision, RiskAssessment, TradeLog, UserProfile};

const TOKEN_RISK_TREE: &str = "token_risk";
const DECISIONS_TREE: &str = "ai_decisions";
const USERS_TREE: &str = "users";
const TRADES_TREE: &str = "trades";

pub struct SledStore {
    db: Db,
    token_risk: Tree,
    decisions: Tree,
    users: Tree,
    trades: Tree,
}

// Length-prefixed so no wallet's prefix is a prefix of another wallet's keys
fn wallet_prefix(wallet_address: &str) -> Vec<u8> {
    let bytes = wallet_address.as_bytes();
    let mut prefix = Vec::with_capacity(bytes.len() + 4);
    prefix.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
    prefix.extend_from_slice(bytes);
    prefix
}

fn log_key(wallet_address: &str, created_at: DateTime<Utc>, id: &str) -> Vec<u8> {
    let nanos = created_at.timestamp_nanos_opt().unwrap_or_default().max(0) as u64;
    let mut key = wallet_prefix(wallet_address);
    key.extend_from_slice(&nanos.to_be_bytes());
    key.extend_from_slice(id.as_bytes());
    key
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ScentreeError> {
    Ok(serde_json::from_slice(bytes)?)
}

impl SledStore {
    pub fn open(path: &str) -> Result<Self, ScentreeError> {
        let db = sled::open(path)?;
        Self::from_db(db)
    }

    /// In-memory database removed on drop.
    #[cfg(test)]
    pub fn temporary() -> Result<Self, ScentreeError> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::from_db(db)
    }

    fn from_db(db: Db) -> Result<Self, ScentreeError> {
        Ok(Self {
            token_risk: db.open_tree(TOKEN_RISK_TREE)?,
            decisions: db.open_tree(DECISIONS_TREE)?,
            users: db.open_tree(USERS_TREE)?,
            trades: db.open_tree(TRADES_TREE)?,
            db,
        })
    }

    fn newest_first<T: DeserializeOwned>(
        tree: &Tree,
        wallet_address: &str,
        limit: usize,
    ) -> Result<Vec<T>, ScentreeError> {
        let mut items = Vec::new();
        for entry in tree.scan_prefix(wallet_prefix(wallet_address)).rev().take(limit) {
            let (key, value) = entry?;
            match decode::<T>(&value) {
                Ok(item) => items.push(item),
                Err(e) => warn!("Skipping undecodable record {:?}: {}", key, e),
            }
        }
        Ok(items)
    }
}

impl Store for SledStore {
    fn upsert_risk_assessment(&self, assessment: &RiskAssessment) -> Result<RiskAssessment, ScentreeError> {
        let fresh = serde_json::to_vec(assessment)?;

        let stored: Option<IVec> = self.token_risk.update_and_fetch(assessment.mint_address.as_bytes(), |old| {
            let merged = old
                .and_then(|bytes| decode::<RiskAssessment>(bytes).ok())
                .and_then(|previous| serde_json::to_vec(&previous.merge_rescan(assessment)).ok());
            Some(merged.unwrap_or_else(|| fresh.clone()))
        })?;

        match stored {
            Some(bytes) => decode(&bytes),
            None => Err(ScentreeError::StorageError(format!(
                "upsert for {} produced no record",
                assessment.mint_address
            ))),
        }
    }

    #[cfg(test)]
    fn get_risk_assessment(&self, mint_address: &str) -> Result<Option<RiskAssessment>, ScentreeError> {
        self.token_risk
            .get(mint_address.as_bytes())?
            .map(|bytes| decode(&bytes))
            .transpose()
    }

    fn append_decision_log(&self, decision: &AiDecision) -> Result<(), ScentreeError> {
        let key = log_key(&decision.wallet_address, decision.created_at, &decision.id);
        self.decisions.insert(key, serde_json::to_vec(decision)?)?;
        debug!("Logged AI decision {} for {}", decision.id, decision.wallet_address);
        Ok(())
    }

    #[cfg(test)]
    fn list_decisions(&self, wallet_address: &str, limit: usize) -> Result<Vec<AiDecision>, ScentreeError> {
        Self::newest_first(&self.decisions, wallet_address, limit)
    }

    fn get_or_create_user_profile(
        &self,
        wallet_address: &str,
        default_slippage_bps: u32,
    ) -> Result<UserProfile, ScentreeError> {
        let candidate = UserProfile::new(wallet_address, default_slippage_bps);
        let bytes = serde_json::to_vec(&candidate)?;

        // Concurrent first accesses race on the CAS; the loser reads the winner's profile
        match self
            .users
            .compare_and_swap(wallet_address.as_bytes(), None as Option<&[u8]>, Some(bytes))?
        {
            Ok(()) => {
                debug!("Created profile for {}", wallet_address);
                Ok(candidate)
            }
            Err(existing) => match existing.current {
                Some(current) => decode(&current),
                None => Err(ScentreeError::StorageError(format!(
                    "profile for {} vanished during creation",
                    wallet_address
                ))),
            },
        }
    }

    fn update_risk_profile(
        &self,
        wallet_address: &str,
        risk_score: u8,
        risk_level: Option<&str>,
    ) -> Result<Option<UserProfile>, ScentreeError> {
        let updated = self.users.update_and_fetch(wallet_address.as_bytes(), |old| {
            let old = old?;
            match decode::<UserProfile>(old) {
                Ok(mut profile) => {
                    profile.set_risk(risk_score, risk_level);
                    serde_json::to_vec(&profile).ok().or_else(|| Some(old.to_vec()))
                }
                // Leave corrupt records untouched rather than deleting them
                Err(_) => Some(old.to_vec()),
            }
        })?;

        updated.map(|bytes| decode(&bytes)).transpose()
    }

    fn record_trade(&self, trade: &TradeLog) -> Result<(), ScentreeError> {
        let key = log_key(&trade.wallet_address, trade.created_at, &trade.id);
        self.trades.insert(key, serde_json::to_vec(trade)?)?;
        Ok(())
    }

    fn list_recent_trades(&self, wallet_address: &str, limit: usize) -> Result<Vec<TradeLog>, ScentreeError> {
        Self::newest_first(&self.trades, wallet_address, limit)
    }

    fn flush(&self) -> Result<(), ScentreeError> {
        self.db.flush()?;
        Ok(())
    }

    fn is_persistent(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnalysisSource, IntentAnalysis, RiskLevel};
    use chrono::Duration;

    #[test]
    fn test_upsert_updates_in_place() {
        let store = SledStore::temporary().unwrap();

        let first = store
            .upsert_risk_assessment(&RiskAssessment::new("Mint111", 15, "locked".to_string()))
            .unwrap();
        assert_eq!(first.scan_count, 1);

        let second = store
            .upsert_risk_assessment(&RiskAssessment::new("Mint111", 85, "mint enabled".to_string()))
            .unwrap();
        assert_eq!(second.scan_count, 2);
        assert_eq!(second.first_checked, first.first_checked);
        assert_eq!(second.risk_level, RiskLevel::HighRisk);

        let stored = store.get_risk_assessment("Mint111").unwrap().unwrap();
        assert_eq!(stored, second);
    }

    #[test]
    fn test_profile_created_once() {
        let store = SledStore::temporary().unwrap();

        let created = store.get_or_create_user_profile("Wallet111", 50).unwrap();
        let fetched = store.get_or_create_user_profile("Wallet111", 100).unwrap();

        assert_eq!(created.id, fetched.id);
        assert_eq!(fetched.risk_profile.risk_score, 50);
        assert_eq!(fetched.settings.default_slippage_bps, 50);
    }

    #[test]
    fn test_update_unknown_wallet_returns_none() {
        let store = SledStore::temporary().unwrap();
        assert!(store.update_risk_profile("Nobody", 10, Some("Low")).unwrap().is_none());
    }

    #[test]
    fn test_update_existing_wallet() {
        let store = SledStore::temporary().unwrap();
        store.get_or_create_user_profile("Wallet111", 50).unwrap();

        let updated = store.update_risk_profile("Wallet111", 20, Some("Low")).unwrap().unwrap();
        assert_eq!(updated.risk_profile.risk_score, 20);
        assert_eq!(updated.risk_profile.risk_level, "Low");

        let fetched = store.get_or_create_user_profile("Wallet111", 50).unwrap();
        assert_eq!(fetched.risk_profile.risk_score, 20);
    }

    #[test]
    fn test_trades_newest_first_and_limited() {
        let store = SledStore::temporary().unwrap();
        let base = Utc::now();

        for i in 0..60 {
            let mut trade = TradeLog::new("Wallet111", "SOL", "USDC", &i.to_string(), "1", None);
            trade.created_at = base + Duration::seconds(i);
            store.record_trade(&trade).unwrap();
        }
        // Another wallet sharing a prefix must not leak in
        store
            .record_trade(&TradeLog::new("Wallet1111", "SOL", "USDC", "999", "1", None))
            .unwrap();

        let trades = store.list_recent_trades("Wallet111", 50).unwrap();
        assert_eq!(trades.len(), 50);
        assert_eq!(trades[0].input_amount, "59");
        assert_eq!(trades[49].input_amount, "10");
        assert!(trades.iter().all(|t| t.wallet_address == "Wallet111"));
    }

    #[test]
    fn test_embedded_nul_does_not_alias_wallet() {
        let store = SledStore::temporary().unwrap();
        store
            .record_trade(&TradeLog::new("Victim\0attacker", "SOL", "USDC", "1", "666", None))
            .unwrap();
        let analysis = IntentAnalysis {
            suggestion: "Sell everything".to_string(),
            confidence: 1.0,
            risk_rating: 99,
            reasoning: String::new(),
            source: AnalysisSource::Live,
        };
        store
            .append_decision_log(&AiDecision::record("Victim\0attacker", "x", &analysis))
            .unwrap();

        assert!(store.list_recent_trades("Victim", 50).unwrap().is_empty());
        assert!(store.list_decisions("Victim", 50).unwrap().is_empty());
        assert_eq!(store.list_recent_trades("Victim\0attacker", 50).unwrap().len(), 1);
    }

    #[test]
    fn test_decision_log_appends() {
        let store = SledStore::temporary().unwrap();
        let analysis = IntentAnalysis {
            suggestion: "Hold".to_string(),
            confidence: 0.5,
            risk_rating: 40,
            reasoning: "Flat market".to_string(),
            source: AnalysisSource::Live,
        };

        store.append_decision_log(&AiDecision::record("Wallet111", "low risk", &analysis)).unwrap();
        store.append_decision_log(&AiDecision::record("Wallet111", "yolo", &analysis)).unwrap();

        let decisions = store.list_decisions("Wallet111", 10).unwrap();
        assert_eq!(decisions.len(), 2);
        assert!(store.list_decisions("Wallet222", 10).unwrap().is_empty());
    }
}

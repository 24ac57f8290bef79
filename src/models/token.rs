use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TokenMetadata {
    pub address: String, // Token mint address
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

impl TokenMetadata {
    /// Placeholder used when no metadata service is reachable.
    pub fn unknown(mint: &str) -> Self {
        Self {
            address: mint.to_string(),
            name: mint.to_string(),
            symbol: "UNKNOWN".to_string(),
            decimals: 6,
        }
    }
}

/// One SPL token account owned by a wallet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TokenHolding {
    pub mint: String,
    pub amount: u64, // raw base units
    pub decimals: u8,
    pub ui_amount: f64,
}

/// Three ordered risk bands. Declaration order is the severity order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RiskLevel {
    Safe,
    Caution,
    #[serde(rename = "High Risk")]
    HighRisk,
}

impl RiskLevel {
    pub const CAUTION_THRESHOLD: u8 = 35;
    pub const HIGH_RISK_THRESHOLD: u8 = 70;

    /// Monotonic banding of a 0-100 rug risk score.
    pub fn from_score(score: u8) -> Self {
        if score < Self::CAUTION_THRESHOLD {
            RiskLevel::Safe
        } else if score < Self::HIGH_RISK_THRESHOLD {
            RiskLevel::Caution
        } else {
            RiskLevel::HighRisk
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Safe => write!(f, "Safe"),
            Self::Caution => write!(f, "Caution"),
            Self::HighRisk => write!(f, "High Risk"),
        }
    }
}

/// Rug risk verdict for a mint. Rescans update the record in place.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    pub mint_address: String,
    pub rug_risk_score: u8,
    pub risk_level: RiskLevel,
    pub explanation: String,
    pub last_checked: DateTime<Utc>,
    pub first_checked: DateTime<Utc>,
    pub scan_count: u32,
}

impl RiskAssessment {
    pub fn new(mint_address: &str, rug_risk_score: u8, explanation: String) -> Self {
        let score = rug_risk_score.min(100);
        let now = Utc::now();
        Self {
            mint_address: mint_address.to_string(),
            rug_risk_score: score,
            risk_level: RiskLevel::from_score(score),
            explanation,
            last_checked: now,
            first_checked: now,
            scan_count: 1,
        }
    }

    /// Folds a fresh scan into a previously stored record.
    pub fn merge_rescan(&self, fresh: &RiskAssessment) -> RiskAssessment {
        RiskAssessment {
            mint_address: self.mint_address.clone(),
            rug_risk_score: fresh.rug_risk_score,
            risk_level: fresh.risk_level,
            explanation: fresh.explanation.clone(),
            last_checked: fresh.last_checked,
            first_checked: self.first_checked,
            scan_count: self.scan_count.saturating_add(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banding_is_monotonic() {
        let mut previous = RiskLevel::Safe;
        for score in 0..=100u8 {
            let level = RiskLevel::from_score(score);
            assert!(level >= previous, "band dropped at score {}", score);
            previous = level;
        }
        assert_eq!(RiskLevel::from_score(15), RiskLevel::Safe);
        assert_eq!(RiskLevel::from_score(45), RiskLevel::Caution);
        assert_eq!(RiskLevel::from_score(85), RiskLevel::HighRisk);
    }

    #[test]
    fn test_risk_level_wire_names() {
        assert_eq!(serde_json::to_string(&RiskLevel::HighRisk).unwrap(), "\"High Risk\"");
        assert_eq!(RiskLevel::Caution.to_string(), "Caution");
    }

    #[test]
    fn test_merge_rescan_keeps_first_checked() {
        let first = RiskAssessment::new("Mint111", 15, "fine".to_string());
        let fresh = RiskAssessment::new("Mint111", 85, "mint authority enabled".to_string());
        let merged = first.merge_rescan(&fresh);

        assert_eq!(merged.first_checked, first.first_checked);
        assert_eq!(merged.rug_risk_score, 85);
        assert_eq!(merged.risk_level, RiskLevel::HighRisk);
        assert_eq!(merged.scan_count, 2);
    }
}

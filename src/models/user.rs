use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_RISK_SCORE: u8 = 50;
pub const DEFAULT_RISK_LEVEL: &str = "Medium";

/// A wallet owner's profile, keyed by wallet address.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,                // UUID string
    pub wallet_address: String,    // Solana public key (base58)
    pub risk_profile: RiskProfile,
    pub settings: UserSettings,
    pub created_at: DateTime<Utc>,
}

/// Self-declared risk appetite. `risk_level` is free text chosen by the user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RiskProfile {
    pub risk_score: u8,
    pub risk_level: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    pub default_slippage_bps: u32,
    pub auto_scan: bool, // scan output tokens before quoting
}

impl UserProfile {
    /// Creates a profile with the default "Medium" risk appetite.
    pub fn new(wallet_address: &str, default_slippage_bps: u32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            wallet_address: wallet_address.to_string(),
            risk_profile: RiskProfile {
                risk_score: DEFAULT_RISK_SCORE,
                risk_level: DEFAULT_RISK_LEVEL.to_string(),
                updated_at: now,
            },
            settings: UserSettings::new(default_slippage_bps),
            created_at: now,
        }
    }

    pub fn set_risk(&mut self, risk_score: u8, risk_level: Option<&str>) {
        self.risk_profile.risk_score = risk_score;
        self.risk_profile.risk_level = risk_level
            .filter(|l| !l.trim().is_empty())
            .unwrap_or(DEFAULT_RISK_LEVEL)
            .to_string();
        self.risk_profile.updated_at = Utc::now();
    }
}

impl UserSettings {
    pub fn new(default_slippage_bps: u32) -> Self {
        Self {
            default_slippage_bps,
            auto_scan: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_profile_defaults() {
        let profile = UserProfile::new("Wallet111", 50);
        assert_eq!(profile.wallet_address, "Wallet111");
        assert_eq!(profile.risk_profile.risk_score, 50);
        assert_eq!(profile.risk_profile.risk_level, "Medium");
        assert_eq!(profile.settings.default_slippage_bps, 50);
    }

    #[test]
    fn test_set_risk_defaults_blank_level() {
        let mut profile = UserProfile::new("Wallet111", 50);
        profile.set_risk(80, Some("  "));
        assert_eq!(profile.risk_profile.risk_score, 80);
        assert_eq!(profile.risk_profile.risk_level, "Medium");

        profile.set_risk(10, Some("Low"));
        assert_eq!(profile.risk_profile.risk_level, "Low");
    }

    #[test]
    fn test_profile_serializes_camel_case() {
        let profile = UserProfile::new("Wallet111", 50);
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["walletAddress"], "Wallet111");
        assert_eq!(json["riskProfile"]["riskScore"], 50);
        assert_eq!(json["riskProfile"]["riskLevel"], "Medium");
    }
}

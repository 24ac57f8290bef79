use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::ScentreeError;
use crate::models::RiskAssessment;
use crate::solana::LedgerReader;

/// Raw output of a scoring policy, before banding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiskFactors {
    pub score: u8, // 0-100
    pub explanation: String,
}

/// A deterministic, total scoring function over mint identifiers.
#[async_trait]
pub trait RiskPolicy: Send + Sync {
    async fn score(&self, mint: &str) -> RiskFactors;

    fn name(&self) -> &'static str;
}

/// Canned findings picked by identifier length. Stable for a given mint but
/// carries no information about the token; stands in until real data sources
/// are wired up.
#[derive(Debug, Clone, Default)]
pub struct SimulationPolicy;

impl SimulationPolicy {
    const FINDINGS: [(u8, &'static str); 3] = [
        (15, "Liquidity is locked for 6 months and minting is disabled."),
        (45, "High holder concentration detected (Top 10 hold 60%)."),
        (85, "Mint authority is still enabled and liquidity is not locked."),
    ];

    /// Picks by UTF-16 length so scores match the web client for any identifier.
    pub fn findings_for(mint: &str) -> RiskFactors {
        let (score, explanation) = Self::FINDINGS[mint.encode_utf16().count() % Self::FINDINGS.len()];
        RiskFactors {
            score,
            explanation: explanation.to_string(),
        }
    }
}

#[async_trait]
impl RiskPolicy for SimulationPolicy {
    async fn score(&self, mint: &str) -> RiskFactors {
        Self::findings_for(mint)
    }

    fn name(&self) -> &'static str {
        "simulation"
    }
}

/// Scores the mint's live authorities. Falls back to [`SimulationPolicy`]
/// when the ledger cannot answer, so every identifier still gets a band.
pub struct OnChainPolicy {
    ledger: Arc<dyn LedgerReader>,
}

impl OnChainPolicy {
    const BASE_SCORE: u32 = 15;
    const MINT_AUTHORITY_PENALTY: u32 = 30;
    const FREEZE_AUTHORITY_PENALTY: u32 = 25;

    pub fn new(ledger: Arc<dyn LedgerReader>) -> Self {
        Self { ledger }
    }
}

#[async_trait]
impl RiskPolicy for OnChainPolicy {
    async fn score(&self, mint: &str) -> RiskFactors {
        let authorities = match self.ledger.get_mint_authorities(mint).await {
            Ok(authorities) => authorities,
            Err(e) => {
                warn!("Failed to check mint/freeze authority for {}: {}. Using simulated findings.", mint, e);
                return SimulationPolicy::findings_for(mint);
            }
        };

        let mut risk_score = Self::BASE_SCORE;
        let mut details = Vec::new();

        if authorities.mint_authority {
            risk_score += Self::MINT_AUTHORITY_PENALTY;
            details.push("Mint authority is still enabled.");
        } else {
            details.push("Mint authority revoked.");
        }
        if authorities.freeze_authority {
            risk_score += Self::FREEZE_AUTHORITY_PENALTY;
            details.push("Freeze authority is still enabled.");
        } else {
            details.push("Freeze authority revoked.");
        }

        RiskFactors {
            score: risk_score.min(100) as u8,
            explanation: details.join(" "),
        }
    }

    fn name(&self) -> &'static str {
        "onchain"
    }
}

/// Turns a mint identifier into a banded [`RiskAssessment`].
#[derive(Clone)]
pub struct RiskScanner {
    policy: Arc<dyn RiskPolicy>,
}

impl RiskScanner {
    pub fn new(policy: Arc<dyn RiskPolicy>) -> Self {
        Self { policy }
    }

    #[cfg(test)]
    pub fn simulation() -> Self {
        Self::new(Arc::new(SimulationPolicy))
    }

    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    pub async fn scan_token(&self, mint: &str) -> Result<RiskAssessment, ScentreeError> {
        // Surrounding whitespace is not part of the identifier
        let mint = mint.trim();
        if mint.is_empty() {
            return Err(ScentreeError::Validation("Mint address is required.".to_string()));
        }

        debug!("Scanning {} with {} policy", mint, self.policy.name());
        let factors = self.policy.score(mint).await;
        let assessment = RiskAssessment::new(mint, factors.score, factors.explanation);

        info!(
            "Risk scan complete for {}: Score = {}/100 ({})",
            mint, assessment.rug_risk_score, assessment.risk_level
        );
        Ok(assessment)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::{RiskLevel, TokenHolding};
    use crate::solana::MintAuthorities;

    /// Ledger with fixed answers; unknown mints error.
    pub(crate) struct FakeLedger {
        pub lamports: u64,
        pub holdings: Vec<TokenHolding>,
        pub authorities: Option<MintAuthorities>,
    }

    #[async_trait]
    impl LedgerReader for FakeLedger {
        async fn get_balance(&self, _address: &str) -> Result<u64, ScentreeError> {
            Ok(self.lamports)
        }

        async fn get_token_accounts(&self, _address: &str) -> Result<Vec<TokenHolding>, ScentreeError> {
            Ok(self.holdings.clone())
        }

        async fn get_mint_authorities(&self, mint: &str) -> Result<MintAuthorities, ScentreeError> {
            self.authorities
                .ok_or_else(|| ScentreeError::SolanaError(format!("account {} not found", mint)))
        }
    }

    #[tokio::test]
    async fn test_simulation_is_deterministic() {
        let scanner = RiskScanner::simulation();
        let mint = "DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263";

        let first = scanner.scan_token(mint).await.unwrap();
        let second = scanner.scan_token(mint).await.unwrap();
        assert_eq!(first.rug_risk_score, second.rug_risk_score);
        assert_eq!(first.risk_level, second.risk_level);
        assert_eq!(first.explanation, second.explanation);
    }

    #[tokio::test]
    async fn test_simulation_covers_all_bands() {
        let scanner = RiskScanner::simulation();

        let safe = scanner.scan_token("abc").await.unwrap();
        let caution = scanner.scan_token("abcd").await.unwrap();
        let high = scanner.scan_token("abcde").await.unwrap();

        assert_eq!((safe.rug_risk_score, safe.risk_level), (15, RiskLevel::Safe));
        assert_eq!((caution.rug_risk_score, caution.risk_level), (45, RiskLevel::Caution));
        assert_eq!((high.rug_risk_score, high.risk_level), (85, RiskLevel::HighRisk));
    }

    #[test]
    fn test_findings_count_utf16_units() {
        // One astral char is two UTF-16 units, so it lands in the 85 band like "ab"
        assert_eq!(SimulationPolicy::findings_for("\u{1F600}").score, 85);
        assert_eq!(SimulationPolicy::findings_for("ab").score, 85);
    }

    #[tokio::test]
    async fn test_blank_mint_rejected() {
        let scanner = RiskScanner::simulation();
        assert!(matches!(scanner.scan_token("   ").await, Err(ScentreeError::Validation(_))));
    }

    #[tokio::test]
    async fn test_onchain_scores_authorities() {
        let ledger = Arc::new(FakeLedger {
            lamports: 0,
            holdings: vec![],
            authorities: Some(MintAuthorities {
                mint_authority: true,
                freeze_authority: true,
            }),
        });
        let scanner = RiskScanner::new(Arc::new(OnChainPolicy::new(ledger)));

        let assessment = scanner.scan_token("Mint111").await.unwrap();
        assert_eq!(assessment.rug_risk_score, 70);
        assert_eq!(assessment.risk_level, RiskLevel::HighRisk);
        assert!(assessment.explanation.contains("Mint authority is still enabled"));
        assert_eq!(scanner.policy_name(), "onchain");
    }

    #[tokio::test]
    async fn test_onchain_revoked_is_safe() {
        let ledger = Arc::new(FakeLedger {
            lamports: 0,
            holdings: vec![],
            authorities: Some(MintAuthorities {
                mint_authority: false,
                freeze_authority: false,
            }),
        });
        let policy = OnChainPolicy::new(ledger);
        let factors = policy.score("Mint111").await;
        assert_eq!(factors.score, 15);
        assert_eq!(RiskLevel::from_score(factors.score), RiskLevel::Safe);
    }

    #[tokio::test]
    async fn test_onchain_failure_falls_back() {
        let ledger = Arc::new(FakeLedger {
            lamports: 0,
            holdings: vec![],
            authorities: None,
        });
        let policy = OnChainPolicy::new(ledger);
        assert_eq!(policy.score("abcde").await, SimulationPolicy::findings_for("abcde"));
    }
}

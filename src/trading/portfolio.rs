use futures::future::join_all;
use serde::Serialize;
use tracing::debug;

use crate::api::helius::HeliusClient;
use crate::error::ScentreeError;
use crate::models::TokenHolding;
use crate::solana::client::LAMPORTS_PER_SOL;
use crate::solana::LedgerReader;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum ConcentrationLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl ConcentrationLevel {
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=24 => ConcentrationLevel::Low,
            25..=49 => ConcentrationLevel::Medium,
            50..=74 => ConcentrationLevel::High,
            _ => ConcentrationLevel::Critical,
        }
    }
}

/// Diversification risk of a wallet, independent of any single token's rug risk.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConcentrationRisk {
    pub score: u8,
    pub level: ConcentrationLevel,
    pub factors: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioHolding {
    #[serde(flatten)]
    pub holding: TokenHolding,
    pub symbol: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSnapshot {
    pub wallet_address: String,
    pub lamports: u64,
    pub sol_balance: f64,
    pub tokens: Vec<PortfolioHolding>,
    pub concentration: ConcentrationRisk,
}

/// Scores how concentrated a wallet is. `token_count` counts non-empty SPL
/// holdings only.
pub fn assess_concentration(token_count: usize, lamports: u64) -> ConcentrationRisk {
    let mut score: i32 = 50;
    let mut factors = Vec::new();

    if token_count == 0 && lamports > 0 {
        score += 10;
        factors.push("Low diversification - concentrated in SOL".to_string());
    }
    if token_count == 1 {
        score += 15;
        factors.push("Single token concentration".to_string());
    }
    if token_count > 5 {
        score -= 10;
        factors.push("Spread across more than five tokens".to_string());
    }

    let score = score.clamp(0, 100) as u8;
    ConcentrationRisk {
        score,
        level: ConcentrationLevel::from_score(score),
        factors,
    }
}

/// Reads balance and holdings from the ledger and labels each mint.
pub async fn load_portfolio(
    ledger: &dyn LedgerReader,
    helius: &HeliusClient,
    wallet_address: &str,
) -> Result<PortfolioSnapshot, ScentreeError> {
    let lamports = ledger.get_balance(wallet_address).await?;
    let holdings: Vec<TokenHolding> = ledger
        .get_token_accounts(wallet_address)
        .await?
        .into_iter()
        .filter(|h| h.amount > 0)
        .collect();
    debug!("{} holds {} lamports and {} tokens", wallet_address, lamports, holdings.len());

    let metadata = join_all(holdings.iter().map(|h| helius.get_token_metadata(&h.mint))).await;
    let tokens: Vec<PortfolioHolding> = holdings
        .into_iter()
        .zip(metadata)
        .map(|(holding, meta)| PortfolioHolding {
            holding,
            symbol: meta.symbol,
            name: meta.name,
        })
        .collect();

    Ok(PortfolioSnapshot {
        wallet_address: wallet_address.to_string(),
        lamports,
        sol_balance: lamports as f64 / LAMPORTS_PER_SOL as f64,
        concentration: assess_concentration(tokens.len(), lamports),
        tokens,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::helius::HELIUS_RPC_URL;
    use crate::trading::risk::tests::FakeLedger;
    use reqwest::Client;

    #[test]
    fn test_sol_only_wallet() {
        let risk = assess_concentration(0, 2 * LAMPORTS_PER_SOL);
        assert_eq!(risk.score, 60);
        assert_eq!(risk.level, ConcentrationLevel::High);
        assert_eq!(risk.factors.len(), 1);
    }

    #[test]
    fn test_single_token_and_diversified() {
        assert_eq!(assess_concentration(1, 0).score, 65);
        assert_eq!(assess_concentration(3, 0).score, 50);
        let diversified = assess_concentration(8, LAMPORTS_PER_SOL);
        assert_eq!(diversified.score, 40);
        assert_eq!(diversified.level, ConcentrationLevel::Medium);
    }

    #[test]
    fn test_concentration_bands() {
        assert_eq!(ConcentrationLevel::from_score(0), ConcentrationLevel::Low);
        assert_eq!(ConcentrationLevel::from_score(25), ConcentrationLevel::Medium);
        assert_eq!(ConcentrationLevel::from_score(74), ConcentrationLevel::High);
        assert_eq!(ConcentrationLevel::from_score(75), ConcentrationLevel::Critical);
    }

    #[tokio::test]
    async fn test_load_portfolio_skips_empty_accounts() {
        let ledger = FakeLedger {
            lamports: 1_500_000_000,
            holdings: vec![
                TokenHolding {
                    mint: "MintA".to_string(),
                    amount: 1_000_000,
                    decimals: 6,
                    ui_amount: 1.0,
                },
                TokenHolding {
                    mint: "MintB".to_string(),
                    amount: 0,
                    decimals: 6,
                    ui_amount: 0.0,
                },
            ],
            authorities: None,
        };
        let helius = HeliusClient::new(Client::new(), HELIUS_RPC_URL, None);

        let snapshot = load_portfolio(&ledger, &helius, "Wallet111").await.unwrap();
        assert_eq!(snapshot.tokens.len(), 1);
        assert_eq!(snapshot.tokens[0].symbol, "UNKNOWN");
        assert!((snapshot.sol_balance - 1.5).abs() < f64::EPSILON);
        assert_eq!(snapshot.concentration.score, 65);
    }
}

pub mod client;

use async_trait::async_trait;

use crate::error::ScentreeError;
use crate::models::TokenHolding;

/// On-chain authorities still set on a mint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MintAuthorities {
    pub mint_authority: bool,
    pub freeze_authority: bool,
}

/// Read-only view of the ledger. Output is trusted as returned.
#[async_trait]
pub trait LedgerReader: Send + Sync {
    async fn get_balance(&self, address: &str) -> Result<u64, ScentreeError>;

    async fn get_token_accounts(&self, address: &str) -> Result<Vec<TokenHolding>, ScentreeError>;

    async fn get_mint_authorities(&self, mint: &str) -> Result<MintAuthorities, ScentreeError>;
}

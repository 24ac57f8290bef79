use async_trait::async_trait;
use solana_account_decoder::UiAccountData;
use solana_client::{rpc_client::RpcClient, rpc_request::TokenAccountsFilter};
use solana_sdk::{commitment_config::CommitmentConfig, program_pack::Pack, pubkey::Pubkey};
use spl_token::state::Mint;
use std::{str::FromStr, sync::Arc, time::Duration};
use tracing::{debug, error};

use super::{LedgerReader, MintAuthorities};
use crate::error::ScentreeError;
use crate::models::TokenHolding;

pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

#[derive(Clone)]
pub struct SolanaClient {
    rpc_client: Arc<RpcClient>,
}

fn parse_pubkey(address: &str) -> Result<Pubkey, ScentreeError> {
    Pubkey::from_str(address.trim())
        .map_err(|_| ScentreeError::Validation(format!("Invalid Solana address: {}", address)))
}

/// Pulls a holding out of a `jsonParsed` token account.
fn parse_token_account(data: &UiAccountData) -> Option<TokenHolding> {
    let UiAccountData::Json(parsed) = data else {
        return None;
    };
    let info = parsed.parsed.get("info")?;
    let token_amount = info.get("tokenAmount")?;

    Some(TokenHolding {
        mint: info.get("mint")?.as_str()?.to_string(),
        amount: token_amount.get("amount")?.as_str()?.parse().ok()?,
        decimals: token_amount.get("decimals")?.as_u64()? as u8,
        ui_amount: token_amount
            .get("uiAmount")
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0),
    })
}

impl SolanaClient {
    pub fn new(rpc_url: &str, timeout: Duration) -> Self {
        // Reads only, so confirmed commitment is enough
        let rpc_client = RpcClient::new_with_timeout_and_commitment(
            rpc_url.to_string(),
            timeout,
            CommitmentConfig::confirmed(),
        );
        Self {
            rpc_client: Arc::new(rpc_client),
        }
    }

    // Runs a blocking RPC call on the blocking pool
    async fn run_blocking<F, T>(&self, f: F) -> Result<T, ScentreeError>
    where
        F: FnOnce(Arc<RpcClient>) -> solana_client::client_error::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let client = self.rpc_client.clone();
        tokio::task::spawn_blocking(move || f(client))
            .await
            .map_err(|e| ScentreeError::SolanaError(format!("RPC task failed: {}", e)))?
            .map_err(|e| {
                error!("Solana RPC client error: {:?}", e);
                ScentreeError::SolanaError(format!("RPC Client Error: {}", e))
            })
    }
}

#[async_trait]
impl LedgerReader for SolanaClient {
    async fn get_balance(&self, address: &str) -> Result<u64, ScentreeError> {
        let pubkey = parse_pubkey(address)?;
        let lamports = self.run_blocking(move |client| client.get_balance(&pubkey)).await?;
        debug!("Balance of {}: {} lamports", pubkey, lamports);
        Ok(lamports)
    }

    async fn get_token_accounts(&self, address: &str) -> Result<Vec<TokenHolding>, ScentreeError> {
        let owner = parse_pubkey(address)?;
        let accounts = self
            .run_blocking(move |client| {
                client.get_token_accounts_by_owner(&owner, TokenAccountsFilter::ProgramId(spl_token::id()))
            })
            .await?;

        let holdings: Vec<TokenHolding> = accounts
            .iter()
            .filter_map(|keyed| {
                let holding = parse_token_account(&keyed.account.data);
                if holding.is_none() {
                    debug!("Skipping unparsable token account {}", keyed.pubkey);
                }
                holding
            })
            .collect();

        debug!("{} token accounts for {}", holdings.len(), owner);
        Ok(holdings)
    }

    async fn get_mint_authorities(&self, mint: &str) -> Result<MintAuthorities, ScentreeError> {
        let mint_pubkey = parse_pubkey(mint)?;
        let account = self
            .run_blocking(move |client| client.get_account(&mint_pubkey))
            .await?;
        let mint_info = Mint::unpack(&account.data)
            .map_err(|e| ScentreeError::SolanaError(format!("Failed to unpack mint account: {}", e)))?;

        Ok(MintAuthorities {
            mint_authority: mint_info.mint_authority.is_some(),
            freeze_authority: mint_info.freeze_authority.is_some(),
        })
    }
}

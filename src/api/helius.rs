use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ScentreeError;
use crate::models::TokenMetadata;

pub const HELIUS_RPC_URL: &str = "https://mainnet.helius-rpc.com";

#[derive(Debug, Clone)]
pub struct HeliusClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

/// JSON-RPC request wrapper for Helius DAS API
#[derive(Debug, Serialize)]
struct JsonRpcRequest<T> {
    jsonrpc: &'static str,
    id: &'static str,
    method: &'static str,
    params: T,
}

#[derive(Debug, Serialize)]
struct GetAssetParams<'a> {
    id: &'a str,
}

#[derive(Debug, Deserialize)]
struct JsonRpcAssetResponse {
    result: Option<DasAsset>,
}

#[derive(Debug, Deserialize)]
pub struct DasAsset {
    pub content: Option<DasAssetContent>,
    pub token_info: Option<DasTokenInfo>,
}

#[derive(Debug, Deserialize)]
pub struct DasAssetContent {
    pub metadata: Option<DasMetadata>,
}

#[derive(Debug, Deserialize)]
pub struct DasMetadata {
    pub name: Option<String>,
    pub symbol: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DasTokenInfo {
    pub decimals: Option<u8>,
}

impl HeliusClient {
    pub fn new(client: Client, base_url: &str, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    /// Token symbol, name and decimals. Never fails: without a key, or on
    /// any upstream problem, the mint is labelled `UNKNOWN` with 6 decimals.
    pub async fn get_token_metadata(&self, mint: &str) -> TokenMetadata {
        let Some(api_key) = self.api_key.as_deref() else {
            return TokenMetadata::unknown(mint);
        };

        match self.fetch_asset(api_key, mint).await {
            Ok(Some(asset)) => {
                let metadata = asset.content.as_ref().and_then(|c| c.metadata.as_ref());
                TokenMetadata {
                    address: mint.to_string(),
                    name: metadata
                        .and_then(|m| m.name.clone())
                        .filter(|n| !n.is_empty())
                        .unwrap_or_else(|| mint.to_string()),
                    symbol: metadata
                        .and_then(|m| m.symbol.clone())
                        .filter(|s| !s.is_empty())
                        .unwrap_or_else(|| "UNKNOWN".to_string()),
                    decimals: asset.token_info.and_then(|t| t.decimals).unwrap_or(6),
                }
            }
            Ok(None) => {
                debug!("Helius has no asset for {}", mint);
                TokenMetadata::unknown(mint)
            }
            Err(e) => {
                warn!("Error fetching token metadata for {}: {}", mint, e);
                TokenMetadata::unknown(mint)
            }
        }
    }

    async fn fetch_asset(&self, api_key: &str, mint: &str) -> Result<Option<DasAsset>, ScentreeError> {
        let url = format!("{}/?api-key={}", self.base_url, api_key);
        let rpc_request = JsonRpcRequest {
            jsonrpc: "2.0",
            id: "1",
            method: "getAsset",
            params: GetAssetParams { id: mint },
        };

        let response = self
            .client
            .post(&url)
            .json(&rpc_request)
            .send()
            .await
            .map_err(|e| ScentreeError::ApiError(format!("Helius getAsset request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(ScentreeError::ApiError(format!(
                "Helius getAsset returned status {}",
                response.status()
            )));
        }

        let body: JsonRpcAssetResponse = response
            .json()
            .await
            .map_err(|e| ScentreeError::ApiError(format!("Failed to parse Helius getAsset response: {}", e)))?;
        Ok(body.result)
    }
}

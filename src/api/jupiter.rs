use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::error::ScentreeError;
use crate::trading::quote::{parse_amount, validate_slippage, SwapQuoteEstimate};

pub const JUPITER_BASE_URL: &str = "https://quote-api.jup.ag/v6";

#[derive(Debug, Clone)]
pub struct JupiterClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct QuoteResponse {
    #[serde(rename = "inputMint")]
    pub input_mint: String,
    #[serde(rename = "inAmount")]
    pub in_amount: String,
    #[serde(rename = "outputMint")]
    pub output_mint: String,
    #[serde(rename = "outAmount")]
    pub out_amount: String,
    #[serde(rename = "otherAmountThreshold")]
    pub other_amount_threshold: String,
    #[serde(rename = "swapMode")]
    pub swap_mode: String,
    #[serde(rename = "slippageBps")]
    pub slippage_bps: u32,
    #[serde(rename = "platformFee", default)]
    pub platform_fee: Option<PlatformFee>,
    #[serde(rename = "priceImpactPct", default)]
    pub price_impact_pct: Option<String>,
    #[serde(rename = "routePlan")]
    pub route_plan: Vec<RoutePlan>,
    #[serde(rename = "contextSlot", default)]
    pub context_slot: Option<u64>,
    #[serde(rename = "timeTaken", default)]
    pub time_taken: Option<f64>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PlatformFee {
    pub amount: String,
    #[serde(rename = "feeBps")]
    pub fee_bps: u32,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RoutePlan {
    #[serde(rename = "swapInfo")]
    pub swap_info: SwapInfo,
    pub percent: u8,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SwapInfo {
    #[serde(rename = "ammKey")]
    pub amm_key: String,
    pub label: String,
    #[serde(rename = "inputMint")]
    pub input_mint: String,
    #[serde(rename = "outputMint")]
    pub output_mint: String,
    #[serde(rename = "inAmount")]
    pub in_amount: String,
    #[serde(rename = "outAmount")]
    pub out_amount: String,
    #[serde(rename = "feeAmount")]
    pub fee_amount: String,
    #[serde(rename = "feeMint")]
    pub fee_mint: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SwapRequest {
    #[serde(rename = "quoteResponse")]
    pub quote_response: QuoteResponse,
    #[serde(rename = "userPublicKey")]
    pub user_public_key: String,
    #[serde(rename = "wrapAndUnwrapSol", default)]
    pub wrap_unwrap_sol: bool,
    #[serde(rename = "feeAccount", skip_serializing_if = "Option::is_none")]
    pub fee_account: Option<String>,
    #[serde(rename = "dynamicComputeUnitLimit", default)]
    pub dynamic_compute_unit_limit: bool,
}

/// Unsigned swap transaction, base64 encoded, for the wallet to sign.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SwapResponse {
    #[serde(rename = "swapTransaction")]
    pub swap_transaction: String,
    #[serde(rename = "lastValidBlockHeight")]
    pub last_valid_block_height: u64,
    #[serde(rename = "prioritizationFeeLamports", default)]
    pub prioritization_fee_lamports: Option<u64>,
}

impl JupiterClient {
    pub fn new(client: Client, base_url: &str, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    /// ExactIn quote for `amount` base units of `input_mint`.
    pub async fn get_quote(
        &self,
        input_mint: &str,
        output_mint: &str,
        amount: &str,
        slippage_bps: u32,
    ) -> Result<QuoteResponse, ScentreeError> {
        let amount = parse_amount(amount)?;
        validate_slippage(slippage_bps)?;
        if amount == 0 {
            return Err(ScentreeError::InvalidAmount("amount must be greater than zero".to_string()));
        }

        let url = format!("{}/quote", self.base_url);
        let params = vec![
            ("inputMint", input_mint.to_string()),
            ("outputMint", output_mint.to_string()),
            ("amount", amount.to_string()),
            ("slippageBps", slippage_bps.to_string()),
            ("swapMode", "ExactIn".to_string()),
            ("onlyDirectRoutes", "false".to_string()),
            ("asLegacyTransaction", "false".to_string()),
        ];
        debug!("Getting quote from Jupiter: {:?}", params);
        let mut request_builder = self.client.get(&url).query(&params);
        if let Some(key) = &self.api_key {
            request_builder = request_builder.header("Jupiter-API-Key", key);
        }
        let response = request_builder
            .send()
            .await
            .map_err(|e| ScentreeError::ApiError(format!("Failed to send quote request to Jupiter API: {}", e)))?;
        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            error!("Jupiter Quote API error: Status {}, Body: {}", status, error_text);
            return Err(ScentreeError::ApiError(format!(
                "Jupiter Quote API failed with status {}",
                status
            )));
        }

        let quote: QuoteResponse = response
            .json()
            .await
            .map_err(|e| ScentreeError::ApiError(format!("Failed to parse Jupiter Quote API response: {}", e)))?;
        debug!("Received Jupiter quote: {:?}", quote);

        if parse_amount(&quote.out_amount).unwrap_or(0) == 0 {
            warn!("Received quote with zero or invalid out amount: {:?}", quote);
            return Err(ScentreeError::ApiError(
                "Received invalid quote from Jupiter (zero amount)".to_string(),
            ));
        }
        Ok(quote)
    }

    /// Expected and minimum output for an upstream quote; no network access.
    /// A quote that fails validation is an upstream fault, not a bad request.
    pub fn simulate_swap(&self, quote: &QuoteResponse) -> Result<SwapQuoteEstimate, ScentreeError> {
        SwapQuoteEstimate::from_quote(quote).map_err(|e| {
            warn!("Rejecting malformed Jupiter quote: {}", e);
            ScentreeError::ApiError(format!("Received invalid quote from Jupiter: {}", e))
        })
    }

    pub async fn get_swap_transaction(
        &self,
        quote: &QuoteResponse,
        user_public_key: &str,
        fee_account: Option<String>,
    ) -> Result<SwapResponse, ScentreeError> {
        let url = format!("{}/swap", self.base_url);
        let request_body = SwapRequest {
            quote_response: quote.clone(),
            user_public_key: user_public_key.to_string(),
            wrap_unwrap_sol: true,
            fee_account,
            dynamic_compute_unit_limit: true,
        };
        debug!("Getting swap transaction from Jupiter for {}", user_public_key);
        let mut request_builder = self.client.post(&url).json(&request_body);
        if let Some(key) = &self.api_key {
            request_builder = request_builder.header("Jupiter-API-Key", key);
        }
        let response = request_builder
            .send()
            .await
            .map_err(|e| ScentreeError::ApiError(format!("Failed to send swap request to Jupiter API: {}", e)))?;
        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            error!("Jupiter Swap API error: Status {}, Body: {}", status, error_text);
            return Err(ScentreeError::ApiError(format!(
                "Jupiter Swap API failed with status {}",
                status
            )));
        }
        response
            .json()
            .await
            .map_err(|e| ScentreeError::ApiError(format!("Failed to parse Jupiter Swap API response: {}", e)))
    }
}

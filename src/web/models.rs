//! Request and Response DTOs for the Web API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::jupiter::QuoteResponse;
use crate::models::{RiskAssessment, RiskLevel};

// ============================================================================
// Health
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}

// ============================================================================
// AI intent analysis
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalyzeIntentRequest {
    pub intent: Option<String>,
    pub wallet_address: Option<String>,
    pub portfolio_data: Option<Value>,
}

// ============================================================================
// Token risk
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanTokenResponse {
    pub mint_address: String,
    pub rug_risk_score: u8,
    pub risk_level: RiskLevel,
    pub explanation: String,
    pub last_checked: DateTime<Utc>,
}

impl From<RiskAssessment> for ScanTokenResponse {
    fn from(assessment: RiskAssessment) -> Self {
        Self {
            mint_address: assessment.mint_address,
            rug_risk_score: assessment.rug_risk_score,
            risk_level: assessment.risk_level,
            explanation: assessment.explanation,
            last_checked: assessment.last_checked,
        }
    }
}

// ============================================================================
// Risk profile
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateRiskProfileRequest {
    pub risk_score: Option<f64>,
    pub risk_level: Option<String>,
}

// ============================================================================
// Trades
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecordTradeRequest {
    pub input_mint: Option<String>,
    pub output_mint: Option<String>,
    pub input_amount: Option<String>,
    pub output_amount: Option<String>,
    pub signature: Option<String>,
}

// ============================================================================
// Quotes and swaps
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteQuery {
    pub input_mint: String,
    pub output_mint: String,
    pub amount: String,
    pub slippage_bps: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapTransactionRequest {
    pub quote_response: QuoteResponse,
    pub user_public_key: String,
    #[serde(default)]
    pub fee_account: Option<String>,
}

// ============================================================================
// Generic Responses
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

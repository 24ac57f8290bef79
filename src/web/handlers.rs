//! Request handlers for all API endpoints
//!
//! Validation failures are 400s with a fixed message. Anything else is
//! logged and surfaced as a generic 500. Best-effort writes (risk cache,
//! decision log) are logged and never fail the request.

use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde_json::Value;
use tracing::{error, info, warn};

use super::models::*;
use super::AppState;
use crate::api::jupiter::SwapResponse;
use crate::error::ScentreeError;
use crate::models::{AiDecision, IntentAnalysis, TradeLog, UserProfile};
use crate::storage::TRADE_HISTORY_LIMIT;
use crate::trading::quote::parse_amount;
use crate::trading::{load_portfolio, PortfolioSnapshot, SwapQuoteEstimate};

pub type ApiError = (StatusCode, Json<ErrorResponse>);
pub type ApiResult<T> = Result<Json<T>, ApiError>;

fn api_error(status: StatusCode, message: &str) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
}

fn bad_request(message: &str) -> ApiError {
    api_error(StatusCode::BAD_REQUEST, message)
}

/// Maps a domain error to a response; `failure` is the generic 500 message.
fn map_error(e: ScentreeError, failure: &str) -> ApiError {
    match e {
        ScentreeError::Validation(_) | ScentreeError::InvalidAmount(_) | ScentreeError::SlippageOutOfRange(_) => {
            api_error(StatusCode::BAD_REQUEST, &e.to_string())
        }
        _ => {
            error!("{}: {}", failure, e);
            api_error(StatusCode::INTERNAL_SERVER_ERROR, failure)
        }
    }
}

fn required_wallet(wallet_address: &str) -> Result<&str, ApiError> {
    let wallet_address = wallet_address.trim();
    if wallet_address.is_empty() {
        return Err(bad_request("Wallet address is required."));
    }
    // Percent-decoded paths can carry NUL and other control bytes
    if wallet_address.chars().any(char::is_control) {
        return Err(bad_request("Invalid wallet address."));
    }
    Ok(wallet_address)
}

// ============================================================================
// Health Check
// ============================================================================

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
    })
}

// ============================================================================
// AI intent analysis
// ============================================================================

pub async fn analyze_intent(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeIntentRequest>, JsonRejection>,
) -> ApiResult<IntentAnalysis> {
    let Json(req) = payload.map_err(|_| bad_request("Invalid request body."))?;

    let wallet_address = required_wallet(req.wallet_address.as_deref().unwrap_or_default())?;
    let intent = req.intent.unwrap_or_default();
    let portfolio = req.portfolio_data.unwrap_or(Value::Null);

    let analysis = state.ai_advisor.analyze_intent(&intent, &portfolio).await;

    let decision = AiDecision::record(wallet_address, &intent, &analysis);
    if let Err(e) = state.store.append_decision_log(&decision) {
        warn!("AI decision logging error for {}: {}", wallet_address, e);
    }

    Ok(Json(analysis))
}

// ============================================================================
// Token risk
// ============================================================================

pub async fn scan_token(
    State(state): State<AppState>,
    Path(mint): Path<String>,
) -> ApiResult<ScanTokenResponse> {
    if mint.trim().is_empty() {
        return Err(bad_request("Mint address is required."));
    }

    let assessment = state
        .risk_scanner
        .scan_token(&mint)
        .await
        .map_err(|e| map_error(e, "Failed to scan token"))?;

    if let Err(e) = state.store.upsert_risk_assessment(&assessment) {
        warn!("Token cache error for {}: {}", assessment.mint_address, e);
    }

    Ok(Json(assessment.into()))
}

pub async fn missing_mint() -> ApiError {
    bad_request("Mint address is required.")
}

pub async fn missing_wallet() -> ApiError {
    bad_request("Wallet address is required.")
}

// ============================================================================
// Risk profile
// ============================================================================

pub async fn get_risk_profile(
    State(state): State<AppState>,
    Path(wallet_address): Path<String>,
) -> ApiResult<UserProfile> {
    let wallet_address = required_wallet(&wallet_address)?;

    state
        .store
        .get_or_create_user_profile(wallet_address, state.config.default_slippage_bps)
        .map(Json)
        .map_err(|e| map_error(e, "Failed to fetch risk profile"))
}

pub async fn update_risk_profile(
    State(state): State<AppState>,
    Path(wallet_address): Path<String>,
    payload: Result<Json<UpdateRiskProfileRequest>, JsonRejection>,
) -> ApiResult<UserProfile> {
    let wallet_address = required_wallet(&wallet_address)?;
    let Json(req) = payload.map_err(|_| bad_request("Invalid request body."))?;

    let risk_score = match req.risk_score {
        Some(score) if score.fract() == 0.0 && (0.0..=100.0).contains(&score) => score as u8,
        Some(_) => return Err(bad_request("Risk score must be an integer between 0 and 100.")),
        None => return Err(bad_request("Wallet address and risk score are required.")),
    };

    match state
        .store
        .update_risk_profile(wallet_address, risk_score, req.risk_level.as_deref())
    {
        Ok(Some(profile)) => {
            info!("Updated risk profile for {}: {}", wallet_address, risk_score);
            Ok(Json(profile))
        }
        Ok(None) => Err(api_error(StatusCode::NOT_FOUND, "User not found")),
        Err(e) => Err(map_error(e, "Failed to update risk profile")),
    }
}

// ============================================================================
// Trades
// ============================================================================

pub async fn get_trade_history(
    State(state): State<AppState>,
    Path(wallet_address): Path<String>,
) -> ApiResult<Vec<TradeLog>> {
    let wallet_address = required_wallet(&wallet_address)?;

    state
        .store
        .list_recent_trades(wallet_address, TRADE_HISTORY_LIMIT)
        .map(Json)
        .map_err(|e| map_error(e, "Failed to fetch trade history"))
}

pub async fn record_trade(
    State(state): State<AppState>,
    Path(wallet_address): Path<String>,
    payload: Result<Json<RecordTradeRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TradeLog>), ApiError> {
    let wallet_address = required_wallet(&wallet_address)?;
    let Json(req) = payload.map_err(|_| bad_request("Invalid request body."))?;

    let (Some(input_mint), Some(output_mint), Some(input_amount), Some(output_amount)) =
        (req.input_mint, req.output_mint, req.input_amount, req.output_amount)
    else {
        return Err(bad_request("Mints and amounts are required."));
    };
    for amount in [&input_amount, &output_amount] {
        parse_amount(amount).map_err(|e| map_error(e, "Failed to record trade"))?;
    }

    let trade = TradeLog::new(
        wallet_address,
        input_mint.trim(),
        output_mint.trim(),
        input_amount.trim(),
        output_amount.trim(),
        req.signature.filter(|s| !s.trim().is_empty()),
    );
    state
        .store
        .record_trade(&trade)
        .map_err(|e| map_error(e, "Failed to record trade"))?;

    Ok((StatusCode::CREATED, Json(trade)))
}

// ============================================================================
// Quotes and swaps
// ============================================================================

pub async fn get_quote(
    State(state): State<AppState>,
    query: Result<Query<QuoteQuery>, QueryRejection>,
) -> ApiResult<SwapQuoteEstimate> {
    let Query(query) =
        query.map_err(|_| bad_request("inputMint, outputMint and amount are required."))?;
    let slippage_bps = query.slippage_bps.unwrap_or(state.config.default_slippage_bps);

    let quote = state
        .jupiter
        .get_quote(&query.input_mint, &query.output_mint, &query.amount, slippage_bps)
        .await
        .map_err(|e| map_error(e, "Failed to fetch quote"))?;

    state
        .jupiter
        .simulate_swap(&quote)
        .map(Json)
        .map_err(|e| map_error(e, "Failed to simulate swap"))
}

pub async fn build_swap_transaction(
    State(state): State<AppState>,
    payload: Result<Json<SwapTransactionRequest>, JsonRejection>,
) -> ApiResult<SwapResponse> {
    let Json(req) = payload.map_err(|_| bad_request("Quote and user public key are required."))?;
    let user_public_key = required_wallet(&req.user_public_key)?;

    state
        .jupiter
        .get_swap_transaction(&req.quote_response, user_public_key, req.fee_account)
        .await
        .map(Json)
        .map_err(|e| map_error(e, "Failed to build swap transaction"))
}

// ============================================================================
// Portfolio
// ============================================================================

pub async fn get_portfolio(
    State(state): State<AppState>,
    Path(wallet_address): Path<String>,
) -> ApiResult<PortfolioSnapshot> {
    let wallet_address = required_wallet(&wallet_address)?;

    load_portfolio(state.ledger.as_ref(), &state.helius, wallet_address)
        .await
        .map(Json)
        .map_err(|e| map_error(e, "Failed to fetch portfolio"))
}

//! API route definitions

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;
use super::AppState;

/// Create all API routes
pub fn create_routes(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        .route("/api/health", get(handlers::health_check))

        // AI intent analysis
        .route("/api/analyze-intent", post(handlers::analyze_intent))

        // Token risk
        .route("/api/scan-token/:mint", get(handlers::scan_token))
        .route("/api/scan-token", get(handlers::missing_mint))
        .route("/api/scan-token/", get(handlers::missing_mint))

        // Risk profile
        .route(
            "/api/risk-profile/:wallet_address",
            get(handlers::get_risk_profile).put(handlers::update_risk_profile),
        )
        .route("/api/risk-profile", get(handlers::missing_wallet).put(handlers::missing_wallet))
        .route("/api/risk-profile/", get(handlers::missing_wallet).put(handlers::missing_wallet))

        // Trades
        .route(
            "/api/trade-history/:wallet_address",
            get(handlers::get_trade_history).post(handlers::record_trade),
        )
        .route("/api/trade-history", get(handlers::missing_wallet))
        .route("/api/trade-history/", get(handlers::missing_wallet))

        // Quotes and swaps
        .route("/api/quote", get(handlers::get_quote))
        .route("/api/swap-transaction", post(handlers::build_swap_transaction))

        // Portfolio
        .route("/api/portfolio/:wallet_address", get(handlers::get_portfolio))

        // Add state to all routes
        .with_state(state)
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where an intent analysis came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisSource {
    Live,
    Fallback,
}

/// Suggestion/confidence/risk triple returned to the wallet UI.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IntentAnalysis {
    pub suggestion: String,
    pub confidence: f64, // 0.0 - 1.0
    pub risk_rating: u8, // 0 - 100
    pub reasoning: String,
    pub source: AnalysisSource,
}

/// Append-only audit record of an analysis served to a wallet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AiDecision {
    pub id: String,
    pub wallet_address: String,
    pub intent: String,
    pub suggestion: String,
    pub confidence: f64,
    pub reasoning: String,
    pub risk_rating: u8,
    pub source: AnalysisSource,
    pub created_at: DateTime<Utc>,
}

impl AiDecision {
    pub fn record(wallet_address: &str, intent: &str, analysis: &IntentAnalysis) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            wallet_address: wallet_address.to_string(),
            intent: intent.to_string(),
            suggestion: analysis.suggestion.clone(),
            confidence: analysis.confidence,
            reasoning: analysis.reasoning.clone(),
            risk_rating: analysis.risk_rating,
            source: analysis.source,
            created_at: Utc::now(),
        }
    }
}

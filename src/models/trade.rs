use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A swap executed by a wallet, as reported back by the client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TradeLog {
    pub id: String,
    pub wallet_address: String,
    pub input_mint: String,
    pub output_mint: String,
    pub input_amount: String,  // base units, string to avoid precision loss
    pub output_amount: String, // base units
    pub signature: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TradeLog {
    pub fn new(
        wallet_address: &str,
        input_mint: &str,
        output_mint: &str,
        input_amount: &str,
        output_amount: &str,
        signature: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            wallet_address: wallet_address.to_string(),
            input_mint: input_mint.to_string(),
            output_mint: output_mint.to_string(),
            input_amount: input_amount.to_string(),
            output_amount: output_amount.to_string(),
            signature,
            created_at: Utc::now(),
        }
    }
}

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScentreeError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Slippage out of range: {0} bps (allowed 0-10000)")]
    SlippageOutOfRange(u32),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Solana error: {0}")]
    SolanaError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<sled::Error> for ScentreeError {
    fn from(e: sled::Error) -> Self {
        ScentreeError::StorageError(e.to_string())
    }
}

impl From<serde_json::Error> for ScentreeError {
    fn from(e: serde_json::Error) -> Self {
        ScentreeError::StorageError(format!("serialization failed: {}", e))
    }
}

pub mod decision;
pub mod token;
pub mod trade;
pub mod user;

// Re-export commonly used types
pub use decision::{AiDecision, AnalysisSource, IntentAnalysis};
pub use token::{RiskAssessment, RiskLevel, TokenHolding, TokenMetadata};
pub use trade::TradeLog;
pub use user::UserProfile;

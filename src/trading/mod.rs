pub mod portfolio;
pub mod quote;
pub mod risk;

pub use portfolio::{load_portfolio, PortfolioSnapshot};
pub use quote::SwapQuoteEstimate;
pub use risk::{OnChainPolicy, RiskPolicy, RiskScanner, SimulationPolicy};

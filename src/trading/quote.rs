//! Swap quote simulation.
//!
//! Token amounts are base units carried as decimal strings and are only ever
//! handled as integers; a token with 9 decimals overflows an f64's exact
//! integer range after ~9 million whole tokens.

use serde::Serialize;

use crate::api::jupiter::QuoteResponse;
use crate::error::ScentreeError;

pub const MAX_SLIPPAGE_BPS: u32 = 10_000;

/// Price impact above which the UI should warn before confirming.
pub const HIGH_PRICE_IMPACT_PCT: f64 = 5.0;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SwapQuoteEstimate {
    pub input_mint: String,
    pub output_mint: String,
    pub input_amount: String,
    pub output_amount: String,
    pub slippage_bps: u32,
    pub min_output: String,
    pub price_impact_pct: f64,
    pub route_hops: usize,
    pub route_labels: Vec<String>,
    pub high_price_impact: bool,
}

/// Parses a non-negative integer amount in base units.
pub fn parse_amount(amount: &str) -> Result<u128, ScentreeError> {
    let trimmed = amount.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ScentreeError::InvalidAmount(format!(
            "'{}' is not a non-negative integer",
            amount
        )));
    }
    trimmed
        .parse::<u128>()
        .map_err(|_| ScentreeError::InvalidAmount(format!("'{}' is too large", amount)))
}

pub fn validate_slippage(slippage_bps: u32) -> Result<u32, ScentreeError> {
    if slippage_bps > MAX_SLIPPAGE_BPS {
        return Err(ScentreeError::SlippageOutOfRange(slippage_bps));
    }
    Ok(slippage_bps)
}

/// `floor(output * (10000 - slippage_bps) / 10000)` without overflow.
pub fn min_output_units(output_amount: u128, slippage_bps: u32) -> Result<u128, ScentreeError> {
    let keep = u128::from(MAX_SLIPPAGE_BPS - validate_slippage(slippage_bps)?);
    let scale = u128::from(MAX_SLIPPAGE_BPS);

    // output = q * scale + r, so the product never exceeds output itself
    let q = output_amount / scale;
    let r = output_amount % scale;
    Ok(q * keep + r * keep / scale)
}

/// String-in, string-out form of [`min_output_units`].
pub fn min_output(output_amount: &str, slippage_bps: u32) -> Result<String, ScentreeError> {
    validate_slippage(slippage_bps)?;
    let amount = parse_amount(output_amount)?;
    Ok(min_output_units(amount, slippage_bps)?.to_string())
}

impl SwapQuoteEstimate {
    pub fn from_quote(quote: &QuoteResponse) -> Result<Self, ScentreeError> {
        parse_amount(&quote.in_amount)?;
        let min_output = min_output(&quote.out_amount, quote.slippage_bps)?;

        // Impact comes from upstream as a string; unparsable means "unknown", shown as 0
        let price_impact_pct = quote
            .price_impact_pct
            .as_deref()
            .and_then(|p| p.trim().parse::<f64>().ok())
            .filter(|p| p.is_finite())
            .unwrap_or(0.0);

        Ok(Self {
            input_mint: quote.input_mint.clone(),
            output_mint: quote.output_mint.clone(),
            input_amount: quote.in_amount.trim().to_string(),
            output_amount: quote.out_amount.trim().to_string(),
            slippage_bps: quote.slippage_bps,
            min_output,
            price_impact_pct,
            route_hops: quote.route_plan.len(),
            route_labels: quote
                .route_plan
                .iter()
                .map(|hop| hop.swap_info.label.clone())
                .collect(),
            high_price_impact: price_impact_pct.abs() > HIGH_PRICE_IMPACT_PCT,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn test_zero_slippage_keeps_full_output() {
        assert_eq!(min_output("123456789", 0).unwrap(), "123456789");
        assert_eq!(min_output("0", 0).unwrap(), "0");
    }

    #[test]
    fn test_min_output_floors() {
        // 999 * 9950 / 10000 = 994.005
        assert_eq!(min_output("999", 50).unwrap(), "994");
        assert_eq!(min_output("1000000", 100).unwrap(), "990000");
        assert_eq!(min_output("1000000", 10_000).unwrap(), "0");
    }

    #[test]
    fn test_min_output_never_exceeds_output() {
        let amounts = ["0", "1", "9999", "10000", "10001", "18446744073709551615", "340282366920938463463374607431768211455"];
        for amount in amounts {
            let output = parse_amount(amount).unwrap();
            for bps in [0u32, 1, 50, 333, 5000, 9999, 10_000] {
                let min = min_output_units(output, bps).unwrap();
                assert!(min <= output, "{} bps on {}", bps, amount);
            }
        }
    }

    #[test]
    fn test_beyond_f64_precision() {
        // 2^64 - 1 loses its low digits as an f64
        assert_eq!(min_output("18446744073709551615", 50).unwrap(), "18354510353341003856");
        let max = u128::MAX.to_string();
        assert_ok!(min_output(&max, 1));
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(matches!(min_output("100", 10_001), Err(ScentreeError::SlippageOutOfRange(10_001))));
        assert!(matches!(min_output("-5", 50), Err(ScentreeError::InvalidAmount(_))));
        assert_err!(min_output("1.5", 50));
        assert_err!(min_output("", 50));
        assert_err!(min_output("abc", 50));
        assert_err!(min_output("+5", 50));
        assert_err!(min_output("340282366920938463463374607431768211456", 50));
    }
}

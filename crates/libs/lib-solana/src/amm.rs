//! # Constant-Product Quote
//!
//! Off-chain quote for an `x * y = k` pool whose token carries a transfer
//! hook. Both the pool fee and the hook fee are given in basis points and are
//! taken from the input amount before it enters the curve.

use lib_core::{AppError, Result};
use serde::Serialize;

/// Slippage tolerance reported with every quote, in percent.
pub const DEFAULT_SLIPPAGE_PCT: f64 = 0.5;

/// Default transfer hook fee in basis points.
pub const DEFAULT_HOOK_FEE_BPS: f64 = 0.1;

/// Swap quote for a constant-product pool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwapQuote {
    pub amount_in: f64,
    pub amount_out: f64,
    /// Pool fee charged on the input, in input units
    pub fee: f64,
    /// Transfer hook fee charged on the input, in input units
    pub hook_fee: f64,
    /// `amount_in / reserve_in` as a percentage
    pub price_impact: f64,
    /// Slippage tolerance in percent
    pub slippage: f64,
}

/// Quote `amount_in` against reserves `reserve_in`/`reserve_out`.
pub fn constant_product_quote(
    amount_in: f64,
    reserve_in: f64,
    reserve_out: f64,
    fee_rate_bps: f64,
    hook_fee_bps: f64,
) -> Result<SwapQuote> {
    if !(amount_in > 0.0 && amount_in.is_finite()) {
        return Err(AppError::InvalidInput("Swap amount must be positive".to_string()));
    }
    if !(reserve_in > 0.0 && reserve_out > 0.0 && reserve_in.is_finite() && reserve_out.is_finite()) {
        return Err(AppError::InvalidInput("Pool reserves must be positive and finite".to_string()));
    }
    // Written so NaN fails every comparison and is rejected.
    if !(fee_rate_bps >= 0.0 && hook_fee_bps >= 0.0 && fee_rate_bps + hook_fee_bps < 10_000.0) {
        return Err(AppError::InvalidInput("Fees must be between 0 and 10000 bps".to_string()));
    }

    let fee_rate = fee_rate_bps / 10_000.0;
    let hook_rate = hook_fee_bps / 10_000.0;

    let amount_in_with_fee = amount_in * (1.0 - fee_rate - hook_rate);
    let amount_out = (amount_in_with_fee * reserve_out) / (reserve_in + amount_in_with_fee);

    Ok(SwapQuote {
        amount_in,
        amount_out,
        fee: amount_in * fee_rate,
        hook_fee: amount_in * hook_rate,
        price_impact: (amount_in / reserve_in) * 100.0,
        slippage: DEFAULT_SLIPPAGE_PCT,
    })
}

//! Collateralization ratio calculator

use crate::error::{EngineError, EngineResult};
use crate::math::{product_ratio, Rounding, PERCENT};
use crate::oracle::Prices;

/// Ratio reported for a vault without debt
pub const UNBOUNDED_RATIO: u128 = u128::MAX;

/// Collateral value over debt value, in whole percent (truncated).
///
/// `(collateral * collateral_price * 100) / (debt * token_price)`; a vault
/// with zero debt is always safe and reports [`UNBOUNDED_RATIO`].
pub fn collateralization_percentage(
    collateral: u128,
    debt: u128,
    prices: &Prices,
) -> EngineResult<u128> {
    if debt == 0 {
        return Ok(UNBOUNDED_RATIO);
    }
    if prices.token == 0 {
        return Err(EngineError::InvalidPrice("token price is zero"));
    }
    // A quotient past u128 is as unbounded as zero debt.
    Ok(product_ratio(
        &[collateral, prices.collateral, PERCENT],
        &[debt, prices.token],
        Rounding::Down,
    )
    .unwrap_or(UNBOUNDED_RATIO))
}

/// Whether a ratio meets the minimum
pub fn is_safe(ratio: u128, min_percentage: u128) -> bool {
    ratio >= min_percentage
}

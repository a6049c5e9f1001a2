//! Checked fixed-point helpers - no unwrap, no panics, overflow is an error
//!
//! Intermediate products are carried in 256 bits so that only final
//! results have to fit in a u128.

use crate::error::{EngineError, EngineResult};
use uint::construct_uint;

construct_uint! {
    /// 256-bit unsigned integer for intermediate products
    pub struct U256(4);
}

/// Basis points scale (10,000 bps = 100%)
pub const BPS_SCALE: u128 = 10_000;

/// Percent scale used by collateralization ratios
pub const PERCENT: u128 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rounding {
    Down,
    Up,
}

/// Add u128, failing on overflow
pub fn add_u128(a: u128, b: u128) -> EngineResult<u128> {
    a.checked_add(b).ok_or(EngineError::ArithmeticOverflow)
}

/// Subtract u128, failing on underflow
pub fn sub_u128(a: u128, b: u128) -> EngineResult<u128> {
    a.checked_sub(b).ok_or(EngineError::ArithmeticOverflow)
}

/// Multiply u128, failing on overflow
pub fn mul_u128(a: u128, b: u128) -> EngineResult<u128> {
    a.checked_mul(b).ok_or(EngineError::ArithmeticOverflow)
}

/// Π num / Π den with the requested rounding.
///
/// Fails if the denominator is zero, an intermediate product leaves 256
/// bits, or the quotient does not fit in a u128.
pub fn product_ratio(num: &[u128], den: &[u128], rounding: Rounding) -> EngineResult<u128> {
    let n = wide_product(num)?;
    let d = wide_product(den)?;
    if d.is_zero() {
        return Err(EngineError::ArithmeticOverflow);
    }
    let (q, r) = n.div_mod(d);
    let q = if rounding == Rounding::Up && !r.is_zero() {
        q.checked_add(U256::one()).ok_or(EngineError::ArithmeticOverflow)?
    } else {
        q
    };
    narrow(q)
}

/// a * b / d, rounding down
pub fn mul_div(a: u128, b: u128, d: u128) -> EngineResult<u128> {
    product_ratio(&[a, b], &[d], Rounding::Down)
}

/// a * b / d, rounding up
pub fn mul_div_ceil(a: u128, b: u128, d: u128) -> EngineResult<u128> {
    product_ratio(&[a, b], &[d], Rounding::Up)
}

/// n / d rounding up (d > 0)
pub fn div_ceil(n: u128, d: u128) -> u128 {
    let q = n / d;
    if n % d == 0 {
        q
    } else {
        q + 1
    }
}

/// Rescale `value` expressed with `from` decimals to `to` decimals.
/// Scaling down truncates.
pub fn rescale(value: u128, from: u8, to: u8) -> EngineResult<u128> {
    if from == to {
        return Ok(value);
    }
    if from < to {
        let factor = pow10(to - from)?;
        mul_u128(value, factor)
    } else {
        let factor = pow10(from - to)?;
        Ok(value / factor)
    }
}

/// 10^exp, failing when it does not fit
pub fn pow10(exp: u8) -> EngineResult<u128> {
    10u128
        .checked_pow(exp as u32)
        .ok_or(EngineError::ArithmeticOverflow)
}

/// Minimum of two u128
pub fn min_u128(a: u128, b: u128) -> u128 {
    if a < b { a } else { b }
}

/// Maximum of two u128
pub fn max_u128(a: u128, b: u128) -> u128 {
    if a > b { a } else { b }
}

/// Product of all factors in 256 bits
pub fn wide_product(factors: &[u128]) -> EngineResult<U256> {
    factors.iter().try_fold(U256::one(), |acc, f| {
        acc.checked_mul(U256::from(*f))
            .ok_or(EngineError::ArithmeticOverflow)
    })
}

fn narrow(v: U256) -> EngineResult<u128> {
    if v > U256::from(u128::MAX) {
        return Err(EngineError::ArithmeticOverflow);
    }
    Ok(v.as_u128())
}

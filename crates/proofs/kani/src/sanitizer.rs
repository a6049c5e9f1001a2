//! State space sanitizer - bounds values for Kani exploration

use vault_engine::{Params, Prices, Vault};

pub const MAX_STEPS: u8 = 4;

/// Bounds for tractable verification
const MAX_COLLATERAL: u128 = 1_000_000u128;
const MAX_DEBT: u128 = 1_000_000u128;
const MIN_PRICE: u128 = 1;
const MAX_PRICE: u128 = 100_000u128;
const MIN_PERCENTAGE: u128 = 101;
const MAX_PERCENTAGE: u128 = 300;
const MIN_GAIN_BPS: u128 = 10_000;
const MAX_GAIN_BPS: u128 = 15_000;
const MAX_DEBT_RATIO: u128 = 10;
const MAX_FEE_BPS: u128 = 1_000;

pub trait Sanitize {
    fn sanitize(self) -> Self;
}

fn wrap(v: u128, max: u128) -> u128 {
    if v > max {
        v % max
    } else {
        v
    }
}

fn into_range(v: u128, min: u128, max: u128) -> u128 {
    if (min..=max).contains(&v) {
        v
    } else {
        min + v % (max - min + 1)
    }
}

impl Sanitize for Vault {
    fn sanitize(mut self) -> Vault {
        self.collateral = wrap(self.collateral, MAX_COLLATERAL);
        self.debt = wrap(self.debt, MAX_DEBT);
        self
    }
}

impl Sanitize for Prices {
    fn sanitize(mut self) -> Prices {
        // Zero prices are rejected by the oracle adapter before any math runs
        self.collateral = into_range(self.collateral, MIN_PRICE, MAX_PRICE);
        self.token = into_range(self.token, MIN_PRICE, MAX_PRICE);
        self
    }
}

impl Sanitize for Params {
    fn sanitize(mut self) -> Params {
        self.min_collateral_percentage =
            into_range(self.min_collateral_percentage, MIN_PERCENTAGE, MAX_PERCENTAGE);
        self.gain_ratio_bps = into_range(self.gain_ratio_bps, MIN_GAIN_BPS, MAX_GAIN_BPS);
        self.debt_ratio = wrap(self.debt_ratio, MAX_DEBT_RATIO);
        self.closing_fee_bps = wrap(self.closing_fee_bps, MAX_FEE_BPS);
        self.min_debt = wrap(self.min_debt, MAX_DEBT);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vault_wrapped_into_bounds() {
        let v = Vault {
            collateral: u128::MAX,
            debt: MAX_DEBT + 5,
        }
        .sanitize();
        assert!(v.collateral <= MAX_COLLATERAL);
        assert_eq!(v.debt, 5);
    }

    #[test]
    fn test_prices_never_zero() {
        let p = Prices {
            collateral: 0,
            token: u128::MAX,
        }
        .sanitize();
        assert!(p.collateral >= MIN_PRICE && p.collateral <= MAX_PRICE);
        assert!(p.token >= MIN_PRICE && p.token <= MAX_PRICE);
    }

    #[test]
    fn test_params_in_range() {
        let p = Params {
            min_collateral_percentage: 0,
            gain_ratio_bps: u128::MAX,
            debt_ratio: 123,
            ..Params::default()
        }
        .sanitize();
        assert_eq!(p.min_collateral_percentage, MIN_PERCENTAGE);
        assert!(p.gain_ratio_bps >= MIN_GAIN_BPS && p.gain_ratio_bps <= MAX_GAIN_BPS);
        assert_eq!(p.debt_ratio, 3);
    }

    #[test]
    fn test_in_range_values_untouched() {
        let v = Vault {
            collateral: 10,
            debt: 20,
        };
        assert_eq!(v.sanitize(), v);
        let defaults = Params::default();
        assert_eq!(defaults.clone().sanitize(), defaults);
    }
}

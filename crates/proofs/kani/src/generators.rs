//! Generators for arbitrary vaults, prices and parameters (for Kani)

#[cfg(kani)]
use kani::any;
#[cfg(kani)]
use vault_engine::{Params, Prices, Vault};

// Ultra-small bounds for very fast verification
#[cfg(kani)]
const MAX_VAL: u128 = 100;

#[cfg(kani)]
pub fn any_vault() -> Vault {
    let collateral_raw: u8 = any();
    let debt_raw: u8 = any();

    Vault {
        collateral: (collateral_raw as u128) % MAX_VAL,
        debt: (debt_raw as u128) % MAX_VAL,
    }
}

#[cfg(kani)]
pub fn any_prices() -> Prices {
    let collateral_raw: u8 = any();
    let token_raw: u8 = any();

    Prices {
        collateral: ((collateral_raw as u128) % MAX_VAL).max(1),
        token: ((token_raw as u128) % MAX_VAL).max(1),
    }
}

#[cfg(kani)]
pub fn any_params() -> Params {
    let min_raw: u8 = any();
    let gain_raw: u8 = any();
    let debt_ratio_raw: u8 = any();
    let min_debt_raw: u8 = any();

    Params {
        // 101% .. 228%
        min_collateral_percentage: 101 + (min_raw as u128) % 128,
        // 1.00x .. 1.255x in 10 bps steps
        gain_ratio_bps: 10_000 + ((gain_raw as u128) % 256) * 10,
        debt_ratio: (debt_ratio_raw as u128) % 4,
        min_debt: (min_debt_raw as u128) % (MAX_VAL / 4),
        ..Params::default()
    }
}

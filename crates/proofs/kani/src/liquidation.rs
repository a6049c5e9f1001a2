//! Liquidation step-case proofs
//!
//! Each proof checks one quote against a price snapshot.

use kani::assume;
use vault_engine::{collateralization_percentage, is_liquidatable, is_safe, quote};
use crate::{generators::*, sanitizer::*};

/// Quotes never take more than the vault holds or repay more than it owes
#[kani::proof]
fn quote_is_bounded() {
    let v = any_vault().sanitize();
    let prices = any_prices().sanitize();
    let params = any_params().sanitize();

    let q = quote(&v, &prices, &params).unwrap();
    kani::assert(q.cost <= v.debt, "cost must not exceed debt");
    kani::assert(q.extract <= v.collateral, "extract must not exceed collateral");
}

/// Safe vaults quote nothing
#[kani::proof]
fn noop_when_safe() {
    let v = any_vault().sanitize();
    let prices = any_prices().sanitize();
    let params = any_params().sanitize();
    assume(!is_liquidatable(&v, &prices, &params).unwrap());

    let q = quote(&v, &prices, &params).unwrap();
    kani::assert(q.is_empty(), "safe vault must quote zero");
}

/// An uncapped liquidation leaves the vault Safe
#[kani::proof]
fn uncapped_liquidation_restores_safety() {
    let v = any_vault().sanitize();
    let prices = any_prices().sanitize();
    let params = any_params().sanitize();
    assume(v.debt > 0);
    assume(is_liquidatable(&v, &prices, &params).unwrap());

    let q = quote(&v, &prices, &params).unwrap();
    assume(!q.capped);

    let after = collateralization_percentage(v.collateral - q.extract, v.debt - q.cost, &prices).unwrap();
    kani::assert(
        is_safe(after, params.min_collateral_percentage),
        "liquidation must restore the minimum ratio",
    );
}

/// Liquidation always makes progress on a liquidatable vault
#[kani::proof]
fn liquidation_makes_progress() {
    let v = any_vault().sanitize();
    let prices = any_prices().sanitize();
    let params = any_params().sanitize();
    assume(v.collateral > 0);
    assume(is_liquidatable(&v, &prices, &params).unwrap());

    let q = quote(&v, &prices, &params).unwrap();
    kani::assert(q.cost > 0, "liquidation must repay something");
}

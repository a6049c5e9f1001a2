//! Kani proofs for ledger invariants across engine operations

use kani::{any, assume};
use vault_engine::invariants::{no_dust_debt, total_borrowed_consistent};
use vault_engine::{collateralization_percentage, is_safe, Params, Prices};
use crate::{adversary::*, generators::*, sanitizer::*};

fn small_params() -> Params {
    Params {
        token_peg: 50,
        ..any_params()
    }
}

/// The borrowed total tracks Σ debt across any short operation sequence
#[kani::proof]
#[kani::unwind(6)]
fn total_borrowed_tracks_debt() {
    let Ok(mut w) = World::new(small_params(), 50, 200) else {
        return;
    };

    let steps = (any::<u8>() % MAX_STEPS) + 1;
    for _ in 0..steps {
        adversary_step(&mut w);
        kani::assert(
            total_borrowed_consistent(w.engine.state()),
            "total_borrowed must equal the sum of vault debts",
        );
        kani::assert(w.engine.audit().collateral_backed(), "collateral must stay backed");
    }
}

/// A failed operation leaves the ledger untouched
#[kani::proof]
#[kani::unwind(4)]
fn failed_step_is_noop() {
    let Ok(mut w) = World::new(small_params(), 50, 200) else {
        return;
    };
    let _ = w.apply(Step::Deposit, any::<u8>() as u128);
    let _ = w.apply(Step::Borrow, any::<u8>() as u128);

    let before = w.engine.state().clone();
    let step: Step = any();
    if w.apply(step, any::<u8>() as u128).is_err() {
        kani::assert(w.engine.state() == &before, "failure must not mutate");
    }
}

/// Successful withdraw never leaves an indebted vault below the minimum
#[kani::proof]
#[kani::unwind(4)]
fn withdraw_keeps_ratio() {
    let Ok(mut w) = World::new(small_params(), 50, 200) else {
        return;
    };
    let _ = w.apply(Step::Deposit, any::<u8>() as u128);
    let _ = w.apply(Step::Borrow, any::<u8>() as u128);

    if w.apply(Step::Withdraw, any::<u8>() as u128).is_ok() {
        let v = w.engine.vault(w.vault).unwrap();
        let prices = w.engine.prices().unwrap();
        let min = w.engine.params().min_collateral_percentage;
        kani::assert(
            v.debt == 0 || is_safe(collateralization_percentage(v.collateral, v.debt, &prices).unwrap(), min),
            "withdraw must keep the vault safe",
        );
    }
}

/// Borrow and repay never create a dust position
#[kani::proof]
#[kani::unwind(4)]
fn borrow_and_repay_never_dust() {
    let Ok(mut w) = World::new(small_params(), 50, 200) else {
        return;
    };
    let _ = w.apply(Step::Deposit, any::<u8>() as u128);
    let _ = w.apply(Step::Borrow, any::<u8>() as u128);
    let _ = w.apply(Step::Repay, any::<u8>() as u128);

    let params = w.engine.params().clone();
    kani::assert(no_dust_debt(w.engine.state(), &params), "no debt below the minimum");
}

/// Ratio is monotone in collateral and anti-monotone in debt
#[kani::proof]
fn ratio_monotone() {
    let v = any_vault().sanitize();
    let prices: Prices = any_prices().sanitize();
    let extra: u8 = any();
    assume(v.debt > 0);

    let base = collateralization_percentage(v.collateral, v.debt, &prices).unwrap();
    let more_collateral =
        collateralization_percentage(v.collateral + extra as u128, v.debt, &prices).unwrap();
    let more_debt =
        collateralization_percentage(v.collateral, v.debt + extra as u128, &prices).unwrap();

    kani::assert(more_collateral >= base, "deposit must not lower the ratio");
    kani::assert(more_debt <= base, "borrow must not raise the ratio");
}

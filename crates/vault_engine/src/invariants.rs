//! Invariant checking helpers
//!
//! Total functions over the ledger; used by tests, proofs and the keeper's
//! audit step.

use crate::engine::VaultEngine;
use crate::interfaces::{Asset, VaultOwnership};
use crate::oracle::Prices;
use crate::params::Params;
use crate::ratio::{collateralization_percentage, is_safe};
use crate::state::EngineState;

/// Σ collateral over live vaults, saturating
pub fn total_collateral(s: &EngineState) -> u128 {
    s.iter().fold(0u128, |acc, (_, v)| acc.saturating_add(v.collateral))
}

/// Σ debt over live vaults, saturating
pub fn total_debt(s: &EngineState) -> u128 {
    s.iter().fold(0u128, |acc, (_, v)| acc.saturating_add(v.debt))
}

/// The borrowed total equals the sum of vault debts
pub fn total_borrowed_consistent(s: &EngineState) -> bool {
    total_debt(s) == s.total_borrowed()
}

/// Collateral the engine owes: vault balances plus unclaimed rewards
pub fn collateral_liabilities(s: &EngineState) -> u128 {
    total_collateral(s).saturating_add(s.rewards.total())
}

/// Every vault with debt is at or above the minimum ratio
pub fn all_safe(s: &EngineState, prices: &Prices, params: &Params) -> bool {
    s.iter().all(|(_, v)| {
        v.debt == 0
            || collateralization_percentage(v.collateral, v.debt, prices)
                .map(|r| is_safe(r, params.min_collateral_percentage))
                .unwrap_or(false)
    })
}

/// No vault carries a nonzero debt below the minimum debt
pub fn no_dust_debt(s: &EngineState, params: &Params) -> bool {
    s.iter()
        .all(|(_, v)| v.debt == 0 || v.debt >= params.min_debt)
}

/// Outcome of [`VaultEngine::audit`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Audit {
    pub total_borrowed: u128,
    pub total_debt: u128,
    pub liabilities: u128,
    pub collateral_held: u128,
}

impl Audit {
    pub fn borrowed_consistent(&self) -> bool {
        self.total_borrowed == self.total_debt
    }

    /// The engine holds at least as much collateral as it owes
    pub fn collateral_backed(&self) -> bool {
        self.collateral_held >= self.liabilities
    }

    pub fn ok(&self) -> bool {
        self.borrowed_consistent() && self.collateral_backed()
    }
}

impl<C, D, N> VaultEngine<C, D, N>
where
    C: Asset,
    D: Asset,
    N: VaultOwnership,
{
    /// Compare the ledger against itself and against the collateral asset
    pub fn audit(&self) -> Audit {
        Audit {
            total_borrowed: self.state.total_borrowed(),
            total_debt: total_debt(&self.state),
            liabilities: collateral_liabilities(&self.state),
            collateral_held: self.collateral.balance_of(&self.address),
        }
    }
}

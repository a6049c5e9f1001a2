//! Pull-payment ledger of collateral owed to liquidators

use crate::error::EngineResult;
use crate::math::add_u128;
use crate::state::Address;
use std::collections::BTreeMap;

/// Claimable collateral per liquidator. Zero balances are not stored.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RewardLedger {
    owed: BTreeMap<Address, u128>,
}

impl RewardLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn claimable(&self, who: &Address) -> u128 {
        self.owed.get(who).copied().unwrap_or(0)
    }

    /// Add `amount` to the claimable balance of `who`
    pub fn credit(&mut self, who: Address, amount: u128) -> EngineResult<u128> {
        let balance = add_u128(self.claimable(&who), amount)?;
        self.set(who, balance);
        Ok(balance)
    }

    /// Remove and return the whole balance of `who`
    pub fn take(&mut self, who: &Address) -> u128 {
        self.owed.remove(who).unwrap_or(0)
    }

    pub fn set(&mut self, who: Address, amount: u128) {
        if amount == 0 {
            self.owed.remove(&who);
        } else {
            self.owed.insert(who, amount);
        }
    }

    /// Sum of everything owed
    pub fn total(&self) -> u128 {
        self.owed.values().fold(0u128, |acc, v| acc.saturating_add(*v))
    }

    pub fn len(&self) -> usize {
        self.owed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owed.is_empty()
    }
}

//! In-memory implementations of the external collaborators
//!
//! Used by tests, the Kani harnesses and the keeper simulation.

use crate::engine::VaultEngine;
use crate::error::{OracleError, OwnershipError, TransferError};
use crate::interfaces::{Asset, VaultOwnership};
use crate::oracle::{OracleAdapter, Price, PriceSource};
use crate::params::EngineConfig;
use crate::state::{Address, VaultId};
use std::cell::Cell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

/// Fungible token with balances and allowances
#[derive(Debug, Clone, Default)]
pub struct InMemoryAsset {
    symbol: String,
    balances: HashMap<Address, u128>,
    allowances: HashMap<(Address, Address), u128>,
    total_supply: u128,
    rejecting: bool,
}

impl InMemoryAsset {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            ..Self::default()
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Create `amount` out of thin air for `to`
    pub fn mint(&mut self, to: &Address, amount: u128) {
        let balance = self.balances.entry(*to).or_insert(0);
        *balance = balance.saturating_add(amount);
        self.total_supply = self.total_supply.saturating_add(amount);
    }

    pub fn approve(&mut self, owner: &Address, spender: &Address, amount: u128) {
        self.allowances.insert((*owner, *spender), amount);
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> u128 {
        self.allowances.get(&(*owner, *spender)).copied().unwrap_or(0)
    }

    pub fn total_supply(&self) -> u128 {
        self.total_supply
    }

    /// While set, every transfer fails with [`TransferError::Rejected`]
    pub fn set_rejecting(&mut self, rejecting: bool) {
        self.rejecting = rejecting;
    }

    fn move_balance(&mut self, from: &Address, to: &Address, amount: u128) -> Result<(), TransferError> {
        if self.rejecting {
            return Err(TransferError::Rejected);
        }
        let available = self.balance_of(from);
        if available < amount {
            return Err(TransferError::InsufficientBalance {
                available,
                required: amount,
            });
        }
        self.balances.insert(*from, available - amount);
        let dest = self.balances.entry(*to).or_insert(0);
        *dest = dest.saturating_add(amount);
        Ok(())
    }
}

impl Asset for InMemoryAsset {
    fn transfer_from(
        &mut self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<(), TransferError> {
        let allowed = self.allowance(from, spender);
        if allowed < amount {
            return Err(TransferError::InsufficientAllowance {
                available: allowed,
                required: amount,
            });
        }
        self.move_balance(from, to, amount)?;
        self.allowances.insert((*from, *spender), allowed - amount);
        Ok(())
    }

    fn transfer(&mut self, from: &Address, to: &Address, amount: u128) -> Result<(), TransferError> {
        self.move_balance(from, to, amount)
    }

    fn balance_of(&self, who: &Address) -> u128 {
        self.balances.get(who).copied().unwrap_or(0)
    }
}

/// Vault ownership registry
#[derive(Debug, Clone, Default)]
pub struct InMemoryVaultRegistry {
    owners: BTreeMap<VaultId, Address>,
}

impl InMemoryVaultRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Vault ids held by `who`
    pub fn vaults_of(&self, who: &Address) -> Vec<VaultId> {
        self.owners
            .iter()
            .filter(|(_, owner)| *owner == who)
            .map(|(id, _)| *id)
            .collect()
    }
}

impl VaultOwnership for InMemoryVaultRegistry {
    fn mint(&mut self, to: &Address, id: VaultId) -> Result<(), OwnershipError> {
        if self.owners.contains_key(&id) {
            return Err(OwnershipError::AlreadyMinted(id));
        }
        self.owners.insert(id, *to);
        Ok(())
    }

    fn burn(&mut self, id: VaultId) -> Result<(), OwnershipError> {
        self.owners
            .remove(&id)
            .map(|_| ())
            .ok_or(OwnershipError::NotMinted(id))
    }

    fn owner_of(&self, id: VaultId) -> Option<Address> {
        self.owners.get(&id).copied()
    }

    fn balance_of(&self, who: &Address) -> u64 {
        self.owners.values().filter(|owner| *owner == who).count() as u64
    }

    fn transfer(&mut self, from: &Address, to: &Address, id: VaultId) -> Result<(), OwnershipError> {
        match self.owners.get_mut(&id) {
            None => Err(OwnershipError::NotMinted(id)),
            Some(owner) if owner != from => Err(OwnershipError::WrongOwner(id)),
            Some(owner) => {
                *owner = *to;
                Ok(())
            }
        }
    }
}

/// Price source that never changes
#[derive(Debug, Clone, Copy)]
pub struct FixedPrice(Price);

impl FixedPrice {
    pub fn new(value: u128, decimals: u8) -> Self {
        Self(Price::new(value, decimals))
    }
}

impl PriceSource for FixedPrice {
    fn current_price(&self) -> Result<Price, OracleError> {
        Ok(self.0)
    }
}

/// Settable price source; clones share the same reading
#[derive(Debug, Clone)]
pub struct ManualPriceFeed {
    price: Rc<Cell<Price>>,
    halted: Rc<Cell<bool>>,
}

impl ManualPriceFeed {
    pub fn new(value: u128, decimals: u8) -> Self {
        Self {
            price: Rc::new(Cell::new(Price::new(value, decimals))),
            halted: Rc::new(Cell::new(false)),
        }
    }

    /// Update the value, keeping the decimals
    pub fn set(&self, value: u128) {
        let decimals = self.price.get().decimals;
        self.price.set(Price::new(value, decimals));
    }

    pub fn get(&self) -> Price {
        self.price.get()
    }

    /// While halted, reads fail with [`OracleError::Unavailable`]
    pub fn set_halted(&self, halted: bool) {
        self.halted.set(halted);
    }
}

impl PriceSource for ManualPriceFeed {
    fn current_price(&self) -> Result<Price, OracleError> {
        if self.halted.get() {
            return Err(OracleError::Unavailable("feed halted".to_string()));
        }
        Ok(self.price.get())
    }
}

/// Engine wired to in-memory collaborators
pub type MemoryEngine = VaultEngine<InMemoryAsset, InMemoryAsset, InMemoryVaultRegistry>;

impl MemoryEngine {
    /// Fresh engine with empty assets and registry
    pub fn in_memory(owner: Address, config: EngineConfig, oracle: OracleAdapter) -> Self {
        VaultEngine::new(
            Address::from_label("vault-engine"),
            owner,
            config,
            oracle,
            InMemoryAsset::new("COLL"),
            InMemoryAsset::new("DEBT"),
            InMemoryVaultRegistry::new(),
        )
    }

    /// Mint collateral to `who` and raise their allowance to the engine by the same amount
    pub fn fund_collateral(&mut self, who: &Address, amount: u128) {
        let engine = self.address;
        let allowance = self.collateral.allowance(who, &engine);
        self.collateral.mint(who, amount);
        self.collateral
            .approve(who, &engine, allowance.saturating_add(amount));
    }

    /// Mint debt tokens to `who` and raise their allowance to the engine by the same amount
    pub fn fund_debt(&mut self, who: &Address, amount: u128) {
        let engine = self.address;
        let allowance = self.debt.allowance(who, &engine);
        self.debt.mint(who, amount);
        self.debt.approve(who, &engine, allowance.saturating_add(amount));
    }

    /// Let the engine pull up to `amount` debt tokens from `who`
    pub fn approve_debt(&mut self, who: &Address, amount: u128) {
        let engine = self.address;
        self.debt.approve(who, &engine, amount);
    }

    /// Add debt tokens to the float the engine lends from
    pub fn fund_float(&mut self, amount: u128) {
        let engine = self.address;
        self.debt.mint(&engine, amount);
    }
}

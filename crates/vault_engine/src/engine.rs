//! The vault engine: ledger, collaborators and atomic operation plumbing
//!
//! Public operations live in `operations`, `liquidation` and `admin`; this
//! module holds the struct, read accessors, the reward claim and the
//! checkpoint/rollback wrapper every mutating operation runs inside.

use crate::error::{EngineError, EngineResult};
use crate::events::Event;
use crate::interfaces::{Asset, VaultOwnership};
use crate::oracle::{OracleAdapter, Prices};
use crate::params::{EngineConfig, Params};
use crate::ratio::{collateralization_percentage, UNBOUNDED_RATIO};
use crate::state::{Address, EngineState, Vault, VaultId};

pub struct VaultEngine<C, D, N> {
    /// Account the engine holds collateral and the debt-token float under
    pub(crate) address: Address,
    /// Parameter-store owner
    pub(crate) owner: Address,
    pub(crate) config: EngineConfig,
    pub(crate) state: EngineState,
    pub(crate) oracle: OracleAdapter,
    pub(crate) collateral: C,
    pub(crate) debt: D,
    pub(crate) registry: N,
    events: Vec<Event>,
}

impl<C, D, N> VaultEngine<C, D, N>
where
    C: Asset,
    D: Asset,
    N: VaultOwnership,
{
    pub fn new(
        address: Address,
        owner: Address,
        config: EngineConfig,
        oracle: OracleAdapter,
        collateral: C,
        debt: D,
        registry: N,
    ) -> Self {
        log::info!(
            "Engine: {} ({}) deployed at {}, owner {}",
            config.name,
            config.symbol,
            address,
            owner
        );
        Self {
            address,
            owner,
            config,
            state: EngineState::new(),
            oracle,
            collateral,
            debt,
            registry,
            events: Vec::new(),
        }
    }

    // ------------------------------------------------------------------
    // Read accessors
    // ------------------------------------------------------------------

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn params(&self) -> &Params {
        &self.config.params
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn vault(&self, id: VaultId) -> EngineResult<Vault> {
        self.state.vault(id).copied()
    }

    pub fn vault_collateral(&self, id: VaultId) -> EngineResult<u128> {
        Ok(self.state.vault(id)?.collateral)
    }

    pub fn vault_debt(&self, id: VaultId) -> EngineResult<u128> {
        Ok(self.state.vault(id)?.debt)
    }

    pub fn exists(&self, id: VaultId) -> bool {
        self.state.contains(id)
    }

    /// Number of vault ids ever allocated
    pub fn vault_count(&self) -> u64 {
        self.state.next_id()
    }

    /// Live vault ids in ascending order
    pub fn vault_ids(&self) -> Vec<VaultId> {
        self.state.iter().map(|(id, _)| id).collect()
    }

    pub fn total_borrowed(&self) -> u128 {
        self.state.total_borrowed()
    }

    pub fn owner_of(&self, id: VaultId) -> Option<Address> {
        self.registry.owner_of(id)
    }

    /// Number of vaults held by `who`
    pub fn vault_balance_of(&self, who: &Address) -> u64 {
        self.registry.balance_of(who)
    }

    /// Collateral claimable by `who` through [`VaultEngine::get_paid`]
    pub fn claimable(&self, who: &Address) -> u128 {
        self.state.rewards.claimable(who)
    }

    /// Debt tokens the engine can still lend out
    pub fn debt_ceiling(&self) -> u128 {
        self.debt.balance_of(&self.address)
    }

    pub fn collateral_price(&self) -> EngineResult<u128> {
        self.oracle.collateral_price()
    }

    pub fn token_price(&self) -> EngineResult<u128> {
        self.oracle.token_price(&self.config.params)
    }

    pub fn prices(&self) -> EngineResult<Prices> {
        self.oracle.prices(&self.config.params)
    }

    /// Current collateralization percentage of a vault
    pub fn collateralization_percentage(&self, id: VaultId) -> EngineResult<u128> {
        let vault = *self.state.vault(id)?;
        if vault.debt == 0 {
            return Ok(UNBOUNDED_RATIO);
        }
        let prices = self.prices()?;
        collateralization_percentage(vault.collateral, vault.debt, &prices)
    }

    pub fn collateral_asset(&self) -> &C {
        &self.collateral
    }

    pub fn collateral_asset_mut(&mut self) -> &mut C {
        &mut self.collateral
    }

    pub fn debt_asset(&self) -> &D {
        &self.debt
    }

    pub fn debt_asset_mut(&mut self) -> &mut D {
        &mut self.debt
    }

    pub fn registry(&self) -> &N {
        &self.registry
    }

    /// Events recorded since the last [`VaultEngine::take_events`]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    // ------------------------------------------------------------------
    // Reward ledger
    // ------------------------------------------------------------------

    /// Claim the caller's whole reward balance in collateral
    pub fn get_paid(&mut self, caller: &Address) -> EngineResult<u128> {
        let amount = self.state.rewards.claimable(caller);
        if amount == 0 {
            return Err(EngineError::NothingToClaim);
        }

        let who = *caller;
        self.atomically(&[], &[who], |engine| {
            engine.state.rewards.take(&who);
            engine.collateral.transfer(&engine.address, &who, amount)?;
            engine.emit(Event::RewardClaimed { who, amount });
            Ok(amount)
        })?;

        log::info!("GetPaid: {} claimed {}", caller, amount);
        Ok(amount)
    }

    // ------------------------------------------------------------------
    // Internal plumbing
    // ------------------------------------------------------------------

    /// Run `op` with a checkpoint of the listed entries; on error every
    /// recorded entry, the borrowed total, the id counter and the event log
    /// are put back.
    pub(crate) fn atomically<T>(
        &mut self,
        vaults: &[VaultId],
        rewards: &[Address],
        op: impl FnOnce(&mut Self) -> EngineResult<T>,
    ) -> EngineResult<T> {
        let cp = self.state.checkpoint(vaults, rewards);
        let events_len = self.events.len();
        match op(self) {
            Ok(v) => Ok(v),
            Err(e) => {
                log::debug!("Engine: rolling back after {}", e);
                self.state.restore(cp);
                self.events.truncate(events_len);
                Err(e)
            }
        }
    }

    pub(crate) fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Vault record, failing with `VaultNotFound`
    pub(crate) fn require_vault(&self, id: VaultId) -> EngineResult<Vault> {
        self.state.vault(id).copied()
    }

    /// Vault record owned by `caller`
    pub(crate) fn require_vault_owner(&self, caller: &Address, id: VaultId) -> EngineResult<Vault> {
        let vault = self.require_vault(id)?;
        match self.registry.owner_of(id) {
            Some(owner) if owner == *caller => Ok(vault),
            _ => Err(EngineError::NotOwner),
        }
    }
}

//! Vault engine integration tests
//!
//! Shared harness for the scenario and property suites under `tests/`. The
//! engine runs against the in-memory asset, registry and price feed.

use vault_engine::memory::{ManualPriceFeed, MemoryEngine};
use vault_engine::{Address, EngineConfig, EngineResult, OracleAdapter, Params, VaultId};

/// One whole token at 18 decimals
pub const ONE: u128 = 1_000_000_000_000_000_000;

/// One dollar at 8 decimals
pub const USD: u128 = 100_000_000;

/// Debt tokens the engine can lend in every harness
pub const FLOAT: u128 = 100_000_000 * ONE;

pub struct Harness {
    pub engine: MemoryEngine,
    pub feed: ManualPriceFeed,
    pub owner: Address,
}

impl Harness {
    /// Engine with `params` and a collateral price of `collateral_usd` dollars
    pub fn new(params: Params, collateral_usd: u128) -> Self {
        let feed = ManualPriceFeed::new(collateral_usd * USD, 8);
        let owner = Address::from_label("governance");
        let config = EngineConfig {
            params,
            ..EngineConfig::default()
        };
        let oracle = OracleAdapter::new(Box::new(feed.clone()));
        let mut engine = MemoryEngine::in_memory(owner, config, oracle);
        engine.fund_float(FLOAT);
        Self {
            engine,
            feed,
            owner,
        }
    }

    pub fn with_defaults(collateral_usd: u128) -> Self {
        Self::new(Params::default(), collateral_usd)
    }

    /// Address holding `collateral` base units, with repayments pre-approved
    pub fn user(&mut self, label: &str, collateral: u128) -> Address {
        let who = Address::from_label(label);
        self.engine.fund_collateral(&who, collateral);
        self.engine.approve_debt(&who, u128::MAX);
        who
    }

    /// Address holding `tokens` debt-token base units, approved for the engine
    pub fn liquidator(&mut self, label: &str, tokens: u128) -> Address {
        let who = Address::from_label(label);
        self.engine.fund_debt(&who, tokens);
        who
    }

    /// Open a vault for `who`, deposit and borrow in one go
    pub fn open(&mut self, who: &Address, collateral: u128, debt: u128) -> EngineResult<VaultId> {
        let id = self.engine.create_vault(who)?;
        self.engine.deposit_collateral(who, id, collateral)?;
        if debt > 0 {
            self.engine.borrow_token(who, id, debt)?;
        }
        Ok(id)
    }

    pub fn set_price(&self, collateral_usd: u128) {
        self.feed.set(collateral_usd * USD);
    }

    pub fn ratio(&self, id: VaultId) -> u128 {
        self.engine.collateralization_percentage(id).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_harness_opens_vault() {
        let mut h = Harness::with_defaults(2_000);
        let alice = h.user("alice", 10 * ONE);
        let id = h.open(&alice, 10 * ONE, 1_000 * ONE).unwrap();
        assert_eq!(h.ratio(id), 2_000);
        assert_eq!(h.engine.debt_ceiling(), FLOAT - 1_000 * ONE);
    }
}

//! Adversarial step generator
//!
//! A single-vault world driven through arbitrary engine operations. Every
//! step either succeeds or leaves the ledger untouched.

#[cfg(kani)]
use kani::any;
use vault_engine::memory::{ManualPriceFeed, MemoryEngine};
use vault_engine::{Address, EngineConfig, EngineResult, OracleAdapter, Params, VaultId};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    Deposit,
    Withdraw,
    Borrow,
    Repay,
    PriceMove,
    Liquidate,
    Claim,
}

#[cfg(kani)]
impl kani::Arbitrary for Step {
    fn any() -> Self {
        let choice: u8 = any();
        match choice % 7 {
            0 => Step::Deposit,
            1 => Step::Withdraw,
            2 => Step::Borrow,
            3 => Step::Repay,
            4 => Step::PriceMove,
            5 => Step::Liquidate,
            _ => Step::Claim,
        }
    }
}

pub struct World {
    pub engine: MemoryEngine,
    pub feed: ManualPriceFeed,
    pub user: Address,
    pub liquidator: Address,
    pub vault: VaultId,
}

impl World {
    /// One vault owned by `user`; the user holds `budget` collateral, the
    /// liquidator and the engine float `budget` debt tokens each. `price` is
    /// read at 8 decimals, like `params.token_peg`.
    pub fn new(params: Params, price: u128, budget: u128) -> EngineResult<Self> {
        let feed = ManualPriceFeed::new(price, vault_engine::PRICE_DECIMALS);
        let owner = Address::from_label("owner");
        let user = Address::from_label("user");
        let liquidator = Address::from_label("liquidator");

        let config = EngineConfig {
            params,
            ..EngineConfig::default()
        };
        let oracle = OracleAdapter::new(Box::new(feed.clone()));
        let mut engine = MemoryEngine::in_memory(owner, config, oracle);
        engine.fund_float(budget);
        engine.fund_collateral(&user, budget);
        engine.fund_debt(&liquidator, budget);
        engine.approve_debt(&user, u128::MAX);

        let vault = engine.create_vault(&user)?;
        Ok(Self {
            engine,
            feed,
            user,
            liquidator,
            vault,
        })
    }

    pub fn apply(&mut self, step: Step, amount: u128) -> EngineResult<()> {
        let (user, liquidator, id) = (self.user, self.liquidator, self.vault);
        match step {
            Step::Deposit => self.engine.deposit_collateral(&user, id, amount),
            Step::Withdraw => self.engine.withdraw_collateral(&user, id, amount),
            Step::Borrow => self.engine.borrow_token(&user, id, amount),
            Step::Repay => self.engine.pay_back_token(&user, id, amount).map(|_| ()),
            Step::PriceMove => {
                self.feed.set(amount.max(1));
                Ok(())
            }
            Step::Liquidate => self.engine.liquidate_vault(&liquidator, id).map(|_| ()),
            Step::Claim => self.engine.get_paid(&liquidator).map(|_| ()),
        }
    }
}

#[cfg(kani)]
pub fn adversary_step(w: &mut World) {
    let step: Step = any();
    let amount: u8 = any();
    let _ = w.apply(step, amount as u128);
}

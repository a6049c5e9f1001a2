//! End-to-end scenarios against the in-memory engine

use vault_engine::{Asset, EngineError, Event, Params, TransferError, UNBOUNDED_RATIO};
use vault_integration_tests::{Harness, ONE, USD};

/// Borrow at 1.4x the collateral value, then tighten the minimum to 150%
#[test]
fn test_minimum_ratio_change_makes_vault_liquidatable() {
    let mut h = Harness::with_defaults(2_000);
    let alice = h.user("alice", 10 * ONE);

    let eth_price = h.engine.collateral_price().unwrap();
    let token_price = h.engine.token_price().unwrap();
    // 10 * ethPrice / (tokenPrice * 1.4)
    let borrow = 10 * ONE * eth_price * 10 / (token_price * 14);
    let id = h.open(&alice, 10 * ONE, borrow).unwrap();

    assert!(h.ratio(id) >= 139);
    assert!(!h.engine.check_liquidation(id).unwrap());
    assert_eq!(h.engine.check_cost(id).unwrap(), 0);
    assert_eq!(h.engine.check_extract(id).unwrap(), 0);

    let owner = h.owner;
    h.engine.set_min_collateral_ratio(&owner, 150).unwrap();
    assert!(h.engine.check_liquidation(id).unwrap());
    assert!(h.engine.check_cost(id).unwrap() > 0);
    assert!(h.engine.check_extract(id).unwrap() > 0);
}

#[test]
fn test_destroy_vault_errors() {
    let mut h = Harness::with_defaults(2_000);
    let alice = h.user("alice", 10 * ONE);
    let bob = h.user("bob", 0);
    let id = h.open(&alice, 10 * ONE, 100 * ONE).unwrap();

    assert_eq!(
        h.engine.destroy_vault(&alice, id),
        Err(EngineError::OutstandingDebt(id))
    );
    assert_eq!(h.engine.destroy_vault(&bob, id), Err(EngineError::NotOwner));
    assert_eq!(
        h.engine.destroy_vault(&alice, 42),
        Err(EngineError::VaultNotFound(42))
    );
}

#[test]
fn test_get_paid_after_liquidation() {
    let mut h = Harness::with_defaults(2_000);
    let alice = h.user("alice", 10 * ONE);
    let keeper = h.liquidator("keeper", 100_000 * ONE);
    assert_eq!(h.engine.get_paid(&keeper), Err(EngineError::NothingToClaim));

    let id = h.open(&alice, 10 * ONE, 14_000 * ONE).unwrap();
    h.set_price(1_700);
    h.engine.take_events();
    let q = h.engine.liquidate_vault(&keeper, id).unwrap();
    assert!(q.extract > 0);
    assert_eq!(h.engine.claimable(&keeper), q.extract);

    let before = h.engine.collateral_asset().balance_of(&keeper);
    assert_eq!(h.engine.get_paid(&keeper).unwrap(), q.extract);
    assert_eq!(
        h.engine.take_events(),
        vec![
            Event::VaultLiquidated {
                id,
                liquidator: keeper,
                cost: q.cost,
                extract: q.extract,
            },
            Event::RewardClaimed {
                who: keeper,
                amount: q.extract,
            },
        ]
    );
    assert_eq!(h.engine.collateral_asset().balance_of(&keeper), before + q.extract);
    assert_eq!(h.engine.claimable(&keeper), 0);
    assert_eq!(h.engine.get_paid(&keeper), Err(EngineError::NothingToClaim));
}

#[test]
fn test_full_repayment_always_allowed_partial_dust_rejected() {
    let params = Params {
        min_debt: 500 * ONE,
        ..Params::default()
    };
    let mut h = Harness::new(params, 2_000);
    let alice = h.user("alice", 10 * ONE);
    let id = h.open(&alice, 10 * ONE, 1_000 * ONE).unwrap();

    assert_eq!(
        h.engine.pay_back_token(&alice, id, 700 * ONE),
        Err(EngineError::BelowMinimumDebt {
            debt: 300 * ONE,
            minimum: 500 * ONE
        })
    );
    h.engine.pay_back_token(&alice, id, 500 * ONE).unwrap();
    h.engine.pay_back_token(&alice, id, 500 * ONE).unwrap();
    assert_eq!(h.engine.vault_debt(id).unwrap(), 0);
    assert_eq!(h.engine.collateralization_percentage(id).unwrap(), UNBOUNDED_RATIO);

    h.engine.destroy_vault(&alice, id).unwrap();
}

#[test]
fn test_anyone_can_repay_and_deposit() {
    let mut h = Harness::with_defaults(2_000);
    let alice = h.user("alice", 10 * ONE);
    let helper = h.user("helper", 5 * ONE);
    let id = h.open(&alice, 10 * ONE, 1_000 * ONE).unwrap();

    h.engine.deposit_collateral(&helper, id, 5 * ONE).unwrap();
    assert_eq!(h.engine.vault_collateral(id).unwrap(), 15 * ONE);

    // helper needs debt tokens of its own
    h.engine.fund_debt(&helper, 100 * ONE);
    h.engine.pay_back_token(&helper, id, 100 * ONE).unwrap();
    assert_eq!(h.engine.vault_debt(id).unwrap(), 900 * ONE);

    // only the owner can take value out
    assert_eq!(
        h.engine.withdraw_collateral(&helper, id, ONE),
        Err(EngineError::NotOwner)
    );
    assert_eq!(
        h.engine.borrow_token(&helper, id, ONE),
        Err(EngineError::NotOwner)
    );
}

#[test]
fn test_deposit_withdraw_is_identity_without_debt() {
    let mut h = Harness::with_defaults(2_000);
    let alice = h.user("alice", 10 * ONE);
    let id = h.open(&alice, 0, 0).unwrap();
    let vault = h.engine.vault(id).unwrap();
    let balance = h.engine.collateral_asset().balance_of(&alice);

    h.engine.deposit_collateral(&alice, id, 7 * ONE).unwrap();
    h.engine.withdraw_collateral(&alice, id, 7 * ONE).unwrap();

    assert_eq!(h.engine.vault(id).unwrap(), vault);
    assert_eq!(h.engine.collateral_asset().balance_of(&alice), balance);
}

#[test]
fn test_stability_pool_gates_liquidation() {
    let mut h = Harness::with_defaults(2_000);
    let alice = h.user("alice", 10 * ONE);
    let pool = h.liquidator("pool", 100_000 * ONE);
    let outsider = h.liquidator("outsider", 100_000 * ONE);
    let id = h.open(&alice, 10 * ONE, 14_000 * ONE).unwrap();

    let owner = h.owner;
    h.engine.set_stability_pool(&owner, Some(pool)).unwrap();
    h.set_price(1_700);

    assert_eq!(
        h.engine.liquidate_vault(&outsider, id),
        Err(EngineError::LiquidationRestricted)
    );
    h.engine.liquidate_vault(&pool, id).unwrap();

    h.engine.set_stability_pool(&owner, None).unwrap();
    h.set_price(1_000);
    h.engine.liquidate_vault(&outsider, id).unwrap();
}

#[test]
fn test_liquidation_restores_minimum_ratio() {
    let mut h = Harness::with_defaults(2_000);
    let alice = h.user("alice", 10 * ONE);
    let keeper = h.liquidator("keeper", 100_000 * ONE);
    let id = h.open(&alice, 10 * ONE, 14_000 * ONE).unwrap();

    assert_eq!(
        h.engine.liquidate_vault(&keeper, id),
        Err(EngineError::NotLiquidatable(id))
    );

    h.set_price(1_700);
    assert!(h.ratio(id) < 130);
    let total_before = h.engine.total_borrowed();
    let q = h.engine.liquidate_vault(&keeper, id).unwrap();

    assert!(!q.capped);
    assert!(h.ratio(id) >= 130);
    assert_eq!(h.engine.total_borrowed(), total_before - q.cost);
    assert_eq!(
        h.engine.debt_asset().balance_of(&keeper),
        100_000 * ONE - q.cost
    );
    assert!(matches!(
        h.engine.events().last(),
        Some(Event::VaultLiquidated { .. })
    ));
}

#[test]
fn test_underwater_liquidation_is_capped() {
    let mut h = Harness::with_defaults(2_000);
    let alice = h.user("alice", 10 * ONE);
    let keeper = h.liquidator("keeper", 100_000 * ONE);
    let id = h.open(&alice, 10 * ONE, 14_000 * ONE).unwrap();

    // $1,000 collateral price: $10,000 backing $14,000 of debt
    h.set_price(1_000);
    let q = h.engine.liquidate_vault(&keeper, id).unwrap();

    assert!(q.capped);
    assert_eq!(q.extract, 10 * ONE);
    assert_eq!(h.engine.vault_collateral(id).unwrap(), 0);
    assert!(h.engine.vault_debt(id).unwrap() > 0);

    assert_eq!(
        h.engine.liquidate_vault(&keeper, id),
        Err(EngineError::InsufficientVaultCollateral(id))
    );
}

#[test]
fn test_liquidator_needs_balance() {
    let mut h = Harness::with_defaults(2_000);
    let alice = h.user("alice", 10 * ONE);
    let poor = h.liquidator("poor", ONE);
    let id = h.open(&alice, 10 * ONE, 14_000 * ONE).unwrap();
    h.set_price(1_700);

    let cost = h.engine.check_cost(id).unwrap();
    assert_eq!(
        h.engine.liquidate_vault(&poor, id),
        Err(EngineError::InsufficientLiquidatorBalance { balance: ONE, cost })
    );
}

#[test]
fn test_closing_fee_goes_to_treasury() {
    let mut h = Harness::with_defaults(2_000);
    let owner = h.owner;
    let alice = h.user("alice", 10 * ONE);
    let treasury = h.open(&owner, 0, 0).unwrap();
    h.engine.set_treasury(&owner, treasury).unwrap();

    let id = h.open(&alice, 10 * ONE, 2_000 * ONE).unwrap();
    let preview = h.engine.closing_fee_for(2_000 * ONE).unwrap();
    let fee = h.engine.pay_back_token(&alice, id, 2_000 * ONE).unwrap();

    // 2000 * $1 * 0.5% / $2000
    assert_eq!(fee, ONE / 200);
    assert_eq!(fee, preview);
    assert_eq!(h.engine.vault_collateral(treasury).unwrap(), fee);
    assert_eq!(h.engine.vault_collateral(id).unwrap(), 10 * ONE - fee);

    // a destroyed treasury no longer collects
    h.engine.destroy_vault(&owner, treasury).unwrap();
    h.engine.borrow_token(&alice, id, 1_000 * ONE).unwrap();
    assert_eq!(h.engine.pay_back_token(&alice, id, 1_000 * ONE).unwrap(), 0);
}

#[test]
fn test_token_price_source_moves_ratio() {
    let mut h = Harness::with_defaults(2_000);
    let alice = h.user("alice", 10 * ONE);
    let id = h.open(&alice, 10 * ONE, 10_000 * ONE).unwrap();
    assert_eq!(h.ratio(id), 200);

    let owner = h.owner;
    let depeg = vault_engine::memory::FixedPrice::new(125 * USD / 100, 8);
    h.engine
        .set_token_price_source(&owner, Some(Box::new(depeg)))
        .unwrap();
    assert_eq!(h.ratio(id), 160);
}

#[test]
fn test_failed_transfer_changes_nothing() {
    let mut h = Harness::with_defaults(2_000);
    let alice = h.user("alice", 10 * ONE);
    let keeper = h.liquidator("keeper", 100_000 * ONE);
    let id = h.open(&alice, 10 * ONE, 14_000 * ONE).unwrap();
    h.set_price(1_700);

    let state = h.engine.state().clone();
    let events = h.engine.events().len();

    h.engine.debt_asset_mut().set_rejecting(true);
    assert_eq!(
        h.engine.liquidate_vault(&keeper, id),
        Err(EngineError::TransferFailed(TransferError::Rejected))
    );
    assert_eq!(h.engine.state(), &state);
    assert_eq!(h.engine.claimable(&keeper), 0);
    assert_eq!(h.engine.events().len(), events);
    assert!(h.engine.audit().ok());
}

#[test]
fn test_halted_oracle_blocks_price_dependent_operations() {
    let mut h = Harness::with_defaults(2_000);
    let alice = h.user("alice", 10 * ONE);
    let id = h.open(&alice, 10 * ONE, 1_000 * ONE).unwrap();

    h.feed.set_halted(true);
    assert!(matches!(
        h.engine.borrow_token(&alice, id, ONE),
        Err(EngineError::OracleUnavailable(_))
    ));
    assert!(matches!(
        h.engine.check_liquidation(id),
        Err(EngineError::OracleUnavailable(_))
    ));
    // deposits do not read prices
    h.engine.deposit_collateral(&alice, id, 0).unwrap();

    h.set_price(0);
    h.feed.set_halted(false);
    assert_eq!(
        h.engine.withdraw_collateral(&alice, id, ONE),
        Err(EngineError::InvalidPrice("collateral price is zero"))
    );
}

#[test]
fn test_vault_transfer_follows_registry() {
    let mut h = Harness::with_defaults(2_000);
    let alice = h.user("alice", 10 * ONE);
    let bob = h.user("bob", 0);
    let id = h.open(&alice, 10 * ONE, 1_000 * ONE).unwrap();

    h.engine.transfer_vault(&alice, id, &bob).unwrap();
    assert_eq!(h.engine.owner_of(id), Some(bob));
    assert_eq!(h.engine.vault_balance_of(&alice), 0);
    assert_eq!(h.engine.vault_balance_of(&bob), 1);
    h.engine.withdraw_collateral(&bob, id, ONE).unwrap();
    assert_eq!(
        h.engine.withdraw_collateral(&alice, id, ONE),
        Err(EngineError::NotOwner)
    );
}

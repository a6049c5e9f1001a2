//! Property tests over random operation sequences

use proptest::prelude::*;
use vault_engine::invariants::{no_dust_debt, total_borrowed_consistent, total_collateral};
use vault_engine::{is_safe, Params};
use vault_integration_tests::{Harness, ONE};

#[derive(Debug, Clone)]
enum Op {
    Deposit(usize, u128),
    Withdraw(usize, u128),
    Borrow(usize, u128),
    Repay(usize, u128),
    Price(u128),
    Liquidate(usize),
    Claim,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize..3, 0u128..5).prop_map(|(v, a)| Op::Deposit(v, a * ONE)),
        (0usize..3, 0u128..5).prop_map(|(v, a)| Op::Withdraw(v, a * ONE)),
        (0usize..3, 1u128..8_000).prop_map(|(v, a)| Op::Borrow(v, a * ONE)),
        (0usize..3, 1u128..8_000).prop_map(|(v, a)| Op::Repay(v, a * ONE)),
        (500u128..3_000).prop_map(Op::Price),
        (0usize..3).prop_map(Op::Liquidate),
        Just(Op::Claim),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_ledger_invariants_hold(ops in prop::collection::vec(op(), 1..40)) {
        let params = Params { min_debt: 100 * ONE, ..Params::default() };
        let mut h = Harness::new(params.clone(), 2_000);
        let users: Vec<_> = ["alice", "bob", "carol"]
            .iter()
            .map(|name| h.user(name, 50 * ONE))
            .collect();
        let keeper = h.liquidator("keeper", 1_000_000 * ONE);
        let ids: Vec<_> = users
            .iter()
            .map(|u| h.open(u, 5 * ONE, 0).unwrap())
            .collect();

        for op in ops {
            let before = h.engine.state().clone();
            let result = match op {
                Op::Deposit(i, a) => h.engine.deposit_collateral(&users[i], ids[i], a),
                Op::Withdraw(i, a) => h.engine.withdraw_collateral(&users[i], ids[i], a),
                Op::Borrow(i, a) => {
                    let r = h.engine.borrow_token(&users[i], ids[i], a);
                    if r.is_ok() {
                        let ratio = h.ratio(ids[i]);
                        prop_assert!(is_safe(ratio, params.min_collateral_percentage));
                    }
                    r
                }
                Op::Repay(i, a) => h.engine.pay_back_token(&users[i], ids[i], a).map(|_| ()),
                Op::Price(usd) => {
                    h.set_price(usd);
                    Ok(())
                }
                Op::Liquidate(i) => h.engine.liquidate_vault(&keeper, ids[i]).map(|_| ()),
                Op::Claim => h.engine.get_paid(&keeper).map(|_| ()),
            };

            if result.is_err() {
                prop_assert_eq!(h.engine.state(), &before);
            }
            prop_assert!(total_borrowed_consistent(h.engine.state()));
            prop_assert!(h.engine.audit().ok());
        }
    }

    #[test]
    fn prop_ratio_moves_with_operations(
        collateral in 2u128..50,
        debt in 100u128..5_000,
        delta in 1u128..5,
        borrow in 1u128..500,
    ) {
        let mut h = Harness::with_defaults(2_000);
        let alice = h.user("alice", 100 * ONE);
        let id = h.open(&alice, collateral * ONE, 0).unwrap();
        if h.engine.borrow_token(&alice, id, debt * ONE).is_err() {
            return Ok(());
        }

        let r0 = h.ratio(id);
        h.engine.deposit_collateral(&alice, id, delta * ONE).unwrap();
        let r1 = h.ratio(id);
        prop_assert!(r1 >= r0);

        h.engine.pay_back_token(&alice, id, ONE).unwrap();
        let r2 = h.ratio(id);
        prop_assert!(r2 >= r1);

        if h.engine.borrow_token(&alice, id, borrow * ONE).is_ok() {
            prop_assert!(h.ratio(id) <= r2);
        }
        if h.engine.withdraw_collateral(&alice, id, delta * ONE).is_ok() {
            let r3 = h.ratio(id);
            prop_assert!(is_safe(r3, h.engine.params().min_collateral_percentage));
        }
    }

    #[test]
    fn prop_repay_with_treasury_routes_fee(
        collateral in 2u128..50,
        debt in 100u128..5_000,
        repay_pct in 1u128..=100,
        price in 1_500u128..3_000,
    ) {
        let mut h = Harness::with_defaults(2_000);
        let alice = h.user("alice", 100 * ONE);
        let bob = h.user("bob", ONE);
        let treasury = h.open(&bob, ONE, 0).unwrap();
        let owner = h.owner;
        h.engine.set_treasury(&owner, treasury).unwrap();

        let id = h.open(&alice, collateral * ONE, 0).unwrap();
        if h.engine.borrow_token(&alice, id, debt * ONE).is_err() {
            return Ok(());
        }
        h.set_price(price);

        let amount = debt * ONE * repay_pct / 100;
        let r0 = h.ratio(id);
        let held = total_collateral(h.engine.state());
        let treasury_before = h.engine.vault_collateral(treasury).unwrap();
        let vault_before = h.engine.vault_collateral(id).unwrap();

        let fee = h.engine.pay_back_token(&alice, id, amount).unwrap();
        prop_assert!(fee > 0);
        prop_assert!(h.ratio(id) >= r0);
        prop_assert_eq!(h.engine.vault_collateral(treasury).unwrap(), treasury_before + fee);
        prop_assert_eq!(h.engine.vault_collateral(id).unwrap(), vault_before - fee);
        prop_assert_eq!(total_collateral(h.engine.state()), held);
        prop_assert!(h.engine.audit().ok());
    }

    #[test]
    fn prop_liquidation_restores_safety(
        debt in 1_000u128..14_000,
        crash in 1_000u128..1_999,
    ) {
        let mut h = Harness::with_defaults(2_000);
        let alice = h.user("alice", 10 * ONE);
        let keeper = h.liquidator("keeper", 1_000_000 * ONE);
        let id = h.open(&alice, 10 * ONE, debt * ONE).unwrap();

        h.set_price(crash);
        if !h.engine.check_liquidation(id).unwrap() {
            return Ok(());
        }
        let collateral = h.engine.vault_collateral(id).unwrap();
        let q = h.engine.liquidate_vault(&keeper, id).unwrap();
        prop_assert!(q.extract <= collateral);
        if !q.capped {
            prop_assert!(!h.engine.check_liquidation(id).unwrap());
        }
        prop_assert!(no_dust_debt(h.engine.state(), h.engine.params()));
    }
}

//! Property-based invariant checks over random operation sequences.
//!
//! Invariants verified after every step, whether the step succeeded or not:
//! - Escrow supply equals the liquid asset held by custody
//! - Per account, locked entries sum to the redeeming counter
//! - Per account, the plugin allocation equals the allocated counter
//! - Custody's escrow balance equals all allocated plus redeeming escrow
//! - Combined escrow holdings equal the escrow supply

use proptest::prelude::*;
use vesta_core::traits::LiquidAsset;
use vesta_core::types::{Address, Amount};
use vesta_tests::helpers::*;

#[derive(Clone, Debug)]
enum Op {
    Convert { who: usize, amount: Amount },
    Approve { who: usize, amount: Amount },
    Allocate { who: usize, amount: Amount },
    Deallocate { who: usize, amount: Amount },
    Redeem { who: usize, amount: Amount, days: u64 },
    Finalize { who: usize, index: usize },
    Cancel { who: usize, index: usize },
    Advance { days: u64 },
}

const ACCOUNTS: [Address; 3] = [ALICE, BOB, Address([0x03; 20])];

fn op_strategy() -> impl Strategy<Value = Op> {
    let who = 0..ACCOUNTS.len();
    prop_oneof![
        (who.clone(), 1u128..10_000).prop_map(|(who, amount)| Op::Convert { who, amount }),
        (who.clone(), 0u128..10_000).prop_map(|(who, amount)| Op::Approve { who, amount }),
        (who.clone(), 1u128..5_000).prop_map(|(who, amount)| Op::Allocate { who, amount }),
        (who.clone(), 1u128..5_000).prop_map(|(who, amount)| Op::Deallocate { who, amount }),
        (who.clone(), 1u128..5_000, 10u64..120)
            .prop_map(|(who, amount, days)| Op::Redeem { who, amount, days }),
        (who.clone(), 0usize..4).prop_map(|(who, index)| Op::Finalize { who, index }),
        (who, 0usize..4).prop_map(|(who, index)| Op::Cancel { who, index }),
        (0u64..60).prop_map(|days| Op::Advance { days }),
    ]
}

fn apply(h: &Harness, op: &Op) {
    // Failures are expected and ignored; only the invariants matter.
    let _ = match *op {
        Op::Convert { who, amount } => {
            h.fund(ACCOUNTS[who], amount);
            h.engine.convert(ACCOUNTS[who], amount)
        }
        Op::Approve { who, amount } => h.engine.approve_usage(ACCOUNTS[who], USAGE, amount),
        Op::Allocate { who, amount } => h.engine.allocate(ACCOUNTS[who], USAGE, amount, &[]),
        Op::Deallocate { who, amount } => h.engine.deallocate(ACCOUNTS[who], USAGE, amount, &[]),
        Op::Redeem { who, amount, days } => h
            .engine
            .redeem(ACCOUNTS[who], amount, days * DAY)
            .map(|_| ()),
        Op::Finalize { who, index } => h.engine.finalize_redeem(ACCOUNTS[who], index),
        Op::Cancel { who, index } => h.engine.cancel_redeem(ACCOUNTS[who], index),
        Op::Advance { days } => {
            h.advance_days(days);
            Ok(())
        }
    };
}

fn check_invariants(h: &Harness) -> Result<(), TestCaseError> {
    prop_assert!(h.reconciled(), "escrow supply not backed by custody");

    let mut custodied: Amount = 0;
    let mut holdings: Amount = 0;
    for account in &ACCOUNTS {
        let counters = h.engine.escrow_balance(account);
        let locked: Amount = h
            .engine
            .redeem_entries(account)
            .iter()
            .map(|e| e.locked_amount)
            .sum();
        prop_assert_eq!(locked, counters.redeeming_amount);
        prop_assert_eq!(h.engine.usage_allocation(account, &USAGE), counters.allocated_amount);
        custodied += counters.allocated_amount + counters.redeeming_amount;
        holdings += h.engine.total_holdings(account);
    }
    prop_assert_eq!(h.engine.balance_of(&CUSTODY), custodied);
    prop_assert_eq!(holdings, h.engine.total_supply());

    // Compensation grants track pending entries exactly.
    for account in &ACCOUNTS {
        let granted: Amount = h
            .engine
            .redeem_entries(account)
            .iter()
            .map(|e| e.compensation_amount)
            .sum();
        prop_assert_eq!(h.dividends.net(account), granted as i128);
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn invariants_hold_under_random_operations(
        ops in prop::collection::vec(op_strategy(), 1..60),
        fee_bps in 0u16..=200,
    ) {
        let h = Harness::new();
        h.engine.update_deallocation_fee(OWNER, USAGE, fee_bps).unwrap();
        for op in &ops {
            apply(&h, op);
            check_invariants(&h)?;
        }
    }

    #[test]
    fn cancel_is_exact_inverse_of_redeem(
        amount in 1u128..1_000_000,
        days in 15u64..=200,
    ) {
        let h = Harness::new();
        h.convert(ALICE, amount);
        let supply = h.engine.total_supply();

        h.engine.redeem(ALICE, amount, days * DAY).unwrap();
        h.engine.cancel_redeem(ALICE, 0).unwrap();

        prop_assert_eq!(h.engine.balance_of(&ALICE), amount);
        prop_assert_eq!(h.engine.total_supply(), supply);
        prop_assert_eq!(h.dividends.net(&ALICE), 0);
    }

    #[test]
    fn finalize_shrinks_supplies_by_burnt_excess(
        amount in 1u128..1_000_000,
        days in 15u64..=200,
    ) {
        let h = Harness::new();
        h.convert(ALICE, amount);
        h.engine.redeem(ALICE, amount, days * DAY).unwrap();
        let payout = h.engine.redeem_entry(&ALICE, 0).unwrap().payout_amount;

        h.advance_days(days);
        h.engine.finalize_redeem(ALICE, 0).unwrap();

        prop_assert_eq!(h.liquid.total_supply(), payout);
        prop_assert_eq!(h.liquid.balance_of(&ALICE), payout);
        prop_assert_eq!(h.engine.total_supply(), 0);
        prop_assert!(h.reconciled());
    }
}

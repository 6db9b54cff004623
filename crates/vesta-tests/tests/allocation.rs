//! Usage delegation: approve, allocate, deallocate, fees.

use vesta_core::error::{AuthorizationError, EscrowError, ValidationError};
use vesta_core::events::EscrowEvent;
use vesta_core::traits::LiquidAsset;
use vesta_tests::helpers::*;

#[test]
fn allocate_moves_escrow_into_custody_and_notifies_plugin() {
    let h = Harness::new();
    h.convert(ALICE, 1_000);

    h.engine.approve_usage(ALICE, USAGE, 400).unwrap();
    h.engine.allocate(ALICE, USAGE, 300, b"pool-7").unwrap();

    assert_eq!(h.engine.balance_of(&ALICE), 700);
    assert_eq!(h.engine.balance_of(&CUSTODY), 300);
    assert_eq!(h.engine.escrow_balance(&ALICE).allocated_amount, 300);
    assert_eq!(h.engine.total_holdings(&ALICE), 1_000);
    assert_eq!(h.engine.usage_approval(&ALICE, &USAGE), 100);
    assert_eq!(h.engine.usage_allocation(&ALICE, &USAGE), 300);
    assert_eq!(
        h.usage.calls(),
        vec![PluginCall::Allocate {
            owner: ALICE,
            amount: 300,
            data: b"pool-7".to_vec(),
        }]
    );
    assert_eq!(
        h.engine.events().last(),
        Some(&EscrowEvent::Allocate {
            owner: ALICE,
            plugin: USAGE,
            amount: 300,
        })
    );
    assert!(h.reconciled());
}

#[test]
fn approval_is_overwritten_not_accumulated() {
    let h = Harness::new();
    h.engine.approve_usage(ALICE, USAGE, 100).unwrap();
    h.engine.approve_usage(ALICE, USAGE, 30).unwrap();
    assert_eq!(h.engine.usage_approval(&ALICE, &USAGE), 30);
}

#[test]
fn zero_approval_blocks_allocation() {
    let h = Harness::new();
    h.convert(ALICE, 100);
    h.engine.approve_usage(ALICE, USAGE, 50).unwrap();
    h.engine.approve_usage(ALICE, USAGE, 0).unwrap();

    assert_eq!(
        h.engine.allocate(ALICE, USAGE, 10, &[]),
        Err(AuthorizationError::InsufficientApproval { have: 0, need: 10 }.into())
    );
    assert!(h.usage.calls().is_empty());
}

#[test]
fn allocate_rejects_zero_and_unknown_plugin() {
    let h = Harness::new();
    h.convert(ALICE, 100);
    h.engine.approve_usage(ALICE, USAGE, 100).unwrap();

    assert_eq!(
        h.engine.allocate(ALICE, USAGE, 0, &[]),
        Err(ValidationError::ZeroAmount.into())
    );
    let stranger = addr(0x77);
    assert_eq!(
        h.engine.allocate(ALICE, stranger, 10, &[]),
        Err(ValidationError::UnknownPlugin(stranger).into())
    );
}

#[test]
fn allocate_beyond_balance_fails_without_side_effects() {
    let h = Harness::new();
    h.convert(ALICE, 100);
    h.engine.approve_usage(ALICE, USAGE, 500).unwrap();
    let events_before = h.engine.events().len();

    assert_eq!(
        h.engine.allocate(ALICE, USAGE, 200, &[]),
        Err(ValidationError::InsufficientBalance { have: 100, need: 200 }.into())
    );
    assert_eq!(h.engine.usage_approval(&ALICE, &USAGE), 500);
    assert_eq!(h.engine.escrow_balance(&ALICE).allocated_amount, 0);
    assert_eq!(h.engine.events().len(), events_before);
}

#[test]
fn deallocate_without_fee_returns_everything() {
    let h = Harness::new();
    h.convert(ALICE, 100);
    h.engine.approve_usage(ALICE, USAGE, 100).unwrap();
    h.engine.allocate(ALICE, USAGE, 100, &[]).unwrap();

    h.engine.deallocate(ALICE, USAGE, 60, &[9]).unwrap();
    assert_eq!(h.engine.balance_of(&ALICE), 60);
    assert_eq!(h.engine.usage_allocation(&ALICE, &USAGE), 40);
    assert_eq!(h.engine.escrow_balance(&ALICE).allocated_amount, 40);
    // Approval is consumed by allocation and not restored by deallocation.
    assert_eq!(h.engine.usage_approval(&ALICE, &USAGE), 0);
    assert_eq!(h.usage.net(&ALICE), 40);
    assert!(h.reconciled());
}

#[test]
fn deallocation_fee_burns_from_both_supplies() {
    let h = Harness::new();
    h.engine.update_deallocation_fee(OWNER, USAGE, 200).unwrap();
    h.convert(ALICE, 100);
    h.engine.approve_usage(ALICE, USAGE, 100).unwrap();
    h.engine.allocate(ALICE, USAGE, 100, &[]).unwrap();

    h.engine.deallocate(ALICE, USAGE, 100, &[]).unwrap();

    assert_eq!(h.engine.balance_of(&ALICE), 98);
    assert_eq!(h.engine.total_supply(), 98);
    assert_eq!(h.liquid.total_supply(), 98);
    assert_eq!(h.liquid.balance_of(&CUSTODY), 98);
    assert_eq!(h.engine.escrow_balance(&ALICE).allocated_amount, 0);
    assert_eq!(
        h.engine.events().last(),
        Some(&EscrowEvent::Deallocate {
            owner: ALICE,
            plugin: USAGE,
            amount: 100,
            fee: 2,
        })
    );
    assert!(h.reconciled());
}

#[test]
fn small_deallocation_rounds_fee_down() {
    let h = Harness::new();
    h.engine.update_deallocation_fee(OWNER, USAGE, 200).unwrap();
    h.convert(ALICE, 49);
    h.engine.approve_usage(ALICE, USAGE, 49).unwrap();
    h.engine.allocate(ALICE, USAGE, 49, &[]).unwrap();
    h.engine.deallocate(ALICE, USAGE, 49, &[]).unwrap();
    assert_eq!(h.engine.balance_of(&ALICE), 49);
    assert_eq!(h.liquid.total_supply(), 49);
}

#[test]
fn deallocate_beyond_allocation_fails() {
    let h = Harness::new();
    h.convert(ALICE, 100);
    h.engine.approve_usage(ALICE, USAGE, 100).unwrap();
    h.engine.allocate(ALICE, USAGE, 30, &[]).unwrap();

    assert_eq!(
        h.engine.deallocate(ALICE, USAGE, 31, &[]),
        Err(AuthorizationError::InsufficientAllocation { have: 30, need: 31 }.into())
    );
    assert_eq!(
        h.engine.deallocate(ALICE, USAGE, 0, &[]),
        Err(ValidationError::ZeroAmount.into())
    );
}

#[test]
fn plugin_driven_paths_skip_callbacks() {
    let h = Harness::new();
    h.engine.update_deallocation_fee(OWNER, USAGE, 100).unwrap();
    h.convert(ALICE, 1_000);
    h.engine.approve_usage(ALICE, USAGE, 1_000).unwrap();

    h.engine.allocate_from_usage(USAGE, ALICE, 500).unwrap();
    assert_eq!(h.engine.usage_allocation(&ALICE, &USAGE), 500);
    assert_eq!(h.engine.balance_of(&ALICE), 500);

    h.engine.deallocate_from_usage(USAGE, ALICE, 500).unwrap();
    // 1% of 500 is burnt.
    assert_eq!(h.engine.balance_of(&ALICE), 995);
    assert_eq!(h.engine.total_supply(), 995);
    assert!(h.usage.calls().is_empty());
    assert!(h.reconciled());
}

#[test]
fn plugin_driven_allocation_still_needs_approval() {
    let h = Harness::new();
    h.convert(ALICE, 100);
    let err = h.engine.allocate_from_usage(USAGE, ALICE, 10).unwrap_err();
    assert!(matches!(
        err,
        EscrowError::Authorization(AuthorizationError::InsufficientApproval { .. })
    ));
}

#[test]
fn allocations_are_tracked_per_plugin() {
    let h = Harness::new();
    h.convert(ALICE, 1_000);
    h.engine.approve_usage(ALICE, USAGE, 200).unwrap();
    h.engine.approve_usage(ALICE, DIVIDENDS, 300).unwrap();
    h.engine.allocate(ALICE, USAGE, 200, &[]).unwrap();
    h.engine.allocate(ALICE, DIVIDENDS, 300, &[]).unwrap();

    assert_eq!(h.engine.escrow_balance(&ALICE).allocated_amount, 500);
    assert_eq!(
        h.engine.deallocate(ALICE, USAGE, 250, &[]),
        Err(AuthorizationError::InsufficientAllocation { have: 200, need: 250 }.into())
    );
}

#[test]
fn event_log_serializes_as_tagged_json() {
    let h = Harness::new();
    h.convert(ALICE, 100);
    h.engine.approve_usage(ALICE, USAGE, 100).unwrap();

    let json = serde_json::to_value(h.engine.events()).unwrap();
    assert_eq!(json[0]["event"], "convert");
    assert_eq!(json[0]["to"], ALICE.to_string());
    assert_eq!(json[1]["event"], "approve_usage");
    assert_eq!(json[1]["plugin"], USAGE.to_string());
    assert_eq!(json[1]["amount"], 100);
}

//! Usage delegation: approve → allocate → deallocate.
//!
//! Owner-initiated paths notify the plugin through its callback; the
//! role-reversed `*_from_usage` paths are driven by the plugin itself and
//! only do the bookkeeping.

use tracing::debug;
use vesta_core::curve::deallocation_fee;
use vesta_core::error::{EscrowError, ValidationError};
use vesta_core::events::EscrowEvent;
use vesta_core::types::{Address, Amount};

use crate::engine::EscrowEngine;
use crate::txn::{Effect, Txn};

impl EscrowEngine {
    /// Set `owner`'s usage approval for `plugin` to exactly `amount`.
    pub fn approve_usage(&self, owner: Address, plugin: Address, amount: Amount) -> Result<(), EscrowError> {
        self.transact("approve_usage", |txn| {
            if plugin.is_zero() {
                return Err(ValidationError::NullAddress.into());
            }
            txn.state.usage.approve(owner, plugin, amount);
            txn.emit(EscrowEvent::ApproveUsage { owner, plugin, amount });
            Ok(())
        })
    }

    /// Delegate `amount` of `owner`'s escrow to `plugin`, then invoke the
    /// plugin's `allocate` callback with `data`.
    pub fn allocate(&self, owner: Address, plugin: Address, amount: Amount, data: &[u8]) -> Result<(), EscrowError> {
        self.transact("allocate", |txn| {
            self.require_plugin(&plugin)?;
            stage_allocate(txn, owner, plugin, amount)?;
            txn.push_effect(Effect::PluginAllocate {
                plugin,
                owner,
                amount,
                data: data.to_vec(),
            });
            Ok(())
        })
    }

    /// Plugin-driven allocation: `plugin` draws on `owner`'s approval.
    pub fn allocate_from_usage(&self, plugin: Address, owner: Address, amount: Amount) -> Result<(), EscrowError> {
        self.transact("allocate_from_usage", |txn| stage_allocate(txn, owner, plugin, amount))
    }

    /// Withdraw `amount` from `plugin`, returning it minus the plugin's
    /// deallocation fee, then invoke the plugin's `deallocate` callback.
    pub fn deallocate(&self, owner: Address, plugin: Address, amount: Amount, data: &[u8]) -> Result<(), EscrowError> {
        self.transact("deallocate", |txn| {
            self.require_plugin(&plugin)?;
            stage_deallocate(txn, owner, plugin, amount)?;
            txn.push_effect(Effect::PluginDeallocate {
                plugin,
                owner,
                amount,
                data: data.to_vec(),
            });
            Ok(())
        })
    }

    /// Plugin-driven deallocation. The fee still applies.
    pub fn deallocate_from_usage(&self, plugin: Address, owner: Address, amount: Amount) -> Result<(), EscrowError> {
        self.transact("deallocate_from_usage", |txn| stage_deallocate(txn, owner, plugin, amount))
    }
}

fn stage_allocate(txn: &mut Txn, owner: Address, plugin: Address, amount: Amount) -> Result<(), EscrowError> {
    if amount == 0 {
        return Err(ValidationError::ZeroAmount.into());
    }
    txn.state.usage.draw(owner, plugin, amount)?;
    txn.state.ledger.add_allocated(owner, amount)?;
    let custody = txn.state.gate.custody();
    txn.state.ledger.transfer(&txn.state.gate, owner, custody, amount)?;

    debug!(%owner, %plugin, amount, "staged allocation");
    txn.emit(EscrowEvent::Allocate { owner, plugin, amount });
    Ok(())
}

fn stage_deallocate(txn: &mut Txn, owner: Address, plugin: Address, amount: Amount) -> Result<(), EscrowError> {
    if amount == 0 {
        return Err(ValidationError::ZeroAmount.into());
    }
    txn.state.usage.release(owner, plugin, amount)?;
    txn.state.ledger.sub_allocated(owner, amount)?;

    let fee = deallocation_fee(amount, txn.state.fee_bps(&plugin))?;
    let custody = txn.state.gate.custody();
    txn.state.ledger.transfer(&txn.state.gate, custody, owner, amount - fee)?;
    if fee > 0 {
        txn.state.ledger.burn(&txn.state.gate, custody, fee)?;
        txn.push_effect(Effect::BurnLiquid { amount: fee });
    }

    debug!(%owner, %plugin, amount, fee, "staged deallocation");
    txn.emit(EscrowEvent::Deallocate {
        owner,
        plugin,
        amount,
        fee,
    });
    Ok(())
}

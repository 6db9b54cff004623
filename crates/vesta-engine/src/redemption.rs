//! Redemption vesting: escrow back into the liquid asset.
//!
//! A redemption locks escrow in custody for a chosen duration; the payout
//! follows the ratio curve in [`vesta_core::curve`]. Finalizing after
//! maturity pays the payout, burns the unvested remainder of the liquid
//! asset and all of the locked escrow. Cancelling returns the escrow.

use tracing::debug;
use vesta_core::curve::payout_for_duration;
use vesta_core::error::{EscrowError, StateError, ValidationError};
use vesta_core::events::EscrowEvent;
use vesta_core::types::{Address, Amount, RedeemEntry};

use crate::compensation::{stage_compensation_grant, stage_compensation_release};
use crate::engine::EscrowEngine;
use crate::txn::{Effect, Txn};

impl EscrowEngine {
    /// Lock `amount` of `owner`'s escrow for `duration` seconds.
    ///
    /// Returns the index of the new redemption entry, or `None` when a zero
    /// duration finalized the redemption immediately.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::ZeroAmount`] if `amount` is zero
    /// - [`ValidationError::DurationTooShort`] below the minimum duration
    /// - [`ValidationError::InsufficientBalance`] if the spendable balance is short
    pub fn redeem(&self, owner: Address, amount: Amount, duration: u64) -> Result<Option<usize>, EscrowError> {
        self.transact("redeem", |txn| {
            if amount == 0 {
                return Err(ValidationError::ZeroAmount.into());
            }
            let settings = txn.state.settings;
            if duration < settings.min_redeem_duration {
                return Err(ValidationError::DurationTooShort {
                    duration,
                    min: settings.min_redeem_duration,
                }
                .into());
            }

            let custody = txn.state.gate.custody();
            txn.state.ledger.transfer(&txn.state.gate, owner, custody, amount)?;
            let payout = payout_for_duration(&settings, amount, duration)?;

            if duration == 0 {
                debug!(%owner, amount, payout, "zero-duration redemption finalizes at once");
                txn.emit(EscrowEvent::Redeem {
                    owner,
                    escrow_amount: amount,
                    payout_amount: payout,
                    duration,
                });
                stage_finalize(txn, owner, amount, payout)?;
                return Ok(None);
            }

            txn.state.ledger.add_redeeming(owner, amount)?;
            let (compensation_plugin, compensation_amount) = stage_compensation_grant(txn, owner, amount)?;
            let maturity_time = txn
                .now
                .checked_add(duration)
                .ok_or(ValidationError::ArithmeticOverflow)?;
            let index = txn.state.redeems.push(
                owner,
                RedeemEntry {
                    payout_amount: payout,
                    locked_amount: amount,
                    maturity_time,
                    compensation_plugin,
                    compensation_amount,
                },
            );

            debug!(%owner, amount, payout, duration, index, "staged redemption");
            txn.emit(EscrowEvent::Redeem {
                owner,
                escrow_amount: amount,
                payout_amount: payout,
                duration,
            });
            Ok(Some(index))
        })
    }

    /// Complete a matured redemption.
    ///
    /// Removing the entry moves the last entry into `index`.
    pub fn finalize_redeem(&self, owner: Address, index: usize) -> Result<(), EscrowError> {
        self.transact("finalize_redeem", |txn| {
            let entry = *txn.state.redeems.get(&owner, index)?;
            if txn.now < entry.maturity_time {
                return Err(StateError::NotMatured {
                    now: txn.now,
                    maturity: entry.maturity_time,
                }
                .into());
            }

            txn.state.ledger.sub_redeeming(owner, entry.locked_amount)?;
            stage_finalize(txn, owner, entry.locked_amount, entry.payout_amount)?;
            stage_compensation_release(txn, owner, &entry);
            txn.state.redeems.swap_remove(&owner, index)?;
            Ok(())
        })
    }

    /// Abandon a pending redemption and get the locked escrow back.
    ///
    /// Allowed at any time before finalization. Removing the entry moves the
    /// last entry into `index`.
    pub fn cancel_redeem(&self, owner: Address, index: usize) -> Result<(), EscrowError> {
        self.transact("cancel_redeem", |txn| {
            let entry = *txn.state.redeems.get(&owner, index)?;

            txn.state.ledger.sub_redeeming(owner, entry.locked_amount)?;
            let custody = txn.state.gate.custody();
            txn.state
                .ledger
                .transfer(&txn.state.gate, custody, owner, entry.locked_amount)?;
            stage_compensation_release(txn, owner, &entry);
            txn.state.redeems.swap_remove(&owner, index)?;

            debug!(%owner, index, locked = entry.locked_amount, "staged cancellation");
            txn.emit(EscrowEvent::CancelRedeem {
                owner,
                escrow_amount: entry.locked_amount,
            });
            Ok(())
        })
    }
}

/// Burn `locked` escrow from custody, pay `payout` liquid to `owner` and
/// burn the liquid remainder.
fn stage_finalize(txn: &mut Txn, owner: Address, locked: Amount, payout: Amount) -> Result<(), EscrowError> {
    let custody = txn.state.gate.custody();
    txn.state.ledger.burn(&txn.state.gate, custody, locked)?;
    if payout > 0 {
        txn.push_effect(Effect::PayLiquid { to: owner, amount: payout });
    }
    // Ratio is capped at 100, so payout <= locked.
    let excess = locked - payout;
    if excess > 0 {
        txn.push_effect(Effect::BurnLiquid { amount: excess });
    }

    debug!(%owner, locked, payout, excess, "staged finalization");
    txn.emit(EscrowEvent::FinalizeRedeem {
        owner,
        escrow_amount: locked,
        payout_amount: payout,
    });
    Ok(())
}

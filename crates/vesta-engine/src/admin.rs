//! Owner-gated parameter updates.

use tracing::debug;
use vesta_core::constants::MAX_DEALLOCATION_FEE_BPS;
use vesta_core::error::{AuthorizationError, ConfigurationError, EscrowError, ValidationError};
use vesta_core::events::EscrowEvent;
use vesta_core::types::{Address, RedeemSettings};

use crate::engine::EscrowEngine;
use crate::txn::Txn;

fn only_owner(txn: &Txn, caller: Address) -> Result<(), AuthorizationError> {
    if caller != txn.state.owner {
        return Err(AuthorizationError::NotOwner(caller));
    }
    Ok(())
}

impl EscrowEngine {
    /// Replace all five redemption parameters at once.
    ///
    /// # Errors
    ///
    /// - [`AuthorizationError::NotOwner`] for any caller but the owner
    /// - [`ConfigurationError`] for out-of-bounds settings
    pub fn update_redeem_settings(&self, caller: Address, settings: RedeemSettings) -> Result<(), EscrowError> {
        self.transact("update_redeem_settings", |txn| {
            only_owner(txn, caller)?;
            settings.validate()?;

            let previous = std::mem::replace(&mut txn.state.settings, settings);
            debug!(?previous, current = ?settings, "redeem settings updated");
            txn.emit(EscrowEvent::UpdateRedeemSettings {
                previous,
                current: settings,
            });
            Ok(())
        })
    }

    /// Set the plugin receiving compensation for new redemptions.
    ///
    /// Passing the zero address disables compensation and forces the
    /// adjustment to zero. Existing entries keep their stored plugin until
    /// migrated with `update_redeem_compensation_plugin`.
    pub fn update_compensation_plugin(&self, caller: Address, plugin: Address) -> Result<(), EscrowError> {
        self.transact("update_compensation_plugin", |txn| {
            only_owner(txn, caller)?;
            if !plugin.is_zero() {
                self.require_plugin(&plugin)?;
            }

            let previous = std::mem::replace(&mut txn.state.compensation_plugin, plugin);
            if plugin.is_zero() && txn.state.settings.compensation_adjustment > 0 {
                let previous_settings = txn.state.settings;
                txn.state.settings.compensation_adjustment = 0;
                txn.emit(EscrowEvent::UpdateRedeemSettings {
                    previous: previous_settings,
                    current: txn.state.settings,
                });
            }

            debug!(%previous, current = %plugin, "compensation plugin updated");
            txn.emit(EscrowEvent::UpdateCompensationPlugin {
                previous,
                current: plugin,
            });
            Ok(())
        })
    }

    /// Set the fee charged when escrow is deallocated from `plugin`.
    pub fn update_deallocation_fee(&self, caller: Address, plugin: Address, fee_bps: u16) -> Result<(), EscrowError> {
        self.transact("update_deallocation_fee", |txn| {
            only_owner(txn, caller)?;
            if fee_bps > MAX_DEALLOCATION_FEE_BPS {
                return Err(ConfigurationError::FeeTooHigh {
                    fee_bps,
                    max_bps: MAX_DEALLOCATION_FEE_BPS,
                }
                .into());
            }

            let previous_bps = if fee_bps == 0 {
                txn.state.deallocation_fees.remove(&plugin)
            } else {
                txn.state.deallocation_fees.insert(plugin, fee_bps)
            }
            .unwrap_or(0);

            debug!(%plugin, previous_bps, fee_bps, "deallocation fee updated");
            txn.emit(EscrowEvent::UpdateDeallocationFee {
                plugin,
                previous_bps,
                fee_bps,
            });
            Ok(())
        })
    }

    /// Add `account` to, or remove it from, the transfer allow-list.
    ///
    /// The custody address can never be removed.
    pub fn update_transfer_allowlist(&self, caller: Address, account: Address, allowed: bool) -> Result<(), EscrowError> {
        self.transact("update_transfer_allowlist", |txn| {
            only_owner(txn, caller)?;
            let changed = if allowed {
                txn.state.gate.allow(account)
            } else {
                txn.state.gate.disallow(&account)?
            };
            if !changed {
                debug!(%account, allowed, "transfer allow-list unchanged");
                return Ok(());
            }

            debug!(%account, allowed, "transfer allow-list updated");
            txn.emit(EscrowEvent::SetTransferAllowlist { account, allowed });
            Ok(())
        })
    }

    pub fn transfer_ownership(&self, caller: Address, new_owner: Address) -> Result<(), EscrowError> {
        self.transact("transfer_ownership", |txn| {
            only_owner(txn, caller)?;
            if new_owner.is_zero() {
                return Err(ValidationError::NullAddress.into());
            }

            let previous = std::mem::replace(&mut txn.state.owner, new_owner);
            debug!(%previous, current = %new_owner, "ownership transferred");
            txn.emit(EscrowEvent::OwnershipTransferred {
                previous,
                current: new_owner,
            });
            Ok(())
        })
    }
}

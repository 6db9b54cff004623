//! Compensation adapter.
//!
//! While a redemption vests, a share of it is granted to the compensation
//! plugin (typically a dividend distributor) so the owner keeps earning on
//! escrow that no longer sits in their balance. Grants are engine-internal
//! plugin calls: they bypass usage approvals, allocation counters and fees.

use tracing::debug;
use vesta_core::curve::compensation_for;
use vesta_core::error::EscrowError;
use vesta_core::events::EscrowEvent;
use vesta_core::types::{Address, Amount, RedeemEntry};

use crate::engine::EscrowEngine;
use crate::txn::{Effect, Txn};

/// Queue the compensation grant for a new redemption of `amount`.
///
/// Returns the plugin current at request time and the granted amount; the
/// pair is stored on the entry so the release later targets the same plugin.
pub(crate) fn stage_compensation_grant(
    txn: &mut Txn,
    owner: Address,
    amount: Amount,
) -> Result<(Address, Amount), EscrowError> {
    let plugin = txn.state.compensation_plugin;
    let compensation = compensation_for(amount, txn.state.settings.compensation_adjustment)?;
    if compensation > 0 {
        debug!(%owner, %plugin, compensation, "staged compensation grant");
        txn.push_effect(Effect::PluginAllocate {
            plugin,
            owner,
            amount: compensation,
            data: Vec::new(),
        });
    }
    Ok((plugin, compensation))
}

/// Queue the release of whatever compensation `entry` carries.
pub(crate) fn stage_compensation_release(txn: &mut Txn, owner: Address, entry: &RedeemEntry) {
    if entry.compensation_amount > 0 {
        debug!(
            %owner,
            plugin = %entry.compensation_plugin,
            compensation = entry.compensation_amount,
            "staged compensation release"
        );
        txn.push_effect(Effect::PluginDeallocate {
            plugin: entry.compensation_plugin,
            owner,
            amount: entry.compensation_amount,
            data: Vec::new(),
        });
    }
}

impl EscrowEngine {
    /// Move the compensation of `owner`'s entry `index` to the current
    /// compensation plugin.
    ///
    /// A no-op when the current plugin is null or already the entry's plugin.
    pub fn update_redeem_compensation_plugin(&self, owner: Address, index: usize) -> Result<(), EscrowError> {
        self.transact("update_redeem_compensation_plugin", |txn| {
            let current = txn.state.compensation_plugin;
            let entry = *txn.state.redeems.get(&owner, index)?;
            if current.is_zero() || current == entry.compensation_plugin {
                return Ok(());
            }

            stage_compensation_release(txn, owner, &entry);
            if entry.compensation_amount > 0 {
                txn.push_effect(Effect::PluginAllocate {
                    plugin: current,
                    owner,
                    amount: entry.compensation_amount,
                    data: Vec::new(),
                });
            }
            txn.state.redeems.get_mut(&owner, index)?.compensation_plugin = current;
            txn.emit(EscrowEvent::UpdateRedeemCompensationPlugin {
                owner,
                index,
                previous: entry.compensation_plugin,
                current,
            });
            Ok(())
        })
    }
}

//! Read-only queries. These never take the reentrancy guard, so plugins may
//! call them from inside their callbacks.

use vesta_core::curve;
use vesta_core::error::{StateError, ValidationError};
use vesta_core::types::{Address, Amount, EscrowBalance, RedeemEntry, RedeemSettings};

use crate::engine::EscrowEngine;

impl EscrowEngine {
    pub fn owner(&self) -> Address {
        self.state.read().owner
    }

    /// Address holding locked escrow and the liquid backing.
    pub fn custody(&self) -> Address {
        self.custody
    }

    /// Allocated and redeeming counters for `account`.
    pub fn escrow_balance(&self, account: &Address) -> EscrowBalance {
        self.state.read().ledger.escrow_balance(account)
    }

    /// Spendable escrow balance.
    pub fn balance_of(&self, account: &Address) -> Amount {
        self.state.read().ledger.balance_of(account)
    }

    /// Spendable balance plus allocated and redeeming escrow.
    pub fn total_holdings(&self, account: &Address) -> Amount {
        self.state.read().ledger.total_holdings(account)
    }

    pub fn total_supply(&self) -> Amount {
        self.state.read().ledger.total_supply()
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> Amount {
        self.state.read().ledger.allowance(owner, spender)
    }

    pub fn usage_approval(&self, owner: &Address, plugin: &Address) -> Amount {
        self.state.read().usage.approval(owner, plugin)
    }

    pub fn usage_allocation(&self, owner: &Address, plugin: &Address) -> Amount {
        self.state.read().usage.allocation(owner, plugin)
    }

    pub fn redeems_len(&self, account: &Address) -> usize {
        self.state.read().redeems.len(account)
    }

    /// Entry `index` of `account`. Indices shift when entries are removed.
    pub fn redeem_entry(&self, account: &Address, index: usize) -> Result<RedeemEntry, StateError> {
        self.state.read().redeems.get(account, index).copied()
    }

    pub fn redeem_entries(&self, account: &Address) -> Vec<RedeemEntry> {
        self.state.read().redeems.entries(account).to_vec()
    }

    pub fn is_transfer_allowlisted(&self, account: &Address) -> bool {
        self.state.read().gate.contains(account)
    }

    pub fn transfer_allowlist_len(&self) -> usize {
        self.state.read().gate.len()
    }

    pub fn transfer_allowlist_at(&self, index: usize) -> Option<Address> {
        self.state.read().gate.get(index)
    }

    /// Allow-list members in enumeration order.
    pub fn transfer_allowlist(&self) -> Vec<Address> {
        self.state.read().gate.iter().copied().collect()
    }

    /// Liquid payout a redemption of `amount` over `duration` would yield
    /// under the current settings.
    pub fn payout_for_duration(&self, amount: Amount, duration: u64) -> Result<Amount, ValidationError> {
        curve::payout_for_duration(&self.state.read().settings, amount, duration)
    }

    pub fn redeem_settings(&self) -> RedeemSettings {
        self.state.read().settings
    }

    /// `None` while compensation is disabled.
    pub fn compensation_plugin(&self) -> Option<Address> {
        let plugin = self.state.read().compensation_plugin;
        (!plugin.is_zero()).then_some(plugin)
    }

    /// Deallocation fee for `plugin` in basis points.
    pub fn deallocation_fee(&self, plugin: &Address) -> u16 {
        self.state.read().fee_bps(plugin)
    }
}

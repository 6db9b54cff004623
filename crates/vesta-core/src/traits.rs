//! Trait interfaces for the engine's external collaborators.
//!
//! - [`UsagePlugin`]: an owner-authorized consumer of escrowed balance
//! - [`LiquidAsset`]: the freely transferable asset backing the escrow token
//! - [`ContractDirectory`]: resolves addresses to contracts and plugins
//! - [`Clock`]: source of the current timestamp

use std::sync::Arc;

use crate::error::{AssetError, PluginError};
use crate::types::{Address, Amount, Timestamp};

/// Callback contract for usage plugins.
///
/// The engine invokes these after it has moved escrow into (or out of)
/// custody on the owner's behalf. A plugin may also drive the engine itself
/// through the role-reversed `allocate_from_usage` / `deallocate_from_usage`
/// entry points, in which case no callback is issued.
///
/// Returning an error aborts the whole engine operation.
pub trait UsagePlugin: Send + Sync {
    /// `amount` of `owner`'s escrow has been delegated to this plugin.
    fn allocate(&self, owner: Address, amount: Amount, data: &[u8]) -> Result<(), PluginError>;

    /// `amount` of `owner`'s escrow is no longer delegated to this plugin.
    fn deallocate(&self, owner: Address, amount: Amount, data: &[u8]) -> Result<(), PluginError>;
}

/// Standard fungible-token operations on the liquid asset.
///
/// The engine trusts implementations to be non-reentrant and to report
/// honest balances.
pub trait LiquidAsset: Send + Sync {
    fn balance_of(&self, account: &Address) -> Amount;

    fn total_supply(&self) -> Amount;

    fn allowance(&self, owner: &Address, spender: &Address) -> Amount;

    fn approve(&self, owner: Address, spender: Address, amount: Amount) -> Result<(), AssetError>;

    fn transfer(&self, from: Address, to: Address, amount: Amount) -> Result<(), AssetError>;

    /// Move `amount` from `from` to `to` on the authority of `spender`'s allowance.
    fn transfer_from(
        &self,
        spender: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), AssetError>;

    /// Destroy `amount` held by `holder`, shrinking total supply.
    fn burn(&self, holder: Address, amount: Amount) -> Result<(), AssetError>;
}

/// Knowledge of which addresses hold code, and which implement [`UsagePlugin`].
pub trait ContractDirectory: Send + Sync {
    /// Whether `address` is a contract rather than a plain account.
    fn is_contract(&self, address: &Address) -> bool;

    /// Resolve `address` to its plugin implementation, if it is one.
    fn usage_plugin(&self, address: &Address) -> Option<Arc<dyn UsagePlugin>>;
}

/// Source of the current time in seconds.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

//! Usage approvals and allocations between owners and plugins.
//!
//! An approval is a ceiling the owner grants a plugin; each allocation draws
//! it down. Approvals are overwritten, never accumulated.

use std::collections::HashMap;

use crate::error::{AuthorizationError, EscrowError, ValidationError};
use crate::types::{Address, Amount};

#[derive(Clone, Debug, Default)]
pub struct UsageBook {
    /// (owner, plugin) → remaining approved ceiling.
    approvals: HashMap<(Address, Address), Amount>,
    /// (owner, plugin) → currently delegated amount.
    allocations: HashMap<(Address, Address), Amount>,
}

impl UsageBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn approval(&self, owner: &Address, plugin: &Address) -> Amount {
        self.approvals.get(&(*owner, *plugin)).copied().unwrap_or(0)
    }

    pub fn allocation(&self, owner: &Address, plugin: &Address) -> Amount {
        self.allocations.get(&(*owner, *plugin)).copied().unwrap_or(0)
    }

    /// Set the approval for `(owner, plugin)` to exactly `amount`.
    pub fn approve(&mut self, owner: Address, plugin: Address, amount: Amount) {
        set_or_clear(&mut self.approvals, (owner, plugin), amount);
    }

    /// Draw `amount` from the approval and add it to the allocation.
    pub fn draw(&mut self, owner: Address, plugin: Address, amount: Amount) -> Result<(), EscrowError> {
        let approved = self.approval(&owner, &plugin);
        if approved < amount {
            return Err(AuthorizationError::InsufficientApproval {
                have: approved,
                need: amount,
            }
            .into());
        }
        let allocated = self
            .allocation(&owner, &plugin)
            .checked_add(amount)
            .ok_or(ValidationError::ArithmeticOverflow)?;
        set_or_clear(&mut self.approvals, (owner, plugin), approved - amount);
        set_or_clear(&mut self.allocations, (owner, plugin), allocated);
        Ok(())
    }

    /// Remove `amount` from the allocation. The approval is not restored.
    pub fn release(&mut self, owner: Address, plugin: Address, amount: Amount) -> Result<(), AuthorizationError> {
        let allocated = self.allocation(&owner, &plugin);
        if allocated < amount {
            return Err(AuthorizationError::InsufficientAllocation {
                have: allocated,
                need: amount,
            });
        }
        set_or_clear(&mut self.allocations, (owner, plugin), allocated - amount);
        Ok(())
    }
}

fn set_or_clear(map: &mut HashMap<(Address, Address), Amount>, key: (Address, Address), amount: Amount) {
    if amount == 0 {
        map.remove(&key);
    } else {
        map.insert(key, amount);
    }
}

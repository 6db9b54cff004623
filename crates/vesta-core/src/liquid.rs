//! In-memory liquid asset with standard fungible-token semantics.
//!
//! Suitable for tests, simulations, and embedding the engine without a host
//! chain. Interior mutability through a `parking_lot::RwLock` lets the engine
//! share it behind an `Arc<dyn LiquidAsset>`.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::error::AssetError;
use crate::traits::LiquidAsset;
use crate::types::{Address, Amount};

#[derive(Debug, Default)]
struct TokenState {
    balances: HashMap<Address, Amount>,
    allowances: HashMap<(Address, Address), Amount>,
    total_supply: Amount,
}

impl TokenState {
    fn balance(&self, account: &Address) -> Amount {
        self.balances.get(account).copied().unwrap_or(0)
    }

    fn debit(&mut self, account: Address, amount: Amount) -> Result<(), AssetError> {
        let have = self.balance(&account);
        if have < amount {
            return Err(AssetError::InsufficientBalance { have, need: amount });
        }
        self.balances.insert(account, have - amount);
        Ok(())
    }

    fn credit(&mut self, account: Address, amount: Amount) -> Result<(), AssetError> {
        let balance = self.balances.entry(account).or_insert(0);
        *balance = balance.checked_add(amount).ok_or(AssetError::Overflow)?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryLiquidAsset {
    state: RwLock<TokenState>,
}

impl MemoryLiquidAsset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue `amount` new units to `to`.
    pub fn mint(&self, to: Address, amount: Amount) -> Result<(), AssetError> {
        let mut state = self.state.write();
        let supply = state
            .total_supply
            .checked_add(amount)
            .ok_or(AssetError::Overflow)?;
        state.credit(to, amount)?;
        state.total_supply = supply;
        Ok(())
    }
}

impl LiquidAsset for MemoryLiquidAsset {
    fn balance_of(&self, account: &Address) -> Amount {
        self.state.read().balance(account)
    }

    fn total_supply(&self) -> Amount {
        self.state.read().total_supply
    }

    fn allowance(&self, owner: &Address, spender: &Address) -> Amount {
        self.state
            .read()
            .allowances
            .get(&(*owner, *spender))
            .copied()
            .unwrap_or(0)
    }

    fn approve(&self, owner: Address, spender: Address, amount: Amount) -> Result<(), AssetError> {
        self.state.write().allowances.insert((owner, spender), amount);
        Ok(())
    }

    fn transfer(&self, from: Address, to: Address, amount: Amount) -> Result<(), AssetError> {
        let mut state = self.state.write();
        state.debit(from, amount)?;
        state.credit(to, amount)
    }

    fn transfer_from(
        &self,
        spender: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), AssetError> {
        let mut state = self.state.write();
        let allowed = state
            .allowances
            .get(&(from, spender))
            .copied()
            .unwrap_or(0);
        if allowed < amount {
            return Err(AssetError::InsufficientAllowance {
                have: allowed,
                need: amount,
            });
        }
        state.debit(from, amount)?;
        state.credit(to, amount)?;
        state.allowances.insert((from, spender), allowed - amount);
        Ok(())
    }

    fn burn(&self, holder: Address, amount: Amount) -> Result<(), AssetError> {
        let mut state = self.state.write();
        state.debit(holder, amount)?;
        state.total_supply -= amount;
        Ok(())
    }
}

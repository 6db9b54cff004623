//! Escrow token balance ledger.
//!
//! Tracks token balances, total supply, transfer allowances, and the
//! per-account [`EscrowBalance`] counters. Every balance movement, including
//! mint and burn, goes through a [`TransferGate`] check.
//!
//! # Invariants
//!
//! * `total_supply == balances.values().sum()`
//! * an account's ledger balance is its spendable balance; allocated and
//!   redeeming escrow already sits in the custody account's balance

use std::collections::HashMap;

use crate::error::{AuthorizationError, EscrowError, StateError, ValidationError};
use crate::gate::TransferGate;
use crate::types::{Address, Amount, EscrowBalance};

#[derive(Clone, Debug, Default)]
pub struct BalanceLedger {
    balances: HashMap<Address, Amount>,
    allowances: HashMap<(Address, Address), Amount>,
    accounts: HashMap<Address, EscrowBalance>,
    total_supply: Amount,
}

impl BalanceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance_of(&self, account: &Address) -> Amount {
        self.balances.get(account).copied().unwrap_or(0)
    }

    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> Amount {
        self.allowances
            .get(&(*owner, *spender))
            .copied()
            .unwrap_or(0)
    }

    /// Overwrite the transfer allowance `owner` grants `spender`.
    pub fn set_allowance(&mut self, owner: Address, spender: Address, amount: Amount) {
        if amount == 0 {
            self.allowances.remove(&(owner, spender));
        } else {
            self.allowances.insert((owner, spender), amount);
        }
    }

    /// Consume `amount` of the allowance `owner` grants `spender`.
    pub fn spend_allowance(
        &mut self,
        owner: Address,
        spender: Address,
        amount: Amount,
    ) -> Result<(), AuthorizationError> {
        let have = self.allowance(&owner, &spender);
        if have < amount {
            return Err(AuthorizationError::InsufficientAllowance { have, need: amount });
        }
        self.set_allowance(owner, spender, have - amount);
        Ok(())
    }

    /// Counters for `account`; all zero if it never held allocated or redeeming escrow.
    pub fn escrow_balance(&self, account: &Address) -> EscrowBalance {
        self.accounts.get(account).copied().unwrap_or_default()
    }

    /// Spendable balance plus everything held in custody for `account`.
    pub fn total_holdings(&self, account: &Address) -> Amount {
        let counters = self.escrow_balance(account);
        self.balance_of(account)
            .saturating_add(counters.allocated_amount)
            .saturating_add(counters.redeeming_amount)
    }

    /// Create `amount` tokens for `to`.
    pub fn mint(
        &mut self,
        gate: &TransferGate,
        to: Address,
        amount: Amount,
    ) -> Result<(), EscrowError> {
        gate.check(&Address::ZERO, &to)?;
        let supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(ValidationError::ArithmeticOverflow)?;
        self.credit(to, amount)?;
        self.total_supply = supply;
        Ok(())
    }

    /// Destroy `amount` tokens held by `from`.
    pub fn burn(
        &mut self,
        gate: &TransferGate,
        from: Address,
        amount: Amount,
    ) -> Result<(), EscrowError> {
        gate.check(&from, &Address::ZERO)?;
        self.debit(from, amount)?;
        // Supply >= any single balance, so this cannot underflow.
        self.total_supply -= amount;
        Ok(())
    }

    /// Move `amount` tokens from `from` to `to`.
    pub fn transfer(
        &mut self,
        gate: &TransferGate,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), EscrowError> {
        gate.check(&from, &to)?;
        self.debit(from, amount)?;
        self.credit(to, amount)?;
        Ok(())
    }

    pub fn add_allocated(&mut self, account: Address, amount: Amount) -> Result<(), EscrowError> {
        let counters = self.accounts.entry(account).or_default();
        counters.allocated_amount = counters
            .allocated_amount
            .checked_add(amount)
            .ok_or(ValidationError::ArithmeticOverflow)?;
        Ok(())
    }

    pub fn sub_allocated(&mut self, account: Address, amount: Amount) -> Result<(), EscrowError> {
        let counters = self.accounts.entry(account).or_default();
        counters.allocated_amount = counters
            .allocated_amount
            .checked_sub(amount)
            .ok_or(StateError::CounterUnderflow { counter: "allocated" })?;
        self.prune(&account);
        Ok(())
    }

    pub fn add_redeeming(&mut self, account: Address, amount: Amount) -> Result<(), EscrowError> {
        let counters = self.accounts.entry(account).or_default();
        counters.redeeming_amount = counters
            .redeeming_amount
            .checked_add(amount)
            .ok_or(ValidationError::ArithmeticOverflow)?;
        Ok(())
    }

    pub fn sub_redeeming(&mut self, account: Address, amount: Amount) -> Result<(), EscrowError> {
        let counters = self.accounts.entry(account).or_default();
        counters.redeeming_amount = counters
            .redeeming_amount
            .checked_sub(amount)
            .ok_or(StateError::CounterUnderflow { counter: "redeeming" })?;
        self.prune(&account);
        Ok(())
    }

    fn credit(&mut self, account: Address, amount: Amount) -> Result<(), ValidationError> {
        let balance = self.balances.entry(account).or_insert(0);
        *balance = balance
            .checked_add(amount)
            .ok_or(ValidationError::ArithmeticOverflow)?;
        Ok(())
    }

    fn debit(&mut self, account: Address, amount: Amount) -> Result<(), ValidationError> {
        let have = self.balance_of(&account);
        if have < amount {
            return Err(ValidationError::InsufficientBalance { have, need: amount });
        }
        if have == amount {
            self.balances.remove(&account);
        } else {
            self.balances.insert(account, have - amount);
        }
        Ok(())
    }

    fn prune(&mut self, account: &Address) {
        if self.accounts.get(account) == Some(&EscrowBalance::default()) {
            self.accounts.remove(account);
        }
    }
}

//! Per-account arena of pending redemption entries.
//!
//! Entries are addressed by index and deleted by swap-with-last-and-remove.
//! **An index is only valid until the next deletion in the same account's
//! arena**: removing entry `i` moves the last entry into slot `i`. Callers
//! must re-read [`RedeemBook::len`] and the entries after any deletion.

use std::collections::HashMap;

use crate::error::StateError;
use crate::types::{Address, Amount, RedeemEntry};

#[derive(Clone, Debug, Default)]
pub struct RedeemBook {
    entries: HashMap<Address, Vec<RedeemEntry>>,
}

impl RedeemBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of pending entries for `account`.
    pub fn len(&self, account: &Address) -> usize {
        self.entries.get(account).map_or(0, Vec::len)
    }

    pub fn is_empty(&self, account: &Address) -> bool {
        self.len(account) == 0
    }

    pub fn get(&self, account: &Address, index: usize) -> Result<&RedeemEntry, StateError> {
        self.entries
            .get(account)
            .and_then(|list| list.get(index))
            .ok_or(StateError::RedeemNotFound {
                index,
                len: self.len(account),
            })
    }

    pub fn get_mut(&mut self, account: &Address, index: usize) -> Result<&mut RedeemEntry, StateError> {
        let len = self.len(account);
        self.entries
            .get_mut(account)
            .and_then(|list| list.get_mut(index))
            .ok_or(StateError::RedeemNotFound { index, len })
    }

    /// All pending entries of `account` in current index order.
    pub fn entries(&self, account: &Address) -> &[RedeemEntry] {
        self.entries.get(account).map_or(&[], Vec::as_slice)
    }

    /// Append an entry and return its index.
    pub fn push(&mut self, account: Address, entry: RedeemEntry) -> usize {
        let list = self.entries.entry(account).or_default();
        list.push(entry);
        list.len() - 1
    }

    /// Remove and return the entry at `index`, moving the last entry into its slot.
    pub fn swap_remove(&mut self, account: &Address, index: usize) -> Result<RedeemEntry, StateError> {
        let len = self.len(account);
        let list = self
            .entries
            .get_mut(account)
            .filter(|list| index < list.len())
            .ok_or(StateError::RedeemNotFound { index, len })?;
        let entry = list.swap_remove(index);
        if list.is_empty() {
            self.entries.remove(account);
        }
        Ok(entry)
    }

    /// Sum of escrow locked by `account`'s pending entries.
    pub fn locked_total(&self, account: &Address) -> Amount {
        self.entries(account)
            .iter()
            .fold(0u128, |acc, e| acc.saturating_add(e.locked_amount))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE: Address = Address([1; 20]);

    fn entry(locked: Amount) -> RedeemEntry {
        RedeemEntry {
            payout_amount: locked / 2,
            locked_amount: locked,
            maturity_time: 1_000,
            compensation_plugin: Address::ZERO,
            compensation_amount: 0,
        }
    }

    #[test]
    fn push_returns_sequential_indices() {
        let mut book = RedeemBook::new();
        assert_eq!(book.push(ALICE, entry(10)), 0);
        assert_eq!(book.push(ALICE, entry(20)), 1);
        assert_eq!(book.len(&ALICE), 2);
        assert_eq!(book.locked_total(&ALICE), 30);
    }

    #[test]
    fn missing_index_reports_length() {
        let mut book = RedeemBook::new();
        book.push(ALICE, entry(10));
        assert_eq!(
            book.get(&ALICE, 1),
            Err(StateError::RedeemNotFound { index: 1, len: 1 })
        );
        assert_eq!(
            book.swap_remove(&Address([2; 20]), 0),
            Err(StateError::RedeemNotFound { index: 0, len: 0 })
        );
    }

    #[test]
    fn swap_remove_moves_last_into_slot() {
        let mut book = RedeemBook::new();
        book.push(ALICE, entry(10));
        book.push(ALICE, entry(20));
        book.push(ALICE, entry(30));

        let removed = book.swap_remove(&ALICE, 0).unwrap();
        assert_eq!(removed.locked_amount, 10);
        assert_eq!(book.len(&ALICE), 2);
        // Former index 2 now lives at index 0.
        assert_eq!(book.get(&ALICE, 0).unwrap().locked_amount, 30);
        assert_eq!(book.get(&ALICE, 1).unwrap().locked_amount, 20);
    }

    #[test]
    fn removing_last_entry_empties_account() {
        let mut book = RedeemBook::new();
        book.push(ALICE, entry(10));
        book.swap_remove(&ALICE, 0).unwrap();
        assert!(book.is_empty(&ALICE));
        assert!(book.entries(&ALICE).is_empty());
    }

    #[test]
    fn get_mut_updates_in_place() {
        let mut book = RedeemBook::new();
        book.push(ALICE, entry(10));
        book.get_mut(&ALICE, 0).unwrap().compensation_plugin = Address([9; 20]);
        assert_eq!(book.get(&ALICE, 0).unwrap().compensation_plugin, Address([9; 20]));
    }
}

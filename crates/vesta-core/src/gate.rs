//! Transfer gate: the non-transferability rule for the escrow token.
//!
//! A movement `(from, to)` passes iff `from` is the zero (mint) address, or
//! either side is on the allow-list. The custody address is inserted at
//! construction and can never be removed, since every allocation and
//! redemption flow moves tokens through it.

use indexmap::IndexSet;

use crate::error::{AuthorizationError, ConfigurationError};
use crate::types::Address;

#[derive(Clone, Debug)]
pub struct TransferGate {
    custody: Address,
    /// Enumerable allow-list. Removal swaps the last member into the gap.
    allowlist: IndexSet<Address>,
}

impl TransferGate {
    /// Create a gate whose allow-list contains only `custody`.
    pub fn new(custody: Address) -> Self {
        let mut allowlist = IndexSet::new();
        allowlist.insert(custody);
        Self { custody, allowlist }
    }

    /// Check whether a movement from `from` to `to` is permitted.
    ///
    /// # Examples
    ///
    /// ```
    /// use vesta_core::gate::TransferGate;
    /// use vesta_core::types::Address;
    ///
    /// let custody = Address([0xEE; 20]);
    /// let gate = TransferGate::new(custody);
    /// let (alice, bob) = (Address([1; 20]), Address([2; 20]));
    /// assert!(gate.check(&Address::ZERO, &alice).is_ok());
    /// assert!(gate.check(&alice, &custody).is_ok());
    /// assert!(gate.check(&alice, &bob).is_err());
    /// ```
    pub fn check(&self, from: &Address, to: &Address) -> Result<(), AuthorizationError> {
        if from.is_zero() || self.allowlist.contains(from) || self.allowlist.contains(to) {
            Ok(())
        } else {
            Err(AuthorizationError::TransferNotAllowed {
                from: *from,
                to: *to,
            })
        }
    }

    /// Add `account` to the allow-list. Returns `false` if already present.
    pub fn allow(&mut self, account: Address) -> bool {
        self.allowlist.insert(account)
    }

    /// Remove `account` from the allow-list. Returns `false` if it was absent.
    pub fn disallow(&mut self, account: &Address) -> Result<bool, ConfigurationError> {
        if *account == self.custody {
            return Err(ConfigurationError::CustodyNotRemovable);
        }
        Ok(self.allowlist.swap_remove(account))
    }

    pub fn contains(&self, account: &Address) -> bool {
        self.allowlist.contains(account)
    }

    pub fn len(&self) -> usize {
        self.allowlist.len()
    }

    /// Always `false`: the custody address is a permanent member.
    pub fn is_empty(&self) -> bool {
        self.allowlist.is_empty()
    }

    /// Member at `index` in enumeration order.
    pub fn get(&self, index: usize) -> Option<Address> {
        self.allowlist.get_index(index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Address> {
        self.allowlist.iter()
    }

    pub fn custody(&self) -> Address {
        self.custody
    }
}

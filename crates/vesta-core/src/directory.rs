//! In-memory contract directory.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::traits::{ContractDirectory, UsagePlugin};
use crate::types::Address;

/// Registry of contract addresses and the usage plugins deployed at them.
///
/// Registering a plugin also marks its address as a contract.
#[derive(Default)]
pub struct MemoryDirectory {
    contracts: RwLock<HashSet<Address>>,
    plugins: RwLock<HashMap<Address, Arc<dyn UsagePlugin>>>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `address` as a contract without plugin behaviour (e.g. a sale contract).
    pub fn register_contract(&self, address: Address) {
        self.contracts.write().insert(address);
    }

    pub fn register_plugin(&self, address: Address, plugin: Arc<dyn UsagePlugin>) {
        self.contracts.write().insert(address);
        self.plugins.write().insert(address, plugin);
    }
}

impl ContractDirectory for MemoryDirectory {
    fn is_contract(&self, address: &Address) -> bool {
        self.contracts.read().contains(address)
    }

    fn usage_plugin(&self, address: &Address) -> Option<Arc<dyn UsagePlugin>> {
        self.plugins.read().get(address).cloned()
    }
}

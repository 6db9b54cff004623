//! Shared test helpers: well-known addresses, mock usage plugins, and a
//! harness wiring an engine to in-memory collaborators.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock, Weak};

use parking_lot::Mutex;
use vesta_core::clock::ManualClock;
use vesta_core::constants::SECONDS_PER_DAY;
use vesta_core::directory::MemoryDirectory;
use vesta_core::error::{EscrowError, PluginError};
use vesta_core::liquid::MemoryLiquidAsset;
use vesta_core::traits::{LiquidAsset, UsagePlugin};
use vesta_core::types::{Address, Amount};
use vesta_engine::{EngineConfig, EscrowEngine};

pub const OWNER: Address = Address([0x0A; 20]);
pub const CUSTODY: Address = Address([0xEE; 20]);
pub const DIVIDENDS: Address = Address([0xD1; 20]);
pub const USAGE: Address = Address([0xD2; 20]);
pub const SALE: Address = Address([0x5A; 20]);
pub const ALICE: Address = Address([0x01; 20]);
pub const BOB: Address = Address([0x02; 20]);

pub const GENESIS_TIME: u64 = 1_700_000_000;
pub const DAY: u64 = SECONDS_PER_DAY;

/// Address from a seed byte.
pub fn addr(seed: u8) -> Address {
    Address([seed; 20])
}

// ---------------------------------------------------------------------------
// Mock plugins
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PluginCall {
    Allocate { owner: Address, amount: Amount, data: Vec<u8> },
    Deallocate { owner: Address, amount: Amount, data: Vec<u8> },
}

/// Records every callback; each direction can be switched to fail.
#[derive(Debug, Default)]
pub struct RecordingPlugin {
    calls: Mutex<Vec<PluginCall>>,
    fail_allocate: AtomicBool,
    fail_deallocate: AtomicBool,
}

impl RecordingPlugin {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing_allocate() -> Arc<Self> {
        let plugin = Self::default();
        plugin.fail_allocate.store(true, Ordering::SeqCst);
        Arc::new(plugin)
    }

    pub fn set_fail_allocate(&self, fail: bool) {
        self.fail_allocate.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_deallocate(&self, fail: bool) {
        self.fail_deallocate.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<PluginCall> {
        self.calls.lock().clone()
    }

    /// Allocated minus deallocated for `owner`, as seen by this plugin.
    pub fn net(&self, owner: &Address) -> i128 {
        self.calls
            .lock()
            .iter()
            .map(|call| match call {
                PluginCall::Allocate { owner: o, amount, .. } if o == owner => *amount as i128,
                PluginCall::Deallocate { owner: o, amount, .. } if o == owner => -(*amount as i128),
                _ => 0,
            })
            .sum()
    }
}

impl UsagePlugin for RecordingPlugin {
    fn allocate(&self, owner: Address, amount: Amount, data: &[u8]) -> Result<(), PluginError> {
        if self.fail_allocate.load(Ordering::SeqCst) {
            return Err(PluginError("allocate refused".into()));
        }
        self.calls.lock().push(PluginCall::Allocate {
            owner,
            amount,
            data: data.to_vec(),
        });
        Ok(())
    }

    fn deallocate(&self, owner: Address, amount: Amount, data: &[u8]) -> Result<(), PluginError> {
        if self.fail_deallocate.load(Ordering::SeqCst) {
            return Err(PluginError("deallocate refused".into()));
        }
        self.calls.lock().push(PluginCall::Deallocate {
            owner,
            amount,
            data: data.to_vec(),
        });
        Ok(())
    }
}

/// What a [`ReentrantPlugin`] saw from inside its `allocate` callback.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReentryObservation {
    pub allocation_seen: Amount,
    pub balance_seen: Amount,
    pub reentry: Result<(), EscrowError>,
}

/// Calls back into the engine from its `allocate` callback: reads a view,
/// then attempts a mutating operation.
#[derive(Debug)]
pub struct ReentrantPlugin {
    address: Address,
    engine: OnceLock<Weak<EscrowEngine>>,
    observations: Mutex<Vec<ReentryObservation>>,
}

impl ReentrantPlugin {
    pub fn new(address: Address) -> Arc<Self> {
        Arc::new(Self {
            address,
            engine: OnceLock::new(),
            observations: Mutex::new(Vec::new()),
        })
    }

    pub fn attach(&self, engine: &Arc<EscrowEngine>) {
        let _ = self.engine.set(Arc::downgrade(engine));
    }

    pub fn observations(&self) -> Vec<ReentryObservation> {
        self.observations.lock().clone()
    }
}

impl UsagePlugin for ReentrantPlugin {
    fn allocate(&self, owner: Address, _amount: Amount, _data: &[u8]) -> Result<(), PluginError> {
        let engine = self
            .engine
            .get()
            .and_then(Weak::upgrade)
            .ok_or_else(|| PluginError("engine not attached".into()))?;
        let observation = ReentryObservation {
            allocation_seen: engine.usage_allocation(&owner, &self.address),
            balance_seen: engine.balance_of(&owner),
            reentry: engine.deallocate_from_usage(self.address, owner, 1),
        };
        self.observations.lock().push(observation);
        Ok(())
    }

    fn deallocate(&self, _owner: Address, _amount: Amount, _data: &[u8]) -> Result<(), PluginError> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

/// An engine wired to in-memory collaborators.
///
/// `DIVIDENDS` is the compensation plugin (50% adjustment) and `USAGE` a
/// second registered plugin with no fee. `SALE` is a registered contract.
pub struct Harness {
    pub engine: Arc<EscrowEngine>,
    pub liquid: Arc<MemoryLiquidAsset>,
    pub directory: Arc<MemoryDirectory>,
    pub clock: Arc<ManualClock>,
    pub dividends: Arc<RecordingPlugin>,
    pub usage: Arc<RecordingPlugin>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    /// Build with the default config adjusted by `adjust`.
    pub fn with_config(adjust: impl FnOnce(&mut EngineConfig)) -> Self {
        let liquid = Arc::new(MemoryLiquidAsset::new());
        let directory = Arc::new(MemoryDirectory::new());
        let clock = Arc::new(ManualClock::new(GENESIS_TIME));
        let dividends = RecordingPlugin::new();
        let usage = RecordingPlugin::new();
        directory.register_plugin(DIVIDENDS, dividends.clone());
        directory.register_plugin(USAGE, usage.clone());
        directory.register_contract(SALE);

        let mut config = EngineConfig::new(OWNER, CUSTODY);
        config.compensation_plugin = Some(DIVIDENDS);
        adjust(&mut config);

        let engine = EscrowEngine::new(config, liquid.clone(), directory.clone(), clock.clone())
            .expect("harness config is valid");
        Self {
            engine: Arc::new(engine),
            liquid,
            directory,
            clock,
            dividends,
            usage,
        }
    }

    /// Give `account` `amount` fresh liquid units, approved to custody.
    pub fn fund(&self, account: Address, amount: Amount) {
        self.liquid.mint(account, amount).unwrap();
        let allowance = self.liquid.allowance(&account, &CUSTODY);
        self.liquid.approve(account, CUSTODY, allowance + amount).unwrap();
    }

    /// Fund `account` and convert everything into escrow.
    pub fn convert(&self, account: Address, amount: Amount) {
        self.fund(account, amount);
        self.engine.convert(account, amount).unwrap();
    }

    /// Escrow supply is fully backed by liquid asset in custody.
    pub fn reconciled(&self) -> bool {
        self.engine.total_supply() == self.liquid.balance_of(&CUSTODY)
    }

    pub fn advance_days(&self, days: u64) {
        self.clock.advance(days * DAY);
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

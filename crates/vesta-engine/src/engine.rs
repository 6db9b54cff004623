//! The escrow engine and its transaction machinery.
//!
//! Every mutating entry point goes through [`EscrowEngine::transact`]:
//!
//! 1. The reentrancy guard is taken. Other threads wait; the same thread
//!    re-entering from a plugin callback is rejected.
//! 2. Bookkeeping is staged on a clone of the state, external effects and
//!    events are queued. A staging error returns with nothing published.
//! 3. The staged state is published, so callbacks observe the new counters.
//! 4. Custody is checked to cover every outflow. Effects then run in
//!    `Effect::phase` order: plugin callbacks, pulls, burns, payouts.
//! 5. If any effect fails, completed effects are undone with their inverse,
//!    the snapshot is restored, and the events are discarded.
//! 6. Otherwise the events are appended to the event log.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, warn};
use vesta_core::error::{AuthorizationError, EscrowError, ExternalError, StateError, ValidationError};
use vesta_core::events::EscrowEvent;
use vesta_core::traits::{Clock, ContractDirectory, LiquidAsset, UsagePlugin};
use vesta_core::types::{Address, Amount};

use crate::config::EngineConfig;
use crate::guard::ReentrancyGuard;
use crate::state::EngineState;
use crate::txn::{Effect, Txn};

/// Escrow accounting engine.
///
/// Holds all escrow state behind a lock and talks to the outside world
/// through the [`LiquidAsset`], [`ContractDirectory`] and [`Clock`]
/// collaborators. Callers identify themselves with an explicit `caller`
/// address on each operation.
pub struct EscrowEngine {
    pub(crate) custody: Address,
    pub(crate) restrict_convert_to_contracts: bool,
    pub(crate) state: RwLock<EngineState>,
    guard: ReentrancyGuard,
    events: Mutex<Vec<EscrowEvent>>,
    pub(crate) liquid: Arc<dyn LiquidAsset>,
    pub(crate) directory: Arc<dyn ContractDirectory>,
    pub(crate) clock: Arc<dyn Clock>,
}

impl EscrowEngine {
    /// Build an engine from a validated configuration.
    ///
    /// A configured compensation plugin must already be registered in
    /// `directory`.
    pub fn new(
        config: EngineConfig,
        liquid: Arc<dyn LiquidAsset>,
        directory: Arc<dyn ContractDirectory>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, EscrowError> {
        let state = EngineState::from_config(&config)?;
        if !state.compensation_plugin.is_zero() && directory.usage_plugin(&state.compensation_plugin).is_none() {
            return Err(ValidationError::UnknownPlugin(state.compensation_plugin).into());
        }
        info!(
            owner = %config.owner,
            custody = %config.custody,
            compensation_plugin = %state.compensation_plugin,
            "escrow engine initialised"
        );
        Ok(Self {
            custody: config.custody,
            restrict_convert_to_contracts: config.restrict_convert_to_contracts,
            state: RwLock::new(state),
            guard: ReentrancyGuard::new(),
            events: Mutex::new(Vec::new()),
            liquid,
            directory,
            clock,
        })
    }

    // ------------------------------------------------------------------
    // Conversion
    // ------------------------------------------------------------------

    /// Convert `amount` of the liquid asset held by `caller` into escrow for
    /// `caller`. The caller must have approved custody on the liquid asset.
    pub fn convert(&self, caller: Address, amount: Amount) -> Result<(), EscrowError> {
        self.transact("convert", |txn| stage_convert(txn, caller, amount, caller))
    }

    /// Convert on behalf of `recipient`. Restricted to contract callers
    /// unless the engine was configured otherwise.
    pub fn convert_to(&self, caller: Address, amount: Amount, recipient: Address) -> Result<(), EscrowError> {
        self.transact("convert_to", |txn| {
            if self.restrict_convert_to_contracts && !self.directory.is_contract(&caller) {
                return Err(AuthorizationError::NotContract(caller).into());
            }
            stage_convert(txn, caller, amount, recipient)
        })
    }

    // ------------------------------------------------------------------
    // Escrow token surface
    // ------------------------------------------------------------------

    pub fn approve(&self, caller: Address, spender: Address, amount: Amount) -> Result<(), EscrowError> {
        self.transact("approve", |txn| {
            if spender.is_zero() {
                return Err(ValidationError::NullAddress.into());
            }
            txn.state.ledger.set_allowance(caller, spender, amount);
            txn.emit(EscrowEvent::Approval {
                owner: caller,
                spender,
                amount,
            });
            Ok(())
        })
    }

    /// Move escrow from `caller` to `to`. Passes only if either side is
    /// allow-listed.
    pub fn transfer(&self, caller: Address, to: Address, amount: Amount) -> Result<(), EscrowError> {
        self.transact("transfer", |txn| stage_transfer(txn, caller, to, amount))
    }

    pub fn transfer_from(
        &self,
        caller: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), EscrowError> {
        self.transact("transfer_from", |txn| {
            txn.state.ledger.spend_allowance(from, caller, amount)?;
            stage_transfer(txn, from, to, amount)
        })
    }

    // ------------------------------------------------------------------
    // Event log
    // ------------------------------------------------------------------

    /// All committed events, oldest first.
    pub fn events(&self) -> Vec<EscrowEvent> {
        self.events.lock().clone()
    }

    /// Take the committed events, leaving the log empty.
    pub fn drain_events(&self) -> Vec<EscrowEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    // ------------------------------------------------------------------
    // Transaction machinery
    // ------------------------------------------------------------------

    /// Run `stage` as one all-or-nothing operation.
    pub(crate) fn transact<T>(
        &self,
        op: &'static str,
        stage: impl FnOnce(&mut Txn) -> Result<T, EscrowError>,
    ) -> Result<T, EscrowError> {
        let _entered = self.guard.enter().inspect_err(|_| {
            debug!(op, "re-entrant call rejected");
        })?;

        let snapshot = self.state.read().clone();
        let mut txn = Txn::new(snapshot.clone(), self.clock.now());
        let output = stage(&mut txn).inspect_err(|e| {
            debug!(op, error = %e, "operation rejected");
        })?;

        let (state, effects, events) = txn.into_parts();
        *self.state.write() = state;

        if let Err(e) = self.apply_effects(&effects) {
            *self.state.write() = snapshot;
            warn!(op, error = %e, "operation rolled back");
            return Err(e);
        }

        self.publish(events);
        Ok(output)
    }

    fn apply_effects(&self, effects: &[Effect]) -> Result<(), EscrowError> {
        let need = effects
            .iter()
            .try_fold(0u128, |acc, e| acc.checked_add(e.custody_outflow()))
            .ok_or(ValidationError::ArithmeticOverflow)?;
        if need > 0 {
            let inflow: Amount = effects.iter().map(Effect::custody_inflow).sum();
            let have = self.liquid.balance_of(&self.custody).saturating_add(inflow);
            if have < need {
                return Err(StateError::CustodyShortfall { have, need }.into());
            }
        }

        let mut ordered: Vec<&Effect> = effects.iter().collect();
        ordered.sort_by_key(|e| e.phase());

        let mut completed: Vec<&Effect> = Vec::new();
        for effect in ordered {
            if let Err(e) = self.dispatch(effect) {
                self.unwind(&completed);
                return Err(e);
            }
            completed.push(effect);
        }
        Ok(())
    }

    fn dispatch(&self, effect: &Effect) -> Result<(), EscrowError> {
        match effect {
            Effect::PluginAllocate { plugin, owner, amount, data } => {
                debug!(%plugin, %owner, amount, "plugin allocate callback");
                self.require_plugin(plugin)?
                    .allocate(*owner, *amount, data)
                    .map_err(|source| ExternalError::Plugin { plugin: *plugin, source })?;
            }
            Effect::PluginDeallocate { plugin, owner, amount, data } => {
                debug!(%plugin, %owner, amount, "plugin deallocate callback");
                self.require_plugin(plugin)?
                    .deallocate(*owner, *amount, data)
                    .map_err(|source| ExternalError::Plugin { plugin: *plugin, source })?;
            }
            Effect::PullLiquid { from, amount } => {
                self.liquid.transfer_from(self.custody, *from, self.custody, *amount)?;
            }
            Effect::PayLiquid { to, amount } => {
                self.liquid.transfer(self.custody, *to, *amount)?;
            }
            Effect::BurnLiquid { amount } => {
                self.liquid.burn(self.custody, *amount)?;
            }
        }
        Ok(())
    }

    /// Undo completed effects, most recent first.
    ///
    /// Burns cannot be undone. They run after every plugin call and pull, and
    /// before any payout, so a failure after a burn can only come from a
    /// payout the custody precheck already covered.
    fn unwind(&self, completed: &[&Effect]) {
        for effect in completed.iter().rev() {
            let Some(inverse) = effect.inverse() else {
                continue;
            };
            if let Err(e) = self.dispatch(&inverse) {
                warn!(?inverse, error = %e, "inverse effect failed during rollback");
            }
        }
    }

    fn publish(&self, events: Vec<EscrowEvent>) {
        for event in &events {
            info!(event = event.name(), detail = ?event, "committed");
        }
        self.events.lock().extend(events);
    }

    pub(crate) fn require_plugin(&self, plugin: &Address) -> Result<Arc<dyn UsagePlugin>, ValidationError> {
        self.directory
            .usage_plugin(plugin)
            .ok_or(ValidationError::UnknownPlugin(*plugin))
    }
}

fn stage_convert(txn: &mut Txn, caller: Address, amount: Amount, recipient: Address) -> Result<(), EscrowError> {
    if amount == 0 {
        return Err(ValidationError::ZeroAmount.into());
    }
    if recipient.is_zero() {
        return Err(ValidationError::NullAddress.into());
    }
    txn.state.ledger.mint(&txn.state.gate, recipient, amount)?;
    txn.push_effect(Effect::PullLiquid { from: caller, amount });
    txn.emit(EscrowEvent::Convert {
        from: caller,
        to: recipient,
        amount,
    });
    Ok(())
}

fn stage_transfer(txn: &mut Txn, from: Address, to: Address, amount: Amount) -> Result<(), EscrowError> {
    if to.is_zero() {
        return Err(ValidationError::NullAddress.into());
    }
    txn.state.ledger.transfer(&txn.state.gate, from, to, amount)?;
    txn.emit(EscrowEvent::Transfer { from, to, amount });
    Ok(())
}

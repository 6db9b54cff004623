//! Staged transaction: a working copy of engine state plus the external
//! effects and events that become visible only if the whole operation
//! commits.

use vesta_core::events::EscrowEvent;
use vesta_core::types::{Address, Amount, Timestamp};

use crate::state::EngineState;

/// An external side effect queued during staging.
///
/// Effects run in [`Effect::phase`] order: plugin calls, then pulls into
/// custody, then burns, then payouts. Value leaves custody for another
/// account only in the last phase. Liquid effects always involve the custody
/// address on one side.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Effect {
    PluginAllocate {
        plugin: Address,
        owner: Address,
        amount: Amount,
        data: Vec<u8>,
    },
    PluginDeallocate {
        plugin: Address,
        owner: Address,
        amount: Amount,
        data: Vec<u8>,
    },
    /// Pull liquid asset from `from` into custody (requires allowance).
    PullLiquid { from: Address, amount: Amount },
    /// Pay liquid asset from custody to `to`.
    PayLiquid { to: Address, amount: Amount },
    /// Burn liquid asset held by custody.
    BurnLiquid { amount: Amount },
}

impl Effect {
    /// Dispatch order; lower runs first, ties keep staging order.
    pub(crate) fn phase(&self) -> u8 {
        match self {
            Self::PluginAllocate { .. } | Self::PluginDeallocate { .. } => 0,
            Self::PullLiquid { .. } => 1,
            Self::BurnLiquid { .. } => 2,
            Self::PayLiquid { .. } => 3,
        }
    }

    /// Liquid units leaving custody.
    pub(crate) fn custody_outflow(&self) -> Amount {
        match self {
            Self::PayLiquid { amount, .. } | Self::BurnLiquid { amount } => *amount,
            _ => 0,
        }
    }

    /// Liquid units entering custody.
    pub(crate) fn custody_inflow(&self) -> Amount {
        match self {
            Self::PullLiquid { amount, .. } => *amount,
            _ => 0,
        }
    }

    /// The compensating effect. Burns have none.
    pub(crate) fn inverse(&self) -> Option<Self> {
        match self {
            Self::PluginAllocate { plugin, owner, amount, data } => Some(Self::PluginDeallocate {
                plugin: *plugin,
                owner: *owner,
                amount: *amount,
                data: data.clone(),
            }),
            Self::PluginDeallocate { plugin, owner, amount, data } => Some(Self::PluginAllocate {
                plugin: *plugin,
                owner: *owner,
                amount: *amount,
                data: data.clone(),
            }),
            Self::PullLiquid { from, amount } => Some(Self::PayLiquid {
                to: *from,
                amount: *amount,
            }),
            Self::PayLiquid { .. } | Self::BurnLiquid { .. } => None,
        }
    }
}

pub(crate) struct Txn {
    pub(crate) state: EngineState,
    pub(crate) now: Timestamp,
    effects: Vec<Effect>,
    events: Vec<EscrowEvent>,
}

impl Txn {
    pub(crate) fn new(state: EngineState, now: Timestamp) -> Self {
        Self {
            state,
            now,
            effects: Vec::new(),
            events: Vec::new(),
        }
    }

    pub(crate) fn push_effect(&mut self, effect: Effect) {
        self.effects.push(effect);
    }

    pub(crate) fn emit(&mut self, event: EscrowEvent) {
        self.events.push(event);
    }

    pub(crate) fn into_parts(self) -> (EngineState, Vec<Effect>, Vec<EscrowEvent>) {
        (self.state, self.effects, self.events)
    }
}

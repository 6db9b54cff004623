//! Mutable engine state, cloned wholesale for each transaction snapshot.

use std::collections::HashMap;

use vesta_core::error::EscrowError;
use vesta_core::gate::TransferGate;
use vesta_core::ledger::BalanceLedger;
use vesta_core::redeem::RedeemBook;
use vesta_core::types::{Address, RedeemSettings};
use vesta_core::usage::UsageBook;

use crate::config::EngineConfig;

#[derive(Clone, Debug)]
pub(crate) struct EngineState {
    pub(crate) owner: Address,
    pub(crate) settings: RedeemSettings,
    /// Zero when no compensation plugin is configured.
    pub(crate) compensation_plugin: Address,
    pub(crate) deallocation_fees: HashMap<Address, u16>,
    pub(crate) gate: TransferGate,
    pub(crate) ledger: BalanceLedger,
    pub(crate) usage: UsageBook,
    pub(crate) redeems: RedeemBook,
}

impl EngineState {
    pub(crate) fn from_config(config: &EngineConfig) -> Result<Self, EscrowError> {
        config.validate()?;

        let mut gate = TransferGate::new(config.custody);
        for account in &config.transfer_allowlist {
            gate.allow(*account);
        }

        Ok(Self {
            owner: config.owner,
            settings: config.effective_redeem_settings(),
            compensation_plugin: config.compensation_plugin(),
            deallocation_fees: config
                .deallocation_fees
                .iter()
                .filter(|(_, fee)| **fee > 0)
                .map(|(plugin, fee)| (*plugin, *fee))
                .collect(),
            gate,
            ledger: BalanceLedger::new(),
            usage: UsageBook::new(),
            redeems: RedeemBook::new(),
        })
    }

    /// Deallocation fee for `plugin` in basis points; zero if never set.
    pub(crate) fn fee_bps(&self, plugin: &Address) -> u16 {
        self.deallocation_fees.get(plugin).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_config_seeds_gate_and_fees() {
        let custody = Address([0xEE; 20]);
        let sale = Address([0x5A; 20]);
        let plugin = Address([0xD1; 20]);
        let mut config = EngineConfig::new(Address([0x0A; 20]), custody);
        config.transfer_allowlist.push(sale);
        config.deallocation_fees.insert(plugin, 120);

        let state = EngineState::from_config(&config).unwrap();
        assert!(state.gate.contains(&custody));
        assert!(state.gate.contains(&sale));
        assert_eq!(state.fee_bps(&plugin), 120);
        assert_eq!(state.fee_bps(&sale), 0);
        assert!(state.compensation_plugin.is_zero());
        assert_eq!(state.settings.compensation_adjustment, 0);
    }

    #[test]
    fn from_config_rejects_invalid() {
        assert!(EngineState::from_config(&EngineConfig::default()).is_err());
    }
}

//! Point-in-time notifications emitted once per committed state transition.
//!
//! Events carry the values needed to reconstruct each transition externally;
//! administrative events carry both the previous and the new value.

use serde::{Deserialize, Serialize};

use crate::types::{Address, Amount, RedeemSettings};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EscrowEvent {
    ApproveUsage {
        owner: Address,
        plugin: Address,
        amount: Amount,
    },
    Convert {
        from: Address,
        to: Address,
        amount: Amount,
    },
    Approval {
        owner: Address,
        spender: Address,
        amount: Amount,
    },
    Transfer {
        from: Address,
        to: Address,
        amount: Amount,
    },
    Redeem {
        owner: Address,
        escrow_amount: Amount,
        payout_amount: Amount,
        duration: u64,
    },
    FinalizeRedeem {
        owner: Address,
        escrow_amount: Amount,
        payout_amount: Amount,
    },
    CancelRedeem {
        owner: Address,
        escrow_amount: Amount,
    },
    UpdateRedeemCompensationPlugin {
        owner: Address,
        index: usize,
        previous: Address,
        current: Address,
    },
    Allocate {
        owner: Address,
        plugin: Address,
        amount: Amount,
    },
    Deallocate {
        owner: Address,
        plugin: Address,
        amount: Amount,
        fee: Amount,
    },
    UpdateRedeemSettings {
        previous: RedeemSettings,
        current: RedeemSettings,
    },
    UpdateCompensationPlugin {
        previous: Address,
        current: Address,
    },
    UpdateDeallocationFee {
        plugin: Address,
        previous_bps: u16,
        fee_bps: u16,
    },
    SetTransferAllowlist {
        account: Address,
        allowed: bool,
    },
    OwnershipTransferred {
        previous: Address,
        current: Address,
    },
}

impl EscrowEvent {
    /// Stable snake_case name, identical to the serialized `event` tag.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ApproveUsage { .. } => "approve_usage",
            Self::Convert { .. } => "convert",
            Self::Approval { .. } => "approval",
            Self::Transfer { .. } => "transfer",
            Self::Redeem { .. } => "redeem",
            Self::FinalizeRedeem { .. } => "finalize_redeem",
            Self::CancelRedeem { .. } => "cancel_redeem",
            Self::UpdateRedeemCompensationPlugin { .. } => "update_redeem_compensation_plugin",
            Self::Allocate { .. } => "allocate",
            Self::Deallocate { .. } => "deallocate",
            Self::UpdateRedeemSettings { .. } => "update_redeem_settings",
            Self::UpdateCompensationPlugin { .. } => "update_compensation_plugin",
            Self::UpdateDeallocationFee { .. } => "update_deallocation_fee",
            Self::SetTransferAllowlist { .. } => "set_transfer_allowlist",
            Self::OwnershipTransferred { .. } => "ownership_transferred",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialized_tag_matches_name() {
        let events = vec![
            EscrowEvent::Convert {
                from: Address([1; 20]),
                to: Address([2; 20]),
                amount: 10,
            },
            EscrowEvent::Deallocate {
                owner: Address([1; 20]),
                plugin: Address([3; 20]),
                amount: 100,
                fee: 2,
            },
            EscrowEvent::UpdateRedeemSettings {
                previous: RedeemSettings::default(),
                current: RedeemSettings::default(),
            },
            EscrowEvent::SetTransferAllowlist {
                account: Address([4; 20]),
                allowed: false,
            },
        ];
        for event in events {
            let value = serde_json::to_value(&event).unwrap();
            assert_eq!(value["event"], event.name());
        }
    }

    #[test]
    fn admin_event_roundtrip() {
        let event = EscrowEvent::OwnershipTransferred {
            previous: Address([1; 20]),
            current: Address([2; 20]),
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: EscrowEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn addresses_render_as_hex_strings() {
        let event = EscrowEvent::Allocate {
            owner: Address([0xAA; 20]),
            plugin: Address([0xBB; 20]),
            amount: 7,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(&format!("\"owner\":\"0x{}\"", "aa".repeat(20))));
        assert!(json.contains("\"amount\":7"));
    }
}

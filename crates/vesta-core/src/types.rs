//! Core value types: addresses, balance records, redemption entries, settings.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::constants::{
    DEFAULT_COMPENSATION_ADJUSTMENT, DEFAULT_MAX_REDEEM_DURATION, DEFAULT_MAX_REDEEM_RATIO,
    DEFAULT_MIN_REDEEM_DURATION, DEFAULT_MIN_REDEEM_RATIO, MAX_COMPENSATION_ADJUSTMENT,
    MAX_FIXED_RATIO,
};
use crate::error::{AddressError, ConfigurationError};

/// Token amount in the smallest unit of either asset.
pub type Amount = u128;

/// Unix timestamp in seconds.
pub type Timestamp = u64;

/// A 20-byte account or contract identifier.
///
/// The zero address doubles as the mint/burn sentinel for the transfer gate
/// and as the "no plugin" marker for the compensation plugin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The zero address.
    pub const ZERO: Self = Self([0u8; 20]);

    /// Return the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Check if this is the zero address.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = AddressError;

    /// Parse a hex address, with or without the `0x` prefix.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        let bytes = hex::decode(digits).map_err(|e| AddressError::InvalidHex(e.to_string()))?;
        let array: [u8; 20] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| AddressError::InvalidLength(bytes.len()))?;
        Ok(Self(array))
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Per-account counters of escrow held in engine custody on the account's behalf.
///
/// Both counters describe tokens that have already left the account's
/// spendable balance, so `total holdings = balance + allocated + redeeming`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscrowBalance {
    /// Sum of everything currently delegated to usage plugins.
    pub allocated_amount: Amount,
    /// Sum of escrow locked in pending redemption entries.
    pub redeeming_amount: Amount,
}

/// A pending redemption: escrow locked in custody until `maturity_time`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedeemEntry {
    /// Liquid asset paid out on finalization, fixed at request time.
    pub payout_amount: Amount,
    /// Escrow locked in custody by this entry.
    pub locked_amount: Amount,
    /// Earliest timestamp at which the entry can be finalized.
    pub maturity_time: Timestamp,
    /// Plugin holding this entry's compensation grant. May differ from the
    /// engine's current compensation plugin after an administrative change.
    pub compensation_plugin: Address,
    /// Escrow amount granted to `compensation_plugin` for the vesting period.
    pub compensation_amount: Amount,
}

/// Redemption curve bounds and compensation share.
///
/// # Invariants
///
/// * `min_redeem_ratio <= max_redeem_ratio <= MAX_FIXED_RATIO`
/// * `min_redeem_duration < max_redeem_duration`
/// * `compensation_adjustment <= MAX_COMPENSATION_ADJUSTMENT`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedeemSettings {
    /// Ratio (percent) paid out at exactly `min_redeem_duration`.
    pub min_redeem_ratio: u64,
    /// Ratio (percent) paid out at or beyond `max_redeem_duration`.
    pub max_redeem_ratio: u64,
    /// Shortest accepted vesting duration in seconds.
    pub min_redeem_duration: u64,
    /// Duration in seconds at which the ratio saturates.
    pub max_redeem_duration: u64,
    /// Percent of a vesting amount granted to the compensation plugin.
    pub compensation_adjustment: u64,
}

impl Default for RedeemSettings {
    fn default() -> Self {
        Self {
            min_redeem_ratio: DEFAULT_MIN_REDEEM_RATIO,
            max_redeem_ratio: DEFAULT_MAX_REDEEM_RATIO,
            min_redeem_duration: DEFAULT_MIN_REDEEM_DURATION,
            max_redeem_duration: DEFAULT_MAX_REDEEM_DURATION,
            compensation_adjustment: DEFAULT_COMPENSATION_ADJUSTMENT,
        }
    }
}

impl RedeemSettings {
    /// Check the bounds listed on the type.
    ///
    /// # Examples
    ///
    /// ```
    /// use vesta_core::types::RedeemSettings;
    ///
    /// assert!(RedeemSettings::default().validate().is_ok());
    /// let bad = RedeemSettings { min_redeem_ratio: 80, max_redeem_ratio: 60, ..Default::default() };
    /// assert!(bad.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.min_redeem_ratio > self.max_redeem_ratio {
            return Err(ConfigurationError::RatioBoundsInverted {
                min: self.min_redeem_ratio,
                max: self.max_redeem_ratio,
            });
        }
        if self.max_redeem_ratio > MAX_FIXED_RATIO {
            return Err(ConfigurationError::RatioAboveMax {
                ratio: self.max_redeem_ratio,
                max: MAX_FIXED_RATIO,
            });
        }
        if self.min_redeem_duration >= self.max_redeem_duration {
            return Err(ConfigurationError::DurationBoundsInverted {
                min: self.min_redeem_duration,
                max: self.max_redeem_duration,
            });
        }
        if self.compensation_adjustment > MAX_COMPENSATION_ADJUSTMENT {
            return Err(ConfigurationError::AdjustmentAboveMax {
                adjustment: self.compensation_adjustment,
                max: MAX_COMPENSATION_ADJUSTMENT,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_display_is_prefixed_hex() {
        let a = Address([0xAB; 20]);
        assert_eq!(a.to_string(), format!("0x{}", "ab".repeat(20)));
    }

    #[test]
    fn address_parse_roundtrip() {
        let a = Address([0x1F; 20]);
        let parsed: Address = a.to_string().parse().unwrap();
        assert_eq!(parsed, a);
        let bare: Address = "1f".repeat(20).parse().unwrap();
        assert_eq!(bare, a);
    }

    #[test]
    fn address_parse_rejects_bad_input() {
        assert!(matches!(
            "0xzz".parse::<Address>(),
            Err(AddressError::InvalidHex(_))
        ));
        assert_eq!(
            "0xabcd".parse::<Address>(),
            Err(AddressError::InvalidLength(2))
        );
    }

    #[test]
    fn address_serializes_as_string() {
        let a = Address([0x01; 20]);
        let json = serde_json::to_string(&a).unwrap();
        assert_eq!(json, format!("\"0x{}\"", "01".repeat(20)));
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, a);
    }

    #[test]
    fn zero_address() {
        assert!(Address::ZERO.is_zero());
        assert!(!Address([1; 20]).is_zero());
        assert_eq!(Address::default(), Address::ZERO);
    }

    #[test]
    fn default_settings_are_reference_values() {
        let s = RedeemSettings::default();
        assert_eq!(s.min_redeem_ratio, 50);
        assert_eq!(s.max_redeem_ratio, 100);
        assert_eq!(s.min_redeem_duration, 15 * 86_400);
        assert_eq!(s.max_redeem_duration, 90 * 86_400);
        assert_eq!(s.compensation_adjustment, 50);
    }

    #[test]
    fn settings_validation_bounds() {
        let base = RedeemSettings::default();

        let ratio_over = RedeemSettings { max_redeem_ratio: 101, ..base };
        assert_eq!(
            ratio_over.validate(),
            Err(ConfigurationError::RatioAboveMax { ratio: 101, max: 100 })
        );

        let equal_durations = RedeemSettings {
            min_redeem_duration: 10,
            max_redeem_duration: 10,
            ..base
        };
        assert_eq!(
            equal_durations.validate(),
            Err(ConfigurationError::DurationBoundsInverted { min: 10, max: 10 })
        );

        let adjustment_over = RedeemSettings { compensation_adjustment: 101, ..base };
        assert!(matches!(
            adjustment_over.validate(),
            Err(ConfigurationError::AdjustmentAboveMax { .. })
        ));

        let flat = RedeemSettings { min_redeem_ratio: 100, max_redeem_ratio: 100, ..base };
        assert!(flat.validate().is_ok());
    }
}

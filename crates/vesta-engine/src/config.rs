//! Engine configuration.
//!
//! Provides [`EngineConfig`] with the reference redemption parameters. A
//! config can be built programmatically or loaded from a TOML/JSON file with
//! `VESTA_*` environment overrides (nested keys use `__`, e.g.
//! `VESTA_REDEEM__MIN_REDEEM_RATIO=60`).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use vesta_core::constants::MAX_DEALLOCATION_FEE_BPS;
use vesta_core::error::ConfigurationError;
use vesta_core::types::{Address, RedeemSettings};

/// Initial parameters for an [`EscrowEngine`](crate::EscrowEngine).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Administrative identity.
    pub owner: Address,
    /// Address under which the engine holds escrow and liquid asset.
    pub custody: Address,
    /// Redemption curve bounds and compensation share.
    pub redeem: RedeemSettings,
    /// Plugin receiving compensation grants during vesting. `None` forces the
    /// compensation adjustment to zero.
    pub compensation_plugin: Option<Address>,
    /// Per-plugin deallocation fee in basis points.
    pub deallocation_fees: BTreeMap<Address, u16>,
    /// Addresses exempt from the transfer gate, in addition to `custody`.
    pub transfer_allowlist: Vec<Address>,
    /// Only contracts may convert on behalf of another recipient.
    pub restrict_convert_to_contracts: bool,
    /// Log level filter string (e.g. "info", "vesta_engine=debug").
    pub log_level: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            owner: Address::ZERO,
            custody: Address::ZERO,
            redeem: RedeemSettings::default(),
            compensation_plugin: None,
            deallocation_fees: BTreeMap::new(),
            transfer_allowlist: Vec::new(),
            restrict_convert_to_contracts: true,
            log_level: "info".to_string(),
        }
    }
}

impl EngineConfig {
    /// Default parameters with the given owner and custody address.
    pub fn new(owner: Address, custody: Address) -> Self {
        Self {
            owner,
            custody,
            ..Self::default()
        }
    }

    /// `<config dir>/vesta/engine.toml`.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vesta")
            .join("engine.toml")
    }

    /// Load and validate a config file, applying `VESTA_*` environment overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigurationError> {
        let raw = ::config::Config::builder()
            .add_source(::config::File::from(path))
            .add_source(
                ::config::Environment::with_prefix("VESTA")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(|e| ConfigurationError::Invalid(e.to_string()))?;
        let config: Self = raw
            .try_deserialize()
            .map_err(|e| ConfigurationError::Invalid(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.owner.is_zero() {
            return Err(ConfigurationError::Invalid("owner must be set".into()));
        }
        if self.custody.is_zero() {
            return Err(ConfigurationError::Invalid("custody must be set".into()));
        }
        self.redeem.validate()?;
        if let Some((_, &fee_bps)) = self
            .deallocation_fees
            .iter()
            .find(|(_, fee)| **fee > MAX_DEALLOCATION_FEE_BPS)
        {
            return Err(ConfigurationError::FeeTooHigh {
                fee_bps,
                max_bps: MAX_DEALLOCATION_FEE_BPS,
            });
        }
        Ok(())
    }

    /// The compensation plugin, with the zero address treated as unset.
    pub fn compensation_plugin(&self) -> Address {
        self.compensation_plugin.unwrap_or(Address::ZERO)
    }

    /// Redeem settings as the engine applies them: with no compensation
    /// plugin the adjustment is zero.
    pub fn effective_redeem_settings(&self) -> RedeemSettings {
        let mut settings = self.redeem;
        if self.compensation_plugin().is_zero() {
            settings.compensation_adjustment = 0;
        }
        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OWNER: Address = Address([0x0A; 20]);
    const CUSTODY: Address = Address([0xEE; 20]);

    #[test]
    fn default_requires_identities() {
        let cfg = EngineConfig::default();
        assert!(matches!(cfg.validate(), Err(ConfigurationError::Invalid(_))));
        assert!(EngineConfig::new(OWNER, CUSTODY).validate().is_ok());
    }

    #[test]
    fn default_restricts_conversion_and_logs_info() {
        let cfg = EngineConfig::default();
        assert!(cfg.restrict_convert_to_contracts);
        assert_eq!(cfg.log_level, "info");
    }

    #[test]
    fn no_plugin_zeroes_adjustment() {
        let cfg = EngineConfig::new(OWNER, CUSTODY);
        assert_eq!(cfg.redeem.compensation_adjustment, 50);
        assert_eq!(cfg.effective_redeem_settings().compensation_adjustment, 0);

        let with_plugin = EngineConfig {
            compensation_plugin: Some(Address([0xD1; 20])),
            ..cfg
        };
        assert_eq!(with_plugin.effective_redeem_settings().compensation_adjustment, 50);
    }

    #[test]
    fn fee_ceiling_enforced() {
        let mut cfg = EngineConfig::new(OWNER, CUSTODY);
        cfg.deallocation_fees.insert(Address([0xD1; 20]), 201);
        assert_eq!(
            cfg.validate(),
            Err(ConfigurationError::FeeTooHigh { fee_bps: 201, max_bps: 200 })
        );
    }

    #[test]
    fn default_path_ends_with_engine_toml() {
        let path = EngineConfig::default_path();
        assert!(path.ends_with("vesta/engine.toml"), "{path:?}");
    }

    #[test]
    fn load_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.toml");
        let plugin = Address([0xD1; 20]);
        let toml = format!(
            r#"
owner = "{OWNER}"
custody = "{CUSTODY}"
compensation_plugin = "{plugin}"
transfer_allowlist = ["{sale}"]

[redeem]
min_redeem_ratio = 60
max_redeem_ratio = 90
min_redeem_duration = 86400
max_redeem_duration = 864000
compensation_adjustment = 25

[deallocation_fees]
"{plugin}" = 150
"#,
            sale = Address([0x5A; 20]),
        );
        std::fs::write(&path, toml).unwrap();

        let cfg = EngineConfig::load(&path).unwrap();
        assert_eq!(cfg.owner, OWNER);
        assert_eq!(cfg.custody, CUSTODY);
        assert_eq!(cfg.compensation_plugin, Some(plugin));
        assert_eq!(cfg.redeem.min_redeem_ratio, 60);
        assert_eq!(cfg.redeem.max_redeem_duration, 864_000);
        assert_eq!(cfg.deallocation_fees.get(&plugin), Some(&150));
        assert_eq!(cfg.transfer_allowlist, vec![Address([0x5A; 20])]);
        assert!(cfg.restrict_convert_to_contracts);
    }

    #[test]
    fn load_rejects_invalid_bounds() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.toml");
        let toml = format!(
            "owner = \"{OWNER}\"\ncustody = \"{CUSTODY}\"\n[redeem]\nmin_redeem_ratio = 90\nmax_redeem_ratio = 10\n"
        );
        std::fs::write(&path, toml).unwrap();
        assert_eq!(
            EngineConfig::load(&path),
            Err(ConfigurationError::RatioBoundsInverted { min: 90, max: 10 })
        );
    }

    #[test]
    fn load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = EngineConfig::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigurationError::Invalid(_)));
    }
}

//! Tunable thresholds and symbol table extensions for the exposure engine.

use std::collections::BTreeMap;
use std::path::Path;

use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::{
    DELTA_NEUTRAL_THRESHOLD, DUST_THRESHOLD, MAJOR_POSITION_THRESHOLD, NETTING_DUST_THRESHOLD,
    OTHER_TOKENS_MIN_VALUE, STABLE_UNIT_PRICE,
};
use crate::errors::{Error, Result};

/// Engine configuration. Every field has a default, so an empty JSON object
/// is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExposureConfig {
    /// Max per-symbol net/gross notional ratio for a venue to be delta-neutral (0-1)
    pub delta_neutral_threshold: Decimal,
    /// Margin allocations, reserves and balances at or below this are dropped
    pub dust_threshold: Decimal,
    /// Netted wallet symbols at or above this absolute value are reported individually
    pub major_position_threshold: Decimal,
    /// Netted wallet symbols below this absolute value are dropped as dust
    pub netting_dust_threshold: Decimal,
    /// Price assumed for stable symbols with no market quote
    pub stable_unit_price: Decimal,
    /// "Other positions" totals above this are re-injected as OTHER_TOKENS
    pub other_tokens_min_value: Decimal,
    /// Symbols added to the built-in stable set
    pub extra_stable_symbols: Vec<String>,
    /// Symbols added to the built-in neutral set
    pub extra_neutral_symbols: Vec<String>,
    /// Alias -> base symbol pairs added to the built-in alias table
    pub extra_aliases: BTreeMap<String, String>,
    /// Protocol names the netted position extractor ignores (case-insensitive)
    pub skip_protocols: Vec<String>,
}

impl Default for ExposureConfig {
    fn default() -> Self {
        Self {
            delta_neutral_threshold: DELTA_NEUTRAL_THRESHOLD,
            dust_threshold: DUST_THRESHOLD,
            major_position_threshold: MAJOR_POSITION_THRESHOLD,
            netting_dust_threshold: NETTING_DUST_THRESHOLD,
            stable_unit_price: STABLE_UNIT_PRICE,
            other_tokens_min_value: OTHER_TOKENS_MIN_VALUE,
            extra_stable_symbols: Vec::new(),
            extra_neutral_symbols: Vec::new(),
            extra_aliases: BTreeMap::new(),
            skip_protocols: vec!["hyperliquid".to_string(), "lighter".to_string()],
        }
    }
}

impl ExposureConfig {
    /// Parses and validates a JSON configuration document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: ExposureConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a JSON configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading exposure config from {}", path.display());
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::ConfigIO(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&raw)
    }

    /// Rejects thresholds that would make the engine's arithmetic meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.delta_neutral_threshold < Decimal::ZERO || self.delta_neutral_threshold > Decimal::ONE
        {
            return Err(Error::InvalidConfigValue(format!(
                "deltaNeutralThreshold must be within [0, 1], got {}",
                self.delta_neutral_threshold
            )));
        }

        let non_negative = [
            ("dustThreshold", self.dust_threshold),
            ("majorPositionThreshold", self.major_position_threshold),
            ("nettingDustThreshold", self.netting_dust_threshold),
            ("otherTokensMinValue", self.other_tokens_min_value),
        ];
        for (name, value) in non_negative {
            if value < Decimal::ZERO {
                return Err(Error::InvalidConfigValue(format!(
                    "{} must not be negative, got {}",
                    name, value
                )));
            }
        }

        if self.stable_unit_price <= Decimal::ZERO {
            return Err(Error::InvalidConfigValue(format!(
                "stableUnitPrice must be positive, got {}",
                self.stable_unit_price
            )));
        }

        Ok(())
    }

    /// Returns true when the extractor should ignore the named protocol.
    pub fn is_skipped_protocol(&self, name: &str) -> bool {
        let name = name.trim();
        !name.is_empty()
            && self
                .skip_protocols
                .iter()
                .any(|p| p.trim().eq_ignore_ascii_case(name))
    }
}

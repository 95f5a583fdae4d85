//! Ledger entities: incoming balance records, contributions and the
//! consolidated per-symbol exposure they accumulate into.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnError};

use crate::margin::MarginPositionAllocation;
use crate::symbols::Stability;

/// A spot-style balance from an exchange, wallet or DeFi collaborator.
///
/// Malformed numbers (`null`, wrong type) read as zero, which the service
/// then drops as dust.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawBalanceRecord {
    pub platform: String,
    pub symbol: String,
    /// Units held; zero means "unknown, infer from price"
    #[serde_as(as = "DefaultOnError")]
    pub quantity: Decimal,
    #[serde_as(as = "DefaultOnError")]
    pub usd_value: Decimal,
    #[serde_as(as = "DefaultOnError")]
    pub chain: Option<String>,
    /// Known category from the collaborator, bypassing classification
    #[serde_as(as = "DefaultOnError")]
    pub stability_override: Option<bool>,
}

/// Per-asset metadata accumulated across contributions.
///
/// Each field has a fixed merge policy, applied by [`AssetMetadata::merge`]:
///
/// | field                       | policy            |
/// |-----------------------------|-------------------|
/// | `is_margin_position`        | logical OR        |
/// | `is_margin_reserve`         | logical OR        |
/// | `source_platform`           | overwrite if set  |
/// | `chains`                    | set union         |
/// | `margin_underlyings`        | key-wise sum      |
/// | `margin_underlying_details` | concatenate       |
/// | `delta_neutral`             | logical AND       |
/// | `net_exposure_ratio`        | overwrite if set  |
/// | `total_unrealized_pnl`      | sum               |
/// | `platform_unrealized_pnl`   | key-wise sum      |
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AssetMetadata {
    pub is_margin_position: bool,
    pub is_margin_reserve: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_platform: Option<String>,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub chains: BTreeSet<String>,
    /// Underlying symbol -> margin attributed to it
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub margin_underlyings: BTreeMap<String, Decimal>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub margin_underlying_details: Vec<MarginPositionAllocation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delta_neutral: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub net_exposure_ratio: Option<Decimal>,
    pub total_unrealized_pnl: Decimal,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub platform_unrealized_pnl: BTreeMap<String, Decimal>,
}

impl AssetMetadata {
    /// Merges `update` into `self` field by field.
    pub fn merge(&mut self, update: AssetMetadata) {
        // Destructured so that a new field cannot be added without a policy
        let AssetMetadata {
            is_margin_position,
            is_margin_reserve,
            source_platform,
            chains,
            margin_underlyings,
            margin_underlying_details,
            delta_neutral,
            net_exposure_ratio,
            total_unrealized_pnl,
            platform_unrealized_pnl,
        } = update;

        self.is_margin_position |= is_margin_position;
        self.is_margin_reserve |= is_margin_reserve;
        if source_platform.is_some() {
            self.source_platform = source_platform;
        }
        self.chains.extend(chains);
        for (symbol, amount) in margin_underlyings {
            *self.margin_underlyings.entry(symbol).or_insert(Decimal::ZERO) += amount;
        }
        self.margin_underlying_details
            .extend(margin_underlying_details);
        if let Some(flag) = delta_neutral {
            self.delta_neutral = Some(self.delta_neutral.unwrap_or(true) && flag);
        }
        if net_exposure_ratio.is_some() {
            self.net_exposure_ratio = net_exposure_ratio;
        }
        self.total_unrealized_pnl += total_unrealized_pnl;
        for (platform, pnl) in platform_unrealized_pnl {
            *self.platform_unrealized_pnl.entry(platform).or_insert(Decimal::ZERO) += pnl;
        }
    }

    /// True for margin buckets, whose stability tracks the delta-neutral verdict.
    pub fn is_margin_bucket(&self) -> bool {
        self.is_margin_position || self.is_margin_reserve
    }
}

/// One addition to the ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct Contribution {
    pub symbol: String,
    /// Units contributed; `None` or zero asks the ledger to infer it from price
    pub quantity: Option<Decimal>,
    pub value: Decimal,
    pub platform: String,
    pub metadata: AssetMetadata,
    pub stability_override: Option<Stability>,
    pub pnl_delta: Decimal,
}

impl Contribution {
    pub fn new(symbol: impl Into<String>, value: Decimal, platform: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            quantity: None,
            value,
            platform: platform.into(),
            metadata: AssetMetadata::default(),
            stability_override: None,
            pnl_delta: Decimal::ZERO,
        }
    }

    pub fn with_quantity(mut self, quantity: Decimal) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn with_metadata(mut self, metadata: AssetMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_override(mut self, stability: Stability) -> Self {
        self.stability_override = Some(stability);
        self
    }

    pub fn with_pnl_delta(mut self, pnl: Decimal) -> Self {
        self.pnl_delta = pnl;
        self
    }
}

impl From<&RawBalanceRecord> for Contribution {
    fn from(record: &RawBalanceRecord) -> Self {
        let mut contribution = Contribution::new(&record.symbol, record.usd_value, &record.platform);
        if record.quantity != Decimal::ZERO {
            contribution.quantity = Some(record.quantity);
        }
        if let Some(chain) = record.chain.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            contribution.metadata.chains.insert(chain.to_lowercase());
        }
        contribution.stability_override = record.stability_override.map(Stability::from_stable_flag);
        contribution
    }
}

/// Aggregated exposure for one canonical symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsolidatedAsset {
    pub symbol: String,
    pub total_quantity: Decimal,
    pub total_value_usd: Decimal,
    pub stability: Stability,
    /// Platform -> value contributed
    pub platforms: BTreeMap<String, Decimal>,
    pub metadata: AssetMetadata,
    /// Whether the asset was created from an explicit override, which allows
    /// later contributions to reclassify it
    #[serde(skip)]
    pub(crate) override_semantics: bool,
}

impl ConsolidatedAsset {
    pub fn new(symbol: String, stability: Stability, override_semantics: bool) -> Self {
        Self {
            symbol,
            total_quantity: Decimal::ZERO,
            total_value_usd: Decimal::ZERO,
            stability,
            platforms: BTreeMap::new(),
            metadata: AssetMetadata::default(),
            override_semantics,
        }
    }

    /// Nullable-boolean view of the classification (`None` for neutral).
    pub fn is_stable(&self) -> Option<bool> {
        self.stability.as_flag()
    }

    /// Sum of per-platform values; equals `total_value_usd` by construction.
    pub fn platform_total(&self) -> Decimal {
        self.platforms.values().copied().sum()
    }
}

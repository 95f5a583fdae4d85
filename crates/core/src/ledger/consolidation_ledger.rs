//! Multi-source consolidation of balances into per-symbol exposure.

use std::collections::BTreeMap;

use log::{debug, warn};
use rust_decimal::Decimal;

use super::ledger_model::{AssetMetadata, ConsolidatedAsset, Contribution, RawBalanceRecord};
use crate::config::ExposureConfig;
use crate::margin::MarginAllocationResult;
use crate::prices::PriceLookup;
use crate::symbols::{
    clean_symbol, margin_reserve_symbol, margin_symbol, Stability, StabilityClassifier,
    SymbolNormalizer,
};

/// Accumulates contributions from every source into one entry per canonical
/// symbol.
///
/// A ledger is built once per analysis run and is not meant to be shared
/// across threads; the aggregator reads it through [`ConsolidationLedger::get`].
pub struct ConsolidationLedger<'a> {
    normalizer: SymbolNormalizer,
    classifier: StabilityClassifier,
    prices: &'a dyn PriceLookup,
    stable_unit_price: Decimal,
    assets: BTreeMap<String, ConsolidatedAsset>,
}

impl<'a> ConsolidationLedger<'a> {
    pub fn new(config: &ExposureConfig, prices: &'a dyn PriceLookup) -> Self {
        Self {
            normalizer: SymbolNormalizer::with_extra_aliases(&config.extra_aliases),
            classifier: StabilityClassifier::from_config(config),
            prices,
            stable_unit_price: config.stable_unit_price,
            assets: BTreeMap::new(),
        }
    }

    /// Adds a contribution. Returns false when it was rejected (no usable
    /// symbol or a negative value); rejection never affects other entries.
    pub fn add(&mut self, contribution: Contribution) -> bool {
        let Contribution {
            symbol: raw_symbol,
            quantity,
            value,
            platform,
            metadata,
            stability_override,
            pnl_delta,
        } = contribution;

        let symbol = self.normalizer.normalize(&raw_symbol);
        if symbol.is_empty() {
            debug!("Rejecting {} contribution with empty symbol '{}'", platform, raw_symbol);
            return false;
        }
        if value < Decimal::ZERO {
            warn!(
                "Rejecting negative {} contribution for {} on {}",
                value, symbol, platform
            );
            return false;
        }

        let quantity = match quantity.filter(|q| !q.is_zero()) {
            Some(q) => q,
            None => self.infer_quantity(&symbol, &raw_symbol, value),
        };

        let classifier = &self.classifier;
        let asset = self.assets.entry(symbol.clone()).or_insert_with(|| {
            let stability = classifier.classify_with_override(&symbol, stability_override);
            ConsolidatedAsset::new(symbol.clone(), stability, stability_override.is_some())
        });

        asset.metadata.merge(metadata);

        if asset.override_semantics {
            if let Some(stability) = stability_override {
                asset.stability = stability;
            }
            // Margin buckets follow the aggregated delta-neutral verdict
            if asset.metadata.is_margin_bucket() {
                if let Some(delta_neutral) = asset.metadata.delta_neutral {
                    asset.stability = Stability::from_stable_flag(delta_neutral);
                }
            }
        } else if stability_override.is_some_and(|s| s != asset.stability) {
            debug!(
                "Ignoring override for {}: classified without override semantics",
                asset.symbol
            );
        }

        asset.total_quantity += quantity;
        asset.total_value_usd += value;
        *asset.platforms.entry(platform.clone()).or_insert(Decimal::ZERO) += value;

        if !pnl_delta.is_zero() {
            asset.metadata.total_unrealized_pnl += pnl_delta;
            *asset
                .metadata
                .platform_unrealized_pnl
                .entry(platform)
                .or_insert(Decimal::ZERO) += pnl_delta;
        }

        true
    }

    /// Adds a spot-style balance record.
    pub fn add_balance(&mut self, record: &RawBalanceRecord) -> bool {
        self.add(Contribution::from(record))
    }

    /// Records a venue's margin allocation: one `MARGIN_<VENUE>` contribution
    /// per allocated position and a stable `MARGIN_RESERVE_<VENUE>` for the
    /// reserve. Position buckets are stable only when the venue is
    /// delta-neutral.
    pub fn add_margin_allocation(&mut self, allocation: &MarginAllocationResult) {
        let platform = allocation.platform.as_str();

        if !allocation.per_position.is_empty() {
            let bucket = margin_symbol(platform);
            for position in &allocation.per_position {
                let mut metadata = AssetMetadata {
                    is_margin_position: true,
                    source_platform: Some(platform.to_string()),
                    delta_neutral: Some(allocation.delta_neutral),
                    net_exposure_ratio: Some(allocation.net_exposure_ratio),
                    ..AssetMetadata::default()
                };
                metadata
                    .margin_underlyings
                    .insert(position.symbol.clone(), position.margin_value);
                metadata.margin_underlying_details.push(position.clone());

                self.add(
                    Contribution::new(&bucket, position.margin_value, platform)
                        .with_metadata(metadata)
                        .with_override(Stability::from_stable_flag(allocation.delta_neutral))
                        .with_pnl_delta(position.unrealized_pnl),
                );
            }
        }

        if allocation.reserve_emitted {
            let metadata = AssetMetadata {
                is_margin_reserve: true,
                source_platform: Some(platform.to_string()),
                delta_neutral: Some(true),
                ..AssetMetadata::default()
            };
            self.add(
                Contribution::new(margin_reserve_symbol(platform), allocation.reserve_value, platform)
                    .with_metadata(metadata)
                    .with_override(Stability::Stable),
            );
        }
    }

    /// Read-only view of the consolidated assets.
    pub fn get(&self) -> &BTreeMap<String, ConsolidatedAsset> {
        &self.assets
    }

    /// Price lookup this ledger infers quantities with.
    pub fn prices(&self) -> &'a dyn PriceLookup {
        self.prices
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Units implied by `value`: market price under the canonical, cleaned
    /// and raw spellings, else the stable unit price for stable symbols.
    fn infer_quantity(&self, symbol: &str, raw_symbol: &str, value: Decimal) -> Decimal {
        if value <= Decimal::ZERO {
            return Decimal::ZERO;
        }

        let cleaned = clean_symbol(raw_symbol);
        let raw_upper = raw_symbol.trim().to_uppercase();
        if let Some(price) = self.prices.first_price(&[symbol, cleaned.as_str(), raw_upper.as_str()]) {
            return value / price;
        }

        if self.classifier.classify(symbol) == Stability::Stable {
            return value / self.stable_unit_price;
        }

        debug!("No price for {}; quantity left at zero", symbol);
        Decimal::ZERO
    }
}

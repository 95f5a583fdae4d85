//! Portfolio-level totals and percentages over a consolidated ledger.

use std::collections::BTreeMap;

use log::{debug, warn};
use rust_decimal::Decimal;

use super::exposure_model::{AssetView, ExposureReport, NO_PORTFOLIO_VALUE_ERROR};
use crate::config::ExposureConfig;
use crate::ledger::{ConsolidatedAsset, ConsolidationLedger};
use crate::prices::PriceLookup;
use crate::symbols::Stability;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

fn percent(part: Decimal, whole: Decimal) -> Decimal {
    if whole > Decimal::ZERO {
        part / whole * HUNDRED
    } else {
        Decimal::ZERO
    }
}

/// Builds an [`ExposureReport`] from consolidated assets.
#[derive(Debug, Clone)]
pub struct ExposureAggregator {
    stable_unit_price: Decimal,
}

impl Default for ExposureAggregator {
    fn default() -> Self {
        Self::new(&ExposureConfig::default())
    }
}

impl ExposureAggregator {
    pub fn new(config: &ExposureConfig) -> Self {
        Self {
            stable_unit_price: config.stable_unit_price,
        }
    }

    /// Aggregates a ledger, pricing assets with the ledger's own price lookup.
    pub fn aggregate(&self, ledger: &ConsolidationLedger<'_>, total_portfolio_value: Decimal) -> ExposureReport {
        self.aggregate_assets(ledger.get(), total_portfolio_value, ledger.prices())
    }

    /// Aggregates already-consolidated assets.
    ///
    /// Percentages of individual assets are taken over `total_portfolio_value`;
    /// the top-level stable and non-stable percentages are taken over the
    /// categorized subtotal, so neutral assets never skew them.
    pub fn aggregate_assets(
        &self,
        assets: &BTreeMap<String, ConsolidatedAsset>,
        total_portfolio_value: Decimal,
        prices: &dyn PriceLookup,
    ) -> ExposureReport {
        if total_portfolio_value <= Decimal::ZERO {
            warn!(
                "Portfolio value {} is not positive; returning empty exposure report",
                total_portfolio_value
            );
            return ExposureReport::empty_with_error(NO_PORTFOLIO_VALUE_ERROR);
        }

        let mut report = ExposureReport {
            total_portfolio_value,
            asset_count: assets.len(),
            ..ExposureReport::default()
        };

        for asset in assets.values() {
            match asset.stability {
                Stability::Stable => {
                    report.stable_value += asset.total_value_usd;
                    report.stable_asset_count += 1;
                }
                Stability::NonStable => {
                    report.non_stable_value += asset.total_value_usd;
                    report.non_stable_asset_count += 1;
                }
                Stability::Neutral => {
                    report.neutral_value += asset.total_value_usd;
                    report.neutral_asset_count += 1;
                }
            }
        }

        let categorized = report.stable_value + report.non_stable_value;
        if categorized > Decimal::ZERO {
            report.stable_percentage = percent(report.stable_value, categorized);
            // Complement keeps the pair summing to exactly 100
            report.non_stable_percentage = HUNDRED - report.stable_percentage;
        }

        if report.stable_value + report.non_stable_value + report.neutral_value > total_portfolio_value {
            debug!(
                "Consolidated value exceeds reported portfolio value {}",
                total_portfolio_value
            );
        }

        report.consolidated_assets = assets
            .iter()
            .map(|(symbol, asset)| {
                let view = self.asset_view(asset, total_portfolio_value, report.non_stable_value, prices);
                (symbol.clone(), view)
            })
            .collect();

        report
    }

    fn asset_view(
        &self,
        asset: &ConsolidatedAsset,
        total_portfolio_value: Decimal,
        non_stable_total: Decimal,
        prices: &dyn PriceLookup,
    ) -> AssetView {
        let market_price = prices.price(&asset.symbol).filter(|p| *p > Decimal::ZERO);
        let implied_price = match market_price {
            None if asset.total_quantity > Decimal::ZERO && asset.total_value_usd > Decimal::ZERO => {
                Some(asset.total_value_usd / asset.total_quantity)
            }
            _ => None,
        };
        let current_price = market_price.or(implied_price).or_else(|| {
            (asset.stability == Stability::Stable).then_some(self.stable_unit_price)
        });

        let percentage_of_non_stable = (asset.stability == Stability::NonStable)
            .then(|| percent(asset.total_value_usd, non_stable_total));

        let metadata = asset.metadata.clone();
        AssetView {
            symbol: asset.symbol.clone(),
            stability: asset.stability,
            is_stable: asset.is_stable(),
            total_quantity: asset.total_quantity,
            current_price,
            market_price,
            implied_price,
            total_value_usd: asset.total_value_usd,
            percentage_of_portfolio: percent(asset.total_value_usd, total_portfolio_value),
            percentage_of_non_stable,
            platforms: asset.platforms.clone(),
            platform_count: asset.platforms.len(),
            total_unrealized_pnl: Some(metadata.total_unrealized_pnl).filter(|p| !p.is_zero()),
            platform_unrealized_pnl: metadata.platform_unrealized_pnl.clone(),
            margin_underlying_details: metadata.margin_underlying_details.clone(),
            metadata,
        }
    }
}

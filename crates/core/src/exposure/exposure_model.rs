//! Exposure analysis inputs and the report produced from them.

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnError, VecSkipError};

use crate::constants::{DISPLAY_DECIMAL_PRECISION, LOW_RISK_NON_STABLE_PCT, MEDIUM_RISK_NON_STABLE_PCT};
use crate::ledger::{AssetMetadata, RawBalanceRecord};
use crate::margin::{MarginPositionAllocation, RawPositionRecord};
use crate::prices::PriceTable;
use crate::summary::PortfolioSummaryStats;
use crate::symbols::Stability;

/// Error message of the report produced for a non-positive portfolio value.
pub const NO_PORTFOLIO_VALUE_ERROR: &str = "No positive portfolio value found";

// ============================================================================
// Inputs
// ============================================================================

/// A derivatives venue account: reported equity and open positions.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MarginAccount {
    pub platform: String,
    /// Reported account equity; derived from the positions when absent
    #[serde_as(as = "DefaultOnError")]
    pub account_equity: Option<Decimal>,
    #[serde_as(as = "VecSkipError<_>")]
    pub positions: Vec<RawPositionRecord>,
}

/// An exchange that only reported a total balance.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MixedExchangeBalance {
    pub exchange: String,
    #[serde_as(as = "DefaultOnError")]
    pub total_value: Decimal,
}

/// Everything one analysis run consumes, already materialized by the
/// data collaborators.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PortfolioSnapshot {
    #[serde_as(as = "DefaultOnError")]
    pub total_portfolio_value: Decimal,
    pub crypto_prices: PriceTable,
    /// Exchange spot balances and wallet balances
    #[serde_as(as = "VecSkipError<_>")]
    pub balances: Vec<RawBalanceRecord>,
    #[serde_as(as = "VecSkipError<_>")]
    pub margin_accounts: Vec<MarginAccount>,
    #[serde_as(as = "VecSkipError<_>")]
    pub mixed_exchange_balances: Vec<MixedExchangeBalance>,
    /// Netted EVM wallet summary, used instead of per-token EVM balances
    #[serde_as(as = "DefaultOnError")]
    pub wallet_summary: Option<PortfolioSummaryStats>,
}

// ============================================================================
// Report
// ============================================================================

/// Portfolio risk profile by share of non-stable value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn from_non_stable_percentage(percentage: Decimal) -> Self {
        if percentage < LOW_RISK_NON_STABLE_PCT {
            RiskLevel::Low
        } else if percentage < MEDIUM_RISK_NON_STABLE_PCT {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        };
        f.write_str(label)
    }
}

/// One consolidated asset as reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetView {
    pub symbol: String,
    pub stability: Stability,
    /// `None` for neutral assets
    pub is_stable: Option<bool>,
    pub total_quantity: Decimal,
    /// Market price, else implied price, else the stable unit price
    pub current_price: Option<Decimal>,
    pub market_price: Option<Decimal>,
    /// Value / quantity, only when no market price exists
    pub implied_price: Option<Decimal>,
    pub total_value_usd: Decimal,
    pub percentage_of_portfolio: Decimal,
    /// Share of the non-stable subtotal; set for non-stable assets only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentage_of_non_stable: Option<Decimal>,
    pub platforms: BTreeMap<String, Decimal>,
    pub platform_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_unrealized_pnl: Option<Decimal>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub platform_unrealized_pnl: BTreeMap<String, Decimal>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub margin_underlying_details: Vec<MarginPositionAllocation>,
    pub metadata: AssetMetadata,
}

/// Portfolio-level exposure totals and per-asset breakdown.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExposureReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub total_portfolio_value: Decimal,
    pub stable_value: Decimal,
    pub non_stable_value: Decimal,
    /// Value of neutral assets, excluded from both percentages
    pub neutral_value: Decimal,
    /// Share of `stable_value + non_stable_value`
    pub stable_percentage: Decimal,
    pub non_stable_percentage: Decimal,
    pub consolidated_assets: BTreeMap<String, AssetView>,
    pub asset_count: usize,
    pub stable_asset_count: usize,
    pub non_stable_asset_count: usize,
    pub neutral_asset_count: usize,
}

impl ExposureReport {
    /// Report flagged with `error`, all totals zero.
    pub fn empty_with_error(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::default()
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn assets_by_stability(&self, stability: Stability) -> impl Iterator<Item = &AssetView> {
        self.consolidated_assets
            .values()
            .filter(move |asset| asset.stability == stability)
    }

    pub fn risk_level(&self) -> RiskLevel {
        RiskLevel::from_non_stable_percentage(self.non_stable_percentage)
    }

    /// One-line risk summary for logs and terminal output.
    pub fn summary_line(&self) -> String {
        if self.is_error() || self.total_portfolio_value <= Decimal::ZERO {
            return "No exposure data available".to_string();
        }

        format!(
            "Portfolio Risk Exposure: {:.1}% in {} non-stable assets ({} risk profile)",
            self.non_stable_percentage.round_dp(DISPLAY_DECIMAL_PRECISION),
            self.non_stable_asset_count,
            self.risk_level()
        )
    }
}

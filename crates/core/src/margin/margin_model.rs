//! Derivative position inputs and margin allocation results.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnError};

/// An open derivative position as reported by a venue.
///
/// `signed_size` encodes direction: positive is long, negative is short.
/// Every other numeric field is optional; the allocator resolves what it
/// needs through fallbacks and skips positions it cannot size.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawPositionRecord {
    pub platform: String,
    pub symbol: String,
    #[serde_as(as = "DefaultOnError")]
    pub signed_size: Decimal,
    /// Position value in USD as reported by the venue
    #[serde_as(as = "DefaultOnError")]
    pub notional: Option<Decimal>,
    /// Margin the venue attributes to this position
    #[serde_as(as = "DefaultOnError")]
    pub explicit_margin: Option<Decimal>,
    /// Initial margin, used only to derive venue equity when none is reported
    #[serde_as(as = "DefaultOnError")]
    pub initial_margin: Option<Decimal>,
    #[serde_as(as = "DefaultOnError")]
    pub entry_price: Option<Decimal>,
    #[serde_as(as = "DefaultOnError")]
    pub mark_price: Option<Decimal>,
    #[serde_as(as = "DefaultOnError")]
    pub liquidation_price: Option<Decimal>,
    #[serde_as(as = "DefaultOnError")]
    pub leverage: Option<Decimal>,
    pub margin_mode: Option<String>,
    #[serde_as(as = "DefaultOnError")]
    pub unrealized_pnl: Option<Decimal>,
}

/// Position direction derived from the sign of the size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    /// Zero-sized positions count as long.
    pub fn from_signed_size(size: Decimal) -> Self {
        if size >= Decimal::ZERO {
            Direction::Long
        } else {
            Direction::Short
        }
    }

    pub fn sign(&self) -> Decimal {
        match self {
            Direction::Long => Decimal::ONE,
            Direction::Short => Decimal::NEGATIVE_ONE,
        }
    }
}

/// Margin attributed to one open position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarginPositionAllocation {
    pub symbol: String,
    pub platform: String,
    pub direction: Direction,
    /// Signed size as reported
    pub size: Decimal,
    pub abs_size: Decimal,
    pub notional: Decimal,
    pub margin_value: Decimal,
    /// Reported leverage, else notional / margin_value
    pub leverage: Option<Decimal>,
    pub entry_price: Option<Decimal>,
    pub mark_price: Option<Decimal>,
    pub liquidation_price: Option<Decimal>,
    pub margin_mode: Option<String>,
    pub unrealized_pnl: Decimal,
}

/// Allocation of one venue's account equity across its open positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarginAllocationResult {
    pub platform: String,
    pub account_equity: Decimal,
    pub per_position: Vec<MarginPositionAllocation>,
    /// Equity not attributed to any position (never negative)
    pub reserve_value: Decimal,
    /// True when every symbol's net notional is within the threshold of its gross
    pub delta_neutral: bool,
    /// Max over symbols of |net notional| / gross notional
    pub net_exposure_ratio: Decimal,
    /// Whether the reserve is large enough to be recorded
    pub reserve_emitted: bool,
}

impl MarginAllocationResult {
    /// Result for a venue with nothing to allocate.
    pub fn empty(platform: &str, account_equity: Decimal) -> Self {
        Self {
            platform: platform.to_string(),
            account_equity,
            per_position: Vec::new(),
            reserve_value: Decimal::ZERO,
            delta_neutral: true,
            net_exposure_ratio: Decimal::ZERO,
            reserve_emitted: false,
        }
    }

    /// Sum of the margin attributed to positions.
    pub fn total_allocated(&self) -> Decimal {
        self.per_position.iter().map(|p| p.margin_value).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.per_position.is_empty() && !self.reserve_emitted
    }
}

//! Wallet export records and the netted summary produced from them.
//!
//! These types mirror the combined wallet export format, so they keep its
//! snake_case field names.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnError, VecSkipError};

/// A token balance held directly in a wallet.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletToken {
    pub symbol: String,
    #[serde_as(as = "DefaultOnError")]
    pub amount: Decimal,
    #[serde_as(as = "DefaultOnError")]
    pub usd_value: Decimal,
    pub category: Option<String>,
    pub chain: Option<String>,
}

/// A DeFi protocol with its positions on one chain.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletProtocol {
    pub name: String,
    pub chain: Option<String>,
    #[serde_as(as = "VecSkipError<_>")]
    pub positions: Vec<ProtocolPosition>,
}

/// One supplied, borrowed, staked or pooled position within a protocol.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolPosition {
    pub asset: Option<String>,
    /// Display label, e.g. `"1.25 ETH"`; used when `asset` is absent
    pub label: Option<String>,
    #[serde(alias = "qty", alias = "balance")]
    #[serde_as(as = "DefaultOnError")]
    pub amount: Option<Decimal>,
    #[serde(alias = "value")]
    #[serde_as(as = "DefaultOnError")]
    pub usd_value: Option<Decimal>,
    /// `"borrowed"` marks a debt; anything else counts as held
    pub header_type: Option<String>,
}

impl ProtocolPosition {
    pub fn is_borrowed(&self) -> bool {
        self.header_type
            .as_deref()
            .is_some_and(|h| h.trim().eq_ignore_ascii_case(super::summary_constants::BORROWED_HEADER))
    }
}

/// Combined export of several wallets.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombinedWalletData {
    #[serde_as(as = "VecSkipError<_>")]
    pub tokens: Vec<WalletToken>,
    #[serde_as(as = "VecSkipError<_>")]
    pub protocols: Vec<WalletProtocol>,
    pub wallet_count: usize,
    pub wallets_included: Vec<String>,
}

impl CombinedWalletData {
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty() && self.protocols.is_empty()
    }
}

/// A netted symbol reported individually.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MajorPosition {
    /// Net units across the base symbol and its wrapped variants
    pub amount: Decimal,
    pub usd_value: Decimal,
    /// True when the position is a net debt
    pub is_borrowed: bool,
}

/// Netted symbols below the materiality threshold, folded together.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OtherPositions {
    pub total_value: Decimal,
    pub count: usize,
    pub percentage: Decimal,
}

/// The chain carrying the largest absolute value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrimaryChain {
    pub name: Option<String>,
    pub value: Decimal,
    pub percentage: Decimal,
}

/// Netted summary of wallet-chain holdings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortfolioSummaryStats {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    pub total_portfolio_value: Decimal,
    pub stable_total: Decimal,
    pub non_stable_total: Decimal,
    pub stable_percentage: Decimal,
    pub non_stable_percentage: Decimal,
    pub major_non_stable_positions: BTreeMap<String, MajorPosition>,
    pub other_positions: OtherPositions,
    pub primary_chain: PrimaryChain,
    pub chain_breakdown: BTreeMap<String, Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
    pub tokens_processed: usize,
    pub protocols_processed: usize,
    pub wallet_count: usize,
    pub wallets_included: Vec<String>,
}

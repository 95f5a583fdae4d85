//! Exposure service contract.

use super::exposure_model::{ExposureReport, PortfolioSnapshot};
use crate::summary::{CombinedWalletData, PortfolioSummaryStats};

/// Trait defining the contract for exposure analysis.
pub trait ExposureServiceTrait: Send + Sync {
    /// Runs the full pipeline over a snapshot: margin allocation per venue,
    /// consolidation of every balance source, then aggregation.
    ///
    /// Never fails on malformed records; a non-positive portfolio value yields
    /// an error-flagged empty report.
    fn analyze(&self, snapshot: &PortfolioSnapshot) -> ExposureReport;

    /// Nets a combined wallet export into a [`PortfolioSummaryStats`].
    fn summarize_wallets(&self, wallets: &CombinedWalletData) -> PortfolioSummaryStats;
}

//! Stablefolio Core - exposure and balance consolidation engine.
//!
//! This crate turns heterogeneous balance and position records (exchange spot
//! balances, derivative accounts, wallet holdings, DeFi positions) into a
//! single risk-categorized view of a portfolio. It performs no I/O: callers
//! supply materialized records and a price lookup, and receive plain
//! serializable result objects.

pub mod config;
pub mod constants;
pub mod errors;
pub mod exposure;
pub mod ledger;
pub mod margin;
pub mod prices;
pub mod summary;
pub mod symbols;

// Re-export the main entry points
pub use config::ExposureConfig;
pub use exposure::*;
pub use ledger::{ConsolidatedAsset, ConsolidationLedger, Contribution};
pub use margin::{MarginAllocationResult, MarginAllocator, RawPositionRecord};
pub use prices::{NoPrices, PriceLookup, PriceTable};
pub use summary::{NettedPositionExtractor, PortfolioSummaryStats};
pub use symbols::{normalize_symbol, Stability, StabilityClassifier};

// Re-export error types
pub use errors::Error;
pub use errors::Result;

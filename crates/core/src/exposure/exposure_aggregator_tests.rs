//! Unit tests for the exposure aggregator.

use super::*;
use crate::config::ExposureConfig;
use crate::ledger::{ConsolidationLedger, Contribution};
use crate::prices::{NoPrices, PriceTable};
use crate::symbols::Stability;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn mixed_ledger<'a>(config: &ExposureConfig, prices: &'a PriceTable) -> ConsolidationLedger<'a> {
    let mut ledger = ConsolidationLedger::new(config, prices);
    ledger.add(Contribution::new("USDC", dec!(600), "Binance").with_quantity(dec!(600)));
    ledger.add(Contribution::new("ETH", dec!(300), "Wallet_ethereum"));
    ledger.add(Contribution::new("CEX_Mixed_Binance", dec!(100), "CEX_Binance"));
    ledger
}

fn eth_prices() -> PriceTable {
    vec![("ETH".to_string(), dec!(2000))].into_iter().collect()
}

// ============================================================================
// Totals and percentages
// ============================================================================

#[test]
fn test_zero_portfolio_value_is_flagged() {
    let config = ExposureConfig::default();
    let prices = eth_prices();
    let ledger = mixed_ledger(&config, &prices);

    let report = ExposureAggregator::default().aggregate(&ledger, Decimal::ZERO);

    assert_eq!(report.error.as_deref(), Some(NO_PORTFOLIO_VALUE_ERROR));
    assert!(report.consolidated_assets.is_empty());
    assert_eq!(report.asset_count, 0);
    assert_eq!(report.summary_line(), "No exposure data available");

    let negative = ExposureAggregator::default().aggregate(&ledger, dec!(-5));
    assert!(negative.is_error());
}

#[test]
fn test_partition_and_percentages() {
    let config = ExposureConfig::default();
    let prices = eth_prices();
    let ledger = mixed_ledger(&config, &prices);

    let report = ExposureAggregator::default().aggregate(&ledger, dec!(1000));

    assert!(!report.is_error());
    assert_eq!(report.stable_value, dec!(600));
    assert_eq!(report.non_stable_value, dec!(300));
    assert_eq!(report.neutral_value, dec!(100));
    assert_eq!(report.asset_count, 3);
    assert_eq!(report.stable_asset_count, 1);
    assert_eq!(report.non_stable_asset_count, 1);
    assert_eq!(report.neutral_asset_count, 1);

    // Neutral value is excluded from the top-level split
    assert_eq!(report.stable_percentage + report.non_stable_percentage, dec!(100));
    assert!((report.stable_percentage - dec!(66.6667)).abs() < dec!(0.001));

    let eth = &report.consolidated_assets["ETH"];
    assert_eq!(eth.percentage_of_portfolio, dec!(30));
    assert_eq!(eth.percentage_of_non_stable, Some(dec!(100)));

    let mixed = &report.consolidated_assets["CEX_MIXED_BINANCE"];
    assert_eq!(mixed.stability, Stability::Neutral);
    assert_eq!(mixed.is_stable, None);
    assert_eq!(mixed.percentage_of_non_stable, None);
    assert_eq!(mixed.percentage_of_portfolio, dec!(10));

    let stable: Vec<&str> = report
        .assets_by_stability(Stability::Stable)
        .map(|a| a.symbol.as_str())
        .collect();
    assert_eq!(stable, vec!["USDC"]);
    assert_eq!(report.assets_by_stability(Stability::Neutral).count(), 1);
}

#[test]
fn test_only_neutral_assets_yield_zero_split() {
    let config = ExposureConfig::default();
    let mut ledger = ConsolidationLedger::new(&config, &NoPrices);
    ledger.add(Contribution::new("CEX_MIXED_OKX", dec!(500), "CEX_OKX"));

    let report = ExposureAggregator::default().aggregate(&ledger, dec!(500));

    assert_eq!(report.stable_percentage, Decimal::ZERO);
    assert_eq!(report.non_stable_percentage, Decimal::ZERO);
    assert_eq!(report.neutral_asset_count, 1);
}

// ============================================================================
// Asset views
// ============================================================================

#[test]
fn test_price_resolution() {
    let config = ExposureConfig::default();
    let prices = eth_prices();
    let mut ledger = ConsolidationLedger::new(&config, &prices);
    ledger.add(Contribution::new("ETH", dec!(4000), "Binance"));
    ledger.add(Contribution::new("HYPE", dec!(300), "Hyperliquid").with_quantity(dec!(10)));
    ledger.add(Contribution::new("GLP", dec!(100), "Wallet").with_override(Stability::Stable));
    ledger.add(Contribution::new("PEPE", dec!(50), "Wallet"));

    let report = ExposureAggregator::default().aggregate(&ledger, dec!(4450));
    let assets = &report.consolidated_assets;

    assert_eq!(assets["ETH"].market_price, Some(dec!(2000)));
    assert_eq!(assets["ETH"].current_price, Some(dec!(2000)));
    assert_eq!(assets["ETH"].implied_price, None);

    assert_eq!(assets["HYPE"].market_price, None);
    assert_eq!(assets["HYPE"].implied_price, Some(dec!(30)));
    assert_eq!(assets["HYPE"].current_price, Some(dec!(30)));

    // Stable with no quote and no quantity falls back to the unit price
    assert_eq!(assets["GLP"].current_price, Some(Decimal::ONE));
    assert_eq!(assets["PEPE"].current_price, None);
}

#[test]
fn test_pnl_and_platform_count_surface_in_view() {
    let config = ExposureConfig::default();
    let mut ledger = ConsolidationLedger::new(&config, &NoPrices);
    ledger.add(Contribution::new("SOL", dec!(100), "Bybit").with_pnl_delta(dec!(7)));
    ledger.add(Contribution::new("SOL", dec!(100), "OKX"));
    ledger.add(Contribution::new("BTC", dec!(100), "OKX"));

    let report = ExposureAggregator::default().aggregate(&ledger, dec!(300));

    let sol = &report.consolidated_assets["SOL"];
    assert_eq!(sol.platform_count, 2);
    assert_eq!(sol.total_unrealized_pnl, Some(dec!(7)));
    assert_eq!(sol.platform_unrealized_pnl["Bybit"], dec!(7));
    assert_eq!(report.consolidated_assets["BTC"].total_unrealized_pnl, None);
}

// ============================================================================
// Risk profile
// ============================================================================

#[test]
fn test_risk_level_boundaries() {
    assert_eq!(RiskLevel::from_non_stable_percentage(dec!(29.99)), RiskLevel::Low);
    assert_eq!(RiskLevel::from_non_stable_percentage(dec!(30)), RiskLevel::Medium);
    assert_eq!(RiskLevel::from_non_stable_percentage(dec!(69.9)), RiskLevel::Medium);
    assert_eq!(RiskLevel::from_non_stable_percentage(dec!(70)), RiskLevel::High);
}

#[test]
fn test_summary_line() {
    let report = ExposureReport {
        total_portfolio_value: dec!(1000),
        non_stable_percentage: dec!(33.3333),
        non_stable_asset_count: 4,
        ..ExposureReport::default()
    };
    assert_eq!(
        report.summary_line(),
        "Portfolio Risk Exposure: 33.3% in 4 non-stable assets (Medium risk profile)"
    );

    let whole = ExposureReport {
        total_portfolio_value: dec!(1000),
        non_stable_percentage: dec!(25),
        non_stable_asset_count: 1,
        ..ExposureReport::default()
    };
    assert_eq!(
        whole.summary_line(),
        "Portfolio Risk Exposure: 25.0% in 1 non-stable assets (Low risk profile)"
    );
}

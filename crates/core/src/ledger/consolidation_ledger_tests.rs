//! Unit tests for the consolidation ledger.

use super::*;
use crate::config::ExposureConfig;
use crate::margin::{MarginAllocator, RawPositionRecord};
use crate::prices::{NoPrices, PriceTable};
use crate::symbols::Stability;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ============================================================================
// Helpers
// ============================================================================

fn prices() -> PriceTable {
    vec![
        ("ETH".to_string(), dec!(2000)),
        ("BTC".to_string(), dec!(50000)),
    ]
    .into_iter()
    .collect()
}

fn perp(symbol: &str, signed_size: Decimal, notional: Decimal) -> RawPositionRecord {
    RawPositionRecord {
        platform: "Hyperliquid".to_string(),
        symbol: symbol.to_string(),
        signed_size,
        notional: Some(notional),
        ..RawPositionRecord::default()
    }
}

// ============================================================================
// Accumulation
// ============================================================================

#[test]
fn test_aliases_merge_into_one_entry() {
    let config = ExposureConfig::default();
    let prices = prices();
    let mut ledger = ConsolidationLedger::new(&config, &prices);

    assert!(ledger.add(Contribution::new("ETH", dec!(2000), "Binance").with_quantity(dec!(1))));
    assert!(ledger.add(Contribution::new("weth.arb", dec!(4000), "Wallet_arbitrum")));
    assert!(ledger.add(Contribution::new(" stETH (Lido) ", dec!(1000), "Wallet_ethereum")));

    assert_eq!(ledger.len(), 1);
    let eth = &ledger.get()["ETH"];
    assert_eq!(eth.total_value_usd, dec!(7000));
    assert_eq!(eth.total_quantity, dec!(3.5));
    assert_eq!(eth.platforms.len(), 3);
    assert_eq!(eth.platform_total(), eth.total_value_usd);
    assert_eq!(eth.stability, Stability::NonStable);
}

#[test]
fn test_same_platform_values_are_summed() {
    let config = ExposureConfig::default();
    let mut ledger = ConsolidationLedger::new(&config, &NoPrices);

    ledger.add(Contribution::new("USDC", dec!(100), "Binance"));
    ledger.add(Contribution::new("USDC", dec!(50), "Binance"));

    let usdc = &ledger.get()["USDC"];
    assert_eq!(usdc.platforms["Binance"], dec!(150));
    assert_eq!(usdc.is_stable(), Some(true));
}

#[test]
fn test_rejected_contributions_leave_ledger_untouched() {
    let config = ExposureConfig::default();
    let mut ledger = ConsolidationLedger::new(&config, &NoPrices);

    assert!(!ledger.add(Contribution::new("  ", dec!(10), "Binance")));
    assert!(!ledger.add(Contribution::new("(annotation)", dec!(10), "Binance")));
    assert!(!ledger.add(Contribution::new("ETH", dec!(-5), "Binance")));
    assert!(ledger.is_empty());
}

#[test]
fn test_balance_record_carries_chain_and_override() {
    let config = ExposureConfig::default();
    let mut ledger = ConsolidationLedger::new(&config, &NoPrices);

    let record = RawBalanceRecord {
        platform: "Wallet_base".to_string(),
        symbol: "aBasUSDbC".to_string(),
        quantity: dec!(500),
        usd_value: dec!(500),
        chain: Some("Base".to_string()),
        stability_override: Some(true),
    };
    assert!(ledger.add_balance(&record));

    let asset = &ledger.get()["ABASUSDBC"];
    assert_eq!(asset.stability, Stability::Stable);
    assert_eq!(asset.total_quantity, dec!(500));
    assert!(asset.metadata.chains.contains("base"));
}

// ============================================================================
// Quantity inference
// ============================================================================

#[test]
fn test_quantity_inferred_from_price_or_stable_unit() {
    let config = ExposureConfig::default();
    let prices = prices();
    let mut ledger = ConsolidationLedger::new(&config, &prices);

    ledger.add(Contribution::new("BTC", dec!(25000), "OKX"));
    ledger.add(Contribution::new("DAI", dec!(300), "Wallet_ethereum"));
    ledger.add(Contribution::new("PEPE", dec!(40), "Wallet_ethereum"));

    let assets = ledger.get();
    assert_eq!(assets["BTC"].total_quantity, dec!(0.5));
    assert_eq!(assets["DAI"].total_quantity, dec!(300));
    assert_eq!(assets["PEPE"].total_quantity, Decimal::ZERO);
    assert_eq!(assets["PEPE"].total_value_usd, dec!(40));
}

#[test]
fn test_quantity_inference_tries_raw_spelling() {
    let config = ExposureConfig::default();
    let prices: PriceTable = vec![("WBTC".to_string(), dec!(40000))].into_iter().collect();
    let mut ledger = ConsolidationLedger::new(&config, &prices);

    // Canonical "BTC" has no quote, the raw wrapped ticker does
    ledger.add(Contribution::new("wbtc", dec!(20000), "Wallet_ethereum"));

    assert_eq!(ledger.get()["BTC"].total_quantity, dec!(0.5));
}

// ============================================================================
// Stability overrides
// ============================================================================

#[test]
fn test_override_applies_only_with_override_semantics() {
    let config = ExposureConfig::default();
    let mut ledger = ConsolidationLedger::new(&config, &NoPrices);

    // Classified normally first: a later override must not flip it
    ledger.add(Contribution::new("ETH", dec!(100), "Binance"));
    ledger.add(Contribution::new("ETH", dec!(100), "Bybit").with_override(Stability::Stable));
    assert_eq!(ledger.get()["ETH"].stability, Stability::NonStable);

    // Created with an override: later overrides re-apply
    ledger.add(Contribution::new("GLP", dec!(100), "Wallet").with_override(Stability::Stable));
    ledger.add(Contribution::new("GLP", dec!(100), "Wallet").with_override(Stability::NonStable));
    assert_eq!(ledger.get()["GLP"].stability, Stability::NonStable);
}

// ============================================================================
// Metadata merge
// ============================================================================

#[test]
fn test_metadata_merge_policies() {
    let mut target = AssetMetadata {
        delta_neutral: Some(true),
        total_unrealized_pnl: dec!(5),
        ..AssetMetadata::default()
    };
    target.margin_underlyings.insert("ETH".to_string(), dec!(100));
    target.platform_unrealized_pnl.insert("A".to_string(), dec!(5));

    let mut update = AssetMetadata {
        is_margin_position: true,
        source_platform: Some("Hyperliquid".to_string()),
        delta_neutral: Some(false),
        net_exposure_ratio: Some(dec!(0.4)),
        total_unrealized_pnl: dec!(-2),
        ..AssetMetadata::default()
    };
    update.margin_underlyings.insert("ETH".to_string(), dec!(50));
    update.margin_underlyings.insert("BTC".to_string(), dec!(25));
    update.platform_unrealized_pnl.insert("A".to_string(), dec!(-2));

    target.merge(update);

    assert!(target.is_margin_position);
    assert_eq!(target.source_platform.as_deref(), Some("Hyperliquid"));
    assert_eq!(target.margin_underlyings["ETH"], dec!(150));
    assert_eq!(target.margin_underlyings["BTC"], dec!(25));
    assert_eq!(target.delta_neutral, Some(false));
    assert_eq!(target.net_exposure_ratio, Some(dec!(0.4)));
    assert_eq!(target.total_unrealized_pnl, dec!(3));
    assert_eq!(target.platform_unrealized_pnl["A"], dec!(3));

    // AND stays false once any contribution is directional
    target.merge(AssetMetadata {
        delta_neutral: Some(true),
        ..AssetMetadata::default()
    });
    assert_eq!(target.delta_neutral, Some(false));
}

#[test]
fn test_pnl_delta_tracked_per_platform() {
    let config = ExposureConfig::default();
    let mut ledger = ConsolidationLedger::new(&config, &NoPrices);

    ledger.add(Contribution::new("SOL", dec!(100), "Bybit").with_pnl_delta(dec!(12)));
    ledger.add(Contribution::new("SOL", dec!(100), "OKX").with_pnl_delta(dec!(-4)));
    ledger.add(Contribution::new("SOL", dec!(100), "OKX"));

    let sol = &ledger.get()["SOL"];
    assert_eq!(sol.metadata.total_unrealized_pnl, dec!(8));
    assert_eq!(sol.metadata.platform_unrealized_pnl["Bybit"], dec!(12));
    assert_eq!(sol.metadata.platform_unrealized_pnl["OKX"], dec!(-4));
}

// ============================================================================
// Margin buckets
// ============================================================================

#[test]
fn test_margin_allocation_creates_buckets() {
    let config = ExposureConfig::default();
    let mut ledger = ConsolidationLedger::new(&config, &NoPrices);

    let mut eth = perp("ETH", dec!(1), dec!(3000));
    eth.explicit_margin = Some(dec!(300));
    eth.unrealized_pnl = Some(dec!(25));
    let allocation = MarginAllocator::default().allocate("Hyperliquid", dec!(1000), &[eth], &NoPrices);
    ledger.add_margin_allocation(&allocation);

    let assets = ledger.get();
    let bucket = &assets["MARGIN_HYPERLIQUID"];
    assert_eq!(bucket.total_value_usd, dec!(300));
    assert_eq!(bucket.stability, Stability::NonStable);
    assert_eq!(bucket.metadata.margin_underlyings["ETH"], dec!(300));
    assert_eq!(bucket.metadata.margin_underlying_details.len(), 1);
    assert_eq!(bucket.metadata.total_unrealized_pnl, dec!(25));

    let reserve = &assets["MARGIN_RESERVE_HYPERLIQUID"];
    assert_eq!(reserve.total_value_usd, dec!(700));
    assert_eq!(reserve.stability, Stability::Stable);
    assert!(reserve.metadata.is_margin_reserve);
}

#[test]
fn test_delta_neutral_bucket_is_stable_until_a_directional_account_joins() {
    let config = ExposureConfig::default();
    let mut ledger = ConsolidationLedger::new(&config, &NoPrices);
    let allocator = MarginAllocator::default();

    let hedged = allocator.allocate(
        "Hyperliquid",
        dec!(200),
        &[perp("ETH", dec!(1), dec!(100)), perp("ETH", dec!(-1), dec!(100))],
        &NoPrices,
    );
    ledger.add_margin_allocation(&hedged);
    assert_eq!(ledger.get()["MARGIN_HYPERLIQUID"].stability, Stability::Stable);

    // A second account on the same venue with an unhedged book
    let directional = allocator.allocate(
        "Hyperliquid",
        dec!(100),
        &[perp("BTC", dec!(0.01), dec!(500))],
        &NoPrices,
    );
    ledger.add_margin_allocation(&directional);

    let bucket = &ledger.get()["MARGIN_HYPERLIQUID"];
    assert_eq!(bucket.metadata.delta_neutral, Some(false));
    assert_eq!(bucket.stability, Stability::NonStable);
    assert_eq!(bucket.total_value_usd, dec!(300));
    assert_eq!(bucket.platform_total(), bucket.total_value_usd);
}

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Maximum per-symbol |net| / gross notional ratio for a venue to count as delta-neutral
pub const DELTA_NEUTRAL_THRESHOLD: Decimal = dec!(0.10);

/// Values at or below this are treated as dust (margin allocations, reserves, balances)
pub const DUST_THRESHOLD: Decimal = dec!(0.01);

/// Absolute net value at which a netted wallet symbol is reported individually
pub const MAJOR_POSITION_THRESHOLD: Decimal = dec!(250);

/// Net value below which a netted wallet symbol is dropped entirely
pub const NETTING_DUST_THRESHOLD: Decimal = dec!(0.01);

/// Unit price assumed for stable symbols without a market quote
pub const STABLE_UNIT_PRICE: Decimal = dec!(1);

/// Minimum "other positions" value worth re-injecting into the ledger
pub const OTHER_TOKENS_MIN_VALUE: Decimal = dec!(1);

/// Decimal precision used when rendering percentages
pub const DISPLAY_DECIMAL_PRECISION: u32 = 1;

/// Platform label used for EVM wallet contributions
pub const EVM_WALLET_PLATFORM: &str = "Wallet_ethereum";

/// Non-stable share of the portfolio below which the risk profile is Low
pub const LOW_RISK_NON_STABLE_PCT: Decimal = dec!(30);

/// Non-stable share of the portfolio below which the risk profile is Medium
pub const MEDIUM_RISK_NON_STABLE_PCT: Decimal = dec!(70);

/// Stablecoin tickers recognised by prefix in wallet exports, where tokens
/// often carry protocol or bridge decorations (`USDC.E`, `USDTB`, ...).
pub const WALLET_STABLE_PREFIXES: &[&str] = &[
    "USDC", "USDT", "DAI", "FDUSD", "USDE", "FRAX", "TUSD", "PYUSD", "GUSD", "BUSD", "GHO",
    "CRVUSD",
];

/// Any wallet symbol containing this marker is treated as dollar-pegged.
pub const WALLET_STABLE_MARKER: &str = "USD";

/// Token category reported by wallet exports for stablecoins.
pub const STABLE_CATEGORY: &str = "stable";

/// Protocol position header marking a borrow (subtracted when netting).
pub const BORROWED_HEADER: &str = "borrowed";

/// Chain label used when a record carries none.
pub const UNKNOWN_CHAIN: &str = "unknown";

/// Major fiat-pegged assets, in canonical (uppercase, whitespace-free) form.
pub const STABLE_SYMBOLS: &[&str] = &[
    "USDT",
    "USDC",
    "DAI",
    "BUSD",
    "TUSD",
    "USDP",
    "FRAX",
    "FDUSD",
    "USDD",
    "LUSD",
    "SUSD",
    "MIM",
    "HUSD",
    "USDE",
    "USDAI",
    "USDT0",
    "USDR",
    "USDL",
    "USDX",
    "USDM",
    "EUSD",
    "PYUSD",
    "GUSD",
    "CRVUSD",
    "CUSDC",
    // Mixed stablecoin bucket produced from the EVM wallet summary
    "STABLECOINS_EVM",
];

/// Buckets whose composition is unknown. Never counted as stable or non-stable.
pub const NEUTRAL_SYMBOLS: &[&str] = &[
    "CEX_MIXED_BINANCE",
    "CEX_MIXED_OKX",
    "CEX_MIXED_BYBIT",
    "CEX_MIXED_BACKPACK",
];

/// Catch-all bucket for unclassifiable wallet tokens. Always non-stable.
pub const OTHER_TOKENS_SYMBOL: &str = "OTHER_TOKENS";

/// Stable bucket for EVM wallet stablecoins of mixed composition.
pub const STABLECOINS_EVM_SYMBOL: &str = "STABLECOINS_EVM";

/// Prefix of mixed-exchange buckets (`CEX_MIXED_<EXCHANGE>`).
pub const CEX_MIXED_PREFIX: &str = "CEX_MIXED_";

/// Naming conventions that mark a synthetic symbol as stable.
pub const STABLE_PREFIX: &str = "STABLE_";
pub const STABLE_SUFFIX: &str = "_STABLE";

/// Wrapped and liquid-staking derivatives resolved to their base asset.
/// Keys are in canonical form; applied after symbol cleanup.
pub const ASSET_ALIASES: &[(&str, &str)] = &[
    ("WETH", "ETH"),
    ("WBTC", "BTC"),
    ("WSOL", "SOL"),
    ("STETH", "ETH"),
    ("CBETH", "ETH"),
    ("RETH", "ETH"),
];

/// Wrapped-token variants collapsed into their base symbol when netting wallet positions.
pub const WRAPPED_TOKEN_MAPPINGS: &[(&str, &str)] = &[
    ("WETH", "ETH"),
    ("WBTC", "BTC"),
    ("WMATIC", "MATIC"),
    ("WBNB", "BNB"),
    ("WAVAX", "AVAX"),
    ("WFTM", "FTM"),
    ("WONE", "ONE"),
];

/// Venue names with a fixed margin bucket identifier (lowercased keys).
pub const MARGIN_VENUE_IDS: &[(&str, &str)] = &[
    ("binance usdm futures", "BINANCE_USDM"),
    ("binance coinm futures", "BINANCE_COINM"),
    ("hyperliquid", "HYPERLIQUID"),
    ("lighter", "LIGHTER"),
];

pub const MARGIN_PREFIX: &str = "MARGIN_";
pub const MARGIN_RESERVE_PREFIX: &str = "MARGIN_RESERVE_";
pub const MARGIN_FALLBACK_VENUE: &str = "MARGIN";

//! Ledger identifiers for derivative margin buckets.

use std::sync::LazyLock;

use regex::Regex;

use super::symbols_constants::{
    MARGIN_FALLBACK_VENUE, MARGIN_PREFIX, MARGIN_RESERVE_PREFIX, MARGIN_VENUE_IDS,
};

/// Runs of characters that cannot appear in a venue identifier.
static NON_ALPHANUMERIC_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9]+").expect("Invalid regex pattern"));

/// Venue identifier used inside margin bucket symbols.
fn venue_id(platform: &str) -> String {
    let key = platform.trim().to_lowercase();
    if let Some((_, id)) = MARGIN_VENUE_IDS.iter().find(|(name, _)| *name == key) {
        return (*id).to_string();
    }

    let id = NON_ALPHANUMERIC_RUN
        .replace_all(platform, "_")
        .trim_matches('_')
        .to_uppercase();
    if id.is_empty() {
        MARGIN_FALLBACK_VENUE.to_string()
    } else {
        id
    }
}

/// `MARGIN_<VENUE>`: margin allocated to open positions on a venue.
pub fn margin_symbol(platform: &str) -> String {
    format!("{}{}", MARGIN_PREFIX, venue_id(platform))
}

/// `MARGIN_RESERVE_<VENUE>`: collateral not attributable to any open position.
pub fn margin_reserve_symbol(platform: &str) -> String {
    format!("{}{}", MARGIN_RESERVE_PREFIX, venue_id(platform))
}

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnError};

use super::price_traits::PriceLookup;

/// In-memory price snapshot keyed by uppercase symbol.
///
/// Typically built from the `cryptoPrices` map captured alongside a portfolio
/// snapshot. Non-positive and unreadable quotes are kept out of the table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawQuotes", into = "HashMap<String, Decimal>")]
pub struct PriceTable {
    prices: HashMap<String, Decimal>,
}

/// Quote map as received; unreadable quotes read as zero and are dropped.
#[serde_as]
#[derive(Deserialize)]
#[serde(transparent)]
struct RawQuotes(#[serde_as(as = "HashMap<_, DefaultOnError>")] HashMap<String, Decimal>);

impl From<RawQuotes> for PriceTable {
    fn from(raw: RawQuotes) -> Self {
        PriceTable::from(raw.0)
    }
}

impl PriceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a quote. Returns false (and stores nothing) for non-positive prices.
    pub fn insert(&mut self, symbol: &str, price: Decimal) -> bool {
        let key = symbol.trim().to_uppercase();
        if key.is_empty() || price <= Decimal::ZERO {
            return false;
        }
        self.prices.insert(key, price);
        true
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

impl From<HashMap<String, Decimal>> for PriceTable {
    fn from(raw: HashMap<String, Decimal>) -> Self {
        let mut table = PriceTable::new();
        for (symbol, price) in raw {
            table.insert(&symbol, price);
        }
        table
    }
}

impl From<PriceTable> for HashMap<String, Decimal> {
    fn from(table: PriceTable) -> Self {
        table.prices
    }
}

impl FromIterator<(String, Decimal)> for PriceTable {
    fn from_iter<I: IntoIterator<Item = (String, Decimal)>>(iter: I) -> Self {
        let mut table = PriceTable::new();
        for (symbol, price) in iter {
            table.insert(&symbol, price);
        }
        table
    }
}

impl PriceLookup for PriceTable {
    fn price(&self, symbol: &str) -> Option<Decimal> {
        self.prices.get(&symbol.trim().to_uppercase()).copied()
    }
}

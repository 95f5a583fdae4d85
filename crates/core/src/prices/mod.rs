//! Price lookup capability consumed by the engine.

mod price_table;
mod price_traits;

pub use price_table::PriceTable;
pub use price_traits::{NoPrices, PriceLookup};

use rust_decimal::Decimal;

/// Market price capability injected into the engine's entry points.
///
/// Implementations return `None` when no usable quote exists. Stale or
/// missing prices are not errors: the engine falls back (implied prices,
/// stable unit price) or skips the quantity inference.
pub trait PriceLookup {
    /// USD price for `symbol`, if known.
    fn price(&self, symbol: &str) -> Option<Decimal>;

    /// First positive price among `candidates`, tried in order.
    fn first_price(&self, candidates: &[&str]) -> Option<Decimal> {
        candidates
            .iter()
            .filter(|c| !c.is_empty())
            .find_map(|c| self.price(c).filter(|p| *p > Decimal::ZERO))
    }
}

/// Lookup that never has a price.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPrices;

impl PriceLookup for NoPrices {
    fn price(&self, _symbol: &str) -> Option<Decimal> {
        None
    }
}

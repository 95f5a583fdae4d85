//! Allocation of derivative account equity to open positions.
//!
//! A venue reports its account equity and a list of open positions. Equity is
//! split across positions (explicit margin when the venue reports one,
//! otherwise pro rata by notional) and whatever remains becomes the reserve.
//! The same pass decides whether the venue is delta-neutral.

use std::collections::BTreeMap;

use log::debug;
use rust_decimal::Decimal;

use super::margin_model::{
    Direction, MarginAllocationResult, MarginPositionAllocation, RawPositionRecord,
};
use crate::config::ExposureConfig;
use crate::prices::PriceLookup;
use crate::symbols::clean_symbol;

/// A position whose notional could be resolved.
#[derive(Debug)]
struct SizedPosition<'a> {
    record: &'a RawPositionRecord,
    symbol: String,
    direction: Direction,
    abs_size: Decimal,
    notional: Decimal,
    explicit_margin: Decimal,
    mark_price: Option<Decimal>,
}

fn positive(value: Option<Decimal>) -> Option<Decimal> {
    value.filter(|v| *v > Decimal::ZERO)
}

/// Allocates venue equity across positions.
#[derive(Debug, Clone)]
pub struct MarginAllocator {
    delta_neutral_threshold: Decimal,
    dust_threshold: Decimal,
}

impl Default for MarginAllocator {
    fn default() -> Self {
        Self::new(&ExposureConfig::default())
    }
}

impl MarginAllocator {
    pub fn new(config: &ExposureConfig) -> Self {
        Self {
            delta_neutral_threshold: config.delta_neutral_threshold,
            dust_threshold: config.dust_threshold,
        }
    }

    /// Allocates `account_equity` across `positions`.
    ///
    /// `prices` supplies a reference price for positions that report neither
    /// a notional, an entry price nor a mark price. Positions that still
    /// cannot be sized are skipped.
    pub fn allocate(
        &self,
        platform: &str,
        account_equity: Decimal,
        positions: &[RawPositionRecord],
        prices: &dyn PriceLookup,
    ) -> MarginAllocationResult {
        let account_equity = account_equity.max(Decimal::ZERO);
        let sized: Vec<SizedPosition> = positions
            .iter()
            .filter_map(|record| self.size_position(record, prices))
            .collect();

        if sized.is_empty() {
            let mut result = MarginAllocationResult::empty(platform, account_equity);
            if account_equity > self.dust_threshold {
                result.reserve_value = account_equity;
                result.reserve_emitted = true;
            }
            return result;
        }

        let net_exposure_ratio = Self::net_exposure_ratio(&sized);
        let delta_neutral = net_exposure_ratio <= self.delta_neutral_threshold;

        let total_notional: Decimal = sized.iter().map(|p| p.notional).sum();
        let explicit_margin_total: Decimal = sized.iter().map(|p| p.explicit_margin).sum();
        let allocation_base = if account_equity > Decimal::ZERO {
            account_equity
        } else {
            explicit_margin_total
        };

        let mut per_position = Vec::with_capacity(sized.len());
        for position in &sized {
            let margin_value = if position.explicit_margin > Decimal::ZERO {
                position.explicit_margin
            } else if allocation_base > Decimal::ZERO && total_notional > Decimal::ZERO {
                allocation_base * position.notional / total_notional
            } else {
                Decimal::ZERO
            };

            if margin_value <= self.dust_threshold {
                debug!(
                    "Dropping {} {} allocation of {}: at or below dust threshold",
                    platform, position.symbol, margin_value
                );
                continue;
            }

            let leverage = positive(position.record.leverage).or_else(|| {
                if margin_value > Decimal::ZERO {
                    Some(position.notional / margin_value)
                } else {
                    None
                }
            });

            per_position.push(MarginPositionAllocation {
                symbol: position.symbol.clone(),
                platform: platform.to_string(),
                direction: position.direction,
                size: position.record.signed_size,
                abs_size: position.abs_size,
                notional: position.notional,
                margin_value,
                leverage,
                entry_price: positive(position.record.entry_price),
                mark_price: position.mark_price,
                liquidation_price: positive(position.record.liquidation_price),
                margin_mode: position.record.margin_mode.clone(),
                unrealized_pnl: position.record.unrealized_pnl.unwrap_or_default(),
            });
        }

        let allocated: Decimal = per_position.iter().map(|p| p.margin_value).sum();
        let reserve_value = (account_equity - allocated).max(Decimal::ZERO);

        MarginAllocationResult {
            platform: platform.to_string(),
            account_equity,
            per_position,
            reserve_value,
            delta_neutral,
            net_exposure_ratio,
            reserve_emitted: account_equity > Decimal::ZERO && reserve_value > self.dust_threshold,
        }
    }

    /// Resolves a position's notional: reported notional, then
    /// |size| x entry price, then |size| x mark (or reference) price.
    fn size_position<'a>(
        &self,
        record: &'a RawPositionRecord,
        prices: &dyn PriceLookup,
    ) -> Option<SizedPosition<'a>> {
        let symbol = clean_symbol(&record.symbol);
        if symbol.is_empty() {
            debug!("Skipping {} position without a symbol", record.platform);
            return None;
        }

        let abs_size = record.signed_size.abs();
        let mark_price = positive(record.mark_price).or_else(|| positive(prices.price(&symbol)));

        let notional = positive(record.notional.map(|n| n.abs())).or_else(|| {
            if abs_size <= Decimal::ZERO {
                return None;
            }
            positive(record.entry_price)
                .or(mark_price)
                .map(|price| abs_size * price)
        });

        let Some(notional) = notional.filter(|n| *n > Decimal::ZERO) else {
            debug!(
                "Skipping {} {} position: notional could not be resolved",
                record.platform, symbol
            );
            return None;
        };

        Some(SizedPosition {
            record,
            symbol,
            direction: Direction::from_signed_size(record.signed_size),
            abs_size,
            notional,
            explicit_margin: record.explicit_margin.unwrap_or_default().max(Decimal::ZERO),
            mark_price,
        })
    }

    /// Max over symbols of |net signed notional| / gross notional.
    fn net_exposure_ratio(positions: &[SizedPosition]) -> Decimal {
        let mut per_symbol: BTreeMap<&str, (Decimal, Decimal)> = BTreeMap::new();
        for position in positions {
            let (net, gross) = per_symbol
                .entry(position.symbol.as_str())
                .or_insert((Decimal::ZERO, Decimal::ZERO));
            *net += position.direction.sign() * position.notional;
            *gross += position.notional;
        }

        per_symbol
            .values()
            .filter(|(_, gross)| *gross > Decimal::ZERO)
            .map(|(net, gross)| net.abs() / *gross)
            .max()
            .unwrap_or(Decimal::ZERO)
    }
}

/// Account equity for a venue that reports none.
///
/// Tries, in order: the sum of explicit margins, the sum of initial margins,
/// then the sum of notional / leverage (notional alone when leverage is
/// missing).
pub fn derive_account_equity(positions: &[RawPositionRecord]) -> Decimal {
    let explicit: Decimal = positions
        .iter()
        .filter_map(|p| p.explicit_margin)
        .map(|m| m.max(Decimal::ZERO))
        .sum();
    if explicit > Decimal::ZERO {
        return explicit;
    }

    let initial: Decimal = positions
        .iter()
        .filter_map(|p| p.initial_margin)
        .map(|m| m.max(Decimal::ZERO))
        .sum();
    if initial > Decimal::ZERO {
        return initial;
    }

    positions
        .iter()
        .filter_map(|p| positive(p.notional).map(|n| (n, positive(p.leverage))))
        .map(|(notional, leverage)| match leverage {
            Some(leverage) => notional / leverage,
            None => notional,
        })
        .sum()
}

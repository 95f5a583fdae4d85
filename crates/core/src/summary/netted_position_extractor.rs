//! Netting of wallet-chain holdings into a compact exposure summary.
//!
//! Tokens and protocol positions are bucketed by canonical symbol and chain.
//! Borrowed positions subtract, so each symbol ends up with a net supplied
//! minus borrowed value. Wrapped variants are folded into their base symbol,
//! material symbols are reported individually and the rest is folded into a
//! single "other positions" aggregate.

use std::collections::BTreeMap;

use log::debug;
use rust_decimal::Decimal;

use super::summary_constants::{
    STABLE_CATEGORY, UNKNOWN_CHAIN, WALLET_STABLE_MARKER, WALLET_STABLE_PREFIXES,
};
use super::summary_model::{
    MajorPosition, OtherPositions, PortfolioSummaryStats, PrimaryChain, ProtocolPosition,
    WalletProtocol, WalletToken,
};
use crate::config::ExposureConfig;
use crate::symbols::symbols_constants::WRAPPED_TOKEN_MAPPINGS;
use crate::symbols::{Stability, StabilityClassifier, SymbolNormalizer};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Signed running totals for one symbol on one chain.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct NetAmount {
    usd: Decimal,
    amount: Decimal,
}

impl NetAmount {
    fn add(&mut self, usd: Decimal, amount: Decimal) {
        self.usd += usd;
        self.amount += amount;
    }
}

/// Accumulator for one extraction run.
#[derive(Debug, Default)]
struct NettingTally {
    stable_total: Decimal,
    /// Symbol -> chain -> net amount
    non_stable: BTreeMap<String, BTreeMap<String, NetAmount>>,
    chain_totals: BTreeMap<String, Decimal>,
}

impl NettingTally {
    fn add_stable(&mut self, chain: &str, usd: Decimal) {
        self.stable_total += usd;
        *self.chain_totals.entry(chain.to_string()).or_default() += usd;
    }

    fn add_non_stable(&mut self, symbol: &str, chain: &str, usd: Decimal, amount: Decimal) {
        self.non_stable
            .entry(symbol.to_string())
            .or_default()
            .entry(chain.to_string())
            .or_default()
            .add(usd, amount);
        *self.chain_totals.entry(chain.to_string()).or_default() += usd;
    }

    fn net_of(&self, symbol: &str) -> NetAmount {
        let mut net = NetAmount::default();
        if let Some(chains) = self.non_stable.get(symbol) {
            for bucket in chains.values() {
                net.add(bucket.usd, bucket.amount);
            }
        }
        net
    }
}

/// Produces a [`PortfolioSummaryStats`] from wallet tokens and protocol positions.
#[derive(Debug, Clone)]
pub struct NettedPositionExtractor {
    normalizer: SymbolNormalizer,
    classifier: StabilityClassifier,
    config: ExposureConfig,
}

impl Default for NettedPositionExtractor {
    fn default() -> Self {
        Self::new(&ExposureConfig::default())
    }
}

impl NettedPositionExtractor {
    pub fn new(config: &ExposureConfig) -> Self {
        Self {
            normalizer: SymbolNormalizer::with_extra_aliases(&config.extra_aliases),
            classifier: StabilityClassifier::from_config(config),
            config: config.clone(),
        }
    }

    pub fn extract(&self, tokens: &[WalletToken], protocols: &[WalletProtocol]) -> PortfolioSummaryStats {
        let mut tally = NettingTally::default();

        for token in tokens {
            let symbol = self.normalizer.normalize(&token.symbol);
            if symbol.is_empty() {
                debug!("Skipping wallet token without a symbol");
                continue;
            }
            let chain = chain_label(token.chain.as_deref());
            if self.is_stable(&symbol, token.category.as_deref()) {
                tally.add_stable(&chain, token.usd_value);
            } else {
                tally.add_non_stable(&symbol, &chain, token.usd_value, token.amount);
            }
        }

        for protocol in protocols {
            if self.config.is_skipped_protocol(&protocol.name) {
                debug!("Skipping protocol {}: handled as a margin venue", protocol.name);
                continue;
            }
            let chain = chain_label(protocol.chain.as_deref());
            for position in &protocol.positions {
                self.add_position(&mut tally, &chain, position);
            }
        }

        self.summarize(tally, tokens.len(), protocols.len())
    }

    fn add_position(&self, tally: &mut NettingTally, chain: &str, position: &ProtocolPosition) {
        let raw = position
            .asset
            .as_deref()
            .filter(|a| !a.trim().is_empty())
            .or(position.label.as_deref())
            .unwrap_or_default();
        let symbol = self.normalizer.normalize(position_symbol(raw));
        if symbol.is_empty() {
            debug!("Skipping protocol position without a symbol on {}", chain);
            return;
        }

        let sign = if position.is_borrowed() {
            Decimal::NEGATIVE_ONE
        } else {
            Decimal::ONE
        };
        let usd = sign * position.usd_value.unwrap_or_default();
        let amount = sign * position.amount.unwrap_or_default();

        if self.is_stable(&symbol, None) {
            tally.add_stable(chain, usd);
        } else {
            tally.add_non_stable(&symbol, chain, usd, amount);
        }
    }

    fn summarize(
        &self,
        tally: NettingTally,
        tokens_processed: usize,
        protocols_processed: usize,
    ) -> PortfolioSummaryStats {
        // Net per base symbol, dust dropped before wrapped variants are folded in
        let mut net_by_base: BTreeMap<&str, Decimal> = BTreeMap::new();
        for symbol in tally.non_stable.keys() {
            let net = tally.net_of(symbol).usd;
            if net.abs() < self.config.netting_dust_threshold {
                continue;
            }
            *net_by_base.entry(wrapped_base(symbol)).or_default() += net;
        }

        let mut major_non_stable_positions = BTreeMap::new();
        let mut other_total = Decimal::ZERO;
        let mut other_count = 0;
        for (&base, &net_value) in &net_by_base {
            if net_value.abs() >= self.config.major_position_threshold {
                let amount: Decimal = tally
                    .non_stable
                    .keys()
                    .filter(|s| wrapped_base(s) == base)
                    .map(|s| tally.net_of(s).amount)
                    .sum();
                major_non_stable_positions.insert(
                    base.to_string(),
                    MajorPosition {
                        amount,
                        usd_value: net_value,
                        is_borrowed: net_value < Decimal::ZERO,
                    },
                );
            } else {
                other_total += net_value;
                other_count += 1;
            }
        }

        let non_stable_total: Decimal = net_by_base.values().copied().sum();
        let total = tally.stable_total + non_stable_total;
        let percent_of_total = |value: Decimal| {
            if total > Decimal::ZERO {
                value / total * HUNDRED
            } else {
                Decimal::ZERO
            }
        };

        let primary_chain = match primary_chain(&tally.chain_totals) {
            Some((name, value)) if total > Decimal::ZERO => PrimaryChain {
                name: Some(name.to_string()),
                value,
                percentage: percent_of_total(value.abs()),
            },
            _ => PrimaryChain::default(),
        };

        PortfolioSummaryStats {
            timestamp: None,
            total_portfolio_value: total,
            stable_total: tally.stable_total,
            non_stable_total,
            stable_percentage: percent_of_total(tally.stable_total),
            non_stable_percentage: percent_of_total(non_stable_total),
            major_non_stable_positions,
            other_positions: OtherPositions {
                total_value: other_total,
                count: other_count,
                percentage: percent_of_total(other_total.abs()),
            },
            primary_chain,
            chain_breakdown: tally.chain_totals,
            source_file: None,
            tokens_processed,
            protocols_processed,
            wallet_count: 0,
            wallets_included: Vec::new(),
        }
    }

    /// Stable test for wallet symbols. Wider than the classifier alone:
    /// wallet exports decorate stablecoin tickers, so known prefixes, a `USD`
    /// marker and the export's own category all count.
    fn is_stable(&self, symbol: &str, category: Option<&str>) -> bool {
        if category.is_some_and(|c| c.trim().eq_ignore_ascii_case(STABLE_CATEGORY)) {
            return true;
        }
        if symbol.contains('+') {
            return symbol
                .split('+')
                .filter(|p| !p.is_empty())
                .all(|part| self.is_stable_part(part));
        }
        self.is_stable_part(symbol)
    }

    fn is_stable_part(&self, symbol: &str) -> bool {
        self.classifier.classify(symbol) == Stability::Stable
            || WALLET_STABLE_PREFIXES.iter().any(|p| symbol.starts_with(p))
            || symbol.contains(WALLET_STABLE_MARKER)
    }
}

/// Symbol named by a position: labels like `"1.5 ETH"` resolve to the last word.
pub(super) fn position_symbol(raw: &str) -> &str {
    let raw = raw.trim();
    let words: Vec<&str> = raw.split_whitespace().collect();
    match words.as_slice() {
        [first, .., last] if first.chars().any(|c| c.is_ascii_digit()) => *last,
        _ => raw,
    }
}

/// `ethereum` -> `Ethereum`; missing chains are `Unknown`.
pub(super) fn chain_label(chain: Option<&str>) -> String {
    let chain = chain.map(str::trim).filter(|c| !c.is_empty()).unwrap_or(UNKNOWN_CHAIN);
    let mut chars = chain.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn wrapped_base(symbol: &str) -> &str {
    WRAPPED_TOKEN_MAPPINGS
        .iter()
        .find(|(wrapped, _)| *wrapped == symbol)
        .map(|(_, base)| *base)
        .unwrap_or(symbol)
}

/// Chain with the largest absolute value; ties go to the first in name order.
fn primary_chain(chain_totals: &BTreeMap<String, Decimal>) -> Option<(&str, Decimal)> {
    let mut best: Option<(&str, Decimal)> = None;
    for (name, &value) in chain_totals {
        match best {
            Some((_, top)) if value.abs() <= top.abs() => {}
            _ => best = Some((name.as_str(), value)),
        }
    }
    best
}

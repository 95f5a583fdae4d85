//! Orchestration of one exposure analysis run.

use std::collections::HashSet;

use log::{debug, info};
use rust_decimal::Decimal;

use super::exposure_aggregator::ExposureAggregator;
use super::exposure_model::{ExposureReport, MarginAccount, MixedExchangeBalance, PortfolioSnapshot};
use super::exposure_traits::ExposureServiceTrait;
use crate::config::ExposureConfig;
use crate::constants::EVM_WALLET_PLATFORM;
use crate::errors::Result;
use crate::ledger::{ConsolidationLedger, Contribution, RawBalanceRecord};
use crate::margin::{derive_account_equity, MarginAllocator};
use crate::summary::{CombinedWalletData, NettedPositionExtractor, PortfolioSummaryStats};
use crate::symbols::symbols_constants::{CEX_MIXED_PREFIX, OTHER_TOKENS_SYMBOL, STABLECOINS_EVM_SYMBOL};
use crate::symbols::Stability;

const CEX_PLATFORM_PREFIX: &str = "CEX_";

/// Exchange key used to match detailed balances against total-only balances.
fn exchange_key(name: &str) -> String {
    let name = name.trim().to_lowercase();
    match name.strip_prefix("cex_") {
        Some(stripped) => stripped.to_string(),
        None => name,
    }
}

/// Service for exposure analysis over materialized portfolio snapshots.
#[derive(Debug, Clone)]
pub struct ExposureService {
    config: ExposureConfig,
    allocator: MarginAllocator,
    aggregator: ExposureAggregator,
    extractor: NettedPositionExtractor,
}

impl Default for ExposureService {
    fn default() -> Self {
        Self::build(ExposureConfig::default())
    }
}

impl ExposureService {
    /// Creates a service after validating `config`.
    pub fn new(config: ExposureConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: ExposureConfig) -> Self {
        Self {
            allocator: MarginAllocator::new(&config),
            aggregator: ExposureAggregator::new(&config),
            extractor: NettedPositionExtractor::new(&config),
            config,
        }
    }

    pub fn config(&self) -> &ExposureConfig {
        &self.config
    }

    /// Feeds every source of `snapshot` into `ledger`.
    pub fn consolidate(&self, ledger: &mut ConsolidationLedger<'_>, snapshot: &PortfolioSnapshot) {
        let detailed_exchanges = self.add_balances(ledger, &snapshot.balances);
        self.add_mixed_exchanges(ledger, &snapshot.mixed_exchange_balances, &detailed_exchanges);
        self.add_margin_accounts(ledger, &snapshot.margin_accounts);

        if let Some(summary) = &snapshot.wallet_summary {
            let added = self.ingest_wallet_summary(ledger, summary);
            debug!("Wallet summary contributed {} EVM entries", added);
        }
    }

    /// Records the EVM part of a netted wallet summary: each major position,
    /// the stable total as `STABLECOINS_EVM` and the folded remainder as
    /// `OTHER_TOKENS`. Net debts are not holdings and are left out.
    ///
    /// Returns the number of contributions recorded.
    pub fn ingest_wallet_summary(
        &self,
        ledger: &mut ConsolidationLedger<'_>,
        summary: &PortfolioSummaryStats,
    ) -> usize {
        let mut added = 0;

        for (symbol, position) in &summary.major_non_stable_positions {
            if position.usd_value <= Decimal::ZERO {
                debug!("Skipping net-borrowed wallet position {}", symbol);
                continue;
            }
            let contribution = Contribution::new(symbol, position.usd_value, EVM_WALLET_PLATFORM)
                .with_quantity(position.amount);
            if ledger.add(contribution) {
                added += 1;
            }
        }

        if summary.stable_total > Decimal::ZERO {
            let contribution = Contribution::new(
                STABLECOINS_EVM_SYMBOL,
                summary.stable_total,
                EVM_WALLET_PLATFORM,
            )
            .with_quantity(summary.stable_total / self.config.stable_unit_price);
            if ledger.add(contribution) {
                added += 1;
            }
        }

        let other_value = summary.other_positions.total_value;
        if other_value > self.config.other_tokens_min_value
            && ledger.add(Contribution::new(OTHER_TOKENS_SYMBOL, other_value, EVM_WALLET_PLATFORM))
        {
            added += 1;
        }

        added
    }

    /// Adds spot balances. Returns the exchanges that reported at least one
    /// usable balance, which suppresses their total-only fallback.
    fn add_balances(
        &self,
        ledger: &mut ConsolidationLedger<'_>,
        balances: &[RawBalanceRecord],
    ) -> HashSet<String> {
        let mut detailed = HashSet::new();
        for record in balances {
            if record.usd_value <= self.config.dust_threshold {
                debug!(
                    "Skipping dust balance {} {} on {}",
                    record.usd_value, record.symbol, record.platform
                );
                continue;
            }
            if ledger.add_balance(record) {
                detailed.insert(exchange_key(&record.platform));
            }
        }
        detailed
    }

    fn add_mixed_exchanges(
        &self,
        ledger: &mut ConsolidationLedger<'_>,
        balances: &[MixedExchangeBalance],
        detailed_exchanges: &HashSet<String>,
    ) {
        for balance in balances {
            let exchange = balance.exchange.trim();
            if exchange.is_empty() || balance.total_value <= self.config.dust_threshold {
                continue;
            }
            if detailed_exchanges.contains(&exchange_key(exchange)) {
                debug!("Detailed balances present for {}; ignoring its total", exchange);
                continue;
            }

            let contribution = Contribution::new(
                format!("{}{}", CEX_MIXED_PREFIX, exchange),
                balance.total_value,
                format!("{}{}", CEX_PLATFORM_PREFIX, exchange),
            )
            .with_override(Stability::Neutral);
            ledger.add(contribution);
        }
    }

    fn add_margin_accounts(&self, ledger: &mut ConsolidationLedger<'_>, accounts: &[MarginAccount]) {
        for account in accounts {
            let equity = match account.account_equity {
                Some(equity) => equity,
                None => {
                    let derived = derive_account_equity(&account.positions);
                    debug!("Derived {} account equity {}", account.platform, derived);
                    derived
                }
            };

            let allocation = self
                .allocator
                .allocate(&account.platform, equity, &account.positions, ledger.prices());
            debug!(
                "{}: {} allocations, reserve {}, delta-neutral {}",
                account.platform,
                allocation.per_position.len(),
                allocation.reserve_value,
                allocation.delta_neutral
            );
            ledger.add_margin_allocation(&allocation);
        }
    }
}

impl ExposureServiceTrait for ExposureService {
    fn analyze(&self, snapshot: &PortfolioSnapshot) -> ExposureReport {
        let mut ledger = ConsolidationLedger::new(&self.config, &snapshot.crypto_prices);
        self.consolidate(&mut ledger, snapshot);

        let report = self.aggregator.aggregate(&ledger, snapshot.total_portfolio_value);
        info!("{}", report.summary_line());
        report
    }

    fn summarize_wallets(&self, wallets: &CombinedWalletData) -> PortfolioSummaryStats {
        let mut stats = self.extractor.extract(&wallets.tokens, &wallets.protocols);
        stats.wallet_count = wallets.wallet_count;
        stats.wallets_included = wallets.wallets_included.clone();
        stats
    }
}

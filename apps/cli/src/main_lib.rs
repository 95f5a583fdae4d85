use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Utc;
use clap::Args;
use serde::de::DeserializeOwned;
use serde::Serialize;
use stablefolio_core::summary::CombinedWalletData;
use stablefolio_core::{
    ExposureConfig, ExposureReport, ExposureServiceTrait, PortfolioSnapshot, PortfolioSummaryStats,
};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Args, Debug, Clone)]
pub struct ExposureArgs {
    /// Portfolio snapshot (JSON)
    #[arg(short, long)]
    pub snapshot: PathBuf,

    /// Combined wallet export; its netted summary replaces the snapshot's
    #[arg(short, long)]
    pub wallets: Option<PathBuf>,

    /// Output file; stdout when omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct SummaryArgs {
    /// Combined wallet export (JSON)
    #[arg(short, long)]
    pub wallets: PathBuf,

    /// Output file; stdout when omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn init_tracing(log_format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    // Logs go to stderr so stdout stays clean JSON
    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false).with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_line_number(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

/// Engine configuration from `path`, or the defaults when no file is given.
pub fn load_engine_config(path: Option<&Path>) -> anyhow::Result<ExposureConfig> {
    match path {
        Some(path) => {
            tracing::info!("Using engine config {}", path.display());
            Ok(ExposureConfig::from_path(path)?)
        }
        None => Ok(ExposureConfig::default()),
    }
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn write_json<T: Serialize>(value: &T, output: Option<&Path>) -> anyhow::Result<()> {
    let rendered = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            fs::write(path, rendered).with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!("Wrote {}", path.display());
        }
        None => println!("{}", rendered),
    }
    Ok(())
}

fn load_wallet_summary(
    service: &dyn ExposureServiceTrait,
    path: &Path,
) -> anyhow::Result<PortfolioSummaryStats> {
    let wallets: CombinedWalletData = read_json(path)?;
    if wallets.is_empty() {
        anyhow::bail!("No tokens or protocols found in {}", path.display());
    }
    tracing::info!(
        "Extracting wallet summary from {} tokens and {} protocols",
        wallets.tokens.len(),
        wallets.protocols.len()
    );

    let mut stats = service.summarize_wallets(&wallets);
    stats.timestamp = Some(Utc::now());
    stats.source_file = path.file_name().map(|n| n.to_string_lossy().into_owned());
    Ok(stats)
}

pub fn run_exposure(service: &dyn ExposureServiceTrait, args: &ExposureArgs) -> anyhow::Result<ExposureReport> {
    let mut snapshot: PortfolioSnapshot = read_json(&args.snapshot)?;
    if let Some(wallets) = &args.wallets {
        snapshot.wallet_summary = Some(load_wallet_summary(service, wallets)?);
    }

    let report = service.analyze(&snapshot);
    if let Some(error) = &report.error {
        tracing::warn!("Exposure analysis of {}: {}", args.snapshot.display(), error);
    }
    write_json(&report, args.output.as_deref())?;
    Ok(report)
}

pub fn run_summary(service: &dyn ExposureServiceTrait, args: &SummaryArgs) -> anyhow::Result<PortfolioSummaryStats> {
    let stats = load_wallet_summary(service, &args.wallets)?;
    write_json(&stats, args.output.as_deref())?;
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use stablefolio_core::ExposureService;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    fn write_temp(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    const WALLETS: &str = r#"{
        "tokens": [
            { "symbol": "ETH", "amount": 1.0, "usd_value": 3000.0, "chain": "ethereum" },
            { "symbol": "USDC", "amount": 1000.0, "usd_value": 1000.0, "chain": "arbitrum" }
        ],
        "protocols": [
            {
                "name": "Aave V3",
                "chain": "ethereum",
                "positions": [
                    { "label": "0.5 ETH", "amount": 0.5, "value": 1500.0, "header_type": "Borrowed" }
                ]
            }
        ],
        "wallet_count": 2,
        "wallets_included": ["0xabc", "0xdef"]
    }"#;

    #[test]
    fn test_load_engine_config() {
        assert_eq!(load_engine_config(None).unwrap(), ExposureConfig::default());

        let file = write_temp(r#"{ "majorPositionThreshold": 500 }"#);
        let config = load_engine_config(Some(file.path())).unwrap();
        assert_eq!(config.major_position_threshold, dec!(500));

        let invalid = write_temp(r#"{ "stableUnitPrice": 0 }"#);
        assert!(load_engine_config(Some(invalid.path())).is_err());
    }

    #[test]
    fn test_read_json_reports_path_on_failure() {
        let file = write_temp("not json");
        let err = read_json::<PortfolioSnapshot>(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));

        let missing = read_json::<PortfolioSnapshot>(Path::new("/nonexistent/snapshot.json"));
        assert!(missing.is_err());
    }

    #[test]
    fn test_run_summary_writes_stats() {
        let service = ExposureService::default();
        let wallets = write_temp(WALLETS);
        let dir = tempdir().unwrap();
        let output = dir.path().join("portfolio_summary_stats.json");

        let stats = run_summary(
            &service,
            &SummaryArgs {
                wallets: wallets.path().to_path_buf(),
                output: Some(output.clone()),
            },
        )
        .unwrap();

        assert_eq!(stats.major_non_stable_positions["ETH"].usd_value, dec!(1500));
        assert_eq!(stats.wallet_count, 2);
        assert!(stats.timestamp.is_some());

        let written: PortfolioSummaryStats = read_json(&output).unwrap();
        assert_eq!(written.stable_total, dec!(1000));
        assert_eq!(written.source_file, stats.source_file);
    }

    #[test]
    fn test_run_summary_rejects_empty_export() {
        let service = ExposureService::default();
        let wallets = write_temp(r#"{ "tokens": [], "protocols": [] }"#);

        let result = run_summary(
            &service,
            &SummaryArgs {
                wallets: wallets.path().to_path_buf(),
                output: None,
            },
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_run_exposure_with_wallet_export() {
        let service = ExposureService::default();
        let snapshot = write_temp(
            r#"{
                "totalPortfolioValue": 3500.0,
                "balances": [
                    { "platform": "CEX_Binance", "symbol": "BTC", "quantity": 0.02, "usdValue": 1000.0 }
                ]
            }"#,
        );
        let wallets = write_temp(WALLETS);
        let dir = tempdir().unwrap();
        let output = dir.path().join("exposure.json");

        let report = run_exposure(
            &service,
            &ExposureArgs {
                snapshot: snapshot.path().to_path_buf(),
                wallets: Some(wallets.path().to_path_buf()),
                output: Some(output.clone()),
            },
        )
        .unwrap();

        assert_eq!(report.consolidated_assets["ETH"].total_value_usd, dec!(1500));
        assert_eq!(report.consolidated_assets["STABLECOINS_EVM"].total_value_usd, dec!(1000));
        assert_eq!(report.stable_value, dec!(1000));
        assert_eq!(report.non_stable_value, dec!(2500));
        assert!(output.exists());
    }
}

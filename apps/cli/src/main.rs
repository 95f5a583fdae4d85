mod config;
mod main_lib;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use config::Config;
use main_lib::{init_tracing, load_engine_config, run_exposure, run_summary, ExposureArgs, SummaryArgs};
use stablefolio_core::ExposureService;

#[derive(Parser)]
#[command(name = "stablefolio")]
#[command(about = "Stable vs non-stable exposure analysis for multi-venue crypto portfolios", long_about = None)]
struct Cli {
    /// Engine configuration file (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a portfolio snapshot and emit the exposure report
    Exposure(ExposureArgs),
    /// Net a combined wallet export into portfolio summary statistics
    Summary(SummaryArgs),
}

fn main() -> anyhow::Result<()> {
    let config = Config::from_env();
    init_tracing(&config.log_format);
    let cli = Cli::parse();

    let engine_config = load_engine_config(cli.config.as_deref().or(config.engine_config_path.as_deref()))?;
    let service = ExposureService::new(engine_config)?;

    match cli.command {
        Commands::Exposure(args) => {
            let report = run_exposure(&service, &args)?;
            tracing::info!("{}", report.summary_line());
        }
        Commands::Summary(args) => {
            let stats = run_summary(&service, &args)?;
            tracing::info!(
                "Wallet summary: total {} ({} major positions)",
                stats.total_portfolio_value,
                stats.major_non_stable_positions.len()
            );
        }
    }
    Ok(())
}

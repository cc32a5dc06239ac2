//! Tickflow CLI: run and sweep commands.
//!
//! Commands:
//! - `run`: execute one backtest from a TOML config and print its summary
//! - `sweep`: rerun the SMA-cross preset over a list of periods

mod obs;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tickflow_runner::{
    best_by_return, load_csv, run_from_config, save_result, sweep_sma_periods, BacktestResult,
    RunConfig, SweepEntry,
};

#[derive(Parser)]
#[command(name = "tickflow", about = "Tickflow CLI: event-driven backtesting engine")]
struct Cli {
    /// Log filter used when TICKFLOW_LOG is unset.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Log output format: text or json.
    #[arg(long, global = true, default_value = "text")]
    log_format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a backtest from a TOML config file.
    Run {
        /// Path to a TOML config file.
        #[arg(long)]
        config: PathBuf,

        /// Directory for result.json, equity.csv and fills.csv.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Run the SMA-cross preset once per period.
    Sweep {
        /// Path to a TOML config file.
        #[arg(long)]
        config: PathBuf,

        /// Comma-separated SMA periods, e.g. 10,20,50.
        #[arg(long, value_delimiter = ',', required = true)]
        periods: Vec<usize>,

        /// Run points one after another instead of in parallel.
        #[arg(long, default_value_t = false)]
        serial: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    obs::init_tracing(&cli.log_level, &cli.log_format).map_err(anyhow::Error::msg)?;

    match cli.command {
        Commands::Run { config, output } => run_cmd(&config, output.as_deref()),
        Commands::Sweep {
            config,
            periods,
            serial,
        } => sweep_cmd(&config, &periods, !serial),
    }
}

fn load_config(path: &Path) -> Result<RunConfig> {
    RunConfig::load(path).with_context(|| format!("loading config {}", path.display()))
}

fn run_cmd(config_path: &Path, output: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let result = run_from_config(&config).context("backtest failed")?;

    print_summary(&result);

    if let Some(dir) = output {
        save_result(&result, dir)
            .with_context(|| format!("saving result to {}", dir.display()))?;
        println!("Artifacts saved to: {}", dir.display());
    }
    Ok(())
}

fn sweep_cmd(config_path: &Path, periods: &[usize], parallel: bool) -> Result<()> {
    if periods.contains(&0) {
        bail!("--periods must all be >= 1");
    }
    let config = load_config(config_path)?;
    let stream = load_csv(&config.data.path)
        .with_context(|| format!("loading prices {}", config.data.path.display()))?;

    let entries = sweep_sma_periods(&config, &stream, periods, parallel).context("sweep failed")?;

    println!(
        "{:>6} {:>10} {:>10} {:>8} {:>6} {:>8}",
        "period", "return", "max_dd", "sharpe", "fills", "dropped"
    );
    for entry in &entries {
        print_sweep_line(entry);
    }
    if let Some(best) = best_by_return(&entries) {
        println!();
        println!("Best period: {}", best.period);
    }
    Ok(())
}

fn print_summary(result: &BacktestResult) {
    println!();
    println!("=== Backtest Result ===");
    println!("Run:            {}", result.run_id);
    println!("Strategy:       {}", result.strategy);
    println!("{}", result.summary);
    println!("Sharpe:         {:.3}", result.sharpe);
    println!("Sortino:        {:.3}", result.sortino);
    if !result.errors.is_empty() {
        println!();
        println!("Dropped branches (first 5):");
        for err in result.errors.iter().take(5) {
            println!("  {} {} [{}] {}", err.time, err.symbol, err.stage, err.message);
        }
    }
}

fn print_sweep_line(entry: &SweepEntry) {
    let summary = &entry.result.summary;
    println!(
        "{:>6} {:>9.2}% {:>9.2}% {:>8.3} {:>6} {:>8}",
        entry.period,
        summary.total_return * 100.0,
        summary.max_drawdown * 100.0,
        entry.result.sharpe,
        summary.fills,
        summary.dropped
    );
}

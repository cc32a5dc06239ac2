//! Single-run orchestration: config + price stream -> result.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tickflow_core::domain::{Fill, PriceEvent};
use tickflow_core::engine::{Backtest, EquityPoint, EventError, Summary};
use tickflow_core::BacktestError;
use tracing::info;

use crate::config::{ConfigError, RunConfig, RunId};
use crate::data_loader::{load_csv, symbols_in, LoadError};

pub use crate::export::save_result;

/// Errors from a single backtest run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("data error: {0}")]
    Data(#[from] LoadError),

    #[error("backtest error: {0}")]
    Backtest(#[from] BacktestError),

    #[error("no symbols to trade: stream is empty or filtered out")]
    NoSymbols,
}

/// Everything a finished run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    pub run_id: RunId,
    pub strategy: String,
    pub summary: Summary,
    pub sharpe: f64,
    pub sortino: f64,
    pub equity_curve: Vec<EquityPoint>,
    pub fills: Vec<Fill>,
    pub errors: Vec<EventError>,
}

/// Run the configured preset over an already loaded stream.
pub fn run_backtest(config: &RunConfig, stream: Vec<PriceEvent>) -> Result<BacktestResult, RunError> {
    config.validate()?;

    let symbols = if config.engine.symbols.is_empty() {
        symbols_in(&stream)
    } else {
        config.engine.symbols.clone()
    };
    if symbols.is_empty() {
        return Err(RunError::NoSymbols);
    }

    let run_id = config.run_id();
    let strategy = config.strategy.build(&symbols);
    info!(run_id = %run_id, strategy = %strategy.name(), symbols = symbols.len(), "starting run");

    let mut backtest = Backtest::from_config(&config.engine, stream)?.with_strategy(strategy);
    let summary = backtest.run()?;
    let statistics = backtest.statistics();

    Ok(BacktestResult {
        run_id,
        strategy: config.strategy.name(),
        summary,
        sharpe: statistics.sharpe_ratio(0.0),
        sortino: statistics.sortino_ratio(0.0),
        equity_curve: statistics.equity_curve().to_vec(),
        fills: statistics.transactions().to_vec(),
        errors: statistics.errors().to_vec(),
    })
}

/// Load the CSV named by the config, then run.
pub fn run_from_config(config: &RunConfig) -> Result<BacktestResult, RunError> {
    let stream = load_csv(&config.data.path)?;
    run_backtest(config, stream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DataConfig;
    use crate::presets::StrategyPreset;
    use chrono::{Duration, TimeZone, Utc};
    use std::path::PathBuf;
    use tickflow_core::domain::Bar;
    use tickflow_core::engine::EngineConfig;

    fn stream(symbol: &str, closes: &[f64]) -> Vec<PriceEvent> {
        let start = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Bar::new(start + Duration::days(i as i64), symbol, c, c, c, c, 1.0).into())
            .collect()
    }

    fn config(strategy: StrategyPreset) -> RunConfig {
        RunConfig {
            engine: EngineConfig::default(),
            data: DataConfig {
                path: PathBuf::from("unused.csv"),
            },
            strategy,
        }
    }

    #[test]
    fn buy_and_hold_buys_once_per_symbol() {
        let result = run_backtest(
            &config(StrategyPreset::BuyAndHold),
            stream("SPY", &[50.0, 55.0, 60.0]),
        )
        .unwrap();
        assert_eq!(result.fills.len(), 1);
        assert_eq!(result.fills[0].quantity, 100.0);
        assert_eq!(result.summary.final_equity, 101_000.0);
        assert_eq!(result.equity_curve.len(), 3);
        assert_eq!(result.strategy, "buy_and_hold");
    }

    #[test]
    fn sma_cross_exits_below_average() {
        let closes = [10.0, 10.0, 10.0, 12.0, 13.0, 9.0, 8.0];
        let result = run_backtest(
            &config(StrategyPreset::SmaCross { period: 3 }),
            stream("SPY", &closes),
        )
        .unwrap();
        // one entry on bar 4, one exit on bar 6
        assert_eq!(result.fills.len(), 2);
        assert_eq!(result.summary.fills, 2);
    }

    #[test]
    fn sma_cross_only_drops_warm_up_bars() {
        let closes = [10.0, 10.0, 10.0, 12.0, 13.0, 9.0, 8.0];
        let result = run_backtest(
            &config(StrategyPreset::SmaCross { period: 3 }),
            stream("SPY", &closes),
        )
        .unwrap();
        // the average is computed once per bar and read back by both conditions
        assert_eq!(result.errors.len(), 2);
        assert!(result.errors.iter().all(|e| e.message.contains("insufficient")));
    }

    #[test]
    fn configured_symbols_missing_from_stream() {
        let mut cfg = config(StrategyPreset::BuyAndHold);
        cfg.engine.symbols = vec!["QQQ".into()];
        let result = run_backtest(&cfg, stream("SPY", &[1.0, 2.0])).unwrap();
        assert!(result.fills.is_empty());
        assert_eq!(result.summary.price_events, 0);
    }

    #[test]
    fn empty_stream_has_no_symbols() {
        let err = run_backtest(&config(StrategyPreset::BuyAndHold), Vec::new()).unwrap_err();
        assert!(matches!(err, RunError::NoSymbols));
    }

    #[test]
    fn invalid_engine_config_is_reported() {
        let mut cfg = config(StrategyPreset::BuyAndHold);
        cfg.engine.initial_cash = 0.0;
        let err = run_backtest(&cfg, stream("SPY", &[1.0])).unwrap_err();
        assert!(matches!(err, RunError::Config(_)));
    }

    #[test]
    fn identical_inputs_are_reproducible() {
        let cfg = config(StrategyPreset::MonthlyRebalance);
        let a = run_backtest(&cfg, stream("SPY", &[10.0, 11.0, 12.0])).unwrap();
        let b = run_backtest(&cfg, stream("SPY", &[10.0, 11.0, 12.0])).unwrap();
        assert_eq!(a, b);
    }
}

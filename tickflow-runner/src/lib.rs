//! Tickflow Runner: run configuration, CSV data, presets, sweeps, artifacts.
//!
//! This crate builds on `tickflow-core` to provide:
//! - TOML run configuration with a content-addressed run id
//! - CSV bar/tick loading into a sorted price stream
//! - Named strategy presets built per symbol
//! - Single-run orchestration and rayon parameter sweeps
//! - JSON/CSV result export

pub mod config;
pub mod data_loader;
pub mod export;
pub mod presets;
pub mod runner;
pub mod sweep;

pub use config::{ConfigError, DataConfig, RunConfig, RunId};
pub use data_loader::{load_csv, parse_csv, symbols_in, LoadError};
pub use export::{load_result, save_result, ExportError};
pub use presets::StrategyPreset;
pub use runner::{run_backtest, run_from_config, BacktestResult, RunError};
pub use sweep::{best_by_return, sweep_sma_periods, SweepEntry};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn backtest_result_is_send_sync() {
        assert_send::<BacktestResult>();
        assert_sync::<BacktestResult>();
    }

    #[test]
    fn config_types_are_send_sync() {
        assert_send::<RunConfig>();
        assert_sync::<RunConfig>();
        assert_send::<StrategyPreset>();
        assert_sync::<StrategyPreset>();
    }

    #[test]
    fn sweep_entry_is_send_sync() {
        assert_send::<SweepEntry>();
        assert_sync::<SweepEntry>();
    }
}

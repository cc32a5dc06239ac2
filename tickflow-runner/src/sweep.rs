//! Parameter sweep over SMA periods.
//!
//! Each period is an independent run over a clone of the stream, so runs can
//! execute in parallel with rayon. Results keep the input order of `periods`.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tickflow_core::domain::PriceEvent;
use tracing::info;

use crate::config::RunConfig;
use crate::presets::StrategyPreset;
use crate::runner::{run_backtest, BacktestResult, RunError};

/// One point of a sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepEntry {
    pub period: usize,
    pub result: BacktestResult,
}

/// Run the SMA-cross preset once per period, overriding the configured strategy.
pub fn sweep_sma_periods(
    config: &RunConfig,
    stream: &[PriceEvent],
    periods: &[usize],
    parallel: bool,
) -> Result<Vec<SweepEntry>, RunError> {
    info!(points = periods.len(), parallel, "starting sweep");

    let run_one = |&period: &usize| -> Result<SweepEntry, RunError> {
        let mut point = config.clone();
        point.strategy = StrategyPreset::SmaCross { period };
        let result = run_backtest(&point, stream.to_vec())?;
        Ok(SweepEntry { period, result })
    };

    if parallel {
        periods.par_iter().map(run_one).collect()
    } else {
        periods.iter().map(run_one).collect()
    }
}

/// Entry with the highest total return; first wins on ties.
pub fn best_by_return(entries: &[SweepEntry]) -> Option<&SweepEntry> {
    entries.iter().fold(None, |best: Option<&SweepEntry>, entry| match best {
        Some(b) if b.result.summary.total_return >= entry.result.summary.total_return => Some(b),
        _ => Some(entry),
    })
}

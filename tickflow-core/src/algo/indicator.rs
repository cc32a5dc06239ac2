//! Indicator algos: numeric values computed over the current instrument's
//! observed history.

use super::{Algo, AlgoContext};
use crate::domain::rounding::round;
use crate::error::{BacktestError, Result};

/// Simple moving average of the last `period` observed prices, including the
/// current event.
///
/// Fails with `InsufficientData` until `period` observations exist. Records
/// its value on the current event as `sma_{period}`.
#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    key: String,
    value: f64,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            key: format!("sma_{period}"),
            value: 0.0,
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }

    /// Metric key the average is recorded under.
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Algo for Sma {
    fn run(&mut self, ctx: &mut AlgoContext<'_>) -> Result<bool> {
        let history = ctx.data.history(ctx.event.symbol());
        if self.period == 0 || history.len() < self.period {
            return Err(BacktestError::InsufficientData {
                needed: self.period.max(1),
                available: history.len(),
            });
        }

        let window = &history[history.len() - self.period..];
        let sum: f64 = window.iter().map(|obs| obs.event.price()).sum();
        self.value = round(sum / self.period as f64);
        ctx.metrics.add(self.key.as_str(), self.value)?;
        Ok(true)
    }

    fn value(&self) -> f64 {
        self.value
    }

    fn reset(&mut self) {
        self.value = 0.0;
    }

    fn name(&self) -> &str {
        &self.key
    }
}

/// Reads a value recorded on the current event earlier in the same cycle,
/// e.g. by a leading [`Sma`], instead of recomputing it.
#[derive(Debug, Clone)]
pub struct Recorded {
    key: String,
    value: f64,
}

impl Recorded {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: 0.0,
        }
    }
}

impl Algo for Recorded {
    fn run(&mut self, ctx: &mut AlgoContext<'_>) -> Result<bool> {
        self.value = ctx.metrics.get(&self.key).ok_or_else(|| {
            BacktestError::Configuration(format!("metric '{}' not recorded this cycle", self.key))
        })?;
        Ok(true)
    }

    fn value(&self) -> f64 {
        self.value
    }

    fn reset(&mut self) {
        self.value = 0.0;
    }

    fn name(&self) -> &str {
        &self.key
    }
}

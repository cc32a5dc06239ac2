//! Engine configuration: everything fixed before a run starts.

use serde::{Deserialize, Serialize};

use crate::domain::Portfolio;
use crate::engine::execution::{Commission, ExchangeFee, Exchange};
use crate::error::{BacktestError, Result};
use crate::risk::RiskConfig;
use crate::sizers::{FixedSizer, SizingPolicy};

/// Configuration for a single backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Symbols to include; empty means every symbol in the stream.
    pub symbols: Vec<String>,
    pub initial_cash: f64,
    pub sizing: FixedSizer,
    pub commission: Commission,
    pub exchange_fee: ExchangeFee,
    pub risk: RiskConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            symbols: Vec::new(),
            initial_cash: 100_000.0,
            sizing: FixedSizer::new(Some(100.0), Some(10_000.0)),
            commission: Commission::None,
            exchange_fee: ExchangeFee::None,
            risk: RiskConfig::PassThrough,
        }
    }
}

impl EngineConfig {
    pub fn new(initial_cash: f64) -> Self {
        Self {
            initial_cash,
            ..Self::default()
        }
    }

    /// Reject parameters that make a run impossible.
    pub fn validate(&self) -> Result<()> {
        if !(self.initial_cash > 0.0 && self.initial_cash.is_finite()) {
            return Err(BacktestError::Configuration(format!(
                "initial_cash must be positive, got {}",
                self.initial_cash
            )));
        }
        if self.symbols.iter().any(|s| s.trim().is_empty()) {
            return Err(BacktestError::Configuration("symbols must not be blank".into()));
        }
        self.sizing.validate()?;
        self.commission.validate().map_err(BacktestError::Configuration)?;
        self.exchange_fee.validate().map_err(BacktestError::Configuration)?;
        Ok(())
    }

    pub fn build_portfolio(&self) -> Portfolio {
        Portfolio::new(self.initial_cash)
            .with_sizer(self.sizing)
            .with_boxed_risk(self.risk.build())
    }

    pub fn build_exchange(&self) -> Exchange {
        Exchange::new(self.commission, self.exchange_fee)
    }
}

//! Error kinds shared by every stage of the engine.

use thiserror::Error;

/// Errors raised while configuring or running a backtest.
///
/// Setup errors (see [`BacktestError::is_fatal`]) abort a run before the first
/// event is processed. Everything else aborts only the processing of the event
/// that raised it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BacktestError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("insufficient data: need {needed} observations, have {available}")]
    InsufficientData { needed: usize, available: usize },

    #[error("no position to exit for {0}")]
    NoPosition(String),

    #[error("invalid metric key: key must not be empty")]
    InvalidKey,

    #[error("no price available for {0}")]
    MissingPrice(String),

    #[error("invalid order: {0}")]
    InvalidOrder(String),

    #[error("invalid node: {0}")]
    InvalidNode(String),
}

impl BacktestError {
    /// True for errors that make a run impossible rather than dropping one event.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Configuration(_) | Self::InvalidNode(_))
    }
}

pub type Result<T, E = BacktestError> = std::result::Result<T, E>;

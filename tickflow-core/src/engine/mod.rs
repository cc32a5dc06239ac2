//! Backtesting engine: the event loop and the components it owns.
//!
//! The engine pulls price events from the stream into a FIFO queue and
//! dispatches each event by kind:
//!
//! 1. Price: mark-to-market, equity point, strategy evaluation
//! 2. Signal: sizing and risk checks produce an order
//! 3. Order: the exchange produces a fill
//! 4. Fill: the portfolio applies it

pub mod event_loop;
pub mod execution;
pub mod state;
pub mod statistics;

pub use event_loop::Backtest;
pub use execution::{Commission, CommissionModel, Exchange, ExchangeFee, FeeModel};
pub use state::EngineConfig;
pub use statistics::{EquityPoint, EventError, Stage, Statistics, Summary};

//! tickflow core: event-driven backtesting engine.
//!
//! This crate contains:
//! - Domain types (price events, signals, orders, fills, positions, portfolio)
//! - Composable algos and the strategy tree that evaluates them
//! - Sizing and risk policies
//! - The idealized exchange with pluggable commission and fee models
//! - Statistics and the FIFO event loop

pub mod algo;
pub mod data;
pub mod domain;
pub mod engine;
pub mod error;
pub mod risk;
pub mod sizers;
pub mod strategy;

pub use error::{BacktestError, Result};

//! Algos: composable boolean evaluators that make up strategy decision logic.
//!
//! Every algo runs against an [`AlgoContext`] built fresh for each price event.
//! Leaves read market data or the portfolio; combinators own their operands
//! as `Box<dyn Algo>`; action algos push signals into the context.
//!
//! # Architecture
//!
//! ```text
//! Strategy ─owns─> AlgoStack ─owns─> [Box<dyn Algo>, ...]
//!                      │
//!                      └─ run(&mut AlgoContext { event, data, portfolio, signals, metrics })
//! ```
//!
//! Algos see the portfolio read-only; only the engine mutates it.

pub mod action;
pub mod basic;
pub mod compare;
pub mod indicator;
pub mod logic;
pub mod schedule;
pub mod stack;

pub use action::{CreateOrder, CreateSignal};
pub use basic::{Constant, Fixed, IsInvested, LatestPrice};
pub use compare::{Compare, Comparison};
pub use indicator::{Recorded, Sma};
pub use logic::{And, If, Not, Or, Xor};
pub use schedule::{Period, RunOnce, RunPeriod};
pub use stack::AlgoStack;

use std::fmt;

use crate::data::MarketData;
use crate::domain::{Metrics, Portfolio, PriceEvent, Signal};
use crate::error::Result;

/// Everything an algo may look at or produce while evaluating one price event.
pub struct AlgoContext<'a> {
    pub event: &'a PriceEvent,
    pub data: &'a MarketData,
    pub portfolio: &'a Portfolio,
    /// Pending signals of the owning strategy for this cycle.
    pub signals: &'a mut Vec<Signal>,
    /// Values recorded against the current event.
    pub metrics: &'a mut Metrics,
}

impl<'a> AlgoContext<'a> {
    pub fn new(
        event: &'a PriceEvent,
        data: &'a MarketData,
        portfolio: &'a Portfolio,
        signals: &'a mut Vec<Signal>,
        metrics: &'a mut Metrics,
    ) -> Self {
        Self {
            event,
            data,
            portfolio,
            signals,
            metrics,
        }
    }

    pub fn symbol(&self) -> &str {
        self.event.symbol()
    }
}

/// A boolean evaluator with an optional numeric value.
pub trait Algo: Send + Sync + fmt::Debug {
    /// Evaluate against the current event. `Ok(false)` stops the enclosing stack.
    fn run(&mut self, ctx: &mut AlgoContext<'_>) -> Result<bool>;

    /// Numeric result of the last run, read by comparators.
    fn value(&self) -> f64 {
        0.0
    }

    /// Whether an enclosing stack must run this algo even after an earlier
    /// sibling failed.
    fn always_run(&self) -> bool {
        false
    }

    /// Forget per-run state before the engine replays the stream.
    fn reset(&mut self) {}

    fn name(&self) -> &str;
}

impl Algo for Box<dyn Algo> {
    fn run(&mut self, ctx: &mut AlgoContext<'_>) -> Result<bool> {
        (**self).run(ctx)
    }

    fn value(&self) -> f64 {
        (**self).value()
    }

    fn always_run(&self) -> bool {
        (**self).always_run()
    }

    fn reset(&mut self) {
        (**self).reset()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Marks the wrapped algo "always run". Evaluation is otherwise unchanged.
#[derive(Debug)]
pub struct Always<A>(pub A);

impl<A: Algo> Algo for Always<A> {
    fn run(&mut self, ctx: &mut AlgoContext<'_>) -> Result<bool> {
        self.0.run(ctx)
    }

    fn value(&self) -> f64 {
        self.0.value()
    }

    fn always_run(&self) -> bool {
        true
    }

    fn reset(&mut self) {
        self.0.reset()
    }

    fn name(&self) -> &str {
        self.0.name()
    }
}

/// Builder helpers for any algo.
pub trait AlgoExt: Algo + Sized + 'static {
    fn always(self) -> Always<Self> {
        Always(self)
    }

    fn boxed(self) -> Box<dyn Algo> {
        Box::new(self)
    }
}

impl<A: Algo + Sized + 'static> AlgoExt for A {}

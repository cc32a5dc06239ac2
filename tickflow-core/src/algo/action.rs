//! Action algos: append signals to the owning strategy's pending list.

use super::{Algo, AlgoContext};
use crate::domain::{Direction, Signal};
use crate::error::{BacktestError, Result};

/// Emits a signal for the current instrument; quantity is left to the sizer.
#[derive(Debug, Clone, Copy)]
pub struct CreateSignal {
    direction: Direction,
}

impl CreateSignal {
    pub fn new(direction: Direction) -> Self {
        Self { direction }
    }
}

impl Algo for CreateSignal {
    fn run(&mut self, ctx: &mut AlgoContext<'_>) -> Result<bool> {
        let signal = Signal::new(ctx.event.time(), ctx.event.symbol(), self.direction);
        ctx.signals.push(signal);
        Ok(true)
    }

    fn name(&self) -> &str {
        "create_signal"
    }
}

/// Emits a signal carrying an explicit quantity, which the sizer keeps, and
/// optionally a limit price.
#[derive(Debug, Clone, Copy)]
pub struct CreateOrder {
    direction: Direction,
    quantity: f64,
    limit_price: Option<f64>,
}

impl CreateOrder {
    pub fn new(direction: Direction, quantity: f64) -> Self {
        Self {
            direction,
            quantity,
            limit_price: None,
        }
    }

    /// Limit order: fills only when the latest price is at `limit_price` or better.
    pub fn limit(direction: Direction, quantity: f64, limit_price: f64) -> Self {
        Self {
            direction,
            quantity,
            limit_price: Some(limit_price),
        }
    }
}

impl Algo for CreateOrder {
    fn run(&mut self, ctx: &mut AlgoContext<'_>) -> Result<bool> {
        if self.quantity <= 0.0 || !self.quantity.is_finite() {
            return Err(BacktestError::InvalidOrder(format!(
                "order quantity must be positive, got {}",
                self.quantity
            )));
        }
        let mut signal = Signal::new(ctx.event.time(), ctx.event.symbol(), self.direction)
            .with_quantity(self.quantity);
        if let Some(limit) = self.limit_price {
            if limit <= 0.0 || !limit.is_finite() {
                return Err(BacktestError::InvalidOrder(format!(
                    "limit price must be positive, got {limit}"
                )));
            }
            signal = signal.with_limit(limit);
        }
        ctx.signals.push(signal);
        Ok(true)
    }

    fn value(&self) -> f64 {
        self.quantity
    }

    fn name(&self) -> &str {
        "create_order"
    }
}

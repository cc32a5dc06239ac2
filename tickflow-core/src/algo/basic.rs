//! Leaf algos with no inputs beyond the current event.

use super::{Algo, AlgoContext};
use crate::domain::rounding::round;
use crate::error::Result;

/// Always returns the same boolean.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Constant(pub bool);

impl Constant {
    pub const TRUE: Self = Self(true);
    pub const FALSE: Self = Self(false);
}

impl Algo for Constant {
    fn run(&mut self, _ctx: &mut AlgoContext<'_>) -> Result<bool> {
        Ok(self.0)
    }

    fn value(&self) -> f64 {
        if self.0 {
            1.0
        } else {
            0.0
        }
    }

    fn name(&self) -> &str {
        if self.0 {
            "true"
        } else {
            "false"
        }
    }
}

/// Numeric constant for comparator thresholds. Always succeeds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fixed(pub f64);

impl Algo for Fixed {
    fn run(&mut self, _ctx: &mut AlgoContext<'_>) -> Result<bool> {
        Ok(true)
    }

    fn value(&self) -> f64 {
        self.0
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

/// Value is the current event's price.
#[derive(Debug, Clone, Copy, Default)]
pub struct LatestPrice {
    price: f64,
}

impl LatestPrice {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Algo for LatestPrice {
    fn run(&mut self, ctx: &mut AlgoContext<'_>) -> Result<bool> {
        self.price = round(ctx.event.price());
        Ok(true)
    }

    fn value(&self) -> f64 {
        self.price
    }

    fn reset(&mut self) {
        self.price = 0.0;
    }

    fn name(&self) -> &str {
        "latest_price"
    }
}

/// True while the portfolio holds a non-flat position in the event's symbol.
#[derive(Debug, Clone, Copy, Default)]
pub struct IsInvested;

impl Algo for IsInvested {
    fn run(&mut self, ctx: &mut AlgoContext<'_>) -> Result<bool> {
        Ok(ctx.portfolio.is_invested(ctx.symbol()))
    }

    fn name(&self) -> &str {
        "is_invested"
    }
}

//! Fixed Position Sizer
//!
//! Trade a fixed number of shares, a fixed notional budget, or the smaller of
//! the two when both are configured.

use serde::{Deserialize, Serialize};

use crate::domain::{Direction, Order, Portfolio, PriceEvent};
use crate::error::{BacktestError, Result};
use crate::sizers::SizingPolicy;

/// Fixed position sizer
///
/// - `shares`: default share count per order
/// - `notional`: default budget per order, converted to whole shares at the
///   latest price
///
/// An order that already carries a positive quantity keeps it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FixedSizer {
    #[serde(default)]
    pub shares: Option<f64>,
    #[serde(default)]
    pub notional: Option<f64>,
}

impl FixedSizer {
    pub fn new(shares: Option<f64>, notional: Option<f64>) -> Self {
        Self { shares, notional }
    }

    /// Fixed shares sizer
    pub fn shares(quantity: f64) -> Self {
        Self::new(Some(quantity), None)
    }

    /// Fixed notional sizer
    pub fn notional(amount: f64) -> Self {
        Self::new(None, Some(amount))
    }

    fn default_quantity(&self, price: f64) -> Result<f64> {
        let from_notional = match self.notional {
            Some(_) if price <= 0.0 => {
                return Err(BacktestError::InvalidOrder(format!(
                    "cannot size notional order at price {price}"
                )))
            }
            Some(amount) => Some((amount / price).floor()),
            None => None,
        };
        match (self.shares, from_notional) {
            (Some(shares), Some(budget)) => Ok(shares.min(budget)),
            (Some(shares), None) => Ok(shares),
            (None, Some(budget)) => Ok(budget),
            (None, None) => Err(BacktestError::Configuration(
                "sizer has neither default shares nor default notional".into(),
            )),
        }
    }
}

impl SizingPolicy for FixedSizer {
    fn size_order(
        &self,
        mut order: Order,
        price: &PriceEvent,
        portfolio: &Portfolio,
    ) -> Result<Order> {
        match order.direction {
            Direction::Exit => {
                let position = portfolio
                    .position(&order.symbol)
                    .filter(|p| !p.is_flat())
                    .ok_or_else(|| BacktestError::NoPosition(order.symbol.clone()))?;
                order.direction = if position.is_long() {
                    Direction::Sell
                } else {
                    Direction::Buy
                };
                order.quantity = position.quantity.abs();
            }
            Direction::Buy | Direction::Sell => {
                if order.quantity <= 0.0 {
                    order.quantity = self.default_quantity(price.price())?;
                }
            }
        }

        if order.quantity <= 0.0 {
            return Err(BacktestError::InvalidOrder(format!(
                "order {} for {} sized to zero",
                order.id, order.symbol
            )));
        }
        Ok(order)
    }

    fn validate(&self) -> Result<()> {
        for (name, value) in [("shares", self.shares), ("notional", self.notional)] {
            if let Some(v) = value {
                if v <= 0.0 || !v.is_finite() {
                    return Err(BacktestError::Configuration(format!(
                        "sizer {name} must be positive, got {v}"
                    )));
                }
            }
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

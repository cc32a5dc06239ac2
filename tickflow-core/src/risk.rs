//! Risk policies: last check on a sized order before it reaches the exchange.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::{Direction, Order, Portfolio, PriceEvent};
use crate::error::{BacktestError, Result};

/// Post-sizing adjustment or rejection hook.
pub trait RiskPolicy: Send + Sync + fmt::Debug {
    /// Return the order (possibly adjusted) or reject it.
    fn evaluate_order(&self, order: Order, price: &PriceEvent, portfolio: &Portfolio)
        -> Result<Order>;

    fn name(&self) -> &str;
}

/// Accepts every order unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

impl RiskPolicy for PassThrough {
    fn evaluate_order(&self, order: Order, _: &PriceEvent, _: &Portfolio) -> Result<Order> {
        Ok(order)
    }

    fn name(&self) -> &str {
        "pass_through"
    }
}

/// Rejects buys the portfolio cannot pay for at the latest price.
///
/// Buys that only cover an existing short are always allowed.
#[derive(Debug, Clone, Copy, Default)]
pub struct CashGuard;

impl RiskPolicy for CashGuard {
    fn evaluate_order(&self, order: Order, price: &PriceEvent, portfolio: &Portfolio) -> Result<Order> {
        if order.direction != Direction::Buy {
            return Ok(order);
        }
        let short = portfolio
            .position(&order.symbol)
            .filter(|p| p.is_short())
            .map_or(0.0, |p| p.quantity.abs());
        if order.quantity <= short {
            return Ok(order);
        }

        let notional = order.quantity * price.price();
        if notional > portfolio.cash() {
            return Err(BacktestError::InvalidOrder(format!(
                "order {} needs {notional:.2} but only {:.2} cash is available",
                order.id,
                portfolio.cash()
            )));
        }
        Ok(order)
    }

    fn name(&self) -> &str {
        "cash_guard"
    }
}

/// Serializable risk policy selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskConfig {
    #[default]
    PassThrough,
    CashGuard,
}

impl RiskConfig {
    pub fn build(&self) -> Box<dyn RiskPolicy> {
        match self {
            Self::PassThrough => Box::new(PassThrough),
            Self::CashGuard => Box::new(CashGuard),
        }
    }
}

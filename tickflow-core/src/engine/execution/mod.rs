//! Execution simulator: fills sized orders at the latest known price.
//!
//! Idealized: no slippage, no partial fills, no book depth. The exchange keeps
//! no resting orders, so `on_data` does nothing; it exists so the engine's
//! price dispatch has a single place to hand the exchange new data.

pub mod cost_model;

pub use cost_model::{Commission, CommissionModel, ExchangeFee, FeeModel};

use tracing::debug;

use crate::data::MarketData;
use crate::domain::{Direction, Fill, Order, OrderStatus, OrderType, PriceEvent};
use crate::error::{BacktestError, Result};

#[derive(Debug)]
pub struct Exchange {
    commission: Box<dyn CommissionModel>,
    fee: Box<dyn FeeModel>,
}

impl Default for Exchange {
    fn default() -> Self {
        Self::frictionless()
    }
}

impl Exchange {
    pub fn new(
        commission: impl CommissionModel + 'static,
        fee: impl FeeModel + 'static,
    ) -> Self {
        Self {
            commission: Box::new(commission),
            fee: Box::new(fee),
        }
    }

    pub fn frictionless() -> Self {
        Self::new(Commission::None, ExchangeFee::None)
    }

    /// New price data. No resting orders are kept.
    pub fn on_data(&mut self, _event: &PriceEvent) {}

    /// Fill `order` at its instrument's latest price, updating its status.
    pub fn on_order(&self, order: &mut Order, data: &MarketData) -> Result<Fill> {
        if order.direction == Direction::Exit {
            order.status = OrderStatus::Invalid;
            return Err(BacktestError::InvalidOrder(format!(
                "order {} reached the exchange unsized",
                order.id
            )));
        }
        if order.quantity <= 0.0 {
            order.status = OrderStatus::Invalid;
            return Err(BacktestError::InvalidOrder(format!(
                "order {} has non-positive quantity {}",
                order.id, order.quantity
            )));
        }

        let price = data
            .latest(&order.symbol)
            .map(PriceEvent::price)
            .ok_or_else(|| BacktestError::MissingPrice(order.symbol.clone()))?;

        if let OrderType::Limit { limit_price } = order.order_type {
            let marketable = match order.direction {
                Direction::Buy => price <= limit_price,
                _ => price >= limit_price,
            };
            if !marketable {
                order.status = OrderStatus::Invalid;
                return Err(BacktestError::InvalidOrder(format!(
                    "limit order {} at {limit_price} not marketable at {price}",
                    order.id
                )));
            }
        }

        let fill = Fill {
            order_id: order.id,
            time: order.time,
            symbol: order.symbol.clone(),
            direction: order.direction,
            quantity: order.quantity,
            price,
            commission: self.commission.commission(order.quantity, price),
            exchange_fee: self.fee.fee(order.quantity, price),
        };
        order.status = OrderStatus::Filled;
        debug!(order = %order.id, price, cost = fill.cost(), "order filled");
        Ok(fill)
    }
}

//! Orders and their lifecycle states.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::OrderId;
use super::signal::{Direction, Signal};

/// What kind of order and its price parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    /// Fill at the latest known price.
    Market,
    /// Fill at the latest known price only if it is at the limit or better.
    Limit { limit_price: f64 },
}

/// Order lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Built by the portfolio, not yet queued.
    New,
    /// Queued for the exchange.
    Submitted,
    PartiallyFilled,
    Filled,
    Canceled,
    /// Cancellation requested; honoured when the engine next dequeues the order.
    CancelPending,
    /// Rejected by the exchange.
    Invalid,
}

/// A sized instruction to trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub time: DateTime<Utc>,
    pub symbol: String,
    pub direction: Direction,
    pub quantity: f64,
    pub order_type: OrderType,
    pub status: OrderStatus,
}

impl Order {
    /// Initial order for a signal: a limit order when the signal carries a
    /// limit price, otherwise market. Quantity is the signal's explicit
    /// quantity, or zero until the sizing policy fills it in.
    pub fn from_signal(id: OrderId, signal: &Signal) -> Self {
        Self {
            id,
            time: signal.time,
            symbol: signal.symbol.clone(),
            direction: signal.direction,
            quantity: signal.quantity.unwrap_or(0.0),
            order_type: match signal.limit_price {
                Some(limit_price) => OrderType::Limit { limit_price },
                None => OrderType::Market,
            },
            status: OrderStatus::New,
        }
    }

    pub fn limit_price(&self) -> Option<f64> {
        match self.order_type {
            OrderType::Market => None,
            OrderType::Limit { limit_price } => Some(limit_price),
        }
    }

    /// New and submitted orders can still be filled.
    pub fn is_active(&self) -> bool {
        matches!(
            self.status,
            OrderStatus::New | OrderStatus::Submitted | OrderStatus::PartiallyFilled
        )
    }

    /// Request cancellation. Returns false if the order is no longer active.
    pub fn cancel(&mut self) -> bool {
        if !self.is_active() {
            return false;
        }
        self.status = OrderStatus::CancelPending;
        true
    }
}

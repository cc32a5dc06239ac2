use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::OrderId;
use super::rounding::round;
use super::signal::Direction;

/// Execution record of one order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    pub order_id: OrderId,
    pub time: DateTime<Utc>,
    pub symbol: String,
    pub direction: Direction,
    pub quantity: f64,
    pub price: f64,
    pub commission: f64,
    pub exchange_fee: f64,
}

impl Fill {
    /// Commission + exchange fee.
    pub fn cost(&self) -> f64 {
        round(self.commission + self.exchange_fee)
    }

    /// Gross traded value: quantity × price.
    pub fn value(&self) -> f64 {
        round(self.quantity * self.price)
    }

    /// Cash actually moved: a buyer pays value + cost, a seller receives value − cost.
    pub fn net_value(&self) -> f64 {
        match self.direction {
            Direction::Buy => round(self.value() + self.cost()),
            Direction::Sell | Direction::Exit => round(self.value() - self.cost()),
        }
    }
}

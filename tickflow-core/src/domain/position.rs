//! Position: one instrument's holding with weighted-average cost accounting.
//!
//! A position is a single lot per instrument. Fills on the same side as the
//! holding blend into the lot's average price; fills on the opposite side close
//! part or all of it and realise P&L against the cost-inclusive average. A fill
//! larger than the holding closes the lot and opens a fresh one on the other
//! side for the excess, with the fill's cost split pro rata by quantity.
//!
//! Sign convention: `quantity` and `cost_basis` are positive for long lots and
//! negative for short lots, so `unrealized_pnl = quantity × price − cost_basis`
//! holds on both sides.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::fill::Fill;
use super::rounding::round;
use super::signal::Direction;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    pub opened_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Signed holding: positive long, negative short.
    pub quantity: f64,
    pub quantity_bought: f64,
    pub quantity_sold: f64,

    /// Gross average price of the open lot.
    pub avg_price: f64,
    /// Cost-inclusive average price of the open lot.
    pub avg_price_net: f64,
    /// Gross average over every buy fill to date.
    pub avg_price_bought: f64,
    /// Gross average over every sell fill to date.
    pub avg_price_sold: f64,

    /// Cash-flow value of all fills: sold value − bought value.
    pub value: f64,
    /// `value` less cumulative cost.
    pub net_value: f64,

    pub market_price: f64,
    pub market_value: f64,

    pub commission: f64,
    pub exchange_fee: f64,
    pub cost: f64,
    pub cost_basis: f64,

    pub realized_pnl: f64,
    pub unrealized_pnl: f64,
    pub total_pnl: f64,
}

impl Position {
    /// Create a position from its first fill.
    pub fn open(fill: &Fill) -> Self {
        let mut position = Self {
            symbol: fill.symbol.clone(),
            opened_at: fill.time,
            updated_at: fill.time,
            quantity: 0.0,
            quantity_bought: 0.0,
            quantity_sold: 0.0,
            avg_price: 0.0,
            avg_price_net: 0.0,
            avg_price_bought: 0.0,
            avg_price_sold: 0.0,
            value: 0.0,
            net_value: 0.0,
            market_price: 0.0,
            market_value: 0.0,
            commission: 0.0,
            exchange_fee: 0.0,
            cost: 0.0,
            cost_basis: 0.0,
            realized_pnl: 0.0,
            unrealized_pnl: 0.0,
            total_pnl: 0.0,
        };
        position.apply_fill(fill);
        position
    }

    pub fn is_long(&self) -> bool {
        self.quantity > 0.0
    }

    pub fn is_short(&self) -> bool {
        self.quantity < 0.0
    }

    pub fn is_flat(&self) -> bool {
        self.quantity == 0.0
    }

    /// Blend a fill into the position.
    ///
    /// Exit fills are never produced by the exchange; they are ignored here.
    pub fn apply_fill(&mut self, fill: &Fill) {
        let sign = fill.direction.sign();
        if sign == 0.0 || fill.quantity <= 0.0 {
            return;
        }
        let qty = fill.quantity;
        let price = fill.price;
        let cost = fill.cost();

        match fill.direction {
            Direction::Buy => {
                self.avg_price_bought = round(
                    (self.quantity_bought * self.avg_price_bought + qty * price)
                        / (self.quantity_bought + qty),
                );
                self.quantity_bought = round(self.quantity_bought + qty);
            }
            Direction::Sell => {
                self.avg_price_sold = round(
                    (self.quantity_sold * self.avg_price_sold + qty * price)
                        / (self.quantity_sold + qty),
                );
                self.quantity_sold = round(self.quantity_sold + qty);
            }
            Direction::Exit => {}
        }

        let held = self.quantity.abs();
        if self.is_flat() || self.quantity.signum() == sign {
            self.add_to_lot(held, qty, price, sign * fill.net_value());
        } else {
            self.reduce_lot(held, qty, price, cost, sign);
        }
        self.quantity = round(self.quantity + sign * qty);

        self.commission = round(self.commission + fill.commission);
        self.exchange_fee = round(self.exchange_fee + fill.exchange_fee);
        self.cost = round(self.cost + cost);
        self.value = round(
            self.avg_price_sold * self.quantity_sold - self.avg_price_bought * self.quantity_bought,
        );
        self.net_value = round(self.value - self.cost);

        self.mark(fill.time, price);
    }

    /// Same-side fill: blend into the open lot. `signed_net` is the fill's net
    /// value with the lot's sign.
    fn add_to_lot(&mut self, held: f64, qty: f64, price: f64, signed_net: f64) {
        let total = held + qty;
        self.avg_price = round((held * self.avg_price + qty * price) / total);
        self.avg_price_net = round((held * self.avg_price_net + signed_net.abs()) / total);
        self.cost_basis = round(self.cost_basis + signed_net);
    }

    /// Opposite-side fill: close up to the held quantity, open the excess.
    fn reduce_lot(&mut self, held: f64, qty: f64, price: f64, cost: f64, sign: f64) {
        let closed = qty.min(held);
        let opened = qty - closed;
        let closed_cost = cost * closed / qty;
        let opened_cost = cost - closed_cost;
        let held_sign = -sign;

        let pnl = closed * (price - self.avg_price_net) * held_sign - closed_cost;
        self.realized_pnl = round(self.realized_pnl + pnl);
        self.cost_basis = round(self.cost_basis - self.cost_basis * closed / held);

        if opened > 0.0 {
            // buyers pay the cost on top, sellers receive the value less cost
            let lot_net = opened * price + sign * opened_cost;
            self.avg_price = round(price);
            self.avg_price_net = round(lot_net / opened);
            self.cost_basis = round(sign * lot_net);
        } else if closed == held {
            self.avg_price = 0.0;
            self.avg_price_net = 0.0;
            self.cost_basis = 0.0;
        }
    }

    /// Mark to market. Cost basis and realized P&L are untouched.
    pub fn mark(&mut self, time: DateTime<Utc>, price: f64) {
        self.updated_at = time;
        self.market_price = round(price);
        self.market_value = round(self.quantity * price);
        self.unrealized_pnl = round(self.quantity * price - self.cost_basis);
        self.total_pnl = round(self.realized_pnl + self.unrealized_pnl);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ids::OrderId;

    fn fill(direction: Direction, quantity: f64, price: f64, commission: f64) -> Fill {
        Fill {
            order_id: OrderId(1),
            time: Utc::now(),
            symbol: "SPY".into(),
            direction,
            quantity,
            price,
            commission,
            exchange_fee: 0.0,
        }
    }

    #[test]
    fn open_long_from_first_fill() {
        let pos = Position::open(&fill(Direction::Buy, 10.0, 10.0, 5.0));
        assert_eq!(pos.quantity, 10.0);
        assert_eq!(pos.avg_price, 10.0);
        assert_eq!(pos.avg_price_net, 10.5);
        assert_eq!(pos.cost_basis, 105.0);
        assert_eq!(pos.market_value, 100.0);
        assert_eq!(pos.unrealized_pnl, -5.0);
        assert!(pos.is_long());
    }

    #[test]
    fn open_short_from_first_fill() {
        let pos = Position::open(&fill(Direction::Sell, 10.0, 10.0, 5.0));
        assert_eq!(pos.quantity, -10.0);
        assert_eq!(pos.avg_price_net, 9.5);
        assert_eq!(pos.cost_basis, -95.0);
        assert_eq!(pos.market_value, -100.0);
        assert_eq!(pos.unrealized_pnl, -5.0);
        assert!(pos.is_short());
    }

    #[test]
    fn weighted_average_on_adding_buy() {
        let mut pos = Position::open(&fill(Direction::Buy, 10.0, 10.0, 5.0));
        pos.apply_fill(&fill(Direction::Buy, 15.0, 15.0, 7.0));

        assert_eq!(pos.quantity, 25.0);
        assert_eq!(pos.quantity_bought, 25.0);
        assert_eq!(pos.avg_price_bought, 13.0);
        assert_eq!(pos.avg_price, 13.0);
        assert_eq!(pos.cost_basis, 337.0);
        assert_eq!(pos.avg_price_net, 13.48);
        assert_eq!(pos.cost, 12.0);
        assert_eq!(pos.realized_pnl, 0.0);
    }

    #[test]
    fn partial_close_realises_against_net_average() {
        let mut pos = Position::open(&fill(Direction::Buy, 10.0, 10.0, 5.0));
        pos.apply_fill(&fill(Direction::Sell, 4.0, 12.0, 2.0));

        assert_eq!(pos.quantity, 6.0);
        // 4 × (12 − 10.5) − 2
        assert_eq!(pos.realized_pnl, 4.0);
        // 105 − 105 × 4/10
        assert_eq!(pos.cost_basis, 63.0);
        assert_eq!(pos.avg_price, 10.0);
        assert_eq!(pos.avg_price_net, 10.5);
        assert_eq!(pos.avg_price_sold, 12.0);
        // 6 × 12 − 63
        assert_eq!(pos.unrealized_pnl, 9.0);
        assert_eq!(pos.total_pnl, 13.0);
    }

    #[test]
    fn exact_flatten_resets_lot() {
        let mut pos = Position::open(&fill(Direction::Buy, 10.0, 10.0, 0.0));
        pos.apply_fill(&fill(Direction::Sell, 10.0, 11.0, 0.0));

        assert!(pos.is_flat());
        assert_eq!(pos.realized_pnl, 10.0);
        assert_eq!(pos.cost_basis, 0.0);
        assert_eq!(pos.avg_price, 0.0);
        assert_eq!(pos.market_value, 0.0);
        assert_eq!(pos.unrealized_pnl, 0.0);
        assert_eq!(pos.value, 10.0);
    }

    #[test]
    fn crossing_zero_flips_to_short() {
        let mut pos = Position::open(&fill(Direction::Buy, 10.0, 10.0, 5.0));
        pos.apply_fill(&fill(Direction::Sell, 15.0, 5.0, 3.0));

        assert_eq!(pos.quantity, -5.0);
        // closed 10 units: 10 × (5 − 10.5) − 3 × 10/15
        assert_eq!(pos.realized_pnl, -57.0);
        // new short lot of 5 carries the remaining cost share of 1
        assert_eq!(pos.avg_price, 5.0);
        assert_eq!(pos.avg_price_net, 4.8);
        assert_eq!(pos.cost_basis, -24.0);
        assert_eq!(pos.market_value, -25.0);
        assert_eq!(pos.unrealized_pnl, -1.0);
        assert_eq!(pos.total_pnl, -58.0);
    }

    #[test]
    fn crossing_zero_flips_to_long() {
        let mut pos = Position::open(&fill(Direction::Sell, 10.0, 20.0, 0.0));
        pos.apply_fill(&fill(Direction::Buy, 12.0, 18.0, 0.0));

        assert_eq!(pos.quantity, 2.0);
        assert_eq!(pos.realized_pnl, 20.0);
        assert_eq!(pos.avg_price, 18.0);
        assert_eq!(pos.cost_basis, 36.0);
    }

    #[test]
    fn mark_does_not_touch_basis_or_realized() {
        let mut pos = Position::open(&fill(Direction::Buy, 10.0, 10.0, 5.0));
        let basis = pos.cost_basis;
        pos.mark(Utc::now(), 12.5);

        assert_eq!(pos.cost_basis, basis);
        assert_eq!(pos.realized_pnl, 0.0);
        assert_eq!(pos.market_price, 12.5);
        assert_eq!(pos.market_value, 125.0);
        assert_eq!(pos.unrealized_pnl, 20.0);
        assert_eq!(pos.total_pnl, 20.0);
    }

    #[test]
    fn cumulative_costs_only_grow() {
        let mut pos = Position::open(&fill(Direction::Buy, 10.0, 10.0, 1.0));
        let mut last = pos.cost;
        for (dir, qty) in [
            (Direction::Sell, 4.0),
            (Direction::Buy, 2.0),
            (Direction::Sell, 20.0),
        ] {
            pos.apply_fill(&fill(dir, qty, 10.0, 1.0));
            assert!(pos.cost > last);
            last = pos.cost;
        }
        assert_eq!(pos.commission, 4.0);
        assert_eq!(pos.quantity, pos.quantity_bought - pos.quantity_sold);
    }
}

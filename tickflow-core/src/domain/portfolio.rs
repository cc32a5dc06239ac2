//! Portfolio: cash ledger, holdings and the signal → order → fill transitions.

use std::collections::BTreeMap;

use tracing::debug;

use super::fill::Fill;
use super::ids::OrderId;
use super::order::Order;
use super::position::Position;
use super::price::PriceEvent;
use super::rounding::round;
use super::signal::{Direction, Signal};
use crate::data::MarketData;
use crate::error::{BacktestError, Result};
use crate::risk::{PassThrough, RiskPolicy};
use crate::sizers::{FixedSizer, SizingPolicy};

/// One instance per run, owned by the engine.
///
/// Invariant: `value() == cash + Σ position.market_value` after every call that
/// mutates it.
#[derive(Debug)]
pub struct Portfolio {
    initial_cash: f64,
    cash: f64,
    holdings: BTreeMap<String, Position>,
    transactions: Vec<Fill>,
    sizer: Box<dyn SizingPolicy>,
    risk: Box<dyn RiskPolicy>,
}

impl Portfolio {
    /// A portfolio with no sizing defaults; only signals carrying an explicit
    /// quantity can be sized until a sizer is attached.
    pub fn new(initial_cash: f64) -> Self {
        Self {
            initial_cash,
            cash: round(initial_cash),
            holdings: BTreeMap::new(),
            transactions: Vec::new(),
            sizer: Box::new(FixedSizer::default()),
            risk: Box::new(PassThrough),
        }
    }

    pub fn with_sizer(mut self, sizer: impl SizingPolicy + 'static) -> Self {
        self.sizer = Box::new(sizer);
        self
    }

    pub fn with_risk(mut self, risk: impl RiskPolicy + 'static) -> Self {
        self.risk = Box::new(risk);
        self
    }

    pub fn with_boxed_risk(mut self, risk: Box<dyn RiskPolicy>) -> Self {
        self.risk = risk;
        self
    }

    /// Setup-time checks on the attached policies.
    pub fn validate(&self) -> Result<()> {
        if self.initial_cash <= 0.0 {
            return Err(BacktestError::Configuration(format!(
                "initial cash must be positive, got {}",
                self.initial_cash
            )));
        }
        self.sizer.validate()
    }

    /// Turn a signal into a sized, risk-checked order. Read-only.
    pub fn on_signal(&self, signal: &Signal, data: &MarketData, id: OrderId) -> Result<Order> {
        let price = data
            .latest(&signal.symbol)
            .ok_or_else(|| BacktestError::MissingPrice(signal.symbol.clone()))?;

        let order = Order::from_signal(id, signal);
        let order = self.sizer.size_order(order, price, self)?;
        let order = self.risk.evaluate_order(order, price, self)?;
        debug!(
            order = %order.id,
            symbol = %order.symbol,
            direction = ?order.direction,
            quantity = order.quantity,
            sizer = self.sizer.name(),
            "order sized"
        );
        Ok(order)
    }

    /// Apply a fill to holdings and cash, then record it. Returns the fill unchanged.
    pub fn on_fill(&mut self, fill: Fill) -> Result<Fill> {
        if fill.direction == Direction::Exit {
            return Err(BacktestError::InvalidOrder(format!(
                "fill for order {} has unresolved exit direction",
                fill.order_id
            )));
        }
        if fill.quantity <= 0.0 {
            return Err(BacktestError::InvalidOrder(format!(
                "fill for order {} has non-positive quantity {}",
                fill.order_id, fill.quantity
            )));
        }

        match self.holdings.get_mut(&fill.symbol) {
            Some(position) => position.apply_fill(&fill),
            None => {
                self.holdings
                    .insert(fill.symbol.clone(), Position::open(&fill));
            }
        }

        let net = fill.net_value();
        self.cash = match fill.direction {
            Direction::Buy => round(self.cash - net),
            _ => round(self.cash + net),
        };
        self.transactions.push(fill.clone());
        Ok(fill)
    }

    /// Mark the event's instrument to market, if held.
    pub fn update(&mut self, event: &PriceEvent) {
        if let Some(position) = self.holdings.get_mut(event.symbol()) {
            position.mark(event.time(), event.price());
        }
    }

    pub fn position(&self, symbol: &str) -> Option<&Position> {
        self.holdings.get(symbol)
    }

    pub fn is_invested(&self, symbol: &str) -> bool {
        self.position(symbol).is_some_and(|p| !p.is_flat())
    }

    pub fn is_long(&self, symbol: &str) -> bool {
        self.position(symbol).is_some_and(Position::is_long)
    }

    pub fn is_short(&self, symbol: &str) -> bool {
        self.position(symbol).is_some_and(Position::is_short)
    }

    /// Cash plus the signed market value of every holding.
    pub fn value(&self) -> f64 {
        let holdings: f64 = self.holdings.values().map(|p| p.market_value).sum();
        round(self.cash + holdings)
    }

    pub fn initial_cash(&self) -> f64 {
        self.initial_cash
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn holdings(&self) -> &BTreeMap<String, Position> {
        &self.holdings
    }

    pub fn transactions(&self) -> &[Fill] {
        &self.transactions
    }

    pub fn sizer(&self) -> &dyn SizingPolicy {
        self.sizer.as_ref()
    }

    /// Back to initial cash with no holdings or transactions. Policies are kept.
    pub fn reset(&mut self) {
        self.cash = round(self.initial_cash);
        self.holdings.clear();
        self.transactions.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Bar;
    use chrono::{TimeZone, Utc};

    fn bar(day: u32, close: f64) -> PriceEvent {
        let time = Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap();
        Bar::new(time, "SPY", close, close, close, close, 1_000.0).into()
    }

    fn fill(direction: Direction, quantity: f64, price: f64, commission: f64) -> Fill {
        Fill {
            order_id: OrderId(1),
            time: Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
            symbol: "SPY".into(),
            direction,
            quantity,
            price,
            commission,
            exchange_fee: 0.0,
        }
    }

    fn data_with(event: PriceEvent) -> MarketData {
        let mut data = MarketData::new(Vec::new());
        data.record(event);
        data
    }

    #[test]
    fn buy_fill_debits_cash_and_opens_position() {
        let mut pf = Portfolio::new(10_000.0);
        pf.on_fill(fill(Direction::Buy, 10.0, 100.0, 5.0)).unwrap();

        assert_eq!(pf.cash(), 8_995.0);
        assert!(pf.is_invested("SPY"));
        assert!(pf.is_long("SPY"));
        assert!(!pf.is_short("SPY"));
        assert_eq!(pf.value(), 9_995.0);
        assert_eq!(pf.transactions().len(), 1);
    }

    #[test]
    fn sell_fill_credits_cash_and_opens_short() {
        let mut pf = Portfolio::new(10_000.0);
        pf.on_fill(fill(Direction::Sell, 10.0, 100.0, 5.0)).unwrap();

        assert_eq!(pf.cash(), 10_995.0);
        assert!(pf.is_short("SPY"));
        assert_eq!(pf.value(), 9_995.0);
    }

    #[test]
    fn update_marks_held_positions_only() {
        let mut pf = Portfolio::new(10_000.0);
        pf.update(&bar(3, 120.0));
        assert!(pf.holdings().is_empty());

        pf.on_fill(fill(Direction::Buy, 10.0, 100.0, 0.0)).unwrap();
        pf.update(&bar(3, 120.0));
        let pos = pf.position("SPY").unwrap();
        assert_eq!(pos.market_value, 1_200.0);
        assert_eq!(pos.unrealized_pnl, 200.0);
        assert_eq!(pf.value(), 10_200.0);
        assert_eq!(pf.value(), pf.value());
    }

    #[test]
    fn exit_fill_rejected() {
        let mut pf = Portfolio::new(10_000.0);
        let err = pf.on_fill(fill(Direction::Exit, 1.0, 1.0, 0.0)).unwrap_err();
        assert!(matches!(err, BacktestError::InvalidOrder(_)));
        assert!(pf.transactions().is_empty());
    }

    #[test]
    fn on_signal_sizes_with_attached_sizer() {
        let pf = Portfolio::new(100_000.0).with_sizer(FixedSizer::new(Some(100.0), Some(5_000.0)));
        let data = data_with(bar(2, 100.0));
        let signal = Signal::new(data.latest("SPY").unwrap().time(), "SPY", Direction::Buy);

        let order = pf.on_signal(&signal, &data, OrderId(7)).unwrap();
        assert_eq!(order.id, OrderId(7));
        assert_eq!(order.quantity, 50.0);
    }

    #[test]
    fn on_signal_without_defaults_is_configuration_error() {
        let pf = Portfolio::new(100_000.0);
        let data = data_with(bar(2, 100.0));
        let signal = Signal::new(Utc::now(), "SPY", Direction::Buy);
        let err = pf.on_signal(&signal, &data, OrderId(1)).unwrap_err();
        assert!(matches!(err, BacktestError::Configuration(_)));
    }

    #[test]
    fn on_signal_without_price_is_missing_price() {
        let pf = Portfolio::new(100_000.0).with_sizer(FixedSizer::shares(10.0));
        let data = MarketData::new(Vec::new());
        let signal = Signal::new(Utc::now(), "QQQ", Direction::Buy);
        let err = pf.on_signal(&signal, &data, OrderId(1)).unwrap_err();
        assert_eq!(err, BacktestError::MissingPrice("QQQ".into()));
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut pf = Portfolio::new(10_000.0);
        pf.on_fill(fill(Direction::Buy, 10.0, 100.0, 5.0)).unwrap();
        pf.reset();
        assert_eq!(pf.cash(), 10_000.0);
        assert!(pf.holdings().is_empty());
        assert!(pf.transactions().is_empty());
    }

    #[test]
    fn validate_rejects_non_positive_cash() {
        let pf = Portfolio::new(0.0).with_sizer(FixedSizer::shares(1.0));
        assert!(pf.validate().unwrap_err().is_fatal());
    }
}

//! Backtest: the FIFO event loop that drives one run.
//!
//! The queue is refilled from the price stream whenever it runs dry. Each
//! dequeued event is fully processed before the next one:
//!
//! - Price: record, mark to market, equity point, exchange data, strategy
//!   evaluation, observation log, enqueue signals
//! - Signal: portfolio sizing and risk → enqueue order
//! - Order: exchange fill → enqueue fill
//! - Fill: portfolio update, transaction log
//!
//! A per-event error drops that branch (no downstream event), is logged at
//! `warn` and recorded in the statistics. Only setup errors abort a run.

use std::collections::VecDeque;

use tracing::{debug, info, warn};

use crate::data::MarketData;
use crate::domain::{Event, IdGen, Order, OrderId, OrderStatus, Portfolio, PriceEvent};
use crate::engine::execution::Exchange;
use crate::engine::state::EngineConfig;
use crate::engine::statistics::{EventError, Stage, Statistics, Summary};
use crate::error::{BacktestError, Result};
use crate::strategy::Strategy;

#[derive(Debug)]
pub struct Backtest {
    data: MarketData,
    strategy: Option<Strategy>,
    portfolio: Portfolio,
    exchange: Exchange,
    statistics: Statistics,
    queue: VecDeque<Event>,
    ids: IdGen,
    ready: bool,
}

impl Backtest {
    pub fn new(data: MarketData, portfolio: Portfolio, exchange: Exchange) -> Self {
        Self {
            data,
            strategy: None,
            portfolio,
            exchange,
            statistics: Statistics::new(),
            queue: VecDeque::new(),
            ids: IdGen::default(),
            ready: false,
        }
    }

    /// Build a run from a validated configuration and a sorted price stream.
    pub fn from_config(
        config: &EngineConfig,
        stream: impl IntoIterator<Item = PriceEvent>,
    ) -> Result<Self> {
        config.validate()?;
        let data = MarketData::new(stream).with_symbols(config.symbols.iter().cloned());
        Ok(Self::new(
            data,
            config.build_portfolio(),
            config.build_exchange(),
        ))
    }

    /// Attach the root strategy.
    pub fn with_strategy(mut self, mut strategy: Strategy) -> Self {
        strategy.set_root(true);
        self.strategy = Some(strategy);
        self.ready = false;
        self
    }

    /// Fatal checks, run once before the first event.
    pub fn setup(&mut self) -> Result<()> {
        if self.ready {
            return Ok(());
        }
        if self.strategy.is_none() {
            return Err(BacktestError::Configuration(
                "no strategy attached to the backtest".into(),
            ));
        }
        self.portfolio.validate()?;
        self.ready = true;
        Ok(())
    }

    /// Process one event. Returns false once the queue and stream are exhausted.
    pub fn step(&mut self) -> Result<bool> {
        self.setup()?;
        if self.queue.is_empty() {
            match self.data.pull() {
                Some(price) => self.queue.push_back(Event::Price(price)),
                None => return Ok(false),
            }
        }
        if let Some(event) = self.queue.pop_front() {
            self.dispatch(event);
        }
        Ok(true)
    }

    /// Run to stream exhaustion.
    pub fn run(&mut self) -> Result<Summary> {
        self.setup()?;
        info!(
            strategy = self.strategy.as_ref().map_or("", |s| s.name()),
            stream = self.data.len(),
            initial_cash = self.portfolio.initial_cash(),
            "backtest started"
        );

        while self.step()? {}

        let summary = self.statistics.summary(&self.portfolio);
        info!(
            events = summary.events,
            fills = summary.fills,
            dropped = summary.dropped,
            final_equity = summary.final_equity,
            total_return = summary.total_return,
            "backtest finished"
        );
        Ok(summary)
    }

    /// Request cancellation of a queued order. Honoured when it is dequeued.
    pub fn cancel_order(&mut self, id: OrderId) -> bool {
        self.queue.iter_mut().any(|event| match event {
            Event::Order(order) if order.id == id => order.cancel(),
            _ => false,
        })
    }

    /// Rewind the stream and clear all run state so the engine can run again.
    pub fn reset(&mut self) {
        self.data.reset();
        self.portfolio.reset();
        self.statistics.reset();
        self.queue.clear();
        self.ids.reset();
        if let Some(strategy) = self.strategy.as_mut() {
            strategy.reset();
        }
    }

    fn dispatch(&mut self, event: Event) {
        debug!(kind = ?event.kind(), symbol = event.symbol(), time = %event.time(), "dispatch");
        self.statistics.track_event(&event);
        match event {
            Event::Price(price) => self.on_price(price),
            Event::Signal(signal) => {
                let id = self.ids.next_order_id();
                match self.portfolio.on_signal(&signal, &self.data, id) {
                    Ok(mut order) => {
                        order.status = OrderStatus::Submitted;
                        self.queue.push_back(Event::Order(order));
                    }
                    Err(err) => self.drop_branch(&Event::Signal(signal), Stage::Signal, &err),
                }
            }
            Event::Order(order) => self.on_order(order),
            Event::Fill(fill) => match self.portfolio.on_fill(fill.clone()) {
                Ok(fill) => self.statistics.track_transaction(&fill),
                Err(err) => self.drop_branch(&Event::Fill(fill), Stage::Fill, &err),
            },
        }
    }

    fn on_price(&mut self, price: PriceEvent) {
        self.data.record(price.clone());
        self.portfolio.update(&price);
        self.statistics.update(&price, &self.portfolio);
        self.exchange.on_data(&price);

        let evaluation = self.strategy.as_mut().map(|strategy| {
            let mut metrics = Default::default();
            let evaluation = strategy.on_price(&price, &self.data, &self.portfolio, &mut metrics);
            self.data.attach_metrics(price.symbol(), metrics);
            evaluation
        });
        if let Some(observation) = self.data.history(price.symbol()).last() {
            self.statistics.track_observation(observation);
        }

        let Some(evaluation) = evaluation else {
            return;
        };
        for failure in evaluation.errors {
            let message = format!("{}: {}", failure.node, failure.error);
            warn!(stage = %Stage::Strategy, symbol = price.symbol(), error = %message, "dropped event branch");
            self.statistics.record_error(EventError {
                time: price.time(),
                symbol: price.symbol().to_string(),
                stage: Stage::Strategy,
                message,
            });
        }
        self.queue
            .extend(evaluation.signals.into_iter().map(Event::Signal));
    }

    fn on_order(&mut self, mut order: Order) {
        if order.status == OrderStatus::CancelPending {
            order.status = OrderStatus::Canceled;
            debug!(order = %order.id, "order canceled");
            return;
        }
        match self.exchange.on_order(&mut order, &self.data) {
            Ok(fill) => self.queue.push_back(Event::Fill(fill)),
            Err(err) => self.drop_branch(&Event::Order(order), Stage::Order, &err),
        }
    }

    fn drop_branch(&mut self, event: &Event, stage: Stage, error: &BacktestError) {
        warn!(%stage, symbol = event.symbol(), %error, "dropped event branch");
        self.statistics.record_error(EventError {
            time: event.time(),
            symbol: event.symbol().to_string(),
            stage,
            message: error.to_string(),
        });
    }

    pub fn data(&self) -> &MarketData {
        &self.data
    }

    pub fn strategy(&self) -> Option<&Strategy> {
        self.strategy.as_ref()
    }

    pub fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }

    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    /// Events waiting to be dispatched.
    pub fn pending(&self) -> impl Iterator<Item = &Event> {
        self.queue.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::{AlgoStack, CreateOrder, CreateSignal, RunOnce};
    use crate::domain::{Bar, Direction, EventKind};
    use crate::engine::execution::{Commission, ExchangeFee};
    use crate::sizers::FixedSizer;
    use chrono::{Duration, TimeZone, Utc};

    fn daily_bars(closes: &[f64]) -> Vec<PriceEvent> {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Bar::new(start + Duration::days(i as i64), "SPY", c, c, c, c, 1.0).into())
            .collect()
    }

    fn buy_once() -> Strategy {
        Strategy::new("buy_once").with_algos(
            AlgoStack::new()
                .push(RunOnce::new())
                .push(CreateSignal::new(Direction::Buy)),
        )
    }

    fn engine(closes: &[f64]) -> Backtest {
        let portfolio = Portfolio::new(10_000.0).with_sizer(FixedSizer::shares(10.0));
        let exchange = Exchange::new(Commission::Fixed { amount: 5.0 }, ExchangeFee::Fixed { amount: 1.0 });
        Backtest::new(MarketData::new(daily_bars(closes)), portfolio, exchange)
    }

    #[test]
    fn run_without_strategy_is_fatal() {
        let mut bt = engine(&[10.0]);
        let err = bt.run().unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn causal_order_price_signal_order_fill() {
        let mut bt = engine(&[10.0, 11.0]).with_strategy(buy_once());
        bt.run().unwrap();
        let kinds: Vec<EventKind> = bt.statistics().events().iter().map(Event::kind).collect();
        assert_eq!(
            kinds,
            vec![
                EventKind::Price,
                EventKind::Signal,
                EventKind::Order,
                EventKind::Fill,
                EventKind::Price
            ]
        );
    }

    #[test]
    fn one_fill_nets_only_costs() {
        let mut bt = engine(&[10.0, 10.0, 10.0]).with_strategy(buy_once());
        let summary = bt.run().unwrap();
        assert_eq!(summary.fills, 1);
        assert_eq!(bt.portfolio().value(), 10_000.0 - 6.0);
        assert!(bt.strategy().unwrap().is_root());
    }

    #[test]
    fn exit_without_position_is_dropped_not_fatal() {
        let strategy = Strategy::new("exit").with_algos(
            AlgoStack::new()
                .push(RunOnce::new())
                .push(CreateSignal::new(Direction::Exit)),
        );
        let mut bt = engine(&[10.0, 11.0]).with_strategy(strategy);
        let summary = bt.run().unwrap();
        assert_eq!(summary.fills, 0);
        assert_eq!(summary.dropped, 1);
        assert_eq!(bt.statistics().errors()[0].stage, Stage::Signal);
    }

    #[test]
    fn canceled_order_is_skipped() {
        let mut bt = engine(&[10.0, 11.0]).with_strategy(buy_once());
        // price, then signal
        assert!(bt.step().unwrap());
        assert!(bt.step().unwrap());
        let id = match bt.pending().next() {
            Some(Event::Order(order)) => order.id,
            other => panic!("expected queued order, got {other:?}"),
        };
        assert!(bt.cancel_order(id));
        bt.run().unwrap();
        assert!(bt.portfolio().transactions().is_empty());
        assert_eq!(bt.statistics().count(EventKind::Fill), 0);
    }

    #[test]
    fn explicit_quantity_flows_through() {
        let strategy = Strategy::new("explicit").with_algos(
            AlgoStack::new()
                .push(RunOnce::new())
                .push(CreateOrder::new(Direction::Sell, 3.0)),
        );
        let mut bt = engine(&[10.0]).with_strategy(strategy);
        bt.run().unwrap();
        assert_eq!(bt.portfolio().position("SPY").unwrap().quantity, -3.0);
    }

    #[test]
    fn unmarketable_limit_order_is_dropped_at_exchange() {
        let strategy = Strategy::new("limits").with_algos(
            AlgoStack::new()
                .push(RunOnce::new())
                .push(CreateOrder::limit(Direction::Buy, 5.0, 9.0))
                .push(CreateOrder::limit(Direction::Buy, 2.0, 10.5)),
        );
        let mut bt = engine(&[10.0, 8.0]).with_strategy(strategy);
        let summary = bt.run().unwrap();

        assert_eq!(summary.orders, 2);
        assert_eq!(summary.fills, 1);
        assert_eq!(bt.portfolio().position("SPY").unwrap().quantity, 2.0);
        assert_eq!(bt.portfolio().transactions()[0].price, 10.0);

        let errors = bt.statistics().errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].stage, Stage::Order);
        assert!(errors[0].message.contains("not marketable"));
    }

    #[test]
    fn reset_reproduces_run() {
        let mut bt = engine(&[10.0, 12.0, 9.0]).with_strategy(buy_once());
        let first = bt.run().unwrap();
        bt.reset();
        assert!(bt.statistics().events().is_empty());
        let second = bt.run().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn from_config_filters_symbols() {
        let mut stream = daily_bars(&[10.0, 11.0]);
        stream.push(Bar::new(Utc::now(), "QQQ", 1.0, 1.0, 1.0, 1.0, 1.0).into());
        let config = EngineConfig {
            symbols: vec!["SPY".into()],
            ..EngineConfig::default()
        };
        let mut bt = Backtest::from_config(&config, stream)
            .unwrap()
            .with_strategy(Strategy::new("idle"));
        let summary = bt.run().unwrap();
        assert_eq!(summary.price_events, 2);
    }
}

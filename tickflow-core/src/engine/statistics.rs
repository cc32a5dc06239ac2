//! Statistics: append-only event and transaction logs plus the equity curve.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::data::Observation;
use crate::domain::rounding::round;
use crate::domain::{Event, EventKind, Fill, Portfolio, PriceEvent};

/// One point of the equity curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub time: DateTime<Utc>,
    pub equity: f64,
    /// (equity − previous equity) / previous equity; 0 on the first point.
    pub period_return: f64,
}

/// Pipeline stage at which a per-event branch was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Strategy,
    Signal,
    Order,
    Fill,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Strategy => "strategy",
            Self::Signal => "signal",
            Self::Order => "order",
            Self::Fill => "fill",
        };
        f.write_str(s)
    }
}

/// A dropped branch: the event was processed but produced no downstream event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventError {
    pub time: DateTime<Utc>,
    pub symbol: String,
    pub stage: Stage,
    pub message: String,
}

/// Baseline report of a finished run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub events: usize,
    pub price_events: usize,
    pub signals: usize,
    pub orders: usize,
    pub fills: usize,
    pub dropped: usize,
    pub initial_equity: f64,
    pub final_equity: f64,
    pub total_return: f64,
    pub max_drawdown: f64,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "events: {} (prices {}, signals {}, orders {}, fills {})",
            self.events, self.price_events, self.signals, self.orders, self.fills
        )?;
        writeln!(f, "dropped branches: {}", self.dropped)?;
        writeln!(
            f,
            "equity: {:.2} -> {:.2}",
            self.initial_equity, self.final_equity
        )?;
        writeln!(f, "total return: {:.2}%", self.total_return * 100.0)?;
        write!(f, "max drawdown: {:.2}%", self.max_drawdown * 100.0)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Statistics {
    events: Vec<Event>,
    observations: Vec<Observation>,
    transactions: Vec<Fill>,
    equity_curve: Vec<EquityPoint>,
    errors: Vec<EventError>,
}

impl Statistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track_event(&mut self, event: &Event) {
        self.events.push(event.clone());
    }

    /// Record an evaluated price event together with the metrics its algos
    /// recorded, in dispatch order across all symbols.
    pub fn track_observation(&mut self, observation: &Observation) {
        self.observations.push(observation.clone());
    }

    pub fn track_transaction(&mut self, fill: &Fill) {
        self.transactions.push(fill.clone());
    }

    /// Append an equity point for this price event.
    pub fn update(&mut self, event: &PriceEvent, portfolio: &Portfolio) {
        let equity = portfolio.value();
        let period_return = match self.equity_curve.last() {
            Some(prev) if prev.equity != 0.0 => round((equity - prev.equity) / prev.equity),
            _ => 0.0,
        };
        self.equity_curve.push(EquityPoint {
            time: event.time(),
            equity,
            period_return,
        });
    }

    pub fn record_error(&mut self, error: EventError) {
        self.errors.push(error);
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn transactions(&self) -> &[Fill] {
        &self.transactions
    }

    pub fn equity_curve(&self) -> &[EquityPoint] {
        &self.equity_curve
    }

    pub fn errors(&self) -> &[EventError] {
        &self.errors
    }

    pub fn count(&self, kind: EventKind) -> usize {
        self.events.iter().filter(|e| e.kind() == kind).count()
    }

    /// (last equity − first equity) / first equity.
    pub fn total_equity_return(&self) -> f64 {
        match (self.equity_curve.first(), self.equity_curve.last()) {
            (Some(first), Some(last)) if first.equity != 0.0 => {
                round((last.equity - first.equity) / first.equity)
            }
            _ => 0.0,
        }
    }

    /// Largest peak-to-trough decline as a negative fraction.
    pub fn max_drawdown(&self) -> f64 {
        let mut peak = f64::MIN;
        let mut max_dd = 0.0_f64;
        for point in &self.equity_curve {
            peak = peak.max(point.equity);
            if peak > 0.0 {
                max_dd = max_dd.min((point.equity - peak) / peak);
            }
        }
        round(max_dd)
    }

    fn excess_returns(&self, risk_free: f64) -> Vec<f64> {
        self.equity_curve
            .iter()
            .skip(1)
            .map(|p| p.period_return - risk_free / 252.0)
            .collect()
    }

    /// Annualised Sharpe ratio over period returns (252 periods per year).
    ///
    /// 0 with fewer than two returns or zero variance.
    pub fn sharpe_ratio(&self, risk_free: f64) -> f64 {
        let excess = self.excess_returns(risk_free);
        if excess.len() < 2 {
            return 0.0;
        }
        let mean = mean(&excess);
        let std = std_dev(&excess, mean);
        if std < 1e-15 {
            return 0.0;
        }
        mean / std * 252.0_f64.sqrt()
    }

    /// Annualised Sortino ratio, downside deviation only.
    pub fn sortino_ratio(&self, risk_free: f64) -> f64 {
        let excess = self.excess_returns(risk_free);
        if excess.len() < 2 {
            return 0.0;
        }
        let downside: f64 = excess.iter().filter(|r| **r < 0.0).map(|r| r * r).sum();
        let downside_std = (downside / excess.len() as f64).sqrt();
        if downside_std < 1e-15 {
            return 0.0;
        }
        mean(&excess) / downside_std * 252.0_f64.sqrt()
    }

    pub fn summary(&self, portfolio: &Portfolio) -> Summary {
        let initial_equity = portfolio.initial_cash();
        let final_equity = portfolio.value();
        let total_return = if initial_equity != 0.0 {
            round((final_equity - initial_equity) / initial_equity)
        } else {
            0.0
        };
        Summary {
            events: self.events.len(),
            price_events: self.count(EventKind::Price),
            signals: self.count(EventKind::Signal),
            orders: self.count(EventKind::Order),
            fills: self.transactions.len(),
            dropped: self.errors.len(),
            initial_equity,
            final_equity,
            total_return,
            max_drawdown: self.max_drawdown(),
        }
    }

    pub fn reset(&mut self) {
        self.events.clear();
        self.observations.clear();
        self.transactions.clear();
        self.equity_curve.clear();
        self.errors.clear();
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn std_dev(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    var.sqrt()
}

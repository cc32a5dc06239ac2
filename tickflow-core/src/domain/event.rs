//! The four event kinds that flow through the engine queue.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::fill::Fill;
use super::order::Order;
use super::price::PriceEvent;
use super::signal::Signal;

/// Queue entry. Every kind carries a time and a symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum Event {
    Price(PriceEvent),
    Signal(Signal),
    Order(Order),
    Fill(Fill),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Price,
    Signal,
    Order,
    Fill,
}

impl Event {
    pub fn time(&self) -> DateTime<Utc> {
        match self {
            Self::Price(price) => price.time(),
            Self::Signal(signal) => signal.time,
            Self::Order(order) => order.time,
            Self::Fill(fill) => fill.time,
        }
    }

    pub fn symbol(&self) -> &str {
        match self {
            Self::Price(price) => price.symbol(),
            Self::Signal(signal) => &signal.symbol,
            Self::Order(order) => &order.symbol,
            Self::Fill(fill) => &fill.symbol,
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            Self::Price(_) => EventKind::Price,
            Self::Signal(_) => EventKind::Signal,
            Self::Order(_) => EventKind::Order,
            Self::Fill(_) => EventKind::Fill,
        }
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Trading direction carried by signals, orders and fills.
///
/// `Exit` only appears on signals and unsized orders; sizing resolves it to
/// whichever of `Buy`/`Sell` flattens the position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Buy,
    Sell,
    Exit,
}

impl Direction {
    /// +1 for Buy, -1 for Sell, 0 for Exit.
    pub fn sign(self) -> f64 {
        match self {
            Self::Buy => 1.0,
            Self::Sell => -1.0,
            Self::Exit => 0.0,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
            Self::Exit => "EXIT",
        };
        f.write_str(label)
    }
}

/// Directional intent emitted by strategy evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub time: DateTime<Utc>,
    pub symbol: String,
    pub direction: Direction,
    /// Explicit quantity requested by the strategy; `None` defers to the sizing policy.
    pub quantity: Option<f64>,
    /// Limit price; `None` is a market order.
    #[serde(default)]
    pub limit_price: Option<f64>,
}

impl Signal {
    pub fn new(time: DateTime<Utc>, symbol: impl Into<String>, direction: Direction) -> Self {
        Self {
            time,
            symbol: symbol.into(),
            direction,
            quantity: None,
            limit_price: None,
        }
    }

    pub fn with_quantity(mut self, quantity: f64) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn with_limit(mut self, limit_price: f64) -> Self {
        self.limit_price = Some(limit_price);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_signs() {
        assert_eq!(Direction::Buy.sign(), 1.0);
        assert_eq!(Direction::Sell.sign(), -1.0);
        assert_eq!(Direction::Exit.sign(), 0.0);
    }

    #[test]
    fn direction_serializes_screaming_case() {
        assert_eq!(serde_json::to_string(&Direction::Exit).unwrap(), "\"EXIT\"");
    }

    #[test]
    fn signal_quantity_defaults_to_none() {
        let signal = Signal::new(Utc::now(), "SPY", Direction::Buy);
        assert_eq!(signal.quantity, None);
        assert_eq!(signal.with_quantity(25.0).quantity, Some(25.0));
    }
}

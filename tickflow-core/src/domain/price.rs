//! Price observations: the events the price stream feeds into the engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OHLCV bar for a single symbol over one period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub time: DateTime<Utc>,
    pub symbol: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    pub fn new(
        time: DateTime<Utc>,
        symbol: impl Into<String>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            time,
            symbol: symbol.into(),
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Finite prices, high/low bracketing open and close, positive open and
    /// close, non-negative volume.
    pub fn is_sane(&self) -> bool {
        let finite = [self.open, self.high, self.low, self.close]
            .iter()
            .all(|p| p.is_finite());
        finite
            && self.volume >= 0.0
            && self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.open > 0.0
            && self.close > 0.0
    }
}

/// Top-of-book quote for a single symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    pub time: DateTime<Utc>,
    pub symbol: String,
    pub bid: f64,
    pub ask: f64,
}

impl Tick {
    pub fn new(time: DateTime<Utc>, symbol: impl Into<String>, bid: f64, ask: f64) -> Self {
        Self {
            time,
            symbol: symbol.into(),
            bid,
            ask,
        }
    }

    pub fn mid(&self) -> f64 {
        (self.bid + self.ask) / 2.0
    }

    pub fn spread(&self) -> f64 {
        self.ask - self.bid
    }

    /// Finite, positive quotes with bid <= ask.
    pub fn is_sane(&self) -> bool {
        self.bid.is_finite() && self.ask.is_finite() && self.bid > 0.0 && self.bid <= self.ask
    }
}

/// A price observation: either a bar or a tick.
///
/// Read-only once it leaves the stream. `price()` is the single number the rest
/// of the engine marks positions and fills orders against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PriceEvent {
    Bar(Bar),
    Tick(Tick),
}

impl PriceEvent {
    pub fn time(&self) -> DateTime<Utc> {
        match self {
            Self::Bar(bar) => bar.time,
            Self::Tick(tick) => tick.time,
        }
    }

    pub fn symbol(&self) -> &str {
        match self {
            Self::Bar(bar) => &bar.symbol,
            Self::Tick(tick) => &tick.symbol,
        }
    }

    /// Bar: close. Tick: mid of bid/ask.
    pub fn price(&self) -> f64 {
        match self {
            Self::Bar(bar) => bar.close,
            Self::Tick(tick) => tick.mid(),
        }
    }

    /// Whether the observation can be marked against.
    pub fn is_sane(&self) -> bool {
        match self {
            Self::Bar(bar) => bar.is_sane(),
            Self::Tick(tick) => tick.is_sane(),
        }
    }

    pub fn as_bar(&self) -> Option<&Bar> {
        match self {
            Self::Bar(bar) => Some(bar),
            Self::Tick(_) => None,
        }
    }
}

impl From<Bar> for PriceEvent {
    fn from(bar: Bar) -> Self {
        Self::Bar(bar)
    }
}

impl From<Tick> for PriceEvent {
    fn from(tick: Tick) -> Self {
        Self::Tick(tick)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_bar() -> Bar {
        Bar::new(
            Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
            "SPY",
            100.0,
            105.0,
            98.0,
            103.0,
            50_000.0,
        )
    }

    #[test]
    fn bar_is_sane() {
        assert!(sample_bar().is_sane());
    }

    #[test]
    fn bar_rejects_non_finite_and_non_positive() {
        let mut bar = sample_bar();
        bar.open = f64::NAN;
        assert!(!bar.is_sane());

        let mut bar = sample_bar();
        bar.high = f64::INFINITY;
        assert!(!bar.is_sane());

        let mut bar = sample_bar();
        bar.low = -1.0;
        bar.close = 0.0;
        assert!(!bar.is_sane());
    }

    #[test]
    fn tick_sanity() {
        let time = Utc.with_ymd_and_hms(2024, 1, 2, 14, 30, 0).unwrap();
        assert!(Tick::new(time, "EURUSD", 1.0, 1.1).is_sane());
        assert!(!Tick::new(time, "EURUSD", 1.2, 1.1).is_sane());
        assert!(!Tick::new(time, "EURUSD", 0.0, 1.1).is_sane());
        assert!(!Tick::new(time, "EURUSD", 1.0, f64::NAN).is_sane());
        assert!(!PriceEvent::from(Tick::new(time, "EURUSD", -1.0, 1.0)).is_sane());
    }

    #[test]
    fn bar_detects_insane_high_low() {
        let mut bar = sample_bar();
        bar.high = 97.0; // below low
        assert!(!bar.is_sane());
    }

    #[test]
    fn bar_price_is_close() {
        let event = PriceEvent::from(sample_bar());
        assert_eq!(event.price(), 103.0);
        assert_eq!(event.symbol(), "SPY");
        assert!(event.as_bar().is_some());
    }

    #[test]
    fn tick_price_is_mid() {
        let tick = Tick::new(
            Utc.with_ymd_and_hms(2024, 1, 2, 14, 30, 0).unwrap(),
            "EURUSD",
            1.0998,
            1.1002,
        );
        assert!((tick.spread() - 0.0004).abs() < 1e-12);
        let event = PriceEvent::from(tick);
        assert!((event.price() - 1.1).abs() < 1e-12);
        assert!(event.as_bar().is_none());
    }

    #[test]
    fn price_event_serialization_roundtrip() {
        let event = PriceEvent::from(sample_bar());
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"kind\":\"bar\""));
        let deser: PriceEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, deser);
    }
}

//! Market data: the price stream the engine pulls from, plus per-instrument
//! history and a latest-price cache built as events are dispatched.

mod market;

pub use market::{MarketData, Observation};

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::domain::{Metrics, PriceEvent};

/// A dispatched price event together with the metrics algos recorded on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub event: PriceEvent,
    pub metrics: Metrics,
}

/// Owns the ordered price stream and everything observed from it so far.
///
/// The stream must already be sorted by (time, symbol); it is not re-checked.
#[derive(Debug, Clone, Default)]
pub struct MarketData {
    stream: Vec<PriceEvent>,
    cursor: usize,
    symbols: Option<BTreeSet<String>>,
    history: HashMap<String, Vec<Observation>>,
    latest: HashMap<String, PriceEvent>,
}

impl MarketData {
    pub fn new(stream: impl IntoIterator<Item = PriceEvent>) -> Self {
        Self {
            stream: stream.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Restrict the stream to these symbols. An empty list keeps every symbol.
    pub fn with_symbols<I, S>(mut self, symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set: BTreeSet<String> = symbols.into_iter().map(Into::into).collect();
        self.symbols = if set.is_empty() { None } else { Some(set) };
        self
    }

    fn includes(&self, symbol: &str) -> bool {
        self.symbols.as_ref().map_or(true, |s| s.contains(symbol))
    }

    /// Next event from the stream, skipping filtered-out symbols.
    pub fn pull(&mut self) -> Option<PriceEvent> {
        while let Some(event) = self.stream.get(self.cursor) {
            self.cursor += 1;
            if self.includes(event.symbol()) {
                return Some(event.clone());
            }
        }
        None
    }

    /// Next not-yet-pulled event for `symbol`, without consuming anything.
    pub fn peek_next(&self, symbol: &str) -> Option<&PriceEvent> {
        self.stream[self.cursor..]
            .iter()
            .find(|event| event.symbol() == symbol)
    }

    /// Number of stream events not yet pulled (before symbol filtering).
    pub fn remaining(&self) -> usize {
        self.stream.len() - self.cursor
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    /// Append a dispatched event to its symbol's history and refresh the latest cache.
    pub fn record(&mut self, event: PriceEvent) {
        let symbol = event.symbol().to_string();
        self.latest.insert(symbol.clone(), event.clone());
        self.history.entry(symbol).or_default().push(Observation {
            event,
            metrics: Metrics::new(),
        });
    }

    /// Merge metrics into the most recent observation of `symbol`.
    pub fn attach_metrics(&mut self, symbol: &str, metrics: Metrics) {
        if metrics.is_empty() {
            return;
        }
        if let Some(last) = self.history.get_mut(symbol).and_then(|h| h.last_mut()) {
            for (key, value) in metrics.iter() {
                // keys were validated when the algo recorded them
                let _ = last.metrics.add(key, value);
            }
        }
    }

    pub fn latest(&self, symbol: &str) -> Option<&PriceEvent> {
        self.latest.get(symbol)
    }

    pub fn history(&self, symbol: &str) -> &[Observation] {
        self.history.get(symbol).map_or(&[], Vec::as_slice)
    }

    /// Symbols seen so far, sorted.
    pub fn symbols(&self) -> Vec<&str> {
        let mut symbols: Vec<&str> = self.history.keys().map(String::as_str).collect();
        symbols.sort_unstable();
        symbols
    }

    pub fn len(&self) -> usize {
        self.stream.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stream.is_empty()
    }

    /// Rewind to the start of the stream and forget everything observed.
    pub fn reset(&mut self) {
        self.cursor = 0;
        self.history.clear();
        self.latest.clear();
    }
}

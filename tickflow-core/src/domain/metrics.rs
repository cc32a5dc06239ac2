//! Named numeric values recorded against a price observation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{BacktestError, Result};

/// Indicator values attached to one observation, keyed by name (e.g. `sma_20`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics(BTreeMap<String, f64>);

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value. Empty or whitespace-only keys are rejected.
    pub fn add(&mut self, key: impl Into<String>, value: f64) -> Result<()> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(BacktestError::InvalidKey);
        }
        self.0.insert(key, value);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.0.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

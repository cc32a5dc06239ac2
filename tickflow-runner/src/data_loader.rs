//! CSV price loading.
//!
//! Accepts bar rows (`symbol,time,open,high,low,close,volume`) or tick rows
//! (`symbol,time,bid,ask`); both kinds may appear in one file. `time` is
//! RFC 3339 or a plain `YYYY-MM-DD` date (midnight UTC). The returned stream is
//! sorted by (time, symbol), which is the order the engine requires.

use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use thiserror::Error;
use tickflow_core::domain::{Bar, PriceEvent, Tick};
use tracing::info;

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("CSV error in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{path} row {row}: {message}")]
    InvalidRow {
        path: PathBuf,
        row: usize,
        message: String,
    },

    #[error("no price rows in {0}")]
    Empty(PathBuf),
}

#[derive(Debug, Deserialize)]
struct PriceRow {
    symbol: String,
    time: String,
    #[serde(default)]
    open: Option<f64>,
    #[serde(default)]
    high: Option<f64>,
    #[serde(default)]
    low: Option<f64>,
    #[serde(default)]
    close: Option<f64>,
    #[serde(default)]
    volume: Option<f64>,
    #[serde(default)]
    bid: Option<f64>,
    #[serde(default)]
    ask: Option<f64>,
}

impl PriceRow {
    fn into_event(self) -> Result<PriceEvent, String> {
        let symbol = self.symbol.trim();
        if symbol.is_empty() {
            return Err("symbol is empty".into());
        }
        let time = parse_time(&self.time)?;

        let event: PriceEvent = if let Some(close) = self.close {
            Bar::new(
                time,
                symbol,
                self.open.unwrap_or(close),
                self.high.unwrap_or(close),
                self.low.unwrap_or(close),
                close,
                self.volume.unwrap_or(0.0),
            )
            .into()
        } else {
            match (self.bid, self.ask) {
                (Some(bid), Some(ask)) => Tick::new(time, symbol, bid, ask).into(),
                _ => return Err("row has neither close nor bid/ask".into()),
            }
        };

        if !event.is_sane() {
            return Err(format!("unusable prices for {symbol}: {event:?}"));
        }
        Ok(event)
    }
}

fn parse_time(raw: &str) -> Result<DateTime<Utc>, String> {
    let raw = raw.trim();
    if let Ok(time) = DateTime::parse_from_rfc3339(raw) {
        return Ok(time.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("unparseable time '{raw}'"))
}

/// Load and sort a CSV price file.
pub fn load_csv(path: &Path) -> Result<Vec<PriceEvent>, LoadError> {
    let reader = csv::Reader::from_path(path).map_err(|source| LoadError::Csv {
        path: path.to_path_buf(),
        source,
    })?;
    let events = read_events(reader, path)?;
    info!(path = %path.display(), events = events.len(), "loaded price stream");
    Ok(events)
}

/// Parse CSV from any reader; `origin` is only used in error messages.
pub fn parse_csv(input: impl Read, origin: &Path) -> Result<Vec<PriceEvent>, LoadError> {
    read_events(csv::Reader::from_reader(input), origin)
}

fn read_events<R: Read>(
    mut reader: csv::Reader<R>,
    origin: &Path,
) -> Result<Vec<PriceEvent>, LoadError> {
    let mut events = Vec::new();
    for (index, row) in reader.deserialize::<PriceRow>().enumerate() {
        // header is line 1
        let line = index + 2;
        let row = row.map_err(|source| LoadError::Csv {
            path: origin.to_path_buf(),
            source,
        })?;
        let event = row.into_event().map_err(|message| LoadError::InvalidRow {
            path: origin.to_path_buf(),
            row: line,
            message,
        })?;
        events.push(event);
    }
    if events.is_empty() {
        return Err(LoadError::Empty(origin.to_path_buf()));
    }
    events.sort_by(|a, b| a.time().cmp(&b.time()).then_with(|| a.symbol().cmp(b.symbol())));
    Ok(events)
}

/// Distinct symbols in a stream, sorted.
pub fn symbols_in(stream: &[PriceEvent]) -> Vec<String> {
    let mut symbols: Vec<String> = stream.iter().map(|e| e.symbol().to_string()).collect();
    symbols.sort();
    symbols.dedup();
    symbols
}

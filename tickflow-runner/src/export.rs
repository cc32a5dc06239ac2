//! Result artifacts on disk.
//!
//! Layout under the output directory:
//! - `result.json` : full [`BacktestResult`]
//! - `equity.csv`  : `time,equity,period_return`
//! - `fills.csv`   : one row per fill

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tickflow_core::domain::Fill;
use tickflow_core::engine::EquityPoint;
use tracing::info;

use crate::runner::BacktestResult;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV buffer error: {0}")]
    Buffer(String),
}

fn write_file(path: &Path, contents: &[u8]) -> Result<(), ExportError> {
    fs::write(path, contents).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn into_string(writer: csv::Writer<Vec<u8>>) -> Result<String, ExportError> {
    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Buffer(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ExportError::Buffer(e.to_string()))
}

/// Equity curve as CSV.
pub fn equity_csv(curve: &[EquityPoint]) -> Result<String, ExportError> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["time", "equity", "period_return"])?;
    for point in curve {
        wtr.write_record(&[
            point.time.to_rfc3339(),
            point.equity.to_string(),
            point.period_return.to_string(),
        ])?;
    }
    into_string(wtr)
}

/// Fills as CSV.
pub fn fills_csv(fills: &[Fill]) -> Result<String, ExportError> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "order_id",
        "time",
        "symbol",
        "direction",
        "quantity",
        "price",
        "commission",
        "exchange_fee",
    ])?;
    for fill in fills {
        wtr.write_record(&[
            fill.order_id.0.to_string(),
            fill.time.to_rfc3339(),
            fill.symbol.clone(),
            fill.direction.to_string(),
            fill.quantity.to_string(),
            fill.price.to_string(),
            fill.commission.to_string(),
            fill.exchange_fee.to_string(),
        ])?;
    }
    into_string(wtr)
}

/// Write all artifacts into `dir`, creating it if needed. Returns the written paths.
pub fn save_result(result: &BacktestResult, dir: &Path) -> Result<Vec<PathBuf>, ExportError> {
    fs::create_dir_all(dir).map_err(|source| ExportError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let json_path = dir.join("result.json");
    write_file(&json_path, serde_json::to_string_pretty(result)?.as_bytes())?;

    let equity_path = dir.join("equity.csv");
    write_file(&equity_path, equity_csv(&result.equity_curve)?.as_bytes())?;

    let fills_path = dir.join("fills.csv");
    write_file(&fills_path, fills_csv(&result.fills)?.as_bytes())?;

    info!(dir = %dir.display(), run_id = %result.run_id, "saved result");
    Ok(vec![json_path, equity_path, fills_path])
}

/// Read back a `result.json` written by [`save_result`].
pub fn load_result(dir: &Path) -> Result<BacktestResult, ExportError> {
    let path = dir.join("result.json");
    let contents = fs::read_to_string(&path).map_err(|source| ExportError::Io { path, source })?;
    Ok(serde_json::from_str(&contents)?)
}

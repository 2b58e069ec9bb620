//! CSV history source — per-symbol files in a local directory.
//!
//! File layout: `<dir>/<SYMBOL>.csv` with header
//! `date,open,high,low,close,volume,is_earnings` (the earnings column is
//! optional on read). Rows must be sane OHLC bars in strictly increasing
//! date order.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::data::source::{HistoryError, HistorySource};
use crate::data::synthetic::{MAX_YEARS, MIN_YEARS};
use crate::domain::Bar;

/// Weekday count per calendar year, used to trim a CSV series to a span.
const WEEKDAYS_PER_YEAR: usize = 261;

#[derive(Debug, Serialize, Deserialize)]
struct CsvBar {
    date: NaiveDate,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: u64,
    #[serde(default)]
    is_earnings: bool,
}

/// Reads `SYMBOL.csv` files from a directory.
#[derive(Debug, Clone)]
pub struct CsvSource {
    dir: PathBuf,
}

impl CsvSource {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Path a symbol's file is expected at.
    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", symbol.to_uppercase()))
    }
}

impl HistorySource for CsvSource {
    fn name(&self) -> &str {
        "csv"
    }

    fn fetch(&self, symbol: &str, years: u32) -> Result<Vec<Bar>, HistoryError> {
        let mut bars = read_bars(&self.path_for(symbol))?;
        let cap = years.clamp(MIN_YEARS, MAX_YEARS) as usize * WEEKDAYS_PER_YEAR;
        if bars.len() > cap {
            bars.drain(..bars.len() - cap);
        }
        Ok(bars)
    }
}

/// Read and validate a full CSV file of daily bars.
pub fn read_bars(path: &Path) -> Result<Vec<Bar>, HistoryError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut bars: Vec<Bar> = Vec::new();
    for (i, record) in reader.deserialize::<CsvBar>().enumerate() {
        let line = i + 2; // 1-based, after the header
        let row = record.map_err(|e| HistoryError::Malformed {
            line,
            reason: e.to_string(),
        })?;
        let bar = Bar {
            date: row.date,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
            is_earnings: row.is_earnings,
        };
        if !bar.is_sane() {
            return Err(HistoryError::Malformed {
                line,
                reason: "OHLC ordering violated".into(),
            });
        }
        if let Some(prev) = bars.last() {
            if bar.date <= prev.date {
                return Err(HistoryError::Malformed {
                    line,
                    reason: format!("date {} not after {}", bar.date, prev.date),
                });
            }
        }
        bars.push(bar);
    }
    if bars.is_empty() {
        return Err(HistoryError::Empty);
    }
    Ok(bars)
}

/// Write a series to disk in the layout `read_bars` accepts.
pub fn write_bars(path: &Path, bars: &[Bar]) -> Result<(), HistoryError> {
    write_bars_to(std::fs::File::create(path)?, bars)
}

/// Write a series to any writer, same layout as [`write_bars`].
pub fn write_bars_to<W: std::io::Write>(writer: W, bars: &[Bar]) -> Result<(), HistoryError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record([
        "date",
        "open",
        "high",
        "low",
        "close",
        "volume",
        "is_earnings",
    ])?;
    for bar in bars {
        wtr.write_record([
            &bar.date.to_string(),
            &format!("{:.4}", bar.open),
            &format!("{:.4}", bar.high),
            &format!("{:.4}", bar.low),
            &format!("{:.4}", bar.close),
            &bar.volume.to_string(),
            &bar.is_earnings.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

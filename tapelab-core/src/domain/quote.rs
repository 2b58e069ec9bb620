//! Quote — last-price snapshot derived from the tail of a daily series.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::bar::Bar;

/// Snapshot of the most recent session, with day-over-day change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub name: String,
    pub price: f64,
    pub change: f64,
    pub change_pct: f64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub prev_close: f64,
    pub volume: u64,
    pub as_of: NaiveDate,
}

impl Quote {
    /// Derives a quote from the last two bars of a series.
    ///
    /// Returns None when fewer than two bars are available; change and
    /// change_pct are rounded to two decimals, matching display precision.
    pub fn from_bars(symbol: &str, name: &str, bars: &[Bar]) -> Option<Quote> {
        if bars.len() < 2 {
            return None;
        }
        let last = &bars[bars.len() - 1];
        let prev = &bars[bars.len() - 2];
        let change = round2(last.close - prev.close);
        let change_pct = if prev.close != 0.0 {
            round2(change / prev.close * 100.0)
        } else {
            0.0
        };
        Some(Quote {
            symbol: symbol.to_string(),
            name: name.to_string(),
            price: last.close,
            change,
            change_pct,
            open: last.open,
            high: last.high,
            low: last.low,
            prev_close: prev.close,
            volume: last.volume,
            as_of: last.date,
        })
    }

    /// True when the session closed flat or up versus the prior close.
    pub fn is_up(&self) -> bool {
        self.change >= 0.0
    }
}

/// Rounds to two decimal places.
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

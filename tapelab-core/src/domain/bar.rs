//! Bar — the fundamental market data unit.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Daily OHLCV bar for a single symbol.
///
/// `is_earnings` marks a synthetic earnings-shock day so the renderer and
/// tooltip can flag it. Real data sources leave it false.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    #[serde(default)]
    pub is_earnings: bool,
}

impl Bar {
    /// Basic OHLC sanity check: `low <= min(open,close) <= max(open,close) <= high`,
    /// all prices positive, nothing NaN.
    pub fn is_sane(&self) -> bool {
        self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite()
            && self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.low > 0.0
    }

    /// True when the bar closed at or above its open.
    pub fn is_bullish(&self) -> bool {
        self.close >= self.open
    }

    /// Upper edge of the candle body.
    pub fn body_top(&self) -> f64 {
        self.open.max(self.close)
    }

    /// Lower edge of the candle body.
    pub fn body_bottom(&self) -> f64 {
        self.open.min(self.close)
    }
}

/// Returns true when the date falls on a Saturday or Sunday.
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Series-level sanity: strictly increasing dates and no weekend bars.
pub fn series_is_ordered(bars: &[Bar]) -> bool {
    bars.windows(2).all(|w| w[0].date < w[1].date) && bars.iter().all(|b| !is_weekend(b.date))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bar() -> Bar {
        Bar {
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            open: 100.0,
            high: 105.0,
            low: 98.0,
            close: 103.0,
            volume: 50_000,
            is_earnings: false,
        }
    }

    #[test]
    fn bar_is_sane() {
        assert!(sample_bar().is_sane());
    }

    #[test]
    fn bar_detects_nan() {
        let mut bar = sample_bar();
        bar.open = f64::NAN;
        assert!(!bar.is_sane());
    }

    #[test]
    fn bar_detects_insane_high_low() {
        let mut bar = sample_bar();
        bar.high = 97.0; // below low
        assert!(!bar.is_sane());
    }

    #[test]
    fn body_edges_and_direction() {
        let bar = sample_bar();
        assert!(bar.is_bullish());
        assert_eq!(bar.body_top(), 103.0);
        assert_eq!(bar.body_bottom(), 100.0);

        let mut bear = sample_bar();
        bear.close = 99.0;
        assert!(!bear.is_bullish());
        assert_eq!(bear.body_top(), 100.0);
        assert_eq!(bear.body_bottom(), 99.0);
    }

    #[test]
    fn ordered_series_rejects_weekend_and_disorder() {
        let mut bars = vec![sample_bar(), sample_bar()];
        bars[1].date = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
        assert!(series_is_ordered(&bars));

        bars[1].date = bars[0].date;
        assert!(!series_is_ordered(&bars));

        // 2024-01-06 is a Saturday.
        bars[1].date = NaiveDate::from_ymd_opt(2024, 1, 6).unwrap();
        assert!(!series_is_ordered(&bars));
    }

    #[test]
    fn bar_serialization_roundtrip() {
        let bar = sample_bar();
        let json = serde_json::to_string(&bar).unwrap();
        let deser: Bar = serde_json::from_str(&json).unwrap();
        assert_eq!(bar.date, deser.date);
        assert_eq!(bar.close, deser.close);
        assert!(!deser.is_earnings);
    }
}

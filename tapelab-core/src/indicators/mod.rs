//! Indicator computation.
//!
//! Indicators are computed once over the entire history, independent of any
//! display viewport, so values stay stable while the viewport moves. The
//! warmup prefix (indices before the window fills) is encoded as NaN; the
//! presentation layer skips non-finite values.

pub mod sma;

pub use sma::{sma, FAST_SMA_PERIOD, SLOW_SMA_PERIOD};

/// Create synthetic bars from close prices for testing.
///
/// Generates plausible OHLV: open = prev_close (or close for the first bar),
/// high = max(open,close) + 1.0, low = min(open,close) - 1.0, volume = 1000.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<crate::domain::Bar> {
    use crate::domain::Bar;
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            let high = open.max(close) + 1.0;
            let low = (open.min(close) - 1.0).max(0.01);
            Bar {
                date: next_weekday(base_date, i),
                open,
                high,
                low,
                close,
                volume: 1000,
                is_earnings: false,
            }
        })
        .collect()
}

/// The i-th weekday on or after `base`.
#[cfg(test)]
pub fn next_weekday(base: chrono::NaiveDate, i: usize) -> chrono::NaiveDate {
    let weeks = i / 5;
    let rem = i % 5;
    let mut date = base + chrono::Duration::days((weeks * 7) as i64);
    let mut step = rem;
    loop {
        if !crate::domain::is_weekend(date) {
            if step == 0 {
                return date;
            }
            step -= 1;
        }
        date += chrono::Duration::days(1);
    }
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;

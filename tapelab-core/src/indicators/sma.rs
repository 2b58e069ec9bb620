//! Simple Moving Average (SMA).
//!
//! Rolling mean of close prices over a trailing window. First valid value at
//! index period-1; earlier indices are NaN.

use crate::domain::Bar;

/// Default fast overlay period for the chart.
pub const FAST_SMA_PERIOD: usize = 20;
/// Default slow overlay period; also the detector's reference average.
pub const SLOW_SMA_PERIOD: usize = 50;

/// Compute the SMA of closes over `period` bars, aligned 1:1 with the input.
///
/// `values[i]` is NaN for `i < period-1`, otherwise the exact mean of the
/// trailing `period` closes ending at `i` inclusive. Rolling sum, single
/// pass. Inputs are validated bars, so closes are finite.
///
/// Panics if `period < 2`.
pub fn sma(bars: &[Bar], period: usize) -> Vec<f64> {
    assert!(period >= 2, "SMA period must be >= 2");
    let n = bars.len();
    let mut values = vec![f64::NAN; n];
    if n < period {
        return values;
    }

    let mut sum: f64 = bars.iter().take(period).map(|b| b.close).sum();
    values[period - 1] = sum / period as f64;

    for i in period..n {
        sum += bars[i].close - bars[i - period].close;
        values[i] = sum / period as f64;
    }

    values
}

//! Breakout scanning.

pub mod breakout;

pub use breakout::{
    detect, BreakoutDirection, BreakoutEvent, CONSOL_MAX_RANGE, CONSOL_WINDOW, LOOKBACK,
    MIN_EVENT_GAP, VOLUME_SURGE_RATIO,
};

use crate::domain::Bar;
use crate::indicators::sma;

/// Compute the reference SMA over the full history and run the detector.
pub fn scan_series(bars: &[Bar], sma_period: usize) -> Vec<BreakoutEvent> {
    let reference = sma(bars, sma_period);
    detect(bars, &reference)
}

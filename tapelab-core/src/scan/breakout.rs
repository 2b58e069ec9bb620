//! Breakout detection — SMA crossings confirmed by volume, plus
//! range-compression expansions.
//!
//! Three triggers per index, evaluated only where the reference SMA is valid
//! at the current and previous bar:
//! 1. bullish cross: close crosses above the SMA on above-average volume
//! 2. bearish cross: mirror
//! 3. consolidation breakout: a tight 10-bar range resolving up (`CONSOL+`)
//!    or down (`CONSOL-`) on above-average volume
//!
//! Raw hits are deduplicated greedily: an event is retained only when it is
//! more than [`MIN_EVENT_GAP`] indices after the last retained event.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::Bar;

/// Bars in the trailing volume baseline; scanning starts at `LOOKBACK + 1`.
pub const LOOKBACK: usize = 5;
/// Volume must strictly exceed this multiple of the trailing baseline.
pub const VOLUME_SURGE_RATIO: f64 = 1.6;
/// Consolidation window length in bars.
pub const CONSOL_WINDOW: usize = 10;
/// Range ratio below this marks a tight consolidation.
pub const CONSOL_MAX_RANGE: f64 = 0.04;
/// Close must clear the window high by this factor to resolve upward.
pub const CONSOL_BREAK_UP: f64 = 1.008;
/// Close must undercut the window low by this factor to resolve downward.
pub const CONSOL_BREAK_DOWN: f64 = 0.992;
/// Minimum index distance between retained events.
pub const MIN_EVENT_GAP: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BreakoutDirection {
    Bull,
    Bear,
}

impl BreakoutDirection {
    pub fn label(&self) -> &'static str {
        match self {
            BreakoutDirection::Bull => "BULL",
            BreakoutDirection::Bear => "BEAR",
        }
    }
}

/// A detected breakout. `index` points into the full series the detector ran
/// over; `label` carries the consolidation tag when the trigger was a range
/// expansion rather than an SMA cross.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakoutEvent {
    pub index: usize,
    pub direction: BreakoutDirection,
    pub date: NaiveDate,
    pub price: f64,
    pub label: Option<String>,
}

/// Scan a series against its reference SMA.
///
/// `sma` must be aligned 1:1 with `bars` (NaN where unwarmed). Events come
/// back in ascending index order, deduplicated first-wins.
pub fn detect(bars: &[Bar], sma: &[f64]) -> Vec<BreakoutEvent> {
    assert_eq!(bars.len(), sma.len(), "SMA must align with bars");
    let mut events: Vec<BreakoutEvent> = Vec::new();
    if bars.len() <= LOOKBACK + 1 {
        return events;
    }
    let mut last_retained: Option<usize> = None;
    for i in (LOOKBACK + 1)..bars.len() {
        let event = match evaluate_at(bars, sma, i) {
            Some(e) => e,
            None => continue,
        };
        if let Some(last) = last_retained {
            if event.index - last <= MIN_EVENT_GAP {
                continue;
            }
        }
        last_retained = Some(event.index);
        events.push(event);
    }
    events
}

/// Evaluate the three triggers at one index. Crosses take precedence over
/// consolidation expansions.
fn evaluate_at(bars: &[Bar], sma: &[f64], i: usize) -> Option<BreakoutEvent> {
    let sma_cur = sma[i];
    let sma_prev = sma[i - 1];
    if !sma_cur.is_finite() || !sma_prev.is_finite() {
        return None;
    }

    let bar = &bars[i];
    let prev_close = bars[i - 1].close;
    let surge = volume_surge(bars, i);

    if prev_close < sma_prev && bar.close > sma_cur && surge {
        return Some(event(i, bar, BreakoutDirection::Bull, None));
    }
    if prev_close > sma_prev && bar.close < sma_cur && surge {
        return Some(event(i, bar, BreakoutDirection::Bear, None));
    }

    if i >= LOOKBACK + CONSOL_WINDOW && surge {
        let window = &bars[i - CONSOL_WINDOW..i];
        let window_high = window.iter().map(|b| b.high).fold(f64::MIN, f64::max);
        let window_low = window.iter().map(|b| b.low).fold(f64::MAX, f64::min);
        if window_low > 0.0 {
            let range_ratio = (window_high - window_low) / window_low;
            if range_ratio < CONSOL_MAX_RANGE {
                if bar.close > window_high * CONSOL_BREAK_UP {
                    return Some(event(i, bar, BreakoutDirection::Bull, Some("CONSOL+")));
                }
                if bar.close < window_low * CONSOL_BREAK_DOWN {
                    return Some(event(i, bar, BreakoutDirection::Bear, Some("CONSOL-")));
                }
            }
        }
    }

    None
}

/// Strict comparison: a volume exactly at the threshold does not surge.
fn volume_surge(bars: &[Bar], i: usize) -> bool {
    let sum: u64 = bars[i - LOOKBACK..i].iter().map(|b| b.volume).sum();
    let mean = sum as f64 / LOOKBACK as f64;
    bars[i].volume as f64 > VOLUME_SURGE_RATIO * mean
}

fn event(
    index: usize,
    bar: &Bar,
    direction: BreakoutDirection,
    label: Option<&str>,
) -> BreakoutEvent {
    BreakoutEvent {
        index,
        direction,
        date: bar.date,
        price: bar.close,
        label: label.map(String::from),
    }
}

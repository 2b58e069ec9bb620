//! Synthetic OHLCV generator — the fallback/demo data source.
//!
//! Produces a daily series that ends exactly at a requested target price:
//! a regime-driven random walk (bull/bear/range phases of 15–95 trading days)
//! with volatility seasonality at year edges, quarterly-style earnings
//! shocks, tiered volume, and a final constant rescale of all OHLC columns
//! so the last close lands on the target.
//!
//! Randomness is injected: callers pass an explicit seed, and per-symbol
//! seeds are derived from a master seed via BLAKE3 so every symbol gets an
//! independent, reproducible stream regardless of derivation order.

use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::{is_weekend, Bar};

/// Span limits, matching the history endpoint this generator stands in for.
pub const MIN_YEARS: u32 = 1;
pub const MAX_YEARS: u32 = 10;

/// Nominal trading bars per year, used for volatility seasonality.
pub const BARS_PER_YEAR: usize = 252;

/// Trading bars that must elapse between earnings shocks (quarterly cadence).
const EARNINGS_GAP_BARS: usize = 62;
/// Daily shock probability once the gap has elapsed.
const EARNINGS_DAILY_PROB: f64 = 0.03;

/// Generator parameters. `anchor` is the exclusive end date of the series;
/// bars run backwards from it for `years` calendar years.
#[derive(Debug, Clone)]
pub struct SynthConfig {
    pub target_price: f64,
    pub years: u32,
    pub anchor: NaiveDate,
    pub seed: u64,
}

impl SynthConfig {
    /// Config anchored at today.
    pub fn new(target_price: f64, years: u32, seed: u64) -> Self {
        Self {
            target_price,
            years,
            anchor: chrono::Local::now().date_naive(),
            seed,
        }
    }

    /// Config with an explicit anchor date, for reproducible spans.
    pub fn anchored(target_price: f64, years: u32, seed: u64, anchor: NaiveDate) -> Self {
        Self {
            target_price,
            years,
            anchor,
            seed,
        }
    }
}

/// Derive a per-symbol seed from a master seed.
///
/// Hash-based (BLAKE3), so derivation is independent of the order in which
/// symbols are processed.
pub fn symbol_seed(master_seed: u64, symbol: &str) -> u64 {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&master_seed.to_le_bytes());
    hasher.update(symbol.as_bytes());
    let hash = hasher.finalize();
    u64::from_le_bytes(hash.as_bytes()[..8].try_into().unwrap())
}

/// One macro phase of the walk: a drift applied for a bounded number of bars.
#[derive(Debug, Clone, Copy)]
struct Regime {
    remaining: usize,
    drift: f64,
}

fn next_regime(rng: &mut StdRng) -> Regime {
    let remaining = rng.gen_range(15..=95);
    let drift = match rng.gen_range(0u8..3) {
        0 => rng.gen_range(0.0004..0.0028),  // bull
        1 => -rng.gen_range(0.0004..0.0024), // bear
        _ => rng.gen_range(-0.0003..0.0003), // range
    };
    Regime { remaining, drift }
}

fn day_volume(rng: &mut StdRng, close: f64, ret: f64, shock: bool) -> u64 {
    let base = if close > 400.0 {
        12_000_000.0
    } else if close > 100.0 {
        30_000_000.0
    } else {
        70_000_000.0
    };
    let surge = 1.0 + ret.abs() * 25.0 + if shock { 1.5 } else { 0.0 };
    (base * (0.4 + rng.gen_range(0.0..1.2)) * surge) as u64
}

/// Generate a daily series per the config. Weekends are skipped; the last
/// close equals `target_price` exactly after the rescale pass.
pub fn generate(cfg: &SynthConfig) -> Vec<Bar> {
    let target = cfg.target_price.max(0.01);
    let years = cfg.years.clamp(MIN_YEARS, MAX_YEARS);
    let mut rng = StdRng::seed_from_u64(cfg.seed);

    let total_days = i64::from(years) * 365;
    let start = cfg.anchor - Duration::days(total_days);

    // Start well below the target so multi-year series trend toward it.
    let mut price = target * (0.30 + rng.gen_range(0.0..0.15));
    let mut regime = next_regime(&mut rng);
    let mut bars_since_shock = 0usize;
    let mut bars: Vec<Bar> = Vec::with_capacity(years as usize * 261);

    for day in 0..total_days {
        let date = start + Duration::days(day);
        if is_weekend(date) {
            continue;
        }

        if regime.remaining == 0 {
            regime = next_regime(&mut rng);
        }
        regime.remaining -= 1;

        // Volatility runs hot in the first/last 10 trading days of each year.
        let year_pos = bars.len() % BARS_PER_YEAR;
        let seasonal = if year_pos < 10 || year_pos >= BARS_PER_YEAR - 10 {
            1.35
        } else {
            1.0
        };
        let vol = (0.009 + rng.gen_range(0.0..0.009)) * seasonal;

        bars_since_shock += 1;
        let mut shock = 0.0;
        if bars_since_shock > EARNINGS_GAP_BARS && rng.gen_range(0.0..1.0) < EARNINGS_DAILY_PROB {
            let magnitude = rng.gen_range(0.03..0.09);
            shock = if rng.gen_bool(0.6) { magnitude } else { -magnitude };
            bars_since_shock = 0;
        }

        let ret = regime.drift + rng.gen_range(-1.0..1.0) * vol + shock;
        price = (price * (1.0 + ret)).max(1.0);

        let spread = price * (0.006 + rng.gen_range(0.0..0.018));
        let open = price * (1.0 + rng.gen_range(-1.0..1.0) * 0.005);
        let high = open.max(price) + rng.gen_range(0.0..0.7) * spread;
        let low = (open.min(price) - rng.gen_range(0.0..0.7) * spread).max(0.01);
        let volume = day_volume(&mut rng, price, ret, shock != 0.0);

        bars.push(Bar {
            date,
            open,
            high,
            low,
            close: price,
            volume,
            is_earnings: shock != 0.0,
        });
    }

    rescale_to_target(&mut bars, target);
    bars
}

/// Multiply every OHLC column by a constant so the last close equals the
/// target exactly. Volume and dates are untouched.
fn rescale_to_target(bars: &mut [Bar], target: f64) {
    let last_close = match bars.last() {
        Some(bar) => bar.close,
        None => return,
    };
    let scale = target / last_close;
    for bar in bars.iter_mut() {
        bar.open *= scale;
        bar.high *= scale;
        bar.low *= scale;
        bar.close *= scale;
    }
    // scale * close can miss the target by an ulp; pin it.
    if let Some(last) = bars.last_mut() {
        last.close = target;
        last.high = last.high.max(target);
        last.low = last.low.min(target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::series_is_ordered;

    fn anchor() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 23).unwrap()
    }

    fn cfg(target: f64, years: u32, seed: u64) -> SynthConfig {
        SynthConfig::anchored(target, years, seed, anchor())
    }

    #[test]
    fn same_seed_same_series() {
        let a = generate(&cfg(189.45, 3, 42));
        let b = generate(&cfg(189.45, 3, 42));
        assert_eq!(a, b);
    }

    #[test]
    fn different_seeds_differ() {
        let a = generate(&cfg(189.45, 1, 42));
        let b = generate(&cfg(189.45, 1, 43));
        assert_ne!(a, b);
    }

    #[test]
    fn last_close_is_exactly_target() {
        for seed in [1u64, 7, 99] {
            let bars = generate(&cfg(721.28, 5, seed));
            assert_eq!(bars.last().unwrap().close, 721.28);
        }
    }

    #[test]
    fn every_bar_is_sane_and_ordered() {
        let bars = generate(&cfg(213.65, 5, 7));
        assert!(series_is_ordered(&bars));
        for bar in &bars {
            assert!(bar.is_sane(), "insane bar at {}", bar.date);
            assert!(bar.volume > 0);
        }
    }

    #[test]
    fn span_roughly_matches_years() {
        let bars = generate(&cfg(100.0, 2, 5));
        // Two calendar years of weekdays.
        assert!((bars.len() as i64 - 521).abs() < 10, "got {}", bars.len());
        let first = bars.first().unwrap().date;
        let last = bars.last().unwrap().date;
        assert!(last < anchor());
        // The raw start may fall on a weekend, shifting the first bar forward.
        assert!(anchor() - first >= Duration::days(725));
    }

    #[test]
    fn years_are_clamped() {
        let short = generate(&cfg(100.0, 0, 5));
        let one = generate(&cfg(100.0, 1, 5));
        assert_eq!(short.len(), one.len());

        let long = generate(&cfg(100.0, 50, 5));
        let ten = generate(&cfg(100.0, 10, 5));
        assert_eq!(long.len(), ten.len());
    }

    #[test]
    fn earnings_shocks_spaced_by_quarter() {
        let bars = generate(&cfg(492.80, 10, 11));
        let shock_idx: Vec<usize> = bars
            .iter()
            .enumerate()
            .filter(|(_, b)| b.is_earnings)
            .map(|(i, _)| i)
            .collect();
        assert!(!shock_idx.is_empty(), "10y series should contain shocks");
        for pair in shock_idx.windows(2) {
            assert!(pair[1] - pair[0] > EARNINGS_GAP_BARS);
        }
    }

    #[test]
    fn symbol_seeds_are_stable_and_distinct() {
        assert_eq!(symbol_seed(42, "SPY"), symbol_seed(42, "SPY"));
        assert_ne!(symbol_seed(42, "SPY"), symbol_seed(42, "QQQ"));
        assert_ne!(symbol_seed(42, "SPY"), symbol_seed(43, "SPY"));
    }

    #[test]
    fn degenerate_target_is_clamped() {
        let bars = generate(&cfg(-5.0, 1, 3));
        assert_eq!(bars.last().unwrap().close, 0.01);
        assert!(bars.iter().all(|b| b.is_sane()));
    }
}

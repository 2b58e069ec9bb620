//! Chart geometry: pure mapping from bar/price space to surface space.
//!
//! Everything here is recomputed per frame from the visible slice. The
//! mappings carry no state, so a resize or zoom needs no invalidation
//! pass, the next frame simply computes against the new inputs.

use chrono::Datelike;

use crate::domain::Bar;

/// Fraction of vertical headroom added above and below the visible
/// price extent.
pub const PRICE_PAD_RATIO: f64 = 0.07;

/// Fraction of the content height reserved for the volume strip.
pub const VOLUME_SHARE: f64 = 0.20;

/// Horizontal budget per x-axis label.
pub const X_LABEL_BUDGET_PX: f64 = 70.0;

/// Target number of y-axis gridline divisions.
pub const Y_TICK_DIVISIONS: f64 = 6.0;

/// Axis-aligned rectangle in surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectF {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl RectF {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> RectF {
        RectF { x, y, w, h }
    }

    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }
}

/// Canvas dimensions and gutters handed in by the embedding surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConfig {
    pub width: f64,
    pub height: f64,
    pub left_pad: f64,
    pub right_pad: f64,
    pub top_pad: f64,
    pub bottom_pad: f64,
    /// Per-label width used to derive the x-axis label stride.
    pub label_budget_px: f64,
    /// Advance width of one character on the target surface.
    pub char_width: f64,
    /// Height of one text line on the target surface.
    pub line_height: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            width: 960.0,
            height: 540.0,
            left_pad: 64.0,
            right_pad: 16.0,
            top_pad: 12.0,
            bottom_pad: 24.0,
            label_budget_px: X_LABEL_BUDGET_PX,
            char_width: 7.0,
            line_height: 14.0,
        }
    }
}

/// Resolved per-frame geometry for one visible slice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartLayout {
    /// Price plot region.
    pub plot: RectF,
    /// Volume strip below the plot.
    pub volume: RectF,
    /// Padded price bounds mapped onto the plot.
    pub price_lo: f64,
    pub price_hi: f64,
    /// Largest visible volume; the strip's full height.
    pub max_volume: f64,
    pub visible: usize,
}

impl ChartLayout {
    /// Compute geometry for `bars` (the visible slice only).
    ///
    /// Returns None when there is nothing to map: no bars, or a canvas
    /// smaller than its own gutters.
    pub fn compute(cfg: &LayoutConfig, bars: &[Bar]) -> Option<ChartLayout> {
        if bars.is_empty() {
            return None;
        }
        let content_w = cfg.width - cfg.left_pad - cfg.right_pad;
        let content_h = cfg.height - cfg.top_pad - cfg.bottom_pad;
        if content_w <= 0.0 || content_h <= 0.0 {
            return None;
        }

        let volume_h = content_h * VOLUME_SHARE;
        let plot_h = content_h - volume_h;
        let plot = RectF::new(cfg.left_pad, cfg.top_pad, content_w, plot_h);
        let volume = RectF::new(cfg.left_pad, cfg.top_pad + plot_h, content_w, volume_h);

        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        let mut max_volume = 0.0f64;
        for bar in bars {
            lo = lo.min(bar.low);
            hi = hi.max(bar.high);
            max_volume = max_volume.max(bar.volume as f64);
        }
        let range = hi - lo;
        // A flat slice still needs a non-zero span to map into.
        let pad = if range > 0.0 { range * PRICE_PAD_RATIO } else { 1.0 };

        Some(ChartLayout {
            plot,
            volume,
            price_lo: lo - pad,
            price_hi: hi + pad,
            max_volume,
            visible: bars.len(),
        })
    }

    /// Horizontal pixels per visible bar.
    pub fn bar_width(&self) -> f64 {
        self.plot.w / self.visible as f64
    }

    /// Center x of visible bar `i`.
    pub fn x_for_bar(&self, i: usize) -> f64 {
        self.plot.x + (i as f64 + 0.5) * self.bar_width()
    }

    /// Map a price into the plot, inverted so larger prices sit higher.
    pub fn price_to_y(&self, price: f64) -> f64 {
        let span = self.price_hi - self.price_lo;
        let t = (price - self.price_lo) / span;
        self.plot.y + self.plot.h * (1.0 - t)
    }

    /// Map a volume into the strip; zero maps to the strip floor.
    pub fn volume_to_y(&self, volume: u64) -> f64 {
        if self.max_volume <= 0.0 {
            return self.volume.bottom();
        }
        let t = (volume as f64 / self.max_volume).clamp(0.0, 1.0);
        self.volume.y + self.volume.h * (1.0 - t)
    }

    /// Nearest visible bar for a pointer x, saturated to the slice.
    pub fn bar_at_x(&self, x: f64) -> usize {
        let raw = ((x - self.plot.x) / self.bar_width()).floor();
        (raw.max(0.0) as usize).min(self.visible - 1)
    }

    /// Cursor position as a fraction of the plot width, for zoom pivots.
    pub fn cursor_ratio(&self, x: f64) -> f64 {
        ((x - self.plot.x) / self.plot.w).clamp(0.0, 1.0)
    }

    /// Y-axis tick values from the padded bounds at a nice step.
    pub fn price_ticks(&self) -> Vec<f64> {
        let step = nice_step(self.price_hi - self.price_lo, Y_TICK_DIVISIONS);
        let mut ticks = Vec::new();
        let mut tick = (self.price_lo / step).ceil() * step;
        while tick <= self.price_hi {
            ticks.push(tick);
            tick += step;
        }
        ticks
    }

    /// X-axis label stride: one label per `label_budget_px` of plot width.
    pub fn x_label_stride(&self, label_budget_px: f64) -> usize {
        let budget = if label_budget_px > 0.0 { label_budget_px } else { X_LABEL_BUDGET_PX };
        let max_labels = (self.plot.w / budget).floor().max(1.0);
        ((self.visible as f64 / max_labels).ceil() as usize).max(1)
    }
}

/// Round `range / divisions` up to the nearest power-of-ten multiple.
pub fn nice_step(range: f64, divisions: f64) -> f64 {
    if !(range > 0.0) || !range.is_finite() || divisions <= 0.0 {
        return 1.0;
    }
    let raw = range / divisions;
    let magnitude = 10f64.powf(raw.log10().floor());
    (raw / magnitude).ceil() * magnitude
}

/// X-axis labels for the visible slice: `(slice index, text)` pairs.
///
/// Labels show the bar's month; the year is appended only when it
/// differs from the previously emitted label.
pub fn x_labels(bars: &[Bar], stride: usize) -> Vec<(usize, String)> {
    let stride = stride.max(1);
    let mut labels = Vec::new();
    let mut prev_year: Option<i32> = None;
    for (i, bar) in bars.iter().enumerate().step_by(stride) {
        let year = bar.date.year();
        let text = if prev_year.is_some() && prev_year != Some(year) {
            bar.date.format("%b %Y").to_string()
        } else {
            bar.date.format("%b").to_string()
        };
        prev_year = Some(year);
        labels.push((i, text));
    }
    labels
}

/// Keep a `w`-by-`h` box anchored near `(x, y)` inside `bounds`,
/// flipping left of the anchor or above it when it would overflow.
pub fn place_box(x: f64, y: f64, w: f64, h: f64, bounds: RectF, gap: f64) -> (f64, f64) {
    let mut bx = x + gap;
    if bx + w > bounds.right() {
        bx = x - gap - w;
    }
    let mut by = y + gap;
    if by + h > bounds.bottom() {
        by = y - gap - h;
    }
    (bx.max(bounds.x), by.max(bounds.y))
}

//! Viewport state: which slice of the full series is on screen.
//!
//! The resolved window is always valid for the series it was resolved
//! against: `start + count <= len`, and `count >= MIN_VISIBLE_BARS`
//! whenever the series has that many bars. Every mutation clamps
//! silently rather than reporting an error.

use serde::{Deserialize, Serialize};

use super::preset::RangePreset;

/// Hard floor on the zoom level.
pub const MIN_VISIBLE_BARS: usize = 10;

/// Wheel step applied per scroll notch away from the chart.
pub const ZOOM_OUT_FACTOR: f64 = 1.15;

/// Wheel step applied per scroll notch into the chart.
pub const ZOOM_IN_FACTOR: f64 = 0.87;

/// A resolved window over the bar series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub start: usize,
    pub count: usize,
}

impl Viewport {
    /// Clamp a candidate window into validity for a series of `len` bars.
    ///
    /// Count is clamped to `[min(MIN_VISIBLE_BARS, len), len]`, then start
    /// to `[0, len - count]`. A zero-length series resolves to an empty
    /// window.
    pub fn clamped(start: i64, count: i64, len: usize) -> Viewport {
        if len == 0 {
            return Viewport { start: 0, count: 0 };
        }
        let min_count = MIN_VISIBLE_BARS.min(len) as i64;
        let count = count.clamp(min_count, len as i64);
        let max_start = len as i64 - count;
        let start = start.clamp(0, max_start);
        Viewport {
            start: start as usize,
            count: count as usize,
        }
    }

    /// One past the last visible index.
    pub fn end(&self) -> usize {
        self.start + self.count
    }

    pub fn contains(&self, index: usize) -> bool {
        index >= self.start && index < self.end()
    }
}

/// Zoom and pan controller layered over a preset.
///
/// While `manual` is unset the window tracks the active preset anchored
/// to the latest bar. Any wheel or drag interaction switches to a manual
/// window; selecting a preset (or reset) drops back to preset-following.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    preset: RangePreset,
    manual: Option<Viewport>,
}

impl ViewState {
    pub fn new(preset: RangePreset) -> ViewState {
        ViewState { preset, manual: None }
    }

    pub fn preset(&self) -> RangePreset {
        self.preset
    }

    pub fn is_manual(&self) -> bool {
        self.manual.is_some()
    }

    /// Switch presets, discarding any manual window.
    pub fn select_preset(&mut self, preset: RangePreset) {
        self.preset = preset;
        self.manual = None;
    }

    /// Drop the manual window, returning to the active preset.
    pub fn reset(&mut self) {
        self.manual = None;
    }

    /// The window to draw for a series of `len` bars.
    ///
    /// Preset windows anchor to the most recent bar. A manual window is
    /// re-clamped on every resolve so a reloaded (shorter or longer)
    /// series never yields an out-of-range slice.
    pub fn resolve(&self, len: usize) -> Viewport {
        if len == 0 {
            return Viewport { start: 0, count: 0 };
        }
        match self.manual {
            Some(vp) => Viewport::clamped(vp.start as i64, vp.count as i64, len),
            None => {
                let count = match self.preset.bar_count() {
                    Some(n) => n.min(len),
                    None => len,
                };
                Viewport {
                    start: len - count,
                    count,
                }
            }
        }
    }

    /// Zoom by one wheel notch, keeping the bar under the cursor fixed.
    ///
    /// `cursor_ratio` is the pointer's horizontal position as a fraction
    /// of the plot width, 0.0 at the left edge and 1.0 at the right.
    pub fn zoom(&mut self, len: usize, cursor_ratio: f64, zoom_in: bool) {
        let factor = if zoom_in { ZOOM_IN_FACTOR } else { ZOOM_OUT_FACTOR };
        self.zoom_by(len, cursor_ratio, factor);
    }

    /// Rescale the window around the anchor bar at `cursor_ratio`.
    ///
    /// The anchor bar `start + round(count * r)` keeps its on-screen
    /// position exactly when no clamp fires, and as closely as the edges
    /// allow otherwise.
    pub fn zoom_by(&mut self, len: usize, cursor_ratio: f64, factor: f64) {
        if len == 0 || factor <= 0.0 || !factor.is_finite() {
            return;
        }
        let cur = self.resolve(len);
        let r = if cursor_ratio.is_finite() {
            cursor_ratio.clamp(0.0, 1.0)
        } else {
            0.5
        };
        let anchor = cur.start as i64 + (cur.count as f64 * r).round() as i64;
        let min_count = MIN_VISIBLE_BARS.min(len) as i64;
        let new_count =
            ((cur.count as f64 * factor).round() as i64).clamp(min_count, len as i64);
        let new_start = anchor - (new_count as f64 * r).round() as i64;
        self.manual = Some(Viewport::clamped(new_start, new_count, len));
    }

    /// Shift the window by whole bars. Positive moves toward newer bars.
    pub fn pan_bars(&mut self, len: usize, delta: i64) {
        if len == 0 {
            return;
        }
        let cur = self.resolve(len);
        self.manual = Some(Viewport::clamped(
            cur.start as i64 + delta,
            cur.count as i64,
            len,
        ));
    }

    /// Place the window explicitly, clamped. Drag panning resolves its
    /// pixel delta against the drag-origin window and lands here.
    pub fn set_manual(&mut self, start: i64, count: i64, len: usize) {
        if len == 0 {
            return;
        }
        self.manual = Some(Viewport::clamped(start, count, len));
    }
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState::new(RangePreset::default())
    }
}

/// In-flight drag pan. Captured on pointer-down, consulted on every
/// pointer-move so accumulated rounding never drifts the window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragOrigin {
    pub viewport: Viewport,
    pub pointer_x: f64,
}

impl DragOrigin {
    pub fn begin(viewport: Viewport, pointer_x: f64) -> DragOrigin {
        DragOrigin { viewport, pointer_x }
    }

    /// Apply the drag to `view` given the current pointer x and the pixel
    /// width of one bar. Dragging right pulls older bars into view, so
    /// start moves by the negated bar delta. Count never changes.
    pub fn pan_to(&self, view: &mut ViewState, len: usize, pointer_x: f64, bar_width: f64) {
        if bar_width <= 0.0 || !bar_width.is_finite() {
            return;
        }
        let delta_bars = ((pointer_x - self.pointer_x) / bar_width).round() as i64;
        view.set_manual(
            self.viewport.start as i64 - delta_bars,
            self.viewport.count as i64,
            len,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_valid(vp: Viewport, len: usize) {
        assert!(vp.end() <= len, "window {:?} exceeds len {}", vp, len);
        if len >= MIN_VISIBLE_BARS {
            assert!(vp.count >= MIN_VISIBLE_BARS, "window {:?} under floor", vp);
        } else {
            assert_eq!(vp.count, len);
        }
    }

    #[test]
    fn presets_anchor_to_latest_bar() {
        let view = ViewState::new(RangePreset::M1);
        assert_eq!(view.resolve(1260), Viewport { start: 1239, count: 21 });

        let view = ViewState::new(RangePreset::Y1);
        assert_eq!(view.resolve(1260), Viewport { start: 1008, count: 252 });

        let view = ViewState::new(RangePreset::All);
        assert_eq!(view.resolve(1260), Viewport { start: 0, count: 1260 });
    }

    #[test]
    fn preset_longer_than_series_shows_everything() {
        let view = ViewState::new(RangePreset::Y5);
        assert_eq!(view.resolve(300), Viewport { start: 0, count: 300 });
    }

    #[test]
    fn empty_series_resolves_empty() {
        let mut view = ViewState::default();
        assert_eq!(view.resolve(0), Viewport { start: 0, count: 0 });
        view.zoom(0, 0.5, true);
        view.pan_bars(0, -5);
        assert!(!view.is_manual());
    }

    #[test]
    fn tiny_series_shows_all_bars() {
        let view = ViewState::new(RangePreset::Y1);
        assert_eq!(view.resolve(7), Viewport { start: 0, count: 7 });
    }

    #[test]
    fn selecting_preset_discards_manual_window() {
        let mut view = ViewState::new(RangePreset::Y1);
        view.zoom(1000, 0.5, true);
        assert!(view.is_manual());
        view.select_preset(RangePreset::M3);
        assert!(!view.is_manual());
        assert_eq!(view.resolve(1000), Viewport { start: 937, count: 63 });
    }

    #[test]
    fn reset_returns_to_preset() {
        let mut view = ViewState::new(RangePreset::M6);
        view.pan_bars(1000, -200);
        assert!(view.is_manual());
        view.reset();
        assert_eq!(view.resolve(1000), Viewport { start: 874, count: 126 });
    }

    #[test]
    fn wheel_factors_resize_the_window() {
        let len = 1000;
        let mut view = ViewState::new(RangePreset::Y1);
        view.set_manual(400, 100, len);

        view.zoom(len, 0.0, false);
        assert_eq!(view.resolve(len).count, 115);

        view.set_manual(400, 100, len);
        view.zoom(len, 0.0, true);
        assert_eq!(view.resolve(len).count, 87);
    }

    #[test]
    fn zoom_pivots_on_the_anchor_bar() {
        let len = 1000;
        let mut view = ViewState::new(RangePreset::Y1);
        view.set_manual(400, 100, len);
        let r = 0.25;

        let before = view.resolve(len);
        let anchor = before.start + (before.count as f64 * r).round() as usize;
        assert_eq!(anchor, 425);

        view.zoom(len, r, false);
        let after = view.resolve(len);
        assert_eq!(after.count, 115);
        assert_eq!(after.start + (after.count as f64 * r).round() as usize, anchor);
        assert_valid(after, len);
    }

    #[test]
    fn zoom_at_left_edge_keeps_start() {
        let len = 1000;
        let mut view = ViewState::default();
        view.set_manual(400, 100, len);
        view.zoom(len, 0.0, true);
        let vp = view.resolve(len);
        assert_eq!(vp.start, 400);
        assert_eq!(vp.count, 87);
    }

    #[test]
    fn zoom_at_right_edge_keeps_end() {
        let len = 1000;
        let mut view = ViewState::default();
        view.set_manual(400, 100, len);
        view.zoom(len, 1.0, true);
        let vp = view.resolve(len);
        assert_eq!(vp.end(), 500);
        assert_eq!(vp.count, 87);
    }

    #[test]
    fn zoom_in_stops_at_the_bar_floor() {
        let len = 500;
        let mut view = ViewState::default();
        view.set_manual(100, MIN_VISIBLE_BARS as i64, len);
        view.zoom(len, 0.5, true);
        let vp = view.resolve(len);
        assert_eq!(vp.count, MIN_VISIBLE_BARS);
        assert_valid(vp, len);
    }

    #[test]
    fn zoom_out_stops_at_full_series() {
        let len = 120;
        let mut view = ViewState::default();
        view.set_manual(0, 110, len);
        view.zoom(len, 0.5, false);
        view.zoom(len, 0.5, false);
        let vp = view.resolve(len);
        assert_eq!(vp, Viewport { start: 0, count: len });
    }

    #[test]
    fn pan_clamps_at_both_ends() {
        let len = 300;
        let mut view = ViewState::default();
        view.set_manual(100, 50, len);

        view.pan_bars(len, -500);
        assert_eq!(view.resolve(len), Viewport { start: 0, count: 50 });

        view.pan_bars(len, 5000);
        assert_eq!(view.resolve(len), Viewport { start: 250, count: 50 });
    }

    #[test]
    fn drag_one_plot_width_pans_one_window() {
        let len = 1000;
        let mut view = ViewState::default();
        view.set_manual(500, 100, len);
        let origin = DragOrigin::begin(view.resolve(len), 0.0);

        // 100 visible bars at 8 px each; dragging right a full plot width
        // pulls one whole window of older bars into view.
        origin.pan_to(&mut view, len, 800.0, 8.0);
        assert_eq!(view.resolve(len), Viewport { start: 400, count: 100 });

        // Moves resolve against the origin, not the latest state, so a
        // return to the starting pixel restores the starting window.
        origin.pan_to(&mut view, len, 0.0, 8.0);
        assert_eq!(view.resolve(len), Viewport { start: 500, count: 100 });
    }

    #[test]
    fn drag_left_clamps_at_latest_bar() {
        let len = 300;
        let mut view = ViewState::default();
        view.set_manual(240, 50, len);
        let origin = DragOrigin::begin(view.resolve(len), 400.0);
        origin.pan_to(&mut view, len, 0.0, 4.0);
        assert_eq!(view.resolve(len), Viewport { start: 250, count: 50 });
    }

    #[test]
    fn manual_window_reclamped_after_series_shrinks() {
        let mut view = ViewState::default();
        view.set_manual(900, 100, 1000);
        let vp = view.resolve(400);
        assert_valid(vp, 400);
        assert_eq!(vp, Viewport { start: 300, count: 100 });
    }

    #[test]
    fn clamp_handles_negative_and_oversized_input() {
        assert_eq!(
            Viewport::clamped(-50, 5, 100),
            Viewport { start: 0, count: MIN_VISIBLE_BARS }
        );
        assert_eq!(
            Viewport::clamped(90, 10_000, 100),
            Viewport { start: 0, count: 100 }
        );
        assert_eq!(Viewport::clamped(3, 4, 6), Viewport { start: 0, count: 6 });
        assert_eq!(Viewport::clamped(5, 20, 0), Viewport { start: 0, count: 0 });
    }
}

//! Candlestick frame assembly.
//!
//! [`draw_chart`] is a pure pass over `(series, indicators, events,
//! viewport, geometry)`: it slices the visible window, computes the
//! layout, and emits drawing calls in back-to-front order. Nothing is
//! cached between frames.

use serde::{Deserialize, Serialize};

use crate::domain::Bar;
use crate::indicators::{FAST_SMA_PERIOD, SLOW_SMA_PERIOD};
use crate::scan::BreakoutEvent;
use crate::view::{place_box, x_labels, ChartLayout, LayoutConfig, RectF, Viewport};

use super::{Surface, Tone};

/// Which optional layers the frame includes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayToggles {
    pub sma_fast: bool,
    pub sma_slow: bool,
    pub volume: bool,
    pub events: bool,
}

impl Default for OverlayToggles {
    fn default() -> Self {
        OverlayToggles { sma_fast: true, sma_slow: true, volume: true, events: true }
    }
}

/// Everything one frame needs. Bars, SMA slices, and events all use
/// full-series indexing; the viewport picks the visible window.
#[derive(Debug, Clone, Copy)]
pub struct ChartContent<'a> {
    pub bars: &'a [Bar],
    pub sma_fast: &'a [f64],
    pub sma_slow: &'a [f64],
    pub events: &'a [BreakoutEvent],
    pub viewport: Viewport,
    pub overlays: OverlayToggles,
    /// Pointer position in surface coordinates, if hovering.
    pub cursor: Option<(f64, f64)>,
}

/// Draw one frame. Returns the resolved layout so callers can hit-test
/// the same geometry the frame was drawn with, or None when there was
/// nothing to draw.
pub fn draw_chart(
    surface: &mut dyn Surface,
    cfg: &LayoutConfig,
    content: &ChartContent,
) -> Option<ChartLayout> {
    surface.clear(Tone::Background);

    let vp = content.viewport;
    let slice = match content.bars.get(vp.start..vp.end()) {
        Some(slice) if !slice.is_empty() => slice,
        _ => {
            let x = cfg.width / 2.0 - 3.5 * cfg.char_width;
            surface.text(x, cfg.height / 2.0, "no data", Tone::Muted);
            return None;
        }
    };
    let layout = ChartLayout::compute(cfg, slice)?;

    draw_grid(surface, cfg, &layout, slice);
    if content.overlays.volume {
        draw_volume(surface, &layout, slice);
    }
    draw_candles(surface, &layout, slice);
    if content.overlays.sma_fast {
        draw_sma(surface, &layout, content.sma_fast, vp, Tone::FastLine);
    }
    if content.overlays.sma_slow {
        draw_sma(surface, &layout, content.sma_slow, vp, Tone::SlowLine);
    }
    if content.overlays.events {
        draw_events(surface, cfg, &layout, content.events, vp, slice);
    }
    draw_earnings(surface, &layout, slice);
    if let Some((cx, cy)) = content.cursor {
        draw_crosshair(surface, cfg, &layout, content, slice, cx, cy);
    }
    Some(layout)
}

fn draw_grid(surface: &mut dyn Surface, cfg: &LayoutConfig, layout: &ChartLayout, slice: &[Bar]) {
    for tick in layout.price_ticks() {
        let y = layout.price_to_y(tick);
        surface.line(layout.plot.x, y, layout.plot.right(), y, Tone::Grid);
        let label = format!("{:.2}", tick);
        let x = layout.plot.x - (label.chars().count() as f64 + 1.0) * cfg.char_width;
        surface.text(x, y, &label, Tone::Muted);
    }

    let stride = layout.x_label_stride(cfg.label_budget_px);
    for (i, label) in x_labels(slice, stride) {
        let x = layout.x_for_bar(i);
        surface.line(x, layout.plot.y, x, layout.volume.bottom(), Tone::Grid);
        let text_x = x - label.chars().count() as f64 * cfg.char_width / 2.0;
        surface.text(text_x, layout.volume.bottom(), &label, Tone::Muted);
    }
}

fn draw_volume(surface: &mut dyn Surface, layout: &ChartLayout, slice: &[Bar]) {
    let half_w = (layout.bar_width() * 0.35).max(0.5);
    for (i, bar) in slice.iter().enumerate() {
        let y = layout.volume_to_y(bar.volume);
        let h = layout.volume.bottom() - y;
        if h <= 0.0 {
            continue;
        }
        let x = layout.x_for_bar(i);
        surface.fill_rect(x - half_w, y, half_w * 2.0, h, Tone::Volume);
    }
}

fn draw_candles(surface: &mut dyn Surface, layout: &ChartLayout, slice: &[Bar]) {
    let half_w = (layout.bar_width() * 0.35).max(0.5);
    for (i, bar) in slice.iter().enumerate() {
        let tone = if bar.is_bullish() { Tone::Bull } else { Tone::Bear };
        let x = layout.x_for_bar(i);
        surface.line(x, layout.price_to_y(bar.high), x, layout.price_to_y(bar.low), tone);

        let top = layout.price_to_y(bar.body_top());
        let bottom = layout.price_to_y(bar.body_bottom());
        // A doji body still needs a visible sliver.
        let h = (bottom - top).max(1.0);
        surface.fill_rect(x - half_w, top, half_w * 2.0, h, tone);
    }
}

fn draw_sma(
    surface: &mut dyn Surface,
    layout: &ChartLayout,
    values: &[f64],
    vp: Viewport,
    tone: Tone,
) {
    let end = vp.end().min(values.len());
    let mut run: Vec<(f64, f64)> = Vec::new();
    for i in vp.start..end {
        if values[i].is_finite() {
            run.push((layout.x_for_bar(i - vp.start), layout.price_to_y(values[i])));
        } else {
            flush_run(surface, &mut run, tone);
        }
    }
    flush_run(surface, &mut run, tone);
}

fn flush_run(surface: &mut dyn Surface, run: &mut Vec<(f64, f64)>, tone: Tone) {
    if run.len() > 1 {
        surface.polyline(run, tone);
    }
    run.clear();
}

fn draw_events(
    surface: &mut dyn Surface,
    cfg: &LayoutConfig,
    layout: &ChartLayout,
    events: &[BreakoutEvent],
    vp: Viewport,
    slice: &[Bar],
) {
    use crate::scan::BreakoutDirection;

    for event in events {
        if !vp.contains(event.index) {
            continue;
        }
        let i = event.index - vp.start;
        let x = layout.x_for_bar(i);
        match event.direction {
            BreakoutDirection::Bull => {
                let y = layout.price_to_y(slice[i].low) + cfg.line_height;
                surface.glyph(x, y, '▲', Tone::Bull);
            }
            BreakoutDirection::Bear => {
                let y = layout.price_to_y(slice[i].high) - cfg.line_height;
                surface.glyph(x, y, '▼', Tone::Bear);
            }
        }
    }
}

fn draw_earnings(surface: &mut dyn Surface, layout: &ChartLayout, slice: &[Bar]) {
    for (i, bar) in slice.iter().enumerate() {
        if bar.is_earnings {
            surface.glyph(layout.x_for_bar(i), layout.plot.y, '◆', Tone::Earnings);
        }
    }
}

fn draw_crosshair(
    surface: &mut dyn Surface,
    cfg: &LayoutConfig,
    layout: &ChartLayout,
    content: &ChartContent,
    slice: &[Bar],
    cx: f64,
    cy: f64,
) {
    if !layout.plot.contains(cx, cy) && !layout.volume.contains(cx, cy) {
        return;
    }
    let i = layout.bar_at_x(cx);
    let x = layout.x_for_bar(i);
    surface.line(x, layout.plot.y, x, layout.volume.bottom(), Tone::Crosshair);
    let hy = cy.clamp(layout.plot.y, layout.plot.bottom());
    surface.line(layout.plot.x, hy, layout.plot.right(), hy, Tone::Crosshair);

    let lines = tooltip_lines(content, slice, i);
    draw_tooltip(surface, cfg, cx, cy, &lines);
}

fn tooltip_lines(content: &ChartContent, slice: &[Bar], i: usize) -> Vec<String> {
    let bar = &slice[i];
    let global = content.viewport.start + i;

    let mut lines = vec![
        bar.date.format("%Y-%m-%d").to_string(),
        format!("O {:.2}  H {:.2}", bar.open, bar.high),
        format!("L {:.2}  C {:.2}", bar.low, bar.close),
        format!("Vol {}", format_volume(bar.volume)),
    ];
    if let Some(v) = content.sma_fast.get(global).copied().filter(|v| v.is_finite()) {
        lines.push(format!("SMA{} {:.2}", FAST_SMA_PERIOD, v));
    }
    if let Some(v) = content.sma_slow.get(global).copied().filter(|v| v.is_finite()) {
        lines.push(format!("SMA{} {:.2}", SLOW_SMA_PERIOD, v));
    }
    if let Some(event) = content.events.iter().find(|e| e.index == global) {
        let text = match &event.label {
            Some(label) => label.clone(),
            None => event.direction.label().to_string(),
        };
        lines.push(text);
    }
    if bar.is_earnings {
        lines.push("earnings".to_string());
    }
    lines
}

fn draw_tooltip(
    surface: &mut dyn Surface,
    cfg: &LayoutConfig,
    cx: f64,
    cy: f64,
    lines: &[String],
) {
    let max_chars = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let w = (max_chars as f64 + 2.0) * cfg.char_width;
    let h = (lines.len() as f64 + 2.0) * cfg.line_height;
    let bounds = RectF::new(0.0, 0.0, cfg.width, cfg.height);
    let (bx, by) = place_box(cx, cy, w, h, bounds, 2.0 * cfg.char_width);

    surface.fill_rect(bx, by, w, h, Tone::TooltipBg);
    for (n, line) in lines.iter().enumerate() {
        let y = by + (n as f64 + 1.0) * cfg.line_height;
        surface.text(bx + cfg.char_width, y, line, Tone::Text);
    }
}

/// Compact volume readout: 12_300_000 becomes "12.3M".
pub fn format_volume(volume: u64) -> String {
    let v = volume as f64;
    if v >= 1e9 {
        format!("{:.1}B", v / 1e9)
    } else if v >= 1e6 {
        format!("{:.1}M", v / 1e6)
    } else if v >= 1e3 {
        format!("{:.1}K", v / 1e3)
    } else {
        volume.to_string()
    }
}

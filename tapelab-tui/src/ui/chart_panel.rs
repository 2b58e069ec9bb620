//! Chart panel: candlesticks, SMA overlays, volume, events and crosshair.
//!
//! The heavy lifting happens in `tapelab_core::render::draw_chart`, which
//! targets the backend-neutral `Surface` trait. `BufferSurface` is the
//! terminal backend: it maps continuous chart coordinates onto ratatui
//! buffer cells, one unit per cell. The geometry the frame was drawn with is
//! stored back on `ChartState` so mouse handling can hit-test against it.

use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Position, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};
use ratatui::Frame;

use tapelab_core::render::{draw_chart, format_volume, ChartContent, Surface, Tone};
use tapelab_core::view::LayoutConfig;

use crate::app::{AppState, Panel};
use crate::theme::Theme;

/// Layout parameters for a chart drawn on a cell grid.
pub(crate) fn cell_config(width: u16, height: u16) -> LayoutConfig {
    LayoutConfig {
        width: f64::from(width),
        height: f64::from(height),
        left_pad: 9.0,
        right_pad: 1.0,
        top_pad: 1.0,
        bottom_pad: 1.0,
        label_budget_px: 9.0,
        char_width: 1.0,
        line_height: 1.0,
    }
}

/// Renderer backend that writes into a ratatui buffer region.
///
/// Continuous coordinates map to cells by center sampling: a cell is covered
/// when its center lies inside the drawn shape, which keeps wicks, bodies and
/// markers for the same bar in the same column. Everything outside the region
/// is clipped.
pub struct BufferSurface<'a> {
    buf: &'a mut Buffer,
    origin: (u16, u16),
    size: (u16, u16),
    theme: &'a Theme,
}

impl<'a> BufferSurface<'a> {
    pub fn new(buf: &'a mut Buffer, area: Rect, theme: &'a Theme) -> BufferSurface<'a> {
        BufferSurface {
            buf,
            origin: (area.x, area.y),
            size: (area.width, area.height),
            theme,
        }
    }

    fn cell_mut(&mut self, col: i64, row: i64) -> Option<&mut ratatui::buffer::Cell> {
        if col < 0 || row < 0 || col >= i64::from(self.size.0) || row >= i64::from(self.size.1) {
            return None;
        }
        let pos = Position::new(self.origin.0 + col as u16, self.origin.1 + row as u16);
        self.buf.cell_mut(pos)
    }

    fn put(&mut self, col: i64, row: i64, glyph: char, tone: Tone) {
        let color = self.theme.tone(tone);
        if let Some(cell) = self.cell_mut(col, row) {
            cell.set_char(glyph);
            cell.set_fg(color);
        }
    }

    /// Cells whose centers fall in the half-open span `[lo, lo + extent)`.
    fn covered(lo: f64, extent: f64) -> (i64, i64) {
        let first = (lo - 0.5).ceil() as i64;
        let last = ((lo + extent - 0.5) - 1e-9).floor() as i64;
        if last < first {
            // Thin shapes still occupy the cell under their midpoint.
            let mid = (lo + extent / 2.0).floor() as i64;
            (mid, mid)
        } else {
            (first, last)
        }
    }
}

impl Surface for BufferSurface<'_> {
    fn clear(&mut self, tone: Tone) {
        let color = self.theme.tone(tone);
        for row in 0..i64::from(self.size.1) {
            for col in 0..i64::from(self.size.0) {
                if let Some(cell) = self.cell_mut(col, row) {
                    cell.set_char(' ');
                    cell.set_bg(color);
                }
            }
        }
    }

    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, tone: Tone) {
        if x1 == x2 {
            let col = x1.floor() as i64;
            let (lo, hi) = (y1.min(y2), y1.max(y2));
            let (first, last) = Self::covered(lo, hi - lo);
            for row in first..=last {
                self.put(col, row, '│', tone);
            }
        } else if y1 == y2 {
            let row = y1.floor() as i64;
            let (lo, hi) = (x1.min(x2), x1.max(x2));
            let (first, last) = Self::covered(lo, hi - lo);
            for col in first..=last {
                self.put(col, row, '─', tone);
            }
        } else {
            // Diagonal segments step along the major axis, one dot per cell.
            let steps = (x2 - x1).abs().max((y2 - y1).abs()).ceil().max(1.0) as i64;
            for t in 0..=steps {
                let f = t as f64 / steps as f64;
                let x = x1 + (x2 - x1) * f;
                let y = y1 + (y2 - y1) * f;
                self.put(x.floor() as i64, y.floor() as i64, '·', tone);
            }
        }
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, tone: Tone) {
        if w <= 0.0 || h <= 0.0 {
            return;
        }
        let color = self.theme.tone(tone);
        let (c0, c1) = Self::covered(x, w);
        let (r0, r1) = Self::covered(y, h);
        for row in r0..=r1 {
            for col in c0..=c1 {
                if let Some(cell) = self.cell_mut(col, row) {
                    cell.set_char(' ');
                    cell.set_bg(color);
                }
            }
        }
    }

    fn text(&mut self, x: f64, y: f64, text: &str, tone: Tone) {
        let row = y.floor() as i64;
        let start = x.floor() as i64;
        for (i, glyph) in text.chars().enumerate() {
            self.put(start + i as i64, row, glyph, tone);
        }
    }

    fn glyph(&mut self, x: f64, y: f64, glyph: char, tone: Tone) {
        self.put(x.floor() as i64, y.floor() as i64, glyph, tone);
    }
}

/// Draw the chart panel and record the frame's geometry on the app state.
pub fn render(f: &mut Frame, area: Rect, app: &mut AppState) {
    let theme = app.theme();
    let active = app.active_panel == Panel::Chart;
    let title = chart_title(app);
    let block = Block::bordered()
        .border_style(theme.panel_border(active))
        .title(Span::styled(title, theme.title(active)));
    let inner = block.inner(area);
    f.render_widget(block, area);

    if inner.height < 4 || inner.width < 20 {
        app.chart.area = None;
        app.chart.layout = None;
        return;
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(3)])
        .split(inner);
    render_quote_strip(f, rows[0], app, &theme);

    let chart_area = rows[1];
    app.chart.area = Some(chart_area);

    let Some(history) = &app.chart.history else {
        let message = if app.chart.loading {
            format!("loading {}...", app.chart.symbol)
        } else {
            "no symbol loaded · press / to search".to_string()
        };
        let placeholder = Paragraph::new(Line::from(Span::styled(message, theme.muted_style())))
            .centered();
        f.render_widget(placeholder, chart_area);
        app.chart.layout = None;
        return;
    };

    let len = history.bars.len();
    let viewport = app.chart.view.resolve(len);
    let cursor = app.chart.cursor.and_then(|(col, row)| {
        if chart_area.contains(Position::new(col, row)) {
            Some((
                f64::from(col - chart_area.x) + 0.5,
                f64::from(row - chart_area.y) + 0.5,
            ))
        } else {
            None
        }
    });
    let content = ChartContent {
        bars: &history.bars,
        sma_fast: &app.chart.sma_fast,
        sma_slow: &app.chart.sma_slow,
        events: &app.chart.events,
        viewport,
        overlays: app.chart.overlays,
        cursor,
    };
    let cfg = cell_config(chart_area.width, chart_area.height);
    let mut surface = BufferSurface::new(f.buffer_mut(), chart_area, &theme);
    app.chart.layout = draw_chart(&mut surface, &cfg, &content);
}

fn chart_title(app: &AppState) -> String {
    let origin = app
        .chart
        .history
        .as_ref()
        .map(|h| h.origin.label())
        .unwrap_or("--");
    let window = if app.chart.view.is_manual() {
        "custom".to_string()
    } else {
        app.chart.view.preset().label().to_string()
    };
    format!(
        " {} · {} · {} · {} · {}y [1] ",
        app.chart.symbol, app.chart.company, origin, window, app.chart.years
    )
}

/// One-line header: last price, day change and session figures.
fn render_quote_strip(f: &mut Frame, area: Rect, app: &AppState, theme: &Theme) {
    let mut spans: Vec<Span> = Vec::new();
    match &app.chart.quote {
        Some(q) => {
            let sign = if q.change >= 0.0 { "+" } else { "" };
            spans.push(Span::styled(
                format!("{:.2} ", q.price),
                theme.text_style(),
            ));
            spans.push(Span::styled(
                format!("{sign}{:.2} ({sign}{:.2}%) ", q.change, q.change_pct),
                theme.signed(q.change),
            ));
            spans.push(Span::styled(
                format!(
                    " O {:.2}  H {:.2}  L {:.2}  Vol {}  {}",
                    q.open,
                    q.high,
                    q.low,
                    format_volume(q.volume),
                    q.as_of.format("%Y-%m-%d")
                ),
                theme.muted_style(),
            ));
        }
        None => spans.push(Span::styled("no quote", theme.muted_style())),
    }
    if app.chart.loading {
        spans.push(Span::styled("  ⟳", Style::default().fg(theme.accent)));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

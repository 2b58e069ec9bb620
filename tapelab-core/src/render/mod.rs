//! Backend-neutral drawing interface.
//!
//! The chart assembles frames against [`Surface`], a small immediate-mode
//! drawing trait, so the same render pass targets a terminal cell grid, a
//! pixel canvas, or the recording backend the tests inspect. Colors are
//! semantic [`Tone`]s; each backend maps them to whatever palette it has.

pub mod chart;

pub use chart::{draw_chart, format_volume, ChartContent, OverlayToggles};

/// Semantic color roles. Backends translate these to concrete colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tone {
    Background,
    Grid,
    Text,
    Muted,
    Bull,
    Bear,
    FastLine,
    SlowLine,
    Volume,
    Crosshair,
    TooltipBg,
    Earnings,
}

/// Immediate-mode drawing surface in f64 coordinates.
///
/// Backends clip to their own bounds; callers may emit coordinates a
/// little outside the canvas and rely on the backend to discard them.
pub trait Surface {
    fn clear(&mut self, tone: Tone);
    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, tone: Tone);
    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, tone: Tone);
    fn text(&mut self, x: f64, y: f64, text: &str, tone: Tone);
    fn glyph(&mut self, x: f64, y: f64, glyph: char, tone: Tone);

    /// Stroke consecutive points as connected segments.
    fn polyline(&mut self, points: &[(f64, f64)], tone: Tone) {
        for pair in points.windows(2) {
            let (x1, y1) = pair[0];
            let (x2, y2) = pair[1];
            self.line(x1, y1, x2, y2, tone);
        }
    }
}

/// One recorded drawing call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Clear(Tone),
    Line { x1: f64, y1: f64, x2: f64, y2: f64, tone: Tone },
    Rect { x: f64, y: f64, w: f64, h: f64, tone: Tone },
    Text { x: f64, y: f64, text: String, tone: Tone },
    Glyph { x: f64, y: f64, glyph: char, tone: Tone },
}

/// Surface backend that records every call for inspection.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub ops: Vec<DrawOp>,
}

impl RecordingSurface {
    pub fn new() -> RecordingSurface {
        RecordingSurface::default()
    }

    pub fn lines_with(&self, tone: Tone) -> Vec<&DrawOp> {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Line { tone: t, .. } if *t == tone))
            .collect()
    }

    pub fn rects_with(&self, tone: Tone) -> Vec<&DrawOp> {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Rect { tone: t, .. } if *t == tone))
            .collect()
    }

    pub fn glyphs_with(&self, tone: Tone) -> Vec<(f64, f64, char)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Glyph { x, y, glyph, tone: t } if *t == tone => Some((*x, *y, *glyph)),
                _ => None,
            })
            .collect()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        self.texts().iter().any(|t| t.contains(needle))
    }
}

impl Surface for RecordingSurface {
    fn clear(&mut self, tone: Tone) {
        self.ops.push(DrawOp::Clear(tone));
    }

    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, tone: Tone) {
        self.ops.push(DrawOp::Line { x1, y1, x2, y2, tone });
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, tone: Tone) {
        self.ops.push(DrawOp::Rect { x, y, w, h, tone });
    }

    fn text(&mut self, x: f64, y: f64, text: &str, tone: Tone) {
        self.ops.push(DrawOp::Text { x, y, text: text.to_string(), tone });
    }

    fn glyph(&mut self, x: f64, y: f64, glyph: char, tone: Tone) {
        self.ops.push(DrawOp::Glyph { x, y, glyph, tone });
    }
}

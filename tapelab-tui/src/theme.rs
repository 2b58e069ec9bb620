//! Color palette for the terminal UI.
//!
//! Two palettes ship with the binary. `Theme::tone` is the single
//! mapping from the renderer's semantic [`Tone`]s to terminal colors,
//! so the chart surface never hard-codes a color of its own.

use ratatui::style::{Color, Modifier, Style};
use serde::{Deserialize, Serialize};
use tapelab_core::render::Tone;

/// Which palette the user selected. Persisted across sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ThemeKind {
    #[default]
    Dark,
    Light,
}

impl ThemeKind {
    pub fn toggled(self) -> Self {
        match self {
            ThemeKind::Dark => ThemeKind::Light,
            ThemeKind::Light => ThemeKind::Dark,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ThemeKind::Dark => "dark",
            ThemeKind::Light => "light",
        }
    }
}

/// Resolved palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub background: Color,
    pub text: Color,
    pub muted: Color,
    pub grid: Color,
    pub accent: Color,
    pub bull: Color,
    pub bear: Color,
    pub fast_line: Color,
    pub slow_line: Color,
    pub volume: Color,
    pub crosshair: Color,
    pub tooltip_bg: Color,
    pub earnings: Color,
    pub warning: Color,
    pub error: Color,
}

impl Theme {
    pub fn of(kind: ThemeKind) -> Self {
        match kind {
            ThemeKind::Dark => Self::dark(),
            ThemeKind::Light => Self::light(),
        }
    }

    pub fn dark() -> Self {
        Self {
            background: Color::Rgb(16, 18, 24),
            text: Color::Rgb(220, 223, 228),
            muted: Color::Rgb(120, 126, 140),
            grid: Color::Rgb(44, 48, 60),
            accent: Color::Rgb(97, 175, 239),
            bull: Color::Rgb(92, 190, 120),
            bear: Color::Rgb(224, 92, 100),
            fast_line: Color::Rgb(229, 192, 123),
            slow_line: Color::Rgb(140, 120, 226),
            volume: Color::Rgb(70, 82, 104),
            crosshair: Color::Rgb(160, 166, 180),
            tooltip_bg: Color::Rgb(32, 36, 46),
            earnings: Color::Rgb(86, 182, 194),
            warning: Color::Rgb(229, 192, 123),
            error: Color::Rgb(224, 92, 100),
        }
    }

    pub fn light() -> Self {
        Self {
            background: Color::Rgb(250, 250, 248),
            text: Color::Rgb(32, 36, 44),
            muted: Color::Rgb(130, 136, 148),
            grid: Color::Rgb(220, 222, 228),
            accent: Color::Rgb(24, 110, 190),
            bull: Color::Rgb(22, 130, 64),
            bear: Color::Rgb(186, 38, 50),
            fast_line: Color::Rgb(176, 124, 12),
            slow_line: Color::Rgb(100, 70, 190),
            volume: Color::Rgb(168, 178, 196),
            crosshair: Color::Rgb(90, 96, 110),
            tooltip_bg: Color::Rgb(234, 236, 240),
            earnings: Color::Rgb(16, 128, 142),
            warning: Color::Rgb(176, 124, 12),
            error: Color::Rgb(186, 38, 50),
        }
    }

    /// Terminal color for a renderer tone.
    pub fn tone(&self, tone: Tone) -> Color {
        match tone {
            Tone::Background => self.background,
            Tone::Grid => self.grid,
            Tone::Text => self.text,
            Tone::Muted => self.muted,
            Tone::Bull => self.bull,
            Tone::Bear => self.bear,
            Tone::FastLine => self.fast_line,
            Tone::SlowLine => self.slow_line,
            Tone::Volume => self.volume,
            Tone::Crosshair => self.crosshair,
            Tone::TooltipBg => self.tooltip_bg,
            Tone::Earnings => self.earnings,
        }
    }

    /// Border style for a panel, brighter when it holds focus.
    pub fn panel_border(&self, active: bool) -> Style {
        if active {
            Style::default().fg(self.accent)
        } else {
            Style::default().fg(self.grid)
        }
    }

    pub fn title(&self, active: bool) -> Style {
        if active {
            Style::default()
                .fg(self.accent)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.muted)
        }
    }

    /// Green for gains, red for losses, muted for flat.
    pub fn signed(&self, value: f64) -> Style {
        if value > 0.0 {
            Style::default().fg(self.bull)
        } else if value < 0.0 {
            Style::default().fg(self.bear)
        } else {
            Style::default().fg(self.muted)
        }
    }

    pub fn text_style(&self) -> Style {
        Style::default().fg(self.text)
    }

    pub fn muted_style(&self) -> Style {
        Style::default().fg(self.muted)
    }

    pub fn selection(&self) -> Style {
        Style::default()
            .fg(self.text)
            .bg(self.tooltip_bg)
            .add_modifier(Modifier::BOLD)
    }
}

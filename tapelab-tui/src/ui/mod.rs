//! Frame composition.
//!
//! One dashboard frame: watchlist on the left, chart in the middle, events
//! on the right, status bar along the bottom, and at most one modal overlay
//! on top. Individual panels live in their own modules.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::Frame;

use crate::app::{AppState, Overlay, Panel};

pub mod chart_panel;
pub mod events_panel;
pub mod overlays;
pub mod status_bar;
pub mod watchlist;

/// Draw one frame. Mutable access is needed because the chart panel records
/// the geometry it drew with, which mouse handling reads back.
pub fn draw(f: &mut Frame, app: &mut AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(10), Constraint::Length(1)])
        .split(f.area());

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(28),
            Constraint::Min(40),
            Constraint::Length(32),
        ])
        .split(rows[0]);

    watchlist::render(f, columns[0], app);
    chart_panel::render(f, columns[1], app);
    events_panel::render(f, columns[2], app);
    status_bar::render(f, rows[1], app);

    match app.overlay {
        Some(Overlay::Help) => overlays::render_help(f, app),
        Some(Overlay::Search) => overlays::render_search(f, app),
        Some(Overlay::ErrorHistory) => overlays::render_error_history(f, app),
        None => {}
    }
}

/// Title text for a panel border: ` Label [n] `, with n matching the jump key.
pub fn panel_title(panel: Panel) -> String {
    format!(" {} [{}] ", panel.label(), panel.index() + 1)
}

/// A rect centered in `r`, sized as percentages of it. Used by overlays.
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);
    horizontal[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::worker::WorkerResponse;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use std::sync::mpsc;
    use tapelab_core::data::{DataOrigin, History, Universe};

    fn test_app() -> AppState {
        let (cmd_tx, _cmd_rx) = mpsc::channel();
        let (_resp_tx, resp_rx) = mpsc::channel();
        AppState::new(cmd_tx, resp_rx, Universe::builtin())
    }

    fn loaded_app() -> AppState {
        use tapelab_core::data::synthetic::{generate, SynthConfig};
        use tapelab_core::indicators::{sma, FAST_SMA_PERIOD, SLOW_SMA_PERIOD};
        use tapelab_core::scan::detect;

        let mut app = test_app();
        let bars = generate(&SynthConfig::new(189.45, 2, 42));
        let sma_fast = sma(&bars, FAST_SMA_PERIOD);
        let sma_slow = sma(&bars, SLOW_SMA_PERIOD);
        let events = detect(&bars, &sma_slow);
        app.request_history("AAPL");
        app.handle_response(WorkerResponse::HistoryReady {
            generation: 1,
            bundle: Box::new(crate::worker::SymbolBundle {
                name: "Apple Inc.".to_string(),
                quote: tapelab_core::domain::Quote::from_bars("AAPL", "Apple Inc.", &bars),
                sma_fast,
                sma_slow,
                events,
                history: History {
                    symbol: "AAPL".to_string(),
                    bars,
                    origin: DataOrigin::Synthetic,
                },
            }),
        });
        app
    }

    fn rendered_text(app: &mut AppState) -> String {
        let backend = TestBackend::new(120, 40);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    #[test]
    fn frame_shows_all_three_panels() {
        let mut app = test_app();
        let text = rendered_text(&mut app);
        assert!(text.contains("Watchlist [2]"));
        assert!(text.contains("Events [3]"));
        assert!(text.contains("AAPL"));
    }

    #[test]
    fn loaded_chart_records_its_geometry() {
        let mut app = loaded_app();
        let text = rendered_text(&mut app);
        assert!(text.contains("Apple Inc."));
        assert!(text.contains("SYNTH"));
        let layout = app.chart.layout.expect("layout recorded during draw");
        assert!(layout.visible > 0);
        assert!(app.chart.area.is_some());
    }

    #[test]
    fn help_overlay_draws_on_top() {
        let mut app = test_app();
        app.overlay = Some(Overlay::Help);
        let text = rendered_text(&mut app);
        assert!(text.contains("Keys"));
    }

    #[test]
    fn centered_rect_is_inside_parent() {
        let r = centered_rect(60, 50, Rect::new(0, 0, 100, 40));
        assert!(r.x >= 20 && r.width <= 60);
        assert!(r.y >= 10 && r.height <= 20);
    }
}

//! Keyboard and mouse dispatch — overlays first, then global keys, then the
//! active panel.

use std::time::Instant;

use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::layout::Position;

use tapelab_core::view::DragOrigin;

use crate::app::{AppState, Overlay, Panel};

/// Window fraction one pan keypress moves, as a divisor of the visible count.
const PAN_DIVISOR: i64 = 10;

pub fn handle_key(app: &mut AppState, key: KeyEvent) {
    // Only act on presses (Windows terminals send Press and Release).
    if key.kind != KeyEventKind::Press {
        return;
    }

    // 1. An open overlay consumes input first.
    match app.overlay {
        Some(Overlay::Help) => {
            handle_help_overlay(app, key);
            return;
        }
        Some(Overlay::Search) => {
            handle_search_overlay(app, key);
            return;
        }
        Some(Overlay::ErrorHistory) => {
            handle_error_overlay(app, key);
            return;
        }
        None => {}
    }

    // 2. Global keys.
    match key.code {
        KeyCode::Char('q') => {
            app.running = false;
            return;
        }
        KeyCode::Char('?') => {
            app.overlay = Some(Overlay::Help);
            return;
        }
        KeyCode::Char('/') => {
            app.open_search();
            return;
        }
        KeyCode::Char('e') => {
            app.overlay = Some(Overlay::ErrorHistory);
            app.error_scroll = 0;
            return;
        }
        KeyCode::Char('t') => {
            app.theme_kind = app.theme_kind.toggled();
            return;
        }
        KeyCode::Char('1') => { app.active_panel = Panel::Chart; return; }
        KeyCode::Char('2') => { app.active_panel = Panel::Watchlist; return; }
        KeyCode::Char('3') => { app.active_panel = Panel::Events; return; }
        KeyCode::Tab => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.active_panel = app.active_panel.prev();
            } else {
                app.active_panel = app.active_panel.next();
            }
            return;
        }
        KeyCode::BackTab => {
            app.active_panel = app.active_panel.prev();
            return;
        }
        _ => {}
    }

    // 3. Panel-specific keys.
    match app.active_panel {
        Panel::Chart => handle_chart_key(app, key),
        Panel::Watchlist => handle_watchlist_key(app, key),
        Panel::Events => handle_events_key(app, key),
    }
}

fn handle_help_overlay(app: &mut AppState, key: KeyEvent) {
    if matches!(
        key.code,
        KeyCode::Char('?') | KeyCode::Esc | KeyCode::Char('q')
    ) {
        app.overlay = None;
    }
}

fn handle_search_overlay(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.overlay = None;
            app.search.input.clear();
            app.search.pending = false;
        }
        KeyCode::Enter => {
            let hit = app.search.selected().map(|h| h.symbol.clone());
            match hit {
                Some(symbol) => {
                    app.overlay = None;
                    app.search.input.clear();
                    app.search.pending = false;
                    app.select_symbol(&symbol);
                }
                None => app.set_warning("no matching symbol"),
            }
        }
        KeyCode::Down => {
            if app.search.cursor + 1 < app.search.results.len() {
                app.search.cursor += 1;
            }
        }
        KeyCode::Up => {
            app.search.cursor = app.search.cursor.saturating_sub(1);
        }
        KeyCode::Backspace => {
            app.search.input.pop();
            app.touch_search(Instant::now());
        }
        KeyCode::Char(c) => {
            app.search.input.push(c);
            app.touch_search(Instant::now());
        }
        _ => {}
    }
}

fn handle_error_overlay(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('e') => {
            app.overlay = None;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            if app.error_scroll + 1 < app.error_history.len() {
                app.error_scroll += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.error_scroll = app.error_scroll.saturating_sub(1);
        }
        _ => {}
    }
}

fn handle_chart_key(app: &mut AppState, key: KeyEvent) {
    let len = app.chart.bar_len();
    match key.code {
        KeyCode::Char(']') => {
            app.chart.view.select_preset(app.chart.view.preset().next());
        }
        KeyCode::Char('[') => {
            app.chart.view.select_preset(app.chart.view.preset().prev());
        }
        KeyCode::Char('+') | KeyCode::Char('=') => {
            app.chart.view.zoom(len, 0.5, true);
        }
        KeyCode::Char('-') => {
            app.chart.view.zoom(len, 0.5, false);
        }
        KeyCode::Char('h') | KeyCode::Left => {
            app.chart.view.pan_bars(len, -pan_step(app, len));
        }
        KeyCode::Char('l') | KeyCode::Right => {
            app.chart.view.pan_bars(len, pan_step(app, len));
        }
        KeyCode::Char('r') => {
            app.chart.view.reset();
        }
        KeyCode::Char('y') => {
            app.cycle_years();
        }
        KeyCode::Char('f') => {
            app.chart.overlays.sma_fast = !app.chart.overlays.sma_fast;
        }
        KeyCode::Char('s') => {
            app.chart.overlays.sma_slow = !app.chart.overlays.sma_slow;
        }
        KeyCode::Char('v') => {
            app.chart.overlays.volume = !app.chart.overlays.volume;
        }
        KeyCode::Char('b') => {
            app.chart.overlays.events = !app.chart.overlays.events;
        }
        _ => {}
    }
}

fn pan_step(app: &AppState, len: usize) -> i64 {
    let count = app.chart.view.resolve(len).count as i64;
    (count / PAN_DIVISOR).max(1)
}

fn handle_watchlist_key(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.watchlist.move_cursor(1),
        KeyCode::Char('k') | KeyCode::Up => app.watchlist.move_cursor(-1),
        KeyCode::Enter => {
            let symbol = app.watchlist.selected().map(|r| r.symbol.clone());
            if let Some(symbol) = symbol {
                app.select_symbol(&symbol);
            }
        }
        _ => {}
    }
}

fn handle_events_key(app: &mut AppState, key: KeyEvent) {
    let len = app.chart.events.len();
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.events_pane.move_cursor(1, len),
        KeyCode::Char('k') | KeyCode::Up => app.events_pane.move_cursor(-1, len),
        KeyCode::Enter => {
            let picked = app
                .chart
                .events
                .get(app.events_pane.cursor)
                .map(|e| (e.index, e.direction, e.date));
            if let Some((index, direction, date)) = picked {
                app.center_on_event(index);
                app.set_status(format!("{} breakout · {date}", direction.label()));
            }
        }
        _ => {}
    }
}

/// Mouse events act on the chart only: crosshair, wheel zoom, drag pan.
pub fn handle_mouse(app: &mut AppState, mouse: MouseEvent) {
    if app.overlay.is_some() {
        return;
    }
    let pos = Position::new(mouse.column, mouse.row);
    match mouse.kind {
        MouseEventKind::Moved => {
            app.chart.cursor = Some((mouse.column, mouse.row));
        }
        MouseEventKind::ScrollUp => zoom_at_pointer(app, pos, true),
        MouseEventKind::ScrollDown => zoom_at_pointer(app, pos, false),
        MouseEventKind::Down(MouseButton::Left) => {
            app.chart.cursor = Some((mouse.column, mouse.row));
            let len = app.chart.bar_len();
            if let Some(area) = app.chart.area {
                if len > 0 && area.contains(pos) {
                    let x = surface_x(mouse.column, area.x);
                    let viewport = app.chart.view.resolve(len);
                    app.chart.drag = Some(DragOrigin::begin(viewport, x));
                }
            }
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            app.chart.cursor = Some((mouse.column, mouse.row));
            let len = app.chart.bar_len();
            if let (Some(area), Some(layout), Some(drag)) =
                (app.chart.area, app.chart.layout, app.chart.drag)
            {
                // The pointer may leave the panel mid-drag; x goes negative
                // rather than wrapping.
                let x = surface_x(mouse.column, area.x);
                drag.pan_to(&mut app.chart.view, len, x, layout.bar_width());
            }
        }
        MouseEventKind::Up(MouseButton::Left) => {
            app.chart.drag = None;
        }
        _ => {}
    }
}

/// Pointer column in chart-surface coordinates, sampled at the cell center.
fn surface_x(column: u16, area_x: u16) -> f64 {
    f64::from(column) - f64::from(area_x) + 0.5
}

fn zoom_at_pointer(app: &mut AppState, pos: Position, zoom_in: bool) {
    let len = app.chart.bar_len();
    if len == 0 {
        return;
    }
    if let (Some(area), Some(layout)) = (app.chart.area, app.chart.layout) {
        if area.contains(pos) {
            let ratio = layout.cursor_ratio(surface_x(pos.x, area.x));
            app.chart.view.zoom(len, ratio, zoom_in);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::{self, Receiver};

    use chrono::NaiveDate;
    use proptest::prelude::*;
    use ratatui::layout::Rect;
    use tapelab_core::data::synthetic::{generate, SynthConfig};
    use tapelab_core::data::{DataOrigin, History, Universe};
    use tapelab_core::indicators::{sma, FAST_SMA_PERIOD, SLOW_SMA_PERIOD};
    use tapelab_core::scan::{BreakoutDirection, BreakoutEvent};
    use tapelab_core::view::{ChartLayout, RangePreset};

    use crate::ui::chart_panel::cell_config;
    use crate::worker::{WorkerCommand, WorkerResponse};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app() -> (AppState, Receiver<WorkerCommand>) {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (_resp_tx, resp_rx) = mpsc::channel::<WorkerResponse>();
        (
            AppState::new(cmd_tx, resp_rx, Universe::builtin()),
            cmd_rx,
        )
    }

    /// App with a two-year series installed, as if a load just completed.
    fn loaded_app() -> (AppState, Receiver<WorkerCommand>) {
        let (mut app, cmds) = app();
        let bars = generate(&SynthConfig::new(100.0, 2, 11));
        app.chart.sma_fast = sma(&bars, FAST_SMA_PERIOD);
        app.chart.sma_slow = sma(&bars, SLOW_SMA_PERIOD);
        app.chart.history = Some(History {
            symbol: "AAPL".to_string(),
            bars,
            origin: DataOrigin::Synthetic,
        });
        (app, cmds)
    }

    /// Pretend one frame was drawn into a 60x20 chart area at (10, 2).
    fn with_frame_geometry(app: &mut AppState) -> Rect {
        let area = Rect::new(10, 2, 60, 20);
        let len = app.chart.bar_len();
        let viewport = app.chart.view.resolve(len);
        let bars = &app.chart.history.as_ref().unwrap().bars;
        let visible = &bars[viewport.start..viewport.end()];
        let cfg = cell_config(area.width, area.height);
        app.chart.layout = Some(ChartLayout::compute(&cfg, visible).unwrap());
        app.chart.area = Some(area);
        area
    }

    #[test]
    fn q_quits_and_release_events_are_ignored() {
        let (mut app, _cmds) = app();
        let mut release = key(KeyCode::Char('q'));
        release.kind = KeyEventKind::Release;
        handle_key(&mut app, release);
        assert!(app.running);

        handle_key(&mut app, key(KeyCode::Char('q')));
        assert!(!app.running);
    }

    #[test]
    fn digits_and_tab_switch_panels() {
        let (mut app, _cmds) = app();
        handle_key(&mut app, key(KeyCode::Char('2')));
        assert_eq!(app.active_panel, Panel::Watchlist);
        handle_key(&mut app, key(KeyCode::Char('3')));
        assert_eq!(app.active_panel, Panel::Events);
        handle_key(&mut app, key(KeyCode::Tab));
        assert_eq!(app.active_panel, Panel::Chart);
        handle_key(&mut app, key(KeyCode::BackTab));
        assert_eq!(app.active_panel, Panel::Events);
    }

    #[test]
    fn help_opens_and_closes() {
        let (mut app, _cmds) = app();
        handle_key(&mut app, key(KeyCode::Char('?')));
        assert_eq!(app.overlay, Some(Overlay::Help));
        // q must not quit while the overlay is open.
        handle_key(&mut app, key(KeyCode::Char('q')));
        assert!(app.running);
        assert_eq!(app.overlay, None);
    }

    #[test]
    fn search_overlay_types_and_escapes() {
        let (mut app, cmds) = app();
        handle_key(&mut app, key(KeyCode::Char('/')));
        assert_eq!(app.overlay, Some(Overlay::Search));
        assert!(matches!(cmds.try_recv(), Ok(WorkerCommand::Search { .. })));

        for c in ['n', 'v'] {
            handle_key(&mut app, key(KeyCode::Char(c)));
        }
        assert_eq!(app.search.input, "nv");
        assert!(app.search.pending);

        handle_key(&mut app, key(KeyCode::Esc));
        assert_eq!(app.overlay, None);
        assert!(app.search.input.is_empty());
        assert!(!app.search.pending);
    }

    #[test]
    fn search_enter_charts_the_selected_hit() {
        let (mut app, cmds) = app();
        app.overlay = Some(Overlay::Search);
        app.search.results = vec![crate::worker::SearchHit {
            symbol: "NVDA".to_string(),
            name: "NVIDIA Corp.".to_string(),
        }];
        app.search.cursor = 0;
        handle_key(&mut app, key(KeyCode::Enter));
        assert_eq!(app.overlay, None);
        assert_eq!(app.chart.symbol, "NVDA");
        assert!(matches!(
            cmds.try_recv(),
            Ok(WorkerCommand::LoadHistory { symbol, .. }) if symbol == "NVDA"
        ));
    }

    #[test]
    fn search_enter_without_a_hit_warns_and_stays_open() {
        let (mut app, _cmds) = app();
        app.overlay = Some(Overlay::Search);
        app.search.input = "zzqx".to_string();
        handle_key(&mut app, key(KeyCode::Enter));
        assert_eq!(app.overlay, Some(Overlay::Search));
        assert!(app.status_message.is_some());
    }

    #[test]
    fn chart_toggles_flip() {
        let (mut app, _cmds) = app();
        assert!(app.chart.overlays.sma_fast);
        handle_key(&mut app, key(KeyCode::Char('f')));
        assert!(!app.chart.overlays.sma_fast);
        handle_key(&mut app, key(KeyCode::Char('s')));
        assert!(!app.chart.overlays.sma_slow);
        handle_key(&mut app, key(KeyCode::Char('v')));
        assert!(!app.chart.overlays.volume);
        handle_key(&mut app, key(KeyCode::Char('b')));
        assert!(!app.chart.overlays.events);
        handle_key(&mut app, key(KeyCode::Char('f')));
        assert!(app.chart.overlays.sma_fast);
    }

    #[test]
    fn brackets_cycle_the_preset_and_clear_manual_state() {
        let (mut app, _cmds) = loaded_app();
        let len = app.chart.bar_len();
        app.chart.view.zoom(len, 0.5, true);
        assert!(app.chart.view.is_manual());

        handle_key(&mut app, key(KeyCode::Char(']')));
        assert_eq!(app.chart.view.preset(), RangePreset::default().next());
        assert!(!app.chart.view.is_manual());
        handle_key(&mut app, key(KeyCode::Char('[')));
        assert_eq!(app.chart.view.preset(), RangePreset::default());
    }

    #[test]
    fn zoom_keys_shrink_and_grow_the_window() {
        let (mut app, _cmds) = loaded_app();
        let len = app.chart.bar_len();
        let before = app.chart.view.resolve(len).count;

        handle_key(&mut app, key(KeyCode::Char('+')));
        let zoomed = app.chart.view.resolve(len).count;
        assert!(zoomed < before);

        handle_key(&mut app, key(KeyCode::Char('-')));
        assert!(app.chart.view.resolve(len).count > zoomed);
    }

    #[test]
    fn pan_keys_shift_the_window() {
        let (mut app, _cmds) = loaded_app();
        let len = app.chart.bar_len();
        // Y1 default on a ~2y series starts mid-history.
        let before = app.chart.view.resolve(len).start;
        assert!(before > 0);

        handle_key(&mut app, key(KeyCode::Char('h')));
        let left = app.chart.view.resolve(len).start;
        assert!(left < before);

        handle_key(&mut app, key(KeyCode::Char('l')));
        assert_eq!(app.chart.view.resolve(len).start, before);

        handle_key(&mut app, key(KeyCode::Char('r')));
        assert!(!app.chart.view.is_manual());
    }

    #[test]
    fn watchlist_enter_requests_the_selected_symbol() {
        let (mut app, cmds) = app();
        app.active_panel = Panel::Watchlist;
        handle_key(&mut app, key(KeyCode::Char('j')));
        assert_eq!(app.watchlist.cursor, 1);
        let expected = app.watchlist.rows[1].symbol.clone();

        handle_key(&mut app, key(KeyCode::Enter));
        assert_eq!(app.chart.symbol, expected);
        assert!(matches!(
            cmds.try_recv(),
            Ok(WorkerCommand::LoadHistory { symbol, .. }) if symbol == expected
        ));
    }

    #[test]
    fn events_enter_centers_the_viewport() {
        let (mut app, _cmds) = loaded_app();
        app.active_panel = Panel::Events;
        app.chart.events = vec![BreakoutEvent {
            index: 300,
            direction: BreakoutDirection::Bull,
            date: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
            price: 101.0,
            label: None,
        }];
        handle_key(&mut app, key(KeyCode::Enter));

        let len = app.chart.bar_len();
        assert!(app.chart.view.is_manual());
        assert!(app.chart.view.resolve(len).contains(300));
    }

    #[test]
    fn wheel_zooms_only_over_the_chart() {
        let (mut app, _cmds) = loaded_app();
        let area = with_frame_geometry(&mut app);

        let outside = MouseEvent {
            kind: MouseEventKind::ScrollUp,
            column: 0,
            row: 0,
            modifiers: KeyModifiers::NONE,
        };
        handle_mouse(&mut app, outside);
        assert!(!app.chart.view.is_manual());

        let inside = MouseEvent {
            kind: MouseEventKind::ScrollUp,
            column: area.x + area.width / 2,
            row: area.y + area.height / 2,
            modifiers: KeyModifiers::NONE,
        };
        let len = app.chart.bar_len();
        let before = app.chart.view.resolve(len).count;
        handle_mouse(&mut app, inside);
        assert!(app.chart.view.is_manual());
        assert!(app.chart.view.resolve(len).count < before);
    }

    #[test]
    fn drag_pans_by_whole_bars() {
        let (mut app, _cmds) = loaded_app();
        let area = with_frame_geometry(&mut app);
        let len = app.chart.bar_len();
        let start = app.chart.view.resolve(len).start;
        let bar_width = app.chart.layout.unwrap().bar_width();

        let at = |column: u16, kind: MouseEventKind| MouseEvent {
            kind,
            column,
            row: area.y + 5,
            modifiers: KeyModifiers::NONE,
        };
        let x0 = area.x + 20;
        handle_mouse(&mut app, at(x0, MouseEventKind::Down(MouseButton::Left)));
        assert!(app.chart.drag.is_some());

        // Dragging right pulls older bars into view.
        let dx = (bar_width * 5.0).round() as u16;
        handle_mouse(&mut app, at(x0 + dx, MouseEventKind::Drag(MouseButton::Left)));
        let panned = app.chart.view.resolve(len).start;
        assert!(panned < start, "drag right should reduce start");

        handle_mouse(&mut app, at(x0 + dx, MouseEventKind::Up(MouseButton::Left)));
        assert!(app.chart.drag.is_none());
    }

    #[test]
    fn moves_update_the_crosshair() {
        let (mut app, _cmds) = loaded_app();
        handle_mouse(
            &mut app,
            MouseEvent {
                kind: MouseEventKind::Moved,
                column: 30,
                row: 12,
                modifiers: KeyModifiers::NONE,
            },
        );
        assert_eq!(app.chart.cursor, Some((30, 12)));
    }

    proptest! {
        /// No sequence of view keys and wheel events can leave the window
        /// outside the series or below the zoom floor.
        #[test]
        fn view_input_sequences_keep_the_window_valid(
            ops in prop::collection::vec((0u8..9, 0u16..80), 1..50),
        ) {
            use tapelab_core::view::MIN_VISIBLE_BARS;

            let (mut app, _cmds) = loaded_app();
            let area = with_frame_geometry(&mut app);
            let len = app.chart.bar_len();

            for (op, col) in ops {
                match op {
                    0 => handle_key(&mut app, key(KeyCode::Char('['))),
                    1 => handle_key(&mut app, key(KeyCode::Char(']'))),
                    2 => handle_key(&mut app, key(KeyCode::Char('+'))),
                    3 => handle_key(&mut app, key(KeyCode::Char('-'))),
                    4 => handle_key(&mut app, key(KeyCode::Char('h'))),
                    5 => handle_key(&mut app, key(KeyCode::Char('l'))),
                    6 => handle_key(&mut app, key(KeyCode::Char('r'))),
                    _ => {
                        let kind = if op == 7 {
                            MouseEventKind::ScrollUp
                        } else {
                            MouseEventKind::ScrollDown
                        };
                        handle_mouse(&mut app, MouseEvent {
                            kind,
                            column: col,
                            row: area.y + 4,
                            modifiers: KeyModifiers::NONE,
                        });
                    }
                }
                let vp = app.chart.view.resolve(len);
                prop_assert!(vp.end() <= len);
                prop_assert!(vp.count >= MIN_VISIBLE_BARS.min(len));
            }
        }
    }
}

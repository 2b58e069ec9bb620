//! tapelab TUI — terminal charting dashboard.
//!
//! Panels:
//! 1. Chart — candlesticks, SMA overlays, volume strip, breakout markers
//! 2. Watchlist — universe symbols with quote changes
//! 3. Events — breakout list for the charted symbol
//!
//! Overlays: help (`?`), symbol search (`/`), error history (`e`).

mod app;
mod input;
mod persistence;
mod theme;
mod ui;
mod worker;

use std::io::{self, stdout};
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::Local;
use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture, Event};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use tapelab_core::data::{HistoryLoader, Universe};

use crate::app::{AppState, ErrorCategory};
use crate::worker::WorkerCommand;

/// Fixed master seed so every session replays the same synthetic tape.
const MASTER_SEED: u64 = 42;

fn main() -> Result<()> {
    // Install a panic hook that restores the terminal before printing the panic.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), DisableMouseCapture, LeaveAlternateScreen);
        default_hook(info);
    }));

    // Paths
    let csv_dir = PathBuf::from("data");
    let config_dir = dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tapelab");
    let state_path = config_dir.join("state.json");
    let universe_path = config_dir.join("universe.toml");

    // Symbol universe: built-in listing unless a config file overrides it.
    let (universe, universe_err) = if universe_path.exists() {
        match Universe::from_file(&universe_path) {
            Ok(u) => (u, None),
            Err(e) => (Universe::builtin(), Some(e)),
        }
    } else {
        (Universe::builtin(), None)
    };

    // Load persisted state
    let persisted = persistence::load(&state_path);

    // Worker channels
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let (resp_tx, resp_rx) = mpsc::channel();

    // Spawn worker
    let loader = HistoryLoader::new(universe.clone(), MASTER_SEED).with_csv_dir(csv_dir);
    let worker_handle = worker::spawn_worker(loader, cmd_rx, resp_tx);

    // Build app state
    let mut app = AppState::new(cmd_tx.clone(), resp_rx, universe);

    // Apply persisted state
    persistence::apply(&mut app, persisted);
    if let Some(err) = universe_err {
        app.push_error(ErrorCategory::Io, "universe.toml", err);
    }

    // Kick off the first load for the restored (or default) symbol.
    let symbol = app.chart.symbol.clone();
    app.request_history(&symbol);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Run the main event loop
    let result = run_app(&mut terminal, &mut app);

    // Save state before exit
    let persisted = persistence::extract(&app);
    let _ = persistence::save(&state_path, &persisted);

    // Shutdown worker
    let _ = cmd_tx.send(WorkerCommand::Shutdown);
    let _ = worker_handle.join();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableMouseCapture, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
) -> Result<()> {
    loop {
        // 1. Render
        terminal.draw(|f| ui::draw(f, app))?;

        // 2. Drain worker responses (non-blocking)
        while let Ok(resp) = app.worker_rx.try_recv() {
            app.handle_response(resp);
        }

        // 3. Poll for input events (50ms timeout for ~20 FPS tick)
        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) => input::handle_key(app, key),
                Event::Mouse(mouse) => input::handle_mouse(app, mouse),
                _ => {}
            }
        }

        // 4. Timers: debounced search dispatch and the quote ticker
        app.tick(Instant::now(), Local::now().naive_local());

        // 5. Check quit
        if !app.running {
            break;
        }
    }
    Ok(())
}

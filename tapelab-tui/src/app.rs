//! Application state.
//!
//! `AppState` is the single mutable hub the event loop, input handlers and
//! draw code share. Data work never happens here: loads, quote refreshes and
//! symbol searches go to the worker thread as commands, and every command
//! carries a generation number so replies that arrive after the user has
//! already moved on are dropped instead of clobbering newer state.

use std::collections::VecDeque;
use std::sync::mpsc::{Receiver, Sender};
use std::time::{Duration, Instant};

use chrono::{DateTime, Datelike, Local, NaiveDateTime, Timelike, Weekday};
use ratatui::layout::Rect;
use tapelab_core::data::{History, Universe};
use tapelab_core::domain::Quote;
use tapelab_core::render::OverlayToggles;
use tapelab_core::scan::BreakoutEvent;
use tapelab_core::view::{ChartLayout, DragOrigin, RangePreset, ViewState};

use crate::theme::{Theme, ThemeKind};
use crate::worker::{SearchHit, SymbolBundle, WorkerCommand, WorkerResponse};

/// Error records kept before the oldest one is dropped.
pub const ERROR_HISTORY_CAP: usize = 50;

/// Quote refresh cadence during regular trading hours.
pub const QUOTE_INTERVAL_OPEN: Duration = Duration::from_secs(5);

/// Quote refresh cadence on nights and weekends.
pub const QUOTE_INTERVAL_CLOSED: Duration = Duration::from_secs(60);

/// Idle time after the last search keystroke before the query dispatches.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(250);

/// History depths the `y` key cycles through.
pub const YEAR_CHOICES: [u32; 4] = [1, 2, 5, 10];

/// The three dashboard panels, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Panel {
    Chart,
    Watchlist,
    Events,
}

impl Panel {
    pub const COUNT: usize = 3;

    pub fn index(&self) -> usize {
        match self {
            Panel::Chart => 0,
            Panel::Watchlist => 1,
            Panel::Events => 2,
        }
    }

    pub fn from_index(i: usize) -> Panel {
        match i {
            1 => Panel::Watchlist,
            2 => Panel::Events,
            _ => Panel::Chart,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Panel::Chart => "Chart",
            Panel::Watchlist => "Watchlist",
            Panel::Events => "Events",
        }
    }

    pub fn next(&self) -> Panel {
        Panel::from_index((self.index() + 1) % Panel::COUNT)
    }

    pub fn prev(&self) -> Panel {
        Panel::from_index((self.index() + Panel::COUNT - 1) % Panel::COUNT)
    }
}

/// Severity of the status-bar message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warning,
    Error,
}

/// Coarse origin of a recorded error, for the history overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Data,
    Io,
    Other,
}

impl ErrorCategory {
    pub fn label(&self) -> &'static str {
        match self {
            ErrorCategory::Data => "DATA",
            ErrorCategory::Io => "IO",
            ErrorCategory::Other => "ERROR",
        }
    }
}

/// One entry in the error history, newest first.
#[derive(Debug, Clone)]
pub struct ErrorRecord {
    pub at: DateTime<Local>,
    pub category: ErrorCategory,
    pub context: String,
    pub message: String,
}

/// Modal surfaces drawn over the dashboard. At most one is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    Help,
    Search,
    ErrorHistory,
}

/// Everything the chart panel needs to draw and hit-test one symbol.
pub struct ChartState {
    pub symbol: String,
    pub company: String,
    pub years: u32,
    pub history: Option<History>,
    pub sma_fast: Vec<f64>,
    pub sma_slow: Vec<f64>,
    pub events: Vec<BreakoutEvent>,
    pub quote: Option<Quote>,
    pub view: ViewState,
    pub overlays: OverlayToggles,
    /// Cursor position in frame cells, when it hovers the chart.
    pub cursor: Option<(u16, u16)>,
    pub drag: Option<DragOrigin>,
    /// Inner chart area from the most recent frame.
    pub area: Option<Rect>,
    /// Geometry the most recent frame was drawn with.
    pub layout: Option<ChartLayout>,
    pub loading: bool,
}

impl ChartState {
    fn new(symbol: &str, company: &str) -> ChartState {
        ChartState {
            symbol: symbol.to_string(),
            company: company.to_string(),
            years: 10,
            history: None,
            sma_fast: Vec::new(),
            sma_slow: Vec::new(),
            events: Vec::new(),
            quote: None,
            view: ViewState::default(),
            overlays: OverlayToggles::default(),
            cursor: None,
            drag: None,
            area: None,
            layout: None,
            loading: false,
        }
    }

    pub fn bar_len(&self) -> usize {
        self.history.as_ref().map_or(0, |h| h.bars.len())
    }

    /// Install a freshly loaded symbol, dropping any manual window and
    /// crosshair that belonged to the prior series.
    pub fn apply_bundle(&mut self, bundle: SymbolBundle) {
        self.symbol = bundle.history.symbol.clone();
        if !bundle.name.is_empty() {
            self.company = bundle.name;
        }
        self.sma_fast = bundle.sma_fast;
        self.sma_slow = bundle.sma_slow;
        self.events = bundle.events;
        self.quote = bundle.quote;
        self.history = Some(bundle.history);
        self.loading = false;
        let preset = self.view.preset();
        self.view.select_preset(preset);
        self.cursor = None;
        self.drag = None;
    }
}

/// One watchlist row: a universe listing plus its latest quote, if any.
pub struct WatchRow {
    pub symbol: String,
    pub name: String,
    pub quote: Option<Quote>,
}

pub struct WatchlistState {
    pub rows: Vec<WatchRow>,
    pub cursor: usize,
}

impl WatchlistState {
    fn from_universe(universe: &Universe) -> WatchlistState {
        let rows = universe
            .symbols()
            .map(|(sym, listing)| WatchRow {
                symbol: sym.to_string(),
                name: listing.name.clone(),
                quote: None,
            })
            .collect();
        WatchlistState { rows, cursor: 0 }
    }

    pub fn selected(&self) -> Option<&WatchRow> {
        self.rows.get(self.cursor)
    }

    pub fn move_cursor(&mut self, delta: i64) {
        if self.rows.is_empty() {
            return;
        }
        let last = self.rows.len() as i64 - 1;
        self.cursor = (self.cursor as i64 + delta).clamp(0, last) as usize;
    }
}

/// Cursor state for the events panel; the rows live in `ChartState::events`.
#[derive(Default)]
pub struct EventsState {
    pub cursor: usize,
}

impl EventsState {
    pub fn move_cursor(&mut self, delta: i64, len: usize) {
        if len == 0 {
            return;
        }
        self.cursor = (self.cursor as i64 + delta).clamp(0, len as i64 - 1) as usize;
    }
}

/// State of the symbol search overlay.
#[derive(Default)]
pub struct SearchState {
    pub input: String,
    pub results: Vec<SearchHit>,
    pub cursor: usize,
    pub last_edit: Option<Instant>,
    pub pending: bool,
}

impl SearchState {
    pub fn selected(&self) -> Option<&SearchHit> {
        self.results.get(self.cursor)
    }
}

/// Shared mutable state for the whole application.
pub struct AppState {
    pub running: bool,
    pub active_panel: Panel,
    pub overlay: Option<Overlay>,
    pub universe: Universe,
    pub chart: ChartState,
    pub watchlist: WatchlistState,
    pub events_pane: EventsState,
    pub search: SearchState,
    pub theme_kind: ThemeKind,
    pub status_message: Option<(String, StatusLevel)>,
    pub error_history: VecDeque<ErrorRecord>,
    pub error_scroll: usize,
    pub worker_tx: Sender<WorkerCommand>,
    pub worker_rx: Receiver<WorkerResponse>,
    history_gen: u64,
    quote_gen: u64,
    search_gen: u64,
    last_quote_request: Option<Instant>,
}

impl AppState {
    pub fn new(
        worker_tx: Sender<WorkerCommand>,
        worker_rx: Receiver<WorkerResponse>,
        universe: Universe,
    ) -> AppState {
        let (symbol, company) = universe
            .symbols()
            .next()
            .map(|(s, l)| (s.to_string(), l.name.clone()))
            .unwrap_or_else(|| ("AAPL".to_string(), String::new()));
        let watchlist = WatchlistState::from_universe(&universe);
        AppState {
            running: true,
            active_panel: Panel::Chart,
            overlay: None,
            universe,
            chart: ChartState::new(&symbol, &company),
            watchlist,
            events_pane: EventsState::default(),
            search: SearchState::default(),
            theme_kind: ThemeKind::default(),
            status_message: None,
            error_history: VecDeque::new(),
            error_scroll: 0,
            worker_tx,
            worker_rx,
            history_gen: 0,
            quote_gen: 0,
            search_gen: 0,
            last_quote_request: None,
        }
    }

    pub fn theme(&self) -> Theme {
        Theme::of(self.theme_kind)
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some((message.into(), StatusLevel::Info));
    }

    pub fn set_warning(&mut self, message: impl Into<String>) {
        self.status_message = Some((message.into(), StatusLevel::Warning));
    }

    /// Record an error in the history and surface it in the status bar.
    pub fn push_error(
        &mut self,
        category: ErrorCategory,
        context: impl Into<String>,
        message: impl Into<String>,
    ) {
        let context = context.into();
        let message = message.into();
        self.status_message = Some((format!("{context}: {message}"), StatusLevel::Error));
        self.error_history.push_front(ErrorRecord {
            at: Local::now(),
            category,
            context,
            message,
        });
        while self.error_history.len() > ERROR_HISTORY_CAP {
            self.error_history.pop_back();
        }
    }

    /// Ask the worker for a symbol's history. Stale replies are filtered by
    /// the generation bump.
    pub fn request_history(&mut self, symbol: &str) {
        let symbol = symbol.to_uppercase();
        self.history_gen += 1;
        self.chart.loading = true;
        self.chart.symbol = symbol.clone();
        if let Some(listing) = self.universe.get(&symbol) {
            self.chart.company = listing.name.clone();
        }
        self.set_status(format!("loading {symbol}..."));
        let _ = self.worker_tx.send(WorkerCommand::LoadHistory {
            generation: self.history_gen,
            symbol,
            years: self.chart.years,
        });
    }

    /// Switch the chart to a symbol picked in the watchlist or search.
    pub fn select_symbol(&mut self, symbol: &str) {
        self.events_pane.cursor = 0;
        self.request_history(symbol);
    }

    /// Reload the current symbol at the next history depth.
    pub fn cycle_years(&mut self) {
        let pos = YEAR_CHOICES
            .iter()
            .position(|y| *y == self.chart.years)
            .unwrap_or(0);
        self.chart.years = YEAR_CHOICES[(pos + 1) % YEAR_CHOICES.len()];
        let symbol = self.chart.symbol.clone();
        self.request_history(&symbol);
    }

    /// Center the viewport on an event row from the events panel.
    pub fn center_on_event(&mut self, index: usize) {
        let len = self.chart.bar_len();
        if len == 0 {
            return;
        }
        let count = self.chart.view.resolve(len).count as i64;
        self.chart
            .view
            .set_manual(index as i64 - count / 2, count, len);
    }

    /// Open the search overlay and dispatch the empty query immediately so
    /// the full universe shows while the user types.
    pub fn open_search(&mut self) {
        self.overlay = Some(Overlay::Search);
        self.search.input.clear();
        self.search.cursor = 0;
        self.search.pending = false;
        self.search_gen += 1;
        let _ = self.worker_tx.send(WorkerCommand::Search {
            generation: self.search_gen,
            query: String::new(),
        });
    }

    /// Note a search keystroke; the query goes out once typing pauses.
    pub fn touch_search(&mut self, now: Instant) {
        self.search.last_edit = Some(now);
        self.search.pending = true;
        self.search.cursor = 0;
    }

    /// Periodic duties: debounced search dispatch and the quote ticker.
    /// `wall` decides the quote cadence from market hours.
    pub fn tick(&mut self, now: Instant, wall: NaiveDateTime) {
        if self.search.pending {
            let idle = self
                .search
                .last_edit
                .map_or(Duration::MAX, |t| now.saturating_duration_since(t));
            if idle >= SEARCH_DEBOUNCE {
                self.search.pending = false;
                self.search_gen += 1;
                let _ = self.worker_tx.send(WorkerCommand::Search {
                    generation: self.search_gen,
                    query: self.search.input.clone(),
                });
            }
        }

        let interval = quote_refresh_interval(market_is_open(wall));
        let due = self
            .last_quote_request
            .map_or(true, |t| now.saturating_duration_since(t) >= interval);
        if due {
            self.request_quotes(now);
        }
    }

    fn request_quotes(&mut self, now: Instant) {
        let mut symbols: Vec<String> = self
            .watchlist
            .rows
            .iter()
            .map(|r| r.symbol.clone())
            .collect();
        if !symbols.iter().any(|s| s == &self.chart.symbol) {
            symbols.push(self.chart.symbol.clone());
        }
        self.quote_gen += 1;
        self.last_quote_request = Some(now);
        let _ = self.worker_tx.send(WorkerCommand::RefreshQuotes {
            generation: self.quote_gen,
            symbols,
        });
    }

    /// Apply one worker reply. Replies from superseded requests are dropped.
    pub fn handle_response(&mut self, resp: WorkerResponse) {
        match resp {
            WorkerResponse::HistoryReady { generation, bundle } => {
                if generation != self.history_gen {
                    return;
                }
                let origin = bundle.history.origin;
                let bars = bundle.history.bars.len();
                let symbol = bundle.history.symbol.clone();
                self.chart.apply_bundle(*bundle);
                self.events_pane.cursor = self.chart.events.len().saturating_sub(1);
                if let Some(q) = &self.chart.quote {
                    self.apply_quote_to_watchlist(q.clone());
                }
                self.set_status(format!("{symbol} · {bars} bars · {}", origin.label()));
            }
            WorkerResponse::HistoryFailed {
                generation,
                symbol,
                error,
            } => {
                if generation != self.history_gen {
                    return;
                }
                self.chart.loading = false;
                self.push_error(ErrorCategory::Data, format!("load {symbol}"), error);
            }
            WorkerResponse::QuotesReady { generation, quotes } => {
                if generation != self.quote_gen {
                    return;
                }
                for quote in quotes {
                    if quote.symbol == self.chart.symbol {
                        self.chart.quote = Some(quote.clone());
                    }
                    self.apply_quote_to_watchlist(quote);
                }
            }
            WorkerResponse::SearchResults {
                generation,
                matches,
                ..
            } => {
                if generation != self.search_gen {
                    return;
                }
                self.search.results = matches;
                if self.search.cursor >= self.search.results.len() {
                    self.search.cursor = self.search.results.len().saturating_sub(1);
                }
            }
        }
    }

    fn apply_quote_to_watchlist(&mut self, quote: Quote) {
        if let Some(row) = self
            .watchlist
            .rows
            .iter_mut()
            .find(|r| r.symbol == quote.symbol)
        {
            row.quote = Some(quote);
        }
    }
}

/// Regular US cash session: weekdays 9:30 to 16:00 local time.
pub fn market_is_open(now: NaiveDateTime) -> bool {
    if matches!(now.weekday(), Weekday::Sat | Weekday::Sun) {
        return false;
    }
    let minutes = now.hour() * 60 + now.minute();
    (570..960).contains(&minutes)
}

pub fn quote_refresh_interval(open: bool) -> Duration {
    if open {
        QUOTE_INTERVAL_OPEN
    } else {
        QUOTE_INTERVAL_CLOSED
    }
}

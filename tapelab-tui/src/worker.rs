//! Background worker thread.
//!
//! History loads, quote refreshes and symbol searches run off the UI thread
//! so the event loop never blocks on I/O or the generator. Commands carry the
//! requesting generation; the worker echoes it back and the UI drops replies
//! whose generation is no longer current.

use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};

use tapelab_core::data::{History, HistoryLoader};
use tapelab_core::domain::Quote;
use tapelab_core::indicators::{sma, FAST_SMA_PERIOD, SLOW_SMA_PERIOD};
use tapelab_core::scan::{detect, BreakoutEvent};

/// Requests the UI sends to the worker.
#[derive(Debug)]
pub enum WorkerCommand {
    LoadHistory {
        generation: u64,
        symbol: String,
        years: u32,
    },
    RefreshQuotes {
        generation: u64,
        symbols: Vec<String>,
    },
    Search {
        generation: u64,
        query: String,
    },
    Shutdown,
}

/// One row in the search overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub symbol: String,
    pub name: String,
}

/// A fully prepared symbol: history plus everything derived from it, so the
/// UI thread only ever installs results.
#[derive(Debug)]
pub struct SymbolBundle {
    pub history: History,
    pub name: String,
    pub sma_fast: Vec<f64>,
    pub sma_slow: Vec<f64>,
    pub events: Vec<BreakoutEvent>,
    pub quote: Option<Quote>,
}

/// Replies the worker sends back.
#[derive(Debug)]
pub enum WorkerResponse {
    HistoryReady {
        generation: u64,
        bundle: Box<SymbolBundle>,
    },
    HistoryFailed {
        generation: u64,
        symbol: String,
        error: String,
    },
    QuotesReady {
        generation: u64,
        quotes: Vec<Quote>,
    },
    SearchResults {
        generation: u64,
        query: String,
        matches: Vec<SearchHit>,
    },
}

/// Spawn the worker thread. It owns the loader and runs until it receives
/// `Shutdown` or the command channel closes.
pub fn spawn_worker(
    loader: HistoryLoader,
    rx: Receiver<WorkerCommand>,
    tx: Sender<WorkerResponse>,
) -> JoinHandle<()> {
    thread::Builder::new()
        .name("tapelab-worker".to_string())
        .spawn(move || worker_loop(loader, rx, tx))
        .expect("failed to spawn worker thread")
}

fn worker_loop(loader: HistoryLoader, rx: Receiver<WorkerCommand>, tx: Sender<WorkerResponse>) {
    loop {
        match rx.recv() {
            Ok(WorkerCommand::Shutdown) | Err(_) => break,
            Ok(cmd) => handle_command(&loader, cmd, &tx),
        }
    }
}

fn handle_command(loader: &HistoryLoader, cmd: WorkerCommand, tx: &Sender<WorkerResponse>) {
    match cmd {
        WorkerCommand::LoadHistory {
            generation,
            symbol,
            years,
        } => {
            let resp = match loader.load(&symbol, years) {
                Ok(history) => WorkerResponse::HistoryReady {
                    generation,
                    bundle: Box::new(prepare_bundle(loader, history)),
                },
                Err(err) => WorkerResponse::HistoryFailed {
                    generation,
                    symbol,
                    error: err.to_string(),
                },
            };
            let _ = tx.send(resp);
        }
        WorkerCommand::RefreshQuotes {
            generation,
            symbols,
        } => {
            // Symbols that fail here simply keep their previous quote.
            let quotes = symbols
                .iter()
                .filter_map(|s| loader.quote(s).ok())
                .collect();
            let _ = tx.send(WorkerResponse::QuotesReady { generation, quotes });
        }
        WorkerCommand::Search { generation, query } => {
            let matches = loader
                .universe()
                .search(&query)
                .into_iter()
                .map(|(symbol, listing)| SearchHit {
                    symbol: symbol.to_string(),
                    name: listing.name.clone(),
                })
                .collect();
            let _ = tx.send(WorkerResponse::SearchResults {
                generation,
                query,
                matches,
            });
        }
        WorkerCommand::Shutdown => {}
    }
}

/// Derive the indicator columns, breakout events and quote for a history.
/// The breakout reference is the slow SMA.
fn prepare_bundle(loader: &HistoryLoader, history: History) -> SymbolBundle {
    let name = loader
        .universe()
        .get(&history.symbol)
        .map(|l| l.name.clone())
        .unwrap_or_default();
    let sma_fast = sma(&history.bars, FAST_SMA_PERIOD);
    let sma_slow = sma(&history.bars, SLOW_SMA_PERIOD);
    let events = detect(&history.bars, &sma_slow);
    let quote = Quote::from_bars(&history.symbol, &name, &history.bars);
    SymbolBundle {
        history,
        name,
        sma_fast,
        sma_slow,
        events,
        quote,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;
    use tapelab_core::data::Universe;

    fn spawn() -> (
        Sender<WorkerCommand>,
        Receiver<WorkerResponse>,
        JoinHandle<()>,
    ) {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (resp_tx, resp_rx) = mpsc::channel();
        let loader = HistoryLoader::new(Universe::builtin(), 42);
        let handle = spawn_worker(loader, cmd_rx, resp_tx);
        (cmd_tx, resp_rx, handle)
    }

    fn recv(rx: &Receiver<WorkerResponse>) -> WorkerResponse {
        rx.recv_timeout(Duration::from_secs(10))
            .expect("worker reply")
    }

    #[test]
    fn shutdown_command_stops_the_worker() {
        let (tx, _rx, handle) = spawn();
        tx.send(WorkerCommand::Shutdown).unwrap();
        handle.join().unwrap();
    }

    #[test]
    fn dropping_the_sender_stops_the_worker() {
        let (tx, _rx, handle) = spawn();
        drop(tx);
        handle.join().unwrap();
    }

    #[test]
    fn load_returns_a_complete_bundle() {
        let (tx, rx, handle) = spawn();
        tx.send(WorkerCommand::LoadHistory {
            generation: 3,
            symbol: "aapl".to_string(),
            years: 1,
        })
        .unwrap();

        match recv(&rx) {
            WorkerResponse::HistoryReady { generation, bundle } => {
                assert_eq!(generation, 3);
                assert_eq!(bundle.history.symbol, "AAPL");
                assert_eq!(bundle.name, "Apple Inc.");
                let n = bundle.history.bars.len();
                assert_eq!(bundle.sma_fast.len(), n);
                assert_eq!(bundle.sma_slow.len(), n);
                let q = bundle.quote.expect("quote from bars");
                assert_eq!(q.price, bundle.history.bars.last().unwrap().close);
            }
            other => panic!("expected HistoryReady, got {other:?}"),
        }

        tx.send(WorkerCommand::Shutdown).unwrap();
        handle.join().unwrap();
    }

    #[test]
    fn unknown_symbol_reports_a_failure() {
        let (tx, rx, handle) = spawn();
        tx.send(WorkerCommand::LoadHistory {
            generation: 1,
            symbol: "ZZZT".to_string(),
            years: 1,
        })
        .unwrap();

        match recv(&rx) {
            WorkerResponse::HistoryFailed {
                generation,
                symbol,
                error,
            } => {
                assert_eq!(generation, 1);
                assert_eq!(symbol, "ZZZT");
                assert!(error.contains("ZZZT"));
            }
            other => panic!("expected HistoryFailed, got {other:?}"),
        }

        tx.send(WorkerCommand::Shutdown).unwrap();
        handle.join().unwrap();
    }

    #[test]
    fn quote_refresh_covers_requested_symbols() {
        let (tx, rx, handle) = spawn();
        tx.send(WorkerCommand::RefreshQuotes {
            generation: 9,
            symbols: vec!["AAPL".to_string(), "MSFT".to_string(), "ZZZT".to_string()],
        })
        .unwrap();

        match recv(&rx) {
            WorkerResponse::QuotesReady { generation, quotes } => {
                assert_eq!(generation, 9);
                // The unknown symbol is skipped, not an error.
                assert_eq!(quotes.len(), 2);
                assert!(quotes.iter().any(|q| q.symbol == "AAPL"));
                assert!(quotes.iter().any(|q| q.symbol == "MSFT"));
            }
            other => panic!("expected QuotesReady, got {other:?}"),
        }

        tx.send(WorkerCommand::Shutdown).unwrap();
        handle.join().unwrap();
    }

    #[test]
    fn search_matches_prefix_and_name() {
        let (tx, rx, handle) = spawn();
        tx.send(WorkerCommand::Search {
            generation: 2,
            query: "micro".to_string(),
        })
        .unwrap();

        match recv(&rx) {
            WorkerResponse::SearchResults {
                generation,
                query,
                matches,
            } => {
                assert_eq!(generation, 2);
                assert_eq!(query, "micro");
                // "Microsoft Corp." and "Advanced Micro Devices".
                assert_eq!(matches.len(), 2);
                assert!(matches.iter().any(|h| h.symbol == "MSFT"));
                assert!(matches.iter().any(|h| h.symbol == "AMD"));
            }
            other => panic!("expected SearchResults, got {other:?}"),
        }

        tx.send(WorkerCommand::Shutdown).unwrap();
        handle.join().unwrap();
    }
}

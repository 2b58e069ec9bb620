//! History sources and structured error types.
//!
//! The HistorySource trait abstracts over where bars come from (local CSV
//! files, the synthetic generator) so the front-ends can swap implementations
//! and tests can mock. The loader sits above the sources and owns the
//! fallback policy: a failed CSV read degrades silently to synthetic data,
//! only an unknown symbol surfaces as an error.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::csv_source::CsvSource;
use crate::data::synthetic::{generate, symbol_seed, SynthConfig};
use crate::data::universe::Universe;
use crate::domain::{Bar, Quote};

/// Structured error types for data operations.
///
/// Displayable in both CLI and TUI contexts.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("malformed bar at line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("symbol not found: {symbol}")]
    UnknownSymbol { symbol: String },

    #[error("history is empty")]
    Empty,
}

/// Where a loaded series came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataOrigin {
    CsvImport,
    Synthetic,
}

impl DataOrigin {
    /// Short label for chart headers and table columns.
    pub fn label(&self) -> &'static str {
        match self {
            DataOrigin::CsvImport => "CSV",
            DataOrigin::Synthetic => "SYNTH",
        }
    }
}

/// A loaded daily series with provenance.
#[derive(Debug, Clone)]
pub struct History {
    pub symbol: String,
    pub bars: Vec<Bar>,
    pub origin: DataOrigin,
}

/// Trait for history sources.
pub trait HistorySource: Send + Sync {
    /// Human-readable name of this source.
    fn name(&self) -> &str;

    /// Fetch up to `years` of daily bars for a symbol, oldest first.
    fn fetch(&self, symbol: &str, years: u32) -> Result<Vec<Bar>, HistoryError>;
}

/// History loader with the workbench fallback policy.
///
/// Symbols resolve against the universe; when a CSV directory is configured
/// and holds a file for the symbol it wins, otherwise the synthetic generator
/// produces a series targeting the listing's reference price. Per-symbol
/// generator seeds derive from the master seed, so two loads of the same
/// symbol in one session agree.
pub struct HistoryLoader {
    universe: Universe,
    csv: Option<CsvSource>,
    master_seed: u64,
}

impl HistoryLoader {
    pub fn new(universe: Universe, master_seed: u64) -> Self {
        Self {
            universe,
            csv: None,
            master_seed,
        }
    }

    /// Prefer `SYMBOL.csv` files from this directory over synthetic data.
    pub fn with_csv_dir(mut self, dir: PathBuf) -> Self {
        self.csv = Some(CsvSource::new(dir));
        self
    }

    pub fn universe(&self) -> &Universe {
        &self.universe
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    /// Load a series for a symbol. CSV failures fall through to synthetic;
    /// only a symbol absent from both the CSV directory and the universe is
    /// an error.
    pub fn load(&self, symbol: &str, years: u32) -> Result<History, HistoryError> {
        let sym = symbol.to_uppercase();
        if let Some(csv) = &self.csv {
            if let Ok(bars) = csv.fetch(&sym, years) {
                return Ok(History {
                    symbol: sym,
                    bars,
                    origin: DataOrigin::CsvImport,
                });
            }
        }
        let listing =
            self.universe
                .get(&sym)
                .ok_or_else(|| HistoryError::UnknownSymbol {
                    symbol: sym.clone(),
                })?;
        let cfg = SynthConfig::new(
            listing.base_price,
            years,
            symbol_seed(self.master_seed, &sym),
        );
        Ok(History {
            symbol: sym,
            bars: generate(&cfg),
            origin: DataOrigin::Synthetic,
        })
    }

    /// Derive a quote from the most recent year of data.
    pub fn quote(&self, symbol: &str) -> Result<Quote, HistoryError> {
        let history = self.load(symbol, 1)?;
        let name = self
            .universe
            .get(&history.symbol)
            .map(|l| l.name.clone())
            .unwrap_or_default();
        Quote::from_bars(&history.symbol, &name, &history.bars).ok_or(HistoryError::Empty)
    }
}

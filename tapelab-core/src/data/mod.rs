//! Data layer: symbol universe, history sources, synthetic generation.

pub mod csv_source;
pub mod source;
pub mod synthetic;
pub mod universe;

pub use csv_source::{read_bars, write_bars, write_bars_to, CsvSource};
pub use source::{DataOrigin, History, HistoryError, HistoryLoader, HistorySource};
pub use synthetic::{generate, symbol_seed, SynthConfig, BARS_PER_YEAR, MAX_YEARS, MIN_YEARS};
pub use universe::{Listing, Universe};

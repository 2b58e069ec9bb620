//! Symbol universe — the set of chartable symbols with display names and
//! reference prices.
//!
//! Stored as a TOML config file mapping symbol → listing. The built-in
//! universe covers ten liquid US names so the workbench is useful with no
//! configuration at all; the reference price anchors the synthetic generator
//! when no local data exists for a symbol.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// One listed symbol: company name plus the price the synthetic series
/// converges to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub name: String,
    pub base_price: f64,
}

/// The complete symbol universe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Universe {
    pub symbols: BTreeMap<String, Listing>,
}

impl Universe {
    /// Load a universe from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, String> {
        let content =
            std::fs::read_to_string(path).map_err(|e| format!("read universe file: {e}"))?;
        Self::from_toml(&content)
    }

    /// Parse a universe from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| format!("parse universe TOML: {e}"))
    }

    /// Serialize the universe to TOML.
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("serialize universe: {e}"))
    }

    /// Look up a listing by symbol (case-insensitive).
    pub fn get(&self, symbol: &str) -> Option<&Listing> {
        self.symbols.get(&symbol.to_uppercase())
    }

    /// All symbols in alphabetical order.
    pub fn symbols(&self) -> impl Iterator<Item = (&str, &Listing)> {
        self.symbols.iter().map(|(s, l)| (s.as_str(), l))
    }

    /// Number of listings.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Case-insensitive search: symbol prefix match or name substring match.
    pub fn search(&self, query: &str) -> Vec<(&str, &Listing)> {
        let q = query.trim().to_uppercase();
        if q.is_empty() {
            return self.symbols().collect();
        }
        self.symbols()
            .filter(|(sym, listing)| {
                sym.starts_with(&q) || listing.name.to_uppercase().contains(&q)
            })
            .collect()
    }

    /// Built-in ten-symbol US universe.
    pub fn builtin() -> Self {
        let entries = [
            ("AAPL", "Apple Inc.", 189.45),
            ("MSFT", "Microsoft Corp.", 378.90),
            ("NVDA", "NVIDIA Corp.", 721.28),
            ("TSLA", "Tesla Inc.", 213.65),
            ("AMZN", "Amazon.com Inc.", 196.40),
            ("GOOGL", "Alphabet Inc.", 172.30),
            ("META", "Meta Platforms Inc.", 492.80),
            ("SPY", "SPDR S&P 500 ETF", 583.12),
            ("QQQ", "Invesco QQQ Trust", 505.44),
            ("AMD", "Advanced Micro Devices", 178.50),
        ];
        let symbols = entries
            .into_iter()
            .map(|(sym, name, base_price)| {
                (
                    sym.to_string(),
                    Listing {
                        name: name.to_string(),
                        base_price,
                    },
                )
            })
            .collect();
        Self { symbols }
    }
}

impl Default for Universe {
    fn default() -> Self {
        Self::builtin()
    }
}

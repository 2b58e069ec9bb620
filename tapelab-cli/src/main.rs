//! TapeLab CLI — synthetic series, breakout scans, and quotes.
//!
//! Commands:
//! - `generate` — emit a deterministic synthetic OHLCV series as CSV or JSON
//! - `scan` — run the breakout detector over one symbol or the whole universe
//! - `quote` — print the latest derived quote for a symbol
//! - `universe` — list the symbol universe

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use std::io;
use std::path::{Path, PathBuf};
use tapelab_core::data::{
    generate, symbol_seed, write_bars_to, History, HistoryLoader, SynthConfig, Universe,
};
use tapelab_core::indicators::SLOW_SMA_PERIOD;
use tapelab_core::render::format_volume;
use tapelab_core::scan::{scan_series, BreakoutDirection, BreakoutEvent};

/// Master seed used when --seed is omitted; the TUI pins the same value, so
/// both front-ends replay the same tape.
const DEFAULT_SEED: u64 = 42;

#[derive(Parser)]
#[command(
    name = "tapelab",
    about = "TapeLab CLI — synthetic market data and breakout scanning"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Emit a deterministic synthetic OHLCV series.
    Generate {
        /// Symbol to generate (e.g., AAPL).
        #[arg(long)]
        symbol: String,

        /// Span in calendar years (clamped to 1..=10).
        #[arg(long, default_value_t = 10)]
        years: u32,

        /// Final close price. Defaults to the listing's reference price.
        #[arg(long)]
        target: Option<f64>,

        /// Master seed for the synthetic tape.
        #[arg(long, default_value_t = DEFAULT_SEED)]
        seed: u64,

        /// Series end date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        anchor: Option<String>,

        /// Output format: csv, json.
        #[arg(long, default_value = "csv")]
        format: String,

        /// Write to this file instead of stdout.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Run the breakout detector and report events.
    Scan {
        /// Symbol to scan.
        #[arg(long)]
        symbol: Option<String>,

        /// Scan every symbol in the universe in parallel.
        #[arg(long, default_value_t = false)]
        all: bool,

        /// Span in calendar years (clamped to 1..=10).
        #[arg(long, default_value_t = 10)]
        years: u32,

        /// Master seed for the synthetic tape.
        #[arg(long, default_value_t = DEFAULT_SEED)]
        seed: u64,

        /// Directory of SYMBOL.csv files that take precedence over synthetic data.
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Reference SMA period for the detector.
        #[arg(long, default_value_t = SLOW_SMA_PERIOD)]
        sma_period: usize,

        /// Emit JSON instead of a table.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print the latest quote derived for a symbol.
    Quote {
        /// Symbol to quote (e.g., NVDA).
        #[arg(long)]
        symbol: String,

        /// Master seed for the synthetic tape.
        #[arg(long, default_value_t = DEFAULT_SEED)]
        seed: u64,
    },
    /// List the symbol universe.
    Universe {
        /// Universe TOML file. Defaults to the built-in ten-symbol list.
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            symbol,
            years,
            target,
            seed,
            anchor,
            format,
            out,
        } => run_generate(&symbol, years, target, seed, anchor, &format, out),
        Commands::Scan {
            symbol,
            all,
            years,
            seed,
            csv,
            sma_period,
            json,
        } => run_scan(symbol, all, years, seed, csv, sma_period, json),
        Commands::Quote { symbol, seed } => run_quote(&symbol, seed),
        Commands::Universe { file } => run_universe(file.as_deref()),
    }
}

fn run_generate(
    symbol: &str,
    years: u32,
    target: Option<f64>,
    seed: u64,
    anchor: Option<String>,
    format: &str,
    out: Option<PathBuf>,
) -> Result<()> {
    let sym = symbol.to_uppercase();

    let target_price = match target {
        Some(price) => price,
        None => {
            Universe::builtin()
                .get(&sym)
                .ok_or_else(|| {
                    anyhow::anyhow!("symbol not in universe: {sym}. Pass --target to generate it anyway")
                })?
                .base_price
        }
    };

    let anchor_date = anchor
        .as_deref()
        .map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .transpose()
        .context("invalid --anchor date, expected YYYY-MM-DD")?;

    let cfg = match anchor_date {
        Some(date) => SynthConfig::anchored(target_price, years, symbol_seed(seed, &sym), date),
        None => SynthConfig::new(target_price, years, symbol_seed(seed, &sym)),
    };
    let bars = generate(&cfg);

    match format {
        "csv" => match &out {
            Some(path) => {
                let file = std::fs::File::create(path)
                    .with_context(|| format!("create {}", path.display()))?;
                write_bars_to(file, &bars)?;
            }
            None => write_bars_to(io::stdout().lock(), &bars)?,
        },
        "json" => {
            let payload = serde_json::to_string_pretty(&bars)?;
            match &out {
                Some(path) => std::fs::write(path, payload)
                    .with_context(|| format!("write {}", path.display()))?,
                None => println!("{payload}"),
            }
        }
        other => bail!("unknown format '{other}'. Valid: csv, json"),
    }

    if let Some(path) = out {
        println!("Wrote {} bars for {sym} to {}", bars.len(), path.display());
    }

    Ok(())
}

fn run_scan(
    symbol: Option<String>,
    all: bool,
    years: u32,
    seed: u64,
    csv: Option<PathBuf>,
    sma_period: usize,
    json: bool,
) -> Result<()> {
    if all && symbol.is_some() {
        bail!("--symbol and --all are mutually exclusive");
    }
    if !all && symbol.is_none() {
        bail!("one of --symbol or --all is required");
    }
    if sma_period < 2 {
        bail!("--sma-period must be at least 2");
    }

    let mut loader = HistoryLoader::new(Universe::builtin(), seed);
    if let Some(dir) = csv {
        loader = loader.with_csv_dir(dir);
    }

    match symbol {
        Some(sym) => scan_symbol(&loader, &sym, years, sma_period, json),
        None => scan_universe(&loader, years, sma_period, json),
    }
}

fn scan_symbol(
    loader: &HistoryLoader,
    symbol: &str,
    years: u32,
    sma_period: usize,
    json: bool,
) -> Result<()> {
    let history = loader.load(symbol, years)?;
    let events = scan_series(&history.bars, sma_period);

    if json {
        let payload = serde_json::json!({
            "symbol": history.symbol,
            "origin": history.origin.label(),
            "bars": history.bars.len(),
            "sma_period": sma_period,
            "events": events,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    println!(
        "Scan: {} ({} bars, {}, SMA {})",
        history.symbol,
        history.bars.len(),
        history.origin.label(),
        sma_period
    );

    if events.is_empty() {
        println!("No breakout events.");
        return Ok(());
    }

    println!();
    println!("{:<12} {:<5} {:>10}  {}", "Date", "Dir", "Price", "Label");
    println!("{}", "-".repeat(44));
    for event in &events {
        println!(
            "{:<12} {:<5} {:>10.2}  {}",
            event.date.to_string(),
            event.direction.label(),
            event.price,
            event.label.as_deref().unwrap_or("-"),
        );
    }
    println!();
    println!("{} event(s).", events.len());

    Ok(())
}

/// Per-symbol result row for a universe-wide scan.
struct ScanRow {
    symbol: String,
    origin: &'static str,
    bars: usize,
    bulls: usize,
    bears: usize,
    last: Option<BreakoutEvent>,
}

impl ScanRow {
    fn new(history: History, events: Vec<BreakoutEvent>) -> Self {
        let bulls = events
            .iter()
            .filter(|e| e.direction == BreakoutDirection::Bull)
            .count();
        Self {
            symbol: history.symbol,
            origin: history.origin.label(),
            bars: history.bars.len(),
            bulls,
            bears: events.len() - bulls,
            last: events.into_iter().last(),
        }
    }
}

fn scan_universe(loader: &HistoryLoader, years: u32, sma_period: usize, json: bool) -> Result<()> {
    let symbols: Vec<String> = loader
        .universe()
        .symbols()
        .map(|(sym, _)| sym.to_string())
        .collect();

    let rows: Result<Vec<ScanRow>> = symbols
        .par_iter()
        .map(|sym| {
            let history = loader.load(sym, years)?;
            let events = scan_series(&history.bars, sma_period);
            Ok(ScanRow::new(history, events))
        })
        .collect();
    let rows = rows?;

    if json {
        let payload: Vec<serde_json::Value> = rows
            .iter()
            .map(|row| {
                serde_json::json!({
                    "symbol": row.symbol,
                    "origin": row.origin,
                    "bars": row.bars,
                    "bull": row.bulls,
                    "bear": row.bears,
                    "last_event": row.last,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    println!(
        "Universe scan: {} symbols ({} years, SMA {})",
        rows.len(),
        years,
        sma_period
    );
    println!();
    println!(
        "{:<8} {:<7} {:>6} {:>5} {:>5}  {}",
        "Symbol", "Origin", "Bars", "Bull", "Bear", "Last Event"
    );
    println!("{}", "-".repeat(52));
    for row in &rows {
        let last = row
            .last
            .as_ref()
            .map(|e| format!("{} {}", e.date, e.direction.label()))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<8} {:<7} {:>6} {:>5} {:>5}  {}",
            row.symbol, row.origin, row.bars, row.bulls, row.bears, last
        );
    }

    Ok(())
}

fn run_quote(symbol: &str, seed: u64) -> Result<()> {
    let loader = HistoryLoader::new(Universe::builtin(), seed);
    let quote = loader.quote(symbol)?;

    println!("{} ({})", quote.symbol, quote.name);
    println!("Price:       {:.2}", quote.price);
    println!(
        "Change:      {:+.2} ({:+.2}%)",
        quote.change, quote.change_pct
    );
    println!("Open:        {:.2}", quote.open);
    println!("High:        {:.2}", quote.high);
    println!("Low:         {:.2}", quote.low);
    println!("Prev Close:  {:.2}", quote.prev_close);
    println!("Volume:      {}", format_volume(quote.volume));
    println!("As of:       {}", quote.as_of);

    Ok(())
}

fn run_universe(file: Option<&Path>) -> Result<()> {
    let universe = match file {
        Some(path) => Universe::from_file(path).map_err(anyhow::Error::msg)?,
        None => Universe::builtin(),
    };

    println!("{:<8} {:<28} {:>10}", "Symbol", "Name", "Base");
    println!("{}", "-".repeat(48));
    for (symbol, listing) in universe.symbols() {
        println!("{:<8} {:<28} {:>10.2}", symbol, listing.name, listing.base_price);
    }
    println!();
    println!("{} symbol(s).", universe.len());

    Ok(())
}

//! TapeLab Core — market data, indicators, breakout scanning, chart engine.
//!
//! This crate contains everything below the UI:
//! - Domain types (daily bars, quotes) and sanity predicates
//! - Deterministic synthetic OHLCV generator with regime drift and
//!   earnings shocks
//! - CSV-backed history source with synthetic fallback
//! - Simple-moving-average engine over full histories
//! - SMA-cross and consolidation breakout detector
//! - Viewport controller (presets, wheel zoom, drag pan)
//! - Backend-neutral candlestick renderer

pub mod data;
pub mod domain;
pub mod indicators;
pub mod render;
pub mod scan;
pub mod view;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: everything the TUI worker thread ships across
    /// channels is Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        // Domain types
        require_send::<domain::Bar>();
        require_sync::<domain::Bar>();
        require_send::<domain::Quote>();
        require_sync::<domain::Quote>();

        // Data pipeline
        require_send::<data::History>();
        require_sync::<data::History>();
        require_send::<data::HistoryError>();
        require_sync::<data::HistoryError>();
        require_send::<data::HistoryLoader>();
        require_sync::<data::HistoryLoader>();
        require_send::<data::Listing>();
        require_sync::<data::Listing>();
        require_send::<data::Universe>();
        require_sync::<data::Universe>();
        require_send::<data::SynthConfig>();
        require_sync::<data::SynthConfig>();

        // Scan results
        require_send::<scan::BreakoutEvent>();
        require_sync::<scan::BreakoutEvent>();
        require_send::<scan::BreakoutDirection>();
        require_sync::<scan::BreakoutDirection>();

        // View state persisted and mutated on the UI thread
        require_send::<view::ViewState>();
        require_sync::<view::ViewState>();
        require_send::<view::Viewport>();
        require_sync::<view::Viewport>();
        require_send::<view::RangePreset>();
        require_sync::<view::RangePreset>();
    }

    /// Architecture contract: the renderer only sees `&mut dyn Surface`.
    ///
    /// Backends (terminal cells, the recording surface, anything else)
    /// plug in behind the trait object; the chart pass cannot reach a
    /// concrete backend. If `draw_chart` ever grows a concrete surface
    /// parameter, this stops compiling.
    #[test]
    fn renderer_is_backend_neutral() {
        fn _check_trait_object_builds(
            surface: &mut dyn render::Surface,
            cfg: &view::LayoutConfig,
            content: &render::ChartContent,
        ) -> Option<view::ChartLayout> {
            render::draw_chart(surface, cfg, content)
        }
    }

    /// Architecture contract: history sources are object-safe and can be
    /// shared with the worker thread.
    #[test]
    fn history_sources_are_worker_safe() {
        fn _check_trait_object_builds(
            source: &dyn data::HistorySource,
            symbol: &str,
        ) -> Result<Vec<domain::Bar>, data::HistoryError> {
            source.fetch(symbol, 1)
        }

        fn require_send_sync<T: Send + Sync + ?Sized>() {}
        require_send_sync::<dyn data::HistorySource>();
    }
}

//! App state persistence — JSON save/load across restarts.

use std::path::Path;

use serde::{Deserialize, Serialize};

use tapelab_core::render::OverlayToggles;
use tapelab_core::view::RangePreset;

use crate::app::{AppState, Panel, YEAR_CHOICES};
use crate::theme::ThemeKind;

/// Serializable subset of app state that persists across restarts.
#[derive(Debug, Serialize, Deserialize)]
pub struct PersistedState {
    pub symbol: String,
    pub years: u32,
    pub preset: RangePreset,
    pub overlays: OverlayToggles,
    pub theme: ThemeKind,
    pub active_panel: Panel,
}

impl Default for PersistedState {
    fn default() -> Self {
        Self {
            symbol: String::new(),
            years: 10,
            preset: RangePreset::default(),
            overlays: OverlayToggles::default(),
            theme: ThemeKind::default(),
            active_panel: Panel::Chart,
        }
    }
}

/// Load persisted state from disk. Returns defaults if file is missing or corrupt.
pub fn load(path: &Path) -> PersistedState {
    match std::fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
        Err(_) => PersistedState::default(),
    }
}

/// Save persisted state to disk. Creates parent directories if needed.
pub fn save(path: &Path, state: &PersistedState) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(state)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Extract persisted state from AppState.
pub fn extract(app: &AppState) -> PersistedState {
    PersistedState {
        symbol: app.chart.symbol.clone(),
        years: app.chart.years,
        preset: app.chart.view.preset(),
        overlays: app.chart.overlays,
        theme: app.theme_kind,
        active_panel: app.active_panel,
    }
}

/// Apply persisted state to AppState. Symbols no longer in the universe and
/// history depths outside the cycle are ignored rather than trusted.
pub fn apply(app: &mut AppState, state: PersistedState) {
    if let Some(listing) = app.universe.get(&state.symbol) {
        app.chart.company = listing.name.clone();
        app.chart.symbol = state.symbol;
    }
    if YEAR_CHOICES.contains(&state.years) {
        app.chart.years = state.years;
    }
    app.chart.view.select_preset(state.preset);
    app.chart.overlays = state.overlays;
    app.theme_kind = state.theme;
    app.active_panel = state.active_panel;
}

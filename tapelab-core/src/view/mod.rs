//! Viewport selection and chart geometry.
//!
//! [`ViewState`] decides *which* bars are visible (presets, wheel zoom,
//! drag pan); [`ChartLayout`] decides *where* each visible bar lands on
//! the surface. Both are pure over their inputs, so the render loop can
//! recompute them every frame.

pub mod layout;
pub mod preset;
pub mod viewport;

pub use layout::{
    nice_step, place_box, x_labels, ChartLayout, LayoutConfig, RectF, PRICE_PAD_RATIO,
    VOLUME_SHARE, X_LABEL_BUDGET_PX, Y_TICK_DIVISIONS,
};
pub use preset::RangePreset;
pub use viewport::{
    DragOrigin, ViewState, Viewport, MIN_VISIBLE_BARS, ZOOM_IN_FACTOR, ZOOM_OUT_FACTOR,
};

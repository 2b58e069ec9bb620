//! Domain types shared across the charting core.

pub mod bar;
pub mod quote;

pub use bar::{is_weekend, series_is_ordered, Bar};
pub use quote::{round2, Quote};

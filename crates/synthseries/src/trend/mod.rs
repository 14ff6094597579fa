//! Trend factors - growth over the date range
//!
//! Trend factors scale a row by how far its date lies from the start of the
//! generated range, optionally with a different slope per feature value.

pub mod linear;

pub use linear::{LinearTrend, TrendParams};

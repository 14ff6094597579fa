//! Core trait definitions for factors.
//!
//! All factors implement the [`Factor`] trait. A factor returns a
//! multiplicative ratio for one (date, combination) observation; the
//! generator multiplies the ratios of every active factor into the base
//! amount, so `1.0` is the neutral ratio.

use crate::{Combination, FactorCategory, FeatureSpace, Result, SeriesRng};
use chrono::NaiveDate;

/// The point of the series a factor is evaluated at.
#[derive(Debug, Clone, Copy)]
pub struct Observation<'a> {
    /// Calendar date of the row.
    pub date: NaiveDate,
    /// First date of the generated range.
    pub start: NaiveDate,
    /// Zero-based position of `date` in the range.
    pub position: usize,
    /// Feature assignment of the row.
    pub combination: &'a Combination<'a>,
}

impl<'a> Observation<'a> {
    /// Calendar days elapsed since the start of the range.
    pub fn days_since_start(&self) -> i64 {
        (self.date - self.start).num_days()
    }

    /// Value of `feature` in this row, or a missing-feature error tagged with `factor`.
    pub fn feature(&self, factor: &str, feature: &str) -> Result<&'a str> {
        self.combination
            .get(feature)
            .ok_or_else(|| crate::GeneratorError::missing_feature(factor, feature))
    }
}

/// A pure adjustment applied to every row of a generated series.
///
/// Factors are built fresh from configuration for each run. They are
/// `Send + Sync` because rows are evaluated in parallel.
pub trait Factor: Send + Sync + std::fmt::Debug {
    /// Column name tagging this factor's contribution.
    ///
    /// Should be snake_case and unique within one run.
    fn column_name(&self) -> &str;

    /// Human-readable description of the effect.
    fn description(&self) -> &str;

    /// Category, which fixes the position of the factor in the fold order.
    fn category(&self) -> FactorCategory;

    /// Features that must be present in every combination.
    fn required_features(&self) -> Vec<&str> {
        Vec::new()
    }

    /// One-time setup before any row is evaluated.
    ///
    /// Randomized factors draw their per-run state here; factors backed by
    /// reference data validate it against the declared feature values.
    fn prepare(&mut self, _space: &FeatureSpace, _rng: &mut SeriesRng) -> Result<()> {
        Ok(())
    }

    /// Multiplicative ratio for one observation.
    fn apply(&self, observation: &Observation<'_>, rng: &mut SeriesRng) -> Result<f64>;
}

/// Check that `value` is a finite number, naming `what` in the error.
pub(crate) fn ensure_finite(what: &str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(crate::GeneratorError::configuration(format!(
            "{what} must be finite, got {value}"
        )))
    }
}

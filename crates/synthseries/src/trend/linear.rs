//! Linear trend factor.

use crate::{
    FeatureSpace, Result, SeriesRng,
    registry::FactorCategory,
    traits::{Factor, Observation, ensure_finite},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const DAYS_PER_YEAR: f64 = 365.0;

/// Slope and intercept of a linear trend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendParams {
    /// Change in ratio per year elapsed since the start of the range
    pub coef: f64,
    /// Ratio on the first date of the range
    pub offset: f64,
}

impl TrendParams {
    /// Create trend parameters.
    pub const fn new(coef: f64, offset: f64) -> Self {
        Self { coef, offset }
    }

    /// Ratio after `years` have elapsed.
    pub fn ratio_at(&self, years: f64) -> f64 {
        self.offset + self.coef * years
    }
}

impl Default for TrendParams {
    fn default() -> Self {
        Self::new(0.0, 1.0)
    }
}

/// Linear trend over the date range.
///
/// The ratio is:
/// ```text
/// ratio = offset + coef * (days since range start / 365)
/// ```
///
/// When bound to a feature, each feature value can carry its own
/// [`TrendParams`]; values without an explicit pair use the default pair.
/// Without a feature the default pair applies to every row.
#[derive(Debug, Clone)]
pub struct LinearTrend {
    column_name: String,
    feature: Option<String>,
    default: TrendParams,
    per_value: HashMap<String, TrendParams>,
}

impl LinearTrend {
    /// Global trend with the given slope and intercept.
    pub fn new(coef: f64, offset: f64) -> Self {
        Self {
            column_name: "linear_trend".to_string(),
            feature: None,
            default: TrendParams::new(coef, offset),
            per_value: HashMap::new(),
        }
    }

    /// Trend keyed on `feature`, neutral until parameters are added.
    pub fn for_feature(feature: &str) -> Self {
        Self {
            feature: Some(feature.to_string()),
            ..Self::default()
        }
    }

    /// Parameters used for `value` of the bound feature.
    pub fn with_params(mut self, value: &str, params: TrendParams) -> Self {
        self.per_value.insert(value.to_string(), params);
        self
    }

    /// Parameters used when no per-value pair matches.
    pub fn with_default(mut self, params: TrendParams) -> Self {
        self.default = params;
        self
    }

    /// Override the column name.
    pub fn with_column_name(mut self, name: &str) -> Self {
        self.column_name = name.to_string();
        self
    }

    /// Parameters that apply to `value`.
    pub fn params_for(&self, value: Option<&str>) -> TrendParams {
        value
            .and_then(|v| self.per_value.get(v))
            .copied()
            .unwrap_or(self.default)
    }
}

impl Default for LinearTrend {
    fn default() -> Self {
        Self::new(0.0, 1.0)
    }
}

impl Factor for LinearTrend {
    fn column_name(&self) -> &str {
        &self.column_name
    }

    fn description(&self) -> &str {
        "Linear trend - offset plus coefficient times years since range start"
    }

    fn category(&self) -> FactorCategory {
        FactorCategory::Trend
    }

    fn required_features(&self) -> Vec<&str> {
        self.feature.as_deref().into_iter().collect()
    }

    fn prepare(&mut self, _space: &FeatureSpace, _rng: &mut SeriesRng) -> Result<()> {
        for params in std::iter::once(&self.default).chain(self.per_value.values()) {
            ensure_finite("trend coefficient", params.coef)?;
            ensure_finite("trend offset", params.offset)?;
        }
        Ok(())
    }

    fn apply(&self, observation: &Observation<'_>, _rng: &mut SeriesRng) -> Result<f64> {
        let value = match &self.feature {
            Some(feature) => Some(observation.feature(&self.column_name, feature)?),
            None => None,
        };
        let years = observation.days_since_start() as f64 / DAYS_PER_YEAR;
        Ok(self.params_for(value).ratio_at(years))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Combination, GeneratorError};
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use rstest::rstest;

    fn observe(days: i64, combination: &Combination<'_>) -> f64 {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let trend = LinearTrend::for_feature("product")
            .with_params("A", TrendParams::new(0.5, 1.0))
            .with_default(TrendParams::new(0.0, 2.0));
        let observation = Observation {
            date: start + chrono::Duration::days(days),
            start,
            position: days as usize,
            combination,
        };
        trend
            .apply(&observation, &mut SeriesRng::from_seed(0))
            .unwrap()
    }

    #[rstest]
    #[case::start(0, 1.0)]
    #[case::half_year(73, 1.1)]
    #[case::one_year(365, 1.5)]
    fn test_trend_per_value(#[case] days: i64, #[case] expected: f64) {
        let combination = Combination::from_pairs(vec![("product", "A")]);
        assert_relative_eq!(observe(days, &combination), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_unlisted_value_uses_default() {
        let combination = Combination::from_pairs(vec![("product", "B")]);
        assert_relative_eq!(observe(365, &combination), 2.0);
    }

    #[test]
    fn test_missing_feature_fails() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let combination = Combination::from_pairs(vec![("country", "NL")]);
        let observation = Observation {
            date: start,
            start,
            position: 0,
            combination: &combination,
        };
        let err = LinearTrend::for_feature("product")
            .apply(&observation, &mut SeriesRng::from_seed(0))
            .unwrap_err();
        assert!(matches!(err, GeneratorError::MissingFeature { .. }));
    }

    #[test]
    fn test_non_finite_params_are_rejected() {
        let mut trend = LinearTrend::new(f64::NAN, 1.0);
        let err = trend
            .prepare(&FeatureSpace::new(), &mut SeriesRng::from_seed(0))
            .unwrap_err();
        assert!(matches!(err, GeneratorError::Configuration(_)));
    }

    #[test]
    fn test_linear_trend_metadata() {
        let trend = LinearTrend::for_feature("product");
        assert_eq!(trend.column_name(), "linear_trend");
        assert_eq!(trend.category(), FactorCategory::Trend);
        assert_eq!(trend.required_features(), ["product"]);
        assert!(LinearTrend::default().required_features().is_empty());
    }
}

//! EU industry production factor.

use crate::{
    FeatureSpace, GeneratorError, Result, SeriesRng,
    reference::IndustryIndex,
    registry::FactorCategory,
    traits::{Factor, Observation, ensure_finite},
};
use std::sync::Arc;

/// Follows the monthly EU industry production index.
///
/// ```text
/// ratio = 1 + intensity * (index(month of date) / mean(index) - 1)
/// ```
///
/// An intensity of `0.0` is neutral and `1.0` tracks the index one to one.
#[derive(Debug, Clone)]
pub struct EuIndustryProductFactor {
    column_name: String,
    intensity: f64,
    index: Arc<IndustryIndex>,
    mean: f64,
}

impl EuIndustryProductFactor {
    /// Index-tracking factor scaled by `intensity`.
    pub fn new(intensity: f64, index: Arc<IndustryIndex>) -> Self {
        Self {
            column_name: "eu_industry_product_factor".to_string(),
            intensity,
            index,
            mean: 0.0,
        }
    }

    /// Override the column name.
    pub fn with_column_name(mut self, name: &str) -> Self {
        self.column_name = name.to_string();
        self
    }
}

impl Factor for EuIndustryProductFactor {
    fn column_name(&self) -> &str {
        &self.column_name
    }

    fn description(&self) -> &str {
        "EU industry production factor - monthly index relative to its mean"
    }

    fn category(&self) -> FactorCategory {
        FactorCategory::External
    }

    fn prepare(&mut self, _space: &FeatureSpace, _rng: &mut SeriesRng) -> Result<()> {
        ensure_finite("industry intensity", self.intensity)?;
        self.mean = match self.index.mean() {
            Some(mean) if mean.is_finite() && mean != 0.0 => mean,
            Some(_) => {
                return Err(GeneratorError::configuration(
                    "industry index mean must be finite and non-zero",
                ));
            }
            None => {
                return Err(GeneratorError::configuration("industry index is empty"));
            }
        };
        Ok(())
    }

    fn apply(&self, observation: &Observation<'_>, _rng: &mut SeriesRng) -> Result<f64> {
        let value = self
            .index
            .value_at(observation.date)
            .ok_or_else(|| GeneratorError::configuration("industry index is empty"))?;
        Ok(1.0 + self.intensity * (value / self.mean - 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Combination;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use rstest::rstest;

    fn index() -> Arc<IndustryIndex> {
        Arc::new(IndustryIndex::from_entries([
            ((2024, 1), 90.0),
            ((2024, 2), 110.0),
        ]))
    }

    #[rstest]
    #[case::below_mean(1, 1.0, 0.9)]
    #[case::above_mean(2, 1.0, 1.1)]
    #[case::double_intensity(2, 2.0, 1.2)]
    #[case::neutral(1, 0.0, 1.0)]
    fn test_index_ratio(#[case] month: u32, #[case] intensity: f64, #[case] expected: f64) {
        let mut factor = EuIndustryProductFactor::new(intensity, index());
        factor
            .prepare(&FeatureSpace::new(), &mut SeriesRng::from_seed(0))
            .unwrap();

        let date = NaiveDate::from_ymd_opt(2024, month, 10).unwrap();
        let combination = Combination::from_pairs(vec![]);
        let observation = Observation {
            date,
            start: date,
            position: 0,
            combination: &combination,
        };
        let ratio = factor
            .apply(&observation, &mut SeriesRng::from_seed(0))
            .unwrap();
        assert_relative_eq!(ratio, expected, epsilon = 1e-12);
    }

    #[test]
    fn test_empty_index_is_rejected() {
        let mut factor = EuIndustryProductFactor::new(1.0, Arc::new(IndustryIndex::default()));
        let err = factor
            .prepare(&FeatureSpace::new(), &mut SeriesRng::from_seed(0))
            .unwrap_err();
        assert!(matches!(err, GeneratorError::Configuration(_)));
    }
}

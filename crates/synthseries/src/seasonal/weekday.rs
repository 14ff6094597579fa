//! Day-of-week factor.

use crate::{
    FeatureSpace, Result, SeriesRng,
    registry::FactorCategory,
    traits::{Factor, Observation, ensure_finite},
};
use chrono::{Datelike, Weekday};

/// Day-of-week factor with one ratio per weekday.
///
/// Every weekday starts at the neutral ratio `1.0`. The common dashboard
/// setting is a weekend uplift:
///
/// ```
/// use synthseries::WeekdayFactor;
/// use chrono::Weekday;
///
/// let factor = WeekdayFactor::weekend(1.4);
/// assert_eq!(factor.ratio_for(Weekday::Sat), 1.4);
/// assert_eq!(factor.ratio_for(Weekday::Wed), 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct WeekdayFactor {
    column_name: String,
    ratios: [f64; 7],
}

impl WeekdayFactor {
    /// Apply `ratio` on Saturdays and Sundays, `1.0` otherwise.
    pub fn weekend(ratio: f64) -> Self {
        Self::default()
            .with_ratio(Weekday::Sat, ratio)
            .with_ratio(Weekday::Sun, ratio)
    }

    /// Set the ratio of one weekday.
    pub fn with_ratio(mut self, weekday: Weekday, ratio: f64) -> Self {
        self.ratios[weekday.num_days_from_monday() as usize] = ratio;
        self
    }

    /// Override the column name.
    pub fn with_column_name(mut self, name: &str) -> Self {
        self.column_name = name.to_string();
        self
    }

    /// Ratio applied on `weekday`.
    pub fn ratio_for(&self, weekday: Weekday) -> f64 {
        self.ratios[weekday.num_days_from_monday() as usize]
    }
}

impl Default for WeekdayFactor {
    fn default() -> Self {
        Self {
            column_name: "weekday_factor".to_string(),
            ratios: [1.0; 7],
        }
    }
}

impl Factor for WeekdayFactor {
    fn column_name(&self) -> &str {
        &self.column_name
    }

    fn description(&self) -> &str {
        "Weekday factor - fixed ratio per day of the week"
    }

    fn category(&self) -> FactorCategory {
        FactorCategory::Seasonal
    }

    fn prepare(&mut self, _space: &FeatureSpace, _rng: &mut SeriesRng) -> Result<()> {
        for ratio in self.ratios {
            ensure_finite("weekday ratio", ratio)?;
        }
        Ok(())
    }

    fn apply(&self, observation: &Observation<'_>, _rng: &mut SeriesRng) -> Result<f64> {
        Ok(self.ratio_for(observation.date.weekday()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Combination;
    use chrono::NaiveDate;
    use rstest::rstest;

    #[rstest]
    #[case::friday(5, 1.0)]
    #[case::saturday(6, 1.5)]
    #[case::sunday(7, 1.5)]
    #[case::monday(8, 1.0)]
    fn test_weekend_ratio(#[case] day: u32, #[case] expected: f64) {
        // 2024-01-06 is a Saturday
        let date = NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
        let combination = Combination::from_pairs(vec![]);
        let observation = Observation {
            date,
            start: date,
            position: 0,
            combination: &combination,
        };
        let ratio = WeekdayFactor::weekend(1.5)
            .apply(&observation, &mut SeriesRng::from_seed(0))
            .unwrap();
        assert_eq!(ratio, expected);
    }

    #[test]
    fn test_single_weekday_override() {
        let factor = WeekdayFactor::default().with_ratio(Weekday::Mon, 0.8);
        assert_eq!(factor.ratio_for(Weekday::Mon), 0.8);
        assert_eq!(factor.ratio_for(Weekday::Tue), 1.0);
    }

    #[test]
    fn test_weekday_metadata() {
        let factor = WeekdayFactor::default();
        assert_eq!(factor.column_name(), "weekday_factor");
        assert_eq!(factor.category(), FactorCategory::Seasonal);
        assert!(factor.required_features().is_empty());
    }
}

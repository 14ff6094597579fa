//! Public-holiday factor.

use crate::{
    FeatureSpace, GeneratorError, Result, SeriesRng,
    reference::HolidayCalendar,
    registry::FactorCategory,
    traits::{Factor, Observation, ensure_finite},
};
use std::collections::HashMap;
use std::sync::Arc;

/// Uplift on the public holidays of the row's country.
///
/// ```text
/// ratio = special_holidays[name]  if the holiday has an override
///       = intensity               on any other public holiday
///       = 1.0                     otherwise
/// ```
///
/// The country comes from the bound feature of each row, so every value
/// of that feature must be known to the calendar.
#[derive(Debug, Clone)]
pub struct HolidayFactor {
    column_name: String,
    country_feature: String,
    intensity: f64,
    special_holidays: HashMap<String, f64>,
    calendar: Arc<HolidayCalendar>,
}

impl HolidayFactor {
    /// Holiday uplift of `intensity`, reading the country from `country_feature`.
    pub fn new(country_feature: &str, intensity: f64, calendar: Arc<HolidayCalendar>) -> Self {
        Self {
            column_name: "holiday_factor".to_string(),
            country_feature: country_feature.to_string(),
            intensity,
            special_holidays: HashMap::new(),
            calendar,
        }
    }

    /// Use `ratio` instead of the intensity on the holiday called `name`.
    pub fn with_special_holiday(mut self, name: &str, ratio: f64) -> Self {
        self.special_holidays.insert(name.to_string(), ratio);
        self
    }

    /// Override the column name.
    pub fn with_column_name(mut self, name: &str) -> Self {
        self.column_name = name.to_string();
        self
    }

    /// Configured holiday intensity.
    pub const fn intensity(&self) -> f64 {
        self.intensity
    }
}

impl Factor for HolidayFactor {
    fn column_name(&self) -> &str {
        &self.column_name
    }

    fn description(&self) -> &str {
        "Holiday factor - uplift on public holidays of the row's country"
    }

    fn category(&self) -> FactorCategory {
        FactorCategory::Seasonal
    }

    fn required_features(&self) -> Vec<&str> {
        vec![self.country_feature.as_str()]
    }

    fn prepare(&mut self, space: &FeatureSpace, _rng: &mut SeriesRng) -> Result<()> {
        ensure_finite("holiday intensity", self.intensity)?;
        for ratio in self.special_holidays.values() {
            ensure_finite("special holiday ratio", *ratio)?;
        }

        let countries = space.values(&self.country_feature).unwrap_or_default();
        if let Some(unknown) = countries.iter().find(|c| !self.calendar.knows(c)) {
            return Err(GeneratorError::configuration(format!(
                "no holiday calendar for country '{unknown}'"
            )));
        }
        Ok(())
    }

    fn apply(&self, observation: &Observation<'_>, _rng: &mut SeriesRng) -> Result<f64> {
        let country = observation.feature(&self.column_name, &self.country_feature)?;
        let ratio = match self.calendar.holiday(country, observation.date) {
            Some(name) => self
                .special_holidays
                .get(name)
                .copied()
                .unwrap_or(self.intensity),
            None => 1.0,
        };
        Ok(ratio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Combination;
    use chrono::NaiveDate;
    use rstest::rstest;

    fn factor() -> HolidayFactor {
        HolidayFactor::new("country", 2.0, Arc::new(HolidayCalendar::new()))
            .with_special_holiday("Christmas Day", 5.0)
    }

    #[rstest]
    #[case::kings_day("NL", 2024, 4, 27, 2.0)]
    #[case::not_german("DE", 2024, 4, 27, 1.0)]
    #[case::christmas("DE", 2024, 12, 25, 5.0)]
    #[case::ordinary("NL", 2024, 3, 12, 1.0)]
    fn test_holiday_ratio(
        #[case] country: &str,
        #[case] y: i32,
        #[case] m: u32,
        #[case] d: u32,
        #[case] expected: f64,
    ) {
        let date = NaiveDate::from_ymd_opt(y, m, d).unwrap();
        let combination = Combination::from_pairs(vec![("country", country)]);
        let observation = Observation {
            date,
            start: date,
            position: 0,
            combination: &combination,
        };
        let ratio = factor()
            .apply(&observation, &mut SeriesRng::from_seed(0))
            .unwrap();
        assert_eq!(ratio, expected);
    }

    #[test]
    fn test_unknown_country_is_rejected() {
        let space = FeatureSpace::new()
            .with_feature("country", ["NL", "Atlantis"])
            .unwrap();
        let err = factor()
            .prepare(&space, &mut SeriesRng::from_seed(0))
            .unwrap_err();
        assert!(matches!(err, GeneratorError::Configuration(_)));
    }

    #[test]
    fn test_missing_country_feature() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let combination = Combination::from_pairs(vec![("product", "A")]);
        let observation = Observation {
            date,
            start: date,
            position: 0,
            combination: &combination,
        };
        let err = factor()
            .apply(&observation, &mut SeriesRng::from_seed(0))
            .unwrap_err();
        assert!(matches!(
            err,
            GeneratorError::MissingFeature { ref feature, .. } if feature == "country"
        ));
    }
}

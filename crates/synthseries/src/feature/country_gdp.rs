//! Country GDP factor.

use crate::{
    FeatureSpace, GeneratorError, Result, SeriesRng,
    reference::GdpTable,
    registry::FactorCategory,
    traits::{Factor, Observation},
};
use std::collections::HashMap;
use std::sync::Arc;

/// Level per country proportional to its GDP per capita.
///
/// ```text
/// ratio = gdp(country) / mean(gdp over declared countries)
/// ```
///
/// Normalising over the declared countries keeps the average level of the
/// series at the base amount whichever countries are selected.
#[derive(Debug, Clone)]
pub struct CountryGdpFactor {
    column_name: String,
    country_feature: String,
    table: Arc<GdpTable>,
    ratios: HashMap<String, f64>,
}

impl CountryGdpFactor {
    /// GDP factor reading the country from `country_feature`.
    pub fn new(country_feature: &str, table: Arc<GdpTable>) -> Self {
        Self {
            column_name: "country_gdp_factor".to_string(),
            country_feature: country_feature.to_string(),
            table,
            ratios: HashMap::new(),
        }
    }

    /// Override the column name.
    pub fn with_column_name(mut self, name: &str) -> Self {
        self.column_name = name.to_string();
        self
    }

    /// Ratio of `country` after [`prepare`](Factor::prepare).
    pub fn ratio(&self, country: &str) -> Option<f64> {
        self.ratios.get(country).copied()
    }
}

impl Factor for CountryGdpFactor {
    fn column_name(&self) -> &str {
        &self.column_name
    }

    fn description(&self) -> &str {
        "Country GDP factor - GDP per capita relative to the mean of the selected countries"
    }

    fn category(&self) -> FactorCategory {
        FactorCategory::Feature
    }

    fn required_features(&self) -> Vec<&str> {
        vec![self.country_feature.as_str()]
    }

    fn prepare(&mut self, space: &FeatureSpace, _rng: &mut SeriesRng) -> Result<()> {
        self.ratios.clear();
        let Some(countries) = space.values(&self.country_feature) else {
            return Ok(());
        };

        let mut gdps = Vec::with_capacity(countries.len());
        for country in countries {
            let gdp = self.table.gdp(country).ok_or_else(|| {
                GeneratorError::configuration(format!("no GDP reference for country '{country}'"))
            })?;
            gdps.push((country, gdp));
        }

        let mean = gdps.iter().map(|(_, g)| g).sum::<f64>() / gdps.len() as f64;
        if mean == 0.0 {
            return Err(GeneratorError::configuration(
                "mean GDP of the selected countries is zero",
            ));
        }
        self.ratios = gdps
            .into_iter()
            .map(|(country, gdp)| (country.clone(), gdp / mean))
            .collect();
        Ok(())
    }

    fn apply(&self, observation: &Observation<'_>, _rng: &mut SeriesRng) -> Result<f64> {
        let country = observation.feature(&self.column_name, &self.country_feature)?;
        self.ratio(country).ok_or_else(|| {
            GeneratorError::configuration(format!("country '{country}' was not prepared"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn table() -> Arc<GdpTable> {
        Arc::new(GdpTable::from_entries([
            ("Netherlands", 60_000.0),
            ("Germany", 40_000.0),
            ("France", 20_000.0),
        ]))
    }

    #[test]
    fn test_ratios_relative_to_selected_mean() {
        let space = FeatureSpace::new()
            .with_feature("country", ["Netherlands", "Germany"])
            .unwrap();
        let mut factor = CountryGdpFactor::new("country", table());
        factor
            .prepare(&space, &mut SeriesRng::from_seed(0))
            .unwrap();

        assert_relative_eq!(factor.ratio("Netherlands").unwrap(), 1.2);
        assert_relative_eq!(factor.ratio("Germany").unwrap(), 0.8);
        assert_eq!(factor.ratio("France"), None);
    }

    #[test]
    fn test_unknown_country_is_rejected() {
        let space = FeatureSpace::new()
            .with_feature("country", ["Netherlands", "Atlantis"])
            .unwrap();
        let err = CountryGdpFactor::new("country", table())
            .prepare(&space, &mut SeriesRng::from_seed(0))
            .unwrap_err();
        assert!(matches!(err, GeneratorError::Configuration(_)));
    }

    #[test]
    fn test_gdp_metadata() {
        let factor = CountryGdpFactor::new("country", table());
        assert_eq!(factor.column_name(), "country_gdp_factor");
        assert_eq!(factor.category(), FactorCategory::Feature);
        assert_eq!(factor.required_features(), ["country"]);
    }
}

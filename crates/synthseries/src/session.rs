//! Message-passing front between a form layer and the generator.
//!
//! The form layer sends a [`SessionEvent`] whenever the user changes
//! something; the session rebuilds the feature space and factors from the
//! new configuration, regenerates, and answers with the new table. A
//! configuration that fails leaves the last valid table in place.

use crate::{DashboardConfig, MultiplierCaches, ReferenceData, Result, ResultTable};
use std::sync::Arc;
use tracing::{debug, warn};

/// Input from the form layer.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Any configuration input changed
    ConfigurationChanged(DashboardConfig),
    /// The user asked for new randomness with the current configuration
    Reshuffle,
}

/// Generation state of one dashboard session.
#[derive(Debug, Default)]
pub struct Session {
    reference: ReferenceData,
    caches: MultiplierCaches,
    config: Option<DashboardConfig>,
    table: Option<Arc<ResultTable>>,
}

impl Session {
    /// Session over preloaded reference data.
    pub fn new(reference: ReferenceData) -> Self {
        Self {
            reference,
            ..Self::default()
        }
    }

    /// Handle one event and return the table to display.
    ///
    /// On failure the previous configuration and table stay current and the
    /// error is returned for the form layer to show.
    pub fn handle(&mut self, event: SessionEvent) -> Result<Arc<ResultTable>> {
        let (config, mut caches) = match event {
            SessionEvent::ConfigurationChanged(config) => (config, self.caches.detached()),
            SessionEvent::Reshuffle => {
                let Some(mut config) = self.config.clone() else {
                    return Err(crate::GeneratorError::configuration(
                        "nothing to reshuffle before the first configuration",
                    ));
                };
                config.seed = config.seed.wrapping_add(1);
                debug!(seed = config.seed, "reshuffling random factors");
                (config, MultiplierCaches::default())
            }
        };

        // Draws land in the staged caches and are committed only on success.
        match self.run(&config, &mut caches) {
            Ok(table) => {
                let table = Arc::new(table);
                self.caches = caches;
                self.config = Some(config);
                self.table = Some(Arc::clone(&table));
                Ok(table)
            }
            Err(err) => {
                warn!(error = %err, "rejected configuration, keeping last valid table");
                Err(err)
            }
        }
    }

    fn run(&self, config: &DashboardConfig, caches: &mut MultiplierCaches) -> Result<ResultTable> {
        let space = config.feature_space(&self.reference)?;
        let mut factors = config.factor_set(&self.reference, caches)?;
        config.generator()?.generate(&space, &mut factors)
    }

    /// Last successfully generated table.
    pub fn table(&self) -> Option<Arc<ResultTable>> {
        self.table.clone()
    }

    /// Configuration that produced [`table`](Self::table).
    pub const fn config(&self) -> Option<&DashboardConfig> {
        self.config.as_ref()
    }

    /// Reference data used by the session.
    pub const fn reference(&self) -> &ReferenceData {
        &self.reference
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FactorConfig, FeatureConfig, FeatureValues, GeneratorError};
    use chrono::NaiveDate;

    fn config() -> DashboardConfig {
        let mut config = DashboardConfig::new(
            100.0,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 7).unwrap(),
        );
        config.features.push(FeatureConfig {
            name: "product".to_string(),
            values: FeatureValues::Text("A,B".to_string()),
        });
        config.factors.push(FactorConfig::RandomFeature {
            feature: "product".to_string(),
            min: 0.5,
            max: 1.5,
        });
        config
    }

    fn product_levels(table: &ResultTable) -> Vec<f64> {
        table.rows().iter().take(2).map(|r| r.value).collect()
    }

    #[test]
    fn test_random_levels_stay_stable_across_edits() {
        let mut session = Session::default();
        let first = session
            .handle(SessionEvent::ConfigurationChanged(config()))
            .unwrap();

        let mut edited = config();
        edited.base_amount = 200.0;
        edited.factors.push(FactorConfig::WhiteNoise { stdev: 0.0 });
        let second = session
            .handle(SessionEvent::ConfigurationChanged(edited))
            .unwrap();

        let doubled: Vec<f64> = product_levels(&first).iter().map(|v| v * 2.0).collect();
        assert_eq!(product_levels(&second), doubled);
    }

    #[test]
    fn test_reshuffle_draws_new_levels() {
        let mut session = Session::default();
        let first = session
            .handle(SessionEvent::ConfigurationChanged(config()))
            .unwrap();
        let reshuffled = session.handle(SessionEvent::Reshuffle).unwrap();

        assert_ne!(product_levels(&first), product_levels(&reshuffled));
        assert_eq!(session.config().unwrap().seed, 1);
    }

    #[test]
    fn test_failed_configuration_keeps_last_table() {
        let mut session = Session::default();
        let good = session
            .handle(SessionEvent::ConfigurationChanged(config()))
            .unwrap();

        let mut bad = config();
        bad.end = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
        let err = session
            .handle(SessionEvent::ConfigurationChanged(bad))
            .unwrap_err();

        assert!(matches!(err, GeneratorError::InvalidRange(_)));
        assert_eq!(session.table().unwrap(), good);
        assert_eq!(session.config().unwrap().end, config().end);
    }

    #[test]
    fn test_failed_run_leaves_random_levels_untouched() {
        let mut session = Session::default();
        let first = session
            .handle(SessionEvent::ConfigurationChanged(config()))
            .unwrap();

        // Draws for a new value, then fails on the missing "country" feature.
        let mut failing = config();
        failing.features[0].values = FeatureValues::Text("A,B,C".to_string());
        failing.factors.push(FactorConfig::Holiday {
            country_feature: "country".to_string(),
            intensity: 2.0,
            special_holidays: Default::default(),
        });
        assert!(
            session
                .handle(SessionEvent::ConfigurationChanged(failing))
                .is_err()
        );

        let mut grown = config();
        grown.features[0].values = FeatureValues::Text("A,B,C".to_string());
        grown.seed = 99;
        let after = session
            .handle(SessionEvent::ConfigurationChanged(grown.clone()))
            .unwrap();
        assert_eq!(product_levels(&after), product_levels(&first));

        let mut fresh = Session::default();
        fresh
            .handle(SessionEvent::ConfigurationChanged(config()))
            .unwrap();
        let expected = fresh
            .handle(SessionEvent::ConfigurationChanged(grown))
            .unwrap();
        assert_eq!(after, expected);
    }

    #[test]
    fn test_reshuffle_before_configuration() {
        let mut session = Session::new(ReferenceData::default());
        assert!(session.handle(SessionEvent::Reshuffle).is_err());
        assert!(session.table().is_none());
    }
}

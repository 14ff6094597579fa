//! Random per-value level factor.

use crate::{
    FeatureSpace, GeneratorError, Result, SeriesRng,
    registry::FactorCategory,
    traits::{Factor, Observation, ensure_finite},
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Ratios shared between a session and the factors it builds.
pub type MultiplierCache = Arc<Mutex<HashMap<String, f64>>>;

/// Multiplier caches of a session, one per random factor configuration.
#[derive(Debug, Clone, Default)]
pub struct MultiplierCaches {
    caches: HashMap<String, MultiplierCache>,
}

impl MultiplierCaches {
    /// Cache for the factor identified by `key`, created empty on first use.
    pub fn entry(&mut self, key: &str) -> MultiplierCache {
        Arc::clone(self.caches.entry(key.to_string()).or_default())
    }

    /// Independent copy whose caches share no state with `self`.
    ///
    /// Factors built from the copy write only into the copy, so a run can be
    /// staged and its draws dropped if it fails.
    pub fn detached(&self) -> Self {
        let caches = self
            .caches
            .iter()
            .map(|(key, cache)| {
                let ratios = cache.lock().unwrap_or_else(PoisonError::into_inner).clone();
                (key.clone(), Arc::new(Mutex::new(ratios)))
            })
            .collect();
        Self { caches }
    }

    /// Forget every cached ratio.
    pub fn clear(&mut self) {
        self.caches.clear();
    }

    /// Number of cached factor configurations.
    pub fn len(&self) -> usize {
        self.caches.len()
    }

    /// Whether nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.caches.is_empty()
    }
}

/// Random but stable ratio per value of one feature.
///
/// During `prepare` every declared value of the feature without a cached
/// ratio draws one uniformly from `[min, max]`, in declared value order.
/// Cached ratios are kept across runs, so a session can edit other settings
/// without the levels jumping around; [`reset`](Self::reset) forgets them.
/// With a shared [`MultiplierCache`] the ratios also outlive the factor,
/// which is rebuilt from configuration on every change.
#[derive(Debug, Clone)]
pub struct RandomFeatureFactor {
    column_name: String,
    feature: String,
    min: f64,
    max: f64,
    multipliers: HashMap<String, f64>,
    shared: Option<MultiplierCache>,
}

impl RandomFeatureFactor {
    /// Ratios drawn from `[min, max]` for each value of `feature`.
    pub fn new(feature: &str, min: f64, max: f64) -> Self {
        Self {
            column_name: format!("random_{feature}_factor"),
            feature: feature.to_string(),
            min,
            max,
            multipliers: HashMap::new(),
            shared: None,
        }
    }

    /// Read and store ratios in `cache` as well as in the factor.
    pub fn with_cache(mut self, cache: MultiplierCache) -> Self {
        self.shared = Some(cache);
        self
    }

    /// Pin the ratio of one value instead of drawing it.
    pub fn with_multiplier(mut self, value: &str, ratio: f64) -> Self {
        self.multipliers.insert(value.to_string(), ratio);
        self
    }

    /// Override the column name.
    pub fn with_column_name(mut self, name: &str) -> Self {
        self.column_name = name.to_string();
        self
    }

    /// Cached ratio of `value`, if drawn or pinned.
    pub fn multiplier(&self, value: &str) -> Option<f64> {
        self.multipliers.get(value).copied()
    }

    /// Every cached ratio.
    pub const fn multipliers(&self) -> &HashMap<String, f64> {
        &self.multipliers
    }

    /// Forget every cached ratio so the next run draws fresh ones.
    pub fn reset(&mut self) {
        self.multipliers.clear();
        if let Some(Ok(mut cached)) = self.shared.as_ref().map(|c| c.lock()) {
            cached.clear();
        }
    }
}

impl Factor for RandomFeatureFactor {
    fn column_name(&self) -> &str {
        &self.column_name
    }

    fn description(&self) -> &str {
        "Random feature factor - uniform random ratio per feature value, fixed for the run"
    }

    fn category(&self) -> FactorCategory {
        FactorCategory::Feature
    }

    fn required_features(&self) -> Vec<&str> {
        vec![self.feature.as_str()]
    }

    fn prepare(&mut self, space: &FeatureSpace, rng: &mut SeriesRng) -> Result<()> {
        ensure_finite("random factor minimum", self.min)?;
        ensure_finite("random factor maximum", self.max)?;
        if self.min > self.max {
            return Err(GeneratorError::configuration(format!(
                "random factor range is inverted: min {} > max {}",
                self.min, self.max
            )));
        }

        let mut shared = match &self.shared {
            Some(cache) => Some(cache.lock().map_err(|_| {
                GeneratorError::configuration("random factor cache is poisoned")
            })?),
            None => None,
        };
        if let Some(cached) = shared.as_deref() {
            for (value, ratio) in cached {
                self.multipliers.entry(value.clone()).or_insert(*ratio);
            }
        }

        for value in space.values(&self.feature).unwrap_or_default() {
            if !self.multipliers.contains_key(value) {
                let ratio = rng.uniform(self.min, self.max);
                self.multipliers.insert(value.clone(), ratio);
            }
        }

        if let Some(cached) = shared.as_deref_mut() {
            cached.extend(self.multipliers.iter().map(|(k, v)| (k.clone(), *v)));
        }
        Ok(())
    }

    fn apply(&self, observation: &Observation<'_>, _rng: &mut SeriesRng) -> Result<f64> {
        let value = observation.feature(&self.column_name, &self.feature)?;
        self.multiplier(value).ok_or_else(|| {
            GeneratorError::configuration(format!(
                "no ratio drawn for {} value '{value}'",
                self.feature
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Combination;
    use chrono::NaiveDate;

    fn space() -> FeatureSpace {
        FeatureSpace::new()
            .with_feature("product", ["A", "B", "C"])
            .unwrap()
    }

    #[test]
    fn test_draws_one_ratio_per_value_within_bounds() {
        let mut factor = RandomFeatureFactor::new("product", 0.5, 1.5);
        factor
            .prepare(&space(), &mut SeriesRng::for_prepare(7, 0))
            .unwrap();

        assert_eq!(factor.multipliers().len(), 3);
        for ratio in factor.multipliers().values() {
            assert!((0.5..=1.5).contains(ratio));
        }
    }

    #[test]
    fn test_same_seed_same_ratios() {
        let mut a = RandomFeatureFactor::new("product", 0.5, 1.5);
        let mut b = RandomFeatureFactor::new("product", 0.5, 1.5);
        a.prepare(&space(), &mut SeriesRng::for_prepare(7, 0)).unwrap();
        b.prepare(&space(), &mut SeriesRng::for_prepare(7, 0)).unwrap();
        assert_eq!(a.multipliers(), b.multipliers());
    }

    #[test]
    fn test_cached_ratios_survive_reprepare() {
        let mut factor = RandomFeatureFactor::new("product", 0.5, 1.5).with_multiplier("A", 3.0);
        factor
            .prepare(&space(), &mut SeriesRng::for_prepare(1, 0))
            .unwrap();
        let first = factor.multipliers().clone();
        factor
            .prepare(&space(), &mut SeriesRng::for_prepare(2, 0))
            .unwrap();

        assert_eq!(factor.multiplier("A"), Some(3.0));
        assert_eq!(factor.multipliers(), &first);

        factor.reset();
        assert!(factor.multipliers().is_empty());
    }

    #[test]
    fn test_shared_cache_outlives_factor() {
        let mut caches = MultiplierCaches::default();
        let mut first = RandomFeatureFactor::new("product", 0.5, 1.5).with_cache(caches.entry("k"));
        first
            .prepare(&space(), &mut SeriesRng::for_prepare(1, 0))
            .unwrap();

        let mut second =
            RandomFeatureFactor::new("product", 0.5, 1.5).with_cache(caches.entry("k"));
        second
            .prepare(&space(), &mut SeriesRng::for_prepare(99, 3))
            .unwrap();

        assert_eq!(first.multipliers(), second.multipliers());
        assert_eq!(caches.len(), 1);
        caches.clear();
        assert!(caches.is_empty());
    }

    #[test]
    fn test_apply_uses_cached_ratio() {
        let mut factor = RandomFeatureFactor::new("product", 1.0, 1.0);
        factor
            .prepare(&space(), &mut SeriesRng::from_seed(0))
            .unwrap();

        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let combination = Combination::from_pairs(vec![("product", "B")]);
        let observation = Observation {
            date,
            start: date,
            position: 0,
            combination: &combination,
        };
        let ratio = factor
            .apply(&observation, &mut SeriesRng::from_seed(0))
            .unwrap();
        assert_eq!(ratio, 1.0);
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let mut factor = RandomFeatureFactor::new("product", 2.0, 1.0);
        let err = factor
            .prepare(&space(), &mut SeriesRng::from_seed(0))
            .unwrap_err();
        assert!(matches!(err, GeneratorError::Configuration(_)));
    }

    #[test]
    fn test_default_column_name() {
        let factor = RandomFeatureFactor::new("product", 0.5, 1.5);
        assert_eq!(factor.column_name(), "random_product_factor");
        assert_eq!(factor.category(), FactorCategory::Feature);
    }
}

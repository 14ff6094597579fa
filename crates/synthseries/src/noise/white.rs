//! White noise factor.

use crate::{
    FeatureSpace, GeneratorError, Result, SeriesRng,
    registry::FactorCategory,
    traits::{Factor, Observation, ensure_finite},
};

/// Independent Gaussian jitter on every row.
///
/// ```text
/// ratio = 1 + N(0, stdev)
/// ```
///
/// Draws come from the row's own random stream, so the jitter of a row does
/// not depend on how many other rows were evaluated before it.
#[derive(Debug, Clone)]
pub struct WhiteNoise {
    column_name: String,
    stdev: f64,
}

impl WhiteNoise {
    /// Noise with standard deviation `stdev` around the neutral ratio.
    pub fn new(stdev: f64) -> Self {
        Self {
            column_name: "white_noise".to_string(),
            stdev,
        }
    }

    /// Override the column name.
    pub fn with_column_name(mut self, name: &str) -> Self {
        self.column_name = name.to_string();
        self
    }

    /// Standard deviation of the ratio.
    pub const fn stdev(&self) -> f64 {
        self.stdev
    }
}

impl Default for WhiteNoise {
    fn default() -> Self {
        Self::new(0.05)
    }
}

impl Factor for WhiteNoise {
    fn column_name(&self) -> &str {
        &self.column_name
    }

    fn description(&self) -> &str {
        "White noise - Gaussian jitter around the neutral ratio"
    }

    fn category(&self) -> FactorCategory {
        FactorCategory::Noise
    }

    fn prepare(&mut self, _space: &FeatureSpace, _rng: &mut SeriesRng) -> Result<()> {
        ensure_finite("noise standard deviation", self.stdev)?;
        if self.stdev < 0.0 {
            return Err(GeneratorError::configuration(format!(
                "noise standard deviation must not be negative, got {}",
                self.stdev
            )));
        }
        Ok(())
    }

    fn apply(&self, _observation: &Observation<'_>, rng: &mut SeriesRng) -> Result<f64> {
        Ok(rng.normal(1.0, self.stdev))
    }
}

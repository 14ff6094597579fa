//! Ordered set of the factors active in one run.
//!
//! The set owns its factors and hands them to the generator in fold order:
//! by [`FactorCategory`] first, then in insertion order. Floating-point
//! multiplication is not associative, so a fixed order keeps runs
//! bit-identical.

use crate::{Factor, GeneratorError, Result};
use derive_more::Display;
use std::collections::HashSet;

/// Factor category, declared in fold order.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FactorCategory {
    /// Trend - growth over the date range
    Trend,
    /// Feature - fixed level per feature value
    Feature,
    /// Seasonal - calendar effects such as weekdays and holidays
    Seasonal,
    /// External - reference indices outside the feature space
    External,
    /// Noise - random jitter, always applied last
    Noise,
}

/// Metadata for factor introspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactorInfo {
    /// Column name (unique identifier)
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// Factor category
    pub category: FactorCategory,
    /// Features the factor reads
    pub required_features: Vec<String>,
}

/// Active factors of one generation run.
#[derive(Debug, Default)]
pub struct FactorSet {
    factors: Vec<Box<dyn Factor>>,
}

impl FactorSet {
    /// Create an empty set.
    pub const fn new() -> Self {
        Self {
            factors: Vec::new(),
        }
    }

    /// Add a factor.
    ///
    /// Fails when a factor with the same column name is already present.
    pub fn register(&mut self, factor: Box<dyn Factor>) -> Result<()> {
        if self.get(factor.column_name()).is_some() {
            return Err(GeneratorError::configuration(format!(
                "factor column '{}' is registered twice",
                factor.column_name()
            )));
        }
        let position = self
            .factors
            .iter()
            .position(|f| f.category() > factor.category())
            .unwrap_or(self.factors.len());
        self.factors.insert(position, factor);
        Ok(())
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(mut self, factor: impl Factor + 'static) -> Result<Self> {
        self.register(Box::new(factor))?;
        Ok(self)
    }

    /// Remove a factor by column name. Returns whether it was present.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.factors.len();
        self.factors.retain(|f| f.column_name() != name);
        self.factors.len() != before
    }

    /// Get a factor by column name.
    pub fn get(&self, name: &str) -> Option<&dyn Factor> {
        self.factors
            .iter()
            .find(|f| f.column_name() == name)
            .map(|f| f.as_ref())
    }

    /// Get factors by category, in fold order.
    pub fn by_category(&self, category: FactorCategory) -> Vec<&dyn Factor> {
        self.factors
            .iter()
            .filter(|f| f.category() == category)
            .map(|f| f.as_ref())
            .collect()
    }

    /// Factors in fold order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Factor> {
        self.factors.iter().map(|f| f.as_ref())
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn Factor>> {
        self.factors.iter_mut()
    }

    /// Metadata of every factor, in fold order.
    pub fn all_info(&self) -> Vec<FactorInfo> {
        self.factors
            .iter()
            .map(|f| FactorInfo {
                name: f.column_name().to_string(),
                description: f.description().to_string(),
                category: f.category(),
                required_features: f
                    .required_features()
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
            })
            .collect()
    }

    /// Column names in fold order.
    pub fn names(&self) -> Vec<&str> {
        self.factors.iter().map(|f| f.column_name()).collect()
    }

    /// Every feature some factor reads, without duplicates.
    pub fn required_features(&self) -> HashSet<&str> {
        self.factors
            .iter()
            .flat_map(|f| f.required_features())
            .collect()
    }

    /// Number of factors.
    pub fn len(&self) -> usize {
        self.factors.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }
}

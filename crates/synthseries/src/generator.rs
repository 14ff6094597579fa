//! Feature-cross series generator.
//!
//! For each date and each feature combination the generator starts from the
//! base amount and multiplies in the ratio of every active factor, in the
//! fold order of the [`FactorSet`]. The work is
//! `O(|dates| × |combinations| × |factors|)`; aggregate the materialized
//! [`ResultTable`] with [`ResultTable::group_by`] rather than generating
//! again for a coarser view.

use crate::{
    Combination, DateRange, FactorSet, FeatureSpace, GeneratorError, Result, SeriesRng,
    table::{DATE_COLUMN, ResultTable, Row, VALUE_COLUMN},
    traits::Observation,
};
use rayon::prelude::*;
use tracing::{debug, info};

/// Default cap on `|dates| × |combinations|` per run.
pub const DEFAULT_MAX_ROWS: usize = 5_000_000;

/// Settings of one generation run.
#[derive(Debug, Clone, PartialEq)]
pub struct Generator {
    base_amount: f64,
    dates: DateRange,
    seed: u64,
    max_rows: usize,
    factor_columns: bool,
}

impl Generator {
    /// Generator over `dates` starting every row at `base_amount`.
    pub const fn new(base_amount: f64, dates: DateRange) -> Self {
        Self {
            base_amount,
            dates,
            seed: 0,
            max_rows: DEFAULT_MAX_ROWS,
            factor_columns: false,
        }
    }

    /// Seed for every randomized factor of the run.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Maximum number of rows a run may produce.
    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = max_rows;
        self
    }

    /// Keep each factor's ratio as a diagnostic column.
    pub fn with_factor_columns(mut self, enabled: bool) -> Self {
        self.factor_columns = enabled;
        self
    }

    /// Base amount.
    pub const fn base_amount(&self) -> f64 {
        self.base_amount
    }

    /// Date axis.
    pub const fn dates(&self) -> &DateRange {
        &self.dates
    }

    /// Run seed.
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of rows `generate` would produce for `space`.
    pub fn row_count(&self, space: &FeatureSpace) -> u128 {
        (self.dates.len() as u128).saturating_mul(space.combination_count())
    }

    /// Generate the full table for `space` and `factors`.
    ///
    /// Factors are prepared first, in fold order, then every
    /// (date, combination) pair is evaluated. Any factor error aborts the
    /// run; no partial table is returned.
    pub fn generate(&self, space: &FeatureSpace, factors: &mut FactorSet) -> Result<ResultTable> {
        if !self.base_amount.is_finite() {
            return Err(GeneratorError::configuration(format!(
                "base amount must be finite, got {}",
                self.base_amount
            )));
        }

        let requested = self.row_count(space);
        if requested > self.max_rows as u128 {
            return Err(GeneratorError::Capacity {
                requested,
                limit: self.max_rows,
            });
        }

        if self.factor_columns {
            if let Some(name) = factors
                .names()
                .into_iter()
                .find(|&n| n == DATE_COLUMN || n == VALUE_COLUMN || space.contains(n))
            {
                return Err(GeneratorError::configuration(format!(
                    "factor column '{name}' collides with another output column"
                )));
            }
        }

        debug!(
            dates = self.dates.len(),
            combinations = %space.combination_count(),
            factors = factors.len(),
            evaluations = %requested.saturating_mul(factors.len() as u128),
            seed = self.seed,
            "generating series"
        );

        for (slot, factor) in factors.iter_mut().enumerate() {
            factor.prepare(space, &mut SeriesRng::for_prepare(self.seed, slot))?;
        }

        let factors: &FactorSet = factors;
        let combinations: Vec<Combination<'_>> = space.combinations().collect();
        let start = self.dates.start();

        let per_date: Vec<Result<Vec<Row>>> = (0..self.dates.len())
            .into_par_iter()
            .map(|position| {
                let date = self.dates.get(position).ok_or_else(|| {
                    GeneratorError::InvalidRange(format!("no date at position {position}"))
                })?;
                combinations
                    .iter()
                    .enumerate()
                    .map(|(offset, combination)| {
                        let row = (position * combinations.len() + offset) as u64;
                        let observation = Observation {
                            date,
                            start,
                            position,
                            combination,
                        };
                        self.evaluate(factors, &observation, row)
                    })
                    .collect::<Result<Vec<Row>>>()
            })
            .collect();

        // Restore date order and surface the earliest failure.
        let mut rows = Vec::with_capacity(requested as usize);
        for chunk in per_date {
            rows.extend(chunk?);
        }

        let feature_columns = space
            .feature_names()
            .into_iter()
            .map(str::to_string)
            .collect();
        let factor_columns = if self.factor_columns {
            factors.names().into_iter().map(str::to_string).collect()
        } else {
            Vec::new()
        };

        info!(rows = rows.len(), "generated series");
        Ok(ResultTable::new(feature_columns, factor_columns, rows))
    }

    fn evaluate(
        &self,
        factors: &FactorSet,
        observation: &Observation<'_>,
        row: u64,
    ) -> Result<Row> {
        let mut rng = SeriesRng::for_row(self.seed, row);
        let mut value = self.base_amount;
        let mut ratios = Vec::with_capacity(if self.factor_columns { factors.len() } else { 0 });

        for factor in factors.iter() {
            let ratio = factor.apply(observation, &mut rng)?;
            value *= ratio;
            if self.factor_columns {
                ratios.push(ratio);
            }
        }

        Ok(Row {
            date: observation.date,
            features: observation
                .combination
                .values()
                .map(str::to_string)
                .collect(),
            factors: ratios,
            value,
        })
    }
}

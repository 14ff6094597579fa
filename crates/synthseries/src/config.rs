//! Serializable description of a complete dashboard configuration.
//!
//! A [`DashboardConfig`] carries everything one generation run needs: base
//! amount, date range, seed, features and factor settings. It replaces any
//! process-wide state; the form layer builds a fresh config on every change
//! and hands it to [`Session`](crate::Session) or builds the run directly.

use crate::{
    CountryGdpFactor, DateRange, EuIndustryProductFactor, Factor, FactorCategory, FactorSet,
    FeatureSpace, Generator, GeneratorError, HolidayFactor, LinearTrend, MultiplierCaches,
    RandomFeatureFactor, Result, TrendParams, WeekdayFactor, WhiteNoise,
    generator::DEFAULT_MAX_ROWS,
    reference::{GdpTable, ReferenceData, ReferencePaths},
    table::FIELD_SEPARATOR,
};
use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::warn;

/// Reference table a feature can take its values from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueSource {
    /// Countries of the GDP table
    Gdp,
}

/// Values of a feature, as a list, as comma-separated text, or drawn from a
/// reference table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValues {
    /// Explicit list
    List(Vec<String>),
    /// Comma-separated text as typed in a form field
    Text(String),
    /// Every entry of a reference table, e.g. `{"from": "gdp"}`
    Reference {
        /// Table to read
        from: ValueSource,
    },
}

impl FeatureValues {
    /// Individual values: split on commas for text input, read from
    /// `reference` for a table source.
    ///
    /// Reference entries containing the export field separator are skipped,
    /// since they cannot be written as a single field.
    pub fn resolve(&self, reference: &ReferenceData) -> Result<Vec<String>> {
        match self {
            Self::List(values) => Ok(values.clone()),
            Self::Text(text) => Ok(text.split(',').map(str::to_string).collect()),
            Self::Reference {
                from: ValueSource::Gdp,
            } => {
                let table = gdp_table(reference)?;
                Ok(table
                    .countries()
                    .into_iter()
                    .filter(|country| {
                        let fits = !country.contains(FIELD_SEPARATOR);
                        if !fits {
                            warn!(country, "skipping country that contains the field separator");
                        }
                        fits
                    })
                    .map(str::to_string)
                    .collect())
            }
        }
    }
}

fn gdp_table(reference: &ReferenceData) -> Result<&GdpTable> {
    reference
        .gdp
        .as_deref()
        .ok_or_else(|| GeneratorError::configuration("feature values need a GDP reference table"))
}

/// One declared feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureConfig {
    /// Feature name; may be left empty for a reference source, which then
    /// names the feature (the GDP table uses its first header word)
    #[serde(default)]
    pub name: String,
    /// Feature values
    pub values: FeatureValues,
}

impl FeatureConfig {
    /// Feature name, falling back to the name the value source gives.
    pub fn resolve_name(&self, reference: &ReferenceData) -> Result<String> {
        match &self.values {
            FeatureValues::Reference {
                from: ValueSource::Gdp,
            } if self.name.trim().is_empty() => {
                Ok(gdp_table(reference)?.feature_name().to_string())
            }
            _ => Ok(self.name.trim().to_string()),
        }
    }
}

const fn default_stdev() -> f64 {
    0.05
}

const fn default_offset() -> f64 {
    1.0
}

/// Settings of one factor, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
pub enum FactorConfig {
    /// Gaussian jitter around the neutral ratio
    WhiteNoise {
        /// Standard deviation of the ratio
        #[serde(default = "default_stdev")]
        stdev: f64,
    },
    /// Ratio per day of the week
    Weekday {
        /// Ratio on Saturdays and Sundays
        #[serde(default)]
        weekend: Option<f64>,
        /// Ratios keyed by weekday name (`"mon"`, `"Friday"`, …)
        #[serde(default)]
        ratios: BTreeMap<String, f64>,
    },
    /// Linear growth over the range
    LinearTrend {
        /// Feature whose values carry their own parameters
        #[serde(default)]
        feature: Option<String>,
        /// Default yearly slope
        #[serde(default)]
        coef: f64,
        /// Default ratio on the first date
        #[serde(default = "default_offset")]
        offset: f64,
        /// Parameters per feature value
        #[serde(default)]
        per_value: BTreeMap<String, TrendParams>,
    },
    /// Random fixed ratio per feature value
    RandomFeature {
        /// Feature the ratios are drawn for
        feature: String,
        /// Lower bound of the ratio
        min: f64,
        /// Upper bound of the ratio
        max: f64,
    },
    /// Uplift on public holidays
    Holiday {
        /// Feature holding the country
        country_feature: String,
        /// Ratio on holidays
        intensity: f64,
        /// Ratio overrides per holiday name
        #[serde(default)]
        special_holidays: BTreeMap<String, f64>,
    },
    /// Level per country from GDP per capita
    CountryGdp {
        /// Feature holding the country
        country_feature: String,
    },
    /// Tracks the EU industry production index
    EuIndustryProduct {
        /// Scale of the deviation from the index mean
        intensity: f64,
    },
}

/// Catalog entry describing a factor kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FactorKind {
    /// `kind` tag used in configuration
    pub name: &'static str,
    /// Category of the built factor
    pub category: FactorCategory,
    /// Human-readable description
    pub description: &'static str,
    /// Configuration fields
    pub fields: &'static [&'static str],
}

/// Every configurable factor kind.
pub const FACTOR_KINDS: &[FactorKind] = &[
    FactorKind {
        name: "linear_trend",
        category: FactorCategory::Trend,
        description: "Linear growth, optionally per feature value",
        fields: &["feature", "coef", "offset", "per_value"],
    },
    FactorKind {
        name: "random_feature",
        category: FactorCategory::Feature,
        description: "Uniform random ratio per feature value, stable within a session",
        fields: &["feature", "min", "max"],
    },
    FactorKind {
        name: "country_gdp",
        category: FactorCategory::Feature,
        description: "Country level proportional to GDP per capita",
        fields: &["country_feature"],
    },
    FactorKind {
        name: "weekday",
        category: FactorCategory::Seasonal,
        description: "Ratio per day of the week, e.g. a weekend uplift",
        fields: &["weekend", "ratios"],
    },
    FactorKind {
        name: "holiday",
        category: FactorCategory::Seasonal,
        description: "Uplift on public holidays of the row's country",
        fields: &["country_feature", "intensity", "special_holidays"],
    },
    FactorKind {
        name: "eu_industry_product",
        category: FactorCategory::External,
        description: "Follows the monthly EU industry production index",
        fields: &["intensity"],
    },
    FactorKind {
        name: "white_noise",
        category: FactorCategory::Noise,
        description: "Gaussian jitter around the neutral ratio",
        fields: &["stdev"],
    },
];

impl FactorConfig {
    /// The `kind` tag of this configuration.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::WhiteNoise { .. } => "white_noise",
            Self::Weekday { .. } => "weekday",
            Self::LinearTrend { .. } => "linear_trend",
            Self::RandomFeature { .. } => "random_feature",
            Self::Holiday { .. } => "holiday",
            Self::CountryGdp { .. } => "country_gdp",
            Self::EuIndustryProduct { .. } => "eu_industry_product",
        }
    }

    /// Build the factor, drawing reference tables from `reference` and
    /// session-stable random ratios from `caches`.
    pub fn build(
        &self,
        reference: &ReferenceData,
        caches: &mut MultiplierCaches,
    ) -> Result<Box<dyn Factor>> {
        let factor: Box<dyn Factor> = match self {
            Self::WhiteNoise { stdev } => Box::new(WhiteNoise::new(*stdev)),
            Self::Weekday { weekend, ratios } => {
                let mut factor = weekend.map_or_else(WeekdayFactor::default, WeekdayFactor::weekend);
                for (name, ratio) in ratios {
                    let weekday: Weekday = name.parse().map_err(|_| {
                        GeneratorError::configuration(format!("unknown weekday '{name}'"))
                    })?;
                    factor = factor.with_ratio(weekday, *ratio);
                }
                Box::new(factor)
            }
            Self::LinearTrend {
                feature,
                coef,
                offset,
                per_value,
            } => {
                let base = feature
                    .as_deref()
                    .map_or_else(LinearTrend::default, LinearTrend::for_feature);
                let trend = per_value.iter().fold(
                    base.with_default(TrendParams::new(*coef, *offset)),
                    |trend, (value, params)| trend.with_params(value, *params),
                );
                Box::new(trend)
            }
            Self::RandomFeature { feature, min, max } => {
                let key = format!("{feature}:{min}:{max}");
                Box::new(RandomFeatureFactor::new(feature, *min, *max).with_cache(caches.entry(&key)))
            }
            Self::Holiday {
                country_feature,
                intensity,
                special_holidays,
            } => {
                let factor = special_holidays.iter().fold(
                    HolidayFactor::new(country_feature, *intensity, reference.holidays.clone()),
                    |factor, (name, ratio)| factor.with_special_holiday(name, *ratio),
                );
                Box::new(factor)
            }
            Self::CountryGdp { country_feature } => {
                let table = reference.gdp.clone().ok_or_else(|| {
                    GeneratorError::configuration("country GDP factor needs a GDP reference table")
                })?;
                Box::new(CountryGdpFactor::new(country_feature, table))
            }
            Self::EuIndustryProduct { intensity } => {
                let index = reference.industry_index.clone().ok_or_else(|| {
                    GeneratorError::configuration(
                        "EU industry factor needs an industry index reference table",
                    )
                })?;
                Box::new(EuIndustryProductFactor::new(*intensity, index))
            }
        };
        Ok(factor)
    }
}

/// Complete configuration of one generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DashboardConfig {
    /// Starting value of every row
    pub base_amount: f64,
    /// First date, inclusive
    pub start: NaiveDate,
    /// Last date, inclusive
    pub end: NaiveDate,
    /// Seed for randomized factors
    #[serde(default)]
    pub seed: u64,
    /// Declared features, in order
    #[serde(default)]
    pub features: Vec<FeatureConfig>,
    /// Active factors
    #[serde(default)]
    pub factors: Vec<FactorConfig>,
    /// Reference table locations
    #[serde(default)]
    pub reference: ReferencePaths,
    /// Row limit, defaults to [`DEFAULT_MAX_ROWS`]
    #[serde(default)]
    pub max_rows: Option<usize>,
    /// Keep per-factor ratio columns in the output
    #[serde(default)]
    pub factor_columns: bool,
}

impl DashboardConfig {
    /// Minimal configuration: constant `base_amount` from `start` to `end`.
    pub const fn new(base_amount: f64, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            base_amount,
            start,
            end,
            seed: 0,
            features: Vec::new(),
            factors: Vec::new(),
            reference: ReferencePaths {
                gdp: None,
                holidays: None,
                industry_index: None,
            },
            max_rows: None,
            factor_columns: false,
        }
    }

    /// Parse a JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Declared features as a [`FeatureSpace`], reading table-sourced
    /// values from `reference`.
    pub fn feature_space(&self, reference: &ReferenceData) -> Result<FeatureSpace> {
        let mut space = FeatureSpace::new();
        for feature in &self.features {
            let name = feature.resolve_name(reference)?;
            if space.contains(&name) {
                return Err(GeneratorError::configuration(format!(
                    "feature '{name}' is declared twice"
                )));
            }
            space.add_feature(&name, feature.values.resolve(reference)?)?;
        }
        Ok(space)
    }

    /// The inclusive date range.
    pub fn date_range(&self) -> Result<DateRange> {
        DateRange::inclusive(self.start, self.end)
    }

    /// Generator for this configuration.
    pub fn generator(&self) -> Result<Generator> {
        Ok(Generator::new(self.base_amount, self.date_range()?)
            .with_seed(self.seed)
            .with_max_rows(self.max_rows.unwrap_or(DEFAULT_MAX_ROWS))
            .with_factor_columns(self.factor_columns))
    }

    /// Build every configured factor.
    pub fn factor_set(
        &self,
        reference: &ReferenceData,
        caches: &mut MultiplierCaches,
    ) -> Result<FactorSet> {
        let mut set = FactorSet::new();
        for factor in &self.factors {
            set.register(factor.build(reference, caches)?)?;
        }
        Ok(set)
    }
}

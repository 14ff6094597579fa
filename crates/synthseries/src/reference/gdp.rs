//! GDP-per-capita reference table.

use crate::{GeneratorError, Result};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// GDP per capita keyed by country name.
///
/// Lookups are case-insensitive. The table also remembers which feature
/// name its first column describes, so the country picker can label the
/// feature the way the source file does.
#[derive(Debug, Clone, Default)]
pub struct GdpTable {
    feature_name: String,
    countries: Vec<(String, f64)>,
    index: HashMap<String, usize>,
}

impl GdpTable {
    /// Build a table from `(country, gdp)` pairs. Later duplicates are ignored.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let mut table = Self {
            feature_name: "country".to_string(),
            ..Self::default()
        };
        for (country, gdp) in entries {
            table.insert(country.into(), gdp);
        }
        table
    }

    /// Parse CSV with a header row: country name first, GDP value second.
    ///
    /// The first word of the first header becomes the feature name
    /// (`"Country Name"` gives `"Country"`). Rows whose GDP is blank or not
    /// numeric are skipped.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let feature_name = csv
            .headers()?
            .get(0)
            .and_then(|h| h.split_whitespace().next())
            .map(str::to_string)
            .ok_or_else(|| GeneratorError::configuration("GDP table has no header"))?;

        let mut table = Self {
            feature_name,
            ..Self::default()
        };
        for record in csv.records() {
            let record = record?;
            let (Some(country), Some(raw)) = (record.get(0), record.get(1)) else {
                continue;
            };
            match raw.parse::<f64>() {
                Ok(gdp) if gdp.is_finite() && !country.is_empty() => {
                    table.insert(country.to_string(), gdp);
                }
                _ => debug!(country, raw, "skipping GDP row without a numeric value"),
            }
        }

        if table.is_empty() {
            return Err(GeneratorError::configuration("GDP table has no usable rows"));
        }
        Ok(table)
    }

    /// Read a GDP CSV file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    fn insert(&mut self, country: String, gdp: f64) {
        let key = country.to_lowercase();
        if !self.index.contains_key(&key) {
            self.index.insert(key, self.countries.len());
            self.countries.push((country, gdp));
        }
    }

    /// Feature name described by the country column.
    pub fn feature_name(&self) -> &str {
        &self.feature_name
    }

    /// GDP per capita of `country`.
    pub fn gdp(&self, country: &str) -> Option<f64> {
        self.index
            .get(&country.to_lowercase())
            .map(|&i| self.countries[i].1)
    }

    /// Country names in file order.
    pub fn countries(&self) -> Vec<&str> {
        self.countries.iter().map(|(c, _)| c.as_str()).collect()
    }

    /// Number of countries.
    pub fn len(&self) -> usize {
        self.countries.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }
}

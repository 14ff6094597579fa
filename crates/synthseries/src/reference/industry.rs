//! Monthly EU industry production index.

use crate::{GeneratorError, Result};
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

/// Industry production index keyed by `(year, month)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndustryIndex {
    months: BTreeMap<(i32, u32), f64>,
}

impl IndustryIndex {
    /// Build an index from `((year, month), value)` pairs.
    pub fn from_entries(entries: impl IntoIterator<Item = ((i32, u32), f64)>) -> Self {
        Self {
            months: entries.into_iter().collect(),
        }
    }

    /// Parse CSV with a header row: month (`YYYY-MM` or `YYYY-MM-DD`), value.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut months = BTreeMap::new();
        for record in csv.records() {
            let record = record?;
            let month = record.get(0).unwrap_or_default();
            let value = record.get(1).unwrap_or_default();
            let key = parse_month(month)?;
            let value: f64 = value.parse().map_err(|_| {
                GeneratorError::configuration(format!(
                    "industry index value for {month} is not numeric: '{value}'"
                ))
            })?;
            months.insert(key, value);
        }
        Ok(Self { months })
    }

    /// Read an index CSV file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_reader(std::fs::File::open(path)?)
    }

    /// Index value for the month of `date`.
    ///
    /// Months after the last entry use the nearest earlier month; months
    /// before the first entry use the first.
    pub fn value_at(&self, date: NaiveDate) -> Option<f64> {
        self.months
            .range(..=(date.year(), date.month()))
            .next_back()
            .or_else(|| self.months.iter().next())
            .map(|(_, &v)| v)
    }

    /// Mean over all months.
    pub fn mean(&self) -> Option<f64> {
        (!self.months.is_empty())
            .then(|| self.months.values().sum::<f64>() / self.months.len() as f64)
    }

    /// Number of months.
    pub fn len(&self) -> usize {
        self.months.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }
}

fn parse_month(raw: &str) -> Result<(i32, u32)> {
    let candidate = if raw.len() == 7 {
        format!("{raw}-01")
    } else {
        raw.to_string()
    };
    NaiveDate::parse_from_str(&candidate, "%Y-%m-%d")
        .map(|d| (d.year(), d.month()))
        .map_err(|e| GeneratorError::configuration(format!("invalid index month '{raw}': {e}")))
}

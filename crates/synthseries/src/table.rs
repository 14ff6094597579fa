//! Long-format output of a generation run.
//!
//! A [`ResultTable`] has one row per date and feature combination. Columns
//! are `date`, then every feature in declaration order, then (optionally)
//! one diagnostic column per factor holding its ratio, then `value`.

use crate::{GeneratorError, Result};
use chrono::NaiveDate;
use polars::prelude::*;
use std::collections::HashMap;
use std::io::Write;

/// Separator between fields in exported text.
pub const FIELD_SEPARATOR: &str = ", ";

/// Name of the leading date column.
pub const DATE_COLUMN: &str = "date";

/// Name of the trailing value column.
pub const VALUE_COLUMN: &str = "value";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// One generated observation.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Calendar date
    pub date: NaiveDate,
    /// Feature values, aligned with [`ResultTable::feature_columns`]
    pub features: Vec<String>,
    /// Factor ratios, aligned with [`ResultTable::factor_columns`]
    pub factors: Vec<f64>,
    /// Final value
    pub value: f64,
}

impl Row {
    /// Value of the feature at `index` in the table's feature columns.
    pub fn feature(&self, index: usize) -> Option<&str> {
        self.features.get(index).map(String::as_str)
    }
}

/// Ordered, immutable table of generated rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultTable {
    feature_columns: Vec<String>,
    factor_columns: Vec<String>,
    rows: Vec<Row>,
}

impl ResultTable {
    pub(crate) const fn new(
        feature_columns: Vec<String>,
        factor_columns: Vec<String>,
        rows: Vec<Row>,
    ) -> Self {
        Self {
            feature_columns,
            factor_columns,
            rows,
        }
    }

    /// Feature column names in declaration order.
    pub fn feature_columns(&self) -> &[String] {
        &self.feature_columns
    }

    /// Diagnostic factor column names in fold order; empty unless requested.
    pub fn factor_columns(&self) -> &[String] {
        &self.factor_columns
    }

    /// Every column name: `date`, features, factors, `value`.
    pub fn columns(&self) -> Vec<&str> {
        std::iter::once(DATE_COLUMN)
            .chain(self.feature_columns.iter().map(String::as_str))
            .chain(self.factor_columns.iter().map(String::as_str))
            .chain(std::iter::once(VALUE_COLUMN))
            .collect()
    }

    /// Rows in generation order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sum of every row's value.
    pub fn total(&self) -> f64 {
        self.rows.iter().map(|r| r.value).sum()
    }

    /// The first `n` rows in generation order.
    pub fn head(&self, n: usize) -> Self {
        Self {
            feature_columns: self.feature_columns.clone(),
            factor_columns: self.factor_columns.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }

    /// Sum `value` over every feature not in `features`.
    ///
    /// Rows are keyed by date and the selected feature values, in the order
    /// the keys first appear. Factor columns are dropped because ratios do
    /// not aggregate. `group_by(&[])` gives one row per date.
    pub fn group_by(&self, features: &[&str]) -> Result<Self> {
        let indices = features
            .iter()
            .map(|name| {
                self.feature_columns
                    .iter()
                    .position(|c| c == name)
                    .ok_or_else(|| GeneratorError::missing_feature("group_by", name))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut positions: HashMap<(NaiveDate, Vec<&str>), usize> = HashMap::new();
        let mut rows: Vec<Row> = Vec::new();
        for row in &self.rows {
            let key: Vec<&str> = indices.iter().map(|&i| row.features[i].as_str()).collect();
            match positions.get(&(row.date, key.clone())) {
                Some(&at) => rows[at].value += row.value,
                None => {
                    positions.insert((row.date, key.clone()), rows.len());
                    rows.push(Row {
                        date: row.date,
                        features: key.into_iter().map(str::to_string).collect(),
                        factors: Vec::new(),
                        value: row.value,
                    });
                }
            }
        }

        Ok(Self {
            feature_columns: features.iter().map(|f| f.to_string()).collect(),
            factor_columns: Vec::new(),
            rows,
        })
    }

    /// Write the table as text: a header line of column names, then one line
    /// per row. Fields are separated by `", "` and every line, including the
    /// last, ends with a single newline.
    pub fn write_csv<W: Write>(&self, mut writer: W) -> Result<()> {
        writeln!(writer, "{}", self.columns().join(FIELD_SEPARATOR))?;
        for row in &self.rows {
            let date = row.date.format(DATE_FORMAT).to_string();
            let fields: Vec<String> = std::iter::once(date)
                .chain(row.features.iter().cloned())
                .chain(row.factors.iter().map(f64::to_string))
                .chain(std::iter::once(row.value.to_string()))
                .collect();
            writeln!(writer, "{}", fields.join(FIELD_SEPARATOR))?;
        }
        writer.flush()?;
        Ok(())
    }

    /// The exported text as a string.
    pub fn to_csv_string(&self) -> Result<String> {
        let mut buffer = Vec::new();
        self.write_csv(&mut buffer)?;
        String::from_utf8(buffer)
            .map_err(|e| GeneratorError::configuration(format!("exported text is not UTF-8: {e}")))
    }

    /// Convert to a polars DataFrame with the same columns.
    ///
    /// Dates are stored as `YYYY-MM-DD` strings.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let mut columns: Vec<Column> =
            Vec::with_capacity(2 + self.feature_columns.len() + self.factor_columns.len());

        let dates: Vec<String> = self
            .rows
            .iter()
            .map(|r| r.date.format(DATE_FORMAT).to_string())
            .collect();
        columns.push(Column::new(DATE_COLUMN.into(), dates));

        for (i, name) in self.feature_columns.iter().enumerate() {
            let values: Vec<&str> = self.rows.iter().map(|r| r.features[i].as_str()).collect();
            columns.push(Column::new(name.as_str().into(), values));
        }
        for (i, name) in self.factor_columns.iter().enumerate() {
            let values: Vec<f64> = self.rows.iter().map(|r| r.factors[i]).collect();
            columns.push(Column::new(name.as_str().into(), values));
        }

        let values: Vec<f64> = self.rows.iter().map(|r| r.value).collect();
        columns.push(Column::new(VALUE_COLUMN.into(), values));

        Ok(DataFrame::new(columns)?)
    }
}

//! Static reference data consumed by factors
//!
//! Reference tables are loaded once, before any generation pass, and shared
//! immutably between factors and runs.

pub mod gdp;
pub mod holidays;
pub mod industry;

pub use gdp::GdpTable;
pub use holidays::{HolidayCalendar, easter_sunday};
pub use industry::IndustryIndex;

use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// File locations of the reference tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferencePaths {
    /// GDP-per-capita CSV
    pub gdp: Option<PathBuf>,
    /// Extra holidays CSV, on top of the built-in calendars
    pub holidays: Option<PathBuf>,
    /// EU industry production index CSV
    pub industry_index: Option<PathBuf>,
}

/// Loaded reference tables.
#[derive(Debug, Clone, Default)]
pub struct ReferenceData {
    /// GDP per capita by country
    pub gdp: Option<Arc<GdpTable>>,
    /// Holiday calendar; always available through the built-in rules
    pub holidays: Arc<HolidayCalendar>,
    /// EU industry production index
    pub industry_index: Option<Arc<IndustryIndex>>,
}

impl ReferenceData {
    /// Load every table named in `paths`.
    pub fn load(paths: &ReferencePaths) -> Result<Self> {
        let gdp = paths
            .gdp
            .as_ref()
            .map(GdpTable::from_path)
            .transpose()?
            .map(Arc::new);
        let holidays = match &paths.holidays {
            Some(path) => HolidayCalendar::from_path(path)?,
            None => HolidayCalendar::new(),
        };
        let industry_index = paths
            .industry_index
            .as_ref()
            .map(IndustryIndex::from_path)
            .transpose()?
            .map(Arc::new);

        info!(
            gdp_countries = gdp.as_ref().map_or(0, |t| t.len()),
            index_months = industry_index.as_ref().map_or(0, |i| i.len()),
            "loaded reference data"
        );

        Ok(Self {
            gdp,
            holidays: Arc::new(holidays),
            industry_index,
        })
    }

    /// Replace the GDP table.
    pub fn with_gdp(mut self, table: GdpTable) -> Self {
        self.gdp = Some(Arc::new(table));
        self
    }

    /// Replace the holiday calendar.
    pub fn with_holidays(mut self, calendar: HolidayCalendar) -> Self {
        self.holidays = Arc::new(calendar);
        self
    }

    /// Replace the industry index.
    pub fn with_industry_index(mut self, index: IndustryIndex) -> Self {
        self.industry_index = Some(Arc::new(index));
        self
    }
}

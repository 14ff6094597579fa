#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/synthseries/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod dates;
pub mod error;
pub mod external;
pub mod feature;
pub mod generator;
pub mod noise;
pub mod reference;
pub mod registry;
pub mod rng;
pub mod seasonal;
pub mod session;
pub mod space;
pub mod table;
pub mod traits;
pub mod trend;

// Re-export core types
pub use config::{
    DashboardConfig, FACTOR_KINDS, FactorConfig, FactorKind, FeatureConfig, FeatureValues,
    ValueSource,
};
pub use dates::{DateIter, DateRange};
pub use error::{GeneratorError, Result};
pub use external::EuIndustryProductFactor;
pub use feature::{CountryGdpFactor, MultiplierCache, MultiplierCaches, RandomFeatureFactor};
pub use generator::{DEFAULT_MAX_ROWS, Generator};
pub use noise::WhiteNoise;
pub use reference::{GdpTable, HolidayCalendar, IndustryIndex, ReferenceData, ReferencePaths};
pub use registry::{FactorCategory, FactorInfo, FactorSet};
pub use rng::SeriesRng;
pub use seasonal::{HolidayFactor, WeekdayFactor};
pub use session::{Session, SessionEvent};
pub use space::{Combination, Combinations, Feature, FeatureSpace};
pub use table::{ResultTable, Row};
pub use traits::{Factor, Observation};
pub use trend::{LinearTrend, TrendParams};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

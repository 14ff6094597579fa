//! Feature factors - a fixed level per feature value
//!
//! These factors give each value of a categorical feature its own constant
//! ratio, either drawn at random or derived from reference data.

pub mod country_gdp;
pub mod random;

pub use country_gdp::CountryGdpFactor;
pub use random::{MultiplierCache, MultiplierCaches, RandomFeatureFactor};

//! External factors - reference indices outside the feature space

pub mod eu_industry;

pub use eu_industry::EuIndustryProductFactor;

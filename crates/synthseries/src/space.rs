//! Categorical feature dimensions and their Cartesian product.
//!
//! A [`FeatureSpace`] holds the declared features in declaration order. Each
//! [`Combination`] it yields assigns one value to every feature, so the
//! generator can emit one row per date and combination.

use crate::{
    GeneratorError, Result,
    table::{DATE_COLUMN, FIELD_SEPARATOR, VALUE_COLUMN},
};

/// A named categorical feature with an ordered, de-duplicated value set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feature {
    name: String,
    values: Vec<String>,
}

impl Feature {
    /// Feature name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Values in declared order.
    pub fn values(&self) -> &[String] {
        &self.values
    }
}

/// Ordered mapping of feature name to value set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureSpace {
    features: Vec<Feature>,
}

impl FeatureSpace {
    /// Create an empty feature space.
    pub const fn new() -> Self {
        Self {
            features: Vec::new(),
        }
    }

    /// Builder-style [`add_feature`](Self::add_feature).
    pub fn with_feature<I, S>(mut self, name: &str, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add_feature(name, values)?;
        Ok(self)
    }

    /// Declare a feature, or replace the values of an existing one in place.
    ///
    /// Values are trimmed and duplicates dropped, keeping the first
    /// occurrence. Fails when the name is blank or names a fixed output
    /// column, when a name or value contains the export field separator, or
    /// when no values remain.
    pub fn add_feature<I, S>(&mut self, name: &str, values: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.trim();
        if name.is_empty() {
            return Err(GeneratorError::configuration("feature name must not be blank"));
        }
        if name == DATE_COLUMN || name == VALUE_COLUMN {
            return Err(GeneratorError::configuration(format!(
                "feature name '{name}' is reserved for an output column"
            )));
        }
        if name.contains(FIELD_SEPARATOR) {
            return Err(GeneratorError::configuration(format!(
                "feature name '{name}' contains the field separator '{FIELD_SEPARATOR}'"
            )));
        }

        let mut unique: Vec<String> = Vec::new();
        for value in values {
            let value = value.into().trim().to_string();
            if value.contains(FIELD_SEPARATOR) {
                return Err(GeneratorError::configuration(format!(
                    "value '{value}' of feature '{name}' contains the field separator '{FIELD_SEPARATOR}'"
                )));
            }
            if !value.is_empty() && !unique.contains(&value) {
                unique.push(value);
            }
        }
        if unique.is_empty() {
            return Err(GeneratorError::configuration(format!(
                "feature '{name}' has an empty value set"
            )));
        }

        match self.features.iter_mut().find(|f| f.name == name) {
            Some(existing) => existing.values = unique,
            None => self.features.push(Feature {
                name: name.to_string(),
                values: unique,
            }),
        }
        Ok(())
    }

    /// Remove a feature. Returns whether it was declared.
    pub fn remove_feature(&mut self, name: &str) -> bool {
        let before = self.features.len();
        self.features.retain(|f| f.name != name);
        self.features.len() != before
    }

    /// Whether a feature with this name is declared.
    pub fn contains(&self, name: &str) -> bool {
        self.features.iter().any(|f| f.name == name)
    }

    /// Values of a feature, if declared.
    pub fn values(&self, name: &str) -> Option<&[String]> {
        self.features
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.values.as_slice())
    }

    /// Declared features in order.
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// Feature names in declaration order.
    pub fn feature_names(&self) -> Vec<&str> {
        self.features.iter().map(|f| f.name.as_str()).collect()
    }

    /// Number of declared features.
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Whether no features are declared.
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Number of combinations [`combinations`](Self::combinations) yields.
    ///
    /// Saturates instead of overflowing so callers can compare it against a
    /// capacity limit.
    pub fn combination_count(&self) -> u128 {
        self.features
            .iter()
            .fold(1u128, |acc, f| acc.saturating_mul(f.values.len() as u128))
    }

    /// Lazily enumerate the Cartesian product of all feature values.
    ///
    /// The first declared feature varies slowest and values follow their
    /// declared order. With no features this yields exactly one empty
    /// combination.
    pub fn combinations(&self) -> Combinations<'_> {
        Combinations {
            space: self,
            cursor: Some(vec![0; self.features.len()]),
        }
    }
}

/// Iterator over the combinations of a [`FeatureSpace`].
#[derive(Debug, Clone)]
pub struct Combinations<'a> {
    space: &'a FeatureSpace,
    cursor: Option<Vec<usize>>,
}

impl<'a> Iterator for Combinations<'a> {
    type Item = Combination<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let cursor = self.cursor.as_mut()?;
        let features = &self.space.features;

        let assignments = features
            .iter()
            .zip(cursor.iter())
            .map(|(f, &i)| (f.name.as_str(), f.values[i].as_str()))
            .collect();

        // Odometer increment, innermost feature first.
        let mut exhausted = true;
        for position in (0..cursor.len()).rev() {
            cursor[position] += 1;
            if cursor[position] < features[position].values.len() {
                exhausted = false;
                break;
            }
            cursor[position] = 0;
        }
        if exhausted {
            self.cursor = None;
        }

        Some(Combination { assignments })
    }
}

/// One value per declared feature, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Combination<'a> {
    assignments: Vec<(&'a str, &'a str)>,
}

impl<'a> Combination<'a> {
    /// Build a combination from explicit `(feature, value)` pairs.
    pub const fn from_pairs(assignments: Vec<(&'a str, &'a str)>) -> Self {
        Self { assignments }
    }

    /// Value assigned to `feature`, if present.
    pub fn get(&self, feature: &str) -> Option<&'a str> {
        self.assignments
            .iter()
            .find(|(name, _)| *name == feature)
            .map(|(_, value)| *value)
    }

    /// `(feature, value)` pairs in declaration order.
    pub fn pairs(&self) -> &[(&'a str, &'a str)] {
        &self.assignments
    }

    /// Values in declaration order.
    pub fn values(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.assignments.iter().map(|(_, value)| *value)
    }

    /// Number of assigned features.
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    /// Whether the combination carries no features.
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn country_product() -> FeatureSpace {
        FeatureSpace::new()
            .with_feature("country", ["NL", "DE"])
            .unwrap()
            .with_feature("product", ["A", "B", "C"])
            .unwrap()
    }

    #[test]
    fn test_empty_space_yields_one_empty_combination() {
        let space = FeatureSpace::new();
        let combos: Vec<_> = space.combinations().collect();
        assert_eq!(combos.len(), 1);
        assert!(combos[0].is_empty());
        assert_eq!(space.combination_count(), 1);
    }

    #[test]
    fn test_combinations_order_outer_to_inner() {
        let space = country_product();
        let combos: Vec<Vec<&str>> = space
            .combinations()
            .map(|c| c.values().collect())
            .collect();

        assert_eq!(
            combos,
            vec![
                vec!["NL", "A"],
                vec!["NL", "B"],
                vec!["NL", "C"],
                vec!["DE", "A"],
                vec!["DE", "B"],
                vec!["DE", "C"],
            ]
        );
        assert_eq!(space.combination_count(), 6);
    }

    #[rstest]
    #[case::empty(Vec::<&str>::new())]
    #[case::blank_only(vec!["  ", ""])]
    fn test_empty_value_set_is_rejected(#[case] values: Vec<&str>) {
        let err = FeatureSpace::new().add_feature("country", values).unwrap_err();
        assert!(matches!(err, GeneratorError::Configuration(_)));
    }

    #[test]
    fn test_blank_name_is_rejected() {
        let err = FeatureSpace::new().add_feature(" ", ["x"]).unwrap_err();
        assert!(matches!(err, GeneratorError::Configuration(_)));
    }

    #[rstest]
    #[case::date("date")]
    #[case::value("value")]
    #[case::separator("country, region")]
    fn test_conflicting_feature_name_is_rejected(#[case] name: &str) {
        let err = FeatureSpace::new().add_feature(name, ["x"]).unwrap_err();
        assert!(matches!(err, GeneratorError::Configuration(_)));
    }

    #[test]
    fn test_value_with_field_separator_is_rejected() {
        let err = FeatureSpace::new()
            .add_feature("country", ["Korea, Rep.", "Germany"])
            .unwrap_err();
        assert!(matches!(err, GeneratorError::Configuration(_)));

        let space = FeatureSpace::new()
            .with_feature("country", ["Korea,Rep.", "Germany"])
            .unwrap();
        assert_eq!(space.values("country").unwrap(), ["Korea,Rep.", "Germany"]);
    }

    #[test]
    fn test_duplicate_values_are_dropped() {
        let space = FeatureSpace::new()
            .with_feature("product", ["A", " B", "A", "B "])
            .unwrap();
        assert_eq!(space.values("product").unwrap(), ["A", "B"]);
    }

    #[test]
    fn test_re_adding_replaces_in_place() {
        let mut space = country_product();
        space.add_feature("country", ["FR"]).unwrap();
        assert_eq!(space.feature_names(), ["country", "product"]);
        assert_eq!(space.values("country").unwrap(), ["FR"]);
        assert_eq!(space.combination_count(), 3);
    }

    #[test]
    fn test_remove_feature() {
        let mut space = country_product();
        assert!(space.remove_feature("country"));
        assert!(!space.remove_feature("country"));
        assert_eq!(space.len(), 1);
        assert!(!space.contains("country"));
    }

    #[test]
    fn test_combination_lookup() {
        let space = country_product();
        let first = space.combinations().next().unwrap();
        assert_eq!(first.get("country"), Some("NL"));
        assert_eq!(first.get("product"), Some("A"));
        assert_eq!(first.get("region"), None);
    }
}

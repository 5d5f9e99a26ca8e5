//! Property-based object selection

use serde::{Deserialize, Serialize};

use crate::object::SceneObject;
use crate::properties::{Properties, PropertyValue};

/// Selects objects by equality on custom properties
///
/// An object passes when every required property is present with the given
/// value and no excluded property matches. An empty filter accepts
/// everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyFilter {
    /// Properties that must be present with these values
    pub required: Vec<(String, PropertyValue)>,
    /// Properties that must not have these values
    pub excluded: Vec<(String, PropertyValue)>,
}

impl PropertyFilter {
    /// Filter that accepts everything
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for a single equality condition
    pub fn equals(key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        Self::new().with(key, value)
    }

    /// Require `key == value`
    pub fn with(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.required.push((key.into(), value.into()));
        self
    }

    /// Reject objects where `key == value`
    pub fn without(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.excluded.push((key.into(), value.into()));
        self
    }

    /// Check a property map against the filter
    pub fn passes(&self, properties: &Properties) -> bool {
        let required = self
            .required
            .iter()
            .all(|(key, value)| properties.get(key) == Some(value));
        let excluded = self
            .excluded
            .iter()
            .any(|(key, value)| properties.get(key) == Some(value));
        required && !excluded
    }

    /// Check an object; validity is not considered here
    pub fn matches(&self, object: &SceneObject) -> bool {
        self.passes(&object.properties)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filter_accepts_all() {
        assert!(PropertyFilter::new().passes(&Properties::new()));
    }

    #[test]
    fn test_equality_and_exclusion() {
        let chair = Properties::new()
            .with("coarse_grained_class", "chair")
            .with("type", "Object");
        let floor = Properties::new().with("type", "Floor");

        let chairs = PropertyFilter::equals("coarse_grained_class", "chair");
        assert!(chairs.passes(&chair));
        assert!(!chairs.passes(&floor));

        let not_floor = PropertyFilter::new().without("type", "Floor");
        assert!(not_floor.passes(&chair));
        assert!(!not_floor.passes(&floor));
    }

    #[test]
    fn test_value_types_must_match() {
        let properties = Properties::new().with("category_id", 3);
        assert!(PropertyFilter::equals("category_id", 3).passes(&properties));
        assert!(!PropertyFilter::equals("category_id", "3").passes(&properties));
    }
}

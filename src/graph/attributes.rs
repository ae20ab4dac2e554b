//! Metadata attributes of a group or variable, with overrides applied.

use crate::config::ConfigRuleStore;
use crate::data::{AttributeSource, AttributeValue, Attributes};

/// The attributes of one group or variable.
///
/// Overrides from the rule store only fill gaps: an attribute present in the
/// granule keeps its native value, and override attributes absent from the
/// granule are added.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AttributeContainer {
    full_path: String,
    attributes: Attributes,
}

impl AttributeContainer {
    /// Read the native attributes of `source` and fill gaps from the
    /// overrides matching `full_path`.
    pub fn new<S: AttributeSource>(source: &S, full_path: &str, rules: &ConfigRuleStore) -> Self {
        Self::with_overrides(
            full_path,
            source.native_attributes(),
            rules.get_metadata_overrides(full_path),
        )
    }

    /// Combine already resolved native attributes and overrides.
    pub fn with_overrides(full_path: &str, native: Attributes, overrides: Attributes) -> Self {
        let mut attributes = native;
        for (name, value) in overrides {
            attributes.entry(name).or_insert(value);
        }

        Self {
            full_path: full_path.to_string(),
            attributes,
        }
    }

    /// Full path of the group or variable.
    pub fn full_path(&self) -> &str {
        &self.full_path
    }

    /// All attributes.
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Value of an attribute, if present.
    pub fn get_attribute_value(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    /// String value of an attribute, if present and a string.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).and_then(AttributeValue::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_only_fill_gaps() {
        let native = Attributes::from([
            ("units".to_string(), AttributeValue::from("m")),
            ("long_name".to_string(), AttributeValue::from("height")),
        ]);
        let overrides = Attributes::from([
            ("units".to_string(), AttributeValue::from("km")),
            ("coordinates".to_string(), AttributeValue::from("lat lon")),
        ]);

        let container = AttributeContainer::with_overrides("/g/h", native, overrides);

        assert_eq!(container.full_path(), "/g/h");
        assert_eq!(container.get_str("units"), Some("m"));
        assert_eq!(container.get_str("coordinates"), Some("lat lon"));
        assert_eq!(container.get_str("long_name"), Some("height"));
        assert_eq!(container.get_attribute_value("missing"), None);
    }
}

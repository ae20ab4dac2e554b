//! A group of a granule.

use super::attributes::AttributeContainer;
use crate::config::ConfigRuleStore;
use crate::data::{AttributeSource, AttributeValue, Attributes};
use std::collections::HashSet;

/// A group in the graph: its attributes and the full paths of the variables
/// it directly contains.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    container: AttributeContainer,
    variables: HashSet<String>,
}

impl Group {
    /// Build a group from its source node and child variable paths.
    pub fn new<S: AttributeSource>(
        source: &S,
        full_path: &str,
        rules: &ConfigRuleStore,
        variables: HashSet<String>,
    ) -> Self {
        Self {
            container: AttributeContainer::new(source, full_path, rules),
            variables,
        }
    }

    /// Full path of the group; `/` for the root.
    pub fn full_path(&self) -> &str {
        self.container.full_path()
    }

    /// All metadata attributes, including gap-filling overrides.
    pub fn attributes(&self) -> &Attributes {
        self.container.attributes()
    }

    /// Value of a metadata attribute.
    pub fn get_attribute_value(&self, name: &str) -> Option<&AttributeValue> {
        self.container.get_attribute_value(name)
    }

    /// Full paths of direct child variables.
    pub fn variables(&self) -> &HashSet<String> {
        &self.variables
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuleDocument;

    struct Node;

    impl AttributeSource for Node {
        fn name(&self) -> &str {
            "heights"
        }

        fn native_attributes(&self) -> Attributes {
            Attributes::from([("Description".to_string(), AttributeValue::from("photons"))])
        }
    }

    #[test]
    fn group_attributes_take_overrides() {
        let document: RuleDocument = serde_json::from_str(
            r#"{"MetadataOverrides": [
                {"Applicability": {"Mission": "ICESat2", "VariablePattern": "/gt1r/heights"},
                 "Attributes": [{"Name": "Description", "Value": "ignored"},
                                {"Name": "source", "Value": "ATL03"}]}
            ]}"#,
        )
        .unwrap();
        let rules = ConfigRuleStore::from_document(Some("ICESat2"), None, &document).unwrap();

        let variables = HashSet::from(["/gt1r/heights/h_ph".to_string()]);
        let group = Group::new(&Node, "/gt1r/heights", &rules, variables.clone());

        assert_eq!(group.full_path(), "/gt1r/heights");
        assert_eq!(group.variables(), &variables);
        assert_eq!(
            group.get_attribute_value("Description"),
            Some(&AttributeValue::from("photons"))
        );
        assert_eq!(
            group.get_attribute_value("source"),
            Some(&AttributeValue::from("ATL03"))
        );
    }
}

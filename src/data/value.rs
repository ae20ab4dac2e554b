//! Metadata attribute values.

use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Attribute name to value map for one group or variable.
pub type Attributes = HashMap<String, AttributeValue>;

/// A single metadata attribute value.
///
/// Values are scalars, lists of scalars (multi-value attributes), or nested
/// maps (container attributes in a DMR). The same type is used for values
/// read from a granule and values supplied by a rule file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// Boolean value (rule files only).
    Bool(bool),
    /// Any integer type.
    Int(i64),
    /// Any floating point type.
    Float(f64),
    /// String value.
    Str(String),
    /// Multi-value attribute.
    List(Vec<AttributeValue>),
    /// Container attribute holding nested attributes.
    Container(BTreeMap<String, AttributeValue>),
}

impl AttributeValue {
    /// Borrow the string content of a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(value) => Some(value),
            _ => None,
        }
    }

    /// Numeric content of a scalar value.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(value) => Some(*value as f64),
            Self::Float(value) => Some(*value),
            Self::Str(value) => value.trim().parse().ok(),
            _ => None,
        }
    }

    /// Elements of a list value.
    pub fn as_list(&self) -> Option<&[AttributeValue]> {
        match self {
            Self::List(values) => Some(values),
            _ => None,
        }
    }

    /// Look up a child attribute of a container value.
    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        match self {
            Self::Container(children) => children.get(name),
            _ => None,
        }
    }

    /// Collect the string content of a string or list-of-strings value.
    ///
    /// Reference attributes are usually a single string, but some granules
    /// store them as one string per element.
    pub fn text_fragments(&self) -> Vec<&str> {
        match self {
            Self::Str(value) => vec![value.as_str()],
            Self::List(values) => values.iter().filter_map(Self::as_str).collect(),
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{}", v),
            Self::Int(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::Str(v) => write!(f, "{}", v),
            Self::List(values) => {
                let parts: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            Self::Container(children) => {
                let parts: Vec<String> = children
                    .iter()
                    .map(|(name, value)| format!("{}: {}", name, value))
                    .collect();
                write!(f, "{{{}}}", parts.join(", "))
            }
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl<T: Into<AttributeValue>> From<Vec<T>> for AttributeValue {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_untagged_values() {
        let values: Vec<AttributeValue> =
            serde_json::from_str(r#"["text", 3, 1.5, true, [1, 2], {"a": "b"}]"#).unwrap();

        assert_eq!(values[0], AttributeValue::from("text"));
        assert_eq!(values[1], AttributeValue::Int(3));
        assert_eq!(values[2], AttributeValue::Float(1.5));
        assert_eq!(values[3], AttributeValue::Bool(true));
        assert_eq!(values[4], AttributeValue::from(vec![1i64, 2]));
        assert_eq!(values[5].get("a"), Some(&AttributeValue::from("b")));
    }

    #[test]
    fn text_fragments_of_list() {
        let value = AttributeValue::from(vec!["lat", "lon"]);
        assert_eq!(value.text_fragments(), vec!["lat", "lon"]);
        assert!(AttributeValue::Int(1).text_fragments().is_empty());
    }

    #[test]
    fn numeric_views() {
        assert_eq!(AttributeValue::Int(2).as_f64(), Some(2.0));
        assert_eq!(AttributeValue::from(" 4.5 ").as_f64(), Some(4.5));
        assert_eq!(AttributeValue::from(vec![1i64]).as_f64(), None);
    }
}

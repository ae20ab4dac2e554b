//! OPeNDAP Dataset Metadata Response (DMR) reader.
//!
//! A DMR is an XML document whose root element is a `Dataset`. Groups nest
//! as `<Group>` elements; variables are elements named after their DAP4 type
//! (e.g. `<Float64 name="lat">`), with `<Dim>` and `<Attribute>` children.

use super::source::{AttributeSource, GroupSource, VariableSource};
use super::{AttributeValue, Attributes};
use crate::error::{Result, VarInfoError};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Element names that denote a variable.
pub const DAP4_VARIABLE_TYPES: [&str; 14] = [
    "Char", "Byte", "Int8", "UInt8", "Int16", "UInt16", "Int32", "UInt32", "Int64", "UInt64",
    "Float32", "Float64", "String", "URL",
];

/// An owned XML element.
#[derive(Debug, Clone, Default)]
pub struct XmlElement {
    /// Local tag name, without any namespace prefix.
    pub tag: String,
    /// XML attributes of the element, keyed by qualified name.
    pub attributes: HashMap<String, String>,
    /// Child elements in document order.
    pub children: Vec<XmlElement>,
    /// Concatenated text content.
    pub text: String,
}

impl XmlElement {
    fn from_start(start: &BytesStart<'_>) -> Result<Self> {
        let mut element = Self {
            tag: String::from_utf8_lossy(start.local_name().as_ref()).into_owned(),
            ..Self::default()
        };

        for attr in start.attributes() {
            let attr = attr?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value()?.into_owned();
            element.attributes.insert(key, value);
        }

        Ok(element)
    }

    /// Value of an XML attribute on this element.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Child elements with the given local tag name.
    pub fn children_named<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a XmlElement> + 'a {
        self.children.iter().filter(move |child| child.tag == tag)
    }

    fn is_variable(&self) -> bool {
        DAP4_VARIABLE_TYPES.contains(&self.tag.as_str())
    }
}

/// A parsed DMR document.
#[derive(Debug, Clone)]
pub struct DmrDocument {
    root: XmlElement,
    namespace: String,
}

impl DmrDocument {
    /// Read and parse a `.dmr` file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| VarInfoError::file_open(path.to_path_buf(), e))?;
        Self::parse(&content)
    }

    /// Parse DMR content held in memory.
    pub fn parse(content: &str) -> Result<Self> {
        let root = parse_element_tree(content)?;

        if root.tag != "Dataset" {
            return Err(VarInfoError::DmrNamespace { tag: root.tag });
        }

        let namespace = root
            .attributes
            .iter()
            .find(|(key, _)| key.as_str() == "xmlns" || key.starts_with("xmlns:"))
            .map(|(_, value)| value.clone())
            .unwrap_or_default();

        Ok(Self { root, namespace })
    }

    /// XML namespace declared on the `Dataset` element.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The `Dataset` element, viewed as the root group.
    pub fn root_group(&self) -> DmrGroup<'_> {
        DmrGroup {
            element: &self.root,
            name: "/",
        }
    }
}

fn parse_element_tree(content: &str) -> Result<XmlElement> {
    let mut reader = Reader::from_str(content);
    reader.trim_text(true);

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => stack.push(XmlElement::from_start(&e)?),
            Event::Empty(e) => {
                let element = XmlElement::from_start(&e)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                if let Some(element) = stack.pop() {
                    attach(&mut stack, &mut root, element)?;
                }
            }
            Event::Text(t) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&t.unescape()?);
                }
            }
            Event::CData(t) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&t.into_inner()));
                }
            }
            Event::Eof => break,
            _ => {},
        }
    }

    if !stack.is_empty() {
        return Err(VarInfoError::Xml("unexpected end of document".to_string()));
    }

    root.ok_or_else(|| VarInfoError::Xml("document has no root element".to_string()))
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => return Err(VarInfoError::Xml("multiple root elements".to_string())),
    }
    Ok(())
}

/// Extract the value of an `<Attribute>` element, cast to its declared type.
///
/// Several `<Value>` children produce a list; `type="Container"` produces a
/// map of the nested attributes. An attribute without values yields `None`.
fn attribute_value(element: &XmlElement) -> Option<AttributeValue> {
    let value_type = element.attribute("type").unwrap_or("String");

    if value_type == "Container" {
        let children: BTreeMap<String, AttributeValue> = element
            .children_named("Attribute")
            .filter_map(|child| {
                Some((child.attribute("name")?.to_string(), attribute_value(child)?))
            })
            .collect();
        return Some(AttributeValue::Container(children));
    }

    let mut values: Vec<AttributeValue> = element
        .children_named("Value")
        .map(|value| cast_value(value_type, &value.text))
        .collect();

    match values.len() {
        0 => None,
        1 => values.pop(),
        _ => Some(AttributeValue::List(values)),
    }
}

fn cast_value(value_type: &str, text: &str) -> AttributeValue {
    match value_type {
        "Char" | "Byte" | "Int8" | "UInt8" | "Int16" | "UInt16" | "Int32" | "UInt32"
        | "Int64" | "UInt64" => text
            .trim()
            .parse::<i64>()
            .map(AttributeValue::Int)
            .unwrap_or_else(|_| AttributeValue::Str(text.to_string())),
        "Float32" | "Float64" => text
            .trim()
            .parse::<f64>()
            .map(AttributeValue::Float)
            .unwrap_or_else(|_| AttributeValue::Str(text.to_string())),
        _ => AttributeValue::Str(text.to_string()),
    }
}

fn element_attributes(element: &XmlElement) -> Attributes {
    element
        .children_named("Attribute")
        .filter_map(|attribute| {
            let name = attribute.attribute("name")?;
            Some((name.to_string(), attribute_value(attribute)?))
        })
        .collect()
}

/// A `<Group>` (or the root `<Dataset>`) element.
#[derive(Debug, Clone, Copy)]
pub struct DmrGroup<'a> {
    element: &'a XmlElement,
    name: &'a str,
}

impl AttributeSource for DmrGroup<'_> {
    fn name(&self) -> &str {
        self.name
    }

    fn native_attributes(&self) -> Attributes {
        element_attributes(self.element)
    }
}

impl<'a> GroupSource for DmrGroup<'a> {
    type Variable = DmrVariable<'a>;

    fn variables(&self) -> Vec<DmrVariable<'a>> {
        self.element
            .children
            .iter()
            .filter(|child| child.is_variable())
            .map(|element| DmrVariable { element })
            .collect()
    }

    fn groups(&self) -> Vec<DmrGroup<'a>> {
        self.element
            .children_named("Group")
            .map(|element| DmrGroup {
                element,
                name: element.attribute("name").unwrap_or_default(),
            })
            .collect()
    }

    fn dimensions(&self) -> Vec<(String, usize)> {
        self.element
            .children_named("Dimension")
            .filter_map(|dimension| {
                let name = dimension.attribute("name")?;
                let size = dimension.attribute("size")?.trim().parse().ok()?;
                Some((name.to_string(), size))
            })
            .collect()
    }
}

/// A variable element, e.g. `<Float64 name="latitude">`.
#[derive(Debug, Clone, Copy)]
pub struct DmrVariable<'a> {
    element: &'a XmlElement,
}

impl AttributeSource for DmrVariable<'_> {
    fn name(&self) -> &str {
        self.element.attribute("name").unwrap_or_default()
    }

    fn native_attributes(&self) -> Attributes {
        element_attributes(self.element)
    }
}

impl VariableSource for DmrVariable<'_> {
    fn data_type(&self) -> String {
        self.element.tag.to_lowercase()
    }

    fn raw_dimension_names(&self) -> Vec<String> {
        self.element
            .children_named("Dim")
            .filter_map(|dim| dim.attribute("name"))
            .map(str::to_string)
            .collect()
    }

    // Dimension sizes live on the groups, so shape is resolved by the graph.
    fn shape(&self) -> Option<Vec<usize>> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DMR: &str = r#"<?xml version="1.0" encoding="ISO-8859-1"?>
<Dataset xmlns="http://xml.opendap.org/ns/DAP/4.0#" name="granule.h5">
  <Dimension name="lat" size="3"/>
  <Attribute name="short_name" type="String"><Value>ATL03</Value></Attribute>
  <Float64 name="lat">
    <Dim name="/lat"/>
    <Attribute name="units" type="String"><Value>degrees_north</Value></Attribute>
    <Attribute name="valid_range" type="Float64"><Value>-90</Value><Value>90</Value></Attribute>
  </Float64>
  <Group name="METADATA">
    <Attribute name="HDF5_GLOBAL" type="Container">
      <Attribute name="count" type="Int32"><Value>7</Value></Attribute>
    </Attribute>
    <Group name="DatasetIdentification">
      <Attribute name="shortName"><Value>ATL03</Value></Attribute>
    </Group>
  </Group>
</Dataset>"#;

    #[test]
    fn parses_namespace_and_root() {
        let document = DmrDocument::parse(DMR).unwrap();
        assert_eq!(document.namespace(), "http://xml.opendap.org/ns/DAP/4.0#");

        let root = document.root_group();
        assert_eq!(root.name(), "/");
        assert_eq!(root.dimensions(), vec![("lat".to_string(), 3)]);
        assert_eq!(root.groups().len(), 1);
        assert_eq!(root.groups()[0].name(), "METADATA");
    }

    #[test]
    fn reads_variables_with_typed_attributes() {
        let document = DmrDocument::parse(DMR).unwrap();
        let variables = document.root_group().variables();
        assert_eq!(variables.len(), 1);

        let lat = &variables[0];
        assert_eq!(lat.name(), "lat");
        assert_eq!(lat.data_type(), "float64");
        assert_eq!(lat.raw_dimension_names(), vec!["/lat".to_string()]);

        let attributes = lat.native_attributes();
        assert_eq!(attributes["units"], AttributeValue::from("degrees_north"));
        assert_eq!(
            attributes["valid_range"],
            AttributeValue::from(vec![-90.0, 90.0])
        );
    }

    #[test]
    fn reads_container_attributes() {
        let document = DmrDocument::parse(DMR).unwrap();
        let metadata = document.root_group().groups().remove(0);
        let attributes = metadata.native_attributes();
        assert_eq!(
            attributes["HDF5_GLOBAL"].get("count"),
            Some(&AttributeValue::Int(7))
        );
    }

    #[test]
    fn finds_attribute_by_full_path() {
        let document = DmrDocument::parse(DMR).unwrap();
        let root = document.root_group();

        assert_eq!(
            root.find_attribute("/METADATA/DatasetIdentification/shortName"),
            Some(AttributeValue::from("ATL03"))
        );
        assert_eq!(
            root.find_attribute("short_name"),
            Some(AttributeValue::from("ATL03"))
        );
        assert_eq!(
            root.find_attribute("/METADATA/HDF5_GLOBAL/count"),
            Some(AttributeValue::Int(7))
        );
        assert_eq!(root.find_attribute("/METADATA/missing/shortName"), None);
    }

    #[test]
    fn rejects_non_dataset_root() {
        let error = DmrDocument::parse("<Group name=\"x\"></Group>").unwrap_err();
        assert!(matches!(error, VarInfoError::DmrNamespace { tag } if tag == "Group"));
    }

    #[test]
    fn rejects_truncated_document() {
        assert!(DmrDocument::parse("<Dataset><Float64 name=\"a\">").is_err());
    }
}

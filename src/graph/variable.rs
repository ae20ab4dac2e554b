//! A single variable of a granule, with fully qualified references.

use super::attributes::AttributeContainer;
use super::reference::{
    qualify_all, split_group_and_name, split_multivalue, CF_REFERENCE_ATTRIBUTES,
};
use crate::config::ConfigRuleStore;
use crate::data::{AttributeValue, Attributes, VariableSource};
use std::collections::{HashMap, HashSet};

const LATITUDE_UNITS: [&str; 6] = [
    "degrees_north",
    "degree_north",
    "degrees_N",
    "degree_N",
    "degreesN",
    "degreeN",
];

const LONGITUDE_UNITS: [&str; 6] = [
    "degrees_east",
    "degree_east",
    "degrees_E",
    "degree_E",
    "degreesE",
    "degreeE",
];

const PROJECTION_X_NAMES: [&str; 2] =
    ["projection_x_coordinate", "projection_x_angular_coordinate"];

const PROJECTION_Y_NAMES: [&str; 2] =
    ["projection_y_coordinate", "projection_y_angular_coordinate"];

/// A variable in the graph.
///
/// Every path in `references` and `dimensions` is absolute. Dimensions keep
/// the order of the array axes.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    container: AttributeContainer,
    group_path: Option<String>,
    name: String,
    data_type: String,
    shape: Option<Vec<usize>>,
    references: HashMap<String, HashSet<String>>,
    dimensions: Vec<String>,
}

impl Variable {
    /// Build a variable from its source node.
    ///
    /// A `dimensions` attribute among the overrides for this path replaces
    /// the dimension names stored in the granule.
    pub fn new<S: VariableSource>(source: &S, full_path: &str, rules: &ConfigRuleStore) -> Self {
        let overrides = rules.get_metadata_overrides(full_path);

        let raw_dimensions = match overrides.get("dimensions") {
            Some(value) => value
                .text_fragments()
                .into_iter()
                .flat_map(split_multivalue)
                .collect(),
            None => source.raw_dimension_names(),
        };

        let container =
            AttributeContainer::with_overrides(full_path, source.native_attributes(), overrides);

        Self::from_parts(
            container,
            source.data_type(),
            source.shape(),
            &raw_dimensions,
        )
    }

    /// Build a variable from attributes that already include any overrides.
    pub fn from_parts(
        container: AttributeContainer,
        data_type: String,
        shape: Option<Vec<usize>>,
        raw_dimensions: &[String],
    ) -> Self {
        let (group_path, name) = split_group_and_name(container.full_path());
        let references = cf_references(group_path.as_deref(), container.attributes());
        let dimensions = qualify_all(group_path.as_deref(), raw_dimensions);

        Self {
            container,
            group_path,
            name,
            data_type,
            shape,
            references,
            dimensions,
        }
    }

    /// Derive the shape from dimension sizes when the source has none.
    pub(crate) fn fill_shape(&mut self, dimension_sizes: &HashMap<String, usize>) {
        if self.shape.is_some() || self.dimensions.is_empty() {
            return;
        }

        self.shape = self
            .dimensions
            .iter()
            .map(|dimension| dimension_sizes.get(dimension).copied())
            .collect();
    }

    /// Absolute path of the variable.
    pub fn full_path(&self) -> &str {
        self.container.full_path()
    }

    /// Path of the containing group; `None` for variables at the root.
    pub fn group_path(&self) -> Option<&str> {
        self.group_path.as_deref()
    }

    /// Base name of the variable.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Data type, e.g. `float64`.
    pub fn data_type(&self) -> &str {
        &self.data_type
    }

    /// Array shape, when known.
    pub fn shape(&self) -> Option<&[usize]> {
        self.shape.as_deref()
    }

    /// All metadata attributes, including gap-filling overrides.
    pub fn attributes(&self) -> &Attributes {
        self.container.attributes()
    }

    /// Value of a metadata attribute.
    pub fn get_attribute_value(&self, name: &str) -> Option<&AttributeValue> {
        self.container.get_attribute_value(name)
    }

    /// Qualified references, keyed by CF reference attribute name.
    pub fn references(&self) -> &HashMap<String, HashSet<String>> {
        &self.references
    }

    /// Qualified references held in one CF reference attribute.
    pub fn references_for(&self, attribute_name: &str) -> Option<&HashSet<String>> {
        self.references.get(attribute_name)
    }

    /// Qualified dimensions, in axis order.
    pub fn dimensions(&self) -> &[String] {
        &self.dimensions
    }

    /// Dimensions and every CF reference, combined.
    pub fn get_references(&self) -> HashSet<String> {
        self.dimensions
            .iter()
            .chain(self.references.values().flatten())
            .cloned()
            .collect()
    }

    /// Whether the variable has at least one reference in `attribute_name`.
    pub fn has_references(&self, attribute_name: &str) -> bool {
        self.references
            .get(attribute_name)
            .map(|references| !references.is_empty())
            .unwrap_or(false)
    }

    fn units(&self) -> Option<&str> {
        self.container.get_str("units")
    }

    fn standard_name(&self) -> Option<&str> {
        self.container.get_str("standard_name")
    }

    /// Latitude, from `units` (CF Conventions section 4.1).
    pub fn is_latitude(&self) -> bool {
        self.units().map_or(false, |units| LATITUDE_UNITS.contains(&units))
    }

    /// Longitude, from `units` (CF Conventions section 4.2).
    pub fn is_longitude(&self) -> bool {
        self.units().map_or(false, |units| LONGITUDE_UNITS.contains(&units))
    }

    /// Latitude or longitude.
    pub fn is_geographic(&self) -> bool {
        self.is_latitude() || self.is_longitude()
    }

    /// Projected x coordinate, from `standard_name`. Geostationary
    /// projections use the angular variant.
    pub fn is_projection_x(&self) -> bool {
        self.standard_name()
            .map_or(false, |name| PROJECTION_X_NAMES.contains(&name))
    }

    /// Projected y coordinate, from `standard_name`.
    pub fn is_projection_y(&self) -> bool {
        self.standard_name()
            .map_or(false, |name| PROJECTION_Y_NAMES.contains(&name))
    }

    /// Projected x or y coordinate.
    pub fn is_projection_x_or_y(&self) -> bool {
        self.is_projection_x() || self.is_projection_y()
    }

    /// Horizontal spatial coordinate, geographic or projected.
    pub fn is_horizontal(&self) -> bool {
        self.is_geographic() || self.is_projection_x_or_y()
    }

    /// Time, from `units` of the form `<unit> since <epoch>` (CF Conventions
    /// section 4.4).
    pub fn is_temporal(&self) -> bool {
        self.units().map_or(false, |units| units.contains(" since "))
    }

    /// Valid data range, from `valid_range`, or else `valid_min` and
    /// `valid_max` together.
    pub fn get_range(&self) -> Option<[f64; 2]> {
        match self.valid_range() {
            Some(range) => Some(range),
            None => Some([
                self.numeric_attribute("valid_min")?,
                self.numeric_attribute("valid_max")?,
            ]),
        }
    }

    /// Minimum valid value, from `valid_min` or else `valid_range`.
    pub fn get_valid_min(&self) -> Option<f64> {
        self.numeric_attribute("valid_min")
            .or_else(|| self.valid_range().map(|range| range[0]))
    }

    /// Maximum valid value, from `valid_max` or else `valid_range`.
    pub fn get_valid_max(&self) -> Option<f64> {
        self.numeric_attribute("valid_max")
            .or_else(|| self.valid_range().map(|range| range[1]))
    }

    fn numeric_attribute(&self, name: &str) -> Option<f64> {
        self.get_attribute_value(name).and_then(AttributeValue::as_f64)
    }

    fn valid_range(&self) -> Option<[f64; 2]> {
        match self.get_attribute_value("valid_range")?.as_list()? {
            [min, max] => Some([min.as_f64()?, max.as_f64()?]),
            _ => None,
        }
    }
}

/// Qualify every CF reference attribute present on the variable.
fn cf_references(
    group_path: Option<&str>,
    attributes: &Attributes,
) -> HashMap<String, HashSet<String>> {
    CF_REFERENCE_ATTRIBUTES
        .iter()
        .filter_map(|&attribute_name| {
            let value = attributes.get(attribute_name)?;
            let tokens: Vec<String> = value
                .text_fragments()
                .into_iter()
                .flat_map(split_multivalue)
                .collect();
            let references = qualify_all(group_path, &tokens).into_iter().collect();
            Some((attribute_name.to_string(), references))
        })
        .collect()
}

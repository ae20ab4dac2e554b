//! Capabilities a granule representation must offer to build a variable graph.
//!
//! Two representations implement these traits: an OPeNDAP DMR document
//! (`data::dmr`) and a NetCDF-4 file (`data::netcdf4`). Nothing in `graph`
//! depends on either format directly.

use super::{AttributeValue, Attributes};

/// A node carrying metadata attributes (a group or a variable).
pub trait AttributeSource {
    /// Node name, without any group prefix.
    fn name(&self) -> &str;

    /// Attributes exactly as stored in the granule.
    fn native_attributes(&self) -> Attributes;
}

/// A variable node.
pub trait VariableSource: AttributeSource {
    /// String representation of the variable data type, e.g. `float64`.
    fn data_type(&self) -> String;

    /// Dimension names as stored within the variable, in axis order.
    fn raw_dimension_names(&self) -> Vec<String>;

    /// Array shape, if the representation records one.
    fn shape(&self) -> Option<Vec<usize>>;
}

/// A group node. The root group of a granule is named `/`.
pub trait GroupSource: AttributeSource + Sized {
    /// Variable type of this representation.
    type Variable: VariableSource;

    /// Variables that are direct children of this group.
    fn variables(&self) -> Vec<Self::Variable>;

    /// Groups that are direct children of this group.
    fn groups(&self) -> Vec<Self>;

    /// Named dimensions declared by this group, with their sizes.
    fn dimensions(&self) -> Vec<(String, usize)>;

    /// Look up a metadata attribute from its full path, e.g.
    /// `/METADATA/DatasetIdentification/shortName`.
    ///
    /// Leading path segments are matched against child group names first;
    /// any that remain are looked up inside container attributes.
    fn find_attribute(&self, attribute_path: &str) -> Option<AttributeValue> {
        let pieces: Vec<&str> = attribute_path
            .trim_start_matches('/')
            .split('/')
            .filter(|piece| !piece.is_empty())
            .collect();
        let (attribute_name, container_path) = pieces.split_last()?;

        let mut group_stack: Vec<Self> = Vec::new();
        let mut remaining = container_path;

        while let Some((next, rest)) = remaining.split_first() {
            let current = group_stack.last().unwrap_or(self);
            match current.groups().into_iter().find(|child| child.name() == *next) {
                Some(child) => {
                    group_stack.push(child);
                    remaining = rest;
                }
                None => break,
            }
        }

        let attributes = group_stack.last().unwrap_or(self).native_attributes();

        match remaining.split_first() {
            None => attributes.get(*attribute_name).cloned(),
            Some((container, rest)) => {
                let mut value = attributes.get(*container)?;
                for piece in rest {
                    value = value.get(piece)?;
                }
                value.get(attribute_name).cloned()
            }
        }
    }
}

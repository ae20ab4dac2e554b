//! NetCDF-4 file reader.
//!
//! The file is read eagerly into owned records and closed again, so the
//! graph never holds a handle to the underlying file.

use super::source::{AttributeSource, GroupSource, VariableSource};
use super::{AttributeValue, Attributes};
use crate::error::Result;
use std::path::Path;

/// A group read from a NetCDF-4 file.
#[derive(Debug, Clone, Default)]
pub struct NetCdfGroup {
    /// Group name, `/` for the root group.
    pub name: String,
    /// Group attributes.
    pub attributes: Attributes,
    /// Dimensions declared in this group.
    pub dimensions: Vec<(String, usize)>,
    /// Variables in this group.
    pub variables: Vec<NetCdfVariable>,
    /// Child groups.
    pub groups: Vec<NetCdfGroup>,
}

/// A variable read from a NetCDF-4 file.
#[derive(Debug, Clone, Default)]
pub struct NetCdfVariable {
    /// Variable name.
    pub name: String,
    /// Variable attributes.
    pub attributes: Attributes,
    /// Data type name, e.g. `float64`.
    pub data_type: String,
    /// Dimension names, in axis order.
    pub dimensions: Vec<String>,
    /// Array shape.
    pub shape: Vec<usize>,
}

/// NetCDF-4 reader.
#[derive(Debug)]
pub struct NetCdfReader;

impl NetCdfReader {
    /// Read the group hierarchy of a NetCDF-4 file.
    pub fn read_file(path: &Path) -> Result<NetCdfGroup> {
        let file = netcdf::open(path)?;

        let mut root = NetCdfGroup {
            name: "/".to_string(),
            ..NetCdfGroup::default()
        };

        for attr in file.attributes() {
            if let Some(value) = Self::attr_value(&attr) {
                root.attributes.insert(attr.name().to_string(), value);
            }
        }

        for dim in file.dimensions() {
            root.dimensions.push((dim.name().to_string(), dim.len()));
        }

        for var in file.variables() {
            root.variables.push(Self::read_variable(&var));
        }

        for group in file.groups()? {
            root.groups.push(Self::read_group(&group));
        }

        tracing::debug!(
            "Read {} root variables and {} groups from {}",
            root.variables.len(),
            root.groups.len(),
            path.display()
        );

        Ok(root)
    }

    fn read_group(group: &netcdf::Group<'_>) -> NetCdfGroup {
        let mut group_node = NetCdfGroup {
            name: group.name().to_string(),
            ..NetCdfGroup::default()
        };

        for attr in group.attributes() {
            if let Some(value) = Self::attr_value(&attr) {
                group_node.attributes.insert(attr.name().to_string(), value);
            }
        }

        for dim in group.dimensions() {
            group_node.dimensions.push((dim.name().to_string(), dim.len()));
        }

        for var in group.variables() {
            group_node.variables.push(Self::read_variable(&var));
        }

        for child_group in group.groups() {
            group_node.groups.push(Self::read_group(&child_group));
        }

        group_node
    }

    fn read_variable(var: &netcdf::Variable<'_>) -> NetCdfVariable {
        let mut attributes = Attributes::new();
        for attr in var.attributes() {
            if let Some(value) = Self::attr_value(&attr) {
                attributes.insert(attr.name().to_string(), value);
            }
        }

        NetCdfVariable {
            name: var.name().to_string(),
            attributes,
            data_type: Self::type_name(&format!("{:?}", var.vartype())),
            dimensions: var
                .dimensions()
                .iter()
                .map(|d: &netcdf::Dimension<'_>| d.name().to_string())
                .collect(),
            shape: var
                .dimensions()
                .iter()
                .map(|d: &netcdf::Dimension<'_>| d.len())
                .collect(),
        }
    }

    /// Map the library's debug representation of a type onto the short names
    /// used for DMR data types.
    fn type_name(debug_name: &str) -> String {
        let clean = debug_name.replace("NcVariableType::", "");
        let name = match clean.as_str() {
            "Int(I8)" => "int8",
            "Int(U8)" => "uint8",
            "Int(I16)" => "int16",
            "Int(U16)" => "uint16",
            "Int(I32)" => "int32",
            "Int(U32)" => "uint32",
            "Int(I64)" => "int64",
            "Int(U64)" => "uint64",
            "Float(F32)" => "float32",
            "Float(F64)" => "float64",
            "String" => "string",
            "Char" => "char",
            other => return other.to_lowercase(),
        };
        name.to_string()
    }

    fn attr_value(attr: &netcdf::Attribute<'_>) -> Option<AttributeValue> {
        use netcdf::AttributeValue as Nc;

        let value = match attr.value().ok()? {
            Nc::Uchar(v) => AttributeValue::Int(v.into()),
            Nc::Schar(v) => AttributeValue::Int(v.into()),
            Nc::Ushort(v) => AttributeValue::Int(v.into()),
            Nc::Short(v) => AttributeValue::Int(v.into()),
            Nc::Uint(v) => AttributeValue::Int(v.into()),
            Nc::Int(v) => AttributeValue::Int(v.into()),
            Nc::Ulonglong(v) => Self::unsigned(v),
            Nc::Longlong(v) => AttributeValue::Int(v),
            Nc::Float(v) => AttributeValue::Float(v.into()),
            Nc::Double(v) => AttributeValue::Float(v),
            Nc::Str(v) => AttributeValue::Str(v),
            Nc::Uchars(v) => Self::list(v.into_iter().map(|x| AttributeValue::Int(x.into()))),
            Nc::Schars(v) => Self::list(v.into_iter().map(|x| AttributeValue::Int(x.into()))),
            Nc::Ushorts(v) => Self::list(v.into_iter().map(|x| AttributeValue::Int(x.into()))),
            Nc::Shorts(v) => Self::list(v.into_iter().map(|x| AttributeValue::Int(x.into()))),
            Nc::Uints(v) => Self::list(v.into_iter().map(|x| AttributeValue::Int(x.into()))),
            Nc::Ints(v) => Self::list(v.into_iter().map(|x| AttributeValue::Int(x.into()))),
            Nc::Ulonglongs(v) => Self::list(v.into_iter().map(Self::unsigned)),
            Nc::Longlongs(v) => Self::list(v.into_iter().map(AttributeValue::Int)),
            Nc::Floats(v) => Self::list(v.into_iter().map(|x| AttributeValue::Float(x.into()))),
            Nc::Doubles(v) => Self::list(v.into_iter().map(AttributeValue::Float)),
            Nc::Strs(v) => Self::list(v.into_iter().map(AttributeValue::Str)),
        };

        Some(value)
    }

    fn unsigned(value: u64) -> AttributeValue {
        i64::try_from(value)
            .map(AttributeValue::Int)
            .unwrap_or(AttributeValue::Float(value as f64))
    }

    // Single-element arrays are scalars in practice.
    fn list(values: impl Iterator<Item = AttributeValue>) -> AttributeValue {
        let mut values: Vec<AttributeValue> = values.collect();
        if values.len() == 1 {
            values.remove(0)
        } else {
            AttributeValue::List(values)
        }
    }
}

impl AttributeSource for &NetCdfGroup {
    fn name(&self) -> &str {
        &self.name
    }

    fn native_attributes(&self) -> Attributes {
        self.attributes.clone()
    }
}

impl<'a> GroupSource for &'a NetCdfGroup {
    type Variable = &'a NetCdfVariable;

    fn variables(&self) -> Vec<&'a NetCdfVariable> {
        let group: &'a NetCdfGroup = *self;
        group.variables.iter().collect()
    }

    fn groups(&self) -> Vec<&'a NetCdfGroup> {
        let group: &'a NetCdfGroup = *self;
        group.groups.iter().collect()
    }

    fn dimensions(&self) -> Vec<(String, usize)> {
        self.dimensions.clone()
    }
}

impl AttributeSource for &NetCdfVariable {
    fn name(&self) -> &str {
        &self.name
    }

    fn native_attributes(&self) -> Attributes {
        self.attributes.clone()
    }
}

impl VariableSource for &NetCdfVariable {
    fn data_type(&self) -> String {
        self.data_type.clone()
    }

    fn raw_dimension_names(&self) -> Vec<String> {
        self.dimensions.clone()
    }

    fn shape(&self) -> Option<Vec<usize>> {
        Some(self.shape.clone())
    }
}

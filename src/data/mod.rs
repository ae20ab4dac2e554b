//! Granule representations.
//!
//! This module reads the metadata hierarchy of a granule, either from an
//! OPeNDAP DMR document or from a NetCDF-4 file, and exposes both through the
//! same source traits.

mod dmr;
mod netcdf4;
mod source;
mod value;

pub use dmr::{DmrDocument, DmrGroup, DmrVariable, XmlElement, DAP4_VARIABLE_TYPES};
pub use netcdf4::{NetCdfGroup, NetCdfReader, NetCdfVariable};
pub use source::{AttributeSource, GroupSource, VariableSource};
pub use value::{AttributeValue, Attributes};

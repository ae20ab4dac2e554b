//! VarInfo - variable relationships in Earth-observation granules.
//!
//! VarInfo reads the structure of a granule (an OPeNDAP DMR document or a
//! NetCDF-4 file) into a graph of groups and variables, resolving the
//! CF-Convention attributes that make one variable depend on another.
//! Collection-specific rules can supply metadata the granule lacks.
//!
//! # Features
//!
//! - DMR and NetCDF-4 readers behind one source interface
//! - Absolute-path resolution of `coordinates`, `bounds`, `grid_mapping` and
//!   the other CF reference attributes
//! - Science and metadata variable classification
//! - Required-variable closure for subset requests
//! - Spatial and temporal dimension lookup
//! - JSON or YAML rule documents with specificity-ordered attribute overrides
//!
//! # Example
//!
//! ```ignore
//! use std::collections::HashSet;
//! use std::path::Path;
//! use varinfo::{GraphConfig, VariableGraph};
//!
//! let config = GraphConfig::new().with_config_file("rules.json");
//! let graph = VariableGraph::from_file(Path::new("granule.dmr"), &config)?;
//!
//! let requested = HashSet::from(["/gt1r/heights/h_ph".to_string()]);
//! for path in graph.get_required_variables(&requested) {
//!     println!("{}", path);
//! }
//! ```

#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]
#![deny(unsafe_code)]

pub mod config;
pub mod data;
pub mod error;
pub mod graph;

pub use config::{ConfigRuleStore, GraphConfig};
pub use error::{Result, VarInfoError};
pub use graph::{Group, Variable, VariableGraph};

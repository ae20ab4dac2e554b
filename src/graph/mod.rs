//! Variable graph of a granule.
//!
//! A `VariableGraph` holds every group and variable of one granule, with
//! CF-Convention references resolved to absolute paths, and answers
//! questions about the relations between them: which variables are science
//! variables, which variables a subset request needs, which variables act
//! as spatial or temporal dimensions.
//!
//! The graph is built in a single pass over the granule and never changes
//! afterwards. It has no interior mutability, so a `&VariableGraph` can be
//! shared between threads and queried concurrently without locking.

mod attributes;
mod group;
mod reference;
mod variable;

pub use attributes::AttributeContainer;
pub use group::Group;
pub use reference::{
    join_path, qualify, qualify_all, split_group_and_name, split_multivalue,
    CF_REFERENCE_ATTRIBUTES,
};
pub use variable::Variable;

use crate::config::{ConfigRuleStore, GraphConfig, RuleDocument};
use crate::data::{AttributeSource, Attributes, DmrDocument, GroupSource, NetCdfReader};
use crate::error::{Result, VarInfoError};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::path::Path;

static FAKE_DIMENSION: Lazy<Regex> = Lazy::new(|| Regex::new(r"^.*/FakeDim\d+").unwrap());

/// Variables keyed by the ordered tuple of their dimensions.
pub type DimensionGroups = HashMap<Vec<String>, HashSet<String>>;

/// All groups and variables of one granule.
#[derive(Debug, Clone)]
pub struct VariableGraph {
    groups: HashMap<String, Group>,
    variables: HashMap<String, Variable>,
    all_referenced_paths: HashSet<String>,
    all_dimension_sizes: HashMap<String, usize>,
    rules: ConfigRuleStore,
}

impl VariableGraph {
    /// Build the graph of an OPeNDAP DMR document held in memory.
    pub fn from_dmr_str(content: &str, config: &GraphConfig) -> Result<Self> {
        let document = DmrDocument::parse(content)?;
        Self::build(document.root_group(), config)
    }

    /// Build the graph of an OPeNDAP `.dmr` file.
    pub fn from_dmr_file(path: &Path, config: &GraphConfig) -> Result<Self> {
        let document = DmrDocument::from_file(path)?;
        Self::build(document.root_group(), config)
    }

    /// Build the graph of a NetCDF-4 file.
    pub fn from_netcdf4_file(path: &Path, config: &GraphConfig) -> Result<Self> {
        let root = NetCdfReader::read_file(path)?;
        Self::build(&root, config)
    }

    /// Build the graph of a granule file, choosing the reader from the file
    /// extension.
    pub fn from_file(path: &Path, config: &GraphConfig) -> Result<Self> {
        let extension = path.extension().and_then(|s| s.to_str()).unwrap_or("");

        match extension.to_lowercase().as_str() {
            "dmr" | "xml" => Self::from_dmr_file(path, config),
            "nc" | "nc4" | "netcdf" | "h5" | "hdf5" | "he5" => {
                Self::from_netcdf4_file(path, config)
            }
            other => Err(VarInfoError::unsupported_format(other)),
        }
    }

    /// Build the graph from any granule representation.
    ///
    /// The rule document named by `config` is read once. The collection short
    /// name and mission are taken from `config` when set, otherwise they are
    /// discovered from the granule and the document.
    pub fn build<G: GroupSource>(root: G, config: &GraphConfig) -> Result<Self> {
        let document = config.read_document()?;

        let short_name = config
            .short_name
            .clone()
            .or_else(|| discover_short_name(&root, &document));
        let mission = match (&config.mission, &short_name) {
            (Some(mission), _) => Some(mission.clone()),
            (None, Some(short_name)) => document.mission_for(short_name)?.map(str::to_string),
            (None, None) => None,
        };

        tracing::debug!(
            "Collection short name: {:?}, mission: {:?}",
            short_name,
            mission
        );

        let rules =
            ConfigRuleStore::from_document(mission.as_deref(), short_name.as_deref(), &document)?;

        let mut groups = HashMap::new();
        let mut variables = HashMap::new();
        let mut all_dimension_sizes = HashMap::new();
        let mut pending = vec![("/".to_string(), root)];

        while let Some((group_path, group)) = pending.pop() {
            tracing::debug!("Reading group {}", group_path);

            for (name, size) in group.dimensions() {
                all_dimension_sizes.insert(join_path(&group_path, &name), size);
            }

            let mut child_paths = HashSet::new();
            for source in group.variables() {
                let full_path = join_path(&group_path, source.name());
                let variable = Variable::new(&source, &full_path, &rules);
                child_paths.insert(full_path.clone());
                variables.insert(full_path, variable);
            }

            groups.insert(
                group_path.clone(),
                Group::new(&group, &group_path, &rules, child_paths),
            );

            for child in group.groups() {
                let child_path = join_path(&group_path, child.name());
                pending.push((child_path, child));
            }
        }

        for variable in variables.values_mut() {
            variable.fill_shape(&all_dimension_sizes);
        }

        // Only references naming a variable of this granule count.
        let all_referenced_paths: HashSet<String> = variables
            .values()
            .flat_map(Variable::get_references)
            .filter(|path| variables.contains_key(path))
            .collect();

        tracing::info!(
            "Built variable graph: {} groups, {} variables, {} referenced",
            groups.len(),
            variables.len(),
            all_referenced_paths.len()
        );

        Ok(Self {
            groups,
            variables,
            all_referenced_paths,
            all_dimension_sizes,
            rules,
        })
    }

    /// Collection short name, given or discovered.
    pub fn short_name(&self) -> Option<&str> {
        self.rules.short_name()
    }

    /// Mission, given or looked up from the short name.
    pub fn mission(&self) -> Option<&str> {
        self.rules.mission()
    }

    /// Rules applied while building the graph.
    pub fn rules(&self) -> &ConfigRuleStore {
        &self.rules
    }

    /// Look up a variable by full path.
    pub fn get_variable(&self, path: &str) -> Option<&Variable> {
        self.variables.get(path)
    }

    /// Look up a group by full path; the root group is `/`.
    pub fn get_group(&self, path: &str) -> Option<&Group> {
        self.groups.get(path)
    }

    /// Full paths of every variable.
    pub fn get_all_variables(&self) -> HashSet<String> {
        self.variables.keys().cloned().collect()
    }

    /// Paths referenced by any variable, as a dimension or through a CF
    /// reference attribute, that name a variable in the granule.
    pub fn get_all_references(&self) -> &HashSet<String> {
        &self.all_referenced_paths
    }

    /// Size of a named dimension, by full path.
    pub fn get_dimension_size(&self, path: &str) -> Option<usize> {
        self.all_dimension_sizes.get(path).copied()
    }

    /// Whether a path matches an excluded science variable pattern.
    pub fn variable_is_excluded(&self, path: &str) -> bool {
        self.rules.is_excluded_science_variable(path)
    }

    /// Variables with a `coordinates` attribute, other than excluded
    /// science variables.
    pub fn get_variables_with_coordinates(&self) -> HashMap<&str, &Variable> {
        self.variables
            .iter()
            .filter(|(path, variable)| {
                variable.references_for("coordinates").is_some() && !self.variable_is_excluded(path)
            })
            .map(|(path, variable)| (path.as_str(), variable))
            .collect()
    }

    /// Whether a variable looks like a science variable.
    ///
    /// It does if one of its dimensions, other than itself or a `_bnds`
    /// dimension, is a geographic, projected or temporal variable, or if it
    /// references coordinates or a grid mapping.
    pub fn is_science_variable(&self, variable: &Variable) -> bool {
        let has_spatial_temporal_dimension = variable
            .dimensions()
            .iter()
            .filter(|dimension| {
                dimension.as_str() != variable.full_path() && !dimension.ends_with("_bnds")
            })
            .any(|dimension| self.is_spatial_temporal_dimension(dimension));

        has_spatial_temporal_dimension
            || variable.has_references("coordinates")
            || variable.has_references("grid_mapping")
    }

    fn is_spatial_temporal_dimension(&self, path: &str) -> bool {
        self.get_variable(path).map_or(false, |dimension| {
            dimension.is_geographic() || dimension.is_temporal() || dimension.is_projection_x_or_y()
        })
    }

    /// Top-level science variables: science-like variables that are neither
    /// excluded, referenced by another variable, nor `_bnds` variables.
    pub fn get_science_variables(&self) -> HashSet<String> {
        self.variables
            .iter()
            .filter(|(path, variable)| {
                self.is_science_variable(variable)
                    && !self.variable_is_excluded(path)
                    && !path.ends_with("_bnds")
                    && !self.all_referenced_paths.contains(*path)
            })
            .map(|(path, _)| path.clone())
            .collect()
    }

    /// Top-level metadata variables: unreferenced variables that are not
    /// science variables. Excluded science variables and `_bnds` variables
    /// land here.
    ///
    /// Together with `get_science_variables` and `get_all_references` this
    /// partitions every variable in the granule.
    pub fn get_metadata_variables(&self) -> HashSet<String> {
        self.variables
            .iter()
            .filter(|(path, variable)| {
                (!self.is_science_variable(variable)
                    || self.variable_is_excluded(path)
                    || path.ends_with("_bnds"))
                    && !self.all_referenced_paths.contains(*path)
            })
            .map(|(path, _)| path.clone())
            .collect()
    }

    /// Every variable needed to make a subset of `requested` usable.
    ///
    /// The requested paths and the collection's required variables are
    /// expanded with every dimension and reference that names a variable,
    /// transitively. Requested paths that are not in the granule are kept.
    /// Fake dimensions are removed from the result.
    pub fn get_required_variables(&self, requested: &HashSet<String>) -> HashSet<String> {
        let mut pending: Vec<String> = requested.iter().cloned().collect();
        pending.extend(
            self.variables
                .keys()
                .filter(|path| self.rules.is_required_variable(path))
                .cloned(),
        );

        let mut required = HashSet::new();

        while let Some(path) = pending.pop() {
            if !required.insert(path.clone()) {
                continue;
            }

            if let Some(variable) = self.get_variable(&path) {
                pending.extend(variable.get_references().into_iter().filter(|reference| {
                    self.variables.contains_key(reference) && !required.contains(reference)
                }));
            }
        }

        Self::exclude_fake_dimensions(required)
    }

    /// Drop placeholder dimensions such as `/group/FakeDim0` that a DMR
    /// generator adds for unnamed axes. They cannot be requested from a
    /// data server.
    pub fn exclude_fake_dimensions(paths: HashSet<String>) -> HashSet<String> {
        paths
            .into_iter()
            .filter(|path| !FAKE_DIMENSION.is_match(path))
            .collect()
    }

    /// Dimensions of the listed variables that are themselves variables.
    pub fn get_required_dimensions(&self, variables: &HashSet<String>) -> HashSet<String> {
        variables
            .iter()
            .filter_map(|path| self.get_variable(path))
            .flat_map(|variable| variable.dimensions().iter())
            .filter(|dimension| self.variables.contains_key(*dimension))
            .cloned()
            .collect()
    }

    fn dimensions_where(
        &self,
        variables: &HashSet<String>,
        predicate: impl Fn(&Variable) -> bool,
    ) -> HashSet<String> {
        self.get_required_dimensions(variables)
            .into_iter()
            .filter(|dimension| self.get_variable(dimension).map_or(false, &predicate))
            .collect()
    }

    /// Horizontal spatial dimensions of the listed variables, geographic or
    /// projected.
    pub fn get_spatial_dimensions(&self, variables: &HashSet<String>) -> HashSet<String> {
        self.dimensions_where(variables, Variable::is_horizontal)
    }

    /// Latitude and longitude dimensions of the listed variables.
    pub fn get_geographic_spatial_dimensions(
        &self,
        variables: &HashSet<String>,
    ) -> HashSet<String> {
        self.dimensions_where(variables, Variable::is_geographic)
    }

    /// Projected x and y dimensions of the listed variables.
    pub fn get_projected_spatial_dimensions(
        &self,
        variables: &HashSet<String>,
    ) -> HashSet<String> {
        self.dimensions_where(variables, Variable::is_projection_x_or_y)
    }

    /// Time dimensions of the listed variables.
    pub fn get_temporal_dimensions(&self, variables: &HashSet<String>) -> HashSet<String> {
        self.dimensions_where(variables, Variable::is_temporal)
    }

    /// Variables whose dimensions include every one of `dimensions`.
    pub fn get_variables_with_dimensions(&self, dimensions: &HashSet<String>) -> HashSet<String> {
        self.variables
            .iter()
            .filter(|(_, variable)| {
                dimensions
                    .iter()
                    .all(|dimension| variable.dimensions().contains(dimension))
            })
            .map(|(path, _)| path.clone())
            .collect()
    }

    /// Group every variable by its exact, ordered dimensions.
    pub fn group_variables_by_dimensions(&self) -> DimensionGroups {
        let mut grouped = DimensionGroups::new();

        for (path, variable) in &self.variables {
            grouped
                .entry(variable.dimensions().to_vec())
                .or_default()
                .insert(path.clone());
        }

        grouped
    }

    /// Group every variable by its horizontal spatial dimensions only, in
    /// order. Variables with no horizontal dimension share the empty key.
    pub fn group_variables_by_horizontal_dimensions(&self) -> DimensionGroups {
        let mut grouped = DimensionGroups::new();

        for (dimensions, paths) in self.group_variables_by_dimensions() {
            let horizontal: Vec<String> = dimensions
                .into_iter()
                .filter(|dimension| {
                    self.get_variable(dimension)
                        .map_or(false, Variable::is_horizontal)
                })
                .collect();

            grouped.entry(horizontal).or_default().extend(paths);
        }

        grouped
    }

    /// Combined references in one CF reference attribute of the listed
    /// variables. Paths that are not variables are skipped.
    pub fn get_references_for_attribute<S: AsRef<str>>(
        &self,
        variables: &[S],
        attribute_name: &str,
    ) -> HashSet<String> {
        variables
            .iter()
            .filter_map(|path| self.get_variable(path.as_ref()))
            .filter_map(|variable| variable.references_for(attribute_name))
            .flatten()
            .cloned()
            .collect()
    }

    /// Attributes configured for a variable the granule lacks, such as a
    /// grid mapping variable of a collection that is not fully CF compliant.
    pub fn get_missing_variable_attributes(&self, path: &str) -> Attributes {
        self.rules.get_metadata_overrides(path)
    }
}

/// First collection short name found at one of the document's candidate
/// attribute paths.
fn discover_short_name<G: GroupSource>(root: &G, document: &RuleDocument) -> Option<String> {
    document
        .collection_short_name_path
        .iter()
        .filter_map(|path| root.find_attribute(path))
        .find_map(|value| {
            value
                .text_fragments()
                .first()
                .map(|fragment| fragment.to_string())
        })
}

//! Collection configuration.
//!
//! A rule document maps collection short names to missions and carries
//! per-collection rules: excluded science variables, required variables and
//! metadata attribute overrides. `GraphConfig` names the document and any
//! identifiers already known for the granule.

mod document;
mod overrides;
mod rules;

pub use document::{
    Applicability, AttributeEntry, OverrideEntry, RuleDocument, VariableRule,
};
pub use overrides::{OverrideResolver, OverrideRule};
pub use rules::ConfigRuleStore;

use crate::error::Result;
use std::path::PathBuf;

/// Settings for building a variable graph.
///
/// This is the only place collection identifiers enter the graph; there is
/// no process-wide lookup state.
#[derive(Debug, Clone, Default)]
pub struct GraphConfig {
    /// Collection short name. Discovered from the granule when absent.
    pub short_name: Option<String>,
    /// Mission name. Looked up from the short name when absent.
    pub mission: Option<String>,
    /// Rule document (JSON or YAML).
    pub config_file: Option<PathBuf>,
}

impl GraphConfig {
    /// Create a configuration with no rule file and no known identifiers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the collection short name.
    pub fn with_short_name(mut self, short_name: impl Into<String>) -> Self {
        self.short_name = Some(short_name.into());
        self
    }

    /// Set the mission, bypassing the short name to mission lookup.
    pub fn with_mission(mut self, mission: impl Into<String>) -> Self {
        self.mission = Some(mission.into());
        self
    }

    /// Set the rule document path.
    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    /// Read the rule document, or an empty one when no file is configured.
    pub fn read_document(&self) -> Result<RuleDocument> {
        match &self.config_file {
            Some(path) => {
                tracing::info!("Reading configuration from {}", path.display());
                RuleDocument::from_path(path)
            }
            None => Ok(RuleDocument::default()),
        }
    }
}

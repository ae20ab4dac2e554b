//! Rule document model.
//!
//! A rule document is JSON or YAML:
//!
//! ```json
//! {
//!   "Mission": {"ATL\\d{2}": "ICESat2"},
//!   "CollectionShortNamePath": ["/METADATA/DatasetIdentification/shortName"],
//!   "ExcludedScienceVariables": [
//!     {"Applicability": {"Mission": "ICESat2"}, "VariablePattern": ["/orbit_info/.*"]}
//!   ],
//!   "RequiredVariables": [
//!     {
//!       "Applicability": {"Mission": "ICESat2"},
//!       "VariablePattern": ["/gt[123][lr]/geolocation/.*"]
//!     }
//!   ],
//!   "MetadataOverrides": [
//!     {
//!       "Applicability": {"Mission": "ICESat2", "ShortNamePath": "ATL03"},
//!       "Attributes": [{"Name": "units", "Value": "m"}],
//!       "ApplicabilityGroups": [
//!         {"Applicability": {"VariablePattern": "/gt1r/.*"},
//!          "Attributes": [{"Name": "coordinates", "Value": "lat lon"}]}
//!       ]
//!     }
//!   ]
//! }
//! ```

use super::overrides::prefix_regex;
use crate::data::AttributeValue;
use crate::error::{Result, VarInfoError};
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::Path;

/// The full rule document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct RuleDocument {
    /// Collection short-name pattern to mission name, in document order.
    pub mission: IndexMap<String, String>,
    /// Candidate attribute paths holding the collection short name.
    pub collection_short_name_path: Vec<String>,
    /// Variables that look like science variables but are not.
    pub excluded_science_variables: Vec<VariableRule>,
    /// Variables that accompany every subset request.
    pub required_variables: Vec<VariableRule>,
    /// Attribute overrides.
    pub metadata_overrides: Vec<OverrideEntry>,
}

/// Which granules and variables a rule applies to.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Applicability {
    /// Mission name pattern.
    pub mission: Option<String>,
    /// Collection short name pattern.
    pub short_name_path: Option<String>,
    /// Variable or group path pattern.
    pub variable_pattern: Option<String>,
}

/// An exclusion or requirement rule.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct VariableRule {
    /// Granule applicability.
    pub applicability: Applicability,
    /// Patterns of the affected variable paths.
    pub variable_pattern: Vec<String>,
}

/// An override entry, possibly holding nested child entries.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct OverrideEntry {
    /// Applicability; missing mission and short name inherit from the parent.
    pub applicability: Applicability,
    /// Attributes to apply.
    pub attributes: Vec<AttributeEntry>,
    /// Child entries.
    pub applicability_groups: Vec<OverrideEntry>,
}

/// A single `{Name, Value}` attribute pair.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AttributeEntry {
    /// Attribute name.
    pub name: String,
    /// Attribute value.
    pub value: AttributeValue,
}

impl RuleDocument {
    /// Read a rule document, choosing the parser from the file extension.
    ///
    /// Fails with `ConfigFileMissing` if nothing exists at `path` and with
    /// `ConfigFileInvalidFormat` for anything other than JSON or YAML.
    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(VarInfoError::config_file_missing(path));
        }

        let extension = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "json" => {
                let content = std::fs::read_to_string(path)?;
                serde_json::from_str(&content).map_err(|e| VarInfoError::config_parse(path, e))
            }
            "yml" | "yaml" => {
                let content = std::fs::read_to_string(path)?;
                serde_yaml::from_str(&content).map_err(|e| VarInfoError::config_parse(path, e))
            }
            _ => Err(VarInfoError::config_file_invalid_format(path)),
        }
    }

    /// Mission of the first `Mission` entry whose pattern matches the start
    /// of the collection short name.
    ///
    /// Fails with `InvalidPattern` on the first pattern that does not compile.
    pub fn mission_for(&self, short_name: &str) -> Result<Option<&str>> {
        for (pattern, mission) in &self.mission {
            if prefix_regex(pattern)?.is_match(short_name) {
                return Ok(Some(mission.as_str()));
            }
        }
        Ok(None)
    }
}

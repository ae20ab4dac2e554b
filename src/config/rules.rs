//! Collection-specific configuration rules.
//!
//! A `ConfigRuleStore` keeps only the parts of a rule document that apply to
//! one mission and collection short name: the excluded science variable
//! patterns, the required variable patterns and the metadata overrides.

use super::document::{Applicability, OverrideEntry, RuleDocument, VariableRule};
use super::overrides::{prefix_regex, OverrideResolver, OverrideRule};
use crate::data::Attributes;
use crate::error::{Result, VarInfoError};
use regex::RegexSet;
use std::collections::HashSet;
use std::path::Path;

/// Rules from a rule document applicable to a single collection.
#[derive(Debug, Clone)]
pub struct ConfigRuleStore {
    mission: Option<String>,
    short_name: Option<String>,
    excluded_science_variables: HashSet<String>,
    required_variables: HashSet<String>,
    excluded_set: RegexSet,
    required_set: RegexSet,
    overrides: OverrideResolver,
}

impl Default for ConfigRuleStore {
    fn default() -> Self {
        Self {
            mission: None,
            short_name: None,
            excluded_science_variables: HashSet::new(),
            required_variables: HashSet::new(),
            excluded_set: RegexSet::empty(),
            required_set: RegexSet::empty(),
            overrides: OverrideResolver::new(),
        }
    }
}

impl ConfigRuleStore {
    /// Load the rules applicable to a mission and collection short name.
    ///
    /// Without a mission no rule can apply, so the store is empty and the
    /// file is not read at all. Otherwise a named file must exist and be a
    /// JSON or YAML document.
    pub fn load(
        mission: Option<&str>,
        short_name: Option<&str>,
        rule_file: Option<&Path>,
    ) -> Result<Self> {
        if mission.is_none() {
            return Ok(Self::empty(short_name));
        }

        let document = match rule_file {
            Some(path) => {
                tracing::info!("Reading configuration rules from {}", path.display());
                RuleDocument::from_path(path)?
            }
            None => RuleDocument::default(),
        };

        Self::from_document(mission, short_name, &document)
    }

    /// Build the store from an already parsed document.
    pub fn from_document(
        mission: Option<&str>,
        short_name: Option<&str>,
        document: &RuleDocument,
    ) -> Result<Self> {
        let Some(mission) = mission else {
            return Ok(Self::empty(short_name));
        };

        let matcher = Applicable {
            mission,
            short_name,
        };

        let excluded_science_variables =
            matcher.variable_patterns(&document.excluded_science_variables)?;
        let required_variables = matcher.variable_patterns(&document.required_variables)?;

        let mut overrides = OverrideResolver::new();
        for (pattern, attributes) in matcher.flatten_overrides(&document.metadata_overrides)? {
            overrides.insert(OverrideRule::new(pattern, attributes)?);
        }

        tracing::debug!(
            "Rules for {} {}: {} excluded, {} required, {} overrides",
            mission,
            short_name.unwrap_or("<no short name>"),
            excluded_science_variables.len(),
            required_variables.len(),
            overrides.rules().len()
        );

        Ok(Self {
            mission: Some(mission.to_string()),
            short_name: short_name.map(str::to_string),
            excluded_set: pattern_set(&excluded_science_variables)?,
            required_set: pattern_set(&required_variables)?,
            excluded_science_variables,
            required_variables,
            overrides,
        })
    }

    fn empty(short_name: Option<&str>) -> Self {
        Self {
            short_name: short_name.map(str::to_string),
            ..Self::default()
        }
    }

    /// Mission the rules were selected for.
    pub fn mission(&self) -> Option<&str> {
        self.mission.as_deref()
    }

    /// Collection short name the rules were selected for.
    pub fn short_name(&self) -> Option<&str> {
        self.short_name.as_deref()
    }

    /// Patterns of variables that must never be classed as science variables.
    pub fn excluded_science_variables(&self) -> &HashSet<String> {
        &self.excluded_science_variables
    }

    /// Patterns of variables required in every subset.
    pub fn required_variables(&self) -> &HashSet<String> {
        &self.required_variables
    }

    /// The applicable override rules.
    pub fn overrides(&self) -> &OverrideResolver {
        &self.overrides
    }

    /// Merged metadata overrides for a variable or group path.
    pub fn get_metadata_overrides(&self, path: &str) -> Attributes {
        self.overrides.resolve(path)
    }

    /// Whether `path` matches any excluded science variable pattern.
    pub fn is_excluded_science_variable(&self, path: &str) -> bool {
        self.excluded_set.is_match(path)
    }

    /// Whether `path` matches any required variable pattern.
    pub fn is_required_variable(&self, path: &str) -> bool {
        self.required_set.is_match(path)
    }
}

fn pattern_set(patterns: &HashSet<String>) -> Result<RegexSet> {
    // Compile one at a time first, so the offending pattern is reported.
    for pattern in patterns {
        prefix_regex(pattern)?;
    }

    let anchored = patterns.iter().map(|pattern| format!("^(?:{})", pattern));
    RegexSet::new(anchored).map_err(|e| {
        let joined: Vec<&str> = patterns.iter().map(String::as_str).collect();
        VarInfoError::invalid_pattern(joined.join("|"), e)
    })
}

/// Applicability test for one mission and short name.
struct Applicable<'a> {
    mission: &'a str,
    short_name: Option<&'a str>,
}

impl Applicable<'_> {
    /// Mission pattern must match the start of the mission; a short name
    /// pattern, if given, must match the start of the short name. Patterns
    /// that do not compile fail with `InvalidPattern`.
    fn is_applicable(
        &self,
        mission_pattern: Option<&str>,
        short_name_pattern: Option<&str>,
    ) -> Result<bool> {
        let Some(mission_pattern) = mission_pattern else {
            return Ok(false);
        };

        let mission_matches = prefix_regex(mission_pattern)?.is_match(self.mission);

        let short_name_matches = match short_name_pattern {
            None => true,
            Some(pattern) => {
                let regex = prefix_regex(pattern)?;
                self.short_name
                    .map_or(false, |short_name| regex.is_match(short_name))
            }
        };

        Ok(mission_matches && short_name_matches)
    }

    fn variable_patterns(&self, rules: &[VariableRule]) -> Result<HashSet<String>> {
        let mut patterns = HashSet::new();
        for rule in rules {
            let applicable = self.is_applicable(
                rule.applicability.mission.as_deref(),
                rule.applicability.short_name_path.as_deref(),
            )?;
            if applicable {
                patterns.extend(rule.variable_pattern.iter().cloned());
            }
        }
        Ok(patterns)
    }

    /// Flatten nested override entries into `(pattern, attributes)` pairs in
    /// document order. Children inherit a missing mission or short name from
    /// their parent; a missing variable pattern means every path.
    fn flatten_overrides(&self, entries: &[OverrideEntry]) -> Result<Vec<(String, Attributes)>> {
        let mut flattened = Vec::new();
        let mut pending: Vec<(&OverrideEntry, Option<&str>, Option<&str>)> =
            entries.iter().rev().map(|entry| (entry, None, None)).collect();

        while let Some((entry, parent_mission, parent_short_name)) = pending.pop() {
            let Applicability {
                mission,
                short_name_path,
                variable_pattern,
            } = &entry.applicability;

            let mission = mission.as_deref().or(parent_mission);
            let short_name = short_name_path.as_deref().or(parent_short_name);

            if !entry.attributes.is_empty() && self.is_applicable(mission, short_name)? {
                let attributes: Attributes = entry
                    .attributes
                    .iter()
                    .map(|attribute| (attribute.name.clone(), attribute.value.clone()))
                    .collect();
                let pattern = variable_pattern.clone().unwrap_or_else(|| ".*".to_string());
                flattened.push((pattern, attributes));
            }

            for child in entry.applicability_groups.iter().rev() {
                pending.push((child, mission, short_name));
            }
        }

        Ok(flattened)
    }
}

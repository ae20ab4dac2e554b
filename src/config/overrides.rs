//! Metadata override resolution.
//!
//! Several override rules may match the same path. They are ordered by
//! specificity, shallowest first: primarily by the number of `/` characters
//! in the pattern, then by pattern length. Attribute maps are merged in that
//! order so the most specific value for each attribute name wins, while
//! attributes from less specific rules that are not redefined survive.

use crate::data::Attributes;
use crate::error::{Result, VarInfoError};
use regex::Regex;

/// Compile a pattern so that it matches at the start of a string only.
pub(crate) fn prefix_regex(pattern: &str) -> Result<Regex> {
    Regex::new(&format!("^(?:{})", pattern))
        .map_err(|e| VarInfoError::invalid_pattern(pattern, e))
}

/// A single applicable override rule.
#[derive(Debug, Clone)]
pub struct OverrideRule {
    pattern: String,
    regex: Regex,
    attributes: Attributes,
}

impl OverrideRule {
    /// Create a rule for a variable-path pattern.
    pub fn new(pattern: impl Into<String>, attributes: Attributes) -> Result<Self> {
        let pattern = pattern.into();
        let regex = prefix_regex(&pattern)?;
        Ok(Self {
            pattern,
            regex,
            attributes,
        })
    }

    /// The variable-path pattern as written in the rule file.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Overriding attributes.
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Whether the pattern matches the start of `path`.
    pub fn matches(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// Sort key: hierarchy depth of the pattern, then its length.
    pub fn specificity(&self) -> (usize, usize) {
        (self.pattern.matches('/').count(), self.pattern.len())
    }
}

/// Resolves the merged overrides for a variable or group path.
#[derive(Debug, Clone, Default)]
pub struct OverrideResolver {
    rules: Vec<OverrideRule>,
}

impl OverrideResolver {
    /// Create an empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule. A rule with the same pattern as an existing one replaces
    /// it in place.
    pub fn insert(&mut self, rule: OverrideRule) {
        match self.rules.iter_mut().find(|r| r.pattern == rule.pattern) {
            Some(existing) => *existing = rule,
            None => self.rules.push(rule),
        }
    }

    /// All rules, in registration order.
    pub fn rules(&self) -> &[OverrideRule] {
        &self.rules
    }

    /// Whether there are no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Merge the attributes of every rule matching `path`, least specific
    /// first. Returns an empty map when nothing matches.
    pub fn resolve(&self, path: &str) -> Attributes {
        let mut matching: Vec<&OverrideRule> =
            self.rules.iter().filter(|rule| rule.matches(path)).collect();

        // Stable sort: equal specificity keeps registration order.
        matching.sort_by_key(|rule| rule.specificity());

        let mut merged = Attributes::new();
        for rule in matching {
            for (name, value) in &rule.attributes {
                merged.insert(name.clone(), value.clone());
            }
        }
        merged
    }
}

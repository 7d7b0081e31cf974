//! # Rule Configuration Module
//!
//! The rule file (`.scm-engine.yml` by default) describes the labels and
//! actions the rule engine applies to merge requests. This module only
//! models, parses and validates it; evaluation happens downstream.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

// ============================================================================
// Configuration Types
// ============================================================================

/// Parsed rule configuration.
///
/// Immutable after parsing and shared as `Arc<RuleConfig>`. Unknown keys are
/// ignored so files written for newer engines still load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Evaluate rules without changing the merge request
    #[serde(default)]
    pub dry_run: bool,

    #[serde(default, rename = "label")]
    pub labels: Vec<LabelRule>,

    #[serde(default)]
    pub actions: Vec<ActionRule>,
}

/// A label the engine may add to or remove from a merge request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelRule {
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub color: Option<String>,

    #[serde(default)]
    pub strategy: LabelStrategy,

    /// Expression deciding whether the label applies
    #[serde(default)]
    pub script: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelStrategy {
    /// One label, added or removed by its script
    #[default]
    Conditional,
    /// Label names produced by the script
    Generate,
}

/// A conditional group of steps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRule {
    pub name: String,

    #[serde(rename = "if")]
    pub condition: String,

    #[serde(default)]
    pub then: Vec<ActionStep>,
}

/// One step of an action; arguments depend on the step kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionStep {
    pub action: String,

    #[serde(flatten)]
    pub arguments: BTreeMap<String, serde_yaml::Value>,
}

impl RuleConfig {
    /// Parse and validate a rule file's raw bytes.
    ///
    /// # Errors
    /// - `RuleConfigError::Parse` - invalid YAML or wrong structure
    /// - `RuleConfigError::Invalid` - structurally valid but inconsistent
    pub fn parse(bytes: &[u8]) -> Result<Self, RuleConfigError> {
        let config: RuleConfig = serde_yaml::from_slice(bytes)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a rule file from disk.
    ///
    /// Used for the process-wide fallback configuration.
    ///
    /// # Errors
    /// - `RuleConfigError::FileNotFound` - nothing at `path`
    /// - `RuleConfigError::Read` - file exists but cannot be read
    /// - plus everything [`RuleConfig::parse`] returns
    pub fn load_from_file(path: &Path) -> Result<Self, RuleConfigError> {
        if !path.exists() {
            return Err(RuleConfigError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let contents = std::fs::read(path).map_err(|e| RuleConfigError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        Self::parse(&contents)
    }

    /// Check names and steps.
    ///
    /// All problems are collected rather than stopping at the first one.
    pub fn validate(&self) -> Result<(), RuleConfigError> {
        let mut errors = Vec::new();

        let mut seen_labels = HashSet::new();
        for (index, label) in self.labels.iter().enumerate() {
            if label.name.trim().is_empty() {
                errors.push(format!("label #{} has an empty name", index));
            } else if !seen_labels.insert(label.name.as_str()) {
                errors.push(format!("duplicate label name: {}", label.name));
            }
        }

        for (index, action) in self.actions.iter().enumerate() {
            if action.name.trim().is_empty() {
                errors.push(format!("action #{} has an empty name", index));
            }

            if action.then.is_empty() {
                errors.push(format!("action '{}' has no steps", action.name));
            }

            for step in &action.then {
                if step.action.trim().is_empty() {
                    errors.push(format!(
                        "action '{}' has a step with an empty action",
                        action.name
                    ));
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(RuleConfigError::Invalid { errors })
        }
    }
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum RuleConfigError {
    #[error("configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("failed to read configuration file {path}: {message}")]
    Read { path: String, message: String },

    #[error("invalid configuration syntax: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid configuration: {}", .errors.join("; "))]
    Invalid { errors: Vec<String> },
}

#[cfg(test)]
#[path = "rule_config_tests.rs"]
mod tests;

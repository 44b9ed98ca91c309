//! Governance rules.
//!
//! A rule is a pure check over a [`Document`] and a [`GovernanceConfig`]
//! that yields zero or more messages of one fixed [`Severity`]. Rules never
//! look at each other's output; the evaluator runs every rule of a
//! [`RuleSet`] unconditionally and concatenates what they produce.

pub mod deployment;
pub mod model;

use serde::{Deserialize, Serialize};

use crate::config::GovernanceConfig;
use crate::document::Document;

pub use deployment::DeploymentRule;
pub use model::ModelRule;

/// Blocking (`deny`) or advisory (`warn`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Deny,
    Warn,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Deny => "deny",
            Severity::Warn => "warn",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One rule's output when its predicate holds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Finding {
    /// Name of the rule that fired.
    pub rule: String,
    pub severity: Severity,
    pub message: String,
}

/// The seam between a rule set's rules and the evaluator.
pub trait Rule {
    /// Stable snake_case identifier.
    fn name(&self) -> &'static str;

    fn severity(&self) -> Severity;

    /// Messages for every violation found; empty when the rule does not fire.
    fn check(&self, doc: &Document, config: &GovernanceConfig) -> Vec<String>;
}

/// Which document shape a rule set governs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleSetKind {
    Model,
    Deployment,
}

impl RuleSetKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RuleSetKind::Model => "model",
            RuleSetKind::Deployment => "deployment",
        }
    }
}

impl std::fmt::Display for RuleSetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RuleSetKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "model" => Ok(RuleSetKind::Model),
            "deployment" => Ok(RuleSetKind::Deployment),
            other => Err(format!(
                "unknown rule set '{}' (expected 'model' or 'deployment')",
                other
            )),
        }
    }
}

/// An ordered collection of rules. Order only affects the order of findings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RuleSet<R> {
    pub rules: Vec<R>,
}

impl<R: PartialEq> RuleSet<R> {
    /// Add a rule (builder pattern).
    pub fn with_rule(mut self, rule: R) -> Self {
        self.rules.push(rule);
        self
    }

    /// Drop every occurrence of a rule.
    pub fn without(mut self, rule: &R) -> Self {
        self.rules.retain(|r| r != rule);
        self
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl RuleSet<ModelRule> {
    /// Every model governance rule.
    pub fn standard() -> Self {
        Self {
            rules: ModelRule::ALL.to_vec(),
        }
    }
}

impl RuleSet<DeploymentRule> {
    /// Every deployment governance rule.
    pub fn standard() -> Self {
        Self {
            rules: DeploymentRule::ALL.to_vec(),
        }
    }
}

//! Governance evaluator.
//!
//! Runs every rule of a [`RuleSet`] against one [`Document`] and aggregates
//! the findings into an [`EvaluationResult`]. There is no fail-fast mode: a
//! rule never suppresses another, so one missing section may legitimately
//! produce several findings. The decision is derived, never stored
//! separately: `allow` holds iff no deny finding exists.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::config::GovernanceConfig;
use crate::document::{Document, DocumentFormat};
use crate::error::InputError;
use crate::obs;
use crate::rules::{DeploymentRule, Finding, ModelRule, Rule, RuleSet, RuleSetKind, Severity};

/// The gate decision handed to the reporting/gating collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub allow: bool,
    pub deny: Vec<String>,
    pub warn: Vec<String>,
}

/// All findings of one evaluation, in rule-evaluation order.
///
/// Built only by the evaluator, so `allow` always agrees with `findings`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvaluationResult {
    findings: Vec<Finding>,
    allow: bool,
}

impl EvaluationResult {
    fn from_findings(findings: Vec<Finding>) -> Self {
        let allow = !findings.iter().any(|f| f.severity == Severity::Deny);
        Self { findings, allow }
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    /// `true` iff no finding has deny severity.
    pub fn allow(&self) -> bool {
        self.allow
    }

    fn messages(&self, severity: Severity) -> impl Iterator<Item = &str> {
        self.findings
            .iter()
            .filter(move |f| f.severity == severity)
            .map(|f| f.message.as_str())
    }

    /// Deny messages.
    pub fn deny(&self) -> Vec<&str> {
        self.messages(Severity::Deny).collect()
    }

    /// Warn messages.
    pub fn warn(&self) -> Vec<&str> {
        self.messages(Severity::Warn).collect()
    }

    pub fn deny_count(&self) -> usize {
        self.messages(Severity::Deny).count()
    }

    pub fn warn_count(&self) -> usize {
        self.messages(Severity::Warn).count()
    }

    /// The `(allow, deny, warn)` output shape.
    pub fn decision(&self) -> Decision {
        Decision {
            allow: self.allow,
            deny: self.deny().into_iter().map(str::to_string).collect(),
            warn: self.warn().into_iter().map(str::to_string).collect(),
        }
    }
}

/// Evaluate `doc` against an explicit rule set.
pub fn evaluate_rules<R: Rule>(
    rule_set: &RuleSet<R>,
    doc: &Document,
    config: &GovernanceConfig,
) -> EvaluationResult {
    let mut seen: HashSet<(Severity, String)> = HashSet::new();
    let mut findings = Vec::new();

    for rule in &rule_set.rules {
        let severity = rule.severity();
        let messages = rule.check(doc, config);
        if !messages.is_empty() {
            obs::emit_rule_fired(rule.name(), severity, messages.len());
        }
        for message in messages {
            if seen.insert((severity, message.clone())) {
                findings.push(Finding {
                    rule: rule.name().to_string(),
                    severity,
                    message,
                });
            }
        }
    }

    EvaluationResult::from_findings(findings)
}

/// Evaluate `doc` against the standard rule set of `kind`.
pub fn evaluate(kind: RuleSetKind, doc: &Document, config: &GovernanceConfig) -> EvaluationResult {
    let _span = obs::EvaluationSpan::enter(kind);
    let result = match kind {
        RuleSetKind::Model => {
            let rules = RuleSet::<ModelRule>::standard();
            obs::emit_evaluation_started(kind, rules.len());
            evaluate_rules(&rules, doc, config)
        }
        RuleSetKind::Deployment => {
            let rules = RuleSet::<DeploymentRule>::standard();
            obs::emit_evaluation_started(kind, rules.len());
            evaluate_rules(&rules, doc, config)
        }
    };
    obs::emit_evaluation_finished(kind, result.deny_count(), result.warn_count(), result.allow());
    result
}

/// Parse raw text and evaluate it.
///
/// # Errors
///
/// `InputError` when the text is not a well-formed mapping; no partial
/// result is produced in that case.
pub fn evaluate_source(
    kind: RuleSetKind,
    text: &str,
    format: DocumentFormat,
    config: &GovernanceConfig,
) -> Result<EvaluationResult, InputError> {
    let doc = Document::parse(text, format).inspect_err(obs::emit_input_rejected)?;
    Ok(evaluate(kind, &doc, config))
}

/// `(name, severity)` of every rule in the standard set of `kind`.
pub fn rule_catalog(kind: RuleSetKind) -> Vec<(&'static str, Severity)> {
    match kind {
        RuleSetKind::Model => ModelRule::ALL
            .iter()
            .map(|r| (r.name(), r.severity()))
            .collect(),
        RuleSetKind::Deployment => DeploymentRule::ALL
            .iter()
            .map(|r| (r.name(), r.severity()))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Test-only rule that fires a fixed list of messages.
    #[derive(Debug, Clone, PartialEq)]
    struct Fixed(Severity, Vec<&'static str>);

    impl Rule for Fixed {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn severity(&self) -> Severity {
            self.0
        }

        fn check(&self, _doc: &Document, _config: &GovernanceConfig) -> Vec<String> {
            self.1.iter().map(|s| s.to_string()).collect()
        }
    }

    fn empty_doc() -> Document {
        Document::from_value(json!({})).expect("object root")
    }

    #[test]
    fn test_no_rules_allows() {
        let set: RuleSet<Fixed> = RuleSet { rules: vec![] };
        let result = evaluate_rules(&set, &empty_doc(), &GovernanceConfig::default());
        assert!(result.allow());
        assert!(result.findings().is_empty());
    }

    #[test]
    fn test_warn_only_allows() {
        let set = RuleSet {
            rules: vec![Fixed(Severity::Warn, vec!["a", "b"])],
        };
        let result = evaluate_rules(&set, &empty_doc(), &GovernanceConfig::default());
        assert!(result.allow());
        assert_eq!(result.warn(), vec!["a", "b"]);
    }

    #[test]
    fn test_single_deny_blocks() {
        let set = RuleSet {
            rules: vec![
                Fixed(Severity::Warn, vec!["w1", "w2", "w3"]),
                Fixed(Severity::Deny, vec!["d"]),
            ],
        };
        let result = evaluate_rules(&set, &empty_doc(), &GovernanceConfig::default());
        assert!(!result.allow());
        assert_eq!(result.deny_count(), 1);
        assert_eq!(result.warn_count(), 3);
    }

    #[test]
    fn test_identical_messages_deduplicated() {
        let set = RuleSet {
            rules: vec![
                Fixed(Severity::Deny, vec!["same", "same"]),
                Fixed(Severity::Deny, vec!["same", "other"]),
                Fixed(Severity::Warn, vec!["same"]),
            ],
        };
        let result = evaluate_rules(&set, &empty_doc(), &GovernanceConfig::default());
        assert_eq!(result.deny(), vec!["same", "other"]);
        assert_eq!(result.warn(), vec!["same"]);
    }

    #[test]
    fn test_decision_shape() {
        let set = RuleSet {
            rules: vec![
                Fixed(Severity::Deny, vec!["d"]),
                Fixed(Severity::Warn, vec!["w"]),
            ],
        };
        let decision = evaluate_rules(&set, &empty_doc(), &GovernanceConfig::default()).decision();
        let json = serde_json::to_value(&decision).expect("serialize");
        assert_eq!(json, json!({"allow": false, "deny": ["d"], "warn": ["w"]}));
    }

    #[test]
    fn test_serialized_result_allow_follows_findings() {
        let set = RuleSet {
            rules: vec![Fixed(Severity::Deny, vec!["d"])],
        };
        let result = evaluate_rules(&set, &empty_doc(), &GovernanceConfig::default());
        let json = serde_json::to_value(&result).expect("serialize");
        assert_eq!(json["allow"], json!(false));
        assert_eq!(json["findings"].as_array().map(Vec::len), Some(1));
        assert_eq!(result.findings()[0].message, "d");
    }

    #[test]
    fn test_evaluate_source_rejects_non_mapping() {
        let err = evaluate_source(
            RuleSetKind::Model,
            "- a\n- b\n",
            DocumentFormat::Yaml,
            &GovernanceConfig::default(),
        )
        .unwrap_err();
        assert_eq!(err, InputError::NotAnObject { found: "list" });
    }

    #[test]
    fn test_rule_catalog_lists_every_rule() {
        assert_eq!(rule_catalog(RuleSetKind::Model).len(), ModelRule::ALL.len());
        assert!(rule_catalog(RuleSetKind::Deployment)
            .iter()
            .any(|(name, sev)| *name == "prometheus_scrape" && *sev == Severity::Warn));
    }
}

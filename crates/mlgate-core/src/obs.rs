//! Structured observability hooks for governance evaluations.
//!
//! This module provides:
//! - An evaluation-scoped tracing span via the `EvaluationSpan` RAII guard
//! - Emission functions for the evaluation lifecycle: start, rule fired,
//!   finish, and rejected input
//!
//! Events are emitted at `info!` level except per-rule events (`debug!`)
//! and rejected input (`warn!`). Logging never influences findings.

use tracing::{debug, info, warn};

use crate::error::InputError;
use crate::rules::{RuleSetKind, Severity};

/// RAII guard that enters an evaluation-scoped span.
///
/// # Example
///
/// ```ignore
/// let _span = EvaluationSpan::enter(RuleSetKind::Model);
/// // every event until the guard drops carries rule_set = "model"
/// ```
pub struct EvaluationSpan {
    _span: tracing::span::EnteredSpan,
}

impl EvaluationSpan {
    pub fn enter(kind: RuleSetKind) -> Self {
        let span = tracing::info_span!("mlgate.evaluate", rule_set = %kind);
        Self {
            _span: span.entered(),
        }
    }
}

/// Emit event: evaluation started with the number of rules to run.
pub fn emit_evaluation_started(kind: RuleSetKind, rule_count: usize) {
    info!(event = "evaluation.started", rule_set = %kind, rule_count = rule_count);
}

/// Emit event: a rule produced findings.
pub fn emit_rule_fired(rule: &str, severity: Severity, count: usize) {
    debug!(event = "rule.fired", rule = %rule, severity = %severity, count = count);
}

/// Emit event: evaluation finished with finding counts and the decision.
pub fn emit_evaluation_finished(kind: RuleSetKind, deny: usize, warn: usize, allow: bool) {
    info!(
        event = "evaluation.finished",
        rule_set = %kind,
        deny = deny,
        warn = warn,
        allow = allow,
    );
}

/// Emit event: a document was rejected before evaluation (warning level).
pub fn emit_input_rejected(error: &InputError) {
    warn!(event = "input.rejected", error = %error);
}

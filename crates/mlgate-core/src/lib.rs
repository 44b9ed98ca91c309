//! mlgate core library
//!
//! Governance rule engine for ML model manifests and Kubernetes deployment
//! manifests. Evaluation is pure: a parsed document plus validated
//! thresholds in, an allow/deny/warn decision out.

pub mod config;
pub mod document;
pub mod error;
pub mod evaluator;
pub mod obs;
pub mod reporting;
pub mod rules;
pub mod telemetry;
pub mod validators;

pub use config::{load_or_default, GovernanceConfig};
pub use document::{Document, DocumentFormat, Field, Typed};
pub use error::{ConfigError, InputError, MlgateError, Result};
pub use evaluator::{
    evaluate, evaluate_rules, evaluate_source, rule_catalog, Decision, EvaluationResult,
};
pub use obs::{
    emit_evaluation_finished, emit_evaluation_started, emit_input_rejected, emit_rule_fired,
    EvaluationSpan,
};
pub use reporting::{read_report, render_report_md, write_report, GateReport};
pub use rules::{
    DeploymentRule, Finding, ModelRule, Rule, RuleSet, RuleSetKind, Severity,
};
pub use telemetry::init_tracing;

/// mlgate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

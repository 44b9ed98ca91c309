//! Model governance rules.
//!
//! Evaluated against a model manifest (`spec.model`, `spec.metrics`,
//! `spec.fairness`, ...). Each variant of [`ModelRule`] is one independent
//! concern with one fixed severity; presence rules and threshold rules over
//! the same field are separate variants so that a missing section can fire
//! several findings at once.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Rule, Severity};
use crate::config::GovernanceConfig;
use crate::document::{Document, Field, Typed};
use crate::validators::{has_version_constraint, is_semver, matching_prefix, package_name};

/// A single model governance rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModelRule {
    /// `spec.metrics` must exist.
    MetricsPresent,
    /// `spec.metrics.accuracy` must exist.
    AccuracyPresent,
    /// Accuracy, when present, must be at least `min_accuracy`.
    AccuracyThreshold,
    /// F1, when present, must be at least `min_f1`.
    F1Threshold,
    /// `spec.fairness` must exist.
    FairnessPresent,
    /// Demographic parity difference must not exceed `max_bias`.
    DemographicParity,
    /// Equalized odds difference must not exceed `max_bias`.
    EqualizedOdds,
    /// Drift between the warning and critical thresholds (warn).
    DriftWarning,
    /// Drift above the critical threshold.
    DriftCritical,
    /// `spec.model.framework`, when present, must be approved.
    FrameworkApproved,
    /// Every dependency's package must be approved.
    DependencyApproved,
    /// Every dependency should carry a version constraint (warn).
    DependencyVersionConstraint,
    /// No dependency may name a known-vulnerable package.
    VulnerableDependency,
    /// `spec.data_sources` must exist.
    DataSourcesPresent,
    /// Every data source must come from an approved prefix or be approved.
    DataSourceApproved,
    /// `spec.model.experiment_id` must exist.
    ExperimentLinked,
    /// `spec.model.experiment_id` must not be the empty string.
    ExperimentIdNonEmpty,
    /// `spec.inference.resources` must exist.
    InferenceResourcesPresent,
    /// `spec.inference.resources.limits.memory` must exist.
    MemoryLimitPresent,
    /// `spec.inference.autoscaling` should exist (warn).
    AutoscalingConfigured,
    /// `spec.model.version` must exist.
    VersionPresent,
    /// `spec.model.version` must be semantic versioning.
    VersionFormat,
    /// `spec.monitoring` must exist.
    MonitoringPresent,
    /// `spec.monitoring.enabled` must be set.
    MonitoringEnabled,
    /// Monitoring should configure drift detection (warn).
    DriftDetectionConfigured,
    /// Monitoring should configure alerting (warn).
    AlertingConfigured,
    /// `spec.explainability` should exist (warn).
    ExplainabilityPresent,
    /// Explainability should name a method (warn).
    ExplainabilityMethod,
    /// Accuracy must not drop by more than `max_metric_regression`.
    AccuracyRegression,
    /// F1 must not drop by more than `max_metric_regression`.
    F1Regression,
    /// p99 latency should not grow beyond `max_latency_ratio` (warn).
    LatencyRegression,
    /// Training sample size below the recommended minimum (warn).
    TrainingSampleSizeLow,
    /// Training sample size below the hard minimum.
    TrainingSampleSizeMinimum,
    /// `spec.model.uri` must not use plain `http://`.
    ModelUriSecure,
}

impl ModelRule {
    /// Every model rule in evaluation order.
    pub const ALL: &'static [ModelRule] = &[
        ModelRule::MetricsPresent,
        ModelRule::AccuracyPresent,
        ModelRule::AccuracyThreshold,
        ModelRule::F1Threshold,
        ModelRule::FairnessPresent,
        ModelRule::DemographicParity,
        ModelRule::EqualizedOdds,
        ModelRule::DriftWarning,
        ModelRule::DriftCritical,
        ModelRule::FrameworkApproved,
        ModelRule::DependencyApproved,
        ModelRule::DependencyVersionConstraint,
        ModelRule::VulnerableDependency,
        ModelRule::DataSourcesPresent,
        ModelRule::DataSourceApproved,
        ModelRule::ExperimentLinked,
        ModelRule::ExperimentIdNonEmpty,
        ModelRule::InferenceResourcesPresent,
        ModelRule::MemoryLimitPresent,
        ModelRule::AutoscalingConfigured,
        ModelRule::VersionPresent,
        ModelRule::VersionFormat,
        ModelRule::MonitoringPresent,
        ModelRule::MonitoringEnabled,
        ModelRule::DriftDetectionConfigured,
        ModelRule::AlertingConfigured,
        ModelRule::ExplainabilityPresent,
        ModelRule::ExplainabilityMethod,
        ModelRule::AccuracyRegression,
        ModelRule::F1Regression,
        ModelRule::LatencyRegression,
        ModelRule::TrainingSampleSizeLow,
        ModelRule::TrainingSampleSizeMinimum,
        ModelRule::ModelUriSecure,
    ];
}

impl Rule for ModelRule {
    fn name(&self) -> &'static str {
        match self {
            ModelRule::MetricsPresent => "metrics_present",
            ModelRule::AccuracyPresent => "accuracy_present",
            ModelRule::AccuracyThreshold => "accuracy_threshold",
            ModelRule::F1Threshold => "f1_threshold",
            ModelRule::FairnessPresent => "fairness_present",
            ModelRule::DemographicParity => "demographic_parity",
            ModelRule::EqualizedOdds => "equalized_odds",
            ModelRule::DriftWarning => "drift_warning",
            ModelRule::DriftCritical => "drift_critical",
            ModelRule::FrameworkApproved => "framework_approved",
            ModelRule::DependencyApproved => "dependency_approved",
            ModelRule::DependencyVersionConstraint => "dependency_version_constraint",
            ModelRule::VulnerableDependency => "vulnerable_dependency",
            ModelRule::DataSourcesPresent => "data_sources_present",
            ModelRule::DataSourceApproved => "data_source_approved",
            ModelRule::ExperimentLinked => "experiment_linked",
            ModelRule::ExperimentIdNonEmpty => "experiment_id_non_empty",
            ModelRule::InferenceResourcesPresent => "inference_resources_present",
            ModelRule::MemoryLimitPresent => "memory_limit_present",
            ModelRule::AutoscalingConfigured => "autoscaling_configured",
            ModelRule::VersionPresent => "version_present",
            ModelRule::VersionFormat => "version_format",
            ModelRule::MonitoringPresent => "monitoring_present",
            ModelRule::MonitoringEnabled => "monitoring_enabled",
            ModelRule::DriftDetectionConfigured => "drift_detection_configured",
            ModelRule::AlertingConfigured => "alerting_configured",
            ModelRule::ExplainabilityPresent => "explainability_present",
            ModelRule::ExplainabilityMethod => "explainability_method",
            ModelRule::AccuracyRegression => "accuracy_regression",
            ModelRule::F1Regression => "f1_regression",
            ModelRule::LatencyRegression => "latency_regression",
            ModelRule::TrainingSampleSizeLow => "training_sample_size_low",
            ModelRule::TrainingSampleSizeMinimum => "training_sample_size_minimum",
            ModelRule::ModelUriSecure => "model_uri_secure",
        }
    }

    fn severity(&self) -> Severity {
        match self {
            ModelRule::DriftWarning
            | ModelRule::DependencyVersionConstraint
            | ModelRule::AutoscalingConfigured
            | ModelRule::DriftDetectionConfigured
            | ModelRule::AlertingConfigured
            | ModelRule::ExplainabilityPresent
            | ModelRule::ExplainabilityMethod
            | ModelRule::LatencyRegression
            | ModelRule::TrainingSampleSizeLow => Severity::Warn,
            _ => Severity::Deny,
        }
    }

    fn check(&self, doc: &Document, config: &GovernanceConfig) -> Vec<String> {
        match self {
            ModelRule::MetricsPresent => {
                require(doc.get("spec.metrics"), "Model must include performance metrics")
            }
            ModelRule::AccuracyPresent => require(
                doc.get("spec.metrics.accuracy"),
                "Model must define an accuracy metric",
            ),
            ModelRule::AccuracyThreshold => {
                numeric(doc.get("spec.metrics.accuracy"), "Model accuracy", |v| {
                    (v < config.min_accuracy).then(|| {
                        format!(
                            "Model accuracy {} is below minimum threshold {}",
                            v, config.min_accuracy
                        )
                    })
                })
            }
            ModelRule::F1Threshold => {
                numeric(doc.get("spec.metrics.f1_score"), "Model F1 score", |v| {
                    (v < config.min_f1).then(|| {
                        format!(
                            "Model F1 score {} is below minimum threshold {}",
                            v, config.min_f1
                        )
                    })
                })
            }
            ModelRule::FairnessPresent => {
                require(doc.get("spec.fairness"), "Model must include fairness metrics")
            }
            ModelRule::DemographicParity => bias(
                doc.get("spec.fairness.demographic_parity"),
                "Demographic parity difference",
                config.max_bias,
            ),
            ModelRule::EqualizedOdds => bias(
                doc.get("spec.fairness.equalized_odds"),
                "Equalized odds difference",
                config.max_bias,
            ),
            ModelRule::DriftWarning => match doc.get("spec.drift.score").number() {
                Typed::Value(score)
                    if score > config.max_drift_warning && score <= config.max_drift_critical =>
                {
                    vec![format!(
                        "Model drift score {} exceeds warning threshold {}",
                        score, config.max_drift_warning
                    )]
                }
                _ => Vec::new(),
            },
            ModelRule::DriftCritical => {
                numeric(doc.get("spec.drift.score"), "Model drift score", |score| {
                    (score > config.max_drift_critical).then(|| {
                        format!(
                            "Model drift score {} exceeds critical threshold {}",
                            score, config.max_drift_critical
                        )
                    })
                })
            }
            ModelRule::FrameworkApproved => check_framework(doc, config),
            ModelRule::DependencyApproved => dependencies(doc)
                .filter_map(|dep| match dep {
                    Ok(req) => {
                        let name = package_name(req);
                        (!config.approved_packages.contains(name)).then(|| {
                            format!(
                                "Package '{}' from dependency '{}' is not in approved packages list",
                                name, req
                            )
                        })
                    }
                    Err(other) => Some(format!(
                        "Dependency {} must be a requirement string",
                        render(other)
                    )),
                })
                .collect(),
            ModelRule::DependencyVersionConstraint => dependencies(doc)
                .filter_map(Result::ok)
                .filter(|req| !has_version_constraint(req))
                .map(|req| format!("Dependency '{}' should have version constraint", req))
                .collect(),
            ModelRule::VulnerableDependency => check_vulnerable(doc, config),
            ModelRule::DataSourcesPresent => require(
                doc.get("spec.data_sources"),
                "Model must declare training data sources",
            ),
            ModelRule::DataSourceApproved => check_data_sources(doc, config),
            ModelRule::ExperimentLinked => require(
                doc.get("spec.model.experiment_id"),
                "Model must be linked to an MLflow experiment (spec.model.experiment_id)",
            ),
            ModelRule::ExperimentIdNonEmpty => match doc.get("spec.model.experiment_id").str() {
                Typed::Value("") => vec!["Experiment ID cannot be empty".to_string()],
                _ => Vec::new(),
            },
            ModelRule::InferenceResourcesPresent => require(
                doc.get("spec.inference.resources"),
                "Model must specify inference resource requirements",
            ),
            ModelRule::MemoryLimitPresent => require(
                doc.get("spec.inference.resources.limits.memory"),
                "Model must specify memory limits for inference",
            ),
            ModelRule::AutoscalingConfigured => require(
                doc.get("spec.inference.autoscaling"),
                "Model should configure autoscaling for inference",
            ),
            ModelRule::VersionPresent => {
                require(doc.get("spec.model.version"), "Model must specify a version")
            }
            ModelRule::VersionFormat => match doc.get("spec.model.version") {
                Field::Present(Value::String(v)) if is_semver(v) => Vec::new(),
                Field::Present(other) => vec![format!(
                    "Model version '{}' must follow semantic versioning (MAJOR.MINOR.PATCH)",
                    render(other)
                )],
                Field::Absent => Vec::new(),
            },
            ModelRule::MonitoringPresent => require(
                doc.get("spec.monitoring"),
                "Model must have monitoring configuration",
            ),
            ModelRule::MonitoringEnabled => {
                let monitoring = doc.get("spec.monitoring");
                if monitoring.is_present() && monitoring.get("enabled").is_falsy() {
                    vec!["Model monitoring must be enabled".to_string()]
                } else {
                    Vec::new()
                }
            }
            ModelRule::DriftDetectionConfigured => monitoring_section(
                doc,
                "drift_detection",
                "Monitoring should configure drift detection",
            ),
            ModelRule::AlertingConfigured => {
                monitoring_section(doc, "alerting", "Monitoring should configure alerting")
            }
            ModelRule::ExplainabilityPresent => require(
                doc.get("spec.explainability"),
                "Model should include explainability configuration",
            ),
            ModelRule::ExplainabilityMethod => {
                let explainability = doc.get("spec.explainability");
                if explainability.is_present() && explainability.get("method").is_absent() {
                    vec!["Explainability configuration should specify a method".to_string()]
                } else {
                    Vec::new()
                }
            }
            ModelRule::AccuracyRegression => regression(doc, "accuracy", "accuracy", config),
            ModelRule::F1Regression => regression(doc, "f1_score", "F1 score", config),
            ModelRule::LatencyRegression => check_latency(doc, config),
            ModelRule::TrainingSampleSizeLow => match doc.get("spec.training.sample_size").number()
            {
                Typed::Value(n) if n < config.min_training_samples_warn => vec![format!(
                    "Training sample size {} is below recommended minimum {}",
                    n, config.min_training_samples_warn
                )],
                _ => Vec::new(),
            },
            ModelRule::TrainingSampleSizeMinimum => numeric(
                doc.get("spec.training.sample_size"),
                "Training sample size",
                |n| {
                    (n < config.min_training_samples).then(|| {
                        format!(
                            "Training sample size {} is below required minimum {}",
                            n, config.min_training_samples
                        )
                    })
                },
            ),
            ModelRule::ModelUriSecure => match doc.get("spec.model.uri").str() {
                Typed::Value(uri) if uri.starts_with("http://") => vec![format!(
                    "Model URI '{}' must not use insecure http://",
                    uri
                )],
                _ => Vec::new(),
            },
        }
    }
}

/// Strings render bare; everything else as JSON.
fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn require(field: Field<'_>, message: &str) -> Vec<String> {
    if field.is_absent() {
        vec![message.to_string()]
    } else {
        Vec::new()
    }
}

/// Run `violation` on a numeric field. Absent fields yield nothing; present
/// non-numbers are findings in their own right.
fn numeric(
    field: Field<'_>,
    label: &str,
    violation: impl FnOnce(f64) -> Option<String>,
) -> Vec<String> {
    match field.number() {
        Typed::Absent => Vec::new(),
        Typed::Value(v) => violation(v).into_iter().collect(),
        Typed::Mismatch { found } => vec![format!("{} must be a number, found {}", label, found)],
    }
}

fn bias(field: Field<'_>, label: &str, max_bias: f64) -> Vec<String> {
    numeric(field, label, |v| {
        (v > max_bias).then(|| format!("{} {} exceeds maximum allowed bias {}", label, v, max_bias))
    })
}

/// Dependency entries: `Ok` for requirement strings, `Err` for anything else.
fn dependencies(doc: &Document) -> impl Iterator<Item = Result<&str, &Value>> {
    doc.get("spec.dependencies")
        .items()
        .filter_map(Field::value)
        .map(|v| v.as_str().ok_or(v))
}

fn check_framework(doc: &Document, config: &GovernanceConfig) -> Vec<String> {
    let Some(framework) = doc.get("spec.model.framework").value() else {
        return Vec::new();
    };
    let approved = framework
        .as_str()
        .is_some_and(|f| config.approved_frameworks.contains(f));
    if approved {
        return Vec::new();
    }
    let list: Vec<&str> = config
        .approved_frameworks
        .iter()
        .map(String::as_str)
        .collect();
    vec![format!(
        "Framework '{}' is not in approved frameworks: [{}]",
        render(framework),
        list.join(", ")
    )]
}

fn check_vulnerable(doc: &Document, config: &GovernanceConfig) -> Vec<String> {
    let mut out = Vec::new();
    for req in dependencies(doc).filter_map(Result::ok) {
        let name = package_name(req);
        if name.is_empty() {
            continue;
        }
        // Names only: version bounds in the denylist are not compared.
        for entry in &config.known_vulnerable_packages {
            if package_name(entry) == name {
                out.push(format!(
                    "Dependency '{}' matches known vulnerable package '{}'",
                    req, entry
                ));
            }
        }
    }
    out
}

fn check_data_sources(doc: &Document, config: &GovernanceConfig) -> Vec<String> {
    doc.get("spec.data_sources")
        .items()
        .filter_map(|entry| {
            let source = entry.get("source").str().ok();
            let by_prefix = source
                .and_then(|s| matching_prefix(s, &config.approved_data_source_prefixes))
                .is_some();
            if by_prefix || entry.get("approved").is_true() {
                None
            } else {
                Some(format!(
                    "Data source '{}' is not from an approved location",
                    source.unwrap_or("<unspecified>")
                ))
            }
        })
        .collect()
}

fn monitoring_section(doc: &Document, key: &str, message: &str) -> Vec<String> {
    let monitoring = doc.get("spec.monitoring");
    if monitoring.is_present() && monitoring.get(key).is_absent() {
        vec![message.to_string()]
    } else {
        Vec::new()
    }
}

/// Slack for comparisons between decimal thresholds and values that went
/// through binary floating point. A drop of exactly `max_metric_regression`
/// (0.20 to 0.18) must not deny just because `0.20 - 0.18` rounds above 0.02.
const FLOAT_TOLERANCE: f64 = 1e-9;

fn regression(doc: &Document, key: &str, label: &str, config: &GovernanceConfig) -> Vec<String> {
    let previous = doc.get("spec.previous_version");
    if previous.is_absent() {
        return Vec::new();
    }
    let current = doc.get("spec.metrics").get(key).number().ok();
    let before = previous.get("metrics").get(key).number().ok();
    match (current, before) {
        (Some(cur), Some(prev)) if prev - cur > config.max_metric_regression + FLOAT_TOLERANCE => {
            vec![format!(
                "Model {} regressed from {} to {} (maximum allowed drop {})",
                label, prev, cur, config.max_metric_regression
            )]
        }
        _ => Vec::new(),
    }
}

fn check_latency(doc: &Document, config: &GovernanceConfig) -> Vec<String> {
    let current = doc.get("spec.inference.latency_p99_ms").number().ok();
    let before = doc
        .get("spec.previous_version.inference.latency_p99_ms")
        .number()
        .ok();
    match (current, before) {
        (Some(cur), Some(prev)) if cur > prev * config.max_latency_ratio + FLOAT_TOLERANCE => {
            vec![format!(
                "Inference p99 latency {}ms is more than {}x the previous version ({}ms)",
                cur, config.max_latency_ratio, prev
            )]
        }
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn check(rule: ModelRule, value: serde_json::Value) -> Vec<String> {
        let doc = Document::from_value(value).expect("object root");
        rule.check(&doc, &GovernanceConfig::default())
    }

    #[test]
    fn test_accuracy_boundary_does_not_fire() {
        let msgs = check(
            ModelRule::AccuracyThreshold,
            json!({"spec": {"metrics": {"accuracy": 0.85}}}),
        );
        assert!(msgs.is_empty());
    }

    #[test]
    fn test_accuracy_just_below_fires() {
        let msgs = check(
            ModelRule::AccuracyThreshold,
            json!({"spec": {"metrics": {"accuracy": 0.849999}}}),
        );
        assert_eq!(msgs.len(), 1);
    }

    #[test]
    fn test_accuracy_wrong_type_fires() {
        let msgs = check(
            ModelRule::AccuracyThreshold,
            json!({"spec": {"metrics": {"accuracy": "0.9"}}}),
        );
        assert_eq!(msgs, vec!["Model accuracy must be a number, found string"]);
    }

    #[test]
    fn test_null_metrics_counts_as_present() {
        let msgs = check(ModelRule::MetricsPresent, json!({"spec": {"metrics": null}}));
        assert!(msgs.is_empty());
        let msgs = check(ModelRule::AccuracyPresent, json!({"spec": {"metrics": null}}));
        assert_eq!(msgs.len(), 1);
    }

    #[test]
    fn test_drift_bands_are_exclusive() {
        let doc = json!({"spec": {"drift": {"score": 0.30}}});
        assert_eq!(check(ModelRule::DriftWarning, doc.clone()).len(), 1);
        assert!(check(ModelRule::DriftCritical, doc).is_empty());

        let doc = json!({"spec": {"drift": {"score": 0.10}}});
        assert!(check(ModelRule::DriftWarning, doc.clone()).is_empty());
        assert!(check(ModelRule::DriftCritical, doc).is_empty());
    }

    #[test]
    fn test_framework_non_string_is_unapproved() {
        let msgs = check(
            ModelRule::FrameworkApproved,
            json!({"spec": {"model": {"framework": 7}}}),
        );
        assert_eq!(msgs.len(), 1);
        assert!(msgs[0].contains("'7'"));
    }

    #[test]
    fn test_experiment_id_empty_vs_missing() {
        let empty = json!({"spec": {"model": {"experiment_id": ""}}});
        assert!(check(ModelRule::ExperimentLinked, empty.clone()).is_empty());
        assert_eq!(
            check(ModelRule::ExperimentIdNonEmpty, empty),
            vec!["Experiment ID cannot be empty"]
        );

        let missing = json!({"spec": {"model": {}}});
        assert_eq!(check(ModelRule::ExperimentLinked, missing.clone()).len(), 1);
        assert!(check(ModelRule::ExperimentIdNonEmpty, missing).is_empty());
    }

    #[test]
    fn test_version_format_accepts_quoted_semver() {
        let msgs = check(
            ModelRule::VersionFormat,
            json!({"spec": {"model": {"version": "\"1.4.0\""}}}),
        );
        assert!(msgs.is_empty());
    }

    #[test]
    fn test_version_format_rejects_number() {
        let msgs = check(
            ModelRule::VersionFormat,
            json!({"spec": {"model": {"version": 1.5}}}),
        );
        assert_eq!(msgs.len(), 1);
        assert!(msgs[0].contains("'1.5'"));
    }

    #[test]
    fn test_monitoring_enabled_falsy() {
        let msgs = check(
            ModelRule::MonitoringEnabled,
            json!({"spec": {"monitoring": {"drift_detection": {}}}}),
        );
        assert_eq!(msgs, vec!["Model monitoring must be enabled"]);
        let msgs = check(
            ModelRule::MonitoringEnabled,
            json!({"spec": {"monitoring": {"enabled": false}}}),
        );
        assert_eq!(msgs.len(), 1);
        assert!(check(ModelRule::MonitoringEnabled, json!({"spec": {}})).is_empty());
    }

    #[test]
    fn test_data_source_approved_flag_overrides_prefix() {
        let msgs = check(
            ModelRule::DataSourceApproved,
            json!({"spec": {"data_sources": [
                {"source": "s3://random-bucket/x.csv", "approved": true},
                {"source": "s3://random-bucket/y.csv"},
                {"source": "s3://ml-data-lake/z.parquet"},
                {"approved": "yes"},
            ]}}),
        );
        assert_eq!(msgs.len(), 2);
        assert!(msgs[0].contains("s3://random-bucket/y.csv"));
        assert!(msgs[1].contains("<unspecified>"));
    }

    #[test]
    fn test_vulnerable_dependency_matches_name_only() {
        let msgs = check(
            ModelRule::VulnerableDependency,
            json!({"spec": {"dependencies": ["pyyaml>=6.0", "torch>=2.0.0"]}}),
        );
        assert_eq!(msgs.len(), 1);
        assert!(msgs[0].contains("pyyaml<5.4"));
    }

    #[test]
    fn test_non_string_dependency_is_denied() {
        let msgs = check(
            ModelRule::DependencyApproved,
            json!({"spec": {"dependencies": [42, "numpy>=1.24"]}}),
        );
        assert_eq!(msgs, vec!["Dependency 42 must be a requirement string"]);
    }

    #[test]
    fn test_regression_requires_previous_version() {
        let msgs = check(
            ModelRule::AccuracyRegression,
            json!({"spec": {"metrics": {"accuracy": 0.5}}}),
        );
        assert!(msgs.is_empty());

        let msgs = check(
            ModelRule::AccuracyRegression,
            json!({"spec": {
                "metrics": {"accuracy": 0.88},
                "previous_version": {"metrics": {"accuracy": 0.92}}
            }}),
        );
        assert_eq!(msgs.len(), 1);
        assert!(msgs[0].contains("0.92"));
        assert!(msgs[0].contains("0.88"));
    }

    #[test]
    fn test_regression_of_exactly_the_allowed_drop_does_not_fire() {
        for (prev, cur) in [(0.14, 0.12), (0.17, 0.15), (0.20, 0.18), (0.23, 0.21), (0.26, 0.24)] {
            let msgs = check(
                ModelRule::AccuracyRegression,
                json!({"spec": {
                    "metrics": {"accuracy": cur},
                    "previous_version": {"metrics": {"accuracy": prev}}
                }}),
            );
            assert!(msgs.is_empty(), "{} -> {} fired: {:?}", prev, cur, msgs);
        }

        let msgs = check(
            ModelRule::F1Regression,
            json!({"spec": {
                "metrics": {"f1_score": 0.179},
                "previous_version": {"metrics": {"f1_score": 0.20}}
            }}),
        );
        assert_eq!(msgs.len(), 1);
    }

    #[test]
    fn test_latency_regression_ratio() {
        let within = json!({"spec": {
            "inference": {"latency_p99_ms": 150},
            "previous_version": {"inference": {"latency_p99_ms": 100}}
        }});
        assert!(check(ModelRule::LatencyRegression, within).is_empty());

        let beyond = json!({"spec": {
            "inference": {"latency_p99_ms": 151},
            "previous_version": {"inference": {"latency_p99_ms": 100}}
        }});
        assert_eq!(check(ModelRule::LatencyRegression, beyond).len(), 1);
    }

    #[test]
    fn test_training_sample_size_bands() {
        let doc = json!({"spec": {"training": {"sample_size": 50}}});
        assert_eq!(check(ModelRule::TrainingSampleSizeLow, doc.clone()).len(), 1);
        assert_eq!(check(ModelRule::TrainingSampleSizeMinimum, doc).len(), 1);

        let doc = json!({"spec": {"training": {"sample_size": 500}}});
        assert_eq!(check(ModelRule::TrainingSampleSizeLow, doc.clone()).len(), 1);
        assert!(check(ModelRule::TrainingSampleSizeMinimum, doc).is_empty());

        let doc = json!({"spec": {"training": {"sample_size": 1000}}});
        assert!(check(ModelRule::TrainingSampleSizeLow, doc).is_empty());
    }

    #[test]
    fn test_model_uri_scheme() {
        let msgs = check(
            ModelRule::ModelUriSecure,
            json!({"spec": {"model": {"uri": "http://models.internal/churn"}}}),
        );
        assert_eq!(msgs.len(), 1);
        let msgs = check(
            ModelRule::ModelUriSecure,
            json!({"spec": {"model": {"uri": "https://models.internal/churn"}}}),
        );
        assert!(msgs.is_empty());
    }

    #[test]
    fn test_rule_serde_tag() {
        let json = serde_json::to_value(ModelRule::AccuracyThreshold).expect("serialize");
        assert_eq!(json, json!({"type": "accuracy_threshold"}));
    }

    #[test]
    fn test_names_are_unique() {
        let mut names: Vec<&str> = ModelRule::ALL.iter().map(Rule::name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), ModelRule::ALL.len());
    }
}

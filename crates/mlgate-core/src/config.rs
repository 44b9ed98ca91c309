//! Governance thresholds and approved-value sets.
//!
//! [`GovernanceConfig`] is the single source of truth for every tunable a
//! rule consults. Defaults reproduce the organisation-wide policy; an override
//! file may set any subset of fields. A config only becomes usable through
//! [`GovernanceConfig::validate`], which is where every [`ConfigError`] is
//! produced.

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::document::DocumentFormat;
use crate::error::{ConfigError, MlgateError, Result};

fn set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Thresholds for the model and deployment rule sets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GovernanceConfig {
    /// Minimum accuracy (0.0–1.0); lower denies.
    pub min_accuracy: f64,

    /// Minimum F1 score (0.0–1.0); lower denies.
    pub min_f1: f64,

    /// Drift score above this warns.
    pub max_drift_warning: f64,

    /// Drift score above this denies.
    pub max_drift_critical: f64,

    /// Maximum demographic parity / equalized odds difference.
    pub max_bias: f64,

    /// Largest tolerated metric drop vs. the previous version.
    pub max_metric_regression: f64,

    /// Largest tolerated p99 latency ratio vs. the previous version.
    pub max_latency_ratio: f64,

    /// Training sample size below this warns.
    pub min_training_samples_warn: f64,

    /// Training sample size below this denies.
    pub min_training_samples: f64,

    /// Replica count below this warns.
    pub min_replicas: f64,

    pub approved_frameworks: BTreeSet<String>,
    pub approved_packages: BTreeSet<String>,
    pub approved_data_source_prefixes: BTreeSet<String>,

    /// Denylist entries such as `pyyaml<5.4`. Only the package name part is
    /// compared; the version bound is informational.
    pub known_vulnerable_packages: BTreeSet<String>,

    /// Labels required at deployment and pod-template scope.
    pub required_labels: BTreeSet<String>,

    /// Registry fragments; an image is approved if it contains any of them.
    pub approved_registries: BTreeSet<String>,

    /// Schemes accepted for the `MODEL_URI` container variable.
    pub approved_model_uri_schemes: BTreeSet<String>,

    /// Value of `metadata.labels.type` that enables ML-specific checks.
    pub ml_inference_label: String,
}

impl Default for GovernanceConfig {
    fn default() -> Self {
        Self {
            min_accuracy: 0.85,
            min_f1: 0.80,
            max_drift_warning: 0.10,
            max_drift_critical: 0.30,
            max_bias: 0.10,
            max_metric_regression: 0.02,
            max_latency_ratio: 1.5,
            min_training_samples_warn: 1000.0,
            min_training_samples: 100.0,
            min_replicas: 2.0,
            approved_frameworks: set(&["pytorch", "sklearn", "tensorflow", "xgboost", "lightgbm"]),
            approved_packages: set(&[
                "torch",
                "torchvision",
                "tensorflow",
                "scikit-learn",
                "xgboost",
                "lightgbm",
                "numpy",
                "pandas",
                "scipy",
                "mlflow",
                "fastapi",
                "pydantic",
                "uvicorn",
                "requests",
                "pyyaml",
                "boto3",
                "onnx",
                "onnxruntime",
                "transformers",
            ]),
            approved_data_source_prefixes: set(&[
                "s3://ml-data-lake/",
                "s3://approved-datasets/",
                "gs://ml-data-lake/",
                "dvc://",
            ]),
            known_vulnerable_packages: set(&[
                "pyyaml<5.4",
                "pillow<9.0.0",
                "urllib3<1.26.5",
                "jinja2<2.11.3",
            ]),
            required_labels: set(&["app", "version", "team"]),
            approved_registries: set(&[
                "ghcr.io/stevedores-org/",
                "gcr.io/",
                ".dkr.ecr.",
                "registry.internal/",
            ]),
            approved_model_uri_schemes: set(&["s3://", "gs://", "mlflow://"]),
            ml_inference_label: "ml-inference".to_string(),
        }
    }
}

impl GovernanceConfig {
    /// Load overrides from a JSON (`.json`) or YAML file and validate them.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::parse(&text, DocumentFormat::from_path(path))?;
        Ok(config)
    }

    /// Parse overrides from text and validate them.
    pub fn parse(text: &str, format: DocumentFormat) -> std::result::Result<Self, ConfigError> {
        let config: Self = match format {
            DocumentFormat::Json => {
                serde_json::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?
            }
            DocumentFormat::Yaml => {
                serde_yaml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?
            }
        };
        config.validate()
    }

    /// Build from an in-memory override value and validate.
    pub fn from_overrides(value: serde_json::Value) -> std::result::Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_value(value).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()
    }

    /// Check every threshold's domain and the relations between them.
    pub fn validate(self) -> std::result::Result<Self, ConfigError> {
        let ratios = [
            ("min_accuracy", self.min_accuracy),
            ("min_f1", self.min_f1),
            ("max_drift_warning", self.max_drift_warning),
            ("max_drift_critical", self.max_drift_critical),
            ("max_bias", self.max_bias),
            ("max_metric_regression", self.max_metric_regression),
        ];
        for (field, value) in ratios {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::OutOfRange {
                    field,
                    value,
                    expected: "0.0..=1.0",
                });
            }
        }

        if !(self.max_latency_ratio.is_finite() && self.max_latency_ratio >= 1.0) {
            return Err(ConfigError::OutOfRange {
                field: "max_latency_ratio",
                value: self.max_latency_ratio,
                expected: ">= 1.0",
            });
        }

        let counts = [
            ("min_training_samples_warn", self.min_training_samples_warn),
            ("min_training_samples", self.min_training_samples),
            ("min_replicas", self.min_replicas),
        ];
        for (field, value) in counts {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::OutOfRange {
                    field,
                    value,
                    expected: ">= 0",
                });
            }
        }

        if self.max_drift_warning > self.max_drift_critical {
            return Err(ConfigError::Inconsistent(format!(
                "max_drift_warning {} exceeds max_drift_critical {}",
                self.max_drift_warning, self.max_drift_critical
            )));
        }
        if self.min_training_samples > self.min_training_samples_warn {
            return Err(ConfigError::Inconsistent(format!(
                "min_training_samples {} exceeds min_training_samples_warn {}",
                self.min_training_samples, self.min_training_samples_warn
            )));
        }

        let sets = [
            ("approved_frameworks", &self.approved_frameworks),
            ("approved_packages", &self.approved_packages),
            ("approved_data_source_prefixes", &self.approved_data_source_prefixes),
            ("approved_registries", &self.approved_registries),
            ("approved_model_uri_schemes", &self.approved_model_uri_schemes),
        ];
        for (field, values) in sets {
            if values.is_empty() {
                return Err(ConfigError::EmptySet { field });
            }
        }

        Ok(self)
    }

    /// Render the approved URI schemes as `s3://, gs://, or mlflow://`.
    pub(crate) fn model_uri_schemes_display(&self) -> String {
        let schemes: Vec<&str> = self
            .approved_model_uri_schemes
            .iter()
            .map(String::as_str)
            .collect();
        match schemes.as_slice() {
            [] => String::new(),
            [only] => only.to_string(),
            [init @ .., last] => format!("{}, or {}", init.join(", "), last),
        }
    }
}

/// Load overrides from `path`, or fall back to the validated defaults.
pub fn load_or_default(path: Option<&Path>) -> Result<GovernanceConfig> {
    match path {
        Some(p) => GovernanceConfig::load(p),
        None => GovernanceConfig::default()
            .validate()
            .map_err(MlgateError::from),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_match_policy() {
        let cfg = GovernanceConfig::default();
        assert_eq!(cfg.min_accuracy, 0.85);
        assert_eq!(cfg.min_f1, 0.80);
        assert_eq!(cfg.max_drift_warning, 0.10);
        assert_eq!(cfg.max_drift_critical, 0.30);
        assert_eq!(cfg.max_bias, 0.10);
        assert!(cfg.approved_frameworks.contains("pytorch"));
        assert!(cfg.approved_frameworks.contains("lightgbm"));
        assert_eq!(cfg.required_labels.len(), 3);
        assert!(cfg.clone().validate().is_ok());
    }

    #[test]
    fn test_partial_override_keeps_other_defaults() {
        let cfg = GovernanceConfig::from_overrides(json!({ "min_accuracy": 0.9 })).expect("valid");
        assert_eq!(cfg.min_accuracy, 0.9);
        assert_eq!(cfg.min_f1, 0.80);
    }

    #[test]
    fn test_negative_threshold_rejected() {
        let err = GovernanceConfig::from_overrides(json!({ "max_bias": -0.1 })).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::OutOfRange {
                field: "max_bias",
                ..
            }
        ));
    }

    #[test]
    fn test_wrong_type_rejected() {
        let err = GovernanceConfig::from_overrides(json!({ "min_f1": "high" })).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = GovernanceConfig::from_overrides(json!({ "min_acc": 0.9 })).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_inverted_drift_thresholds_rejected() {
        let err = GovernanceConfig::from_overrides(json!({
            "max_drift_warning": 0.4,
            "max_drift_critical": 0.3
        }))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Inconsistent(_)));
    }

    #[test]
    fn test_empty_approved_set_rejected() {
        let err =
            GovernanceConfig::from_overrides(json!({ "approved_registries": [] })).unwrap_err();
        assert_eq!(
            err,
            ConfigError::EmptySet {
                field: "approved_registries"
            }
        );
    }

    #[test]
    fn test_yaml_overrides() {
        let cfg = GovernanceConfig::parse(
            "min_accuracy: 0.7\napproved_frameworks: [jax]\n",
            DocumentFormat::Yaml,
        )
        .expect("valid yaml");
        assert_eq!(cfg.min_accuracy, 0.7);
        assert_eq!(cfg.approved_frameworks.len(), 1);
        assert!(cfg.approved_frameworks.contains("jax"));
    }

    #[test]
    fn test_latency_ratio_below_one_rejected() {
        let err =
            GovernanceConfig::from_overrides(json!({ "max_latency_ratio": 0.5 })).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::OutOfRange {
                field: "max_latency_ratio",
                ..
            }
        ));
    }

    #[test]
    fn test_scheme_display() {
        let cfg = GovernanceConfig::default();
        assert_eq!(cfg.model_uri_schemes_display(), "gs://, mlflow://, or s3://");
    }
}

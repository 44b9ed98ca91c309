//! Deployment governance rules.
//!
//! Evaluated against a workload deployment spec. Container-scoped rules
//! produce one finding per offending container; label rules produce one
//! finding per missing label. The `MODEL_URI` and Prometheus checks only
//! apply to deployments labelled as ML inference workloads.

use serde::{Deserialize, Serialize};

use super::{Rule, Severity};
use crate::config::GovernanceConfig;
use crate::document::{Document, Field, Typed};
use crate::validators::{contains_any, matching_prefix, ImageRef};

const MODEL_URI_VAR: &str = "MODEL_URI";
const SCRAPE_ANNOTATION: &str = "prometheus.io/scrape";

/// A single deployment governance rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DeploymentRule {
    /// Containers must not be privileged.
    PrivilegedContainer,
    /// Containers must not allow privilege escalation.
    PrivilegeEscalation,
    /// `runAsNonRoot: true` at container or pod scope.
    RunAsNonRoot,
    /// `readOnlyRootFilesystem: true` is recommended (warn).
    ReadOnlyRootFilesystem,
    /// `resources.limits.{cpu,memory}` must be set.
    ResourceLimits,
    /// `resources.requests.{cpu,memory}` must be set.
    ResourceRequests,
    /// Every container needs a liveness probe.
    LivenessProbe,
    /// Every container needs a readiness probe.
    ReadinessProbe,
    /// Images must not use `:latest`.
    ImageLatestTag,
    /// Images must carry a tag or digest.
    ImageTagMissing,
    /// Images must come from an approved registry.
    ImageRegistryApproved,
    /// Required labels on the deployment.
    DeploymentLabels,
    /// Required labels on the pod template.
    PodTemplateLabels,
    /// At least `min_replicas` replicas (warn).
    ReplicaCount,
    /// ML inference: `MODEL_URI` must use an approved scheme.
    ModelUriScheme,
    /// ML inference: containers should set `MODEL_URI` (warn).
    ModelUriConfigured,
    /// ML inference: Prometheus scraping should be enabled (warn).
    PrometheusScrape,
}

impl DeploymentRule {
    /// Every deployment rule in evaluation order.
    pub const ALL: &'static [DeploymentRule] = &[
        DeploymentRule::PrivilegedContainer,
        DeploymentRule::PrivilegeEscalation,
        DeploymentRule::RunAsNonRoot,
        DeploymentRule::ReadOnlyRootFilesystem,
        DeploymentRule::ResourceLimits,
        DeploymentRule::ResourceRequests,
        DeploymentRule::LivenessProbe,
        DeploymentRule::ReadinessProbe,
        DeploymentRule::ImageLatestTag,
        DeploymentRule::ImageTagMissing,
        DeploymentRule::ImageRegistryApproved,
        DeploymentRule::DeploymentLabels,
        DeploymentRule::PodTemplateLabels,
        DeploymentRule::ReplicaCount,
        DeploymentRule::ModelUriScheme,
        DeploymentRule::ModelUriConfigured,
        DeploymentRule::PrometheusScrape,
    ];
}

impl Rule for DeploymentRule {
    fn name(&self) -> &'static str {
        match self {
            DeploymentRule::PrivilegedContainer => "privileged_container",
            DeploymentRule::PrivilegeEscalation => "privilege_escalation",
            DeploymentRule::RunAsNonRoot => "run_as_non_root",
            DeploymentRule::ReadOnlyRootFilesystem => "read_only_root_filesystem",
            DeploymentRule::ResourceLimits => "resource_limits",
            DeploymentRule::ResourceRequests => "resource_requests",
            DeploymentRule::LivenessProbe => "liveness_probe",
            DeploymentRule::ReadinessProbe => "readiness_probe",
            DeploymentRule::ImageLatestTag => "image_latest_tag",
            DeploymentRule::ImageTagMissing => "image_tag_missing",
            DeploymentRule::ImageRegistryApproved => "image_registry_approved",
            DeploymentRule::DeploymentLabels => "deployment_labels",
            DeploymentRule::PodTemplateLabels => "pod_template_labels",
            DeploymentRule::ReplicaCount => "replica_count",
            DeploymentRule::ModelUriScheme => "model_uri_scheme",
            DeploymentRule::ModelUriConfigured => "model_uri_configured",
            DeploymentRule::PrometheusScrape => "prometheus_scrape",
        }
    }

    fn severity(&self) -> Severity {
        match self {
            DeploymentRule::ReadOnlyRootFilesystem
            | DeploymentRule::ReplicaCount
            | DeploymentRule::ModelUriConfigured
            | DeploymentRule::PrometheusScrape => Severity::Warn,
            _ => Severity::Deny,
        }
    }

    fn check(&self, doc: &Document, config: &GovernanceConfig) -> Vec<String> {
        match self {
            DeploymentRule::PrivilegedContainer => per_container(doc, |c| {
                c.field
                    .get("securityContext")
                    .get("privileged")
                    .is_true()
                    .then(|| format!("Container '{}' must not run as privileged", c.name))
            }),
            DeploymentRule::PrivilegeEscalation => per_container(doc, |c| {
                c.field
                    .get("securityContext")
                    .get("allowPrivilegeEscalation")
                    .is_true()
                    .then(|| format!("Container '{}' must not allow privilege escalation", c.name))
            }),
            DeploymentRule::RunAsNonRoot => {
                let pod_level = doc
                    .get("spec.template.spec.securityContext.runAsNonRoot")
                    .is_true();
                per_container(doc, |c| {
                    let container_level = c
                        .field
                        .get("securityContext")
                        .get("runAsNonRoot")
                        .is_true();
                    (!pod_level && !container_level).then(|| {
                        format!(
                            "Container '{}' must set securityContext.runAsNonRoot: true",
                            c.name
                        )
                    })
                })
            }
            DeploymentRule::ReadOnlyRootFilesystem => per_container(doc, |c| {
                (!c.field
                    .get("securityContext")
                    .get("readOnlyRootFilesystem")
                    .is_true())
                .then(|| {
                    format!(
                        "Container '{}' should set securityContext.readOnlyRootFilesystem: true",
                        c.name
                    )
                })
            }),
            DeploymentRule::ResourceLimits => resource_fields(doc, "limits"),
            DeploymentRule::ResourceRequests => resource_fields(doc, "requests"),
            DeploymentRule::LivenessProbe => probe(doc, "livenessProbe"),
            DeploymentRule::ReadinessProbe => probe(doc, "readinessProbe"),
            DeploymentRule::ImageLatestTag => per_image(doc, |name, image| {
                (ImageRef::parse(image).tag == Some("latest")).then(|| {
                    format!(
                        "Container '{}' uses the :latest tag (image '{}')",
                        name, image
                    )
                })
            }),
            DeploymentRule::ImageTagMissing => per_image(doc, |name, image| {
                (!ImageRef::parse(image).is_pinned()).then(|| {
                    format!(
                        "Container '{}' image '{}' must specify an image tag",
                        name, image
                    )
                })
            }),
            DeploymentRule::ImageRegistryApproved => per_image(doc, |name, image| {
                (!contains_any(image, &config.approved_registries)).then(|| {
                    format!(
                        "Container '{}' image '{}' is not from an approved registry",
                        name, image
                    )
                })
            }),
            DeploymentRule::DeploymentLabels => {
                missing_labels(doc.get("metadata.labels"), "Deployment", config)
            }
            DeploymentRule::PodTemplateLabels => missing_labels(
                doc.get("spec.template.metadata.labels"),
                "Pod template",
                config,
            ),
            DeploymentRule::ReplicaCount => match doc.get("spec.replicas").number() {
                Typed::Value(n) if n < config.min_replicas => vec![format!(
                    "Deployment should have at least {} replicas for high availability (found {})",
                    config.min_replicas, n
                )],
                _ => Vec::new(),
            },
            DeploymentRule::ModelUriScheme => {
                if !is_ml_inference(doc, config) {
                    return Vec::new();
                }
                per_container(doc, |c| {
                    let uri = model_uri(c.field)?.str().ok()?;
                    if matching_prefix(uri, &config.approved_model_uri_schemes).is_some() {
                        return None;
                    }
                    Some(format!(
                        "Container '{}' MODEL_URI '{}' must use one of {}",
                        c.name,
                        uri,
                        config.model_uri_schemes_display()
                    ))
                })
            }
            DeploymentRule::ModelUriConfigured => {
                if !is_ml_inference(doc, config) {
                    return Vec::new();
                }
                per_container(doc, |c| {
                    model_uri(c.field).is_none().then(|| {
                        format!(
                            "Container '{}' should set {} for model loading",
                            c.name, MODEL_URI_VAR
                        )
                    })
                })
            }
            DeploymentRule::PrometheusScrape => {
                if !is_ml_inference(doc, config) {
                    return Vec::new();
                }
                let scrape = doc
                    .path(&["spec", "template", "metadata", "annotations", SCRAPE_ANNOTATION])
                    .str();
                if scrape == Typed::Value("true") {
                    Vec::new()
                } else {
                    vec![format!(
                        "ML inference deployment should enable Prometheus scraping ({}: \"true\")",
                        SCRAPE_ANNOTATION
                    )]
                }
            }
        }
    }
}

/// A container entry with a display name.
struct Container<'a> {
    name: String,
    field: Field<'a>,
}

fn containers(doc: &Document) -> impl Iterator<Item = Container<'_>> {
    doc.get("spec.template.spec.containers")
        .items()
        .enumerate()
        .map(|(i, field)| Container {
            name: field
                .get("name")
                .str()
                .ok()
                .map(str::to_string)
                .unwrap_or_else(|| format!("#{}", i)),
            field,
        })
}

fn per_container(
    doc: &Document,
    mut check: impl FnMut(&Container<'_>) -> Option<String>,
) -> Vec<String> {
    containers(doc).filter_map(|c| check(&c)).collect()
}

/// Runs `check` on containers with a string image; others are skipped.
fn per_image(doc: &Document, mut check: impl FnMut(&str, &str) -> Option<String>) -> Vec<String> {
    per_container(doc, |c| {
        let image = c.field.get("image").str().ok()?;
        check(c.name.as_str(), image)
    })
}

fn resource_fields(doc: &Document, section: &str) -> Vec<String> {
    let mut out = Vec::new();
    for c in containers(doc) {
        for resource in ["cpu", "memory"] {
            if c.field
                .get("resources")
                .get(section)
                .get(resource)
                .is_absent()
            {
                out.push(format!(
                    "Container '{}' must specify resources.{}.{}",
                    c.name, section, resource
                ));
            }
        }
    }
    out
}

fn probe(doc: &Document, key: &str) -> Vec<String> {
    per_container(doc, |c| {
        c.field
            .get(key)
            .is_absent()
            .then(|| format!("Container '{}' must define a {}", c.name, key))
    })
}

fn missing_labels(labels: Field<'_>, scope: &str, config: &GovernanceConfig) -> Vec<String> {
    config
        .required_labels
        .iter()
        .filter(|label| labels.get(label.as_str()).is_absent())
        .map(|label| format!("{} must have label '{}'", scope, label))
        .collect()
}

fn is_ml_inference(doc: &Document, config: &GovernanceConfig) -> bool {
    doc.get("metadata.labels.type").str() == Typed::Value(config.ml_inference_label.as_str())
}

/// The `value` field of the first `MODEL_URI` env entry, if the entry exists.
fn model_uri<'a>(container: Field<'a>) -> Option<Field<'a>> {
    container
        .get("env")
        .items()
        .find(|entry| entry.get("name").str() == Typed::Value(MODEL_URI_VAR))
        .map(|entry| entry.get("value"))
}

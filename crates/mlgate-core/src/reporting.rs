//! Gate report artifacts for CI archiving and PR comments.
//!
//! A [`GateReport`] is the persisted envelope around one decision. It is
//! written as `report.json` (pretty JSON), `report.md` (Markdown summary),
//! and `report.digest` (sha256 of `report.json`). Reading verifies the
//! digest before deserializing.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{MlgateError, Result};
use crate::evaluator::EvaluationResult;
use crate::rules::RuleSetKind;

pub const REPORT_SCHEMA_VERSION: &str = "1.0";

const REPORT_JSON: &str = "report.json";
const REPORT_MD: &str = "report.md";
const REPORT_DIGEST: &str = "report.digest";

/// Persisted record of one gate decision.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GateReport {
    pub schema_version: String,
    pub generated_at: DateTime<Utc>,
    pub rule_set: RuleSetKind,
    /// Label of the evaluated document, usually its path.
    pub document: String,
    /// sha256 hex of the raw document bytes.
    pub document_digest: String,
    pub allow: bool,
    pub deny: Vec<String>,
    pub warn: Vec<String>,
}

impl GateReport {
    /// Build a report stamped with the current time.
    pub fn new(
        rule_set: RuleSetKind,
        document: impl Into<String>,
        raw: &[u8],
        result: &EvaluationResult,
    ) -> Self {
        Self::at(Utc::now(), rule_set, document, raw, result)
    }

    /// Build a report with an explicit timestamp.
    pub fn at(
        generated_at: DateTime<Utc>,
        rule_set: RuleSetKind,
        document: impl Into<String>,
        raw: &[u8],
        result: &EvaluationResult,
    ) -> Self {
        let decision = result.decision();
        Self {
            schema_version: REPORT_SCHEMA_VERSION.to_string(),
            generated_at,
            rule_set,
            document: document.into(),
            document_digest: sha256_hex(raw),
            allow: decision.allow,
            deny: decision.deny,
            warn: decision.warn,
        }
    }
}

/// Lowercase hex sha256 of `data`.
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Render the Markdown summary posted as a PR comment.
pub fn render_report_md(report: &GateReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("# ML Governance: {} gate\n\n", report.rule_set));
    let status = if report.allow { "ALLOWED" } else { "DENIED" };
    out.push_str(&format!("**Status:** {}\n\n", status));
    out.push_str(&format!(
        "- document: `{}`\n- sha256: `{}`\n- deny: {}\n- warn: {}\n\n",
        report.document,
        report.document_digest,
        report.deny.len(),
        report.warn.len()
    ));

    if !report.deny.is_empty() {
        out.push_str("## Deny\n");
        for msg in &report.deny {
            out.push_str(&format!("- {}\n", msg));
        }
        out.push('\n');
    }

    if !report.warn.is_empty() {
        out.push_str("## Warn\n");
        for msg in &report.warn {
            out.push_str(&format!("- {}\n", msg));
        }
        out.push('\n');
    }
    out
}

/// Persist `<dir>/report.json`, `<dir>/report.md` and `<dir>/report.digest`.
///
/// Returns the path of `report.json`.
pub fn write_report(dir: &Path, report: &GateReport) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;

    let path = dir.join(REPORT_JSON);
    let json = serde_json::to_vec_pretty(report)?;
    let digest = sha256_hex(&json);

    std::fs::write(&path, &json)?;
    std::fs::write(dir.join(REPORT_DIGEST), digest.as_bytes())?;
    std::fs::write(dir.join(REPORT_MD), render_report_md(report))?;

    Ok(path)
}

/// Read `<dir>/report.json` after verifying it against `report.digest`.
pub fn read_report(dir: &Path) -> Result<GateReport> {
    let json = std::fs::read(dir.join(REPORT_JSON))?;
    let expected = std::fs::read_to_string(dir.join(REPORT_DIGEST))?;
    let actual = sha256_hex(&json);
    if expected.trim() != actual {
        return Err(MlgateError::DigestMismatch {
            expected: expected.trim().to_string(),
            actual,
        });
    }
    let report: GateReport = serde_json::from_slice(&json)?;
    Ok(report)
}

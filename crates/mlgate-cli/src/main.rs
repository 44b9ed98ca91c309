//! mlgate - ML governance gate CLI
//!
//! The `mlgate` command evaluates model and deployment manifests against the
//! governance rule sets and reports an allow/deny/warn decision.
//!
//! ## Commands
//!
//! - `check`: Evaluate a manifest; exit 0 when allowed, 1 when denied
//! - `thresholds`: Print the effective governance configuration
//! - `rules`: List the rules of a rule set
//!
//! Input, configuration and I/O failures exit with status 2.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info, Level};

use mlgate_core::{
    evaluate_source, load_or_default, rule_catalog, write_report, Decision, DocumentFormat,
    GateReport, RuleSetKind,
};

#[derive(Parser)]
#[command(name = "mlgate")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "ML model and deployment governance gate", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a manifest against a governance rule set
    Check {
        /// Path to the manifest (JSON when the extension is .json, YAML otherwise)
        path: PathBuf,

        /// Rule set to apply
        #[arg(short, long, value_enum)]
        rule_set: RuleSetArg,

        /// Threshold override file
        #[arg(short, long, env = "MLGATE_CONFIG")]
        config: Option<PathBuf>,

        /// Output format for the decision
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Directory to write report.json, report.md and report.digest into
        #[arg(long)]
        report_dir: Option<PathBuf>,
    },

    /// Print the effective governance thresholds as JSON
    Thresholds {
        /// Threshold override file
        #[arg(short, long, env = "MLGATE_CONFIG")]
        config: Option<PathBuf>,
    },

    /// List rule names and severities
    Rules {
        /// Rule set to list
        #[arg(short, long, value_enum)]
        rule_set: RuleSetArg,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum RuleSetArg {
    Model,
    Deployment,
}

impl From<RuleSetArg> for RuleSetKind {
    fn from(arg: RuleSetArg) -> Self {
        match arg {
            RuleSetArg::Model => RuleSetKind::Model,
            RuleSetArg::Deployment => RuleSetKind::Deployment,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    mlgate_core::init_tracing(cli.json, level);

    let outcome = match cli.command {
        Commands::Check {
            path,
            rule_set,
            config,
            format,
            report_dir,
        } => cmd_check(
            &path,
            rule_set.into(),
            config.as_deref(),
            format,
            report_dir.as_deref(),
        ),
        Commands::Thresholds { config } => cmd_thresholds(config.as_deref()).map(|()| true),
        Commands::Rules { rule_set } => {
            cmd_rules(rule_set.into());
            Ok(true)
        }
    };

    if let Err(e) = &outcome {
        error!(error = %format!("{:#}", e), "mlgate failed");
        eprintln!("error: {:#}", e);
    }
    ExitCode::from(exit_status(&outcome))
}

const EXIT_ALLOWED: u8 = 0;
const EXIT_DENIED: u8 = 1;
const EXIT_ERROR: u8 = 2;

/// Map a command outcome to the process status: 0 allowed, 1 denied, 2 error.
fn exit_status(outcome: &Result<bool>) -> u8 {
    match outcome {
        Ok(true) => EXIT_ALLOWED,
        Ok(false) => EXIT_DENIED,
        Err(_) => EXIT_ERROR,
    }
}

/// Evaluate one manifest. Returns the `allow` flag of the decision.
fn cmd_check(
    path: &Path,
    kind: RuleSetKind,
    config: Option<&Path>,
    format: OutputFormat,
    report_dir: Option<&Path>,
) -> Result<bool> {
    let _span = tracing::info_span!("mlgate.check", document = %path.display()).entered();

    let config = load_or_default(config).context("Failed to load governance configuration")?;
    let text =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
    let result = evaluate_source(kind, &text, DocumentFormat::from_path(path), &config)
        .with_context(|| format!("Cannot evaluate {:?}", path))?;

    if let Some(dir) = report_dir {
        let report = GateReport::new(kind, path.display().to_string(), text.as_bytes(), &result);
        let written = write_report(dir, &report)
            .with_context(|| format!("Failed to write report to {:?}", dir))?;
        info!(path = %written.display(), "report written");
    }

    let decision = result.decision();
    match format {
        OutputFormat::Text => print!("{}", render_text(&decision)),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&decision).context("Failed to serialize decision")?
        ),
    }

    Ok(decision.allow)
}

/// One `DENY:`/`WARN:` line per finding followed by a status line.
fn render_text(decision: &Decision) -> String {
    let mut out = String::new();
    for msg in &decision.deny {
        out.push_str(&format!("DENY: {}\n", msg));
    }
    for msg in &decision.warn {
        out.push_str(&format!("WARN: {}\n", msg));
    }
    let status = if decision.allow { "ALLOWED" } else { "DENIED" };
    out.push_str(&format!(
        "{} ({} deny, {} warn)\n",
        status,
        decision.deny.len(),
        decision.warn.len()
    ));
    out
}

fn cmd_thresholds(config: Option<&Path>) -> Result<()> {
    print!("{}", render_thresholds(config)?);
    Ok(())
}

/// The effective configuration as pretty JSON, newline-terminated.
fn render_thresholds(config: Option<&Path>) -> Result<String> {
    let config = load_or_default(config).context("Failed to load governance configuration")?;
    let json =
        serde_json::to_string_pretty(&config).context("Failed to serialize configuration")?;
    Ok(format!("{}\n", json))
}

fn cmd_rules(kind: RuleSetKind) {
    print!("{}", render_rules(kind));
}

/// One `<severity> <name>` line per rule, severity padded to a column.
fn render_rules(kind: RuleSetKind) -> String {
    rule_catalog(kind)
        .into_iter()
        .map(|(name, severity)| format!("{:<5} {}\n", severity.as_str(), name))
        .collect()
}

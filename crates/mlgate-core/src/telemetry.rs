//! Log subscriber setup for the `mlgate` binary.
//!
//! `mlgate check` prints its decision (text or JSON) on stdout, and CI jobs
//! pipe that output straight into other tools. Every log line therefore goes
//! to stderr, whatever the format, so that a pipeline reading stdout only
//! ever sees the decision.
//!
//! The first call installs the global subscriber; later calls leave it in
//! place.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the process-wide subscriber.
///
/// `RUST_LOG` wins over `level` when set. With `json` the events are written
/// as one JSON object per line, otherwise as compact human-readable text.
pub fn init_tracing(json: bool, level: Level) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    let (json_layer, text_layer) = if json {
        (Some(fmt::layer().json().with_writer(std::io::stderr)), None)
    } else {
        (
            None,
            Some(fmt::layer().with_target(false).with_writer(std::io::stderr)),
        )
    };

    // `Option<Layer>` is itself a layer, so only the chosen format is active.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .try_init();
}

//! Logging setup using tracing.
//!
//! Human-readable output by default, JSON lines with `--log-format json`.
//! Logs go to stderr so the report on stdout stays machine-readable.

use clap::ValueEnum;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{CliError, CliResult};

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Build the log filter. `RUST_LOG` takes precedence over `filter`.
pub fn build_filter(filter: &str) -> CliResult<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter))
        .map_err(|e| CliError::Config(format!("invalid log filter '{filter}': {e}")))
}

/// Initialize the tracing subscriber.
///
/// Fails if the filter is invalid or a subscriber is already installed.
pub fn init_logging(filter: &str, format: LogFormat) -> CliResult<()> {
    let filter_layer = build_filter(filter)?;

    let json_layer = (format == LogFormat::Json).then(|| {
        fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_current_span(false)
            .flatten_event(true)
    });
    let text_layer = (format == LogFormat::Text).then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
    });

    tracing_subscriber::registry()
        .with(json_layer)
        .with(text_layer)
        .with(filter_layer)
        .try_init()
        .map_err(|e| CliError::Config(format!("failed to initialize logging: {e}")))?;

    tracing::debug!(filter = %filter, format = ?format, "Logging initialized");
    Ok(())
}

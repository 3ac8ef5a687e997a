//! Log output for the command-line tool.
//!
//! Everything goes to stderr so stdout carries only the run's own output.

use std::io::{self, IsTerminal};
use thiserror::Error;
use tracing_subscriber::fmt;
use tracing_subscriber::EnvFilter;

/// Environment variable holding an `EnvFilter` directive, e.g. `lint_patcher=debug`.
pub const LOG_ENV: &str = "LINT_PATCHER_LOG";

pub const DEFAULT_FILTER: &str = "warn";

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("invalid LINT_PATCHER_LOG filter: {0}")]
    Filter(String),

    #[error("failed to install log subscriber: {0}")]
    Subscriber(String),
}

/// Build the filter from `directive`, or [`DEFAULT_FILTER`] when absent or blank.
pub fn filter_from(directive: Option<&str>) -> Result<EnvFilter, TelemetryError> {
    let directive = match directive.map(str::trim) {
        Some(d) if !d.is_empty() => d,
        _ => DEFAULT_FILTER,
    };
    EnvFilter::try_new(directive).map_err(|error| TelemetryError::Filter(error.to_string()))
}

/// Install the global subscriber, reading the filter from [`LOG_ENV`].
///
/// `verbose` raises this crate's own events to `debug` on top of the filter.
pub fn init(verbose: bool) -> Result<(), TelemetryError> {
    let mut directive = std::env::var(LOG_ENV).unwrap_or_default();
    if verbose {
        if directive.trim().is_empty() {
            directive = DEFAULT_FILTER.to_string();
        }
        directive.push_str(",lint_patcher=debug");
    }
    let filter = filter_from(Some(&directive))?;

    fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .without_time()
        .try_init()
        .map_err(|error| TelemetryError::Subscriber(error.to_string()))
}

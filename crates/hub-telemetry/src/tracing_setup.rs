//! Global `tracing` subscriber installation.
//!
//! The subscriber is process-wide. Installing it a second time (a test binary
//! composing several runtimes, or an embedding host that already owns the
//! subscriber) is not an error: the existing subscriber keeps receiving events.

use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Layer};

use crate::{TelemetryConfig, TelemetryError};

/// Outcome of a subscriber installation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriberState {
    /// This call installed the global subscriber.
    Installed,
    /// A global subscriber was already present and was left in place.
    AlreadyPresent,
}

/// Build the filter for `config`, rejecting malformed directives.
pub(crate) fn build_filter(config: &TelemetryConfig) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(&config.log_level)
        .map_err(|e| TelemetryError::Config(format!("log level '{}': {}", config.log_level, e)))
}

/// Install the global subscriber described by `config`.
pub fn init_tracing(config: &TelemetryConfig) -> Result<SubscriberState, TelemetryError> {
    let env_filter = build_filter(config)?;

    let fmt_layer = if !config.console_output {
        None
    } else if config.json_logs {
        // JSON output for containers/production
        Some(
            fmt::layer()
                .json()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .boxed(),
        )
    } else {
        // Pretty output for development
        Some(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .with_ansi(true)
                .boxed(),
        )
    };

    let subscriber = tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter);

    match tracing::subscriber::set_global_default(subscriber) {
        Ok(()) => {
            tracing::info!(
                service = %config.service_name,
                level = %config.log_level,
                json = config.json_logs,
                "Logging initialized"
            );
            Ok(SubscriberState::Installed)
        }
        Err(_) => {
            tracing::debug!("Global subscriber already present, keeping it");
            Ok(SubscriberState::AlreadyPresent)
        }
    }
}

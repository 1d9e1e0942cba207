//! # Hub Telemetry
//!
//! Logging sink for the edge hub.
//!
//! ## Components
//!
//! - `tracing` subscriber with an `EnvFilter` and a JSON or pretty formatter
//! - `log` -> `tracing` bridge so crates built on the `log` facade (network
//!   and TLS stacks) end up in the same sink
//! - Structured logging macros (`log_event!`, `log_listener_event!`, `module_span!`)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use hub_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let _guard = init_telemetry(&TelemetryConfig::from_env())?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `EDGEHUB_SERVICE_NAME` | `edge-hub` | Service name in log lines |
//! | `EDGEHUB_LOG_LEVEL` | `info` | Log level filter (falls back to `RUST_LOG`) |
//! | `EDGEHUB_JSON_LOGS` | `false` | JSON formatted output |
//! | `EDGEHUB_CONSOLE_OUTPUT` | `true` | Write to stdout |
//! | `EDGEHUB_BRIDGE_LOG_LEVEL` | `info` | Level forwarded from `log` users |

mod bridge;
mod config;
mod logging;
mod tracing_setup;

pub use bridge::{install_log_bridge, LogBridge};
pub use config::TelemetryConfig;
pub use tracing_setup::{init_tracing, SubscriberState};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to install log bridge: {0}")]
    LogBridge(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Install the subscriber and the `log` bridge.
///
/// Both steps are process-wide and idempotent; the returned guard reports
/// whether this call performed them.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    let subscriber = init_tracing(config)?;
    let bridge = install_log_bridge(config.bridge_level_filter())?;

    Ok(TelemetryGuard { subscriber, bridge })
}

/// Guard that keeps telemetry active for the lifetime of the runtime.
#[derive(Debug)]
pub struct TelemetryGuard {
    subscriber: SubscriberState,
    bridge: LogBridge,
}

impl TelemetryGuard {
    /// Subscriber installation outcome.
    pub fn subscriber(&self) -> SubscriberState {
        self.subscriber
    }

    /// Bridge handle.
    pub fn bridge(&self) -> LogBridge {
        self.bridge
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!("Shutting down telemetry...");
    }
}

/// Convenience macro for creating a span with module context.
///
/// # Example
///
/// ```rust,ignore
/// use hub_telemetry::module_span;
///
/// let _span = module_span!("compose", module = "routing").entered();
/// ```
#[macro_export]
macro_rules! module_span {
    ($name:expr, $($field:tt)*) => {
        tracing::info_span!($name, $($field)*)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_telemetry_twice() {
        let config = TelemetryConfig {
            console_output: false,
            ..TelemetryConfig::default()
        };
        let _first = init_telemetry(&config).unwrap();
        let second = init_telemetry(&config).unwrap();

        assert_eq!(second.subscriber(), SubscriberState::AlreadyPresent);
        assert!(!second.bridge().newly_installed());
    }
}

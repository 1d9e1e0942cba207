//! Logging module: installs the process-wide sink before anything else logs.

use hub_telemetry::{init_telemetry, SubscriberState, TelemetryConfig, TelemetryError, TelemetryGuard};
use tracing::info;

/// Holds the telemetry guard for the lifetime of the runtime.
#[derive(Debug)]
pub struct LoggingModule {
    guard: TelemetryGuard,
}

impl LoggingModule {
    /// Install the subscriber and the `log` bridge.
    ///
    /// A subscriber installed earlier by the host (or a previous runtime in
    /// the same process) is accepted as is.
    pub fn construct(config: &TelemetryConfig) -> Result<Self, TelemetryError> {
        let guard = init_telemetry(config)?;
        if guard.subscriber() == SubscriberState::AlreadyPresent {
            info!("Reusing the already installed tracing subscriber");
        }
        info!(
            service = %config.service_name,
            level = %config.log_level,
            json = config.json_logs,
            bridge_installed = guard.bridge().newly_installed(),
            "Logging initialized"
        );
        Ok(Self { guard })
    }

    pub fn guard(&self) -> &TelemetryGuard {
        &self.guard
    }
}

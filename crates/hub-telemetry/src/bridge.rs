//! Redirects records from crates that log through the `log` facade (network
//! stacks, TLS libraries) into the `tracing` subscriber.
//!
//! `log` accepts exactly one logger per process, so the bridge is guarded and
//! a repeated install returns the existing handle instead of failing.

use log::LevelFilter;
use parking_lot::{const_mutex, Mutex};
use tracing_log::LogTracer;

use crate::TelemetryError;

static BRIDGE_LEVEL: Mutex<Option<LevelFilter>> = const_mutex(None);

/// Handle describing the installed `log` -> `tracing` bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogBridge {
    newly_installed: bool,
    max_level: LevelFilter,
}

impl LogBridge {
    /// True when this handle's install call performed the installation.
    pub fn newly_installed(&self) -> bool {
        self.newly_installed
    }

    /// Most verbose `log` level forwarded into `tracing`.
    pub fn max_level(&self) -> LevelFilter {
        self.max_level
    }
}

/// Install the bridge once per process.
///
/// Fails only when some other `log` implementation already owns the facade.
pub fn install_log_bridge(max_level: LevelFilter) -> Result<LogBridge, TelemetryError> {
    let mut installed = BRIDGE_LEVEL.lock();

    if let Some(level) = *installed {
        tracing::debug!(level = %level, "log bridge already installed");
        return Ok(LogBridge {
            newly_installed: false,
            max_level: level,
        });
    }

    LogTracer::init_with_filter(max_level).map_err(|e| TelemetryError::LogBridge(e.to_string()))?;
    *installed = Some(max_level);

    tracing::debug!(level = %max_level, "log records now forwarded to tracing");
    Ok(LogBridge {
        newly_installed: true,
        max_level,
    })
}

//! Composition errors.

use hub_config::ResolveError;
use hub_telemetry::TelemetryError;
use thiserror::Error;

use crate::registry::ModuleId;

/// Errors that abort startup before any listener runs.
#[derive(Debug, Error)]
pub enum CompositionError {
    #[error("Failed to construct module {module}: {reason}")]
    ModuleConstructionFailure { module: ModuleId, reason: String },

    #[error("Configuration resolution failed: {0}")]
    Resolve(#[from] ResolveError),

    #[error("Logging setup failed: {0}")]
    Telemetry(#[from] TelemetryError),
}

impl CompositionError {
    pub(crate) fn construction(module: ModuleId, reason: impl Into<String>) -> Self {
        Self::ModuleConstructionFailure {
            module,
            reason: reason.into(),
        }
    }

    /// The module that failed, when the failure is a construction failure.
    pub fn module(&self) -> Option<ModuleId> {
        match self {
            Self::ModuleConstructionFailure { module, .. } => Some(*module),
            _ => None,
        }
    }
}

pub type CompositionResult<T> = Result<T, CompositionError>;

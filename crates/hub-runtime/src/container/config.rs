//! # Runtime Configuration
//!
//! Process-level settings needed before the topology can be resolved: where
//! the settings file lives, the environment prefix, logging, and runtime
//! limits. Everything else comes through the config provider.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use hub_config::{
    EnvProvider, LayeredProvider, ResolveError, ResolveResult, TomlFileProvider,
    DEFAULT_ENV_PREFIX,
};
use hub_telemetry::TelemetryConfig;

use crate::modules::routing::DEFAULT_DISPATCH_CAPACITY;

/// Settings file used when `EDGEHUB_CONFIG_FILE` is not set.
pub const DEFAULT_CONFIG_FILE: &str = "edge-hub.toml";

const DISPATCH_CAPACITY_VAR: &str = "EDGEHUB_DISPATCH_CAPACITY";
const SHUTDOWN_GRACE_VAR: &str = "EDGEHUB_SHUTDOWN_GRACE_SECS";

/// Complete runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// TOML settings file; `None` means environment only.
    pub config_file: Option<PathBuf>,
    /// Prefix of the environment variables layered over the file.
    pub env_prefix: String,
    /// Logging configuration.
    pub telemetry: TelemetryConfig,
    /// Capacity of the routing engine inbox.
    pub dispatch_capacity: usize,
    /// Time given to background tasks after the shutdown signal.
    pub shutdown_grace: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            config_file: None,
            env_prefix: DEFAULT_ENV_PREFIX.to_string(),
            telemetry: TelemetryConfig::default(),
            dispatch_capacity: DEFAULT_DISPATCH_CAPACITY,
            shutdown_grace: Duration::from_secs(2),
        }
    }
}

impl RuntimeConfig {
    /// Load from the process environment.
    ///
    /// - `EDGEHUB_CONFIG_FILE`: settings file (default: `edge-hub.toml` if present)
    /// - `EDGEHUB_DISPATCH_CAPACITY`: routing inbox capacity (default: 1024)
    /// - `EDGEHUB_SHUTDOWN_GRACE_SECS`: shutdown grace period (default: 2)
    /// - logging variables, see [`TelemetryConfig::from_env`]
    ///
    /// A limit that is set but malformed is an error, not a default.
    pub fn from_env() -> ResolveResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok(), |path| path.exists())
    }

    /// Same as [`RuntimeConfig::from_env`] with injectable lookups.
    pub fn from_lookup<F, E>(lookup: F, file_exists: E) -> ResolveResult<Self>
    where
        F: Fn(&str) -> Option<String>,
        E: Fn(&Path) -> bool,
    {
        let defaults = Self::default();

        let config_file = match lookup("EDGEHUB_CONFIG_FILE") {
            Some(path) if !path.trim().is_empty() => Some(PathBuf::from(path)),
            _ => {
                let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
                file_exists(&fallback).then_some(fallback)
            }
        };

        let dispatch_capacity = match limit::<usize, _>(&lookup, DISPATCH_CAPACITY_VAR, "a positive integer")? {
            Some(0) => return Err(invalid(DISPATCH_CAPACITY_VAR, "0", "a positive integer")),
            Some(capacity) => capacity,
            None => defaults.dispatch_capacity,
        };
        let shutdown_grace = limit::<u64, _>(&lookup, SHUTDOWN_GRACE_VAR, "a whole number of seconds")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.shutdown_grace);

        Ok(Self {
            config_file,
            env_prefix: defaults.env_prefix,
            telemetry: TelemetryConfig::from_lookup(&lookup),
            dispatch_capacity,
            shutdown_grace,
        })
    }

    /// Settings file (if any) with the process environment layered on top.
    pub fn provider(&self) -> ResolveResult<LayeredProvider> {
        self.provider_with_env(EnvProvider::from_env(&self.env_prefix)?)
    }

    /// Same as [`RuntimeConfig::provider`] with an explicit environment layer.
    pub fn provider_with_env(&self, env: EnvProvider) -> ResolveResult<LayeredProvider> {
        let mut provider = LayeredProvider::new();
        if let Some(path) = &self.config_file {
            provider = provider.with_layer(TomlFileProvider::load(path)?);
        }
        Ok(provider.with_layer(env))
    }
}

/// Limit read from `variable`; blank counts as unset.
fn limit<T, F>(lookup: &F, variable: &str, expected: &'static str) -> ResolveResult<Option<T>>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(variable) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| invalid(variable, &raw, expected)),
        _ => Ok(None),
    }
}

fn invalid(variable: &str, value: &str, expected: &'static str) -> ResolveError {
    ResolveError::InvalidConfigValue {
        key: variable.to_string(),
        value: value.to_string(),
        expected,
    }
}

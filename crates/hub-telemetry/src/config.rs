//! Logging configuration from environment variables.

use std::env;

/// Configuration for the edge hub logging sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Service name attached to every log line
    pub service_name: String,

    /// Log level filter (trace, debug, info, warn, error) or a full
    /// `EnvFilter` directive such as `info,hub_runtime=debug`
    pub log_level: String,

    /// Whether to write log lines to stdout
    pub console_output: bool,

    /// Whether to format log lines as JSON
    pub json_logs: bool,

    /// Most verbose level forwarded from crates logging through `log`
    pub bridge_level: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "edge-hub".to_string(),
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
            bridge_level: "info".to_string(),
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `EDGEHUB_SERVICE_NAME`: Service name (default: edge-hub)
    /// - `EDGEHUB_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `EDGEHUB_CONSOLE_OUTPUT`: Enable console output (default: true)
    /// - `EDGEHUB_JSON_LOGS`: Enable JSON logs (default: false outside containers)
    /// - `EDGEHUB_BRIDGE_LOG_LEVEL`: Level forwarded from `log` users (default: info)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`TelemetryConfig::from_env`] but reads variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let is_container =
            lookup("KUBERNETES_SERVICE_HOST").is_some() || lookup("DOCKER_CONTAINER").is_some();
        let defaults = Self::default();

        Self {
            service_name: lookup("EDGEHUB_SERVICE_NAME").unwrap_or(defaults.service_name),

            log_level: lookup("EDGEHUB_LOG_LEVEL")
                .or_else(|| lookup("RUST_LOG"))
                .unwrap_or(defaults.log_level),

            console_output: lookup("EDGEHUB_CONSOLE_OUTPUT")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(defaults.console_output),

            json_logs: lookup("EDGEHUB_JSON_LOGS")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(is_container),

            bridge_level: lookup("EDGEHUB_BRIDGE_LOG_LEVEL").unwrap_or(defaults.bridge_level),
        }
    }

    /// Parse `bridge_level` into a `log` level filter. Unknown values fall back to `Info`.
    pub fn bridge_level_filter(&self) -> log::LevelFilter {
        self.bridge_level
            .parse::<log::LevelFilter>()
            .unwrap_or(log::LevelFilter::Info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = TelemetryConfig::default();
        assert_eq!(config.service_name, "edge-hub");
        assert_eq!(config.log_level, "info");
        assert!(config.console_output);
        assert!(!config.json_logs);
    }

    #[test]
    fn test_edgehub_level_wins_over_rust_log() {
        let config = TelemetryConfig::from_lookup(lookup_from(&[
            ("EDGEHUB_LOG_LEVEL", "debug"),
            ("RUST_LOG", "warn"),
        ]));
        assert_eq!(config.log_level, "debug");

        let config = TelemetryConfig::from_lookup(lookup_from(&[("RUST_LOG", "warn")]));
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_json_logs_default_on_in_containers() {
        let config = TelemetryConfig::from_lookup(lookup_from(&[("DOCKER_CONTAINER", "1")]));
        assert!(config.json_logs);

        let config = TelemetryConfig::from_lookup(lookup_from(&[
            ("DOCKER_CONTAINER", "1"),
            ("EDGEHUB_JSON_LOGS", "false"),
        ]));
        assert!(!config.json_logs);
    }

    #[test]
    fn test_console_output_disabled() {
        let config = TelemetryConfig::from_lookup(lookup_from(&[("EDGEHUB_CONSOLE_OUTPUT", "0")]));
        assert!(!config.console_output);
    }

    #[test]
    fn test_bridge_level_filter() {
        let mut config = TelemetryConfig::default();
        config.bridge_level = "warn".to_string();
        assert_eq!(config.bridge_level_filter(), log::LevelFilter::Warn);

        config.bridge_level = "chatty".to_string();
        assert_eq!(config.bridge_level_filter(), log::LevelFilter::Info);
    }
}

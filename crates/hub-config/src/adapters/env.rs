//! Environment variable provider.
//!
//! `store_and_forward.time_to_live_secs` is read from
//! `EDGEHUB_STORE_AND_FORWARD__TIME_TO_LIVE_SECS`. Values that look like JSON
//! arrays or objects are decoded into lists and tables; a table key with no
//! exact variable is assembled from `EDGEHUB_MQTT__*` style variables.

use std::collections::BTreeMap;
use std::ffi::OsString;

use serde_json::Value;

use crate::error::{ResolveError, ResolveResult};
use crate::ports::{ConfigProvider, ConfigValue};

/// Prefix used by the edge hub binary.
pub const DEFAULT_ENV_PREFIX: &str = "EDGEHUB_";

/// Provider over a snapshot of environment variables.
#[derive(Debug, Clone)]
pub struct EnvProvider {
    prefix: String,
    vars: BTreeMap<String, String>,
}

impl EnvProvider {
    /// Snapshot the process environment.
    ///
    /// Variables without `prefix` are never decoded, so foreign non-UTF-8
    /// entries are ignored. A prefixed one is an `InvalidConfigValue`.
    pub fn from_env(prefix: &str) -> ResolveResult<Self> {
        Self::from_vars_os(prefix, std::env::vars_os())
    }

    /// Build from raw OS strings, keeping only those with `prefix`.
    pub fn from_vars_os<I>(prefix: &str, vars: I) -> ResolveResult<Self>
    where
        I: IntoIterator<Item = (OsString, OsString)>,
    {
        let mut captured = BTreeMap::new();
        for (key, value) in vars {
            if !key.as_encoded_bytes().starts_with(prefix.as_bytes()) {
                continue;
            }
            let key = key.into_string().map_err(|raw| {
                ResolveError::invalid(
                    &raw.to_string_lossy(),
                    raw.to_string_lossy(),
                    "a UTF-8 variable name",
                )
            })?;
            let value = value
                .into_string()
                .map_err(|raw| ResolveError::invalid(&key, raw.to_string_lossy(), "UTF-8 text"))?;
            captured.insert(key, value);
        }
        Ok(Self {
            prefix: prefix.to_string(),
            vars: captured,
        })
    }

    /// Build from explicit variables, keeping only those with `prefix`.
    pub fn from_vars<I, K, V>(prefix: &str, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .filter(|(k, _)| k.starts_with(prefix))
            .collect();
        Self {
            prefix: prefix.to_string(),
            vars,
        }
    }

    /// Variable name for a dotted key.
    pub fn variable_name(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key.to_ascii_uppercase().replace('.', "__"))
    }

    /// Number of captured variables.
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// True when no variable carries the prefix.
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Table assembled from `VARIABLE__SUB` entries.
    ///
    /// All-uppercase sub-keys are lowercased (`MQTT__PORT` is `port`); mixed
    /// case is kept verbatim so `ROUTES__UpstreamRoute` stays `UpstreamRoute`.
    /// A route spelled entirely in capitals must use the JSON object form.
    fn nested_table(&self, variable: &str) -> Option<BTreeMap<String, String>> {
        let nested_prefix = format!("{variable}__");
        let map: BTreeMap<String, String> = self
            .vars
            .range(nested_prefix.clone()..)
            .take_while(|(k, _)| k.starts_with(&nested_prefix))
            .map(|(k, v)| {
                (sub_key(&k[nested_prefix.len()..]), v.clone())
            })
            .collect();
        (!map.is_empty()).then_some(map)
    }
}

fn sub_key(raw: &str) -> String {
    let key = if raw.chars().any(|c| c.is_ascii_lowercase()) {
        raw.to_string()
    } else {
        raw.to_ascii_lowercase()
    };
    key.replace("__", ".")
}

fn json_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn decode(raw: &str) -> ConfigValue {
    let trimmed = raw.trim();
    if trimmed.starts_with('[') {
        if let Ok(items) = serde_json::from_str::<Vec<Value>>(trimmed) {
            return ConfigValue::List(items.iter().map(json_text).collect());
        }
    }
    if trimmed.starts_with('{') {
        if let Ok(map) = serde_json::from_str::<serde_json::Map<String, Value>>(trimmed) {
            return ConfigValue::Table(map.iter().map(|(k, v)| (k.clone(), json_text(v))).collect());
        }
    }
    ConfigValue::Scalar(raw.to_string())
}

impl ConfigProvider for EnvProvider {
    fn get(&self, key: &str) -> Option<ConfigValue> {
        let variable = self.variable_name(key);
        match self.vars.get(&variable) {
            Some(raw) => Some(decode(raw)),
            None => self.nested_table(&variable).map(ConfigValue::Table),
        }
    }

    fn name(&self) -> &str {
        "environment"
    }
}

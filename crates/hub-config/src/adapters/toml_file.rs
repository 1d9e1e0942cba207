//! TOML settings file provider.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use toml::{Table, Value};
use tracing::debug;

use crate::error::{ResolveError, ResolveResult};
use crate::ports::{ConfigProvider, ConfigValue};

/// Provider backed by a parsed TOML document.
///
/// Dotted keys walk nested tables: `store_and_forward.enabled` reads
/// `enabled` from the `[store_and_forward]` table.
#[derive(Debug, Clone)]
pub struct TomlFileProvider {
    name: String,
    root: Table,
}

impl TomlFileProvider {
    /// Read and parse `path`.
    pub fn load(path: impl AsRef<Path>) -> ResolveResult<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| ResolveError::ConfigFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let provider = Self::parse(&raw, path.to_path_buf())?;
        debug!(path = %path.display(), keys = provider.root.len(), "Loaded settings file");
        Ok(provider)
    }

    /// Parse an in-memory document; `origin` is only used for error reporting.
    pub fn parse(raw: &str, origin: PathBuf) -> ResolveResult<Self> {
        let root: Table = raw.parse().map_err(|e: toml::de::Error| ResolveError::ConfigFile {
            path: origin.clone(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            name: origin.display().to_string(),
            root,
        })
    }

    fn lookup(&self, key: &str) -> Option<&Value> {
        let mut segments = key.split('.');
        let first = segments.next()?;
        let mut current = self.root.get(first)?;
        for segment in segments {
            current = current.as_table()?.get(segment)?;
        }
        Some(current)
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn flatten_into(prefix: &str, table: &Table, out: &mut BTreeMap<String, String>) {
    for (key, value) in table {
        let full = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            Value::Table(nested) => flatten_into(&full, nested, out),
            other => {
                out.insert(full, scalar_text(other));
            }
        }
    }
}

impl ConfigProvider for TomlFileProvider {
    fn get(&self, key: &str) -> Option<ConfigValue> {
        let value = self.lookup(key)?;
        Some(match value {
            Value::Array(items) => ConfigValue::List(items.iter().map(scalar_text).collect()),
            Value::Table(table) => {
                let mut map = BTreeMap::new();
                flatten_into("", table, &mut map);
                ConfigValue::Table(map)
            }
            other => ConfigValue::Scalar(scalar_text(other)),
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
product_info = "acme-gateway"

[store_and_forward]
enabled = true
time_to_live_secs = 7200

[topic_conversion]
inbound = ["devices/{deviceId}/messages/events/{*}", "$iothub/{deviceId}/messages/{*}"]

[topic_conversion.outbound]
c2d = "devices/{deviceId}/messages/devicebound"

[mqtt]
port = 8883
[mqtt.limits]
max_inflight = 16
"#;

    fn sample() -> TomlFileProvider {
        TomlFileProvider::parse(SAMPLE, PathBuf::from("sample.toml")).unwrap()
    }

    #[test]
    fn test_scalars_keep_textual_form() {
        let provider = sample();
        assert_eq!(
            provider.get("store_and_forward.enabled"),
            Some(ConfigValue::Scalar("true".to_string()))
        );
        assert_eq!(
            provider.get("store_and_forward.time_to_live_secs"),
            Some(ConfigValue::Scalar("7200".to_string()))
        );
        assert_eq!(
            provider.get("product_info"),
            Some(ConfigValue::Scalar("acme-gateway".to_string()))
        );
    }

    #[test]
    fn test_array_order_preserved() {
        let provider = sample();
        match provider.get("topic_conversion.inbound") {
            Some(ConfigValue::List(items)) => {
                assert_eq!(items[0], "devices/{deviceId}/messages/events/{*}");
                assert_eq!(items[1], "$iothub/{deviceId}/messages/{*}");
            }
            other => panic!("expected list, got {:?}", other),
        }
    }

    #[test]
    fn test_nested_tables_flatten() {
        let provider = sample();
        match provider.get("mqtt") {
            Some(ConfigValue::Table(map)) => {
                assert_eq!(map.get("port").map(String::as_str), Some("8883"));
                assert_eq!(map.get("limits.max_inflight").map(String::as_str), Some("16"));
            }
            other => panic!("expected table, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_key() {
        let provider = sample();
        assert!(provider.get("store_and_forward.storage_folder").is_none());
        assert!(provider.get("product_info.nested").is_none());
    }

    #[test]
    fn test_invalid_document() {
        let err = TomlFileProvider::parse("enabled = = true", PathBuf::from("bad.toml")).unwrap_err();
        assert!(matches!(err, ResolveError::ConfigFile { .. }));
    }

    #[test]
    fn test_load_missing_file() {
        let err = TomlFileProvider::load("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ResolveError::ConfigFile { .. }));
    }
}

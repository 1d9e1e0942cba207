//! Layered provider: file first, environment on top.

use std::collections::BTreeMap;

use crate::ports::{ConfigProvider, ConfigValue};

/// Ordered stack of providers. Later layers take precedence.
///
/// Scalars and lists come whole from the highest layer that defines them.
/// Tables are merged key by key, so an environment variable can override a
/// single entry of a section defined in the settings file.
#[derive(Default)]
pub struct LayeredProvider {
    layers: Vec<Box<dyn ConfigProvider>>,
}

impl LayeredProvider {
    /// Empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a layer above the existing ones.
    pub fn with_layer(mut self, layer: impl ConfigProvider + 'static) -> Self {
        self.layers.push(Box::new(layer));
        self
    }

    /// Layer names, lowest precedence first.
    pub fn layer_names(&self) -> Vec<&str> {
        self.layers.iter().map(|l| l.name()).collect()
    }
}

impl ConfigProvider for LayeredProvider {
    fn get(&self, key: &str) -> Option<ConfigValue> {
        let mut merged: Option<BTreeMap<String, String>> = None;

        for layer in self.layers.iter().rev() {
            match layer.get(key) {
                None => continue,
                Some(ConfigValue::Table(map)) => {
                    let acc = merged.get_or_insert_with(BTreeMap::new);
                    for (k, v) in map {
                        // Walking from the top layer down: keep what is already there.
                        acc.entry(k).or_insert(v);
                    }
                }
                Some(other) => {
                    return match merged {
                        Some(map) => Some(ConfigValue::Table(map)),
                        None => Some(other),
                    };
                }
            }
        }

        merged.map(ConfigValue::Table)
    }

    fn name(&self) -> &str {
        "layered"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryProvider;

    fn file_layer() -> InMemoryProvider {
        InMemoryProvider::builder()
            .name("file")
            .set("identity.device_id", "from-file")
            .set("product_info", "file-product")
            .table("mqtt", [("port", "8883"), ("max_inflight", "16")])
            .build()
    }

    fn env_layer() -> InMemoryProvider {
        InMemoryProvider::builder()
            .name("env")
            .set("identity.device_id", "from-env")
            .table("mqtt", [("port", "1883")])
            .build()
    }

    #[test]
    fn test_later_layer_wins_for_scalars() {
        let provider = LayeredProvider::new().with_layer(file_layer()).with_layer(env_layer());
        assert_eq!(
            provider.get("identity.device_id"),
            Some(ConfigValue::Scalar("from-env".to_string()))
        );
        assert_eq!(
            provider.get("product_info"),
            Some(ConfigValue::Scalar("file-product".to_string()))
        );
        assert!(provider.get("missing").is_none());
    }

    #[test]
    fn test_tables_merge_per_key() {
        let provider = LayeredProvider::new().with_layer(file_layer()).with_layer(env_layer());
        match provider.get("mqtt") {
            Some(ConfigValue::Table(map)) => {
                assert_eq!(map["port"], "1883");
                assert_eq!(map["max_inflight"], "16");
            }
            other => panic!("expected table, got {:?}", other),
        }
    }

    #[test]
    fn test_layer_names_in_precedence_order() {
        let provider = LayeredProvider::new().with_layer(file_layer()).with_layer(env_layer());
        assert_eq!(provider.layer_names(), vec!["file", "env"]);
    }
}

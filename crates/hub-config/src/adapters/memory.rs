//! In-memory provider.

use std::collections::BTreeMap;

use crate::ports::{ConfigProvider, ConfigValue};

/// Provider backed by a fixed map of values.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProvider {
    name: String,
    values: BTreeMap<String, ConfigValue>,
}

impl InMemoryProvider {
    /// Start building a provider.
    pub fn builder() -> InMemoryProviderBuilder {
        InMemoryProviderBuilder {
            inner: InMemoryProvider {
                name: "memory".to_string(),
                values: BTreeMap::new(),
            },
        }
    }
}

impl ConfigProvider for InMemoryProvider {
    fn get(&self, key: &str) -> Option<ConfigValue> {
        self.values.get(key).cloned()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Fluent builder for [`InMemoryProvider`].
#[derive(Debug, Clone)]
pub struct InMemoryProviderBuilder {
    inner: InMemoryProvider,
}

impl InMemoryProviderBuilder {
    /// Name reported in log lines.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.inner.name = name.into();
        self
    }

    /// Store a scalar.
    pub fn set(mut self, key: &str, value: impl ToString) -> Self {
        self.inner
            .values
            .insert(key.to_string(), ConfigValue::Scalar(value.to_string()));
        self
    }

    /// Store an ordered list.
    pub fn list<I, S>(mut self, key: &str, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let items = items.into_iter().map(Into::into).collect();
        self.inner
            .values
            .insert(key.to_string(), ConfigValue::List(items));
        self
    }

    /// Store a table.
    pub fn table<I, K, V>(mut self, key: &str, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.inner
            .values
            .insert(key.to_string(), ConfigValue::Table(map));
        self
    }

    /// Finish building.
    pub fn build(self) -> InMemoryProvider {
        self.inner
    }
}

//! Configuration provider port.
//!
//! Resolvers never see files or environment variables directly. They consult
//! a [`ConfigProvider`] by key and interpret the raw [`ConfigValue`] through
//! the typed helpers in [`ConfigProviderExt`].

use std::collections::BTreeMap;
use std::str::FromStr;

use crate::error::{ResolveError, ResolveResult};

/// Raw value stored under a configuration key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValue {
    /// A single value; numbers and booleans are kept in their textual form.
    Scalar(String),
    /// An ordered sequence. Order is preserved exactly as configured.
    List(Vec<String>),
    /// A flat mapping; nested keys are joined with `.`.
    Table(BTreeMap<String, String>),
}

impl ConfigValue {
    fn describe(&self) -> String {
        match self {
            Self::Scalar(s) => s.clone(),
            Self::List(items) => format!("[{}]", items.join(", ")),
            Self::Table(map) => format!("{{{} keys}}", map.len()),
        }
    }
}

/// Key/value source consulted by name (driven port).
pub trait ConfigProvider: Send + Sync {
    /// Look up the value stored under `key`.
    fn get(&self, key: &str) -> Option<ConfigValue>;

    /// Human readable name used in log lines.
    fn name(&self) -> &str;
}

/// An opaque named block of settings handed to a module untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigSection {
    name: String,
    values: BTreeMap<String, String>,
}

impl ConfigSection {
    /// Create a section from its entries.
    pub fn new(name: impl Into<String>, values: BTreeMap<String, String>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Section name (the key it was read from).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw entry.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Parse an entry, falling back to `default` when absent.
    pub fn parse_or<T: FromStr>(
        &self,
        key: &str,
        default: T,
        expected: &'static str,
    ) -> ResolveResult<T> {
        match self.get(key).map(str::trim) {
            None | Some("") => Ok(default),
            Some(raw) => raw.parse().map_err(|_| {
                ResolveError::invalid(&format!("{}.{}", self.name, key), raw, expected)
            }),
        }
    }

    /// Boolean entry in any spelling [`parse_bool`] accepts.
    pub fn bool_or(&self, key: &str, default: bool) -> ResolveResult<bool> {
        match self.get(key).map(str::trim) {
            None | Some("") => Ok(default),
            Some(raw) => parse_bool(raw).ok_or_else(|| {
                ResolveError::invalid(&format!("{}.{}", self.name, key), raw, "a boolean")
            }),
        }
    }

    /// True when the section holds no entries.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Parse the usual spellings of a boolean flag.
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Typed reads over any [`ConfigProvider`].
pub trait ConfigProviderExt: ConfigProvider {
    /// Scalar value as a string. Lists and tables are rejected.
    fn string(&self, key: &str) -> ResolveResult<Option<String>> {
        match self.get(key) {
            None => Ok(None),
            Some(ConfigValue::Scalar(s)) => Ok(Some(s)),
            Some(other) => Err(ResolveError::invalid(key, other.describe(), "a single value")),
        }
    }

    /// Scalar value with surrounding whitespace removed; blank counts as absent.
    fn non_blank_string(&self, key: &str) -> ResolveResult<Option<String>> {
        Ok(self
            .string(key)?
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()))
    }

    /// Scalar value that must be present and non-blank.
    fn required_string(&self, key: &str) -> ResolveResult<String> {
        self.non_blank_string(key)?
            .ok_or_else(|| ResolveError::MissingRequiredConfig {
                key: key.to_string(),
            })
    }

    /// Boolean flag, `default` when absent or blank.
    fn bool_or(&self, key: &str, default: bool) -> ResolveResult<bool> {
        match self.non_blank_string(key)? {
            None => Ok(default),
            Some(raw) => parse_bool(&raw).ok_or_else(|| ResolveError::invalid(key, raw, "a boolean")),
        }
    }

    /// Any `FromStr` value, `default` when absent or blank.
    fn parse_or<T: FromStr>(&self, key: &str, default: T, expected: &'static str) -> ResolveResult<T> {
        match self.non_blank_string(key)? {
            None => Ok(default),
            Some(raw) => raw
                .parse()
                .map_err(|_| ResolveError::invalid(key, raw, expected)),
        }
    }

    /// Ordered list. A lone scalar is a one-element list; absence is empty.
    fn list(&self, key: &str) -> ResolveResult<Vec<String>> {
        match self.get(key) {
            None => Ok(Vec::new()),
            Some(ConfigValue::List(items)) => Ok(items),
            Some(ConfigValue::Scalar(s)) if s.trim().is_empty() => Ok(Vec::new()),
            Some(ConfigValue::Scalar(s)) => Ok(vec![s]),
            Some(other) => Err(ResolveError::invalid(key, other.describe(), "a list")),
        }
    }

    /// Flat mapping; absence is empty.
    fn table(&self, key: &str) -> ResolveResult<BTreeMap<String, String>> {
        match self.get(key) {
            None => Ok(BTreeMap::new()),
            Some(ConfigValue::Table(map)) => Ok(map),
            Some(other) => Err(ResolveError::invalid(key, other.describe(), "a table")),
        }
    }

    /// Mapping wrapped as an opaque section.
    fn section(&self, key: &str) -> ResolveResult<ConfigSection> {
        Ok(ConfigSection::new(key, self.table(key)?))
    }
}

impl<P: ConfigProvider + ?Sized> ConfigProviderExt for P {}

//! Ports (trait definitions) for the configuration layer.

pub mod provider;

pub use provider::{parse_bool, ConfigProvider, ConfigProviderExt, ConfigSection, ConfigValue};

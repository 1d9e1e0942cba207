//! Adapters implementing [`ConfigProvider`](crate::ports::ConfigProvider).
//!
//! - `TomlFileProvider`: a TOML settings file
//! - `EnvProvider`: prefixed environment variables
//! - `LayeredProvider`: ordered stack of providers, later layers win
//! - `InMemoryProvider`: fixed values for tests and embedding hosts

pub mod env;
pub mod layered;
pub mod memory;
pub mod toml_file;

pub use env::{EnvProvider, DEFAULT_ENV_PREFIX};
pub use layered::LayeredProvider;
pub use memory::{InMemoryProvider, InMemoryProviderBuilder};
pub use toml_file::TomlFileProvider;

//! # Hub Config
//!
//! Turns layered configuration into one immutable [`Topology`].
//!
//! ## Architecture
//!
//! - **Ports** (`ports/`): `ConfigProvider`, the key/value source resolvers read from
//! - **Adapters** (`adapters/`): TOML file, environment, layered and in-memory providers
//! - **Domain** (`domain/`): identity, store-and-forward policy, certificate, topology
//! - **Service** (`service/`): the resolvers
//!   - `IdentityResolver`: connection string or discrete settings, never both
//!   - `StoreAndForwardPolicyResolver`: TTL and the on-disk storage directory
//!   - `CertificateLoader`: the single shared TLS server certificate
//!   - `TopologyResolver`: aggregates all of the above plus scalar settings
//!
//! ## Usage
//!
//! ```ignore
//! use hub_config::{EnvProvider, LayeredProvider, TomlFileProvider, TopologyResolver};
//!
//! let provider = LayeredProvider::new()
//!     .with_layer(TomlFileProvider::load("edge-hub.toml")?)
//!     .with_layer(EnvProvider::from_env("EDGEHUB_")?);
//! let topology = TopologyResolver::new().resolve(&provider)?;
//! ```
//!
//! Every error is fatal for startup; nothing here retries.

pub mod adapters;
pub mod domain;
pub mod error;
pub mod keys;
pub mod ports;
pub mod service;

pub use adapters::{
    EnvProvider, InMemoryProvider, InMemoryProviderBuilder, LayeredProvider, TomlFileProvider,
    DEFAULT_ENV_PREFIX,
};
pub use domain::{
    AmqpSettings, ConfigSource, Identity, IdentitySource, ModuleConnectionString,
    ServerCertificate, StoreAndForwardPolicy, TopicConversionRules, Topology, UpstreamProtocol,
    VersionInfo,
};
pub use error::{ResolveError, ResolveResult};
pub use ports::{ConfigProvider, ConfigProviderExt, ConfigSection, ConfigValue};
pub use service::{
    CertificateLoader, IdentityResolver, StoreAndForwardPolicyResolver, TopologyResolver,
};

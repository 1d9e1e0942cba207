//! Domain layer: resolved configuration values, no I/O.

pub mod certificate;
pub mod connection_string;
pub mod identity;
pub mod protocol;
pub mod store_and_forward;
pub mod topology;
pub mod version;

pub use certificate::ServerCertificate;
pub use connection_string::ModuleConnectionString;
pub use identity::{Identity, IdentitySource};
pub use protocol::{ConfigSource, UnknownConfigSource, UnknownProtocol, UpstreamProtocol};
pub use store_and_forward::{StoreAndForwardPolicy, INFINITE_TIME_TO_LIVE_SECS, STORAGE_SUBFOLDER};
pub use topology::{
    connectivity_check_frequency, AmqpSettings, TopicConversionRules, Topology,
    DEFAULT_CONNECTIVITY_CHECK_SECS,
};
pub use version::VersionInfo;

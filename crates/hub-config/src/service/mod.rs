//! Resolvers turning provider values into domain types.

pub mod certificate;
pub mod identity;
pub mod store_and_forward;
pub mod topology;

pub use certificate::CertificateLoader;
pub use identity::IdentityResolver;
pub use store_and_forward::StoreAndForwardPolicyResolver;
pub use topology::{TopologyResolver, DEFAULT_CONNECTION_POOL_SIZE};

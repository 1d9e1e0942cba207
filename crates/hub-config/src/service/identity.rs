//! IdentityResolver: connection string vs discrete settings.

use tracing::debug;

use crate::domain::Identity;
use crate::error::ResolveResult;
use crate::keys;
use crate::ports::{ConfigProvider, ConfigProviderExt};

/// Derives the gateway identity from one of two mutually exclusive sources.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityResolver;

impl IdentityResolver {
    /// Resolve the gateway identity.
    ///
    /// A non-blank connection string is the single source of truth: it must parse,
    /// and the discrete hostname/device/module settings are not read at all.
    /// Otherwise the discrete settings are taken verbatim, empty values included.
    pub fn resolve(&self, provider: &dyn ConfigProvider) -> ResolveResult<Identity> {
        if let Some(raw) = provider.string(keys::CONNECTION_STRING)? {
            if !raw.trim().is_empty() {
                let identity = Identity::from_connection_string(&raw)?;
                debug!(
                    hub = identity.hub_hostname(),
                    device_id = identity.device_id(),
                    module_id = identity.module_id(),
                    "Identity taken from connection string"
                );
                return Ok(identity);
            }
        }

        let identity = Identity::from_discrete(
            provider.string(keys::HUB_HOSTNAME)?.unwrap_or_default(),
            provider.string(keys::DEVICE_ID)?.unwrap_or_default(),
            provider.string(keys::MODULE_ID)?.unwrap_or_default(),
        );
        debug!(
            hub = identity.hub_hostname(),
            device_id = identity.device_id(),
            module_id = identity.module_id(),
            "Identity taken from discrete settings"
        );
        Ok(identity)
    }
}

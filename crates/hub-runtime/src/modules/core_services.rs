//! Core module: identity, product and version singletons.

use std::sync::Arc;

use hub_config::{Identity, VersionInfo};
use tracing::info;

use crate::registry::ServiceRegistry;

/// Product string reported upstream alongside the version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductInfo(pub String);

#[derive(Debug)]
pub struct CoreModule {
    identity: Arc<Identity>,
    product_info: Arc<ProductInfo>,
    version_info: Arc<VersionInfo>,
}

impl CoreModule {
    /// Wrap the singletons and register them for later modules.
    pub fn construct(
        identity: Arc<Identity>,
        product_info: &str,
        version_info: VersionInfo,
        registry: &ServiceRegistry,
    ) -> Self {
        let module = Self {
            identity,
            product_info: Arc::new(ProductInfo(product_info.to_string())),
            version_info: Arc::new(version_info),
        };

        registry.register(Arc::clone(&module.identity));
        registry.register(Arc::clone(&module.product_info));
        registry.register(Arc::clone(&module.version_info));

        info!(
            client_id = %module.identity.client_id(),
            hub = module.identity.hub_hostname(),
            version = %module.version_info,
            "Core services registered"
        );
        module
    }

    pub fn identity(&self) -> &Arc<Identity> {
        &self.identity
    }

    pub fn product_info(&self) -> &str {
        &self.product_info.0
    }

    pub fn version_info(&self) -> &VersionInfo {
        &self.version_info
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_singletons_are_shared_through_registry() {
        let registry = ServiceRegistry::new();
        let identity = Arc::new(Identity::from_discrete("hub.net", "edge-1", "$edgeHub"));
        let core = CoreModule::construct(
            Arc::clone(&identity),
            "edge-hub/1.0",
            VersionInfo::current(),
            &registry,
        );

        let resolved = registry.resolve::<Identity>().unwrap();
        assert!(Arc::ptr_eq(&resolved, &identity));
        assert!(Arc::ptr_eq(core.identity(), &identity));
        assert_eq!(registry.resolve::<ProductInfo>().unwrap().0, "edge-hub/1.0");
        assert_eq!(
            registry.resolve::<VersionInfo>().unwrap().version,
            core.version_info().version
        );
    }
}

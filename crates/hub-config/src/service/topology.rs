//! TopologyResolver: aggregates every resolved piece into one [`Topology`].

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::topology::connectivity_check_frequency;
use crate::domain::{
    AmqpSettings, ConfigSource, Identity, ServerCertificate, StoreAndForwardPolicy,
    TopicConversionRules, Topology, UpstreamProtocol, VersionInfo, DEFAULT_CONNECTIVITY_CHECK_SECS,
};
use crate::error::{ResolveError, ResolveResult};
use crate::keys;
use crate::ports::{ConfigProvider, ConfigProviderExt};
use crate::service::{CertificateLoader, IdentityResolver, StoreAndForwardPolicyResolver};

/// Default number of upstream connections kept by the routing layer.
pub const DEFAULT_CONNECTION_POOL_SIZE: usize = 10;

/// Runs every resolver against one provider and aggregates the result.
#[derive(Debug, Clone, Default)]
pub struct TopologyResolver {
    identity: IdentityResolver,
    store_and_forward: StoreAndForwardPolicyResolver,
    certificates: CertificateLoader,
}

impl TopologyResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific store-and-forward resolver (tests inject the temp dir).
    pub fn with_store_and_forward(mut self, resolver: StoreAndForwardPolicyResolver) -> Self {
        self.store_and_forward = resolver;
        self
    }

    /// Resolve identity, store-and-forward and the certificate, then aggregate.
    ///
    /// The certificate is optional as a whole: when neither TLS key is set the
    /// topology carries no certificate and TLS modules refuse to compose. When
    /// only one key is set the other is reported missing.
    pub fn resolve(&self, provider: &dyn ConfigProvider) -> ResolveResult<Topology> {
        let identity = self.identity.resolve(provider)?;
        let store_and_forward = self.store_and_forward.resolve(provider)?;

        let tls_configured = provider.non_blank_string(keys::TLS_CERTIFICATE_DIR)?.is_some()
            || provider.non_blank_string(keys::TLS_CERTIFICATE_FILE)?.is_some();
        let certificate = if tls_configured {
            Some(self.certificates.load_from_config(provider)?)
        } else {
            warn!("No TLS certificate configured; TLS listeners cannot start");
            None
        };

        self.aggregate(provider, identity, store_and_forward, certificate)
    }

    /// Combine already resolved parts with the remaining scalar settings.
    /// Performs no I/O.
    pub fn aggregate(
        &self,
        provider: &dyn ConfigProvider,
        identity: Identity,
        store_and_forward: StoreAndForwardPolicy,
        tls_certificate: Option<Arc<ServerCertificate>>,
    ) -> ResolveResult<Topology> {
        let connectivity_secs = provider.parse_or(
            keys::CONNECTIVITY_CHECK_FREQUENCY_SECS,
            DEFAULT_CONNECTIVITY_CHECK_SECS,
            "an integer number of seconds",
        )?;

        let config_source = match provider.non_blank_string(keys::CONFIG_SOURCE)? {
            None => ConfigSource::default(),
            Some(raw) => raw
                .parse()
                .map_err(|_| ResolveError::invalid(keys::CONFIG_SOURCE, raw, "local or twin"))?,
        };
        let routes = match config_source {
            ConfigSource::Local => provider.table(keys::ROUTES)?,
            ConfigSource::Twin => BTreeMap::new(),
        };

        let topology = Topology {
            identity: Arc::new(identity),
            store_and_forward,
            topic_conversion_rules: Arc::new(TopicConversionRules {
                inbound: provider.list(keys::TOPIC_INBOUND_TEMPLATES)?,
                outbound: provider.table(keys::TOPIC_OUTBOUND_TEMPLATES)?,
            }),
            connectivity_check_frequency: connectivity_check_frequency(connectivity_secs),
            upstream_protocol: upstream_protocol(provider)?,
            config_source,
            routes,
            tls_certificate,
            client_cert_auth_enabled: provider.bool_or(keys::CLIENT_CERT_AUTH_ENABLED, false)?,
            ca_chain_path: provider.non_blank_string(keys::CA_CHAIN_PATH)?.map(PathBuf::from),
            connection_pool_size: provider.parse_or(
                keys::CONNECTION_POOL_SIZE,
                DEFAULT_CONNECTION_POOL_SIZE,
                "a non-negative integer",
            )?,
            optimize_for_performance: provider.bool_or(keys::OPTIMIZE_FOR_PERFORMANCE, true)?,
            product_info: provider.string(keys::PRODUCT_INFO)?.unwrap_or_default(),
            version_info: VersionInfo::current(),
            mqtt_settings: provider.section(keys::MQTT_SECTION)?,
            amqp_settings: amqp_settings(provider)?,
        };

        info!(
            client_id = %topology.identity.client_id(),
            store_and_forward = topology.store_and_forward.enabled(),
            routes = topology.routes.len(),
            config_source = ?topology.config_source,
            tls = topology.tls_certificate.is_some(),
            "Topology resolved"
        );
        Ok(topology)
    }
}

/// Unrecognized or blank values are not an error; routing picks its default.
fn upstream_protocol(provider: &dyn ConfigProvider) -> ResolveResult<Option<UpstreamProtocol>> {
    let raw = provider.string(keys::UPSTREAM_PROTOCOL)?.unwrap_or_default();
    let protocol = UpstreamProtocol::parse_optional(&raw);
    if protocol.is_none() && !raw.trim().is_empty() {
        debug!(value = %raw, "Ignoring unrecognized upstream protocol");
    }
    Ok(protocol)
}

fn amqp_settings(provider: &dyn ConfigProvider) -> ResolveResult<AmqpSettings> {
    let defaults = AmqpSettings::default();
    Ok(AmqpSettings {
        scheme: provider
            .non_blank_string(keys::AMQP_SCHEME)?
            .unwrap_or(defaults.scheme),
        port: provider.parse_or(keys::AMQP_PORT, defaults.port, "a port number")?,
    })
}

//! The immutable aggregate handed to module composition.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::certificate::ServerCertificate;
use crate::domain::identity::Identity;
use crate::domain::protocol::{ConfigSource, UpstreamProtocol};
use crate::domain::store_and_forward::StoreAndForwardPolicy;
use crate::domain::version::VersionInfo;
use crate::ports::ConfigSection;

/// Default connectivity check period in seconds.
pub const DEFAULT_CONNECTIVITY_CHECK_SECS: i64 = 300;

/// Map the configured seconds onto a check period.
///
/// Negative values mean "never check" and become [`Duration::MAX`]; zero is
/// kept as zero.
pub fn connectivity_check_frequency(secs: i64) -> Duration {
    match u64::try_from(secs) {
        Ok(secs) => Duration::from_secs(secs),
        Err(_) => Duration::MAX,
    }
}

/// Topic translation templates between device protocols and routing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopicConversionRules {
    /// Inbound templates in configured order; the first match wins downstream.
    pub inbound: Vec<String>,
    /// Outbound templates keyed by message kind.
    pub outbound: BTreeMap<String, String>,
}

/// AMQP listener settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmqpSettings {
    pub scheme: String,
    pub port: u16,
}

impl Default for AmqpSettings {
    fn default() -> Self {
        Self {
            scheme: "amqps".to_string(),
            port: 5671,
        }
    }
}

/// Fully resolved configuration. Built once, read-only afterwards.
#[derive(Debug, Clone)]
pub struct Topology {
    pub identity: Arc<Identity>,
    pub store_and_forward: StoreAndForwardPolicy,
    pub topic_conversion_rules: Arc<TopicConversionRules>,
    /// [`Duration::MAX`] means never check proactively.
    pub connectivity_check_frequency: Duration,
    /// `None` lets the routing layer choose its default.
    pub upstream_protocol: Option<UpstreamProtocol>,
    pub config_source: ConfigSource,
    pub routes: BTreeMap<String, String>,
    /// Shared by reference with every TLS module.
    pub tls_certificate: Option<Arc<ServerCertificate>>,
    pub client_cert_auth_enabled: bool,
    pub ca_chain_path: Option<PathBuf>,
    pub connection_pool_size: usize,
    pub optimize_for_performance: bool,
    pub product_info: String,
    pub version_info: VersionInfo,
    pub mqtt_settings: ConfigSection,
    pub amqp_settings: AmqpSettings,
}

impl Topology {
    /// True when the connectivity checker should never run.
    pub fn never_checks_connectivity(&self) -> bool {
        self.connectivity_check_frequency == Duration::MAX
    }
}

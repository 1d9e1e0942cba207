//! Configuration keys consumed during resolution.
//!
//! Keys are dotted paths. The TOML adapter walks them through nested tables
//! and the environment adapter maps `a.b_c` to `EDGEHUB_A__B_C`.

pub const CONNECTION_STRING: &str = "identity.connection_string";
pub const HUB_HOSTNAME: &str = "identity.hub_hostname";
pub const DEVICE_ID: &str = "identity.device_id";
pub const MODULE_ID: &str = "identity.module_id";

pub const CONNECTION_POOL_SIZE: &str = "routing.connection_pool_size";
pub const OPTIMIZE_FOR_PERFORMANCE: &str = "routing.optimize_for_performance";
pub const CONFIG_SOURCE: &str = "routing.config_source";
pub const ROUTES: &str = "routing.routes";
pub const UPSTREAM_PROTOCOL: &str = "routing.upstream_protocol";
pub const CONNECTIVITY_CHECK_FREQUENCY_SECS: &str = "routing.connectivity_check_frequency_secs";

pub const TOPIC_INBOUND_TEMPLATES: &str = "topic_conversion.inbound";
pub const TOPIC_OUTBOUND_TEMPLATES: &str = "topic_conversion.outbound";

pub const STORE_AND_FORWARD_ENABLED: &str = "store_and_forward.enabled";
pub const USE_PERSISTENT_STORAGE: &str = "store_and_forward.use_persistent_storage";
pub const TIME_TO_LIVE_SECS: &str = "store_and_forward.time_to_live_secs";
pub const STORAGE_FOLDER: &str = "store_and_forward.storage_folder";

pub const TLS_CERTIFICATE_DIR: &str = "tls.certificate_dir";
pub const TLS_CERTIFICATE_FILE: &str = "tls.certificate_file";

pub const CLIENT_CERT_AUTH_ENABLED: &str = "auth.client_cert_enabled";
pub const CA_CHAIN_PATH: &str = "auth.ca_chain_path";

pub const AMQP_SCHEME: &str = "amqp.scheme";
pub const AMQP_PORT: &str = "amqp.port";

pub const MQTT_SECTION: &str = "mqtt";

pub const PRODUCT_INFO: &str = "product_info";

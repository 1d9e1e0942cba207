//! End-to-end resolution from a settings file plus environment overrides.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use hub_config::keys;
use hub_config::{
    EnvProvider, IdentitySource, InMemoryProvider, LayeredProvider, ResolveError,
    StoreAndForwardPolicyResolver, TomlFileProvider, TopologyResolver, UpstreamProtocol,
};
use tempfile::TempDir;

const CERT_PEM: &str = "-----BEGIN CERTIFICATE-----\nMAMCAQE=\n-----END CERTIFICATE-----\n";

fn write_settings(dir: &Path, storage: &Path, cert_dir: &Path) -> std::path::PathBuf {
    let settings = format!(
        r#"
product_info = "edge-hub-it"

[identity]
connection_string = "HostName=it-hub.example.net;DeviceId=gateway-7;ModuleId=$edgeHub;SharedAccessKey=c2VjcmV0"
device_id = "stale-device"

[routing]
upstream_protocol = "amqpws"
connectivity_check_frequency_secs = -1
connection_pool_size = 4

[routing.routes]
telemetry = "FROM /messages/* INTO $upstream"

[topic_conversion]
inbound = ["devices/{{deviceId}}/messages/events/#", "$iothub/methods/res/#"]

[store_and_forward]
enabled = true
use_persistent_storage = true
time_to_live_secs = 7200
storage_folder = '{storage}'

[tls]
certificate_dir = '{cert_dir}'
certificate_file = "edge-hub-server.pem"

[mqtt]
port = 8883
"#,
        storage = storage.display(),
        cert_dir = cert_dir.display(),
    );
    let path = dir.join("edge-hub.toml");
    fs::write(&path, settings).unwrap();
    path
}

#[test]
fn test_file_and_environment_resolve_into_topology() {
    let root = TempDir::new().unwrap();
    let storage = root.path().join("storage");
    let certs = root.path().join("certs");
    fs::create_dir_all(&storage).unwrap();
    fs::create_dir_all(&certs).unwrap();
    fs::write(certs.join("edge-hub-server.pem"), CERT_PEM).unwrap();
    let settings = write_settings(root.path(), &storage, &certs);

    let env = EnvProvider::from_vars(
        "EDGEHUB_",
        [
            ("EDGEHUB_ROUTING__CONNECTION_POOL_SIZE", "20"),
            ("EDGEHUB_MQTT__PORT", "1883"),
        ],
    );
    let provider = LayeredProvider::new()
        .with_layer(TomlFileProvider::load(&settings).unwrap())
        .with_layer(env);

    let topology = TopologyResolver::new()
        .with_store_and_forward(StoreAndForwardPolicyResolver::with_temp_dir(root.path()))
        .resolve(&provider)
        .unwrap();

    assert_eq!(topology.identity.source(), IdentitySource::ConnectionString);
    assert_eq!(topology.identity.device_id(), "gateway-7");
    assert_eq!(topology.identity.module_id(), "$edgeHub");
    assert_eq!(topology.identity.hub_hostname(), "it-hub.example.net");

    assert_eq!(topology.upstream_protocol, Some(UpstreamProtocol::AmqpWs));
    assert_eq!(topology.connectivity_check_frequency, Duration::MAX);
    assert!(topology.never_checks_connectivity());
    assert_eq!(topology.connection_pool_size, 20);
    assert_eq!(topology.routes.len(), 1);
    assert_eq!(topology.topic_conversion_rules.inbound.len(), 2);
    assert_eq!(topology.mqtt_settings.get("port"), Some("1883"));
    assert_eq!(topology.product_info, "edge-hub-it");

    let expected_storage = storage.join("edge-hub");
    assert_eq!(topology.store_and_forward.time_to_live_secs(), 7200);
    assert_eq!(
        topology.store_and_forward.storage_path(),
        Some(expected_storage.as_path())
    );
    assert!(expected_storage.is_dir());

    let cert = topology.tls_certificate.as_ref().unwrap();
    assert_eq!(cert.chain().len(), 1);
    assert_eq!(Arc::strong_count(cert), 1);
}

#[test]
fn test_no_tls_keys_means_no_certificate() {
    let provider = InMemoryProvider::builder()
        .set(keys::HUB_HOSTNAME, "hub.net")
        .set(keys::DEVICE_ID, "device")
        .set(keys::MODULE_ID, "module")
        .build();

    let topology = TopologyResolver::new().resolve(&provider).unwrap();
    assert!(topology.tls_certificate.is_none());
    assert!(!topology.store_and_forward.enabled());
}

#[test]
fn test_missing_certificate_file_is_fatal() {
    let root = TempDir::new().unwrap();
    let provider = InMemoryProvider::builder()
        .set(keys::TLS_CERTIFICATE_DIR, root.path().display())
        .set(keys::TLS_CERTIFICATE_FILE, "missing.pem")
        .build();

    let err = TopologyResolver::new().resolve(&provider).unwrap_err();
    assert!(matches!(err, ResolveError::CertificateLoadFailure { .. }));
}

#[test]
fn test_half_configured_tls_reports_missing_key() {
    let provider = InMemoryProvider::builder()
        .set(keys::TLS_CERTIFICATE_FILE, "edge.pem")
        .build();

    let err = TopologyResolver::new().resolve(&provider).unwrap_err();
    assert!(matches!(
        err,
        ResolveError::MissingRequiredConfig { key } if key == keys::TLS_CERTIFICATE_DIR
    ));
}

#[test]
fn test_storage_that_cannot_be_created_is_fatal() {
    let root = TempDir::new().unwrap();
    let occupied = root.path().join("occupied");
    fs::write(&occupied, b"file").unwrap();

    let provider = InMemoryProvider::builder()
        .set(keys::STORE_AND_FORWARD_ENABLED, "true")
        .set(keys::USE_PERSISTENT_STORAGE, "true")
        .set(keys::STORAGE_FOLDER, occupied.display())
        .build();

    let err = TopologyResolver::new()
        .with_store_and_forward(StoreAndForwardPolicyResolver::with_temp_dir(root.path()))
        .resolve(&provider)
        .unwrap_err();
    assert!(matches!(err, ResolveError::StorageUnavailable { .. }));
}

#[test]
fn test_malformed_connection_string_stops_resolution() {
    let provider = InMemoryProvider::builder()
        .set(keys::CONNECTION_STRING, "HostName=hub.net;DeviceId")
        .build();

    assert!(matches!(
        TopologyResolver::new().resolve(&provider),
        Err(ResolveError::MalformedConnectionString { .. })
    ));
}

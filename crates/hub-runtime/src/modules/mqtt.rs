//! MQTT protocol head.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use hub_config::{ConfigSection, ResolveResult, ServerCertificate, TopicConversionRules, Topology};
use hub_telemetry::log_listener_event;
use tracing::debug;

use crate::modules::routing::{DispatchError, RoutedMessage, RouterHandle};
use crate::modules::WEBSOCKET_PATH;
use crate::registry::{ModuleId, ServiceRegistry, WebSocketListener};

/// WebSocket subprotocol announced by MQTT clients.
pub const MQTT_WEBSOCKET_SUBPROTOCOL: &str = "mqtt";

/// Settings read from the opaque `mqtt` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MqttSettings {
    pub port: u16,
    pub max_inflight: u16,
    pub websocket_enabled: bool,
}

impl Default for MqttSettings {
    fn default() -> Self {
        Self {
            port: 8883,
            max_inflight: 16,
            websocket_enabled: true,
        }
    }
}

impl MqttSettings {
    pub fn from_section(section: &ConfigSection) -> ResolveResult<Self> {
        let defaults = Self::default();
        Ok(Self {
            port: section.parse_or("port", defaults.port, "a port number")?,
            max_inflight: section.parse_or("max_inflight", defaults.max_inflight, "an integer")?,
            websocket_enabled: section.bool_or("websocket_enabled", defaults.websocket_enabled)?,
        })
    }
}

#[derive(Debug)]
pub struct MqttModule {
    settings: MqttSettings,
    topic_rules: Arc<TopicConversionRules>,
    certificate: Arc<ServerCertificate>,
    router: RouterHandle,
    store_and_forward_enabled: bool,
    client_cert_auth_enabled: bool,
    ca_chain_path: Option<PathBuf>,
    optimize_for_performance: bool,
}

impl MqttModule {
    /// Build the protocol head around the shared certificate and router.
    pub fn construct(
        topology: &Topology,
        certificate: Arc<ServerCertificate>,
        router: RouterHandle,
        registry: &ServiceRegistry,
    ) -> ResolveResult<Self> {
        let settings = MqttSettings::from_section(&topology.mqtt_settings)?;

        if settings.websocket_enabled {
            registry.register_websocket_listener(WebSocketListener {
                owner: ModuleId::Mqtt,
                path: WEBSOCKET_PATH,
                subprotocol: MQTT_WEBSOCKET_SUBPROTOCOL,
            });
        }

        log_listener_event!(
            info,
            ModuleId::Mqtt.name(),
            "MQTT protocol head constructed",
            "mqtts",
            settings.port,
            inbound_templates = topology.topic_conversion_rules.inbound.len(),
            client_cert_auth = topology.client_cert_auth_enabled,
            certificate = %certificate.source_path().display()
        );

        Ok(Self {
            settings,
            topic_rules: Arc::clone(&topology.topic_conversion_rules),
            certificate,
            router,
            store_and_forward_enabled: topology.store_and_forward.enabled(),
            client_cert_auth_enabled: topology.client_cert_auth_enabled,
            ca_chain_path: topology.ca_chain_path.clone(),
            optimize_for_performance: topology.optimize_for_performance,
        })
    }

    pub fn settings(&self) -> &MqttSettings {
        &self.settings
    }

    pub fn certificate(&self) -> &Arc<ServerCertificate> {
        &self.certificate
    }

    pub fn store_and_forward_enabled(&self) -> bool {
        self.store_and_forward_enabled
    }

    pub fn client_cert_auth_enabled(&self) -> bool {
        self.client_cert_auth_enabled
    }

    pub fn ca_chain_path(&self) -> Option<&PathBuf> {
        self.ca_chain_path.as_ref()
    }

    pub fn optimize_for_performance(&self) -> bool {
        self.optimize_for_performance
    }

    /// First inbound template matching `topic`, with its captured segments.
    ///
    /// Templates are tried in configured order. `{name}` captures one topic
    /// level, a trailing `#` matches any remainder.
    pub fn match_inbound(&self, topic: &str) -> Option<(usize, BTreeMap<String, String>)> {
        self.topic_rules
            .inbound
            .iter()
            .enumerate()
            .find_map(|(index, template)| match_template(template, topic).map(|c| (index, c)))
    }

    /// Hand a device message to the routing engine.
    pub async fn publish(
        &self,
        client_id: &str,
        topic: &str,
        payload: Vec<u8>,
    ) -> Result<(), DispatchError> {
        match self.match_inbound(topic) {
            Some((index, _)) => debug!(topic, template = index, "Inbound topic matched"),
            None => debug!(topic, "Inbound topic matched no template"),
        }
        self.router
            .dispatch(RoutedMessage {
                origin: ModuleId::Mqtt,
                client_id: client_id.to_string(),
                topic: topic.to_string(),
                payload,
            })
            .await
    }
}

fn match_template(template: &str, topic: &str) -> Option<BTreeMap<String, String>> {
    let mut captures = BTreeMap::new();
    let mut levels = topic.split('/');

    for segment in template.split('/') {
        if segment == "#" {
            return Some(captures);
        }
        let level = levels.next()?;
        match segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            Some(name) if !level.is_empty() => {
                captures.insert(name.to_string(), level.to_string());
            }
            Some(_) => return None,
            None if segment == level => {}
            None => return None,
        }
    }

    levels.next().is_none().then_some(captures)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_captures() {
        let captures =
            match_template("devices/{deviceId}/modules/{moduleId}/#", "devices/d1/modules/m1/inputs/x")
                .unwrap();
        assert_eq!(captures["deviceId"], "d1");
        assert_eq!(captures["moduleId"], "m1");
    }

    #[test]
    fn test_template_requires_full_match() {
        assert!(match_template("devices/{deviceId}/messages", "devices/d1/messages/extra").is_none());
        assert!(match_template("devices/{deviceId}/messages", "devices/d1").is_none());
        assert!(match_template("devices/{deviceId}", "devices/").is_none());
        assert!(match_template("$iothub/twin/#", "$iothub/twin/res/200").is_some());
    }

    #[test]
    fn test_settings_from_section() {
        let section = ConfigSection::new(
            "mqtt",
            BTreeMap::from([
                ("port".to_string(), "1883".to_string()),
                ("websocket_enabled".to_string(), "false".to_string()),
            ]),
        );
        let settings = MqttSettings::from_section(&section).unwrap();
        assert_eq!(settings.port, 1883);
        assert_eq!(settings.max_inflight, 16);
        assert!(!settings.websocket_enabled);

        assert_eq!(
            MqttSettings::from_section(&ConfigSection::default()).unwrap(),
            MqttSettings::default()
        );
    }

    #[test]
    fn test_websocket_flag_accepts_numeric_and_word_spellings() {
        for (raw, expected) in [("1", true), ("yes", true), ("0", false), ("off", false)] {
            let section = ConfigSection::new(
                "mqtt",
                BTreeMap::from([("websocket_enabled".to_string(), raw.to_string())]),
            );
            assert_eq!(
                MqttSettings::from_section(&section).unwrap().websocket_enabled,
                expected,
                "{raw}"
            );
        }
    }
}

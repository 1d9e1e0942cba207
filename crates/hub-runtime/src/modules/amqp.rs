//! AMQP protocol head.

use std::sync::Arc;

use hub_config::{AmqpSettings, ServerCertificate};
use hub_telemetry::log_listener_event;

use crate::modules::routing::{DispatchError, RoutedMessage, RouterHandle};
use crate::modules::WEBSOCKET_PATH;
use crate::registry::{ModuleId, ServiceRegistry, WebSocketListener};

/// WebSocket subprotocol for AMQP over WebSocket, binary framing.
pub const AMQP_WEBSOCKET_SUBPROTOCOL: &str = "AMQPWSB10";

#[derive(Debug)]
pub struct AmqpModule {
    settings: AmqpSettings,
    certificate: Arc<ServerCertificate>,
    hub_hostname: String,
    router: RouterHandle,
}

impl AmqpModule {
    pub fn construct(
        settings: &AmqpSettings,
        certificate: Arc<ServerCertificate>,
        hub_hostname: &str,
        router: RouterHandle,
        registry: &ServiceRegistry,
    ) -> Self {
        registry.register_websocket_listener(WebSocketListener {
            owner: ModuleId::Amqp,
            path: WEBSOCKET_PATH,
            subprotocol: AMQP_WEBSOCKET_SUBPROTOCOL,
        });

        let module = Self {
            settings: settings.clone(),
            certificate,
            hub_hostname: hub_hostname.to_string(),
            router,
        };
        log_listener_event!(
            info,
            ModuleId::Amqp.name(),
            "AMQP protocol head constructed",
            module.settings.scheme,
            module.settings.port,
            hub = %module.hub_hostname
        );
        module
    }

    /// Listening endpoint, e.g. `amqps://hub.example.net:5671`.
    pub fn endpoint(&self) -> String {
        format!(
            "{}://{}:{}",
            self.settings.scheme, self.hub_hostname, self.settings.port
        )
    }

    pub fn certificate(&self) -> &Arc<ServerCertificate> {
        &self.certificate
    }

    /// Hand a link message to the routing engine.
    pub async fn publish(
        &self,
        client_id: &str,
        address: &str,
        payload: Vec<u8>,
    ) -> Result<(), DispatchError> {
        self.router
            .dispatch(RoutedMessage {
                origin: ModuleId::Amqp,
                client_id: client_id.to_string(),
                topic: address.to_string(),
                payload,
            })
            .await
    }
}

//! HTTP protocol head.
//!
//! Takes no explicit inputs: everything it needs is resolved from the service
//! registry, so it must be constructed after the modules that register them.

use std::sync::Arc;

use hub_config::Identity;
use tracing::info;

use crate::modules::routing::{DispatchError, RoutedMessage, RouterHandle};
use crate::registry::{ModuleId, ServiceRegistry, WebSocketListener};

#[derive(Debug)]
pub struct HttpModule {
    identity: Arc<Identity>,
    router: Arc<RouterHandle>,
    websocket_listeners: Vec<WebSocketListener>,
}

impl HttpModule {
    /// Resolve identity, router and WebSocket listeners from `registry`.
    ///
    /// Returns the name of the first missing service on failure.
    pub fn from_registry(registry: &ServiceRegistry) -> Result<Self, String> {
        let identity = registry
            .resolve::<Identity>()
            .ok_or_else(|| "identity is not registered".to_string())?;
        let router = registry
            .resolve::<RouterHandle>()
            .ok_or_else(|| "router handle is not registered".to_string())?;
        let websocket_listeners = registry.websocket_listeners();

        info!(
            client_id = %identity.client_id(),
            websocket_listeners = websocket_listeners.len(),
            "HTTP protocol head constructed"
        );

        Ok(Self {
            identity,
            router,
            websocket_listeners,
        })
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn websocket_listeners(&self) -> &[WebSocketListener] {
        &self.websocket_listeners
    }

    /// Listener to upgrade to for the requested WebSocket subprotocol.
    pub fn websocket_listener(&self, subprotocol: &str) -> Option<&WebSocketListener> {
        self.websocket_listeners
            .iter()
            .find(|l| l.subprotocol.eq_ignore_ascii_case(subprotocol))
    }

    /// Hand a request body to the routing engine.
    pub async fn post(&self, client_id: &str, path: &str, body: Vec<u8>) -> Result<(), DispatchError> {
        self.router
            .dispatch(RoutedMessage {
                origin: ModuleId::Http,
                client_id: client_id.to_string(),
                topic: path.to_string(),
                payload: body,
            })
            .await
    }
}

//! # Routing Module
//!
//! Owns the routing engine inbox. Protocol heads never call the engine
//! directly: they hold a cloned [`RouterHandle`] and dispatch messages over a
//! bounded channel, which the engine drains once the runtime starts.
//!
//! ```text
//! MQTT ──┐
//! AMQP ──┼──dispatch──→ [bounded inbox] ──→ routing engine ──→ upstream
//! HTTP ──┘
//! ```

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use hub_config::{Identity, StoreAndForwardPolicy, Topology, UpstreamProtocol};
use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::registry::{ModuleId, ServiceRegistry};

/// Default inbox capacity.
pub const DEFAULT_DISPATCH_CAPACITY: usize = 1024;

/// A message handed from a protocol head to the routing engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutedMessage {
    /// Protocol head that received the message.
    pub origin: ModuleId,
    /// `device/module` of the sending client.
    pub client_id: String,
    /// Topic or path the message arrived on.
    pub topic: String,
    pub payload: Vec<u8>,
}

/// Dispatch errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error("routing engine inbox is closed")]
    Closed,

    #[error("routing engine inbox is full")]
    Full,

    #[error("module {0} is not a protocol head and cannot dispatch")]
    UnauthorizedOrigin(ModuleId),
}

/// Inputs the routing engine is built from.
#[derive(Debug, Clone)]
pub struct RoutingSettings {
    pub identity: Arc<Identity>,
    pub routes: BTreeMap<String, String>,
    pub store_and_forward: StoreAndForwardPolicy,
    pub connection_pool_size: usize,
    pub upstream_protocol: Option<UpstreamProtocol>,
    pub optimize_for_performance: bool,
    pub connectivity_check_frequency: Duration,
}

impl RoutingSettings {
    pub fn from_topology(topology: &Topology) -> Self {
        Self {
            identity: Arc::clone(&topology.identity),
            routes: topology.routes.clone(),
            store_and_forward: topology.store_and_forward.clone(),
            connection_pool_size: topology.connection_pool_size,
            upstream_protocol: topology.upstream_protocol,
            optimize_for_performance: topology.optimize_for_performance,
            connectivity_check_frequency: topology.connectivity_check_frequency,
        }
    }
}

/// Cloneable sender side of the routing engine inbox.
#[derive(Debug, Clone)]
pub struct RouterHandle {
    sender: mpsc::Sender<RoutedMessage>,
    capacity: usize,
}

impl RouterHandle {
    /// Only protocol heads feed the engine.
    fn validate_origin(message: &RoutedMessage) -> Result<(), DispatchError> {
        match message.origin {
            ModuleId::Mqtt | ModuleId::Amqp | ModuleId::Http => Ok(()),
            other => Err(DispatchError::UnauthorizedOrigin(other)),
        }
    }

    /// Queue a message, waiting for inbox space.
    pub async fn dispatch(&self, message: RoutedMessage) -> Result<(), DispatchError> {
        Self::validate_origin(&message)?;
        self.sender
            .send(message)
            .await
            .map_err(|_| DispatchError::Closed)
    }

    /// Queue a message without waiting.
    pub fn try_dispatch(&self, message: RoutedMessage) -> Result<(), DispatchError> {
        Self::validate_origin(&message)?;
        self.sender.try_send(message).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => DispatchError::Full,
            mpsc::error::TrySendError::Closed(_) => DispatchError::Closed,
        })
    }

    /// Inbox capacity, for diagnostics.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// The routing engine and its inbox.
#[derive(Debug)]
pub struct RoutingModule {
    settings: RoutingSettings,
    handle: RouterHandle,
    inbox: Mutex<Option<mpsc::Receiver<RoutedMessage>>>,
    delivered: AtomicU64,
}

impl RoutingModule {
    /// Build the engine and register its dispatch handle.
    pub fn construct(settings: RoutingSettings, capacity: usize, registry: &ServiceRegistry) -> Self {
        let capacity = capacity.max(1);
        let (sender, receiver) = mpsc::channel(capacity);
        let handle = RouterHandle { sender, capacity };
        registry.register(Arc::new(handle.clone()));

        info!(
            routes = settings.routes.len(),
            pool_size = settings.connection_pool_size,
            upstream = ?settings.upstream_protocol,
            store_and_forward = settings.store_and_forward.enabled(),
            optimize_for_performance = settings.optimize_for_performance,
            "Routing engine constructed"
        );
        if settings.connectivity_check_frequency == Duration::MAX {
            info!("Connectivity checks disabled");
        }

        Self {
            settings,
            handle,
            inbox: Mutex::new(Some(receiver)),
            delivered: AtomicU64::new(0),
        }
    }

    /// A new sender for a protocol head.
    pub fn handle(&self) -> RouterHandle {
        self.handle.clone()
    }

    pub fn settings(&self) -> &RoutingSettings {
        &self.settings
    }

    /// Messages taken off the inbox so far.
    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    /// Drain the inbox until shutdown is signalled or every sender is gone.
    ///
    /// The inbox can be drained once; a second call returns immediately.
    pub async fn run(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        let inbox = self.inbox.lock().take();
        let Some(mut inbox) = inbox else {
            warn!("Routing engine already running");
            return;
        };

        info!("Routing engine started");
        loop {
            tokio::select! {
                message = inbox.recv() => match message {
                    Some(message) => self.deliver(message),
                    None => break,
                },
                _ = shutdown.changed() => {
                    info!("[routing] Shutdown signal received");
                    break;
                }
            }
        }
        info!(delivered = self.delivered(), "Routing engine stopped");
    }

    fn deliver(&self, message: RoutedMessage) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
        debug!(
            origin = %message.origin,
            client_id = %message.client_id,
            topic = %message.topic,
            bytes = message.payload.len(),
            routes = self.settings.routes.len(),
            "Message accepted for routing"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> RoutingSettings {
        RoutingSettings {
            identity: Arc::new(Identity::from_discrete("hub.net", "edge", "$edgeHub")),
            routes: BTreeMap::from([("all".to_string(), "FROM /* INTO $upstream".to_string())]),
            store_and_forward: StoreAndForwardPolicy::in_memory(60),
            connection_pool_size: 10,
            upstream_protocol: None,
            optimize_for_performance: true,
            connectivity_check_frequency: Duration::from_secs(300),
        }
    }

    fn message(origin: ModuleId) -> RoutedMessage {
        RoutedMessage {
            origin,
            client_id: "sensor/temp".to_string(),
            topic: "devices/sensor/messages/events".to_string(),
            payload: b"21.5".to_vec(),
        }
    }

    #[test]
    fn test_handle_registered() {
        let registry = ServiceRegistry::new();
        let routing = RoutingModule::construct(settings(), 4, &registry);
        let handle = registry.resolve::<RouterHandle>().unwrap();
        assert_eq!(handle.capacity(), 4);
        assert_eq!(routing.settings().routes.len(), 1);
    }

    #[test]
    fn test_only_protocol_heads_dispatch() {
        let routing = RoutingModule::construct(settings(), 4, &ServiceRegistry::new());
        assert_eq!(
            routing.handle().try_dispatch(message(ModuleId::Core)),
            Err(DispatchError::UnauthorizedOrigin(ModuleId::Core))
        );
        assert!(routing.handle().try_dispatch(message(ModuleId::Mqtt)).is_ok());
    }

    #[test]
    fn test_bounded_inbox() {
        let routing = RoutingModule::construct(settings(), 1, &ServiceRegistry::new());
        let handle = routing.handle();
        assert!(handle.try_dispatch(message(ModuleId::Amqp)).is_ok());
        assert_eq!(handle.try_dispatch(message(ModuleId::Amqp)), Err(DispatchError::Full));
    }

    #[tokio::test]
    async fn test_run_drains_inbox_until_shutdown() {
        let routing = Arc::new(RoutingModule::construct(settings(), 8, &ServiceRegistry::new()));
        let handle = routing.handle();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        handle.dispatch(message(ModuleId::Mqtt)).await.unwrap();
        handle.dispatch(message(ModuleId::Http)).await.unwrap();

        let task = tokio::spawn(Arc::clone(&routing).run(shutdown_rx));
        for _ in 0..100 {
            if routing.delivered() == 2 {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(routing.delivered(), 2);

        shutdown_tx.send(true).unwrap();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_second_run_returns_immediately() {
        let routing = Arc::new(RoutingModule::construct(settings(), 8, &ServiceRegistry::new()));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        shutdown_tx.send(true).unwrap();

        Arc::clone(&routing).run(shutdown_rx.clone()).await;
        // The inbox was consumed by the first run.
        Arc::clone(&routing).run(shutdown_rx).await;
        assert_eq!(routing.delivered(), 0);
    }
}

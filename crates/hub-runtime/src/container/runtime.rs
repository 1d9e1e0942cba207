//! # Edge Hub Runtime
//!
//! The fully composed set of modules plus their background tasks.
//!
//! ## Lifecycle
//!
//! 1. `bootstrap` (or `ModuleComposer::compose`): every module constructed
//! 2. `start`: background tasks spawned (routing engine)
//! 3. `shutdown`: tasks signalled and given a grace period

use std::sync::Arc;
use std::time::Duration;

use hub_config::{ConfigProvider, Topology, TopologyResolver};
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::container::composer::ModuleComposer;
use crate::container::config::RuntimeConfig;
use crate::error::CompositionResult;
use crate::modules::{
    AmqpModule, CoreModule, HttpModule, LoggingModule, MqttModule, RouterHandle, RoutingModule,
};
use crate::registry::{ModuleId, ModuleStatus, ServiceRegistry};

/// Modules built during composition.
#[derive(Debug, Default)]
pub(crate) struct Assembly {
    pub(crate) logging: Option<LoggingModule>,
    pub(crate) core: Option<CoreModule>,
    pub(crate) routing: Option<Arc<RoutingModule>>,
    pub(crate) mqtt: Option<MqttModule>,
    pub(crate) amqp: Option<AmqpModule>,
    pub(crate) http: Option<HttpModule>,
}

/// Composed edge hub.
pub struct EdgeHubRuntime {
    topology: Arc<Topology>,
    registry: Arc<ServiceRegistry>,
    modules: Assembly,
    construction_order: Vec<ModuleId>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl EdgeHubRuntime {
    pub(crate) fn new(
        topology: Arc<Topology>,
        registry: Arc<ServiceRegistry>,
        modules: Assembly,
        construction_order: Vec<ModuleId>,
    ) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            topology,
            registry,
            modules,
            construction_order,
            shutdown_tx,
            shutdown_rx,
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Resolve the topology from `provider` and compose every module.
    ///
    /// Nothing is started; any error leaves no module running.
    pub fn bootstrap(config: &RuntimeConfig, provider: &dyn ConfigProvider) -> CompositionResult<Self> {
        let topology = TopologyResolver::new().resolve(provider)?;
        ModuleComposer::new(config.telemetry.clone())
            .with_dispatch_capacity(config.dispatch_capacity)
            .compose(topology)
    }

    /// Spawn background tasks. Must be called from within a tokio runtime.
    pub async fn start(&self) {
        info!("===========================================");
        info!("  Edge Hub {}", self.topology.version_info);
        info!("  Device: {}", self.topology.identity.client_id());
        info!("===========================================");

        if let Some(routing) = &self.modules.routing {
            let task = tokio::spawn(Arc::clone(routing).run(self.shutdown_rx.clone()));
            self.tasks.lock().push(task);
        }

        for id in &self.construction_order {
            self.registry.set_status(*id, ModuleStatus::Running);
        }
        info!("Edge hub is running");
    }

    /// Signal shutdown and wait up to `grace` for background tasks.
    pub async fn shutdown(&self, grace: Duration) {
        info!("Initiating graceful shutdown...");

        if let Err(e) = self.shutdown_tx.send(true) {
            error!("Failed to send shutdown signal: {}", e);
        }

        let tasks: Vec<_> = self.tasks.lock().drain(..).collect();
        for task in tasks {
            match tokio::time::timeout(grace, task).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!("Background task ended abnormally: {}", e),
                Err(_) => warn!("Background task did not stop within {:?}", grace),
            }
        }

        for id in &self.construction_order {
            self.registry.set_status(*id, ModuleStatus::Stopped);
        }
        info!("Shutdown complete");
    }

    pub fn topology(&self) -> &Arc<Topology> {
        &self.topology
    }

    pub fn registry(&self) -> &Arc<ServiceRegistry> {
        &self.registry
    }

    /// Modules in the order they were constructed.
    pub fn construction_order(&self) -> &[ModuleId] {
        &self.construction_order
    }

    pub fn logging(&self) -> Option<&LoggingModule> {
        self.modules.logging.as_ref()
    }

    pub fn core(&self) -> Option<&CoreModule> {
        self.modules.core.as_ref()
    }

    pub fn routing(&self) -> Option<&Arc<RoutingModule>> {
        self.modules.routing.as_ref()
    }

    pub fn mqtt(&self) -> Option<&MqttModule> {
        self.modules.mqtt.as_ref()
    }

    pub fn amqp(&self) -> Option<&AmqpModule> {
        self.modules.amqp.as_ref()
    }

    pub fn http(&self) -> Option<&HttpModule> {
        self.modules.http.as_ref()
    }

    /// Dispatch handle of the routing engine.
    pub fn router(&self) -> Option<RouterHandle> {
        self.modules.routing.as_ref().map(|r| r.handle())
    }
}

impl std::fmt::Debug for EdgeHubRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EdgeHubRuntime")
            .field("construction_order", &self.construction_order)
            .field("registry", &self.registry)
            .finish()
    }
}

//! # Module Registry
//!
//! Identifies the edge hub modules, declares what each one needs before it can
//! be constructed, and holds the shared services modules hand to each other.
//!
//! ## Construction Order
//!
//! ```text
//! Logging ──→ Core ──→ Routing ──┬──→ MQTT ──┐
//!                                ├──→ AMQP ──┤
//!                                └───────────┴──→ HTTP
//! ```
//!
//! Dependencies name modules that must already be constructed. Requirements
//! name topology values that must be present (the TLS certificate for the
//! listeners that terminate TLS).

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use hub_config::Topology;
use parking_lot::RwLock;
use tracing::info;

/// Edge hub module identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ModuleId {
    /// Global log sink and the `log` bridge.
    Logging,
    /// Identity, product and version singletons.
    Core,
    /// Routing engine and its dispatch handle.
    Routing,
    /// MQTT protocol head.
    Mqtt,
    /// AMQP protocol head.
    Amqp,
    /// HTTP protocol head.
    Http,
}

impl ModuleId {
    /// Get the module name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Logging => "logging",
            Self::Core => "core",
            Self::Routing => "routing",
            Self::Mqtt => "mqtt",
            Self::Amqp => "amqp",
            Self::Http => "http",
        }
    }

    /// Modules that MUST be constructed before this one.
    #[must_use]
    pub fn dependencies(&self) -> Vec<ModuleId> {
        match self {
            Self::Logging => vec![],
            Self::Core => vec![Self::Logging],
            Self::Routing => vec![Self::Core],
            Self::Mqtt => vec![Self::Routing],
            Self::Amqp => vec![Self::Core, Self::Routing],
            // Collects the WebSocket listeners of both protocol heads.
            Self::Http => vec![Self::Core, Self::Routing, Self::Mqtt, Self::Amqp],
        }
    }

    /// Topology values this module cannot be built without.
    #[must_use]
    pub fn requirements(&self) -> Vec<Requirement> {
        match self {
            Self::Mqtt | Self::Amqp => vec![Requirement::TlsCertificate],
            _ => vec![],
        }
    }

    /// All modules in construction order.
    #[must_use]
    pub fn all() -> Vec<ModuleId> {
        vec![
            Self::Logging,
            Self::Core,
            Self::Routing,
            Self::Mqtt,
            Self::Amqp,
            Self::Http,
        ]
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A topology value a module needs at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// The shared TLS server certificate.
    TlsCertificate,
}

impl Requirement {
    /// Whether `topology` provides this value.
    pub fn is_satisfied(&self, topology: &Topology) -> bool {
        match self {
            Self::TlsCertificate => topology.tls_certificate.is_some(),
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Self::TlsCertificate => "TLS server certificate",
        }
    }
}

/// One construction unit of the composition plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDescriptor {
    pub id: ModuleId,
    pub dependencies: Vec<ModuleId>,
    pub requirements: Vec<Requirement>,
}

impl ModuleDescriptor {
    /// Descriptor with the module's declared dependencies and requirements.
    pub fn for_module(id: ModuleId) -> Self {
        Self {
            id,
            dependencies: id.dependencies(),
            requirements: id.requirements(),
        }
    }

    /// The standard plan: every module, in construction order.
    pub fn default_plan() -> Vec<ModuleDescriptor> {
        ModuleId::all().into_iter().map(Self::for_module).collect()
    }
}

/// Module lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleStatus {
    /// Not constructed yet.
    Pending,
    /// Constructed and wired.
    Constructed,
    /// Background tasks running.
    Running,
    /// Stopped gracefully.
    Stopped,
    /// Construction failed.
    Failed,
}

/// A WebSocket endpoint contributed by a protocol module and served by HTTP.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebSocketListener {
    pub owner: ModuleId,
    pub path: &'static str,
    pub subprotocol: &'static str,
}

/// Shared services and module status.
///
/// Services are keyed by type: a module registers an `Arc<T>` and any later
/// module resolves it by asking for `T`. Written during composition only.
#[derive(Default)]
pub struct ServiceRegistry {
    services: RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
    listeners: RwLock<Vec<WebSocketListener>>,
    status: RwLock<HashMap<ModuleId, ModuleStatus>>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a shared service, replacing any previous one of the same type.
    pub fn register<T: Any + Send + Sync>(&self, service: Arc<T>) {
        self.services.write().insert(TypeId::of::<T>(), service);
    }

    /// Resolve a shared service by type.
    pub fn resolve<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        let service = self.services.read().get(&TypeId::of::<T>()).cloned()?;
        service.downcast::<T>().ok()
    }

    /// Number of registered services.
    pub fn service_count(&self) -> usize {
        self.services.read().len()
    }

    pub fn register_websocket_listener(&self, listener: WebSocketListener) {
        info!(
            "[Registry] WebSocket listener {} ({}) from {}",
            listener.path, listener.subprotocol, listener.owner
        );
        self.listeners.write().push(listener);
    }

    /// Registered WebSocket listeners, in registration order.
    pub fn websocket_listeners(&self) -> Vec<WebSocketListener> {
        self.listeners.read().clone()
    }

    pub fn set_status(&self, id: ModuleId, status: ModuleStatus) {
        self.status.write().insert(id, status);
    }

    /// Get status of a module.
    pub fn get_status(&self, id: ModuleId) -> ModuleStatus {
        self.status
            .read()
            .get(&id)
            .copied()
            .unwrap_or(ModuleStatus::Pending)
    }

    /// Print registry status.
    pub fn print_status(&self) {
        info!("===========================================");
        info!("  EDGE HUB MODULE STATUS");
        info!("===========================================");

        let status = self.status.read();

        for id in ModuleId::all() {
            let state = status.get(&id).unwrap_or(&ModuleStatus::Pending);
            let icon = match state {
                ModuleStatus::Running => "✅",
                ModuleStatus::Constructed => "🔧",
                ModuleStatus::Failed => "❌",
                ModuleStatus::Stopped => "⏹️ ",
                ModuleStatus::Pending => "⏳",
            };
            info!("  {} {:10} {:?}", icon, id.name(), state);
        }

        info!("  services: {}", self.service_count());
        info!("===========================================");
    }
}

impl fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceRegistry")
            .field("services", &self.service_count())
            .field("listeners", &self.listeners.read().len())
            .finish()
    }
}

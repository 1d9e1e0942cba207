//! # Module Composer
//!
//! Builds the edge hub modules from a resolved topology, one descriptor at a
//! time, in plan order:
//!
//! ```text
//! Phase 1: Logging   subscriber + log bridge
//! Phase 2: Core      identity, product info, version
//! Phase 3: Routing   engine + dispatch handle
//! Phase 4: MQTT      shared certificate, topic rules, router
//! Phase 5: AMQP      shared certificate, hub hostname, router
//! Phase 6: HTTP      everything resolved from the registry
//! ```
//!
//! Before each phase the descriptor is checked: all dependencies must be
//! constructed and all requirements present in the topology. Any failure
//! aborts composition; there is no partially started runtime.

use std::sync::Arc;

use hub_config::{ServerCertificate, Topology};
use hub_telemetry::{log_event, module_span, TelemetryConfig};
use tracing::{error, info, instrument};

use crate::container::runtime::{Assembly, EdgeHubRuntime};
use crate::error::{CompositionError, CompositionResult};
use crate::modules::routing::{RoutingSettings, DEFAULT_DISPATCH_CAPACITY};
use crate::modules::{
    AmqpModule, CoreModule, HttpModule, LoggingModule, MqttModule, RouterHandle, RoutingModule,
};
use crate::registry::{ModuleDescriptor, ModuleId, ModuleStatus, ServiceRegistry};

/// Composes modules around a topology.
#[derive(Debug, Clone)]
pub struct ModuleComposer {
    plan: Vec<ModuleDescriptor>,
    telemetry: TelemetryConfig,
    dispatch_capacity: usize,
    constructed: Vec<ModuleId>,
}

impl Default for ModuleComposer {
    fn default() -> Self {
        Self::new(TelemetryConfig::default())
    }
}

impl ModuleComposer {
    /// Composer with the standard plan.
    pub fn new(telemetry: TelemetryConfig) -> Self {
        Self {
            plan: ModuleDescriptor::default_plan(),
            telemetry,
            dispatch_capacity: DEFAULT_DISPATCH_CAPACITY,
            constructed: Vec::new(),
        }
    }

    /// Replace the plan.
    pub fn with_plan(mut self, plan: Vec<ModuleDescriptor>) -> Self {
        self.plan = plan;
        self
    }

    pub fn with_dispatch_capacity(mut self, capacity: usize) -> Self {
        self.dispatch_capacity = capacity;
        self
    }

    pub fn plan(&self) -> &[ModuleDescriptor] {
        &self.plan
    }

    /// Modules constructed by the last [`ModuleComposer::compose`] call, in order.
    ///
    /// After a failure this shows how far composition got.
    pub fn construction_order(&self) -> &[ModuleId] {
        &self.constructed
    }

    /// Construct every planned module.
    #[instrument(name = "compose", skip_all)]
    pub fn compose(&mut self, topology: Topology) -> CompositionResult<EdgeHubRuntime> {
        self.constructed.clear();
        let topology = Arc::new(topology);
        let registry = Arc::new(ServiceRegistry::new());
        let mut assembly = Assembly::default();

        for (phase, descriptor) in self.plan.clone().into_iter().enumerate() {
            let id = descriptor.id;
            if let Err(e) = self.check(&descriptor, &topology) {
                error!(module = %id, error = %e, "Module prerequisites not met");
                registry.set_status(id, ModuleStatus::Failed);
                return Err(e);
            }

            let _span = module_span!("construct", module = id.name()).entered();
            info!("Phase {}: constructing {}", phase + 1, id);
            if let Err(e) = self.construct(id, &topology, &registry, &mut assembly) {
                log_event!(error, id.name(), "Module construction failed", error = %e);
                registry.set_status(id, ModuleStatus::Failed);
                return Err(e);
            }

            registry.set_status(id, ModuleStatus::Constructed);
            log_event!(debug, id.name(), "Module constructed", phase = phase + 1);
            self.constructed.push(id);
        }

        let missing: Vec<&str> = ModuleId::all()
            .into_iter()
            .filter(|id| !self.constructed.contains(id))
            .map(|id| id.name())
            .collect();
        if !missing.is_empty() {
            info!(?missing, "Modules left out of the plan");
        }

        info!(modules = self.constructed.len(), "All planned modules constructed");
        Ok(EdgeHubRuntime::new(
            topology,
            registry,
            assembly,
            self.constructed.clone(),
        ))
    }

    fn check(&self, descriptor: &ModuleDescriptor, topology: &Topology) -> CompositionResult<()> {
        let id = descriptor.id;
        if self.constructed.contains(&id) {
            return Err(CompositionError::construction(id, "module is planned twice"));
        }
        if let Some(dep) = descriptor
            .dependencies
            .iter()
            .find(|dep| !self.constructed.contains(dep))
        {
            return Err(CompositionError::construction(
                id,
                format!("depends on {dep}, which has not been constructed"),
            ));
        }
        if let Some(req) = descriptor
            .requirements
            .iter()
            .find(|req| !req.is_satisfied(topology))
        {
            return Err(CompositionError::construction(
                id,
                format!("{} is not configured", req.describe()),
            ));
        }
        Ok(())
    }

    fn construct(
        &self,
        id: ModuleId,
        topology: &Arc<Topology>,
        registry: &ServiceRegistry,
        assembly: &mut Assembly,
    ) -> CompositionResult<()> {
        match id {
            ModuleId::Logging => {
                assembly.logging = Some(LoggingModule::construct(&self.telemetry)?);
            }
            ModuleId::Core => {
                assembly.core = Some(CoreModule::construct(
                    Arc::clone(&topology.identity),
                    &topology.product_info,
                    topology.version_info.clone(),
                    registry,
                ));
            }
            ModuleId::Routing => {
                assembly.routing = Some(Arc::new(RoutingModule::construct(
                    RoutingSettings::from_topology(topology),
                    self.dispatch_capacity,
                    registry,
                )));
            }
            ModuleId::Mqtt => {
                let module = MqttModule::construct(
                    topology,
                    certificate(id, topology)?,
                    router(id, assembly)?,
                    registry,
                )
                .map_err(|e| CompositionError::construction(id, e.to_string()))?;
                assembly.mqtt = Some(module);
            }
            ModuleId::Amqp => {
                assembly.amqp = Some(AmqpModule::construct(
                    &topology.amqp_settings,
                    certificate(id, topology)?,
                    topology.identity.hub_hostname(),
                    router(id, assembly)?,
                    registry,
                ));
            }
            ModuleId::Http => {
                let module = HttpModule::from_registry(registry)
                    .map_err(|reason| CompositionError::construction(id, reason))?;
                assembly.http = Some(module);
            }
        }
        Ok(())
    }
}

/// The single shared certificate; cloning the `Arc`, never the certificate.
fn certificate(id: ModuleId, topology: &Topology) -> CompositionResult<Arc<ServerCertificate>> {
    topology
        .tls_certificate
        .as_ref()
        .map(Arc::clone)
        .ok_or_else(|| CompositionError::construction(id, "TLS server certificate is not configured"))
}

fn router(id: ModuleId, assembly: &Assembly) -> CompositionResult<RouterHandle> {
    assembly
        .routing
        .as_ref()
        .map(|routing| routing.handle())
        .ok_or_else(|| CompositionError::construction(id, "routing engine is not constructed"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hub_config::{
        ConfigSection, ConfigSource, Identity, StoreAndForwardPolicy, TopicConversionRules,
        VersionInfo,
    };
    use std::collections::BTreeMap;
    use std::time::Duration;

    fn quiet() -> TelemetryConfig {
        TelemetryConfig {
            console_output: false,
            ..TelemetryConfig::default()
        }
    }

    fn topology(with_certificate: bool) -> Topology {
        let certificate = with_certificate.then(|| {
            Arc::new(
                ServerCertificate::from_bytes(&[0x30, 0x03, 0x02, 0x01, 0x01], "edge.der").unwrap(),
            )
        });
        Topology {
            identity: Arc::new(Identity::from_discrete("hub.net", "edge-1", "$edgeHub")),
            store_and_forward: StoreAndForwardPolicy::disabled(),
            topic_conversion_rules: Arc::new(TopicConversionRules::default()),
            connectivity_check_frequency: Duration::from_secs(300),
            upstream_protocol: None,
            config_source: ConfigSource::Local,
            routes: BTreeMap::new(),
            tls_certificate: certificate,
            client_cert_auth_enabled: false,
            ca_chain_path: None,
            connection_pool_size: 10,
            optimize_for_performance: true,
            product_info: String::new(),
            version_info: VersionInfo::current(),
            mqtt_settings: ConfigSection::default(),
            amqp_settings: Default::default(),
        }
    }

    #[test]
    fn test_full_plan_order() {
        let mut composer = ModuleComposer::new(quiet());
        let runtime = composer.compose(topology(true)).unwrap();
        assert_eq!(composer.construction_order(), ModuleId::all().as_slice());
        assert_eq!(runtime.construction_order(), ModuleId::all().as_slice());
    }

    #[test]
    fn test_missing_certificate_stops_before_mqtt() {
        let mut composer = ModuleComposer::new(quiet());
        let err = composer.compose(topology(false)).unwrap_err();

        assert_eq!(err.module(), Some(ModuleId::Mqtt));
        assert_eq!(
            composer.construction_order(),
            &[ModuleId::Logging, ModuleId::Core, ModuleId::Routing]
        );
    }

    #[test]
    fn test_dependency_out_of_order_is_rejected() {
        let plan = vec![
            ModuleDescriptor::for_module(ModuleId::Logging),
            ModuleDescriptor::for_module(ModuleId::Routing),
        ];
        let mut composer = ModuleComposer::new(quiet()).with_plan(plan);
        let err = composer.compose(topology(true)).unwrap_err();

        match err {
            CompositionError::ModuleConstructionFailure { module, reason } => {
                assert_eq!(module, ModuleId::Routing);
                assert!(reason.contains("core"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(composer.construction_order(), &[ModuleId::Logging]);
    }

    #[test]
    fn test_duplicate_descriptor_is_rejected() {
        let plan = vec![
            ModuleDescriptor::for_module(ModuleId::Logging),
            ModuleDescriptor::for_module(ModuleId::Logging),
        ];
        let mut composer = ModuleComposer::new(quiet()).with_plan(plan);
        assert_eq!(
            composer.compose(topology(false)).unwrap_err().module(),
            Some(ModuleId::Logging)
        );
    }

    #[test]
    fn test_certificate_shared_not_copied() {
        let topology = topology(true);
        let original = Arc::clone(topology.tls_certificate.as_ref().unwrap());

        let mut composer = ModuleComposer::new(quiet());
        let runtime = composer.compose(topology).unwrap();

        let mqtt = runtime.mqtt().unwrap();
        let amqp = runtime.amqp().unwrap();
        assert!(Arc::ptr_eq(mqtt.certificate(), &original));
        assert!(Arc::ptr_eq(amqp.certificate(), &original));
    }
}

//! # Hub Runtime Library
//!
//! Composes the edge hub modules around a resolved topology. The `edge-hub`
//! binary in `main.rs` is a thin wrapper over this library.
//!
//! ## Layout
//!
//! - `registry/` - module identifiers, descriptors, shared service registry
//! - `modules/` - one file per module (logging, core, routing, mqtt, amqp, http)
//! - `container/` - runtime configuration, `ModuleComposer`, `EdgeHubRuntime`

pub mod container;
pub mod error;
pub mod modules;
pub mod registry;

pub use container::{EdgeHubRuntime, ModuleComposer, RuntimeConfig};
pub use error::{CompositionError, CompositionResult};
pub use registry::{
    ModuleDescriptor, ModuleId, ModuleStatus, Requirement, ServiceRegistry, WebSocketListener,
};

//! Edge hub modules, one file per construction step.
//!
//! Each module is built from explicit inputs taken from the topology, the
//! service registry or modules constructed before it. Nothing reads
//! configuration directly at this stage.

pub mod amqp;
pub mod core_services;
pub mod http;
pub mod logging;
pub mod mqtt;
pub mod routing;

pub use amqp::AmqpModule;
pub use core_services::{CoreModule, ProductInfo};
pub use http::HttpModule;
pub use logging::LoggingModule;
pub use mqtt::{MqttModule, MqttSettings};
pub use routing::{DispatchError, RoutedMessage, RouterHandle, RoutingModule, RoutingSettings};

/// Path every WebSocket protocol head is served under.
pub const WEBSOCKET_PATH: &str = "/$iothub/websocket";

//! # Module Container
//!
//! Runtime configuration, the module composer and the composed runtime.
//!
//! - Modules constructed in dependency order (Logging → HTTP)
//! - Shared values handed over as `Arc`s, never copied
//! - Composition either completes or fails as a whole

pub mod composer;
pub mod config;
pub mod runtime;

pub use composer::ModuleComposer;
pub use config::{RuntimeConfig, DEFAULT_CONFIG_FILE};
pub use runtime::EdgeHubRuntime;

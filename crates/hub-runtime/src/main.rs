//! # Edge Hub
//!
//! Entry point of the edge hub gateway.
//!
//! ## Startup Sequence
//!
//! 1. Load runtime configuration from the environment
//! 2. Layer the settings file (if any) under the `EDGEHUB_` environment
//! 3. Resolve the topology (identity, store-and-forward, certificate, ...)
//! 4. Compose modules: Logging → Core → Routing → MQTT → AMQP → HTTP
//! 5. Start background tasks and wait for Ctrl+C
//!
//! Any error in steps 2-4 aborts before a listener starts.

use anyhow::{Context, Result};
use tracing::info;

use hub_runtime::{EdgeHubRuntime, RuntimeConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let config = RuntimeConfig::from_env().context("Invalid edge hub runtime settings")?;

    let provider = config
        .provider()
        .context("Failed to load edge hub settings")?;
    let runtime = EdgeHubRuntime::bootstrap(&config, &provider)
        .context("Edge hub startup failed")?;

    if let Some(file) = &config.config_file {
        info!("Settings file: {}", file.display());
    }
    runtime.registry().print_status();
    runtime.start().await;

    info!("Edge hub is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    runtime.shutdown(config.shutdown_grace).await;

    Ok(())
}

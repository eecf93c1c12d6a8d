//! # Reactive Registry
//!
//! Entry point: telemetry, configuration, runtime, then wait for Ctrl+C.

use anyhow::{Context, Result};
use registry_runtime::container::RuntimeConfig;
use registry_runtime::RegistryRuntime;
use registry_telemetry::{init_logging, TelemetryConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let telemetry = TelemetryConfig::from_env();
    let _guard = init_logging(&telemetry).context("Failed to initialize logging")?;

    let config = RuntimeConfig::from_env().context("Invalid configuration")?;

    let mut runtime = RegistryRuntime::new(config);
    if let Err(e) = runtime.start().await {
        error!(error = %format!("{e:#}"), "Registry failed to start");
        return Err(e);
    }

    info!("Registry is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl+C")?;

    runtime.shutdown().await;
    Ok(())
}

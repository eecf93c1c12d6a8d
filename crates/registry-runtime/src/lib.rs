//! # Reactive Registry Runtime
//!
//! Startup and shutdown of the registry process.
//!
//! ## Modular Structure
//!
//! - `container/` - Configuration and service wiring
//! - `handlers/` - Event bus consumers
//!
//! ## Startup Sequence
//!
//! 1. Load configuration from the environment
//! 2. Build the store, bus and registry service
//! 3. Bulk load definitions and groups (fatal on any violation)
//! 4. Start event handlers
//! 5. Bind the REST API
//!
//! The catalog is loaded before the listener binds, so no request ever
//! sees a partially loaded catalog.

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod container;
pub mod handlers;

use anyhow::{Context, Result};
use registry_api::ApiService;
use registry_bus::EventFilter;
use std::net::SocketAddr;
use tokio::task::JoinHandle;
use tracing::info;

use crate::container::{RegistryContainer, RuntimeConfig};
use crate::handlers::EventLogHandler;

/// The registry process: container, event handlers and API server.
pub struct RegistryRuntime {
    container: RegistryContainer,
    api: Option<ApiService>,
    handlers: Vec<JoinHandle<u64>>,
}

impl RegistryRuntime {
    pub fn new(config: RuntimeConfig) -> Self {
        info!("Creating reactive registry runtime");
        Self {
            container: RegistryContainer::new(config),
            api: None,
            handlers: Vec::new(),
        }
    }

    /// Load the catalog, start handlers and bind the API.
    ///
    /// Returns the address the API is listening on.
    pub async fn start(&mut self) -> Result<SocketAddr> {
        info!("===========================================");
        info!("  Reactive Registry v{}", env!("CARGO_PKG_VERSION"));
        info!("===========================================");

        // Subscribe first so the catalog load is logged too
        let handler = EventLogHandler::new(self.container.bus().event_stream(EventFilter::all()));
        self.handlers.push(tokio::spawn(handler.run()));

        let documents = self.container.config.documents_path.display().to_string();
        let summary = self
            .container
            .load_catalog()
            .await
            .with_context(|| format!("Failed to load catalog from {documents}"))?;
        info!(
            definitions = summary.definitions,
            groups = summary.groups,
            documents = %documents,
            "Catalog loaded"
        );

        let mut api = ApiService::new(
            self.container.config.api.clone(),
            self.container.registry_api(),
        )
        .context("Failed to configure API")?;
        let addr = api.start().await.context("Failed to start API")?;
        self.api = Some(api);

        info!(addr = %addr, "Registry is running");
        Ok(addr)
    }

    /// Stop the API, then wait for handlers to drain.
    pub async fn shutdown(mut self) {
        info!("Initiating graceful shutdown...");
        if let Some(mut api) = self.api.take() {
            api.shutdown().await;
        }

        // Handlers end once the last bus sender is gone
        let handlers = std::mem::take(&mut self.handlers);
        drop(self.container);
        for handle in handlers {
            match handle.await {
                Ok(logged) => info!(logged, "Event handler finished"),
                Err(e) => tracing::error!(error = %e, "Event handler failed"),
            }
        }
        info!("Shutdown complete");
    }

    pub fn container(&self) -> &RegistryContainer {
        &self.container
    }
}

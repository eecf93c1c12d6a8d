//! # Registry Container
//!
//! Wires the registry service to its adapters:
//!
//! ```text
//! InMemoryRecordStore ─┐
//! SystemTimeSource ────┼──→ RegistryService ──→ Arc<dyn RegistryApi> ──→ API
//! InMemoryEventBus ────┘           │
//!        ↑                         │ publish_change
//!        └─────────────────────────┘
//! ```

pub mod config;

pub use config::{ConfigError, RuntimeConfig};

use registry_bus::InMemoryEventBus;
use registry_core::{
    read_documents, CatalogSummary, InMemoryRecordStore, RegistryApi, RegistryDependencies,
    RegistryError, RegistryService, SystemTimeSource,
};
use std::sync::Arc;
use tracing::info;

/// The concrete registry service assembled by the runtime.
pub type Registry = RegistryService<InMemoryRecordStore, SystemTimeSource, Arc<InMemoryEventBus>>;

/// Holds the initialized services.
pub struct RegistryContainer {
    /// Runtime configuration.
    pub config: RuntimeConfig,
    bus: Arc<InMemoryEventBus>,
    registry: Arc<Registry>,
}

impl RegistryContainer {
    /// Create the store, bus and registry service.
    pub fn new(config: RuntimeConfig) -> Self {
        let bus = Arc::new(InMemoryEventBus::with_capacity(config.bus_capacity));
        let registry = Arc::new(RegistryService::new(
            RegistryDependencies {
                store: InMemoryRecordStore::new(),
                time_source: SystemTimeSource,
                events: Arc::clone(&bus),
            },
            config.registry.clone(),
        ));

        info!(
            bus_capacity = bus.capacity(),
            store_timeout_ms = config.registry.store_timeout.as_millis() as u64,
            "Registry container initialized"
        );

        Self {
            config,
            bus,
            registry,
        }
    }

    /// Read the catalog documents and replace the stored catalog.
    pub async fn load_catalog(&self) -> Result<CatalogSummary, RegistryError> {
        let documents = read_documents(&self.config.documents_path).await?;
        self.registry.load_catalog(&documents).await
    }

    pub fn bus(&self) -> Arc<InMemoryEventBus> {
        Arc::clone(&self.bus)
    }

    /// The registry behind its inbound port.
    pub fn registry_api(&self) -> Arc<dyn RegistryApi> {
        Arc::clone(&self.registry) as Arc<dyn RegistryApi>
    }
}

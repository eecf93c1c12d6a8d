//! # Registry Core
//!
//! Catalog of Definitions, Groups and Reactive Entities, and the validation
//! and conversion pipeline between their two representations:
//!
//! - **Human form**: names and hex strings, as written in the catalog
//!   documents and exchanged over the API.
//! - **Storage form**: record identifiers and numeric hex values, as held by
//!   the [`RecordStore`](ports::RecordStore).
//!
//! ## Control Flow
//!
//! ```text
//! definitions.json ──→ validate_definitions ──→ store ──┐
//!                                                       ↓ resolve names
//! groups.json ───────→ validate_groups ──────────────→ store
//!                                                       ↓ resolve names
//! POST entity ──────→ RegistryService::create_entity → store
//! ```
//!
//! ## Resolution Policy
//!
//! | Path | Unresolved reference |
//! |------|----------------------|
//! | Catalog load | rejects the whole batch |
//! | Entity creation | rejected before anything is written |
//! | Reads (storage to human) | blank name, logged at `warn` |
//!
//! ## Hexagonal Architecture
//!
//! - **Domain Layer** (`domain/`): record types, hex codec, validation, conversion
//! - **Ports Layer** (`ports/`): [`RegistryApi`](ports::RegistryApi) inbound,
//!   store/clock/event sink outbound
//! - **Adapters Layer** (`adapters/`): in-memory record store
//! - **Service Layer** (`service/`): [`RegistryService`](service::RegistryService)

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod adapters;
pub mod domain;
pub mod loader;
pub mod ports;
pub mod service;

pub use adapters::InMemoryRecordStore;
pub use domain::*;
pub use loader::{load_catalog, read_documents, CatalogDocuments, CatalogSummary};
pub use ports::*;
pub use service::{RegistryDependencies, RegistryService};

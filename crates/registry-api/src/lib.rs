//! # Registry API
//!
//! REST interface over [`RegistryApi`](registry_core::RegistryApi).
//!
//! ```text
//! ┌──────────┐    ┌──────────────────────────────┐    ┌─────────────────┐
//! │  Client  │ ─→ │ Trace → Timeout → CORS       │ ─→ │ RegistryService │
//! └──────────┘    │ axum Router (router.rs)      │    └─────────────────┘
//!                 └──────────────────────────────┘
//! ```
//!
//! Registry errors map onto HTTP status codes in [`domain::error`]; every
//! error response carries `{"error": {"kind", "message"}}`.
//!
//! # Usage
//!
//! ```ignore
//! use registry_api::{ApiConfig, ApiService};
//!
//! let mut api = ApiService::new(ApiConfig::default(), registry)?;
//! api.start().await?;
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod domain;
pub mod middleware;
pub mod router;
pub mod service;

pub use domain::{ApiConfig, ApiError, ConfigError};
pub use router::{build_router, AppState, StateChange};
pub use service::{ApiService, ApiServiceError};

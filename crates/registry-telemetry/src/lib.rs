//! # Registry Telemetry
//!
//! Structured logging for the registry processes.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use registry_telemetry::{init_logging, TelemetryConfig};
//!
//! let config = TelemetryConfig::from_env();
//! let _guard = init_logging(&config)?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `REGISTRY_SERVICE_NAME` | `reactive-registry` | Service name in logs |
//! | `REGISTRY_LOG_LEVEL` / `RUST_LOG` | `info` | Log filter |
//! | `REGISTRY_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `REGISTRY_JSON_LOGS` | `true` in containers | JSON formatted output |

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::{build_filter, init_logging, LoggingGuard};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to install tracing subscriber: {0}")]
    SubscriberInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

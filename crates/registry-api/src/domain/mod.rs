//! API domain types: configuration and errors.

pub mod config;
pub mod error;

pub use config::{ApiConfig, ConfigError, DEFAULT_BIND_ADDRESS, DEFAULT_REQUEST_TIMEOUT};
pub use error::{status_for, ApiError, ErrorBody, ErrorDetail};

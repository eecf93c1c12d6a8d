//! API server configuration with validation.

use axum::http::HeaderValue;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Default listen address.
pub const DEFAULT_BIND_ADDRESS: SocketAddr =
    SocketAddr::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)), 8080);

/// Default per-request deadline.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Main API configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Address the HTTP listener binds to
    pub bind_address: SocketAddr,
    /// Deadline for a whole request, store calls included
    pub request_timeout: Duration,
    /// Origins allowed by CORS. Empty allows any origin.
    pub allowed_origins: Vec<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            allowed_origins: Vec::new(),
        }
    }
}

impl ApiConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "request_timeout cannot be 0".into(),
            ));
        }

        if let Some(origin) = self
            .allowed_origins
            .iter()
            .find(|origin| origin.trim().is_empty() || origin.parse::<HeaderValue>().is_err())
        {
            return Err(ConfigError::InvalidOrigin(format!("{origin:?}")));
        }

        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Invalid timeout value
    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),
    /// Blank or unparsable CORS origin
    #[error("invalid CORS origin: {0}")]
    InvalidOrigin(String),
}

//! # Runtime Configuration
//!
//! Everything the runtime needs, read once from the environment at startup.
//! Unset variables fall back to defaults; set but unparsable ones are an
//! error rather than silently ignored.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `DOCUMENTS_PATH` | `./documents` |
//! | `SERVER_ADDRESS` | `127.0.0.1:8080` |
//! | `REGISTRY_STORE_TIMEOUT_MS` | `5000` |
//! | `REGISTRY_REQUEST_TIMEOUT_MS` | `10000` |
//! | `REGISTRY_BUS_CAPACITY` | `1000` |

use registry_api::ApiConfig;
use registry_bus::DEFAULT_CHANNEL_CAPACITY;
use registry_core::RegistryConfig;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_DOCUMENTS_PATH: &str = "./documents";

/// Complete runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Directory holding `definitions.json` and `groups.json`.
    pub documents_path: PathBuf,
    /// REST API configuration.
    pub api: ApiConfig,
    /// Registry service configuration.
    pub registry: RegistryConfig,
    /// Event bus buffer per subscriber.
    pub bus_capacity: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            documents_path: PathBuf::from(DEFAULT_DOCUMENTS_PATH),
            api: ApiConfig::default(),
            registry: RegistryConfig::default(),
            bus_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup("DOCUMENTS_PATH") {
            config.documents_path = PathBuf::from(path);
        }
        if let Some(addr) = parse_var(&lookup, "SERVER_ADDRESS")? {
            config.api.bind_address = addr;
        }
        if let Some(ms) = parse_var::<u64, _>(&lookup, "REGISTRY_STORE_TIMEOUT_MS")? {
            config.registry.store_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_var::<u64, _>(&lookup, "REGISTRY_REQUEST_TIMEOUT_MS")? {
            config.api.request_timeout = Duration::from_millis(ms);
        }
        if let Some(capacity) = parse_var(&lookup, "REGISTRY_BUS_CAPACITY")? {
            config.bus_capacity = capacity;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration before use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.registry.store_timeout.is_zero() {
            return Err(ConfigError::Invalid(
                "REGISTRY_STORE_TIMEOUT_MS must be greater than 0".into(),
            ));
        }
        if self.bus_capacity == 0 {
            return Err(ConfigError::Invalid(
                "REGISTRY_BUS_CAPACITY must be greater than 0".into(),
            ));
        }
        self.api
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}

fn parse_var<T, F>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    lookup(var)
        .map(|value| {
            value.trim().parse().map_err(|e: T::Err| ConfigError::Parse {
                var,
                value: value.clone(),
                reason: e.to_string(),
            })
        })
        .transpose()
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A variable is set but does not parse.
    #[error("{var}={value:?} is invalid: {reason}")]
    Parse {
        var: &'static str,
        value: String,
        reason: String,
    },

    /// Values parse but are unusable together.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

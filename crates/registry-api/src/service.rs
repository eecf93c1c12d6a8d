//! API service: binds the listener and serves the router until shutdown.

use crate::domain::config::ApiConfig;
use crate::router::{build_router, AppState};
use registry_core::RegistryApi;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// API service errors
#[derive(Debug, thiserror::Error)]
pub enum ApiServiceError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Server socket bind error
    #[error("server bind error: {0}")]
    Bind(String),

    /// `start` called twice
    #[error("API server already running")]
    AlreadyRunning,
}

/// HTTP front end of the registry.
pub struct ApiService {
    config: ApiConfig,
    registry: Arc<dyn RegistryApi>,
    local_addr: Option<SocketAddr>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    server: Option<JoinHandle<()>>,
}

impl ApiService {
    /// Create a new API service
    pub fn new(config: ApiConfig, registry: Arc<dyn RegistryApi>) -> Result<Self, ApiServiceError> {
        config
            .validate()
            .map_err(|e| ApiServiceError::Config(e.to_string()))?;

        Ok(Self {
            config,
            registry,
            local_addr: None,
            shutdown_tx: None,
            server: None,
        })
    }

    /// Bind the listener and start serving in the background.
    ///
    /// Returns the bound address, which differs from the configured one when
    /// port `0` was requested.
    pub async fn start(&mut self) -> Result<SocketAddr, ApiServiceError> {
        if self.server.is_some() {
            return Err(ApiServiceError::AlreadyRunning);
        }

        let listener = TcpListener::bind(self.config.bind_address)
            .await
            .map_err(|e| ApiServiceError::Bind(format!("{}: {e}", self.config.bind_address)))?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| ApiServiceError::Bind(e.to_string()))?;

        let router = build_router(AppState::new(Arc::clone(&self.registry)), &self.config);
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        info!(addr = %local_addr, "Starting API server");
        let server = tokio::spawn(async move {
            let result = axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                    info!("Received shutdown signal");
                })
                .await;
            if let Err(e) = result {
                error!(error = %e, "API server error");
            }
        });

        self.local_addr = Some(local_addr);
        self.shutdown_tx = Some(shutdown_tx);
        self.server = Some(server);
        Ok(local_addr)
    }

    /// Address the server is listening on, once started.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Trigger graceful shutdown and wait for in-flight requests.
    pub async fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(server) = self.server.take() {
            if let Err(e) = server.await {
                error!(error = %e, "API server task failed");
            }
        }
        info!("API server stopped");
    }
}

//! # Store Runtime
//!
//! Owns the container, the choreography handlers and the HTTP gateway for the
//! lifetime of the process.
//!
//! ## Startup Sequence
//!
//! 1. Build the container (validates configuration, connects adapters)
//! 2. Subscribe and spawn event handlers
//! 3. Serve HTTP until the shutdown signal resolves
//!
//! ## Shutdown Sequence
//!
//! 1. Flip the shutdown channel: the gateway stops accepting connections
//! 2. Drain in-flight requests for the configured grace period
//! 3. Join handlers, aborting any that do not stop within [`HANDLER_DRAIN`]

use crate::container::{ContainerError, StoreConfig, SubsystemContainer};
use crate::wiring::start_handlers;
use au_09_api_gateway::{ApiGatewayService, GatewayError};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::info;

/// How long handlers get to finish after shutdown was signalled.
pub const HANDLER_DRAIN: Duration = Duration::from_secs(2);

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Container(#[from] ContainerError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// The main store runtime orchestrating all subsystems.
pub struct StoreRuntime {
    container: Arc<SubsystemContainer>,
    gateway: ApiGatewayService,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl StoreRuntime {
    /// Build every subsystem from `config`.
    pub fn new(config: StoreConfig) -> Result<Self, RuntimeError> {
        info!(store = %config.store.name, "[store] Creating store runtime");
        Self::from_container(SubsystemContainer::new(config)?)
    }

    /// Wrap an already-built container.
    pub fn from_container(container: SubsystemContainer) -> Result<Self, RuntimeError> {
        let gateway = ApiGatewayService::new(container.config.gateway(), container.app_state())?;
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Ok(Self {
            container: Arc::new(container),
            gateway,
            shutdown_tx,
            shutdown_rx,
        })
    }

    pub fn container(&self) -> Arc<SubsystemContainer> {
        Arc::clone(&self.container)
    }

    pub fn gateway(&self) -> &ApiGatewayService {
        &self.gateway
    }

    /// Bind the configured address and serve until `signal` resolves.
    pub async fn run<F>(&self, signal: F) -> Result<(), RuntimeError>
    where
        F: Future<Output = ()>,
    {
        let listener = self.gateway.bind().await?;
        self.serve(listener, signal).await
    }

    /// Serve on `listener` until `signal` resolves or the server fails.
    pub async fn serve<F>(&self, listener: TcpListener, signal: F) -> Result<(), RuntimeError>
    where
        F: Future<Output = ()>,
    {
        let handlers = start_handlers(&self.container, self.shutdown_rx.clone());

        let server = self.gateway.serve(listener, self.shutdown_rx.clone());
        tokio::pin!(server);
        info!("[store] Store is running");

        let result = tokio::select! {
            result = &mut server => result,
            () = signal => {
                info!("[store] Initiating graceful shutdown");
                self.shutdown();
                server.await
            }
        };

        self.shutdown();
        handlers.join(HANDLER_DRAIN).await;
        info!("[store] Shutdown complete");
        result.map_err(RuntimeError::from)
    }

    /// Signal every task to stop. Idempotent.
    pub fn shutdown(&self) {
        self.shutdown_tx.send_replace(true);
    }
}

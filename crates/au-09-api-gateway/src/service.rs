//! API Gateway service: owns the router and the HTTP server lifecycle.

use crate::domain::config::GatewayConfig;
use crate::domain::error::GatewayError;
use crate::middleware::{cleanup_task, GatewayMetrics, RateLimitState};
use crate::router::build_router;
use crate::state::AppState;
use axum::Router;
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{info, warn};

/// API Gateway service state
pub struct ApiGatewayService {
    config: GatewayConfig,
    state: AppState,
    rate_limit: Arc<RateLimitState>,
}

impl ApiGatewayService {
    /// Create a new API Gateway service. Fails on invalid configuration.
    pub fn new(config: GatewayConfig, state: AppState) -> Result<Self, GatewayError> {
        config.validate()?;
        if config.admin.api_key.is_none() {
            warn!("[au-09] No admin API key configured, back-office is locked");
        }

        let rate_limit = Arc::new(RateLimitState::new(config.rate_limit.clone()));
        Ok(Self {
            config,
            state,
            rate_limit,
        })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Get metrics
    pub fn metrics(&self) -> Arc<GatewayMetrics> {
        Arc::clone(&self.state.metrics)
    }

    pub fn rate_limit_state(&self) -> Arc<RateLimitState> {
        Arc::clone(&self.rate_limit)
    }

    /// The full router, middleware included.
    pub fn router(&self) -> Router {
        build_router(
            self.state.clone(),
            &self.config,
            Arc::clone(&self.rate_limit),
        )
    }

    /// Bind the configured HTTP address.
    pub async fn bind(&self) -> Result<TcpListener, GatewayError> {
        let addr = self.config.http_addr();
        TcpListener::bind(addr)
            .await
            .map_err(|source| GatewayError::Bind { addr, source })
    }

    /// Serve on `listener` until `shutdown` flips to true, then drain
    /// in-flight requests for at most the configured grace period.
    pub async fn serve(
        &self,
        listener: TcpListener,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<(), GatewayError> {
        let addr = listener.local_addr()?;
        info!(addr = %addr, "[au-09] Starting HTTP server");

        let cleanup = tokio::spawn(cleanup_task(self.rate_limit_state(), shutdown.clone()));

        let grace = self.config.http.shutdown_grace;
        let mut drain_signal = shutdown.clone();
        let server = axum::serve(
            listener,
            self.router()
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            wait_for_shutdown(&mut drain_signal).await;
            info!("[au-09] Shutdown requested, draining connections");
        })
        .into_future();

        let result = tokio::select! {
            result = server => result.map_err(GatewayError::from),
            () = async {
                wait_for_shutdown(&mut shutdown).await;
                tokio::time::sleep(grace).await;
            } => {
                warn!(grace_secs = grace.as_secs(), "[au-09] Grace period elapsed, closing remaining connections");
                Ok(())
            }
        };

        cleanup.abort();
        info!("[au-09] HTTP server stopped");
        result
    }
}

async fn wait_for_shutdown(shutdown: &mut watch::Receiver<bool>) {
    while !*shutdown.borrow() {
        if shutdown.changed().await.is_err() {
            return;
        }
    }
}

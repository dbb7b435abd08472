//! # au-09-api-gateway
//!
//! The store's only HTTP surface: storefront, back-office and payment
//! webhooks on one port.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      API GATEWAY (au-09)                        │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  CORS → Tracing → Metrics → Timeout → BodyLimit → RateLimit     │
//! │                              │                                  │
//! │     ┌────────────────────────┼──────────────────────┐           │
//! │     ▼                        ▼                      ▼           │
//! │  /api/*               /api/webhooks/*        /api/admin/*       │
//! │  storefront           signature checked      Auth (API key)     │
//! └─────────────────────────────────────────────────────────────────┘
//!        │                     │                      │
//!   catalog, cart,       reconciliation         every subsystem
//!   checkout, reviews,
//!   newsletter
//! ```
//!
//! Handlers talk to subsystems only through their inbound ports, held in
//! [`AppState`]. Every error leaves as the JSON envelope described in
//! [`domain::error`].
//!
//! # Usage
//!
//! ```ignore
//! use au_09_api_gateway::{ApiGatewayService, GatewayConfig};
//!
//! let service = ApiGatewayService::new(GatewayConfig::default(), state)?;
//! let listener = service.bind().await?;
//! service.serve(listener, shutdown_rx).await?;
//! ```

#![warn(clippy::all)]
#![deny(unsafe_code)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod domain;
pub mod middleware;
pub mod router;
pub mod routes;
pub mod service;
pub mod state;

#[cfg(test)]
mod test_support;

pub use domain::config::{
    AdminConfig, CorsConfig, GatewayConfig, HttpConfig, LimitsConfig, RateLimitConfig,
    TimeoutConfig,
};
pub use domain::error::{ApiError, ApiResult, GatewayError};
pub use middleware::{GatewayMetrics, RateLimitState};
pub use router::build_router;
pub use service::ApiGatewayService;
pub use state::AppState;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! HTTP handlers, grouped by audience.

pub mod admin;
pub mod extract;
pub mod storefront;
pub mod webhooks;

use axum::{response::IntoResponse, Json};

/// Liveness probe. Exempt from rate limiting.
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "aurelia-store",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

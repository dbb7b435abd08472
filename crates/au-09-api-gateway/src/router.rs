//! Route table and middleware stack.

use crate::domain::config::GatewayConfig;
use crate::middleware::{
    create_cors_layer, AuthConfig, AuthLayer, BodyLimitLayer, MetricsLayer, RateLimitLayer,
    RateLimitState, TimeoutLayer, TracingLayer,
};
use crate::routes::{admin, health_check, storefront, webhooks};
use crate::state::AppState;
use axum::{
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;

/// Build the complete HTTP router.
///
/// `rate_limit` is passed in so the caller can run its cleanup task against
/// the same buckets.
pub fn build_router(
    state: AppState,
    config: &GatewayConfig,
    rate_limit: Arc<RateLimitState>,
) -> Router {
    let middleware = ServiceBuilder::new()
        .layer(create_cors_layer(&config.cors))
        .layer(TracingLayer::new())
        .layer(MetricsLayer::new(Arc::clone(&state.metrics)))
        .layer(TimeoutLayer::new(config.timeouts.clone()))
        .layer(BodyLimitLayer::new(config.limits.clone()))
        .layer(RateLimitLayer::new(rate_limit, Arc::clone(&state.metrics)));

    let admin = admin_router().route_layer(AuthLayer::new(AuthConfig {
        api_key: config.admin.api_key.clone(),
    }));

    Router::new()
        .route("/health", get(health_check))
        .merge(storefront_router())
        .route("/api/webhooks/payments", post(webhooks::payment_webhook))
        .nest("/api/admin", admin)
        .fallback(storefront::not_found)
        .layer(middleware)
        .with_state(state)
}

fn storefront_router() -> Router<AppState> {
    Router::new()
        .route("/api/products", get(storefront::list_products))
        .route("/api/products/:product", get(storefront::get_product))
        .route(
            "/api/products/:product/reviews",
            get(storefront::list_reviews).post(storefront::submit_review),
        )
        .route("/api/categories", get(storefront::list_categories))
        .route("/api/collections", get(storefront::list_collections))
        .route("/api/collections/:slug", get(storefront::get_collection))
        .route("/api/cart/quote", post(storefront::quote))
        .route("/api/checkout", post(storefront::checkout))
        .route("/api/orders/lookup", get(storefront::lookup_order))
        .route("/api/newsletter/subscribe", post(storefront::subscribe))
        .route("/api/newsletter/unsubscribe", post(storefront::unsubscribe))
}

fn admin_router() -> Router<AppState> {
    let router = Router::new()
        // catalog
        .route(
            "/products",
            get(admin::list_products).post(admin::create_product),
        )
        .route(
            "/products/:id",
            get(admin::get_product)
                .patch(admin::update_product)
                .delete(admin::delete_product),
        )
        .route(
            "/categories",
            get(admin::list_categories).post(admin::create_category),
        )
        .route(
            "/categories/:id",
            patch(admin::update_category).delete(admin::delete_category),
        )
        .route(
            "/collections",
            get(admin::list_collections).post(admin::create_collection),
        )
        .route(
            "/collections/:id",
            patch(admin::update_collection).delete(admin::delete_collection),
        )
        .route(
            "/collections/:id/products/:product_id",
            post(admin::add_to_collection).delete(admin::remove_from_collection),
        )
        // inventory
        .route("/stock/low", get(admin::low_stock))
        .route("/stock/movements", post(admin::record_movement))
        .route("/stock/:product_id", get(admin::stock_level))
        .route("/stock/:product_id/movements", get(admin::movements))
        .route("/stock/:product_id/recompute", post(admin::recompute))
        // orders
        .route("/orders", get(admin::list_orders))
        .route("/orders/:id", get(admin::get_order))
        .route("/orders/:id/status", post(admin::change_status))
        .route("/orders/:id/refund", post(admin::refund_order))
        // moderation
        .route("/reviews/pending", get(admin::pending_reviews))
        .route("/reviews/:id/approve", post(admin::approve_review))
        .route("/reviews/:id/reject", post(admin::reject_review))
        .route("/newsletter/subscribers", get(admin::list_subscribers))
        .route("/metrics", get(admin::metrics));

    #[cfg(feature = "metrics")]
    let router = router.route("/metrics/prometheus", get(admin::prometheus_metrics));

    router
}

#[cfg(test)]
mod tests;

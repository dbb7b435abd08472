//! Shared handler state.

use crate::middleware::GatewayMetrics;
use au_01_catalog::CatalogApi;
use au_02_inventory::InventoryApi;
use au_04_orders::OrderApi;
use au_05_payments::{CheckoutApi, RefundApi, WebhookApi};
use au_07_newsletter::NewsletterApi;
use au_08_reviews::ReviewApi;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogApi>,
    pub inventory: Arc<dyn InventoryApi>,
    pub orders: Arc<dyn OrderApi>,
    pub checkout: Arc<dyn CheckoutApi>,
    pub webhooks: Arc<dyn WebhookApi>,
    pub refunds: Arc<dyn RefundApi>,
    pub newsletter: Arc<dyn NewsletterApi>,
    pub reviews: Arc<dyn ReviewApi>,
    pub metrics: Arc<GatewayMetrics>,
}

//! In-memory subsystem wiring shared by the gateway's tests.

use crate::middleware::GatewayMetrics;
use crate::state::AppState;
use async_trait::async_trait;
use au_01_catalog::{CatalogApi, CatalogService, InMemoryCatalogRepository, Product};
use au_02_inventory::{
    FixedThreshold, InMemoryLedgerRepository, InventoryApi, InventoryConfig, InventoryService,
};
use au_04_orders::{InMemoryOrderRepository, OrderApi, OrderService};
use au_05_payments::{
    CatalogReader, CheckoutConfig, CheckoutService, FakePaymentProcessor, PaymentError,
    PaymentResult, ReconciliationConfig, ReconciliationService, RefundService, StockReader,
};
use au_07_newsletter::{InMemorySubscriberRepository, NewsletterService};
use au_08_reviews::{InMemoryReviewRepository, ReviewService};
use shared_bus::InMemoryEventBus;
use shared_types::{ProductId, ProductSnapshot};
use std::collections::HashMap;
use std::sync::Arc;

pub(crate) const WEBHOOK_SECRET: &str = "whsec_gateway_test";

struct CatalogBridge(Arc<dyn CatalogApi>);

#[async_trait]
impl CatalogReader for CatalogBridge {
    async fn products_by_ids(&self, ids: &[ProductId]) -> PaymentResult<Vec<ProductSnapshot>> {
        let products = self
            .0
            .products_by_ids(ids)
            .await
            .map_err(|e| PaymentError::Lookup(e.to_string()))?;
        Ok(products.iter().map(Product::snapshot).collect())
    }
}

struct StockBridge(Arc<dyn InventoryApi>);

#[async_trait]
impl StockReader for StockBridge {
    async fn levels(&self, ids: &[ProductId]) -> PaymentResult<HashMap<ProductId, i64>> {
        let levels = self
            .0
            .stock_levels(ids)
            .await
            .map_err(|e| PaymentError::Lookup(e.to_string()))?;
        Ok(levels.into_iter().map(|l| (l.product_id, l.level)).collect())
    }
}

/// Every subsystem on in-memory adapters, plus handles the tests poke at.
pub(crate) struct Services {
    pub state: AppState,
    pub catalog: Arc<dyn CatalogApi>,
    pub inventory: Arc<dyn InventoryApi>,
    pub orders: Arc<dyn OrderApi>,
    pub processor: Arc<FakePaymentProcessor>,
    pub metrics: Arc<GatewayMetrics>,
    pub bus: Arc<InMemoryEventBus>,
}

impl Services {
    pub fn new() -> Self {
        let bus = Arc::new(InMemoryEventBus::new());
        let catalog: Arc<dyn CatalogApi> = Arc::new(CatalogService::new(Arc::new(
            InMemoryCatalogRepository::new(),
        )));
        let inventory: Arc<dyn InventoryApi> = Arc::new(InventoryService::new(
            InventoryConfig::default(),
            Arc::new(InMemoryLedgerRepository::new()),
            Arc::new(FixedThreshold(3)),
            bus.clone(),
        ));
        let orders: Arc<dyn OrderApi> = Arc::new(OrderService::new(
            Arc::new(InMemoryOrderRepository::new()),
            bus.clone(),
        ));
        let processor = Arc::new(FakePaymentProcessor::new());
        let metrics = Arc::new(GatewayMetrics::new());

        let state = AppState {
            catalog: catalog.clone(),
            inventory: inventory.clone(),
            orders: orders.clone(),
            checkout: Arc::new(CheckoutService::new(
                CheckoutConfig::default(),
                Arc::new(CatalogBridge(catalog.clone())),
                Arc::new(StockBridge(inventory.clone())),
                orders.clone(),
                processor.clone(),
            )),
            webhooks: Arc::new(ReconciliationService::new(
                ReconciliationConfig {
                    webhook_secret: WEBHOOK_SECRET.to_string(),
                    ..ReconciliationConfig::default()
                },
                orders.clone(),
                bus.clone(),
            )),
            refunds: Arc::new(RefundService::new(orders.clone(), processor.clone())),
            newsletter: Arc::new(NewsletterService::new(
                Arc::new(InMemorySubscriberRepository::new()),
                bus.clone(),
            )),
            reviews: Arc::new(ReviewService::new(
                Arc::new(InMemoryReviewRepository::new()),
                bus.clone(),
            )),
            metrics: metrics.clone(),
        };

        Self {
            state,
            catalog,
            inventory,
            orders,
            processor,
            metrics,
            bus,
        }
    }
}

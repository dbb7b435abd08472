//! Keeps `Product::stock` in step with the ledger so listings can show
//! availability without asking inventory.

use au_01_catalog::{CatalogApi, CatalogError};
use shared_bus::{StoreEvent, Subscription};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Handler for `StockChanged`.
pub struct CatalogProjectionHandler {
    subscription: Subscription,
    catalog: Arc<dyn CatalogApi>,
}

impl CatalogProjectionHandler {
    pub fn new(subscription: Subscription, catalog: Arc<dyn CatalogApi>) -> Self {
        Self {
            subscription,
            catalog,
        }
    }

    /// Returns true when the projection was written.
    pub async fn handle(&self, event: &StoreEvent) -> bool {
        let StoreEvent::StockChanged { product_id, level } = event else {
            return false;
        };
        match self.catalog.set_product_stock(*product_id, *level).await {
            Ok(()) => {
                debug!(product_id = %product_id, level, "[au-01] Stock projection updated");
                true
            }
            // Movements can outlive a hard-deleted product.
            Err(CatalogError::ProductNotFound(_)) => {
                debug!(product_id = %product_id, "[au-01] Stock change for unknown product");
                false
            }
            Err(e) => {
                warn!(product_id = %product_id, error = %e, "[au-01] Stock projection failed");
                false
            }
        }
    }

    /// Run the handler loop until the bus closes.
    pub async fn run(mut self) {
        info!("[au-01] Catalog projection handler started");
        while let Some(event) = self.subscription.recv().await {
            self.handle(&event).await;
        }
        info!("[au-01] Event bus closed, exiting");
    }
}

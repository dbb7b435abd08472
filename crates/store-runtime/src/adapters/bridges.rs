//! # Subsystem Bridges
//!
//! Outbound ports one subsystem declares and another subsystem's inbound API
//! satisfies. The runtime is the only place that knows both sides.
//!
//! | Port | Declared by | Backed by |
//! |------|-------------|-----------|
//! | `CatalogReader` | payments (5) | catalog (1) |
//! | `StockReader` | payments (5) | inventory (2) |
//! | `StockThresholds` | inventory (2) | catalog (1) |
//! | `ProductDirectory` | notifications (6) | catalog (1) |

use async_trait::async_trait;
use au_01_catalog::{CatalogApi, Product, Visibility};
use au_02_inventory::{InventoryApi, StockThresholds};
use au_05_payments::{CatalogReader, PaymentError, PaymentResult, StockReader};
use au_06_notifications::ProductDirectory;
use shared_types::{ProductId, ProductSnapshot};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Checkout pricing reads products from the catalog.
pub struct CatalogReaderBridge {
    catalog: Arc<dyn CatalogApi>,
}

impl CatalogReaderBridge {
    pub fn new(catalog: Arc<dyn CatalogApi>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl CatalogReader for CatalogReaderBridge {
    async fn products_by_ids(&self, ids: &[ProductId]) -> PaymentResult<Vec<ProductSnapshot>> {
        let products = self
            .catalog
            .products_by_ids(ids)
            .await
            .map_err(|e| PaymentError::Lookup(e.to_string()))?;
        Ok(products.iter().map(Product::snapshot).collect())
    }
}

/// Checkout availability reads the ledger, not the catalog projection.
pub struct StockReaderBridge {
    inventory: Arc<dyn InventoryApi>,
}

impl StockReaderBridge {
    pub fn new(inventory: Arc<dyn InventoryApi>) -> Self {
        Self { inventory }
    }
}

#[async_trait]
impl StockReader for StockReaderBridge {
    async fn levels(&self, ids: &[ProductId]) -> PaymentResult<HashMap<ProductId, i64>> {
        let levels = self
            .inventory
            .stock_levels(ids)
            .await
            .map_err(|e| PaymentError::Lookup(e.to_string()))?;
        Ok(levels.into_iter().map(|l| (l.product_id, l.level)).collect())
    }
}

/// Per-product alert thresholds live on the product.
pub struct CatalogThresholds {
    catalog: Arc<dyn CatalogApi>,
}

impl CatalogThresholds {
    pub fn new(catalog: Arc<dyn CatalogApi>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl StockThresholds for CatalogThresholds {
    async fn low_stock_threshold(&self, product_id: ProductId) -> Option<i64> {
        match self.catalog.get_product(product_id, Visibility::Admin).await {
            Ok(product) => Some(product.low_stock_threshold),
            Err(e) => {
                debug!(product_id = %product_id, error = %e, "[store] No threshold from catalog");
                None
            }
        }
    }
}

/// Product names for alert emails.
pub struct CatalogDirectory {
    catalog: Arc<dyn CatalogApi>,
}

impl CatalogDirectory {
    pub fn new(catalog: Arc<dyn CatalogApi>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl ProductDirectory for CatalogDirectory {
    async fn product_name(&self, id: ProductId) -> Option<String> {
        self.catalog
            .get_product(id, Visibility::Admin)
            .await
            .ok()
            .map(|p| p.name)
    }
}

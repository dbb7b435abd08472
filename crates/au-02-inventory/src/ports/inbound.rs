//! Driving Ports (API - Inbound)

use crate::domain::{LedgerOutcome, NewMovement, RecomputeReport, StockLevel, StockMovement};
use crate::error::InventoryResult;
use async_trait::async_trait;
use shared_types::{OrderSummary, ProductId};

/// Primary Inventory API
#[async_trait]
pub trait InventoryApi: Send + Sync {
    /// Append a manual movement. Decrements that would go below zero are
    /// refused with `InsufficientStock`.
    async fn record_movement(&self, movement: NewMovement) -> InventoryResult<StockMovement>;

    /// One `Out`/`Sale` movement per product of a paid order.
    ///
    /// Idempotent per (order, product). Always recorded, even when the level
    /// goes negative, because payment has already been captured.
    async fn record_sale(&self, order: &OrderSummary) -> InventoryResult<LedgerOutcome>;

    /// One `In`/`Return` movement per product that was sold on this order.
    ///
    /// Idempotent per (order, product).
    async fn record_return(&self, order: &OrderSummary) -> InventoryResult<LedgerOutcome>;

    async fn stock_level(&self, product_id: ProductId) -> InventoryResult<i64>;

    /// One entry per requested id, 0 for products without movements.
    async fn stock_levels(&self, product_ids: &[ProductId]) -> InventoryResult<Vec<StockLevel>>;

    /// Newest first.
    async fn movements(
        &self,
        product_id: ProductId,
        limit: usize,
    ) -> InventoryResult<Vec<StockMovement>>;

    /// Rebuild the stored level from the ledger.
    async fn recompute(&self, product_id: ProductId) -> InventoryResult<RecomputeReport>;

    /// Levels at or below `threshold`, lowest first.
    async fn low_stock(&self, threshold: i64) -> InventoryResult<Vec<StockLevel>>;
}

//! Driven Ports (SPI - Outbound Dependencies)

use crate::domain::{MovementReason, StockLevel, StockMovement};
use crate::error::InventoryResult;
use async_trait::async_trait;
use shared_types::{OrderId, ProductId};

/// Ledger storage plus the materialized per-product level.
#[async_trait]
pub trait LedgerRepository: Send + Sync {
    /// Append a movement and apply its delta to the stored level.
    ///
    /// Returns the new level.
    async fn append(&self, movement: &StockMovement) -> InventoryResult<i64>;

    /// Stored level, 0 for a product with no movements.
    async fn level(&self, product_id: ProductId) -> InventoryResult<i64>;

    async fn levels(&self, product_ids: &[ProductId]) -> InventoryResult<Vec<StockLevel>>;

    /// Overwrite the stored level (used by recompute).
    async fn set_level(&self, product_id: ProductId, level: i64) -> InventoryResult<()>;

    /// Newest first. `None` returns the full history.
    async fn movements(
        &self,
        product_id: ProductId,
        limit: Option<usize>,
    ) -> InventoryResult<Vec<StockMovement>>;

    /// The movement with this reason and order reference, if any.
    async fn find_by_reference(
        &self,
        product_id: ProductId,
        reason: MovementReason,
        reference: OrderId,
    ) -> InventoryResult<Option<StockMovement>>;

    /// Products whose stored level is at or below `threshold`.
    async fn at_or_below(&self, threshold: i64) -> InventoryResult<Vec<StockLevel>>;
}

/// Per-product low-stock thresholds, owned by the catalog.
#[async_trait]
pub trait StockThresholds: Send + Sync {
    /// `None` when the product is unknown; the service falls back to its
    /// configured default.
    async fn low_stock_threshold(&self, product_id: ProductId) -> Option<i64>;
}

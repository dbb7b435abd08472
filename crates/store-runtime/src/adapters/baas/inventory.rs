//! `LedgerRepository` over `stock_movements` (append-only) and
//! `stock_levels` (one row per product).
//!
//! The append and the level write are two requests. The inventory service
//! serializes its writes, so within one process the level cannot race; the
//! recompute endpoint repairs a level left behind by a crash in between.

use super::client::{BaasClient, BaasError, Query};
use async_trait::async_trait;
use au_02_inventory::{
    InventoryError, InventoryResult, LedgerRepository, MovementReason, StockLevel, StockMovement,
};
use shared_types::{OrderId, ProductId};
use std::collections::HashMap;
use std::sync::Arc;

const MOVEMENTS: &str = "stock_movements";
const LEVELS: &str = "stock_levels";

impl From<BaasError> for InventoryError {
    fn from(err: BaasError) -> Self {
        InventoryError::Storage(err.to_string())
    }
}

pub struct BaasLedgerRepository {
    client: Arc<BaasClient>,
}

impl BaasLedgerRepository {
    pub fn new(client: Arc<BaasClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl LedgerRepository for BaasLedgerRepository {
    async fn append(&self, movement: &StockMovement) -> InventoryResult<i64> {
        let level = self
            .level(movement.product_id)
            .await?
            .checked_add(movement.delta())
            .ok_or(InventoryError::LevelOverflow {
                product_id: movement.product_id,
            })?;
        let _: Vec<serde_json::Value> = self.client.insert(MOVEMENTS, movement).await?;
        self.set_level(movement.product_id, level).await?;
        Ok(level)
    }

    async fn level(&self, product_id: ProductId) -> InventoryResult<i64> {
        let row: Option<StockLevel> = self
            .client
            .select_one(LEVELS, Query::new().eq("product_id", product_id))
            .await?;
        Ok(row.map_or(0, |r| r.level))
    }

    async fn levels(&self, product_ids: &[ProductId]) -> InventoryResult<Vec<StockLevel>> {
        if product_ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows: Vec<StockLevel> = self
            .client
            .select(LEVELS, &Query::new().in_list("product_id", product_ids))
            .await?;
        let stored: HashMap<ProductId, i64> =
            rows.into_iter().map(|r| (r.product_id, r.level)).collect();
        Ok(product_ids
            .iter()
            .map(|id| StockLevel {
                product_id: *id,
                level: stored.get(id).copied().unwrap_or(0),
            })
            .collect())
    }

    async fn set_level(&self, product_id: ProductId, level: i64) -> InventoryResult<()> {
        let _: Vec<serde_json::Value> = self
            .client
            .upsert(LEVELS, &StockLevel { product_id, level })
            .await?;
        Ok(())
    }

    async fn movements(
        &self,
        product_id: ProductId,
        limit: Option<usize>,
    ) -> InventoryResult<Vec<StockMovement>> {
        let mut query = Query::new()
            .eq("product_id", product_id)
            .order("created_at.desc");
        if let Some(limit) = limit {
            query = query.limit(limit);
        }
        Ok(self.client.select(MOVEMENTS, &query).await?)
    }

    async fn find_by_reference(
        &self,
        product_id: ProductId,
        reason: MovementReason,
        reference: OrderId,
    ) -> InventoryResult<Option<StockMovement>> {
        Ok(self
            .client
            .select_one(
                MOVEMENTS,
                Query::new()
                    .eq("product_id", product_id)
                    .eq("reason", reason.as_str())
                    .eq("reference", reference),
            )
            .await?)
    }

    async fn at_or_below(&self, threshold: i64) -> InventoryResult<Vec<StockLevel>> {
        Ok(self
            .client
            .select(LEVELS, &Query::new().lte("level", threshold).order("level.asc"))
            .await?)
    }
}

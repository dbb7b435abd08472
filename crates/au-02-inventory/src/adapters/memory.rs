//! In-memory ledger repository

use crate::domain::{MovementReason, StockLevel, StockMovement};
use crate::error::{InventoryError, InventoryResult};
use crate::ports::outbound::{LedgerRepository, StockThresholds};
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{OrderId, ProductId};
use std::collections::HashMap;

#[derive(Default)]
struct Ledger {
    /// Append order is chronological.
    movements: Vec<StockMovement>,
    levels: HashMap<ProductId, i64>,
}

/// `LedgerRepository` over a vector and a level map.
#[derive(Default)]
pub struct InMemoryLedgerRepository {
    ledger: RwLock<Ledger>,
}

impl InMemoryLedgerRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total rows in the ledger.
    pub fn len(&self) -> usize {
        self.ledger.read().movements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ledger.read().movements.is_empty()
    }

    /// Corrupt the materialized level, for recompute tests.
    #[cfg(test)]
    pub(crate) fn force_level(&self, product_id: ProductId, level: i64) {
        self.ledger.write().levels.insert(product_id, level);
    }
}

#[async_trait]
impl LedgerRepository for InMemoryLedgerRepository {
    async fn append(&self, movement: &StockMovement) -> InventoryResult<i64> {
        let mut ledger = self.ledger.write();
        let current = ledger.levels.get(&movement.product_id).copied().unwrap_or(0);
        let level = current
            .checked_add(movement.delta())
            .ok_or(InventoryError::LevelOverflow {
                product_id: movement.product_id,
            })?;
        ledger.movements.push(movement.clone());
        ledger.levels.insert(movement.product_id, level);
        Ok(level)
    }

    async fn level(&self, product_id: ProductId) -> InventoryResult<i64> {
        Ok(self
            .ledger
            .read()
            .levels
            .get(&product_id)
            .copied()
            .unwrap_or(0))
    }

    async fn levels(&self, product_ids: &[ProductId]) -> InventoryResult<Vec<StockLevel>> {
        let ledger = self.ledger.read();
        Ok(product_ids
            .iter()
            .map(|id| StockLevel {
                product_id: *id,
                level: ledger.levels.get(id).copied().unwrap_or(0),
            })
            .collect())
    }

    async fn set_level(&self, product_id: ProductId, level: i64) -> InventoryResult<()> {
        self.ledger.write().levels.insert(product_id, level);
        Ok(())
    }

    async fn movements(
        &self,
        product_id: ProductId,
        limit: Option<usize>,
    ) -> InventoryResult<Vec<StockMovement>> {
        let ledger = self.ledger.read();
        Ok(ledger
            .movements
            .iter()
            .rev()
            .filter(|m| m.product_id == product_id)
            .take(limit.unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }

    async fn find_by_reference(
        &self,
        product_id: ProductId,
        reason: MovementReason,
        reference: OrderId,
    ) -> InventoryResult<Option<StockMovement>> {
        Ok(self
            .ledger
            .read()
            .movements
            .iter()
            .find(|m| {
                m.product_id == product_id && m.reason == reason && m.reference == Some(reference)
            })
            .cloned())
    }

    async fn at_or_below(&self, threshold: i64) -> InventoryResult<Vec<StockLevel>> {
        Ok(self
            .ledger
            .read()
            .levels
            .iter()
            .filter(|(_, level)| **level <= threshold)
            .map(|(id, level)| StockLevel {
                product_id: *id,
                level: *level,
            })
            .collect())
    }
}

/// Same threshold for every product.
pub struct FixedThreshold(pub i64);

#[async_trait]
impl StockThresholds for FixedThreshold {
    async fn low_stock_threshold(&self, _product_id: ProductId) -> Option<i64> {
        Some(self.0)
    }
}

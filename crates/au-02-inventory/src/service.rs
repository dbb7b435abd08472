//! Inventory Service - ledger writes and stock events

use crate::domain::{
    replay, LedgerOutcome, MovementKind, MovementReason, NewMovement, RecomputeReport, StockLevel,
    StockMovement,
};
use crate::error::{InventoryError, InventoryResult};
use crate::ports::inbound::InventoryApi;
use crate::ports::outbound::{LedgerRepository, StockThresholds};
use async_trait::async_trait;
use chrono::Utc;
use shared_bus::{EventPublisher, StoreEvent};
use shared_types::{MovementId, OrderSummary, ProductId};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Actor recorded on movements created from orders.
pub const SYSTEM_ACTOR: &str = "system";

/// Inventory configuration
#[derive(Clone, Debug)]
pub struct InventoryConfig {
    /// Threshold used when the catalog does not know the product.
    pub default_low_stock_threshold: i64,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            default_low_stock_threshold: 3,
        }
    }
}

/// Inventory Service implementation
pub struct InventoryService<R, T>
where
    R: LedgerRepository + ?Sized,
    T: StockThresholds + ?Sized,
{
    config: InventoryConfig,
    repo: Arc<R>,
    thresholds: Arc<T>,
    publisher: Arc<dyn EventPublisher>,
    /// Serializes check-then-append so two decrements cannot both pass the
    /// availability check.
    write_lock: Mutex<()>,
}

impl<R, T> InventoryService<R, T>
where
    R: LedgerRepository + ?Sized,
    T: StockThresholds + ?Sized,
{
    pub fn new(
        config: InventoryConfig,
        repo: Arc<R>,
        thresholds: Arc<T>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            config,
            repo,
            thresholds,
            publisher,
            write_lock: Mutex::new(()),
        }
    }

    async fn threshold(&self, product_id: ProductId) -> i64 {
        self.thresholds
            .low_stock_threshold(product_id)
            .await
            .unwrap_or(self.config.default_low_stock_threshold)
    }

    /// Publish `StockChanged`, plus `LowStock` when at or below threshold.
    async fn announce(&self, product_id: ProductId, level: i64) {
        self.publisher
            .publish(StoreEvent::StockChanged { product_id, level })
            .await;

        let threshold = self.threshold(product_id).await;
        if level <= threshold {
            self.publisher
                .publish(StoreEvent::LowStock {
                    product_id,
                    level,
                    threshold,
                })
                .await;
        }
    }

    /// Quantities per product, merging duplicate lines.
    fn order_quantities(order: &OrderSummary) -> BTreeMap<ProductId, i64> {
        let mut quantities = BTreeMap::new();
        for line in &order.lines {
            *quantities.entry(line.product_id).or_insert(0) += i64::from(line.quantity);
        }
        quantities
    }
}

#[async_trait]
impl<R, T> InventoryApi for InventoryService<R, T>
where
    R: LedgerRepository + ?Sized,
    T: StockThresholds + ?Sized,
{
    async fn record_movement(&self, input: NewMovement) -> InventoryResult<StockMovement> {
        input.validate()?;

        let (movement, level) = {
            let _guard = self.write_lock.lock().await;

            let delta = input.delta();
            if delta < 0 {
                let available = self.repo.level(input.product_id).await?;
                let remaining = available
                    .checked_add(delta)
                    .ok_or(InventoryError::LevelOverflow {
                        product_id: input.product_id,
                    })?;
                if remaining < 0 {
                    return Err(InventoryError::InsufficientStock {
                        product_id: input.product_id,
                        available,
                        requested: delta.saturating_neg(),
                    });
                }
            }

            let movement = StockMovement {
                id: MovementId::new(),
                product_id: input.product_id,
                kind: input.kind,
                quantity: input.quantity,
                reason: input.reason,
                reference: input.reference,
                note: input.note.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
                created_by: input.created_by,
                created_at: Utc::now(),
            };
            let level = self.repo.append(&movement).await?;
            (movement, level)
        };

        info!(
            product_id = %movement.product_id,
            kind = ?movement.kind,
            reason = movement.reason.as_str(),
            delta = movement.delta(),
            level,
            "[au-02] Stock movement recorded"
        );
        self.announce(movement.product_id, level).await;
        Ok(movement)
    }

    async fn record_sale(&self, order: &OrderSummary) -> InventoryResult<LedgerOutcome> {
        let mut outcome = LedgerOutcome::default();
        let mut changed = Vec::new();

        {
            let _guard = self.write_lock.lock().await;
            for (product_id, quantity) in Self::order_quantities(order) {
                if self
                    .repo
                    .find_by_reference(product_id, MovementReason::Sale, order.order_id)
                    .await?
                    .is_some()
                {
                    outcome.skipped += 1;
                    continue;
                }

                let movement = StockMovement {
                    id: MovementId::new(),
                    product_id,
                    kind: MovementKind::Out,
                    quantity,
                    reason: MovementReason::Sale,
                    reference: Some(order.order_id),
                    note: Some(format!("Order {}", order.order_number)),
                    created_by: Some(SYSTEM_ACTOR.to_string()),
                    created_at: Utc::now(),
                };
                let level = self.repo.append(&movement).await?;
                if level < 0 {
                    warn!(
                        product_id = %product_id,
                        order_number = %order.order_number,
                        level,
                        "[au-02] Product oversold, stock is negative"
                    );
                }
                changed.push((product_id, level));
                outcome.recorded.push(movement);
            }
        }

        for (product_id, level) in changed {
            self.announce(product_id, level).await;
        }
        info!(
            order_number = %order.order_number,
            recorded = outcome.recorded.len(),
            skipped = outcome.skipped,
            "[au-02] Sale applied to ledger"
        );
        Ok(outcome)
    }

    async fn record_return(&self, order: &OrderSummary) -> InventoryResult<LedgerOutcome> {
        let mut outcome = LedgerOutcome::default();
        let mut changed = Vec::new();

        {
            let _guard = self.write_lock.lock().await;
            for product_id in Self::order_quantities(order).into_keys() {
                let Some(sale) = self
                    .repo
                    .find_by_reference(product_id, MovementReason::Sale, order.order_id)
                    .await?
                else {
                    outcome.skipped += 1;
                    continue;
                };
                if self
                    .repo
                    .find_by_reference(product_id, MovementReason::Return, order.order_id)
                    .await?
                    .is_some()
                {
                    outcome.skipped += 1;
                    continue;
                }

                let movement = StockMovement {
                    id: MovementId::new(),
                    product_id,
                    kind: MovementKind::In,
                    quantity: sale.quantity,
                    reason: MovementReason::Return,
                    reference: Some(order.order_id),
                    note: Some(format!("Refund of order {}", order.order_number)),
                    created_by: Some(SYSTEM_ACTOR.to_string()),
                    created_at: Utc::now(),
                };
                let level = self.repo.append(&movement).await?;
                changed.push((product_id, level));
                outcome.recorded.push(movement);
            }
        }

        for (product_id, level) in changed {
            self.announce(product_id, level).await;
        }
        info!(
            order_number = %order.order_number,
            recorded = outcome.recorded.len(),
            skipped = outcome.skipped,
            "[au-02] Return applied to ledger"
        );
        Ok(outcome)
    }

    async fn stock_level(&self, product_id: ProductId) -> InventoryResult<i64> {
        self.repo.level(product_id).await
    }

    async fn stock_levels(&self, product_ids: &[ProductId]) -> InventoryResult<Vec<StockLevel>> {
        self.repo.levels(product_ids).await
    }

    async fn movements(
        &self,
        product_id: ProductId,
        limit: usize,
    ) -> InventoryResult<Vec<StockMovement>> {
        self.repo.movements(product_id, Some(limit)).await
    }

    async fn recompute(&self, product_id: ProductId) -> InventoryResult<RecomputeReport> {
        let report = {
            let _guard = self.write_lock.lock().await;
            let previous = self.repo.level(product_id).await?;
            let history = self.repo.movements(product_id, None).await?;
            let recomputed =
                replay(&history).ok_or(InventoryError::LevelOverflow { product_id })?;
            if recomputed != previous {
                self.repo.set_level(product_id, recomputed).await?;
            }
            RecomputeReport {
                product_id,
                previous,
                recomputed,
                movements: history.len(),
            }
        };

        if report.drifted() {
            warn!(
                product_id = %product_id,
                previous = report.previous,
                recomputed = report.recomputed,
                "[au-02] Stored level drifted from ledger, corrected"
            );
            self.announce(product_id, report.recomputed).await;
        }
        Ok(report)
    }

    async fn low_stock(&self, threshold: i64) -> InventoryResult<Vec<StockLevel>> {
        let mut levels = self.repo.at_or_below(threshold).await?;
        levels.sort_by(|a, b| a.level.cmp(&b.level).then_with(|| a.product_id.cmp(&b.product_id)));
        Ok(levels)
    }
}

#[cfg(test)]
mod tests;

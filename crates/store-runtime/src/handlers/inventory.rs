//! Inventory choreography: paid orders leave the shelf, refunded orders come
//! back.
//!
//! Both ledger calls are idempotent per (order, product), so a redelivered
//! event is harmless. A failed write is published as `CriticalError`: the
//! payment is already captured, so an operator has to reconcile by hand.

use au_02_inventory::InventoryApi;
use shared_bus::{EventPublisher, StoreEvent, Subscription};
use shared_types::{OrderSummary, SubsystemId};
use std::sync::Arc;
use tracing::{error, info};

/// What the handler did with one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerAction {
    Sold { recorded: usize, skipped: usize },
    Returned { recorded: usize, skipped: usize },
    Failed,
    Ignored,
}

/// Handler for order events that move stock.
pub struct InventoryHandler {
    subscription: Subscription,
    inventory: Arc<dyn InventoryApi>,
    publisher: Arc<dyn EventPublisher>,
}

impl InventoryHandler {
    pub fn new(
        subscription: Subscription,
        inventory: Arc<dyn InventoryApi>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            subscription,
            inventory,
            publisher,
        }
    }

    pub async fn handle(&self, event: &StoreEvent) -> LedgerAction {
        match event {
            StoreEvent::OrderPaid(order) => match self.inventory.record_sale(order).await {
                Ok(outcome) => {
                    info!(
                        order = %order.order_number,
                        recorded = outcome.recorded.len(),
                        skipped = outcome.skipped,
                        "[au-02] Sale recorded"
                    );
                    LedgerAction::Sold {
                        recorded: outcome.recorded.len(),
                        skipped: outcome.skipped,
                    }
                }
                Err(e) => self.fail(order, "sale", &e.to_string()).await,
            },
            StoreEvent::OrderRefunded(order) => match self.inventory.record_return(order).await {
                Ok(outcome) => {
                    info!(
                        order = %order.order_number,
                        recorded = outcome.recorded.len(),
                        "[au-02] Refunded stock returned"
                    );
                    LedgerAction::Returned {
                        recorded: outcome.recorded.len(),
                        skipped: outcome.skipped,
                    }
                }
                Err(e) => self.fail(order, "return", &e.to_string()).await,
            },
            _ => LedgerAction::Ignored,
        }
    }

    async fn fail(&self, order: &OrderSummary, kind: &str, reason: &str) -> LedgerAction {
        error!(order = %order.order_number, kind, error = reason, "[au-02] Ledger write failed");
        self.publisher
            .publish(StoreEvent::CriticalError {
                subsystem_id: SubsystemId::Inventory,
                error: format!(
                    "failed to record {kind} for order {}: {reason}",
                    order.order_number
                ),
            })
            .await;
        LedgerAction::Failed
    }

    /// Run the handler loop until the bus closes.
    pub async fn run(mut self) {
        info!("[au-02] Inventory handler started");
        while let Some(event) = self.subscription.recv().await {
            self.handle(&event).await;
        }
        info!("[au-02] Event bus closed, exiting");
    }
}

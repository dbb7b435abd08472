//! Reconciliation outcomes

use serde::{Deserialize, Serialize};
use shared_types::{OrderId, OrderStatus};

/// What handling one webhook event did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ReconcileOutcome {
    /// The order changed; `status` is its status afterwards.
    Reconciled { order_id: OrderId, status: OrderStatus },
    /// The order was already in the state the event describes.
    Unchanged { order_id: OrderId },
    /// Event type we do not act on.
    Ignored,
    /// Event id seen before; nothing was done.
    Duplicate,
    /// No order matches the event. Acknowledged so the processor stops retrying.
    OrderNotFound,
}

impl ReconcileOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reconciled { .. } => "reconciled",
            Self::Unchanged { .. } => "unchanged",
            Self::Ignored => "ignored",
            Self::Duplicate => "duplicate",
            Self::OrderNotFound => "order_not_found",
        }
    }
}

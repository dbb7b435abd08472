//! Driving Ports (API - Inbound)

use crate::domain::{NewOrder, Order, OrderQuery, PaymentDetails, StatusUpdate, TransitionContext};
use crate::error::OrderResult;
use async_trait::async_trait;
use shared_types::{OrderId, OrderStatus, Page, ProductId};

/// Primary Orders API
#[async_trait]
pub trait OrderApi: Send + Sync {
    /// Create a `Pending` order with a fresh order number.
    async fn create_pending(&self, input: NewOrder) -> OrderResult<Order>;

    async fn attach_checkout_session(&self, id: OrderId, session_id: &str) -> OrderResult<Order>;

    async fn get(&self, id: OrderId) -> OrderResult<Order>;

    async fn find_by_number(&self, order_number: &str) -> OrderResult<Order>;

    async fn find_by_checkout_session(&self, session_id: &str) -> OrderResult<Option<Order>>;

    async fn find_by_payment_intent(&self, payment_intent: &str) -> OrderResult<Option<Order>>;

    /// Admin listing, newest first.
    async fn list(&self, query: OrderQuery) -> OrderResult<Page<Order>>;

    /// Admin status change, checked against the transition table.
    async fn transition(
        &self,
        id: OrderId,
        to: OrderStatus,
        context: TransitionContext,
    ) -> OrderResult<Order>;

    // --- reconciliation helpers (idempotent) --------------------------------

    /// `Pending`/`Failed` to `Paid`. Paid-or-later orders are `Unchanged`.
    async fn mark_paid(&self, id: OrderId, payment: PaymentDetails) -> OrderResult<StatusUpdate>;

    /// `Pending` to `Failed`. Anything else is `Unchanged`.
    async fn mark_failed(&self, id: OrderId, reason: &str) -> OrderResult<StatusUpdate>;

    /// `Pending`/`Failed` to `Cancelled`. Anything else is `Unchanged`.
    async fn mark_cancelled(&self, id: OrderId, reason: &str) -> OrderResult<StatusUpdate>;

    /// Add `amount_cents` to the refunded total; the order becomes
    /// `Refunded` once the total is covered.
    async fn record_refund(&self, id: OrderId, amount_cents: i64) -> OrderResult<StatusUpdate>;

    /// Bring the refunded total up to `cumulative_cents`, the running total
    /// reported by the processor. A total at or below the recorded one is
    /// `Unchanged`.
    async fn record_refund_total(
        &self,
        id: OrderId,
        cumulative_cents: i64,
    ) -> OrderResult<StatusUpdate>;

    // --- customer -----------------------------------------------------------

    /// Order status lookup for customers. A wrong email is `NotFound`.
    async fn customer_lookup(&self, order_number: &str, email: &str) -> OrderResult<Order>;

    /// Whether `email` has a paid (or later) order containing `product_id`.
    /// Refunded orders do not count.
    async fn has_purchased(&self, email: &str, product_id: ProductId) -> OrderResult<bool>;
}

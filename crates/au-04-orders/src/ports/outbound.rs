//! Driven Ports (SPI - Outbound Dependencies)

use crate::domain::Order;
use crate::error::OrderResult;
use async_trait::async_trait;
use shared_types::{OrderId, OrderStatus, Page, PageRequest};

/// Order persistence.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Fails with `DuplicateOrderNumber` when the number is taken.
    async fn insert(&self, order: &Order) -> OrderResult<()>;

    /// Replace a stored order. Fails with `NotFound` for unknown ids.
    async fn update(&self, order: &Order) -> OrderResult<()>;

    async fn get(&self, id: OrderId) -> OrderResult<Option<Order>>;

    async fn find_by_number(&self, order_number: &str) -> OrderResult<Option<Order>>;

    async fn find_by_checkout_session(&self, session_id: &str) -> OrderResult<Option<Order>>;

    async fn find_by_payment_intent(&self, payment_intent: &str) -> OrderResult<Option<Order>>;

    /// Newest first.
    async fn list(
        &self,
        status: Option<OrderStatus>,
        email: Option<&str>,
        page: PageRequest,
    ) -> OrderResult<Page<Order>>;
}

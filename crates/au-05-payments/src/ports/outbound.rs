//! Driven Ports (SPI - Outbound Dependencies)

use crate::domain::{CheckoutSession, CheckoutSessionRequest, Refund};
use crate::error::{PaymentResult, ProcessorError};
use async_trait::async_trait;
use shared_types::{ProductId, ProductSnapshot};
use std::collections::HashMap;

/// Hosted checkout and refunds.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    async fn create_checkout_session(
        &self,
        request: CheckoutSessionRequest,
    ) -> Result<CheckoutSession, ProcessorError>;

    async fn expire_checkout_session(&self, session_id: &str) -> Result<(), ProcessorError>;

    /// Refund `amount_cents`, or the remaining captured amount when `None`.
    async fn create_refund(
        &self,
        payment_intent: &str,
        amount_cents: Option<i64>,
    ) -> Result<Refund, ProcessorError>;
}

/// Product prices and availability, read from the catalog.
#[async_trait]
pub trait CatalogReader: Send + Sync {
    /// Snapshots for every id that exists, active or not.
    async fn products_by_ids(&self, ids: &[ProductId]) -> PaymentResult<Vec<ProductSnapshot>>;
}

/// Current stock levels, read from the inventory ledger.
#[async_trait]
pub trait StockReader: Send + Sync {
    async fn levels(&self, ids: &[ProductId]) -> PaymentResult<HashMap<ProductId, i64>>;
}

//! Driving Ports (API - Inbound)

use crate::domain::{
    CheckoutRequest, CheckoutResponse, ReconcileOutcome, RefundReceipt, WebhookEvent,
};
use crate::error::PaymentResult;
use async_trait::async_trait;
use au_03_cart::{Cart, Quote};
use shared_types::OrderId;

/// Storefront checkout
#[async_trait]
pub trait CheckoutApi: Send + Sync {
    /// Price a cart without creating anything.
    async fn quote(&self, cart: Cart) -> PaymentResult<Quote>;

    /// Create a pending order and a hosted checkout session for it.
    async fn start_checkout(&self, request: CheckoutRequest) -> PaymentResult<CheckoutResponse>;
}

/// Processor webhook intake
#[async_trait]
pub trait WebhookApi: Send + Sync {
    /// Verify, parse and reconcile a raw webhook delivery.
    async fn handle_webhook(&self, payload: &[u8], signature: &str)
        -> PaymentResult<ReconcileOutcome>;

    /// Reconcile an already verified event.
    async fn handle(&self, event: WebhookEvent) -> PaymentResult<ReconcileOutcome>;
}

/// Admin refunds
#[async_trait]
pub trait RefundApi: Send + Sync {
    /// Ask the processor to refund `amount_cents` (default: everything left).
    async fn refund(&self, order_id: OrderId, amount_cents: Option<i64>)
        -> PaymentResult<RefundReceipt>;
}

//! Admin refunds

use crate::domain::RefundReceipt;
use crate::error::{PaymentError, PaymentResult};
use crate::ports::inbound::RefundApi;
use crate::ports::outbound::PaymentProcessor;
use async_trait::async_trait;
use au_04_orders::{can_transition, OrderApi};
use shared_types::{OrderId, OrderStatus, ValidationError};
use std::sync::Arc;
use tracing::info;

/// Refund Service implementation
pub struct RefundService {
    orders: Arc<dyn OrderApi>,
    processor: Arc<dyn PaymentProcessor>,
}

impl RefundService {
    pub fn new(orders: Arc<dyn OrderApi>, processor: Arc<dyn PaymentProcessor>) -> Self {
        Self { orders, processor }
    }
}

#[async_trait]
impl RefundApi for RefundService {
    async fn refund(
        &self,
        order_id: OrderId,
        amount_cents: Option<i64>,
    ) -> PaymentResult<RefundReceipt> {
        let order = self.orders.get(order_id).await?;

        if !can_transition(order.status, OrderStatus::Refunded) {
            return Err(PaymentError::NotRefundable {
                status: order.status,
            });
        }
        let Some(payment_intent) = order.payment_intent_id.clone() else {
            return Err(PaymentError::MissingPaymentIntent {
                order_number: order.order_number,
            });
        };

        let refundable = order.refundable_cents();
        if let Some(amount) = amount_cents {
            if amount <= 0 || amount > refundable {
                return Err(ValidationError::OutOfRange {
                    field: "amount_cents",
                    min: 1,
                    max: refundable,
                }
                .into());
            }
        }

        let refund = self
            .processor
            .create_refund(&payment_intent, amount_cents)
            .await?;

        info!(
            order_number = %order.order_number,
            refund_id = %refund.id,
            amount = refund.amount_cents,
            "[au-05] Refund requested"
        );
        Ok(RefundReceipt {
            order_id: order.id,
            order_number: order.order_number,
            refund,
        })
    }
}

//! Webhook reconciliation
//!
//! Processor events arrive at least once and in any order. Every handler
//! here is idempotent: the order service answers `Unchanged` when an order
//! is already where an event would put it, and bus events are published
//! only for real changes.

use crate::domain::{
    verify_signature, ChargeObject, OrderLookup, ReconcileOutcome, SessionObject, WebhookAction,
    WebhookEvent, DEFAULT_TOLERANCE_SECS,
};
use crate::error::PaymentResult;
use crate::ports::inbound::WebhookApi;
use async_trait::async_trait;
use au_04_orders::{Order, OrderApi, OrderError, PaymentDetails, StatusUpdate};
use chrono::Utc;
use parking_lot::Mutex;
use shared_bus::{EventPublisher, ProcessedEventCache, ProcessedEventError, StoreEvent};
use shared_types::{Currency, Money, OrderStatus, SubsystemId};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Reconciliation configuration
#[derive(Clone, Debug)]
pub struct ReconciliationConfig {
    pub webhook_secret: String,
    /// Allowed skew between the signature timestamp and our clock.
    pub tolerance_secs: i64,
}

impl Default for ReconciliationConfig {
    fn default() -> Self {
        Self {
            webhook_secret: String::new(),
            tolerance_secs: DEFAULT_TOLERANCE_SECS,
        }
    }
}

/// Reconciliation Service implementation
pub struct ReconciliationService {
    config: ReconciliationConfig,
    orders: Arc<dyn OrderApi>,
    publisher: Arc<dyn EventPublisher>,
    processed: Mutex<ProcessedEventCache>,
}

impl ReconciliationService {
    pub fn new(
        config: ReconciliationConfig,
        orders: Arc<dyn OrderApi>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            config,
            orders,
            publisher,
            processed: Mutex::new(ProcessedEventCache::new()),
        }
    }

    /// [`WebhookApi::handle_webhook`] with an explicit clock.
    pub async fn handle_webhook_at(
        &self,
        payload: &[u8],
        signature: &str,
        now: i64,
    ) -> PaymentResult<ReconcileOutcome> {
        verify_signature(
            payload,
            signature,
            &self.config.webhook_secret,
            now,
            self.config.tolerance_secs,
        )?;
        let event = WebhookEvent::parse(payload)?;
        self.handle(event).await
    }

    /// First order matching the lookup, trying metadata, client reference,
    /// checkout session, then payment intent.
    async fn resolve(&self, lookup: &OrderLookup) -> PaymentResult<Option<Order>> {
        for id in [lookup.metadata_order_id, lookup.client_reference_id]
            .into_iter()
            .flatten()
        {
            match self.orders.get(id).await {
                Ok(order) => return Ok(Some(order)),
                Err(OrderError::NotFound(_)) => continue,
                Err(e) => return Err(e.into()),
            }
        }
        if let Some(session_id) = &lookup.checkout_session_id {
            if let Some(order) = self.orders.find_by_checkout_session(session_id).await? {
                return Ok(Some(order));
            }
        }
        if let Some(intent) = &lookup.payment_intent {
            if let Some(order) = self.orders.find_by_payment_intent(intent).await? {
                return Ok(Some(order));
            }
        }
        Ok(None)
    }

    fn not_found(event: &WebhookEvent, lookup: &OrderLookup) -> ReconcileOutcome {
        warn!(
            event_id = %event.id,
            event_type = %event.event_type,
            lookup = ?lookup,
            "[au-05] Webhook references no known order"
        );
        ReconcileOutcome::OrderNotFound
    }

    async fn apply(&self, event: &WebhookEvent) -> PaymentResult<ReconcileOutcome> {
        match event.action()? {
            WebhookAction::Ignore => {
                debug!(event_type = %event.event_type, "[au-05] Webhook type ignored");
                Ok(ReconcileOutcome::Ignored)
            }
            WebhookAction::AwaitingPayment(session) => {
                let lookup = session.lookup();
                let Some(order) = self.resolve(&lookup).await? else {
                    return Ok(Self::not_found(event, &lookup));
                };
                info!(
                    order_number = %order.order_number,
                    "[au-05] Checkout completed, asynchronous payment pending"
                );
                Ok(ReconcileOutcome::Unchanged { order_id: order.id })
            }
            WebhookAction::MarkPaid(session) => self.paid(event, session).await,
            WebhookAction::MarkFailed { lookup, reason } => {
                self.failed(event, &lookup, &reason).await
            }
            WebhookAction::Cancel { lookup, reason } => {
                self.cancelled(event, &lookup, &reason).await
            }
            WebhookAction::Refund(charge) => self.refunded(event, charge).await,
        }
    }

    async fn paid(
        &self,
        event: &WebhookEvent,
        session: SessionObject,
    ) -> PaymentResult<ReconcileOutcome> {
        let lookup = session.lookup();
        let Some(order) = self.resolve(&lookup).await? else {
            return Ok(Self::not_found(event, &lookup));
        };

        let details = PaymentDetails {
            payment_intent: session.payment_intent.clone(),
            customer: session.customer(),
        };
        let update = match self.orders.mark_paid(order.id, details).await {
            Ok(update) => update,
            Err(OrderError::InvalidTransition { from, .. }) => {
                error!(
                    order_number = %order.order_number,
                    status = %from,
                    "[au-05] Payment captured for an order that can no longer be paid"
                );
                self.publisher
                    .publish(StoreEvent::CriticalError {
                        subsystem_id: SubsystemId::Payments,
                        error: format!(
                            "payment captured for {} order {}",
                            from, order.order_number
                        ),
                    })
                    .await;
                return Ok(ReconcileOutcome::Unchanged { order_id: order.id });
            }
            Err(e) => return Err(e.into()),
        };

        let StatusUpdate::Changed { order, .. } = update else {
            return Ok(ReconcileOutcome::Unchanged { order_id: order.id });
        };

        self.check_amount(&order, &session).await;
        self.publisher
            .publish(StoreEvent::OrderPaid(order.summary()))
            .await;
        info!(
            order_number = %order.order_number,
            total = %order.total,
            "[au-05] Order paid"
        );
        Ok(ReconcileOutcome::Reconciled {
            order_id: order.id,
            status: order.status,
        })
    }

    /// The order stays paid on a mismatch: the funds were captured.
    async fn check_amount(&self, order: &Order, session: &SessionObject) {
        let Some(amount) = session.amount_total else {
            return;
        };
        let currency = session
            .currency
            .as_deref()
            .and_then(|c| Currency::new(c).ok())
            .unwrap_or_else(|| order.currency.clone());
        let received = Money::new(amount, currency);
        if received == order.total {
            return;
        }

        error!(
            order_number = %order.order_number,
            expected = %order.total,
            received = %received,
            "[au-05] Captured amount does not match order total"
        );
        self.publisher
            .publish(StoreEvent::PaymentAmountMismatch {
                order_id: order.id,
                order_number: order.order_number.clone(),
                expected: order.total.clone(),
                received,
            })
            .await;
    }

    async fn failed(
        &self,
        event: &WebhookEvent,
        lookup: &OrderLookup,
        reason: &str,
    ) -> PaymentResult<ReconcileOutcome> {
        let Some(order) = self.resolve(lookup).await? else {
            return Ok(Self::not_found(event, lookup));
        };

        match self.orders.mark_failed(order.id, reason).await? {
            StatusUpdate::Changed { order, .. } => {
                warn!(
                    order_number = %order.order_number,
                    reason,
                    "[au-05] Payment failed"
                );
                self.publisher
                    .publish(StoreEvent::OrderPaymentFailed {
                        order_id: order.id,
                        order_number: order.order_number.clone(),
                        customer_email: order.customer.email.clone(),
                        reason: reason.to_string(),
                    })
                    .await;
                Ok(ReconcileOutcome::Reconciled {
                    order_id: order.id,
                    status: order.status,
                })
            }
            StatusUpdate::Unchanged(order) => Ok(ReconcileOutcome::Unchanged { order_id: order.id }),
        }
    }

    async fn cancelled(
        &self,
        event: &WebhookEvent,
        lookup: &OrderLookup,
        reason: &str,
    ) -> PaymentResult<ReconcileOutcome> {
        let Some(order) = self.resolve(lookup).await? else {
            return Ok(Self::not_found(event, lookup));
        };

        match self.orders.mark_cancelled(order.id, reason).await? {
            StatusUpdate::Changed { order, .. } => {
                info!(order_number = %order.order_number, reason, "[au-05] Order cancelled");
                self.publisher
                    .publish(StoreEvent::OrderCancelled {
                        order_id: order.id,
                        reason: reason.to_string(),
                    })
                    .await;
                Ok(ReconcileOutcome::Reconciled {
                    order_id: order.id,
                    status: order.status,
                })
            }
            StatusUpdate::Unchanged(order) => Ok(ReconcileOutcome::Unchanged { order_id: order.id }),
        }
    }

    async fn refunded(
        &self,
        event: &WebhookEvent,
        charge: ChargeObject,
    ) -> PaymentResult<ReconcileOutcome> {
        let lookup = charge.lookup();
        let Some(order) = self.resolve(&lookup).await? else {
            return Ok(Self::not_found(event, &lookup));
        };

        let already_refunded = order.amount_refunded_cents;
        // `amount_refunded` is cumulative on the charge; the order service
        // takes the increment under its own lock.
        let update = match self
            .orders
            .record_refund_total(order.id, charge.amount_refunded)
            .await
        {
            Ok(update) => update,
            Err(OrderError::InvalidTransition { from, .. }) => {
                error!(
                    order_number = %order.order_number,
                    status = %from,
                    "[au-05] Refund reported for an order that was never paid"
                );
                return Ok(ReconcileOutcome::Unchanged { order_id: order.id });
            }
            Err(e) => return Err(e.into()),
        };

        match update {
            StatusUpdate::Changed { order, .. } => {
                info!(
                    order_number = %order.order_number,
                    refunded = order.amount_refunded_cents,
                    "[au-05] Order fully refunded"
                );
                self.publisher
                    .publish(StoreEvent::OrderRefunded(order.summary()))
                    .await;
                Ok(ReconcileOutcome::Reconciled {
                    order_id: order.id,
                    status: order.status,
                })
            }
            // Partial refund: amount recorded, status kept.
            StatusUpdate::Unchanged(updated)
                if updated.status != OrderStatus::Refunded
                    && charge.amount_refunded > already_refunded =>
            {
                Ok(ReconcileOutcome::Reconciled {
                    order_id: updated.id,
                    status: updated.status,
                })
            }
            StatusUpdate::Unchanged(order) => Ok(ReconcileOutcome::Unchanged { order_id: order.id }),
        }
    }
}

#[async_trait]
impl WebhookApi for ReconciliationService {
    async fn handle_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> PaymentResult<ReconcileOutcome> {
        self.handle_webhook_at(payload, signature, Utc::now().timestamp())
            .await
    }

    async fn handle(&self, event: WebhookEvent) -> PaymentResult<ReconcileOutcome> {
        let check = self
            .processed
            .lock()
            .check_and_insert(&event.id, event.created);
        match check {
            Ok(()) => {}
            Err(ProcessedEventError::Duplicate { .. }) => {
                debug!(event_id = %event.id, "[au-05] Duplicate webhook skipped");
                return Ok(ReconcileOutcome::Duplicate);
            }
            Err(ProcessedEventError::Expired { created_at, .. }) => {
                warn!(event_id = %event.id, created_at, "[au-05] Stale webhook ignored");
                return Ok(ReconcileOutcome::Ignored);
            }
        }

        let result = self.apply(&event).await;
        match &result {
            Ok(outcome) => info!(
                event_id = %event.id,
                event_type = %event.event_type,
                outcome = outcome.as_str(),
                "[au-05] Webhook handled"
            ),
            Err(e) => {
                // Forget the id so the processor's retry is processed.
                self.processed.lock().release(&event.id);
                warn!(
                    event_id = %event.id,
                    event_type = %event.event_type,
                    error = %e,
                    "[au-05] Webhook handling failed"
                );
            }
        }
        result
    }
}


//! Order Service - lifecycle, reconciliation helpers and lookups

use crate::domain::{
    can_transition, generate_order_number, is_valid_order_number, NewOrder, Order, OrderQuery,
    PaymentDetails, StatusUpdate, TransitionContext,
};
use crate::error::{OrderError, OrderResult};
use crate::ports::inbound::OrderApi;
use crate::ports::outbound::OrderRepository;
use async_trait::async_trait;
use chrono::Utc;
use shared_bus::{EventPublisher, StoreEvent};
use shared_types::{
    normalize_email, CustomerInfo, OrderId, OrderStatus, Page, PageRequest, ProductId,
    MAX_PER_PAGE,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Attempts at a unique order number before giving up.
const MAX_NUMBER_ATTEMPTS: usize = 5;

/// Order Service implementation
pub struct OrderService<R: OrderRepository + ?Sized> {
    repo: Arc<R>,
    publisher: Arc<dyn EventPublisher>,
    /// Serializes read-modify-write of order rows.
    write_lock: Mutex<()>,
}

impl<R: OrderRepository + ?Sized> OrderService<R> {
    pub fn new(repo: Arc<R>, publisher: Arc<dyn EventPublisher>) -> Self {
        Self {
            repo,
            publisher,
            write_lock: Mutex::new(()),
        }
    }

    async fn load(&self, id: OrderId) -> OrderResult<Order> {
        self.repo
            .get(id)
            .await?
            .ok_or_else(|| OrderError::NotFound(id.to_string()))
    }

    /// Add `amount_cents` to the refunded total of `order` and persist.
    /// Callers hold `write_lock`.
    async fn apply_refund(&self, mut order: Order, amount_cents: i64) -> OrderResult<StatusUpdate> {
        if order.status == OrderStatus::Refunded || amount_cents <= 0 {
            return Ok(StatusUpdate::Unchanged(order));
        }
        if !can_transition(order.status, OrderStatus::Refunded) {
            return Err(OrderError::InvalidTransition {
                from: order.status,
                to: OrderStatus::Refunded,
            });
        }

        order.amount_refunded_cents = order.amount_refunded_cents.saturating_add(amount_cents);
        if order.is_fully_refunded() {
            let from = self.persist_status(&mut order, OrderStatus::Refunded).await?;
            return Ok(StatusUpdate::Changed { order, from });
        }

        order.updated_at = Utc::now();
        self.repo.update(&order).await?;
        info!(
            order_number = %order.order_number,
            refunded = order.amount_refunded_cents,
            total = order.total.amount_cents,
            "[au-04] Partial refund recorded"
        );
        Ok(StatusUpdate::Unchanged(order))
    }

    /// Move `order` to `to` and persist. Returns the previous status.
    async fn persist_status(&self, order: &mut Order, to: OrderStatus) -> OrderResult<OrderStatus> {
        let from = order.status;
        let now = Utc::now();
        order.status = to;
        order.updated_at = now;
        if to == OrderStatus::Paid && order.paid_at.is_none() {
            order.paid_at = Some(now);
        }
        self.repo.update(order).await?;
        Ok(from)
    }

    async fn announce(&self, order: &Order, from: OrderStatus) {
        info!(
            order_number = %order.order_number,
            from = %from,
            to = %order.status,
            "[au-04] Order status changed"
        );
        self.publisher
            .publish(StoreEvent::OrderStatusChanged {
                order_id: order.id,
                order_number: order.order_number.clone(),
                customer_email: order.customer.email.clone(),
                from,
                to: order.status,
                tracking_number: order.tracking_number.clone(),
            })
            .await;
    }

    async fn announce_update(&self, update: &StatusUpdate) {
        if let StatusUpdate::Changed { order, from } = update {
            self.announce(order, *from).await;
        }
    }

    /// Apply processor-confirmed customer details, keeping what we have
    /// when the processor sends blanks or an unusable email.
    fn merge_customer(current: &mut CustomerInfo, confirmed: CustomerInfo) {
        if let Ok(email) = normalize_email(&confirmed.email) {
            current.email = email;
        }
        let name = confirmed.name.trim();
        if !name.is_empty() {
            current.name = name.to_string();
        }
        if let Some(phone) = confirmed.phone.filter(|p| !p.trim().is_empty()) {
            current.phone = Some(phone);
        }
    }
}

#[async_trait]
impl<R: OrderRepository + ?Sized> OrderApi for OrderService<R> {
    async fn create_pending(&self, mut input: NewOrder) -> OrderResult<Order> {
        input.validate()?;

        let now = Utc::now();
        let mut order = Order {
            id: OrderId::new(),
            order_number: String::new(),
            status: OrderStatus::Pending,
            customer: input.customer,
            shipping_address: input.shipping_address,
            currency: input.total.currency.clone(),
            lines: input.lines,
            subtotal: input.subtotal,
            shipping: input.shipping,
            total: input.total,
            checkout_session_id: None,
            payment_intent_id: None,
            amount_refunded_cents: 0,
            tracking_number: None,
            notes: Vec::new(),
            created_at: now,
            updated_at: now,
            paid_at: None,
        };
        order.push_note(input.note);

        let mut attempt = 0;
        loop {
            attempt += 1;
            order.order_number = generate_order_number(now, &mut rand::thread_rng());
            match self.repo.insert(&order).await {
                Ok(()) => break,
                Err(OrderError::DuplicateOrderNumber(number)) if attempt < MAX_NUMBER_ATTEMPTS => {
                    warn!(order_number = %number, attempt, "[au-04] Order number collision, retrying");
                }
                Err(e) => return Err(e),
            }
        }

        info!(
            order_id = %order.id,
            order_number = %order.order_number,
            total = %order.total,
            items = order.summary().item_count(),
            "[au-04] Pending order created"
        );
        self.publisher
            .publish(StoreEvent::OrderCreated {
                order_id: order.id,
                order_number: order.order_number.clone(),
                total: order.total.clone(),
            })
            .await;
        Ok(order)
    }

    async fn attach_checkout_session(&self, id: OrderId, session_id: &str) -> OrderResult<Order> {
        let _guard = self.write_lock.lock().await;
        let mut order = self.load(id).await?;
        order.checkout_session_id = Some(session_id.to_string());
        order.updated_at = Utc::now();
        self.repo.update(&order).await?;
        Ok(order)
    }

    async fn get(&self, id: OrderId) -> OrderResult<Order> {
        self.load(id).await
    }

    async fn find_by_number(&self, order_number: &str) -> OrderResult<Order> {
        let order_number = order_number.trim().to_ascii_uppercase();
        self.repo
            .find_by_number(&order_number)
            .await?
            .ok_or_else(|| OrderError::NotFound(order_number.clone()))
    }

    async fn find_by_checkout_session(&self, session_id: &str) -> OrderResult<Option<Order>> {
        self.repo.find_by_checkout_session(session_id).await
    }

    async fn find_by_payment_intent(&self, payment_intent: &str) -> OrderResult<Option<Order>> {
        self.repo.find_by_payment_intent(payment_intent).await
    }

    async fn list(&self, query: OrderQuery) -> OrderResult<Page<Order>> {
        let email = match query.email.as_deref().map(str::trim) {
            Some(e) if !e.is_empty() => Some(normalize_email(e)?),
            _ => None,
        };
        let page = PageRequest::new(query.page, query.per_page);
        self.repo.list(query.status, email.as_deref(), page).await
    }

    async fn transition(
        &self,
        id: OrderId,
        to: OrderStatus,
        context: TransitionContext,
    ) -> OrderResult<Order> {
        let (order, from) = {
            let _guard = self.write_lock.lock().await;
            let mut order = self.load(id).await?;
            if !can_transition(order.status, to) {
                return Err(OrderError::InvalidTransition {
                    from: order.status,
                    to,
                });
            }

            if let Some(intent) = context.payment_intent.filter(|p| !p.is_empty()) {
                order.payment_intent_id = Some(intent);
            }
            if let Some(tracking) = context.tracking_number.map(|t| t.trim().to_string()) {
                if !tracking.is_empty() {
                    order.tracking_number = Some(tracking);
                }
            }
            order.push_note(context.note);

            let from = self.persist_status(&mut order, to).await?;
            (order, from)
        };

        self.announce(&order, from).await;
        Ok(order)
    }

    async fn mark_paid(&self, id: OrderId, payment: PaymentDetails) -> OrderResult<StatusUpdate> {
        let update = {
            let _guard = self.write_lock.lock().await;
            let mut order = self.load(id).await?;

            if order.status.is_paid_or_later() {
                return Ok(StatusUpdate::Unchanged(order));
            }
            if !can_transition(order.status, OrderStatus::Paid) {
                return Err(OrderError::InvalidTransition {
                    from: order.status,
                    to: OrderStatus::Paid,
                });
            }

            if let Some(intent) = payment.payment_intent.filter(|p| !p.is_empty()) {
                order.payment_intent_id = Some(intent);
            }
            if let Some(customer) = payment.customer {
                Self::merge_customer(&mut order.customer, customer);
            }

            let from = self.persist_status(&mut order, OrderStatus::Paid).await?;
            StatusUpdate::Changed { order, from }
        };

        self.announce_update(&update).await;
        Ok(update)
    }

    async fn mark_failed(&self, id: OrderId, reason: &str) -> OrderResult<StatusUpdate> {
        let update = {
            let _guard = self.write_lock.lock().await;
            let mut order = self.load(id).await?;
            if order.status != OrderStatus::Pending {
                return Ok(StatusUpdate::Unchanged(order));
            }
            order.push_note(Some(format!("Payment failed: {reason}")));
            let from = self.persist_status(&mut order, OrderStatus::Failed).await?;
            StatusUpdate::Changed { order, from }
        };

        self.announce_update(&update).await;
        Ok(update)
    }

    async fn mark_cancelled(&self, id: OrderId, reason: &str) -> OrderResult<StatusUpdate> {
        let update = {
            let _guard = self.write_lock.lock().await;
            let mut order = self.load(id).await?;
            if !matches!(order.status, OrderStatus::Pending | OrderStatus::Failed) {
                return Ok(StatusUpdate::Unchanged(order));
            }
            order.push_note(Some(format!("Cancelled: {reason}")));
            let from = self.persist_status(&mut order, OrderStatus::Cancelled).await?;
            StatusUpdate::Changed { order, from }
        };

        self.announce_update(&update).await;
        Ok(update)
    }

    async fn record_refund(&self, id: OrderId, amount_cents: i64) -> OrderResult<StatusUpdate> {
        let update = {
            let _guard = self.write_lock.lock().await;
            let order = self.load(id).await?;
            self.apply_refund(order, amount_cents).await?
        };

        self.announce_update(&update).await;
        Ok(update)
    }

    async fn record_refund_total(
        &self,
        id: OrderId,
        cumulative_cents: i64,
    ) -> OrderResult<StatusUpdate> {
        let update = {
            let _guard = self.write_lock.lock().await;
            let order = self.load(id).await?;
            // The increment is taken against the row read under the lock.
            let increment = cumulative_cents.saturating_sub(order.amount_refunded_cents);
            self.apply_refund(order, increment).await?
        };

        self.announce_update(&update).await;
        Ok(update)
    }

    async fn customer_lookup(&self, order_number: &str, email: &str) -> OrderResult<Order> {
        let not_found = || OrderError::NotFound(order_number.trim().to_string());
        let number = order_number.trim().to_ascii_uppercase();
        if !is_valid_order_number(&number) {
            return Err(not_found());
        }
        let email = normalize_email(email).map_err(|_| not_found())?;

        match self.repo.find_by_number(&number).await? {
            Some(order) if order.customer.email.eq_ignore_ascii_case(&email) => Ok(order),
            _ => Err(not_found()),
        }
    }

    async fn has_purchased(&self, email: &str, product_id: ProductId) -> OrderResult<bool> {
        let Ok(email) = normalize_email(email) else {
            return Ok(false);
        };

        let mut page_no = 1;
        loop {
            let page = self
                .repo
                .list(None, Some(&email), PageRequest::new(Some(page_no), Some(MAX_PER_PAGE)))
                .await?;
            // A refunded order returned the goods, so it does not count.
            let found = page.items.iter().any(|o| {
                o.status.is_paid_or_later()
                    && o.status != OrderStatus::Refunded
                    && o.lines.iter().any(|l| l.product_id == product_id)
            });
            if found {
                return Ok(true);
            }
            if u64::from(page_no) >= page.total_pages() {
                return Ok(false);
            }
            page_no += 1;
        }
    }
}

#[cfg(test)]
mod tests;

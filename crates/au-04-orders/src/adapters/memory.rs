//! In-memory order repository

use crate::domain::Order;
use crate::error::{OrderError, OrderResult};
use crate::ports::outbound::OrderRepository;
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{OrderId, OrderStatus, Page, PageRequest};
use std::collections::HashMap;

/// `OrderRepository` over a hash map.
#[derive(Default)]
pub struct InMemoryOrderRepository {
    orders: RwLock<HashMap<OrderId, Order>>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.orders.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.read().is_empty()
    }

    fn find(&self, predicate: impl Fn(&Order) -> bool) -> Option<Order> {
        self.orders.read().values().find(|o| predicate(o)).cloned()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn insert(&self, order: &Order) -> OrderResult<()> {
        let mut orders = self.orders.write();
        if orders
            .values()
            .any(|o| o.order_number == order.order_number)
        {
            return Err(OrderError::DuplicateOrderNumber(order.order_number.clone()));
        }
        orders.insert(order.id, order.clone());
        Ok(())
    }

    async fn update(&self, order: &Order) -> OrderResult<()> {
        let mut orders = self.orders.write();
        match orders.get_mut(&order.id) {
            Some(stored) => {
                *stored = order.clone();
                Ok(())
            }
            None => Err(OrderError::NotFound(order.id.to_string())),
        }
    }

    async fn get(&self, id: OrderId) -> OrderResult<Option<Order>> {
        Ok(self.orders.read().get(&id).cloned())
    }

    async fn find_by_number(&self, order_number: &str) -> OrderResult<Option<Order>> {
        Ok(self.find(|o| o.order_number == order_number))
    }

    async fn find_by_checkout_session(&self, session_id: &str) -> OrderResult<Option<Order>> {
        Ok(self.find(|o| o.checkout_session_id.as_deref() == Some(session_id)))
    }

    async fn find_by_payment_intent(&self, payment_intent: &str) -> OrderResult<Option<Order>> {
        Ok(self.find(|o| o.payment_intent_id.as_deref() == Some(payment_intent)))
    }

    async fn list(
        &self,
        status: Option<OrderStatus>,
        email: Option<&str>,
        page: PageRequest,
    ) -> OrderResult<Page<Order>> {
        let mut matching: Vec<Order> = self
            .orders
            .read()
            .values()
            .filter(|o| status.map_or(true, |s| o.status == s))
            .filter(|o| email.map_or(true, |e| o.customer.email == e))
            .cloned()
            .collect();
        matching.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.order_number.cmp(&a.order_number))
        });
        Ok(page.paginate(matching))
    }
}

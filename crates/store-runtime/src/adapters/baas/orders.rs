//! `OrderRepository` over the `orders` table. Customer, address and lines
//! are JSON columns shaped like their serde form.

use super::client::{BaasClient, BaasError, Query};
use async_trait::async_trait;
use au_04_orders::{Order, OrderError, OrderRepository, OrderResult};
use shared_types::{OrderId, OrderStatus, Page, PageRequest};
use std::sync::Arc;

const ORDERS: &str = "orders";

impl From<BaasError> for OrderError {
    fn from(err: BaasError) -> Self {
        OrderError::Storage(err.to_string())
    }
}

pub struct BaasOrderRepository {
    client: Arc<BaasClient>,
}

impl BaasOrderRepository {
    pub fn new(client: Arc<BaasClient>) -> Self {
        Self { client }
    }

    async fn find(&self, column: &str, value: &str) -> OrderResult<Option<Order>> {
        Ok(self
            .client
            .select_one(ORDERS, Query::new().eq(column, value))
            .await?)
    }
}

#[async_trait]
impl OrderRepository for BaasOrderRepository {
    async fn insert(&self, order: &Order) -> OrderResult<()> {
        match self.client.insert::<_, serde_json::Value>(ORDERS, order).await {
            Ok(_) => Ok(()),
            Err(BaasError::Conflict(_)) => {
                Err(OrderError::DuplicateOrderNumber(order.order_number.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn update(&self, order: &Order) -> OrderResult<()> {
        let updated: Vec<serde_json::Value> = self
            .client
            .update(ORDERS, &Query::new().eq("id", order.id), order)
            .await?;
        if updated.is_empty() {
            return Err(OrderError::NotFound(order.id.to_string()));
        }
        Ok(())
    }

    async fn get(&self, id: OrderId) -> OrderResult<Option<Order>> {
        self.find("id", &id.to_string()).await
    }

    async fn find_by_number(&self, order_number: &str) -> OrderResult<Option<Order>> {
        self.find("order_number", order_number).await
    }

    async fn find_by_checkout_session(&self, session_id: &str) -> OrderResult<Option<Order>> {
        self.find("checkout_session_id", session_id).await
    }

    async fn find_by_payment_intent(&self, payment_intent: &str) -> OrderResult<Option<Order>> {
        self.find("payment_intent_id", payment_intent).await
    }

    async fn list(
        &self,
        status: Option<OrderStatus>,
        email: Option<&str>,
        page: PageRequest,
    ) -> OrderResult<Page<Order>> {
        let mut query = Query::new();
        if let Some(status) = status {
            query = query.eq("status", status.as_str());
        }
        if let Some(email) = email {
            query = query.eq("customer->>email", email);
        }
        let query = query
            .order("created_at.desc")
            .limit(page.per_page as usize)
            .offset(page.offset())
            .exact_count();

        let (items, total) = self.client.select_counted(ORDERS, &query).await?;
        Ok(Page {
            items,
            total,
            page: page.page,
            per_page: page.per_page,
        })
    }
}

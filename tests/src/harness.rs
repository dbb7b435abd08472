//! A whole store in one process, driven through the HTTP router.

use au_01_catalog::{CatalogApi, NewProduct, Product, Visibility};
use au_02_inventory::{InventoryApi, MovementKind, MovementReason, NewMovement};
use au_04_orders::{Order, OrderApi};
use au_05_payments::{sign_payload, FakePaymentProcessor, SIGNATURE_HEADER};
use au_06_notifications::{EmailMessage, OutboxMailer};
use au_09_api_gateway::ApiGatewayService;
use aurelia_store::wiring::{start_handlers, RunningHandlers};
use aurelia_store::{Repositories, StoreConfig, SubsystemContainer};
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use shared_types::{Money, OrderId, ProductId};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tower::ServiceExt;

pub const ADMIN_KEY: &str = "e2e-admin-key-0123456789abcdef";
pub const WEBHOOK_SECRET: &str = "whsec_e2e_flows";
pub const STUDIO: &str = "studio@aurelia.example";
pub const CUSTOMER: &str = "june@example.com";

/// A pending order created through `/api/checkout`.
pub struct Placed {
    pub order_id: OrderId,
    pub order_number: String,
    pub session_id: String,
    pub total_cents: i64,
}

pub struct Store {
    router: Router,
    pub catalog: Arc<dyn CatalogApi>,
    pub inventory: Arc<dyn InventoryApi>,
    pub orders: Arc<dyn OrderApi>,
    pub processor: Arc<FakePaymentProcessor>,
    pub outbox: Arc<OutboxMailer>,
    handlers: Option<RunningHandlers>,
    shutdown_tx: watch::Sender<bool>,
}

fn config() -> StoreConfig {
    let mut config = StoreConfig::default();
    config.store.name = "Aurelia".into();
    config.store.site_url = "https://aurelia.example".into();
    config.admin.api_key = Some(ADMIN_KEY.to_string());
    config.rate_limit.enabled = false;
    config.payments.webhook_secret = Some(WEBHOOK_SECRET.to_string());
    config.email.admin_emails = vec![STUDIO.to_string()];
    config
}

impl Store {
    pub fn start() -> Self {
        let processor = Arc::new(FakePaymentProcessor::new());
        let outbox = Arc::new(OutboxMailer::new());
        let container = SubsystemContainer::with_parts(
            config(),
            Repositories::in_memory(),
            processor.clone(),
            outbox.clone(),
        );

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handlers = start_handlers(&container, shutdown_rx);
        let gateway = ApiGatewayService::new(container.config.gateway(), container.app_state())
            .expect("gateway config");

        Self {
            router: gateway.router(),
            catalog: container.catalog.clone(),
            inventory: container.inventory.clone(),
            orders: container.orders.clone(),
            processor,
            outbox,
            handlers: Some(handlers),
            shutdown_tx,
        }
    }

    pub async fn stop(mut self) {
        self.shutdown_tx.send_replace(true);
        if let Some(handlers) = self.handlers.take() {
            handlers.join(Duration::from_secs(1)).await;
        }
    }

    // -------------------------------------------------------------------------
    // HTTP
    // -------------------------------------------------------------------------

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .method(Method::POST)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn admin(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {ADMIN_KEY}"));
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    pub async fn webhook(&self, payload: Value) -> (StatusCode, Value) {
        let payload = payload.to_string();
        let signature = sign_payload(
            payload.as_bytes(),
            WEBHOOK_SECRET,
            chrono::Utc::now().timestamp(),
        )
        .unwrap();
        self.send(
            Request::builder()
                .method(Method::POST)
                .uri("/api/webhooks/payments")
                .header(SIGNATURE_HEADER, signature)
                .body(Body::from(payload))
                .unwrap(),
        )
        .await
    }

    // -------------------------------------------------------------------------
    // Fixtures
    // -------------------------------------------------------------------------

    pub async fn seed_product(&self, name: &str, price: i64, stock: i64) -> Product {
        self.seed(NewProduct::named(name, Money::usd(price)), stock)
            .await
    }

    pub async fn seed(&self, input: NewProduct, stock: i64) -> Product {
        let product = self.catalog.create_product(input).await.unwrap();
        if stock > 0 {
            self.inventory
                .record_movement(NewMovement {
                    product_id: product.id,
                    kind: MovementKind::In,
                    quantity: stock,
                    reason: MovementReason::Restock,
                    reference: None,
                    note: None,
                    created_by: Some("e2e".into()),
                })
                .await
                .unwrap();
        }
        product
    }

    pub async fn checkout(&self, product_id: ProductId, quantity: u32) -> Placed {
        let (status, body) = self
            .post(
                "/api/checkout",
                json!({
                    "customer": { "email": "June@Example.com", "name": "June Park" },
                    "shipping_address": {
                        "line1": "88 Harbor St",
                        "city": "Seattle",
                        "postal_code": "98101",
                        "country": "US"
                    },
                    "lines": [{ "product_id": product_id, "quantity": quantity }]
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");

        let order_id: OrderId = body["order_id"].as_str().unwrap().parse().unwrap();
        let (session, _) = self.processor.last_session().unwrap();
        let order = self.order(order_id).await;
        Placed {
            order_id,
            order_number: body["order_number"].as_str().unwrap().to_string(),
            session_id: session.id,
            total_cents: order.total.amount_cents,
        }
    }

    /// Deliver `checkout.session.completed` for `placed`, capturing `amount`.
    pub async fn pay(&self, placed: &Placed, amount: i64) -> (StatusCode, Value) {
        self.webhook(json!({
            "id": format!("evt_paid_{}", placed.session_id),
            "type": "checkout.session.completed",
            "created": chrono::Utc::now().timestamp(),
            "data": { "object": {
                "id": placed.session_id,
                "client_reference_id": placed.order_id.to_string(),
                "metadata": { "order_id": placed.order_id.to_string() },
                "payment_status": "paid",
                "payment_intent": format!("pi_{}", placed.session_id),
                "amount_total": amount,
                "currency": "usd",
            }},
        }))
        .await
    }

    /// Deliver `charge.refunded` with a cumulative refunded amount.
    pub async fn charge_refunded(&self, placed: &Placed, refunded: i64) -> (StatusCode, Value) {
        self.webhook(json!({
            "id": format!("evt_refund_{}_{refunded}", placed.session_id),
            "type": "charge.refunded",
            "created": chrono::Utc::now().timestamp(),
            "data": { "object": {
                "id": format!("ch_{}", placed.session_id),
                "payment_intent": format!("pi_{}", placed.session_id),
                "amount_refunded": refunded,
                "metadata": { "order_id": placed.order_id.to_string() },
            }},
        }))
        .await
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    pub async fn order(&self, id: OrderId) -> Order {
        self.orders.get(id).await.unwrap()
    }

    pub async fn stock(&self, id: ProductId) -> i64 {
        self.inventory.stock_level(id).await.unwrap()
    }

    pub async fn projected_stock(&self, id: ProductId) -> i64 {
        self.catalog
            .get_product(id, Visibility::Admin)
            .await
            .unwrap()
            .stock
    }

    pub fn mail_to(&self, recipient: &str) -> Vec<EmailMessage> {
        self.outbox.sent_to(recipient)
    }

    pub fn subjects_to(&self, recipient: &str) -> Vec<String> {
        self.mail_to(recipient)
            .into_iter()
            .map(|m| m.subject)
            .collect()
    }
}

/// Poll `check` until it holds. Handlers run on their own tasks, so effects
/// of a request land shortly after the response.
pub async fn eventually<F, Fut>(what: &str, mut check: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    for _ in 0..200 {
        if check().await {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("timed out waiting for {what}");
}

/// Give handlers a moment, for assertions that something did NOT happen.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}

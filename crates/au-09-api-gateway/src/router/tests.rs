use super::*;
use crate::domain::config::GatewayConfig;
use crate::middleware::GatewayMetrics;
use crate::test_support::{Services, WEBHOOK_SECRET};
use au_01_catalog::{CatalogApi, NewProduct, Product};
use au_02_inventory::{InventoryApi, MovementKind, MovementReason, NewMovement};
use au_04_orders::OrderApi;
use au_05_payments::{sign_payload, FakePaymentProcessor, SIGNATURE_HEADER};
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use serde_json::{json, Value};
use shared_bus::InMemoryEventBus;
use shared_types::{Money, OrderId, OrderStatus, ProductId};
use tower::ServiceExt;

const ADMIN_KEY: &str = "test-admin-key-0123456789abcdef";

// =============================================================================
// Harness
// =============================================================================

struct TestApp {
    router: Router,
    catalog: Arc<dyn CatalogApi>,
    inventory: Arc<dyn InventoryApi>,
    orders: Arc<dyn OrderApi>,
    processor: Arc<FakePaymentProcessor>,
    metrics: Arc<GatewayMetrics>,
    _bus: Arc<InMemoryEventBus>,
}

fn test_config() -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.admin.api_key = Some(ADMIN_KEY.to_string());
    config.rate_limit.enabled = false;
    config
}

impl TestApp {
    fn new() -> Self {
        Self::with_config(test_config())
    }

    fn with_config(config: GatewayConfig) -> Self {
        let services = Services::new();
        let rate_limit = Arc::new(RateLimitState::new(config.rate_limit.clone()));
        let router = build_router(services.state, &config, rate_limit);

        Self {
            router,
            catalog: services.catalog,
            inventory: services.inventory,
            orders: services.orders,
            processor: services.processor,
            metrics: services.metrics,
            _bus: services.bus,
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
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

    async fn seed_product(&self, name: &str, price: i64, stock: i64) -> Product {
        let product = self
            .catalog
            .create_product(NewProduct::named(name, Money::usd(price)))
            .await
            .unwrap();
        if stock > 0 {
            self.inventory
                .record_movement(NewMovement {
                    product_id: product.id,
                    kind: MovementKind::In,
                    quantity: stock,
                    reason: MovementReason::Restock,
                    reference: None,
                    note: None,
                    created_by: None,
                })
                .await
                .unwrap();
        }
        product
    }

    /// Checkout `quantity` of a fresh product: (order id, order number, product id).
    async fn checkout(&self, price: i64, quantity: u32) -> (OrderId, String, ProductId) {
        let product = self.seed_product("Gold Hoops", price, 10).await;
        let (status, body) = self
            .send(post_json(
                "/api/checkout",
                checkout_body(product.id, quantity),
            ))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        let order_id: OrderId = body["order_id"].as_str().unwrap().parse().unwrap();
        let number = body["order_number"].as_str().unwrap().to_string();
        (order_id, number, product.id)
    }

    /// Deliver a signed `checkout.session.completed` for the last session.
    async fn complete_payment(&self, order_id: OrderId, amount: i64) -> (StatusCode, Value) {
        let (session, _) = self.processor.last_session().unwrap();
        let payload = json!({
            "id": format!("evt_{}", session.id),
            "type": "checkout.session.completed",
            "created": chrono::Utc::now().timestamp(),
            "data": { "object": {
                "id": session.id,
                "client_reference_id": order_id.to_string(),
                "metadata": { "order_id": order_id.to_string() },
                "payment_status": "paid",
                "payment_intent": "pi_gateway_1",
                "amount_total": amount,
                "currency": "usd",
            }},
        })
        .to_string();
        self.send(signed_webhook(&payload)).await
    }
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn admin(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {ADMIN_KEY}"));
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

fn signed_webhook(payload: &str) -> Request<Body> {
    let signature = sign_payload(
        payload.as_bytes(),
        WEBHOOK_SECRET,
        chrono::Utc::now().timestamp(),
    )
    .unwrap();
    Request::builder()
        .method(Method::POST)
        .uri("/api/webhooks/payments")
        .header(SIGNATURE_HEADER, signature)
        .body(Body::from(payload.to_string()))
        .unwrap()
}

fn checkout_body(product_id: ProductId, quantity: u32) -> Value {
    json!({
        "customer": { "email": "June@Example.com", "name": "June Park" },
        "shipping_address": {
            "line1": "88 Harbor St",
            "city": "Seattle",
            "postal_code": "98101",
            "country": "US"
        },
        "lines": [{ "product_id": product_id, "quantity": quantity }]
    })
}

// =============================================================================
// Health and fallbacks
// =============================================================================

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::new();
    let (status, body) = app.send(get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "aurelia-store");
}

#[tokio::test]
async fn test_unknown_route_uses_error_envelope() {
    let app = TestApp::new();
    let (status, body) = app.send(get("/api/nothing-here")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");
}

// =============================================================================
// Storefront catalog
// =============================================================================

#[tokio::test]
async fn test_storefront_lists_only_active_products() {
    let app = TestApp::new();
    app.seed_product("Gold Hoops", 4_500, 5).await;
    let mut hidden = NewProduct::named("Prototype Ring", Money::usd(9_900));
    hidden.is_active = false;
    app.catalog.create_product(hidden).await.unwrap();

    let (status, body) = app.send(get("/api/products")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["name"], "Gold Hoops");

    let (status, body) = app
        .send(admin(Method::GET, "/api/admin/products", None))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
}

#[tokio::test]
async fn test_product_by_slug() {
    let app = TestApp::new();
    let product = app.seed_product("Pearl Drop Earrings", 12_000, 2).await;

    let (status, body) = app
        .send(get(&format!("/api/products/{}", product.slug)))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], product.id.to_string());

    let (status, body) = app.send(get("/api/products/no-such-piece")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");
}

#[tokio::test]
async fn test_archived_product_hidden_from_storefront() {
    let app = TestApp::new();
    let product = app.seed_product("Onyx Signet", 15_000, 1).await;

    let (status, _) = app
        .send(admin(
            Method::DELETE,
            &format!("/api/admin/products/{}", product.id),
            None,
        ))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app
        .send(get(&format!("/api/products/{}", product.slug)))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .send(admin(
            Method::GET,
            &format!("/api/admin/products/{}", product.id),
            None,
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_active"], false);
}

// =============================================================================
// Cart and checkout
// =============================================================================

#[tokio::test]
async fn test_quote_prices_on_server() {
    let app = TestApp::new();
    let product = app.seed_product("Gold Hoops", 4_500, 5).await;

    let (status, body) = app
        .send(post_json(
            "/api/cart/quote",
            json!({ "lines": [{ "product_id": product.id, "quantity": 2 }] }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["subtotal"]["amount_cents"], 9_000);
    assert_eq!(body["shipping"]["amount_cents"], 1_000);
    assert_eq!(body["total"]["amount_cents"], 10_000);
}

#[tokio::test]
async fn test_quote_unknown_product_is_404() {
    let app = TestApp::new();
    let (status, body) = app
        .send(post_json(
            "/api/cart/quote",
            json!({ "lines": [{ "product_id": ProductId::new(), "quantity": 1 }] }),
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");
}

#[tokio::test]
async fn test_checkout_over_stock_is_conflict() {
    let app = TestApp::new();
    let product = app.seed_product("Gold Hoops", 4_500, 1).await;
    let (status, body) = app
        .send(post_json("/api/checkout", checkout_body(product.id, 3)))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "conflict");
    assert!(app.processor.sessions().is_empty());
}

#[tokio::test]
async fn test_malformed_json_is_validation_error() {
    let app = TestApp::new();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/checkout")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"customer\": "))
        .unwrap();
    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "validation_error");
}

#[tokio::test]
async fn test_checkout_then_webhook_marks_order_paid() {
    let app = TestApp::new();
    let (order_id, number, _) = app.checkout(4_500, 2).await;

    let order = app.orders.get(order_id).await.unwrap();
    assert_eq!(order.status, OrderStatus::Pending);

    let (status, body) = app.complete_payment(order_id, 10_000).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["received"], true);
    assert_eq!(body["outcome"], "reconciled");

    let order = app.orders.get(order_id).await.unwrap();
    assert_eq!(order.status, OrderStatus::Paid);
    assert_eq!(order.payment_intent_id.as_deref(), Some("pi_gateway_1"));

    // Redelivery is acknowledged without changing anything.
    let (status, body) = app.complete_payment(order_id, 10_000).await;
    assert_eq!(status, StatusCode::OK);
    assert_ne!(body["outcome"], "reconciled");

    let (status, body) = app
        .send(get(&format!(
            "/api/orders/lookup?number={number}&email=june@example.com"
        )))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "paid");
    assert!(body.get("customer").is_none());

    let metrics = app.metrics.to_json();
    assert_eq!(metrics["webhooks"]["processed"], 2);
}

// =============================================================================
// Webhooks
// =============================================================================

#[tokio::test]
async fn test_webhook_without_signature_rejected() {
    let app = TestApp::new();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/webhooks/payments")
        .body(Body::from("{}"))
        .unwrap();
    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "validation_error");
    assert_eq!(app.metrics.to_json()["webhooks"]["rejected"], 1);
}

#[tokio::test]
async fn test_webhook_with_bad_signature_rejected() {
    let app = TestApp::new();
    let payload = json!({ "id": "evt_1", "type": "checkout.session.completed" }).to_string();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/webhooks/payments")
        .header(SIGNATURE_HEADER, "t=1,v1=deadbeef")
        .body(Body::from(payload))
        .unwrap();
    let (status, _) = app.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_webhook_for_unknown_order_acknowledged() {
    let app = TestApp::new();
    let payload = json!({
        "id": "evt_orphan",
        "type": "checkout.session.completed",
        "created": chrono::Utc::now().timestamp(),
        "data": { "object": {
            "id": "cs_unknown",
            "payment_status": "paid",
            "payment_intent": "pi_orphan",
            "amount_total": 500,
            "currency": "usd",
        }},
    })
    .to_string();
    let (status, body) = app.send(signed_webhook(&payload)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "order_not_found");
}

// =============================================================================
// Order lookup
// =============================================================================

#[tokio::test]
async fn test_order_lookup_requires_matching_email() {
    let app = TestApp::new();
    let (_, number, _) = app.checkout(4_500, 1).await;

    let (status, body) = app
        .send(get(&format!(
            "/api/orders/lookup?number={number}&email=someone@else.com"
        )))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");

    let (status, _) = app.send(get("/api/orders/lookup?number=AU-1")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Admin
// =============================================================================

#[tokio::test]
async fn test_admin_requires_api_key() {
    let app = TestApp::new();

    let response = app
        .router
        .clone()
        .oneshot(get("/api/admin/orders"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().contains_key(header::WWW_AUTHENTICATE));

    let wrong = Request::builder()
        .uri("/api/admin/orders")
        .header("x-api-key", "not-the-key")
        .body(Body::empty())
        .unwrap();
    let (status, _) = app.send(wrong).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let via_header = Request::builder()
        .uri("/api/admin/orders")
        .header("x-api-key", ADMIN_KEY)
        .body(Body::empty())
        .unwrap();
    let (status, _) = app.send(via_header).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .send(admin(Method::GET, "/api/admin/orders", None))
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_admin_locked_without_configured_key() {
    let mut config = test_config();
    config.admin.api_key = None;
    let app = TestApp::with_config(config);
    let (status, _) = app
        .send(admin(Method::GET, "/api/admin/orders", None))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_invalid_transition_is_conflict() {
    let app = TestApp::new();
    let (order_id, _, _) = app.checkout(4_500, 1).await;

    let (status, body) = app
        .send(admin(
            Method::POST,
            &format!("/api/admin/orders/{order_id}/status"),
            Some(json!({ "status": "delivered" })),
        ))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "conflict");
}

#[tokio::test]
async fn test_admin_ships_paid_order_with_tracking() {
    let app = TestApp::new();
    let (order_id, _, _) = app.checkout(4_500, 1).await;
    app.complete_payment(order_id, 5_500).await;

    let (status, body) = app
        .send(admin(
            Method::POST,
            &format!("/api/admin/orders/{order_id}/status"),
            Some(json!({ "status": "shipped", "tracking_number": "1Z999" })),
        ))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["status"], "shipped");
    assert_eq!(body["tracking_number"], "1Z999");
}

#[tokio::test]
async fn test_admin_refund_with_empty_body_refunds_everything() {
    let app = TestApp::new();
    let (order_id, _, _) = app.checkout(4_500, 1).await;
    app.complete_payment(order_id, 5_500).await;

    let (status, body) = app
        .send(admin(
            Method::POST,
            &format!("/api/admin/orders/{order_id}/refund"),
            None,
        ))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(app.processor.refunds(), vec![("pi_gateway_1".to_string(), None)]);

    let request = Request::builder()
        .method(Method::POST)
        .uri(format!("/api/admin/orders/{order_id}/refund"))
        .header(header::AUTHORIZATION, format!("Bearer {ADMIN_KEY}"))
        .body(Body::from("{not json"))
        .unwrap();
    let (status, _) = app.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_refund_of_unpaid_order_is_conflict() {
    let app = TestApp::new();
    let (order_id, _, _) = app.checkout(4_500, 1).await;
    let (status, _) = app
        .send(admin(
            Method::POST,
            &format!("/api/admin/orders/{order_id}/refund"),
            Some(json!({ "amount_cents": 100 })),
        ))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_admin_stock_endpoints() {
    let app = TestApp::new();
    let product = app.seed_product("Garnet Studs", 3_000, 5).await;

    let (status, body) = app
        .send(admin(
            Method::POST,
            "/api/admin/stock/movements",
            Some(json!({
                "product_id": product.id,
                "kind": "out",
                "quantity": 3,
                "reason": "damaged",
                "note": "clasp broken"
            })),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");

    let (status, body) = app
        .send(admin(
            Method::GET,
            &format!("/api/admin/stock/{}", product.id),
            None,
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["level"], 2);

    let (status, body) = app
        .send(admin(Method::GET, "/api/admin/stock/low", None))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["product_id"], product.id.to_string());

    let (status, body) = app
        .send(admin(
            Method::GET,
            &format!("/api/admin/stock/{}/movements?limit=1", product.id),
            None,
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(1));

    let (status, body) = app
        .send(admin(
            Method::POST,
            "/api/admin/stock/movements",
            Some(json!({
                "product_id": product.id,
                "kind": "out",
                "quantity": 10,
                "reason": "damaged"
            })),
        ))
        .await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");
}

// =============================================================================
// Newsletter and reviews
// =============================================================================

#[tokio::test]
async fn test_newsletter_subscribe_is_idempotent() {
    let app = TestApp::new();
    let body = json!({ "email": "Ada@Example.com" });

    let (status, first) = app
        .send(post_json("/api/newsletter/subscribe", body.clone()))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["status"], "subscribed");
    assert_eq!(first["email"], "ada@example.com");
    assert!(first.get("token").is_none());

    let (status, second) = app.send(post_json("/api/newsletter/subscribe", body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["status"], "already_subscribed");

    let (status, listing) = app
        .send(admin(Method::GET, "/api/admin/newsletter/subscribers", None))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing["active_count"], 1);
    assert!(listing["subscribers"]["items"][0].get("token").is_none());

    let (status, _) = app
        .send(post_json(
            "/api/newsletter/unsubscribe",
            json!({ "token": "no-such-token" }),
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_review_moderation_flow() {
    let app = TestApp::new();
    let (order_id, _, product_id) = app.checkout(4_500, 1).await;
    app.complete_payment(order_id, 5_500).await;

    let (status, body) = app
        .send(post_json(
            &format!("/api/products/{product_id}/reviews"),
            json!({
                "author_name": "June",
                "author_email": "june@example.com",
                "rating": 5,
                "title": "Lovely",
                "body": "Wear them every day."
            }),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["status"], "pending_moderation");
    assert_eq!(body["review"]["verified_purchase"], true);
    assert!(body["review"].get("author_email").is_none());
    let review_id = body["review"]["id"].as_str().unwrap().to_string();

    let (_, listing) = app
        .send(get(&format!("/api/products/{product_id}/reviews")))
        .await;
    assert_eq!(listing["summary"]["count"], 0);
    assert_eq!(listing["reviews"]["total"], 0);

    let (status, _) = app
        .send(admin(
            Method::POST,
            &format!("/api/admin/reviews/{review_id}/approve"),
            None,
        ))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, listing) = app
        .send(get(&format!("/api/products/{product_id}/reviews")))
        .await;
    assert_eq!(listing["summary"]["count"], 1);
    assert_eq!(listing["reviews"]["items"][0]["rating"], 5);
}

#[tokio::test]
async fn test_review_rating_out_of_range_rejected() {
    let app = TestApp::new();
    let product = app.seed_product("Gold Hoops", 4_500, 1).await;
    let (status, body) = app
        .send(post_json(
            &format!("/api/products/{}/reviews", product.slug),
            json!({
                "author_name": "June",
                "author_email": "june@example.com",
                "rating": 6
            }),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "validation_error");
}

// =============================================================================
// Middleware behaviour through the full stack
// =============================================================================

#[tokio::test]
async fn test_oversized_body_rejected() {
    let mut config = test_config();
    config.limits.max_request_size = 64;
    let app = TestApp::with_config(config);

    let (status, body) = app
        .send(post_json(
            "/api/newsletter/subscribe",
            json!({ "email": format!("{}@example.com", "a".repeat(100)) }),
        ))
        .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["error"]["code"], "payload_too_large");
}

#[tokio::test]
async fn test_rate_limit_returns_429_with_retry_after() {
    let mut config = test_config();
    config.rate_limit.enabled = true;
    config.rate_limit.whitelist.clear();
    config.rate_limit.requests_per_second = 1;
    config.rate_limit.burst_size = 1;
    let app = TestApp::with_config(config);

    let request = || {
        Request::builder()
            .uri("/api/categories")
            .header("x-forwarded-for", "203.0.113.9")
            .body(Body::empty())
            .unwrap()
    };

    let first = app.router.clone().oneshot(request()).await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = app.router.clone().oneshot(request()).await.unwrap();
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(second.headers().contains_key(header::RETRY_AFTER));

    // Health checks bypass the bucket.
    let health = Request::builder()
        .uri("/health")
        .header("x-forwarded-for", "203.0.113.9")
        .body(Body::empty())
        .unwrap();
    let (status, _) = app.send(health).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(app.metrics.to_json()["rate_limiting"]["rejected"], 1);
}

#[tokio::test]
async fn test_request_metrics_recorded() {
    let app = TestApp::new();
    app.send(get("/health")).await;
    app.send(get("/api/products/missing")).await;

    let metrics = app.metrics.to_json();
    assert_eq!(metrics["requests"]["total"], 2);
    assert_eq!(metrics["requests"]["error"], 1);
}

//! Repository adapters against a stub PostgREST server.
//!
//! The stub keeps JSON rows per table and understands the operators the
//! adapters send (`eq`, `lte`, `in`, `cs`, `->>` paths, paging and
//! `count=exact`). Unique columns answer 409 with Postgres code 23505.

use super::*;
use au_01_catalog::{CatalogApi, CatalogError, CatalogService, NewProduct, ProductQuery, Visibility};
use au_02_inventory::{
    FixedThreshold, InventoryApi, InventoryConfig, InventoryService, MovementKind,
    MovementReason, NewMovement,
};
use au_04_orders::{NewOrder, OrderApi, OrderError, OrderQuery, OrderRepository, OrderService};
use au_07_newsletter::{NewsletterApi, NewsletterService, SubscribeOutcome};
use au_08_reviews::{NewReview, ReviewApi, ReviewError, ReviewService};
use axum::body::Bytes;
use axum::extract::{Path, Query as QueryParams, State};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::{Json, Router};
use serde_json::{json, Value};
use shared_bus::InMemoryEventBus;
use shared_types::{Address, CustomerInfo, Money, OrderLine, ProductId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const SERVICE_KEY: &str = "service-role-test-key";

#[derive(Clone, Default)]
struct Stub {
    tables: Arc<Mutex<HashMap<String, Vec<Value>>>>,
}

fn unique_columns(table: &str) -> Vec<Vec<&'static str>> {
    match table {
        "stock_levels" => vec![vec!["product_id"]],
        "orders" => vec![vec!["id"], vec!["order_number"]],
        "newsletter_subscribers" => vec![vec!["id"], vec!["email"]],
        "product_reviews" => vec![vec!["id"], vec!["product_id", "author_email"]],
        _ => vec![vec!["id"]],
    }
}

fn field<'a>(row: &'a Value, column: &str) -> Option<&'a Value> {
    match column.split_once("->>") {
        Some((outer, inner)) => row.get(outer)?.get(inner),
        None => row.get(column),
    }
}

fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn matches(row: &Value, column: &str, condition: &str) -> bool {
    let Some((op, operand)) = condition.split_once('.') else {
        return false;
    };
    let value = field(row, column).cloned().unwrap_or(Value::Null);
    match op {
        "eq" => text(&value) == operand,
        "lte" => value.as_f64().zip(operand.parse::<f64>().ok()).is_some_and(|(v, o)| v <= o),
        "gte" => value.as_f64().zip(operand.parse::<f64>().ok()).is_some_and(|(v, o)| v >= o),
        "in" => operand
            .trim_start_matches('(')
            .trim_end_matches(')')
            .split(',')
            .map(|s| s.trim_matches('"'))
            .any(|candidate| text(&value) == candidate),
        "cs" => {
            let wanted: Vec<Value> = serde_json::from_str(operand).unwrap_or_default();
            let have = value.as_array().cloned().unwrap_or_default();
            wanted.iter().all(|w| have.contains(w))
        }
        _ => false,
    }
}

fn same_key(a: &Value, b: &Value, columns: &[&str]) -> bool {
    columns.iter().all(|c| field(a, c) == field(b, c))
}

fn conflict() -> Response {
    (
        StatusCode::CONFLICT,
        Json(json!({ "code": "23505", "message": "duplicate key value" })),
    )
        .into_response()
}

async fn handle(
    State(stub): State<Stub>,
    method: Method,
    Path(table): Path<String>,
    QueryParams(params): QueryParams<Vec<(String, String)>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let authorized = headers.get("apikey").and_then(|v| v.to_str().ok()) == Some(SERVICE_KEY)
        && headers.get("authorization").and_then(|v| v.to_str().ok())
            == Some(format!("Bearer {SERVICE_KEY}").as_str());
    if !authorized {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Invalid API key" })),
        )
            .into_response();
    }

    let prefer = headers
        .get("prefer")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let mut limit = None;
    let mut offset = 0usize;
    let mut filters = Vec::new();
    for (key, value) in params {
        match key.as_str() {
            "limit" => limit = value.parse::<usize>().ok(),
            "offset" => offset = value.parse().unwrap_or(0),
            "select" | "order" => {}
            _ => filters.push((key, value)),
        }
    }
    let selected = |row: &Value| filters.iter().all(|(c, cond)| matches(row, c, cond));

    let mut tables = stub.tables.lock().unwrap();
    let rows = tables.entry(table.clone()).or_default();

    match method {
        Method::GET => {
            let matched: Vec<Value> = rows.iter().filter(|r| selected(r)).cloned().collect();
            let total = matched.len();
            let page: Vec<Value> = matched
                .into_iter()
                .skip(offset)
                .take(limit.unwrap_or(usize::MAX))
                .collect();
            let mut response = Json(page).into_response();
            if prefer.contains("count=exact") {
                response.headers_mut().insert(
                    "content-range",
                    HeaderValue::from_str(&format!("0-0/{total}")).unwrap(),
                );
            }
            response
        }
        Method::POST => {
            let incoming: Value = serde_json::from_slice(&body).unwrap();
            let incoming = match incoming {
                Value::Array(items) => items,
                single => vec![single],
            };
            let upsert = prefer.contains("merge-duplicates");
            for row in &incoming {
                let keys = unique_columns(&table);
                let existing = rows
                    .iter()
                    .position(|r| keys.iter().any(|k| same_key(r, row, k)));
                match (existing, upsert) {
                    (Some(i), true) => rows[i] = row.clone(),
                    (Some(_), false) => return conflict(),
                    (None, _) => rows.push(row.clone()),
                }
            }
            (StatusCode::CREATED, Json(incoming)).into_response()
        }
        Method::PATCH => {
            let patch: Value = serde_json::from_slice(&body).unwrap();
            let mut updated = Vec::new();
            for row in rows.iter_mut().filter(|r| selected(r)) {
                if let (Some(target), Some(fields)) = (row.as_object_mut(), patch.as_object()) {
                    for (k, v) in fields {
                        target.insert(k.clone(), v.clone());
                    }
                }
                updated.push(row.clone());
            }
            Json(updated).into_response()
        }
        Method::DELETE => {
            let (removed, kept): (Vec<Value>, Vec<Value>) =
                rows.drain(..).partition(|r| selected(r));
            *rows = kept;
            Json(removed).into_response()
        }
        _ => StatusCode::METHOD_NOT_ALLOWED.into_response(),
    }
}

async fn spawn_stub() -> String {
    let app = Router::new()
        .route("/rest/v1/:table", any(handle))
        .with_state(Stub::default());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    format!("http://{addr}")
}

async fn client_with_key(key: &str) -> Arc<BaasClient> {
    let url = spawn_stub().await;
    Arc::new(
        BaasClient::new(BaasClientConfig {
            url,
            service_key: key.to_string(),
            timeout: Duration::from_secs(5),
        })
        .unwrap(),
    )
}

async fn client() -> Arc<BaasClient> {
    client_with_key(SERVICE_KEY).await
}

fn new_order(email: &str, product_id: ProductId) -> NewOrder {
    NewOrder {
        customer: CustomerInfo {
            email: email.into(),
            name: "Ines Marlow".into(),
            phone: None,
        },
        shipping_address: Address {
            line1: "4 Quay Street".into(),
            line2: None,
            city: "Bristol".into(),
            state: None,
            postal_code: "BS1 4DJ".into(),
            country: "GB".into(),
        },
        lines: vec![OrderLine {
            product_id,
            name: "Pearl Drop Earrings".into(),
            sku: Some("ER-118".into()),
            unit_price: Money::usd(6_500),
            quantity: 1,
        }],
        subtotal: Money::usd(6_500),
        shipping: Money::usd(1_000),
        total: Money::usd(7_500),
        note: None,
    }
}

#[tokio::test]
async fn test_wrong_service_key_rejected() {
    let client = client_with_key("not-the-key").await;
    let err = client
        .select::<Value>("products", &Query::new())
        .await
        .unwrap_err();
    assert!(matches!(err, BaasError::Status { status: 401, .. }));
}

#[tokio::test]
async fn test_catalog_service_on_baas() {
    let catalog = CatalogService::new(Arc::new(BaasCatalogRepository::new(client().await)));

    let product = catalog
        .create_product(NewProduct::named("Gold Hoop Earrings", Money::usd(12_000)))
        .await
        .unwrap();
    let mut hidden = NewProduct::named("Draft Bangle", Money::usd(8_000));
    hidden.is_active = false;
    catalog.create_product(hidden).await.unwrap();

    let by_slug = catalog
        .get_product_by_slug("gold-hoop-earrings", Visibility::Public)
        .await
        .unwrap();
    assert_eq!(by_slug.id, product.id);

    let public = catalog
        .list_products(ProductQuery::default(), Visibility::Public)
        .await
        .unwrap();
    assert_eq!(public.total, 1);

    catalog.set_product_stock(product.id, 4).await.unwrap();
    let stored = catalog
        .get_product(product.id, Visibility::Admin)
        .await
        .unwrap();
    assert_eq!(stored.stock, 4);

    catalog.delete_product(product.id, false).await.unwrap();
    assert!(matches!(
        catalog.get_product(product.id, Visibility::Admin).await,
        Err(CatalogError::ProductNotFound(_))
    ));
}

#[tokio::test]
async fn test_ledger_on_baas() {
    let inventory = InventoryService::new(
        InventoryConfig::default(),
        Arc::new(BaasLedgerRepository::new(client().await)),
        Arc::new(FixedThreshold(3)),
        Arc::new(InMemoryEventBus::new()),
    );
    let product = ProductId::new();
    let untouched = ProductId::new();

    let movement = |kind, quantity, reason| NewMovement {
        product_id: product,
        kind,
        quantity,
        reason,
        reference: None,
        note: None,
        created_by: Some("ops@aurelia.example".into()),
    };
    inventory
        .record_movement(movement(MovementKind::In, 5, MovementReason::Restock))
        .await
        .unwrap();
    inventory
        .record_movement(movement(MovementKind::Out, 2, MovementReason::Damaged))
        .await
        .unwrap();

    assert_eq!(inventory.stock_level(product).await.unwrap(), 3);
    let levels = inventory.stock_levels(&[product, untouched]).await.unwrap();
    assert_eq!(levels[0].level, 3);
    assert_eq!(levels[1].level, 0);
    assert_eq!(inventory.movements(product, 10).await.unwrap().len(), 2);

    let low = inventory.low_stock(3).await.unwrap();
    assert!(low.iter().any(|l| l.product_id == product));

    let report = inventory.recompute(product).await.unwrap();
    assert_eq!(report.recomputed, 3);
    assert!(!report.drifted());
}

#[tokio::test]
async fn test_order_service_on_baas() {
    let repo = Arc::new(BaasOrderRepository::new(client().await));
    let orders = OrderService::new(repo.clone(), Arc::new(InMemoryEventBus::new()));
    let product = ProductId::new();

    let order = orders
        .create_pending(new_order("ines@example.com", product))
        .await
        .unwrap();
    assert_eq!(
        orders.find_by_number(&order.order_number).await.unwrap().id,
        order.id
    );

    orders
        .attach_checkout_session(order.id, "cs_test_baas")
        .await
        .unwrap();
    let found = orders
        .find_by_checkout_session("cs_test_baas")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, order.id);

    let listed = orders
        .list(OrderQuery {
            email: Some("ines@example.com".into()),
            ..OrderQuery::default()
        })
        .await
        .unwrap();
    assert_eq!(listed.total, 1);

    assert!(matches!(
        repo.insert(&found).await,
        Err(OrderError::DuplicateOrderNumber(_))
    ));
}

#[tokio::test]
async fn test_newsletter_service_on_baas() {
    let newsletter = NewsletterService::new(
        Arc::new(BaasSubscriberRepository::new(client().await)),
        Arc::new(InMemoryEventBus::new()),
    );

    let first = newsletter
        .subscribe("Mara@Example.com", Some("footer"))
        .await
        .unwrap();
    assert!(matches!(first, SubscribeOutcome::Subscribed(_)));
    let again = newsletter
        .subscribe("mara@example.com", None)
        .await
        .unwrap();
    assert!(matches!(again, SubscribeOutcome::AlreadySubscribed(_)));
    assert_eq!(newsletter.count_active().await.unwrap(), 1);
}

#[tokio::test]
async fn test_review_service_on_baas() {
    let reviews = ReviewService::new(
        Arc::new(BaasReviewRepository::new(client().await)),
        Arc::new(InMemoryEventBus::new()),
    );
    let product = ProductId::new();
    let input = NewReview {
        product_id: product,
        author_name: "Ines".into(),
        author_email: "ines@example.com".into(),
        rating: 4,
        title: "Lovely shine".into(),
        body: "Wore them to a wedding.".into(),
    };

    let review = reviews.submit(input.clone(), true).await.unwrap();
    assert!(matches!(
        reviews.submit(input, true).await,
        Err(ReviewError::AlreadyReviewed { .. })
    ));

    assert_eq!(reviews.summary(product).await.unwrap().count, 0);
    reviews.approve(review.id).await.unwrap();
    assert_eq!(reviews.summary(product).await.unwrap().count, 1);
}

//! Back-office endpoints. Mounted under `/api/admin` behind [`AuthLayer`].
//!
//! [`AuthLayer`]: crate::middleware::AuthLayer

use crate::domain::error::{ApiError, ApiResult};
use crate::routes::extract::{ApiJson, ApiPath, ApiQuery};
use crate::routes::storefront::PageParams;
use crate::state::AppState;
use au_01_catalog::{
    Category, CategoryPatch, Collection, CollectionPatch, NewCategory, NewCollection, NewProduct,
    Product, ProductPatch, ProductQuery, Visibility,
};
use au_02_inventory::{NewMovement, RecomputeReport, StockLevel, StockMovement};
use au_04_orders::{Order, OrderQuery, TransitionContext};
use au_05_payments::RefundReceipt;
use au_07_newsletter::{Subscriber, SubscriberStatus};
use au_08_reviews::Review;
use axum::{body::Bytes, extract::State, http::StatusCode, Json};
#[cfg(feature = "metrics")]
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared_types::{
    CategoryId, CollectionId, OrderId, OrderStatus, Page, ProductId, ReviewId, SubscriberId,
};
use tracing::info;

/// Low-stock threshold when the query leaves it out.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 3;

/// Movement history rows returned when the query leaves `limit` out.
pub const DEFAULT_MOVEMENT_LIMIT: usize = 50;

const MAX_MOVEMENT_LIMIT: usize = 500;

// ---------------------------------------------------------------- products

pub async fn list_products(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ProductQuery>,
) -> ApiResult<Json<Page<Product>>> {
    Ok(Json(
        state.catalog.list_products(query, Visibility::Admin).await?,
    ))
}

pub async fn create_product(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewProduct>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    let product = state.catalog.create_product(input).await?;
    info!(product_id = %product.id, slug = %product.slug, "[au-09] Product created");
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn get_product(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProductId>,
) -> ApiResult<Json<Product>> {
    Ok(Json(state.catalog.get_product(id, Visibility::Admin).await?))
}

pub async fn update_product(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProductId>,
    ApiJson(patch): ApiJson<ProductPatch>,
) -> ApiResult<Json<Product>> {
    Ok(Json(state.catalog.update_product(id, patch).await?))
}

#[derive(Debug, Deserialize)]
pub struct DeleteParams {
    /// Archive (soft delete) unless explicitly `false`.
    #[serde(default = "archive_by_default")]
    pub archive: bool,
}

fn archive_by_default() -> bool {
    true
}

pub async fn delete_product(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProductId>,
    ApiQuery(params): ApiQuery<DeleteParams>,
) -> ApiResult<StatusCode> {
    state.catalog.delete_product(id, params.archive).await?;
    info!(product_id = %id, archive = params.archive, "[au-09] Product deleted");
    Ok(StatusCode::NO_CONTENT)
}

// -------------------------------------------------------------- categories

pub async fn list_categories(State(state): State<AppState>) -> ApiResult<Json<Vec<Category>>> {
    Ok(Json(state.catalog.list_categories().await?))
}

pub async fn create_category(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewCategory>,
) -> ApiResult<(StatusCode, Json<Category>)> {
    let category = state.catalog.create_category(input).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn update_category(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<CategoryId>,
    ApiJson(patch): ApiJson<CategoryPatch>,
) -> ApiResult<Json<Category>> {
    Ok(Json(state.catalog.update_category(id, patch).await?))
}

pub async fn delete_category(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<CategoryId>,
) -> ApiResult<StatusCode> {
    state.catalog.delete_category(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ------------------------------------------------------------- collections

pub async fn list_collections(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<Collection>>> {
    Ok(Json(state.catalog.list_collections(Visibility::Admin).await?))
}

pub async fn create_collection(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewCollection>,
) -> ApiResult<(StatusCode, Json<Collection>)> {
    let collection = state.catalog.create_collection(input).await?;
    Ok((StatusCode::CREATED, Json(collection)))
}

pub async fn update_collection(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<CollectionId>,
    ApiJson(patch): ApiJson<CollectionPatch>,
) -> ApiResult<Json<Collection>> {
    Ok(Json(state.catalog.update_collection(id, patch).await?))
}

pub async fn delete_collection(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<CollectionId>,
) -> ApiResult<StatusCode> {
    state.catalog.delete_collection(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_to_collection(
    State(state): State<AppState>,
    ApiPath((collection_id, product_id)): ApiPath<(CollectionId, ProductId)>,
) -> ApiResult<Json<Product>> {
    Ok(Json(
        state
            .catalog
            .add_product_to_collection(collection_id, product_id)
            .await?,
    ))
}

pub async fn remove_from_collection(
    State(state): State<AppState>,
    ApiPath((collection_id, product_id)): ApiPath<(CollectionId, ProductId)>,
) -> ApiResult<Json<Product>> {
    Ok(Json(
        state
            .catalog
            .remove_product_from_collection(collection_id, product_id)
            .await?,
    ))
}

// ------------------------------------------------------------------- stock

#[derive(Debug, Deserialize)]
pub struct LowStockParams {
    pub threshold: Option<i64>,
}

pub async fn low_stock(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<LowStockParams>,
) -> ApiResult<Json<Vec<StockLevel>>> {
    let threshold = params.threshold.unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD);
    Ok(Json(state.inventory.low_stock(threshold).await?))
}

pub async fn record_movement(
    State(state): State<AppState>,
    ApiJson(movement): ApiJson<NewMovement>,
) -> ApiResult<(StatusCode, Json<StockMovement>)> {
    let recorded = state.inventory.record_movement(movement).await?;
    Ok((StatusCode::CREATED, Json(recorded)))
}

#[derive(Debug, Serialize)]
pub struct StockView {
    pub product_id: ProductId,
    pub level: i64,
}

pub async fn stock_level(
    State(state): State<AppState>,
    ApiPath(product_id): ApiPath<ProductId>,
) -> ApiResult<Json<StockView>> {
    let level = state.inventory.stock_level(product_id).await?;
    Ok(Json(StockView { product_id, level }))
}

#[derive(Debug, Deserialize)]
pub struct MovementParams {
    pub limit: Option<usize>,
}

pub async fn movements(
    State(state): State<AppState>,
    ApiPath(product_id): ApiPath<ProductId>,
    ApiQuery(params): ApiQuery<MovementParams>,
) -> ApiResult<Json<Vec<StockMovement>>> {
    let limit = params
        .limit
        .unwrap_or(DEFAULT_MOVEMENT_LIMIT)
        .clamp(1, MAX_MOVEMENT_LIMIT);
    Ok(Json(state.inventory.movements(product_id, limit).await?))
}

pub async fn recompute(
    State(state): State<AppState>,
    ApiPath(product_id): ApiPath<ProductId>,
) -> ApiResult<Json<RecomputeReport>> {
    Ok(Json(state.inventory.recompute(product_id).await?))
}

// ------------------------------------------------------------------ orders

pub async fn list_orders(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<OrderQuery>,
) -> ApiResult<Json<Page<Order>>> {
    Ok(Json(state.orders.list(query).await?))
}

pub async fn get_order(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<OrderId>,
) -> ApiResult<Json<Order>> {
    Ok(Json(state.orders.get(id).await?))
}

#[derive(Debug, Deserialize)]
pub struct StatusChange {
    pub status: OrderStatus,
    #[serde(flatten)]
    pub context: TransitionContext,
}

pub async fn change_status(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<OrderId>,
    ApiJson(change): ApiJson<StatusChange>,
) -> ApiResult<Json<Order>> {
    let order = state
        .orders
        .transition(id, change.status, change.context)
        .await?;
    info!(order_number = %order.order_number, status = ?order.status, "[au-09] Order status changed");
    Ok(Json(order))
}

#[derive(Debug, Default, Deserialize)]
pub struct RefundBody {
    pub amount_cents: Option<i64>,
}

/// An empty body refunds whatever is left on the order.
pub async fn refund_order(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<OrderId>,
    body: Bytes,
) -> ApiResult<Json<RefundReceipt>> {
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        RefundBody::default()
    } else {
        serde_json::from_slice::<RefundBody>(&body)
            .map_err(|e| ApiError::validation(format!("Invalid refund body: {e}")))?
    };
    let receipt = state.refunds.refund(id, request.amount_cents).await?;
    info!(
        order_number = %receipt.order_number,
        amount_cents = receipt.refund.amount_cents,
        "[au-09] Refund issued"
    );
    Ok(Json(receipt))
}

// ----------------------------------------------------------------- reviews

pub async fn pending_reviews(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<PageParams>,
) -> ApiResult<Json<Page<Review>>> {
    Ok(Json(state.reviews.list_pending(params.request()).await?))
}

pub async fn approve_review(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ReviewId>,
) -> ApiResult<Json<Review>> {
    Ok(Json(state.reviews.approve(id).await?))
}

pub async fn reject_review(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ReviewId>,
) -> ApiResult<Json<Review>> {
    Ok(Json(state.reviews.reject(id).await?))
}

// -------------------------------------------------------------- newsletter

#[derive(Debug, Deserialize)]
pub struct SubscriberParams {
    pub status: Option<SubscriberStatus>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// Subscriber as listed in the back-office; the unsubscribe token stays private.
#[derive(Debug, Serialize)]
pub struct SubscriberView {
    pub id: SubscriberId,
    pub email: String,
    pub status: SubscriberStatus,
    pub source: String,
    pub created_at: DateTime<Utc>,
    pub unsubscribed_at: Option<DateTime<Utc>>,
}

impl From<Subscriber> for SubscriberView {
    fn from(s: Subscriber) -> Self {
        Self {
            id: s.id,
            email: s.email,
            status: s.status,
            source: s.source,
            created_at: s.created_at,
            unsubscribed_at: s.unsubscribed_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SubscriberListing {
    pub active_count: u64,
    pub subscribers: Page<SubscriberView>,
}

pub async fn list_subscribers(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<SubscriberParams>,
) -> ApiResult<Json<SubscriberListing>> {
    let page = shared_types::PageRequest::new(params.page, params.per_page);
    let subscribers = state
        .newsletter
        .list(params.status, page)
        .await?
        .map(SubscriberView::from);
    let active_count = state.newsletter.count_active().await?;
    Ok(Json(SubscriberListing {
        active_count,
        subscribers,
    }))
}

// ----------------------------------------------------------------- metrics

pub async fn metrics(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(state.metrics.to_json())
}

#[cfg(feature = "metrics")]
pub async fn prometheus_metrics(State(state): State<AppState>) -> Response {
    match state.metrics.to_prometheus() {
        Ok(body) => (
            [(
                axum::http::header::CONTENT_TYPE,
                "text/plain; version=0.0.4",
            )],
            body,
        )
            .into_response(),
        Err(e) => ApiError::internal(e).into_response(),
    }
}

//! Public storefront endpoints.

use crate::domain::error::{ApiError, ApiResult};
use crate::routes::extract::{ApiJson, ApiPath, ApiQuery};
use crate::state::AppState;
use au_01_catalog::{Category, Collection, Product, ProductQuery, Visibility};
use au_03_cart::{Cart, Quote};
use au_04_orders::Order;
use au_05_payments::{CheckoutRequest, CheckoutResponse};
use au_07_newsletter::SubscribeOutcome;
use au_08_reviews::{NewReview, PublicReview, RatingSummary};
use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared_types::{Money, OrderLine, OrderStatus, Page, PageRequest, ProductId};
use tracing::{info, warn};

pub async fn list_products(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ProductQuery>,
) -> ApiResult<Json<Page<Product>>> {
    let page = state
        .catalog
        .list_products(query, Visibility::Public)
        .await?;
    Ok(Json(page))
}

pub async fn get_product(
    State(state): State<AppState>,
    ApiPath(slug): ApiPath<String>,
) -> ApiResult<Json<Product>> {
    let product = state
        .catalog
        .get_product_by_slug(&slug, Visibility::Public)
        .await?;
    Ok(Json(product))
}

/// An active product, addressed by id or slug.
async fn resolve_product(state: &AppState, key: &str) -> ApiResult<Product> {
    let product = match key.parse::<ProductId>() {
        Ok(id) => state.catalog.get_product(id, Visibility::Public).await?,
        Err(_) => {
            state
                .catalog
                .get_product_by_slug(key, Visibility::Public)
                .await?
        }
    };
    Ok(product)
}

#[derive(Debug, Deserialize)]
pub struct PageParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl PageParams {
    pub fn request(&self) -> PageRequest {
        PageRequest::new(self.page, self.per_page)
    }
}

#[derive(Serialize)]
pub struct ProductReviews {
    pub summary: RatingSummary,
    pub reviews: Page<PublicReview>,
}

pub async fn list_reviews(
    State(state): State<AppState>,
    ApiPath(key): ApiPath<String>,
    ApiQuery(params): ApiQuery<PageParams>,
) -> ApiResult<Json<ProductReviews>> {
    let product = resolve_product(&state, &key).await?;
    let summary = state.reviews.summary(product.id).await?;
    let reviews = state
        .reviews
        .list_for_product(product.id, params.request())
        .await?
        .map(|review| PublicReview::from(&review));
    Ok(Json(ProductReviews { summary, reviews }))
}

#[derive(Debug, Deserialize)]
pub struct ReviewSubmission {
    pub author_name: String,
    pub author_email: String,
    pub rating: u8,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
}

#[derive(Serialize)]
pub struct ReviewReceipt {
    pub review: PublicReview,
    /// Reviews are published after moderation.
    pub status: &'static str,
}

pub async fn submit_review(
    State(state): State<AppState>,
    ApiPath(key): ApiPath<String>,
    ApiJson(submission): ApiJson<ReviewSubmission>,
) -> ApiResult<(StatusCode, Json<ReviewReceipt>)> {
    let product = resolve_product(&state, &key).await?;

    let verified = match state
        .orders
        .has_purchased(&submission.author_email, product.id)
        .await
    {
        Ok(verified) => verified,
        Err(e) => {
            warn!(product_id = %product.id, error = %e, "[au-09] Purchase check failed, review left unverified");
            false
        }
    };

    let review = state
        .reviews
        .submit(
            NewReview {
                product_id: product.id,
                author_name: submission.author_name,
                author_email: submission.author_email,
                rating: submission.rating,
                title: submission.title,
                body: submission.body,
            },
            verified,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ReviewReceipt {
            review: PublicReview::from(&review),
            status: "pending_moderation",
        }),
    ))
}

pub async fn list_categories(State(state): State<AppState>) -> ApiResult<Json<Vec<Category>>> {
    Ok(Json(state.catalog.list_categories().await?))
}

pub async fn list_collections(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<Collection>>> {
    Ok(Json(
        state.catalog.list_collections(Visibility::Public).await?,
    ))
}

pub async fn get_collection(
    State(state): State<AppState>,
    ApiPath(slug): ApiPath<String>,
) -> ApiResult<Json<Collection>> {
    let collection = state
        .catalog
        .get_collection_by_slug(&slug, Visibility::Public)
        .await?;
    Ok(Json(collection))
}

pub async fn quote(
    State(state): State<AppState>,
    ApiJson(cart): ApiJson<Cart>,
) -> ApiResult<Json<Quote>> {
    Ok(Json(state.checkout.quote(cart).await?))
}

pub async fn checkout(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CheckoutRequest>,
) -> ApiResult<(StatusCode, Json<CheckoutResponse>)> {
    let response = state.checkout.start_checkout(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[derive(Debug, Deserialize)]
pub struct LookupParams {
    pub number: String,
    pub email: String,
}

/// What a customer may see of their own order.
#[derive(Debug, Serialize)]
pub struct OrderStatusView {
    pub order_number: String,
    pub status: OrderStatus,
    pub lines: Vec<OrderLine>,
    pub subtotal: Money,
    pub shipping: Money,
    pub total: Money,
    pub tracking_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
}

impl From<Order> for OrderStatusView {
    fn from(order: Order) -> Self {
        Self {
            order_number: order.order_number,
            status: order.status,
            lines: order.lines,
            subtotal: order.subtotal,
            shipping: order.shipping,
            total: order.total,
            tracking_number: order.tracking_number,
            created_at: order.created_at,
            paid_at: order.paid_at,
        }
    }
}

pub async fn lookup_order(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<LookupParams>,
) -> ApiResult<Json<OrderStatusView>> {
    let order = state
        .orders
        .customer_lookup(params.number.trim(), &params.email)
        .await?;
    Ok(Json(order.into()))
}

#[derive(Debug, Deserialize)]
pub struct SubscribeBody {
    pub email: String,
    #[serde(default)]
    pub source: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SubscriptionView {
    pub status: &'static str,
    pub email: String,
}

pub async fn subscribe(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<SubscribeBody>,
) -> ApiResult<(StatusCode, Json<SubscriptionView>)> {
    let outcome = state
        .newsletter
        .subscribe(&body.email, body.source.as_deref())
        .await?;
    let status = match outcome {
        SubscribeOutcome::AlreadySubscribed(_) => StatusCode::OK,
        SubscribeOutcome::Subscribed(_) | SubscribeOutcome::Resubscribed(_) => {
            StatusCode::CREATED
        }
    };
    Ok((
        status,
        Json(SubscriptionView {
            status: outcome.as_str(),
            email: outcome.subscriber().email.clone(),
        }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct UnsubscribeBody {
    pub token: String,
}

pub async fn unsubscribe(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<UnsubscribeBody>,
) -> ApiResult<Json<SubscriptionView>> {
    let subscriber = state.newsletter.unsubscribe(body.token.trim()).await?;
    info!(subscriber_id = %subscriber.id, "[au-09] Newsletter unsubscribe");
    Ok(Json(SubscriptionView {
        status: "unsubscribed",
        email: subscriber.email,
    }))
}

/// Unknown routes answer with the JSON envelope too.
pub async fn not_found() -> ApiError {
    ApiError::not_found("No such route")
}

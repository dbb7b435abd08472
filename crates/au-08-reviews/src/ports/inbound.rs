//! Driving Ports (API - Inbound)

use crate::domain::{NewReview, RatingSummary, Review};
use crate::error::ReviewResult;
use async_trait::async_trait;
use shared_types::{Page, PageRequest, ProductId, ReviewId};

/// Primary Reviews API
#[async_trait]
pub trait ReviewApi: Send + Sync {
    /// Store a `Pending` review. `verified_purchase` is decided by the caller.
    async fn submit(&self, input: NewReview, verified_purchase: bool) -> ReviewResult<Review>;

    async fn approve(&self, id: ReviewId) -> ReviewResult<Review>;

    async fn reject(&self, id: ReviewId) -> ReviewResult<Review>;

    /// Approved reviews only, newest first.
    async fn list_for_product(
        &self,
        product_id: ProductId,
        page: PageRequest,
    ) -> ReviewResult<Page<Review>>;

    /// Moderation queue, newest first.
    async fn list_pending(&self, page: PageRequest) -> ReviewResult<Page<Review>>;

    /// Approved reviews only.
    async fn summary(&self, product_id: ProductId) -> ReviewResult<RatingSummary>;
}

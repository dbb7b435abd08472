//! Driven Ports (SPI - Outbound Dependencies)

use crate::domain::{Review, ReviewStatus};
use crate::error::ReviewResult;
use async_trait::async_trait;
use shared_types::{Page, PageRequest, ProductId, ReviewId};

/// Review persistence.
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// Fails with `AlreadyReviewed` when (product, email) exists.
    async fn insert(&self, review: &Review) -> ReviewResult<()>;

    async fn update(&self, review: &Review) -> ReviewResult<()>;

    async fn get(&self, id: ReviewId) -> ReviewResult<Option<Review>>;

    async fn exists(&self, product_id: ProductId, email: &str) -> ReviewResult<bool>;

    /// Newest first. `product_id: None` spans every product.
    async fn list(
        &self,
        product_id: Option<ProductId>,
        status: ReviewStatus,
        page: PageRequest,
    ) -> ReviewResult<Page<Review>>;

    /// Ratings of every review of `product_id` in `status`.
    async fn ratings(&self, product_id: ProductId, status: ReviewStatus) -> ReviewResult<Vec<u8>>;
}

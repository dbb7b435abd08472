//! Review Service - submission, moderation and summaries

use crate::domain::{NewReview, RatingSummary, Review, ReviewStatus};
use crate::error::{ReviewError, ReviewResult};
use crate::ports::inbound::ReviewApi;
use crate::ports::outbound::ReviewRepository;
use async_trait::async_trait;
use chrono::Utc;
use shared_bus::{EventPublisher, StoreEvent};
use shared_types::{Page, PageRequest, ProductId, ReviewId};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

/// Review Service implementation
pub struct ReviewService<R: ReviewRepository + ?Sized> {
    repo: Arc<R>,
    publisher: Arc<dyn EventPublisher>,
    write_lock: Mutex<()>,
}

impl<R: ReviewRepository + ?Sized> ReviewService<R> {
    pub fn new(repo: Arc<R>, publisher: Arc<dyn EventPublisher>) -> Self {
        Self {
            repo,
            publisher,
            write_lock: Mutex::new(()),
        }
    }

    async fn moderate(&self, id: ReviewId, status: ReviewStatus) -> ReviewResult<Review> {
        let _guard = self.write_lock.lock().await;
        let mut review = self
            .repo
            .get(id)
            .await?
            .ok_or_else(|| ReviewError::NotFound(id.to_string()))?;
        if review.status == status {
            return Ok(review);
        }

        let from = review.status;
        review.status = status;
        review.moderated_at = Some(Utc::now());
        self.repo.update(&review).await?;
        info!(
            review_id = %review.id,
            product_id = %review.product_id,
            from = %from,
            to = %status,
            "[au-08] Review moderated"
        );
        Ok(review)
    }
}

#[async_trait]
impl<R: ReviewRepository + ?Sized> ReviewApi for ReviewService<R> {
    async fn submit(&self, mut input: NewReview, verified_purchase: bool) -> ReviewResult<Review> {
        input.validate()?;

        let review = {
            let _guard = self.write_lock.lock().await;
            if self
                .repo
                .exists(input.product_id, &input.author_email)
                .await?
            {
                return Err(ReviewError::AlreadyReviewed {
                    product_id: input.product_id,
                });
            }
            let review = input.into_review(verified_purchase, Utc::now());
            self.repo.insert(&review).await?;
            review
        };

        info!(
            review_id = %review.id,
            product_id = %review.product_id,
            rating = review.rating,
            verified = review.verified_purchase,
            "[au-08] Review submitted"
        );
        self.publisher
            .publish(StoreEvent::ReviewSubmitted {
                review_id: review.id,
                product_id: review.product_id,
                rating: review.rating,
            })
            .await;
        Ok(review)
    }

    async fn approve(&self, id: ReviewId) -> ReviewResult<Review> {
        self.moderate(id, ReviewStatus::Approved).await
    }

    async fn reject(&self, id: ReviewId) -> ReviewResult<Review> {
        self.moderate(id, ReviewStatus::Rejected).await
    }

    async fn list_for_product(
        &self,
        product_id: ProductId,
        page: PageRequest,
    ) -> ReviewResult<Page<Review>> {
        self.repo
            .list(Some(product_id), ReviewStatus::Approved, page)
            .await
    }

    async fn list_pending(&self, page: PageRequest) -> ReviewResult<Page<Review>> {
        self.repo.list(None, ReviewStatus::Pending, page).await
    }

    async fn summary(&self, product_id: ProductId) -> ReviewResult<RatingSummary> {
        let ratings = self
            .repo
            .ratings(product_id, ReviewStatus::Approved)
            .await?;
        Ok(RatingSummary::from_ratings(ratings))
    }
}

//! `ReviewRepository` over `product_reviews`, unique on
//! `(product_id, author_email)`.

use super::client::{BaasClient, BaasError, Query};
use async_trait::async_trait;
use au_08_reviews::{Review, ReviewError, ReviewRepository, ReviewResult, ReviewStatus};
use serde::Deserialize;
use shared_types::{Page, PageRequest, ProductId, ReviewId};
use std::sync::Arc;

const REVIEWS: &str = "product_reviews";

impl From<BaasError> for ReviewError {
    fn from(err: BaasError) -> Self {
        ReviewError::Storage(err.to_string())
    }
}

#[derive(Deserialize)]
struct RatingRow {
    rating: u8,
}

pub struct BaasReviewRepository {
    client: Arc<BaasClient>,
}

impl BaasReviewRepository {
    pub fn new(client: Arc<BaasClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ReviewRepository for BaasReviewRepository {
    async fn insert(&self, review: &Review) -> ReviewResult<()> {
        match self
            .client
            .insert::<_, serde_json::Value>(REVIEWS, review)
            .await
        {
            Ok(_) => Ok(()),
            Err(BaasError::Conflict(_)) => Err(ReviewError::AlreadyReviewed {
                product_id: review.product_id,
            }),
            Err(e) => Err(e.into()),
        }
    }

    async fn update(&self, review: &Review) -> ReviewResult<()> {
        let updated: Vec<serde_json::Value> = self
            .client
            .update(REVIEWS, &Query::new().eq("id", review.id), review)
            .await?;
        if updated.is_empty() {
            return Err(ReviewError::NotFound(review.id.to_string()));
        }
        Ok(())
    }

    async fn get(&self, id: ReviewId) -> ReviewResult<Option<Review>> {
        Ok(self
            .client
            .select_one(REVIEWS, Query::new().eq("id", id))
            .await?)
    }

    async fn exists(&self, product_id: ProductId, email: &str) -> ReviewResult<bool> {
        let count = self
            .client
            .count(
                REVIEWS,
                Query::new()
                    .eq("product_id", product_id)
                    .eq("author_email", email),
            )
            .await?;
        Ok(count > 0)
    }

    async fn list(
        &self,
        product_id: Option<ProductId>,
        status: ReviewStatus,
        page: PageRequest,
    ) -> ReviewResult<Page<Review>> {
        let mut query = Query::new().eq("status", status);
        if let Some(product_id) = product_id {
            query = query.eq("product_id", product_id);
        }
        let query = query
            .order("created_at.desc")
            .limit(page.per_page as usize)
            .offset(page.offset())
            .exact_count();

        let (items, total) = self.client.select_counted(REVIEWS, &query).await?;
        Ok(Page {
            items,
            total,
            page: page.page,
            per_page: page.per_page,
        })
    }

    async fn ratings(&self, product_id: ProductId, status: ReviewStatus) -> ReviewResult<Vec<u8>> {
        let rows: Vec<RatingRow> = self
            .client
            .select(
                REVIEWS,
                &Query::new()
                    .select("rating")
                    .eq("product_id", product_id)
                    .eq("status", status),
            )
            .await?;
        Ok(rows.into_iter().map(|r| r.rating).collect())
    }
}

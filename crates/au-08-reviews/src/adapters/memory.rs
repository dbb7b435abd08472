//! In-memory review repository

use crate::domain::{Review, ReviewStatus};
use crate::error::{ReviewError, ReviewResult};
use crate::ports::outbound::ReviewRepository;
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{Page, PageRequest, ProductId, ReviewId};
use std::collections::HashMap;

/// `ReviewRepository` over a hash map.
#[derive(Default)]
pub struct InMemoryReviewRepository {
    reviews: RwLock<HashMap<ReviewId, Review>>,
}

impl InMemoryReviewRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReviewRepository for InMemoryReviewRepository {
    async fn insert(&self, review: &Review) -> ReviewResult<()> {
        let mut reviews = self.reviews.write();
        if reviews
            .values()
            .any(|r| r.product_id == review.product_id && r.author_email == review.author_email)
        {
            return Err(ReviewError::AlreadyReviewed {
                product_id: review.product_id,
            });
        }
        reviews.insert(review.id, review.clone());
        Ok(())
    }

    async fn update(&self, review: &Review) -> ReviewResult<()> {
        match self.reviews.write().get_mut(&review.id) {
            Some(stored) => {
                *stored = review.clone();
                Ok(())
            }
            None => Err(ReviewError::NotFound(review.id.to_string())),
        }
    }

    async fn get(&self, id: ReviewId) -> ReviewResult<Option<Review>> {
        Ok(self.reviews.read().get(&id).cloned())
    }

    async fn exists(&self, product_id: ProductId, email: &str) -> ReviewResult<bool> {
        Ok(self
            .reviews
            .read()
            .values()
            .any(|r| r.product_id == product_id && r.author_email == email))
    }

    async fn list(
        &self,
        product_id: Option<ProductId>,
        status: ReviewStatus,
        page: PageRequest,
    ) -> ReviewResult<Page<Review>> {
        let mut matching: Vec<Review> = self
            .reviews
            .read()
            .values()
            .filter(|r| r.status == status && product_id.map_or(true, |p| r.product_id == p))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(page.paginate(matching))
    }

    async fn ratings(&self, product_id: ProductId, status: ReviewStatus) -> ReviewResult<Vec<u8>> {
        Ok(self
            .reviews
            .read()
            .values()
            .filter(|r| r.product_id == product_id && r.status == status)
            .map(|r| r.rating)
            .collect())
    }
}

//! Review aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared_types::{normalize_email, ProductId, ReviewId, ValidationError};
use std::fmt;

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;
pub const MAX_TITLE_LEN: usize = 120;
pub const MAX_BODY_LEN: usize = 5000;
pub const MAX_AUTHOR_LEN: usize = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    Pending,
    Approved,
    Rejected,
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub product_id: ProductId,
    pub author_name: String,
    /// Normalised. Never shown publicly; see [`PublicReview`].
    pub author_email: String,
    pub rating: u8,
    pub title: String,
    pub body: String,
    pub status: ReviewStatus,
    pub verified_purchase: bool,
    pub created_at: DateTime<Utc>,
    pub moderated_at: Option<DateTime<Utc>>,
}

/// Storefront view of an approved review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicReview {
    pub id: ReviewId,
    pub product_id: ProductId,
    pub author_name: String,
    pub rating: u8,
    pub title: String,
    pub body: String,
    pub verified_purchase: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&Review> for PublicReview {
    fn from(review: &Review) -> Self {
        Self {
            id: review.id,
            product_id: review.product_id,
            author_name: review.author_name.clone(),
            rating: review.rating,
            title: review.title.clone(),
            body: review.body.clone(),
            verified_purchase: review.verified_purchase,
            created_at: review.created_at,
        }
    }
}

/// Review as submitted from the storefront.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReview {
    pub product_id: ProductId,
    pub author_name: String,
    pub author_email: String,
    pub rating: u8,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
}

fn bounded(value: &str, field: &'static str, max: usize) -> Result<String, ValidationError> {
    let value = value.trim();
    if value.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(value.to_string())
}

impl NewReview {
    /// Trim text, normalise the email and check every bound.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        if !(MIN_RATING..=MAX_RATING).contains(&self.rating) {
            return Err(ValidationError::OutOfRange {
                field: "rating",
                min: i64::from(MIN_RATING),
                max: i64::from(MAX_RATING),
            });
        }
        self.author_name = bounded(&self.author_name, "author_name", MAX_AUTHOR_LEN)?;
        if self.author_name.is_empty() {
            return Err(ValidationError::Required("author_name"));
        }
        self.author_email = normalize_email(&self.author_email)?;
        self.title = bounded(&self.title, "title", MAX_TITLE_LEN)?;
        self.body = bounded(&self.body, "body", MAX_BODY_LEN)?;
        Ok(())
    }

    pub fn into_review(self, verified_purchase: bool, now: DateTime<Utc>) -> Review {
        Review {
            id: ReviewId::new(),
            product_id: self.product_id,
            author_name: self.author_name,
            author_email: self.author_email,
            rating: self.rating,
            title: self.title,
            body: self.body,
            status: ReviewStatus::Pending,
            verified_purchase,
            created_at: now,
            moderated_at: None,
        }
    }
}

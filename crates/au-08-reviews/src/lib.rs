//! # au-08-reviews
//!
//! Product reviews with moderation. A submitted review is `Pending` and
//! invisible until an admin approves it; listings and the rating summary
//! only ever count approved reviews. One review per product per email.
//!
//! The verified-purchase flag is decided by the caller (the gateway checks
//! the reviewer's paid orders) and stored with the review.

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod adapters;
pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

pub use adapters::InMemoryReviewRepository;
pub use domain::{NewReview, PublicReview, RatingSummary, Review, ReviewStatus};
pub use error::{ReviewError, ReviewResult};
pub use ports::{ReviewApi, ReviewRepository};
pub use service::ReviewService;

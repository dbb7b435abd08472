//! Domain module for the Reviews subsystem

pub mod review;
pub mod summary;

pub use review::{
    NewReview, PublicReview, Review, ReviewStatus, MAX_AUTHOR_LEN, MAX_BODY_LEN, MAX_RATING, MAX_TITLE_LEN,
    MIN_RATING,
};
pub use summary::RatingSummary;

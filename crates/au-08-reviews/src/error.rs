//! Error types for the Reviews subsystem

use shared_types::{ProductId, ValidationError};
use thiserror::Error;

/// Reviews subsystem errors
#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("Review not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The email already reviewed this product
    #[error("Product {product_id} already reviewed by this email")]
    AlreadyReviewed { product_id: ProductId },

    /// Backend failure
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Result type for review operations
pub type ReviewResult<T> = Result<T, ReviewError>;

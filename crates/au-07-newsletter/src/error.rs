//! Error types for the Newsletter subsystem

use shared_types::ValidationError;
use thiserror::Error;

/// Newsletter subsystem errors
#[derive(Debug, Error)]
pub enum NewsletterError {
    /// No subscriber holds the given token or id
    #[error("Subscriber not found")]
    NotFound,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Another row already owns the email
    #[error("Email already registered: {0}")]
    DuplicateEmail(String),

    /// Backend failure
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Result type for newsletter operations
pub type NewsletterResult<T> = Result<T, NewsletterError>;
